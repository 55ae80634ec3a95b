use aero_intercept_api::{PipelineType, ShaderStage, SubresourceBox};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

pub use aero_intercept_api::{Format, ScissorRect as Rect, Viewport};

/// Programmable pipeline stage of a per-stage entry point (`VSSetShader`, `PSSetSamplers`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    Hull,
    Domain,
    Geometry,
    Pixel,
    Compute,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Vertex,
        Stage::Hull,
        Stage::Domain,
        Stage::Geometry,
        Stage::Pixel,
        Stage::Compute,
    ];

    pub fn shader_stage(self) -> ShaderStage {
        match self {
            Stage::Vertex => ShaderStage::VERTEX,
            Stage::Hull => ShaderStage::HULL,
            Stage::Domain => ShaderStage::DOMAIN,
            Stage::Geometry => ShaderStage::GEOMETRY,
            Stage::Pixel => ShaderStage::PIXEL,
            Stage::Compute => ShaderStage::COMPUTE,
        }
    }

    pub fn pipeline_type(self) -> PipelineType {
        match self {
            Stage::Vertex => PipelineType::VertexShader,
            Stage::Hull => PipelineType::HullShader,
            Stage::Domain => PipelineType::DomainShader,
            Stage::Geometry => PipelineType::GeometryShader,
            Stage::Pixel => PipelineType::PixelShader,
            Stage::Compute => PipelineType::ComputeShader,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceDimension {
    Unknown,
    Buffer,
    Texture1D,
    Texture2D,
    Texture3D,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UavDimension {
    Buffer { first_element: u32, num_elements: u32 },
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture3D,
}

/// Description of an unordered-access view together with the resource it views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnorderedAccessViewInfo {
    pub resource: super::Resource,
    pub format: Format,
    pub dimension: UavDimension,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceContextType {
    Immediate,
    Deferred,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapType {
    Read,
    Write,
    ReadWrite,
    WriteDiscard,
    WriteNoOverwrite,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MapFlags: u32 {
        const DO_NOT_WAIT = 0x10_0000;
    }
}

bitflags! {
    /// `D3D11_CLEAR_FLAG`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ClearFlag: u32 {
        const DEPTH = 0x1;
        const STENCIL = 0x2;
    }
}

bitflags! {
    /// `D3D11_COPY_FLAGS`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CopyFlags: u32 {
        const NO_OVERWRITE = 0x1;
        const DISCARD = 0x2;
    }
}

/// `D3D11_PRIMITIVE_TOPOLOGY`. Forwarded to observers as a raw value.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PrimitiveTopology(pub u32);

impl PrimitiveTopology {
    pub const UNDEFINED: Self = Self(0);
    pub const POINT_LIST: Self = Self(1);
    pub const LINE_LIST: Self = Self(2);
    pub const LINE_STRIP: Self = Self(3);
    pub const TRIANGLE_LIST: Self = Self(4);
    pub const TRIANGLE_STRIP: Self = Self(5);
}

/// `D3D11_BOX`. Coordinates are unsigned on the native side.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Box3 {
    pub left: u32,
    pub top: u32,
    pub front: u32,
    pub right: u32,
    pub bottom: u32,
    pub back: u32,
}

impl Box3 {
    pub fn width(&self) -> u32 {
        self.right.wrapping_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.wrapping_sub(self.top)
    }

    pub fn depth(&self) -> u32 {
        self.back.wrapping_sub(self.front)
    }
}

impl From<Box3> for SubresourceBox {
    fn from(b: Box3) -> Self {
        bytemuck::cast(b)
    }
}

const _: () = assert!(std::mem::size_of::<Box3>() == std::mem::size_of::<SubresourceBox>());
const _: () = assert!(std::mem::size_of::<Viewport>() == 6 * 4);
const _: () = assert!(std::mem::size_of::<Rect>() == 4 * 4);

/// CPU view of a mapped subresource. `address` is only meaningful to the mapping driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MappedSubresource {
    pub address: usize,
    pub row_pitch: u32,
    pub depth_pitch: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct TiledResourceCoordinate {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub subresource: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileRegionSize {
    pub num_tiles: u32,
    pub use_box: bool,
    pub width: u32,
    pub height: u16,
    pub depth: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_reinterprets_as_signed_subresource_box() {
        let b = Box3 {
            left: 4,
            top: 0,
            front: 0,
            right: 20,
            bottom: 1,
            back: 1,
        };
        let converted = SubresourceBox::from(b);
        assert_eq!(converted.left, 4);
        assert_eq!(converted.width(), b.width());
        assert_eq!(converted.height(), 1);
    }

    #[test]
    fn stages_map_to_single_api_stages() {
        for stage in Stage::ALL {
            assert_eq!(
                PipelineType::for_shader_stage(stage.shader_stage()),
                Some(stage.pipeline_type())
            );
        }
    }
}
