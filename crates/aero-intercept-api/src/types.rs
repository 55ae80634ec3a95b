use std::fmt;

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

/// Size sentinel meaning "from the offset to the end of the resource".
pub const WHOLE_SIZE: u64 = u64::MAX;

bitflags! {
    /// Shader stages a binding applies to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ShaderStage: u32 {
        const VERTEX = 0x1;
        const HULL = 0x2;
        const DOMAIN = 0x4;
        const GEOMETRY = 0x8;
        const PIXEL = 0x10;
        const COMPUTE = 0x20;

        const ALL_GRAPHICS = Self::VERTEX.bits()
            | Self::HULL.bits()
            | Self::DOMAIN.bits()
            | Self::GEOMETRY.bits()
            | Self::PIXEL.bits();
    }
}

bitflags! {
    /// Aspects of a depth-stencil view touched by a clear.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const DEPTH = 0x1;
        const STENCIL = 0x2;
    }
}

/// Pipeline slot a [`crate::PipelineHandle`] is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineType {
    VertexShader,
    HullShader,
    DomainShader,
    GeometryShader,
    PixelShader,
    ComputeShader,
    BlendState,
    RasterizerState,
    DepthStencilState,
}

impl PipelineType {
    /// Pipeline slot that holds the shader of `stage`.
    ///
    /// Returns `None` unless exactly one stage bit is set.
    pub fn for_shader_stage(stage: ShaderStage) -> Option<Self> {
        let ty = if stage == ShaderStage::VERTEX {
            Self::VertexShader
        } else if stage == ShaderStage::HULL {
            Self::HullShader
        } else if stage == ShaderStage::DOMAIN {
            Self::DomainShader
        } else if stage == ShaderStage::GEOMETRY {
            Self::GeometryShader
        } else if stage == ShaderStage::PIXEL {
            Self::PixelShader
        } else if stage == ShaderStage::COMPUTE {
            Self::ComputeShader
        } else {
            return None;
        };
        Some(ty)
    }
}

/// Dynamic pipeline state that is set through value arrays instead of state objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DynamicState {
    PrimitiveTopology,
    /// RGBA8 packed blend constant, red in the low byte.
    BlendConstant,
    SampleMask,
    StencilReferenceValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    Sampler,
    ShaderResourceView,
    UnorderedAccessView,
    ConstantBuffer,
}

/// Which command an indirect argument buffer feeds.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndirectCommand {
    Draw = 1,
    DrawIndexed = 2,
    Dispatch = 3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    #[default]
    MinMagMipPoint,
    MinMagMipLinear,
}

/// Texel format. Values follow the DXGI numbering so D3D10+ formats convert without a table.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Format(pub u32);

impl Format {
    pub const UNKNOWN: Self = Self(0);
    pub const R32G32B32A32_FLOAT: Self = Self(2);
    pub const R16G16B16A16_FLOAT: Self = Self(10);
    pub const R10G10B10A2_UNORM: Self = Self(24);
    pub const R11G11B10_FLOAT: Self = Self(26);
    pub const R8G8B8A8_UNORM: Self = Self(28);
    pub const R8G8B8A8_UNORM_SRGB: Self = Self(29);
    pub const D32_FLOAT: Self = Self(40);
    pub const R32_FLOAT: Self = Self(41);
    pub const R32_UINT: Self = Self(42);
    pub const D24_UNORM_S8_UINT: Self = Self(45);
    pub const R16_UINT: Self = Self(57);
    pub const D16_UNORM: Self = Self(55);
    pub const B8G8R8A8_UNORM: Self = Self(87);
    pub const B8G8R8A8_UNORM_SRGB: Self = Self(91);

    fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::UNKNOWN => "unknown",
            Self::R32G32B32A32_FLOAT => "r32g32b32a32_float",
            Self::R16G16B16A16_FLOAT => "r16g16b16a16_float",
            Self::R10G10B10A2_UNORM => "r10g10b10a2_unorm",
            Self::R11G11B10_FLOAT => "r11g11b10_float",
            Self::R8G8B8A8_UNORM => "r8g8b8a8_unorm",
            Self::R8G8B8A8_UNORM_SRGB => "r8g8b8a8_unorm_srgb",
            Self::D32_FLOAT => "d32_float",
            Self::R32_FLOAT => "r32_float",
            Self::R32_UINT => "r32_uint",
            Self::D24_UNORM_S8_UINT => "d24_unorm_s8_uint",
            Self::R16_UINT => "r16_uint",
            Self::D16_UNORM => "d16_unorm",
            Self::B8G8R8A8_UNORM => "b8g8r8a8_unorm",
            Self::B8G8R8A8_UNORM_SRGB => "b8g8r8a8_unorm_srgb",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Format({})", self.0),
        }
    }
}

/// Box inside a subresource, in texels (or bytes for buffers). `right`/`bottom`/`back` are
/// exclusive.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct SubresourceBox {
    pub left: i32,
    pub top: i32,
    pub front: i32,
    pub right: i32,
    pub bottom: i32,
    pub back: i32,
}

impl SubresourceBox {
    pub fn width(&self) -> u32 {
        self.right.wrapping_sub(self.left) as u32
    }

    pub fn height(&self) -> u32 {
        self.bottom.wrapping_sub(self.top) as u32
    }

    pub fn depth(&self) -> u32 {
        self.back.wrapping_sub(self.front) as u32
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ScissorRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Source memory of a texture upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubresourceData<'a> {
    pub data: &'a [u8],
    pub row_pitch: u32,
    pub slice_pitch: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_type_requires_a_single_stage() {
        assert_eq!(
            PipelineType::for_shader_stage(ShaderStage::PIXEL),
            Some(PipelineType::PixelShader)
        );
        assert_eq!(
            PipelineType::for_shader_stage(ShaderStage::COMPUTE),
            Some(PipelineType::ComputeShader)
        );
        assert_eq!(PipelineType::for_shader_stage(ShaderStage::ALL_GRAPHICS), None);
        assert_eq!(PipelineType::for_shader_stage(ShaderStage::empty()), None);
    }

    #[test]
    fn box_extent_is_exclusive() {
        let b = SubresourceBox {
            left: 4,
            top: 2,
            front: 0,
            right: 20,
            bottom: 10,
            back: 1,
        };
        assert_eq!((b.width(), b.height(), b.depth()), (16, 8, 1));
    }

    #[test]
    fn unknown_formats_debug_print_their_value() {
        assert_eq!(format!("{:?}", Format::R16_UINT), "r16_uint");
        assert_eq!(format!("{:?}", Format(9999)), "Format(9999)");
    }
}
