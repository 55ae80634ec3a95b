//! Call surface of `ID3D11DeviceContext` through `ID3D11DeviceContext4`.
//!
//! The per-stage entry points of the native interface (`VSSetShader`, `HSSetShader`, ...,
//! `CSSetShader`) are folded into a single method that takes a [`Stage`]. Count arguments are
//! carried by slice lengths. Output arrays are caller-provided slices that the callee fills.
//!
//! The same traits are implemented by the native driver objects and by
//! [`crate::DeviceContextProxy`], which is what lets the proxy stand in for the native context.

use std::fmt;

use super::handle::*;
use super::types::*;
use crate::guid::Guid;
use crate::hresult::HResult;
use crate::revision::ContextRevision;

/// Reference counting and interface discovery (`IUnknown`).
pub trait Unknown: Send + Sync {
    /// Returns the new reference count.
    fn add_ref(&self) -> u32;

    /// Returns the remaining reference count.
    fn release(&self) -> u32;

    /// On success the returned interface carries one new reference.
    fn query_interface(&self, iid: &Guid) -> Result<NativeInterface, HResult>;
}

/// Object introspection the event translation needs (`ID3D11Resource::GetType`,
/// `ID3D11View::QueryInterface`, `ID3D11UnorderedAccessView::GetDesc`).
pub trait ObjectQuery: Send + Sync {
    fn resource_dimension(&self, resource: Resource) -> ResourceDimension;

    /// Probes whether `view` implements the view interface `iid`. No reference is added.
    fn view_as(&self, view: View, iid: &Guid) -> Option<View>;

    fn unordered_access_view_info(&self, view: UnorderedAccessView) -> UnorderedAccessViewInfo;
}

/// A recorded command list (`ID3D11CommandList`).
pub trait NativeCommandList: Unknown {
    /// Address of the native object.
    fn handle(&self) -> usize;

    fn context_flags(&self) -> u32;
}

pub trait DeviceContext: Send + Sync {
    type CommandList;

    fn get_private_data(&self, guid: &Guid, data: &mut [u8]) -> Result<usize, HResult>;
    fn set_private_data(&self, guid: &Guid, data: Option<&[u8]>) -> HResult;
    fn set_private_data_interface(&self, guid: &Guid, data: Option<&dyn Unknown>) -> HResult;

    fn set_constant_buffers(&self, stage: Stage, start_slot: u32, buffers: &[Buffer]);
    fn get_constant_buffers(&self, stage: Stage, start_slot: u32, buffers: &mut [Buffer]);
    fn set_shader_resources(&self, stage: Stage, start_slot: u32, views: &[ShaderResourceView]);
    fn get_shader_resources(&self, stage: Stage, start_slot: u32, views: &mut [ShaderResourceView]);
    fn set_samplers(&self, stage: Stage, start_slot: u32, samplers: &[SamplerState]);
    fn get_samplers(&self, stage: Stage, start_slot: u32, samplers: &mut [SamplerState]);
    fn set_shader(&self, stage: Stage, shader: Shader, class_instances: &[ClassInstance]);
    /// Returns the bound shader and the number of class instances it uses.
    fn get_shader(&self, stage: Stage, class_instances: &mut [ClassInstance]) -> (Shader, u32);

    fn draw(&self, vertex_count: u32, start_vertex: u32);
    fn draw_indexed(&self, index_count: u32, start_index: u32, base_vertex: i32);
    fn draw_instanced(
        &self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    );
    fn draw_indexed_instanced(
        &self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    );
    fn draw_auto(&self);
    fn draw_instanced_indirect(&self, args: Buffer, aligned_byte_offset: u32);
    fn draw_indexed_instanced_indirect(&self, args: Buffer, aligned_byte_offset: u32);
    fn dispatch(&self, x: u32, y: u32, z: u32);
    fn dispatch_indirect(&self, args: Buffer, aligned_byte_offset: u32);

    fn map(
        &self,
        resource: Resource,
        subresource: u32,
        map_type: MapType,
        flags: MapFlags,
    ) -> Result<MappedSubresource, HResult>;
    fn unmap(&self, resource: Resource, subresource: u32);

    fn ia_set_input_layout(&self, layout: InputLayout);
    fn ia_get_input_layout(&self) -> InputLayout;
    fn ia_set_vertex_buffers(
        &self,
        start_slot: u32,
        buffers: &[Buffer],
        strides: &[u32],
        offsets: &[u32],
    );
    fn ia_get_vertex_buffers(
        &self,
        start_slot: u32,
        buffers: &mut [Buffer],
        strides: &mut [u32],
        offsets: &mut [u32],
    );
    fn ia_set_index_buffer(&self, buffer: Buffer, format: Format, offset: u32);
    fn ia_get_index_buffer(&self) -> (Buffer, Format, u32);
    fn ia_set_primitive_topology(&self, topology: PrimitiveTopology);
    fn ia_get_primitive_topology(&self) -> PrimitiveTopology;

    fn begin(&self, query: Asynchronous);
    fn end(&self, query: Asynchronous);
    fn get_data(&self, query: Asynchronous, data: &mut [u8], flags: u32) -> HResult;
    fn set_predication(&self, predicate: Predicate, value: bool);
    fn get_predication(&self) -> (Predicate, bool);

    fn om_set_render_targets(
        &self,
        render_targets: &[RenderTargetView],
        depth_stencil: DepthStencilView,
    );
    /// `render_targets: None` keeps the current render targets and depth-stencil view
    /// (`D3D11_KEEP_RENDER_TARGETS_AND_DEPTH_STENCIL`); `uavs: None` keeps the current UAVs.
    fn om_set_render_targets_and_unordered_access_views(
        &self,
        render_targets: Option<(&[RenderTargetView], DepthStencilView)>,
        uav_start_slot: u32,
        uavs: Option<&[UnorderedAccessView]>,
        initial_counts: Option<&[u32]>,
    );
    fn om_get_render_targets(&self, render_targets: &mut [RenderTargetView]) -> DepthStencilView;
    fn om_get_render_targets_and_unordered_access_views(
        &self,
        render_targets: &mut [RenderTargetView],
        uav_start_slot: u32,
        uavs: &mut [UnorderedAccessView],
    ) -> DepthStencilView;
    fn om_set_blend_state(
        &self,
        state: BlendState,
        blend_factor: Option<&[f32; 4]>,
        sample_mask: u32,
    );
    fn om_get_blend_state(&self) -> (BlendState, [f32; 4], u32);
    fn om_set_depth_stencil_state(&self, state: DepthStencilState, stencil_ref: u32);
    fn om_get_depth_stencil_state(&self) -> (DepthStencilState, u32);

    fn so_set_targets(&self, targets: &[Buffer], offsets: &[u32]);
    fn so_get_targets(&self, targets: &mut [Buffer]);

    fn rs_set_state(&self, state: RasterizerState);
    fn rs_get_state(&self) -> RasterizerState;
    fn rs_set_viewports(&self, viewports: &[Viewport]);
    /// Fills `viewports` and returns the number currently bound.
    fn rs_get_viewports(&self, viewports: &mut [Viewport]) -> u32;
    fn rs_set_scissor_rects(&self, rects: &[Rect]);
    fn rs_get_scissor_rects(&self, rects: &mut [Rect]) -> u32;

    #[allow(clippy::too_many_arguments)]
    fn copy_subresource_region(
        &self,
        dst: Resource,
        dst_subresource: u32,
        dst_x: u32,
        dst_y: u32,
        dst_z: u32,
        src: Resource,
        src_subresource: u32,
        src_box: Option<&Box3>,
    );
    fn copy_resource(&self, dst: Resource, src: Resource);
    fn update_subresource(
        &self,
        dst: Resource,
        dst_subresource: u32,
        dst_box: Option<&Box3>,
        data: &[u8],
        row_pitch: u32,
        depth_pitch: u32,
    );
    fn copy_structure_count(
        &self,
        dst: Buffer,
        dst_aligned_byte_offset: u32,
        src: UnorderedAccessView,
    );

    fn clear_render_target_view(&self, view: RenderTargetView, color: &[f32; 4]);
    fn clear_unordered_access_view_uint(&self, view: UnorderedAccessView, values: &[u32; 4]);
    fn clear_unordered_access_view_float(&self, view: UnorderedAccessView, values: &[f32; 4]);
    fn clear_depth_stencil_view(
        &self,
        view: DepthStencilView,
        flags: ClearFlag,
        depth: f32,
        stencil: u8,
    );

    fn generate_mips(&self, view: ShaderResourceView);
    fn set_resource_min_lod(&self, resource: Resource, min_lod: f32);
    fn get_resource_min_lod(&self, resource: Resource) -> f32;
    fn resolve_subresource(
        &self,
        dst: Resource,
        dst_subresource: u32,
        src: Resource,
        src_subresource: u32,
        format: Format,
    );

    fn execute_command_list(&self, list: &Self::CommandList, restore_context_state: bool);
    fn finish_command_list(
        &self,
        restore_deferred_context_state: bool,
    ) -> Result<Self::CommandList, HResult>;

    fn cs_set_unordered_access_views(
        &self,
        start_slot: u32,
        uavs: &[UnorderedAccessView],
        initial_counts: Option<&[u32]>,
    );
    fn cs_get_unordered_access_views(&self, start_slot: u32, uavs: &mut [UnorderedAccessView]);

    fn clear_state(&self);
    fn flush(&self);
    fn get_type(&self) -> DeviceContextType;
    fn get_context_flags(&self) -> u32;
}

/// `ID3D11DeviceContext1`.
pub trait DeviceContext1: DeviceContext {
    #[allow(clippy::too_many_arguments)]
    fn copy_subresource_region1(
        &self,
        dst: Resource,
        dst_subresource: u32,
        dst_x: u32,
        dst_y: u32,
        dst_z: u32,
        src: Resource,
        src_subresource: u32,
        src_box: Option<&Box3>,
        flags: CopyFlags,
    );
    #[allow(clippy::too_many_arguments)]
    fn update_subresource1(
        &self,
        dst: Resource,
        dst_subresource: u32,
        dst_box: Option<&Box3>,
        data: &[u8],
        row_pitch: u32,
        depth_pitch: u32,
        flags: CopyFlags,
    );
    fn discard_resource(&self, resource: Resource);
    fn discard_view(&self, view: View);
    fn discard_view1(&self, view: View, rects: &[Rect]);
    /// `first_constant` and `num_constants`, when present, have one entry per buffer.
    fn set_constant_buffers1(
        &self,
        stage: Stage,
        start_slot: u32,
        buffers: &[Buffer],
        first_constant: Option<&[u32]>,
        num_constants: Option<&[u32]>,
    );
    fn get_constant_buffers1(
        &self,
        stage: Stage,
        start_slot: u32,
        buffers: &mut [Buffer],
        first_constant: Option<&mut [u32]>,
        num_constants: Option<&mut [u32]>,
    );
    /// Returns the previously active state object.
    fn swap_device_context_state(&self, state: DeviceContextState) -> DeviceContextState;
    fn clear_view(&self, view: View, color: &[f32; 4], rects: &[Rect]);
}

/// `ID3D11DeviceContext2`.
pub trait DeviceContext2: DeviceContext1 {
    #[allow(clippy::too_many_arguments)]
    fn update_tile_mappings(
        &self,
        tiled_resource: Resource,
        region_start_coordinates: &[TiledResourceCoordinate],
        region_sizes: &[TileRegionSize],
        tile_pool: Buffer,
        range_flags: &[u32],
        tile_pool_start_offsets: &[u32],
        range_tile_counts: &[u32],
        flags: u32,
    ) -> HResult;
    fn copy_tile_mappings(
        &self,
        dst: Resource,
        dst_start: &TiledResourceCoordinate,
        src: Resource,
        src_start: &TiledResourceCoordinate,
        size: &TileRegionSize,
        flags: u32,
    ) -> HResult;
    fn copy_tiles(
        &self,
        tiled_resource: Resource,
        start: &TiledResourceCoordinate,
        size: &TileRegionSize,
        buffer: Buffer,
        buffer_start_offset: u64,
        flags: u32,
    );
    fn update_tiles(
        &self,
        dst: Resource,
        start: &TiledResourceCoordinate,
        size: &TileRegionSize,
        data: &[u8],
        flags: u32,
    );
    fn resize_tile_pool(&self, tile_pool: Buffer, new_size: u64) -> HResult;
    fn tiled_resource_barrier(&self, before: DeviceChild, after: DeviceChild);
    fn is_annotation_enabled(&self) -> bool;
    fn set_marker_int(&self, label: &str, data: i32);
    fn begin_event_int(&self, label: &str, data: i32);
    fn end_event(&self);
}

/// `ID3D11DeviceContext3`.
pub trait DeviceContext3: DeviceContext2 {
    fn flush1(&self, context_type: DeviceContextType, event: EventHandle);
    fn set_hardware_protection_state(&self, enable: bool);
    fn get_hardware_protection_state(&self) -> bool;
}

/// `ID3D11DeviceContext4`.
pub trait DeviceContext4: DeviceContext3 {
    fn signal(&self, fence: Fence, value: u64) -> HResult;
    fn wait(&self, fence: Fence, value: u64) -> HResult;
}

/// A native context object at revision 0.
pub trait NativeContext0:
    Unknown + ObjectQuery + DeviceContext<CommandList = Box<dyn NativeCommandList>>
{
}
pub trait NativeContext1: NativeContext0 + DeviceContext1 {}
pub trait NativeContext2: NativeContext1 + DeviceContext2 {}
pub trait NativeContext3: NativeContext2 + DeviceContext3 {}
pub trait NativeContext4: NativeContext3 + DeviceContext4 {}

impl<T> NativeContext0 for T where
    T: ?Sized + Unknown + ObjectQuery + DeviceContext<CommandList = Box<dyn NativeCommandList>>
{
}
impl<T: ?Sized + NativeContext0 + DeviceContext1> NativeContext1 for T {}
impl<T: ?Sized + NativeContext1 + DeviceContext2> NativeContext2 for T {}
impl<T: ?Sized + NativeContext2 + DeviceContext3> NativeContext3 for T {}
impl<T: ?Sized + NativeContext3 + DeviceContext4> NativeContext4 for T {}

/// An owned native context interface, tagged with the revision it was obtained at.
///
/// Owning a value means owning one native reference to the object.
pub enum NativeContext {
    Revision0(Box<dyn NativeContext0>),
    Revision1(Box<dyn NativeContext1>),
    Revision2(Box<dyn NativeContext2>),
    Revision3(Box<dyn NativeContext3>),
    Revision4(Box<dyn NativeContext4>),
}

impl NativeContext {
    pub fn revision(&self) -> ContextRevision {
        match self {
            NativeContext::Revision0(_) => ContextRevision::Base,
            NativeContext::Revision1(_) => ContextRevision::Rev1,
            NativeContext::Revision2(_) => ContextRevision::Rev2,
            NativeContext::Revision3(_) => ContextRevision::Rev3,
            NativeContext::Revision4(_) => ContextRevision::Rev4,
        }
    }

    pub fn base(&self) -> &dyn NativeContext0 {
        match self {
            NativeContext::Revision0(c) => c.as_ref(),
            NativeContext::Revision1(c) => c.as_ref(),
            NativeContext::Revision2(c) => c.as_ref(),
            NativeContext::Revision3(c) => c.as_ref(),
            NativeContext::Revision4(c) => c.as_ref(),
        }
    }

    pub fn rev1(&self) -> &dyn NativeContext1 {
        match self {
            NativeContext::Revision1(c) => c.as_ref(),
            NativeContext::Revision2(c) => c.as_ref(),
            NativeContext::Revision3(c) => c.as_ref(),
            NativeContext::Revision4(c) => c.as_ref(),
            NativeContext::Revision0(_) => revision_too_low(ContextRevision::Rev1, self.revision()),
        }
    }

    pub fn rev2(&self) -> &dyn NativeContext2 {
        match self {
            NativeContext::Revision2(c) => c.as_ref(),
            NativeContext::Revision3(c) => c.as_ref(),
            NativeContext::Revision4(c) => c.as_ref(),
            _ => revision_too_low(ContextRevision::Rev2, self.revision()),
        }
    }

    pub fn rev3(&self) -> &dyn NativeContext3 {
        match self {
            NativeContext::Revision3(c) => c.as_ref(),
            NativeContext::Revision4(c) => c.as_ref(),
            _ => revision_too_low(ContextRevision::Rev3, self.revision()),
        }
    }

    pub fn rev4(&self) -> &dyn NativeContext4 {
        match self {
            NativeContext::Revision4(c) => c.as_ref(),
            _ => revision_too_low(ContextRevision::Rev4, self.revision()),
        }
    }
}

#[cold]
#[track_caller]
fn revision_too_low(required: ContextRevision, current: ContextRevision) -> ! {
    panic!("{required} entry point called on a device context negotiated at {current}");
}

impl fmt::Debug for NativeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeContext").field(&self.revision()).finish()
    }
}

/// Result of a native interface query.
pub enum NativeInterface {
    DeviceContext(NativeContext),
    CommandList(Box<dyn NativeCommandList>),
    Other(Box<dyn Unknown>),
}

impl NativeInterface {
    /// Drops the reference the query added.
    pub fn release(self) -> u32 {
        match self {
            NativeInterface::DeviceContext(c) => c.base().release(),
            NativeInterface::CommandList(l) => l.release(),
            NativeInterface::Other(o) => o.release(),
        }
    }
}

impl fmt::Debug for NativeInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeInterface::DeviceContext(c) => f.debug_tuple("DeviceContext").field(c).finish(),
            NativeInterface::CommandList(l) => f
                .debug_tuple("CommandList")
                .field(&format_args!("{:#x}", l.handle()))
                .finish(),
            NativeInterface::Other(_) => f.write_str("Other(..)"),
        }
    }
}
