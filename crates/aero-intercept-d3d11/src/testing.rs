//! A simulated native driver for exercising proxies without a GPU.
//!
//! [`FakeDriver`] hands out native context objects at any revision up to a configured maximum.
//! All revisions of one driver share a single COM-style reference count, a call log and a small
//! object table used to answer introspection queries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aero_intercept_api::{
    ClearFlags, Descriptors, DeviceHandle, DynamicState, Event, EventKind, EventRegistry,
    EventSource, Format, IndirectCommand, Observer, PipelineHandle, PipelineType,
    ResourceHandle, ResourceViewHandle, SamplerHandle, ScissorRect, ShaderStage, SubresourceBox,
    Verdict, Viewport,
};

use crate::device::ProxyDevice;
use crate::guid::{iid, Guid};
use crate::hresult::HResult;
use crate::native::*;
use crate::revision::ContextRevision;

/// Interface identifier the fake driver answers with a non-context object.
pub const FOREIGN_IID: Guid = Guid::from_u128(0x9b7e4c84_5a1f_4c3e_8a30_4f2d1e6c7b90);

const COMMAND_LIST_BASE: usize = 0xC0_0000;

#[derive(Default)]
struct Objects {
    dimensions: HashMap<usize, ResourceDimension>,
    view_kinds: HashMap<usize, Guid>,
    uavs: HashMap<usize, UnorderedAccessViewInfo>,
}

#[derive(Default)]
struct Bindings {
    render_targets: Vec<RenderTargetView>,
    depth_stencil: DepthStencilView,
    topology: PrimitiveTopology,
}

struct CommandListState {
    handle: usize,
    refs: AtomicU32,
}

struct DriverState {
    max_revision: ContextRevision,
    context_type: DeviceContextType,
    refs: AtomicU32,
    calls: Mutex<Vec<&'static str>>,
    objects: Mutex<Objects>,
    bindings: Mutex<Bindings>,
    refuse_upgrades: AtomicBool,
    answer_upgrades_with_foreign: AtomicBool,
    command_lists: Mutex<Vec<Arc<CommandListState>>>,
    executed_lists: Mutex<Vec<usize>>,
    next_list: AtomicUsize,
}

impl DriverState {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Simulated driver. Cloning shares the underlying state.
#[derive(Clone)]
pub struct FakeDriver {
    state: Arc<DriverState>,
}

impl FakeDriver {
    /// An immediate context that supports revisions up to `max_revision`.
    pub fn new(max_revision: ContextRevision) -> Self {
        Self::with_type(max_revision, DeviceContextType::Immediate)
    }

    pub fn deferred(max_revision: ContextRevision) -> Self {
        Self::with_type(max_revision, DeviceContextType::Deferred)
    }

    fn with_type(max_revision: ContextRevision, context_type: DeviceContextType) -> Self {
        Self {
            state: Arc::new(DriverState {
                max_revision,
                context_type,
                refs: AtomicU32::new(0),
                calls: Mutex::new(Vec::new()),
                objects: Mutex::new(Objects::default()),
                bindings: Mutex::new(Bindings::default()),
                refuse_upgrades: AtomicBool::new(false),
                answer_upgrades_with_foreign: AtomicBool::new(false),
                command_lists: Mutex::new(Vec::new()),
                executed_lists: Mutex::new(Vec::new()),
                next_list: AtomicUsize::new(0),
            }),
        }
    }

    /// Creates the native context at `revision`, carrying one reference for the caller.
    pub fn create_context(&self, revision: ContextRevision) -> NativeContext {
        assert!(revision <= self.state.max_revision);
        self.state.refs.fetch_add(1, Ordering::AcqRel);
        self.context_at(revision)
    }

    fn context_at(&self, revision: ContextRevision) -> NativeContext {
        let context = FakeContext {
            state: Arc::clone(&self.state),
        };
        match revision {
            ContextRevision::Base => NativeContext::Revision0(Box::new(context)),
            ContextRevision::Rev1 => NativeContext::Revision1(Box::new(context)),
            ContextRevision::Rev2 => NativeContext::Revision2(Box::new(context)),
            ContextRevision::Rev3 => NativeContext::Revision3(Box::new(context)),
            ContextRevision::Rev4 => NativeContext::Revision4(Box::new(context)),
        }
    }

    /// Reference count of the native context object, shared by all of its revisions.
    pub fn native_ref_count(&self) -> u32 {
        self.state.refs.load(Ordering::Acquire)
    }

    /// Forwarded calls, oldest first.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == call)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.calls.lock().unwrap().clear();
    }

    pub fn set_resource_dimension(&self, resource: Resource, dimension: ResourceDimension) {
        let mut objects = self.state.objects.lock().unwrap();
        objects.dimensions.insert(resource.0, dimension);
    }

    /// Declares `view` to implement the view interface `kind`.
    pub fn set_view_kind(&self, view: View, kind: Guid) {
        let mut objects = self.state.objects.lock().unwrap();
        objects.view_kinds.insert(view.0, kind);
    }

    pub fn set_unordered_access_view_info(
        &self,
        view: UnorderedAccessView,
        info: UnorderedAccessViewInfo,
    ) {
        let mut objects = self.state.objects.lock().unwrap();
        objects.uavs.insert(view.0, info);
    }

    /// Makes queries for newer context revisions fail with `E_NOINTERFACE`.
    pub fn refuse_upgrades(&self, refuse: bool) {
        self.state.refuse_upgrades.store(refuse, Ordering::Release);
    }

    /// Makes queries for newer context revisions succeed with a non-context object.
    pub fn answer_upgrades_with_foreign(&self, misbehave: bool) {
        self.state
            .answer_upgrades_with_foreign
            .store(misbehave, Ordering::Release);
    }

    /// Native command lists that still hold references.
    pub fn live_command_lists(&self) -> usize {
        self.state
            .command_lists
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.refs.load(Ordering::Acquire) != 0)
            .count()
    }

    /// Native handles of the command lists passed to `execute_command_list`, in order.
    pub fn executed_lists(&self) -> Vec<usize> {
        self.state.executed_lists.lock().unwrap().clone()
    }

    pub fn bound_topology(&self) -> PrimitiveTopology {
        self.state.bindings.lock().unwrap().topology
    }
}

struct FakeContext {
    state: Arc<DriverState>,
}

impl FakeContext {
    fn record(&self, call: &'static str) {
        self.state.record(call);
    }

    fn driver(&self) -> FakeDriver {
        FakeDriver {
            state: Arc::clone(&self.state),
        }
    }
}

/// A non-context interface of the same native object.
struct ForeignInterface {
    state: Arc<DriverState>,
}

impl Unknown for ForeignInterface {
    fn add_ref(&self) -> u32 {
        self.state.refs.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn release(&self) -> u32 {
        self.state.refs.fetch_sub(1, Ordering::AcqRel) - 1
    }

    fn query_interface(&self, _iid: &Guid) -> Result<NativeInterface, HResult> {
        Err(HResult::E_NOINTERFACE)
    }
}

struct FakeCommandList {
    list: Arc<CommandListState>,
}

impl Unknown for FakeCommandList {
    fn add_ref(&self) -> u32 {
        self.list.refs.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn release(&self) -> u32 {
        self.list.refs.fetch_sub(1, Ordering::AcqRel) - 1
    }

    fn query_interface(&self, iid: &Guid) -> Result<NativeInterface, HResult> {
        if *iid == iid::ID3D11_COMMAND_LIST || *iid == iid::IUNKNOWN {
            self.add_ref();
            Ok(NativeInterface::CommandList(Box::new(FakeCommandList {
                list: Arc::clone(&self.list),
            })))
        } else {
            Err(HResult::E_NOINTERFACE)
        }
    }
}

impl NativeCommandList for FakeCommandList {
    fn handle(&self) -> usize {
        self.list.handle
    }

    fn context_flags(&self) -> u32 {
        0
    }
}

impl Unknown for FakeContext {
    fn add_ref(&self) -> u32 {
        self.state.refs.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn release(&self) -> u32 {
        let previous = self.state.refs.fetch_sub(1, Ordering::AcqRel);
        assert!(previous != 0, "native device context over-released");
        previous - 1
    }

    fn query_interface(&self, requested: &Guid) -> Result<NativeInterface, HResult> {
        self.record("query_interface");
        if let Some(revision) = ContextRevision::from_iid(requested) {
            if revision > self.state.max_revision
                || self.state.refuse_upgrades.load(Ordering::Acquire)
            {
                return Err(HResult::E_NOINTERFACE);
            }
            self.add_ref();
            if self.state.answer_upgrades_with_foreign.load(Ordering::Acquire) {
                return Ok(NativeInterface::Other(Box::new(ForeignInterface {
                    state: Arc::clone(&self.state),
                })));
            }
            return Ok(NativeInterface::DeviceContext(self.driver().context_at(revision)));
        }
        if *requested == FOREIGN_IID {
            self.add_ref();
            return Ok(NativeInterface::Other(Box::new(ForeignInterface {
                state: Arc::clone(&self.state),
            })));
        }
        Err(HResult::E_NOINTERFACE)
    }
}

impl ObjectQuery for FakeContext {
    fn resource_dimension(&self, resource: Resource) -> ResourceDimension {
        self.record("resource_dimension");
        let objects = self.state.objects.lock().unwrap();
        objects
            .dimensions
            .get(&resource.0)
            .copied()
            .unwrap_or(ResourceDimension::Unknown)
    }

    fn view_as(&self, view: View, kind: &Guid) -> Option<View> {
        self.record("view_as");
        let objects = self.state.objects.lock().unwrap();
        (objects.view_kinds.get(&view.0) == Some(kind)).then_some(view)
    }

    fn unordered_access_view_info(&self, view: UnorderedAccessView) -> UnorderedAccessViewInfo {
        self.record("unordered_access_view_info");
        let objects = self.state.objects.lock().unwrap();
        objects.uavs.get(&view.0).copied().unwrap_or(UnorderedAccessViewInfo {
            resource: Resource::NULL,
            format: Format::UNKNOWN,
            dimension: UavDimension::Texture2D,
        })
    }
}

impl DeviceContext for FakeContext {
    type CommandList = Box<dyn NativeCommandList>;

    fn get_private_data(&self, _guid: &Guid, _data: &mut [u8]) -> Result<usize, HResult> {
        self.record("get_private_data");
        Err(HResult::DXGI_ERROR_NOT_FOUND)
    }

    fn set_private_data(&self, _guid: &Guid, _data: Option<&[u8]>) -> HResult {
        self.record("set_private_data");
        HResult::S_OK
    }

    fn set_private_data_interface(&self, _guid: &Guid, _data: Option<&dyn Unknown>) -> HResult {
        self.record("set_private_data_interface");
        HResult::S_OK
    }

    fn set_constant_buffers(&self, _stage: Stage, _start_slot: u32, _buffers: &[Buffer]) {
        self.record("set_constant_buffers");
    }

    fn get_constant_buffers(&self, _stage: Stage, _start_slot: u32, buffers: &mut [Buffer]) {
        self.record("get_constant_buffers");
        buffers.fill(Buffer::NULL);
    }

    fn set_shader_resources(&self, _stage: Stage, _start_slot: u32, _views: &[ShaderResourceView]) {
        self.record("set_shader_resources");
    }

    fn get_shader_resources(
        &self,
        _stage: Stage,
        _start_slot: u32,
        views: &mut [ShaderResourceView],
    ) {
        self.record("get_shader_resources");
        views.fill(ShaderResourceView::NULL);
    }

    fn set_samplers(&self, _stage: Stage, _start_slot: u32, _samplers: &[SamplerState]) {
        self.record("set_samplers");
    }

    fn get_samplers(&self, _stage: Stage, _start_slot: u32, samplers: &mut [SamplerState]) {
        self.record("get_samplers");
        samplers.fill(SamplerState::NULL);
    }

    fn set_shader(&self, _stage: Stage, _shader: Shader, _class_instances: &[ClassInstance]) {
        self.record("set_shader");
    }

    fn get_shader(&self, _stage: Stage, _class_instances: &mut [ClassInstance]) -> (Shader, u32) {
        self.record("get_shader");
        (Shader::NULL, 0)
    }

    fn draw(&self, _vertex_count: u32, _start_vertex: u32) {
        self.record("draw");
    }

    fn draw_indexed(&self, _index_count: u32, _start_index: u32, _base_vertex: i32) {
        self.record("draw_indexed");
    }

    fn draw_instanced(&self, _: u32, _: u32, _: u32, _: u32) {
        self.record("draw_instanced");
    }

    fn draw_indexed_instanced(&self, _: u32, _: u32, _: u32, _: i32, _: u32) {
        self.record("draw_indexed_instanced");
    }

    fn draw_auto(&self) {
        self.record("draw_auto");
    }

    fn draw_instanced_indirect(&self, _args: Buffer, _aligned_byte_offset: u32) {
        self.record("draw_instanced_indirect");
    }

    fn draw_indexed_instanced_indirect(&self, _args: Buffer, _aligned_byte_offset: u32) {
        self.record("draw_indexed_instanced_indirect");
    }

    fn dispatch(&self, _x: u32, _y: u32, _z: u32) {
        self.record("dispatch");
    }

    fn dispatch_indirect(&self, _args: Buffer, _aligned_byte_offset: u32) {
        self.record("dispatch_indirect");
    }

    fn map(
        &self,
        _resource: Resource,
        _subresource: u32,
        _map_type: MapType,
        flags: MapFlags,
    ) -> Result<MappedSubresource, HResult> {
        self.record("map");
        if flags.contains(MapFlags::DO_NOT_WAIT) {
            return Err(HResult::DXGI_ERROR_WAS_STILL_DRAWING);
        }
        Ok(MappedSubresource {
            address: 0x1000,
            row_pitch: 256,
            depth_pitch: 256,
        })
    }

    fn unmap(&self, _resource: Resource, _subresource: u32) {
        self.record("unmap");
    }

    fn ia_set_input_layout(&self, _layout: InputLayout) {
        self.record("ia_set_input_layout");
    }

    fn ia_get_input_layout(&self) -> InputLayout {
        self.record("ia_get_input_layout");
        InputLayout::NULL
    }

    fn ia_set_vertex_buffers(&self, _: u32, _: &[Buffer], _: &[u32], _: &[u32]) {
        self.record("ia_set_vertex_buffers");
    }

    fn ia_get_vertex_buffers(
        &self,
        _: u32,
        buffers: &mut [Buffer],
        strides: &mut [u32],
        offsets: &mut [u32],
    ) {
        self.record("ia_get_vertex_buffers");
        buffers.fill(Buffer::NULL);
        strides.fill(0);
        offsets.fill(0);
    }

    fn ia_set_index_buffer(&self, _buffer: Buffer, _format: Format, _offset: u32) {
        self.record("ia_set_index_buffer");
    }

    fn ia_get_index_buffer(&self) -> (Buffer, Format, u32) {
        self.record("ia_get_index_buffer");
        (Buffer::NULL, Format::UNKNOWN, 0)
    }

    fn ia_set_primitive_topology(&self, topology: PrimitiveTopology) {
        self.record("ia_set_primitive_topology");
        self.state.bindings.lock().unwrap().topology = topology;
    }

    fn ia_get_primitive_topology(&self) -> PrimitiveTopology {
        self.record("ia_get_primitive_topology");
        self.state.bindings.lock().unwrap().topology
    }

    fn begin(&self, _query: Asynchronous) {
        self.record("begin");
    }

    fn end(&self, _query: Asynchronous) {
        self.record("end");
    }

    fn get_data(&self, _query: Asynchronous, data: &mut [u8], _flags: u32) -> HResult {
        self.record("get_data");
        data.fill(0);
        HResult::S_OK
    }

    fn set_predication(&self, _predicate: Predicate, _value: bool) {
        self.record("set_predication");
    }

    fn get_predication(&self) -> (Predicate, bool) {
        self.record("get_predication");
        (Predicate::NULL, false)
    }

    fn om_set_render_targets(
        &self,
        render_targets: &[RenderTargetView],
        depth_stencil: DepthStencilView,
    ) {
        self.record("om_set_render_targets");
        let mut bindings = self.state.bindings.lock().unwrap();
        bindings.render_targets = render_targets.to_vec();
        bindings.depth_stencil = depth_stencil;
    }

    fn om_set_render_targets_and_unordered_access_views(
        &self,
        render_targets: Option<(&[RenderTargetView], DepthStencilView)>,
        _uav_start_slot: u32,
        _uavs: Option<&[UnorderedAccessView]>,
        _initial_counts: Option<&[u32]>,
    ) {
        self.record("om_set_render_targets_and_unordered_access_views");
        if let Some((render_targets, depth_stencil)) = render_targets {
            let mut bindings = self.state.bindings.lock().unwrap();
            bindings.render_targets = render_targets.to_vec();
            bindings.depth_stencil = depth_stencil;
        }
    }

    fn om_get_render_targets(&self, render_targets: &mut [RenderTargetView]) -> DepthStencilView {
        self.record("om_get_render_targets");
        let bindings = self.state.bindings.lock().unwrap();
        for (i, slot) in render_targets.iter_mut().enumerate() {
            *slot = bindings
                .render_targets
                .get(i)
                .copied()
                .unwrap_or(RenderTargetView::NULL);
        }
        bindings.depth_stencil
    }

    fn om_get_render_targets_and_unordered_access_views(
        &self,
        render_targets: &mut [RenderTargetView],
        _uav_start_slot: u32,
        uavs: &mut [UnorderedAccessView],
    ) -> DepthStencilView {
        uavs.fill(UnorderedAccessView::NULL);
        self.om_get_render_targets(render_targets)
    }

    fn om_set_blend_state(
        &self,
        _state: BlendState,
        _blend_factor: Option<&[f32; 4]>,
        _sample_mask: u32,
    ) {
        self.record("om_set_blend_state");
    }

    fn om_get_blend_state(&self) -> (BlendState, [f32; 4], u32) {
        self.record("om_get_blend_state");
        (BlendState::NULL, [1.0; 4], u32::MAX)
    }

    fn om_set_depth_stencil_state(&self, _state: DepthStencilState, _stencil_ref: u32) {
        self.record("om_set_depth_stencil_state");
    }

    fn om_get_depth_stencil_state(&self) -> (DepthStencilState, u32) {
        self.record("om_get_depth_stencil_state");
        (DepthStencilState::NULL, 0)
    }

    fn so_set_targets(&self, _targets: &[Buffer], _offsets: &[u32]) {
        self.record("so_set_targets");
    }

    fn so_get_targets(&self, targets: &mut [Buffer]) {
        self.record("so_get_targets");
        targets.fill(Buffer::NULL);
    }

    fn rs_set_state(&self, _state: RasterizerState) {
        self.record("rs_set_state");
    }

    fn rs_get_state(&self) -> RasterizerState {
        self.record("rs_get_state");
        RasterizerState::NULL
    }

    fn rs_set_viewports(&self, _viewports: &[Viewport]) {
        self.record("rs_set_viewports");
    }

    fn rs_get_viewports(&self, _viewports: &mut [Viewport]) -> u32 {
        self.record("rs_get_viewports");
        0
    }

    fn rs_set_scissor_rects(&self, _rects: &[Rect]) {
        self.record("rs_set_scissor_rects");
    }

    fn rs_get_scissor_rects(&self, _rects: &mut [Rect]) -> u32 {
        self.record("rs_get_scissor_rects");
        0
    }

    fn copy_subresource_region(
        &self,
        _: Resource,
        _: u32,
        _: u32,
        _: u32,
        _: u32,
        _: Resource,
        _: u32,
        _: Option<&Box3>,
    ) {
        self.record("copy_subresource_region");
    }

    fn copy_resource(&self, _dst: Resource, _src: Resource) {
        self.record("copy_resource");
    }

    fn update_subresource(&self, _: Resource, _: u32, _: Option<&Box3>, _: &[u8], _: u32, _: u32) {
        self.record("update_subresource");
    }

    fn copy_structure_count(&self, _dst: Buffer, _offset: u32, _src: UnorderedAccessView) {
        self.record("copy_structure_count");
    }

    fn clear_render_target_view(&self, _view: RenderTargetView, _color: &[f32; 4]) {
        self.record("clear_render_target_view");
    }

    fn clear_unordered_access_view_uint(&self, _view: UnorderedAccessView, _values: &[u32; 4]) {
        self.record("clear_unordered_access_view_uint");
    }

    fn clear_unordered_access_view_float(&self, _view: UnorderedAccessView, _values: &[f32; 4]) {
        self.record("clear_unordered_access_view_float");
    }

    fn clear_depth_stencil_view(
        &self,
        _view: DepthStencilView,
        _flags: ClearFlag,
        _depth: f32,
        _stencil: u8,
    ) {
        self.record("clear_depth_stencil_view");
    }

    fn generate_mips(&self, _view: ShaderResourceView) {
        self.record("generate_mips");
    }

    fn set_resource_min_lod(&self, _resource: Resource, _min_lod: f32) {
        self.record("set_resource_min_lod");
    }

    fn get_resource_min_lod(&self, _resource: Resource) -> f32 {
        self.record("get_resource_min_lod");
        0.0
    }

    fn resolve_subresource(&self, _: Resource, _: u32, _: Resource, _: u32, _: Format) {
        self.record("resolve_subresource");
    }

    #[allow(clippy::borrowed_box)]
    fn execute_command_list(
        &self,
        list: &Box<dyn NativeCommandList>,
        _restore_context_state: bool,
    ) {
        self.record("execute_command_list");
        self.state.executed_lists.lock().unwrap().push(list.handle());
    }

    fn finish_command_list(&self, _restore: bool) -> Result<Box<dyn NativeCommandList>, HResult> {
        self.record("finish_command_list");
        if self.state.context_type != DeviceContextType::Deferred {
            return Err(HResult::DXGI_ERROR_INVALID_CALL);
        }
        let index = self.state.next_list.fetch_add(1, Ordering::Relaxed);
        let list = Arc::new(CommandListState {
            handle: COMMAND_LIST_BASE + index * 0x100,
            refs: AtomicU32::new(1),
        });
        self.state.command_lists.lock().unwrap().push(Arc::clone(&list));
        Ok(Box::new(FakeCommandList { list }))
    }

    fn cs_set_unordered_access_views(&self, _: u32, _: &[UnorderedAccessView], _: Option<&[u32]>) {
        self.record("cs_set_unordered_access_views");
    }

    fn cs_get_unordered_access_views(&self, _start_slot: u32, uavs: &mut [UnorderedAccessView]) {
        self.record("cs_get_unordered_access_views");
        uavs.fill(UnorderedAccessView::NULL);
    }

    fn clear_state(&self) {
        self.record("clear_state");
        *self.state.bindings.lock().unwrap() = Bindings::default();
    }

    fn flush(&self) {
        self.record("flush");
    }

    fn get_type(&self) -> DeviceContextType {
        self.state.context_type
    }

    fn get_context_flags(&self) -> u32 {
        0
    }
}

impl DeviceContext1 for FakeContext {
    fn copy_subresource_region1(
        &self,
        _: Resource,
        _: u32,
        _: u32,
        _: u32,
        _: u32,
        _: Resource,
        _: u32,
        _: Option<&Box3>,
        _: CopyFlags,
    ) {
        self.record("copy_subresource_region1");
    }

    fn update_subresource1(
        &self,
        _: Resource,
        _: u32,
        _: Option<&Box3>,
        _: &[u8],
        _: u32,
        _: u32,
        _: CopyFlags,
    ) {
        self.record("update_subresource1");
    }

    fn discard_resource(&self, _resource: Resource) {
        self.record("discard_resource");
    }

    fn discard_view(&self, _view: View) {
        self.record("discard_view");
    }

    fn discard_view1(&self, _view: View, _rects: &[Rect]) {
        self.record("discard_view1");
    }

    fn set_constant_buffers1(
        &self,
        _: Stage,
        _: u32,
        _: &[Buffer],
        _: Option<&[u32]>,
        _: Option<&[u32]>,
    ) {
        self.record("set_constant_buffers1");
    }

    fn get_constant_buffers1(
        &self,
        _stage: Stage,
        _start_slot: u32,
        buffers: &mut [Buffer],
        first_constant: Option<&mut [u32]>,
        num_constants: Option<&mut [u32]>,
    ) {
        self.record("get_constant_buffers1");
        buffers.fill(Buffer::NULL);
        if let Some(first_constant) = first_constant {
            first_constant.fill(0);
        }
        if let Some(num_constants) = num_constants {
            num_constants.fill(4096);
        }
    }

    fn swap_device_context_state(&self, _state: DeviceContextState) -> DeviceContextState {
        self.record("swap_device_context_state");
        DeviceContextState::NULL
    }

    fn clear_view(&self, _view: View, _color: &[f32; 4], _rects: &[Rect]) {
        self.record("clear_view");
    }
}

impl DeviceContext2 for FakeContext {
    fn update_tile_mappings(
        &self,
        _: Resource,
        _: &[TiledResourceCoordinate],
        _: &[TileRegionSize],
        _: Buffer,
        _: &[u32],
        _: &[u32],
        _: &[u32],
        _: u32,
    ) -> HResult {
        self.record("update_tile_mappings");
        HResult::S_OK
    }

    fn copy_tile_mappings(
        &self,
        _: Resource,
        _: &TiledResourceCoordinate,
        _: Resource,
        _: &TiledResourceCoordinate,
        _: &TileRegionSize,
        _: u32,
    ) -> HResult {
        self.record("copy_tile_mappings");
        HResult::S_OK
    }

    fn copy_tiles(
        &self,
        _: Resource,
        _: &TiledResourceCoordinate,
        _: &TileRegionSize,
        _: Buffer,
        _: u64,
        _: u32,
    ) {
        self.record("copy_tiles");
    }

    fn update_tiles(
        &self,
        _: Resource,
        _: &TiledResourceCoordinate,
        _: &TileRegionSize,
        _: &[u8],
        _: u32,
    ) {
        self.record("update_tiles");
    }

    fn resize_tile_pool(&self, _tile_pool: Buffer, _new_size: u64) -> HResult {
        self.record("resize_tile_pool");
        HResult::S_OK
    }

    fn tiled_resource_barrier(&self, _before: DeviceChild, _after: DeviceChild) {
        self.record("tiled_resource_barrier");
    }

    fn is_annotation_enabled(&self) -> bool {
        self.record("is_annotation_enabled");
        false
    }

    fn set_marker_int(&self, _label: &str, _data: i32) {
        self.record("set_marker_int");
    }

    fn begin_event_int(&self, _label: &str, _data: i32) {
        self.record("begin_event_int");
    }

    fn end_event(&self) {
        self.record("end_event");
    }
}

impl DeviceContext3 for FakeContext {
    fn flush1(&self, _context_type: DeviceContextType, _event: EventHandle) {
        self.record("flush1");
    }

    fn set_hardware_protection_state(&self, _enable: bool) {
        self.record("set_hardware_protection_state");
    }

    fn get_hardware_protection_state(&self) -> bool {
        self.record("get_hardware_protection_state");
        false
    }
}

impl DeviceContext4 for FakeContext {
    fn signal(&self, _fence: Fence, _value: u64) -> HResult {
        self.record("signal");
        HResult::S_OK
    }

    fn wait(&self, _fence: Fence, _value: u64) -> HResult {
        self.record("wait");
        HResult::S_OK
    }
}

/// Device stand-in with an observable reference count.
#[derive(Debug)]
pub struct FakeDevice {
    handle: DeviceHandle,
    refs: AtomicU32,
}

impl FakeDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            handle: DeviceHandle(0xD0_0000),
            refs: AtomicU32::new(1),
        })
    }

    pub fn ref_count(&self) -> u32 {
        self.refs.load(Ordering::Acquire)
    }
}

impl ProxyDevice for FakeDevice {
    fn handle(&self) -> DeviceHandle {
        self.handle
    }

    fn add_ref(&self) -> u32 {
        self.refs.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn release(&self) -> u32 {
        self.refs.fetch_sub(1, Ordering::AcqRel) - 1
    }
}

/// Owned copy of an [`Event`], for asserting on after the publish call returned.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    BindPipeline {
        ty: PipelineType,
        pipeline: PipelineHandle,
    },
    BindPipelineStates {
        states: Vec<DynamicState>,
        values: Vec<u32>,
    },
    BindViewports {
        first: u32,
        viewports: Vec<Viewport>,
    },
    BindScissorRects {
        first: u32,
        rects: Vec<ScissorRect>,
    },
    BindIndexBuffer {
        buffer: ResourceHandle,
        offset: u64,
        index_size: u32,
    },
    BindVertexBuffers {
        first: u32,
        buffers: Vec<ResourceHandle>,
        offsets: Vec<u64>,
        strides: Vec<u32>,
    },
    PushSamplers {
        stages: ShaderStage,
        first: u32,
        samplers: Vec<SamplerHandle>,
    },
    PushShaderResourceViews {
        stages: ShaderStage,
        first: u32,
        views: Vec<ResourceViewHandle>,
    },
    PushUnorderedAccessViews {
        stages: ShaderStage,
        first: u32,
        views: Vec<ResourceViewHandle>,
    },
    PushConstantBuffers {
        stages: ShaderStage,
        first: u32,
        buffers: Vec<ResourceHandle>,
    },
    BeginRenderPass {
        render_targets: Vec<ResourceViewHandle>,
        depth_stencil: ResourceViewHandle,
    },
    FinishRenderPass,
    Draw {
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    },
    DrawOrDispatchIndirect {
        command: IndirectCommand,
        buffer: ResourceHandle,
        offset: u64,
        draw_count: u32,
        stride: u32,
    },
    Dispatch {
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    },
    CopyResource {
        source: ResourceHandle,
        dest: ResourceHandle,
    },
    CopyBufferRegion {
        source: ResourceHandle,
        source_offset: u64,
        dest: ResourceHandle,
        dest_offset: u64,
        size: u64,
    },
    CopyTextureRegion {
        source: ResourceHandle,
        source_subresource: u32,
        source_box: Option<SubresourceBox>,
        dest: ResourceHandle,
        dest_subresource: u32,
        dest_box: Option<SubresourceBox>,
    },
    ResolveTextureRegion {
        source: ResourceHandle,
        source_subresource: u32,
        dest: ResourceHandle,
        dest_subresource: u32,
        format: Format,
    },
    UploadBufferRegion {
        data: Vec<u8>,
        dest: ResourceHandle,
        dest_offset: u64,
        size: u64,
    },
    UploadTextureRegion {
        data: Vec<u8>,
        row_pitch: u32,
        slice_pitch: u32,
        dest: ResourceHandle,
        dest_subresource: u32,
        dest_box: Option<SubresourceBox>,
    },
    ClearRenderTargetViews {
        views: Vec<ResourceViewHandle>,
        color: [f32; 4],
    },
    ClearDepthStencilView {
        view: ResourceViewHandle,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    },
    ClearUnorderedAccessViewUint {
        view: ResourceViewHandle,
        values: [u32; 4],
    },
    ClearUnorderedAccessViewFloat {
        view: ResourceViewHandle,
        values: [f32; 4],
    },
    ExecuteCommandList {
        list: aero_intercept_api::CommandListHandle,
    },
    ExecuteSecondaryCommandList {
        list: aero_intercept_api::CommandListHandle,
        recording_context: aero_intercept_api::ContextHandle,
    },
}

impl From<&Event<'_>> for RecordedEvent {
    fn from(event: &Event<'_>) -> Self {
        match *event {
            Event::BindPipeline { ty, pipeline } => RecordedEvent::BindPipeline { ty, pipeline },
            Event::BindPipelineStates { states, values } => RecordedEvent::BindPipelineStates {
                states: states.to_vec(),
                values: values.to_vec(),
            },
            Event::BindViewports { first, viewports } => RecordedEvent::BindViewports {
                first,
                viewports: viewports.to_vec(),
            },
            Event::BindScissorRects { first, rects } => RecordedEvent::BindScissorRects {
                first,
                rects: rects.to_vec(),
            },
            Event::BindIndexBuffer {
                buffer,
                offset,
                index_size,
            } => RecordedEvent::BindIndexBuffer {
                buffer,
                offset,
                index_size,
            },
            Event::BindVertexBuffers {
                first,
                buffers,
                offsets,
                strides,
            } => RecordedEvent::BindVertexBuffers {
                first,
                buffers: buffers.to_vec(),
                offsets: offsets.to_vec(),
                strides: strides.to_vec(),
            },
            Event::PushDescriptors {
                stages,
                first,
                descriptors,
            } => match descriptors {
                Descriptors::Samplers(samplers) => RecordedEvent::PushSamplers {
                    stages,
                    first,
                    samplers: samplers.to_vec(),
                },
                Descriptors::ShaderResourceViews(views) => RecordedEvent::PushShaderResourceViews {
                    stages,
                    first,
                    views: views.to_vec(),
                },
                Descriptors::UnorderedAccessViews(views) => {
                    RecordedEvent::PushUnorderedAccessViews {
                        stages,
                        first,
                        views: views.to_vec(),
                    }
                }
                Descriptors::ConstantBuffers(buffers) => RecordedEvent::PushConstantBuffers {
                    stages,
                    first,
                    buffers: buffers.to_vec(),
                },
            },
            Event::BeginRenderPass {
                render_targets,
                depth_stencil,
            } => RecordedEvent::BeginRenderPass {
                render_targets: render_targets.to_vec(),
                depth_stencil,
            },
            Event::FinishRenderPass => RecordedEvent::FinishRenderPass,
            Event::Draw {
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            } => RecordedEvent::Draw {
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            },
            Event::DrawIndexed {
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            } => RecordedEvent::DrawIndexed {
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            },
            Event::DrawOrDispatchIndirect {
                command,
                buffer,
                offset,
                draw_count,
                stride,
            } => RecordedEvent::DrawOrDispatchIndirect {
                command,
                buffer,
                offset,
                draw_count,
                stride,
            },
            Event::Dispatch {
                group_count_x,
                group_count_y,
                group_count_z,
            } => RecordedEvent::Dispatch {
                group_count_x,
                group_count_y,
                group_count_z,
            },
            Event::CopyResource { source, dest } => RecordedEvent::CopyResource { source, dest },
            Event::CopyBufferRegion {
                source,
                source_offset,
                dest,
                dest_offset,
                size,
            } => RecordedEvent::CopyBufferRegion {
                source,
                source_offset,
                dest,
                dest_offset,
                size,
            },
            Event::CopyTextureRegion {
                source,
                source_subresource,
                source_box,
                dest,
                dest_subresource,
                dest_box,
                filter: _,
            } => RecordedEvent::CopyTextureRegion {
                source,
                source_subresource,
                source_box,
                dest,
                dest_subresource,
                dest_box,
            },
            Event::ResolveTextureRegion {
                source,
                source_subresource,
                dest,
                dest_subresource,
                format,
                ..
            } => RecordedEvent::ResolveTextureRegion {
                source,
                source_subresource,
                dest,
                dest_subresource,
                format,
            },
            Event::UploadBufferRegion {
                data,
                dest,
                dest_offset,
                size,
            } => RecordedEvent::UploadBufferRegion {
                data: data.to_vec(),
                dest,
                dest_offset,
                size,
            },
            Event::UploadTextureRegion {
                data,
                dest,
                dest_subresource,
                dest_box,
            } => RecordedEvent::UploadTextureRegion {
                data: data.data.to_vec(),
                row_pitch: data.row_pitch,
                slice_pitch: data.slice_pitch,
                dest,
                dest_subresource,
                dest_box,
            },
            Event::ClearRenderTargetViews { views, color } => {
                RecordedEvent::ClearRenderTargetViews {
                    views: views.to_vec(),
                    color,
                }
            }
            Event::ClearDepthStencilView {
                view,
                flags,
                depth,
                stencil,
            } => RecordedEvent::ClearDepthStencilView {
                view,
                flags,
                depth,
                stencil,
            },
            Event::ClearUnorderedAccessViewUint { view, values } => {
                RecordedEvent::ClearUnorderedAccessViewUint { view, values }
            }
            Event::ClearUnorderedAccessViewFloat { view, values } => {
                RecordedEvent::ClearUnorderedAccessViewFloat { view, values }
            }
            Event::ExecuteCommandList { list } => RecordedEvent::ExecuteCommandList { list },
            Event::ExecuteSecondaryCommandList {
                list,
                recording_context,
            } => RecordedEvent::ExecuteSecondaryCommandList {
                list,
                recording_context,
            },
        }
    }
}

/// Observer that keeps an owned copy of every event it sees and answers with a fixed verdict
/// per kind.
#[derive(Default)]
pub struct EventRecorder {
    events: Mutex<Vec<(EventSource, RecordedEvent)>>,
    suppress: Mutex<Vec<EventKind>>,
}

impl EventRecorder {
    /// Registers a new recorder for each of `kinds`.
    pub fn attach(registry: &EventRegistry, kinds: &[EventKind]) -> Arc<Self> {
        let recorder = Arc::new(Self::default());
        for &kind in kinds {
            registry.register_arc(kind, Arc::clone(&recorder) as Arc<dyn Observer>);
        }
        recorder
    }

    /// Registers a new recorder for every event kind.
    pub fn attach_all(registry: &EventRegistry) -> Arc<Self> {
        Self::attach(registry, &EventKind::ALL)
    }

    /// Answers future events of `kind` with [`Verdict::Suppress`].
    pub fn suppress(&self, kind: EventKind) {
        self.suppress.lock().unwrap().push(kind);
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn events_with_sources(&self) -> Vec<(EventSource, RecordedEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Observer for EventRecorder {
    fn on_event(&self, source: EventSource, event: &Event<'_>) -> Verdict {
        self.events
            .lock()
            .unwrap()
            .push((source, RecordedEvent::from(event)));
        if self.suppress.lock().unwrap().contains(&event.kind()) {
            Verdict::Suppress
        } else {
            Verdict::Proceed
        }
    }
}
