//! Normalized, version-independent event payloads.

use crate::handle::{
    CommandListHandle, ContextHandle, DeviceHandle, PipelineHandle, ResourceHandle,
    ResourceViewHandle, SamplerHandle,
};
use crate::types::{
    ClearFlags, DescriptorType, DynamicState, Format, IndirectCommand, PipelineType,
    ScissorRect, ShaderStage, SubresourceBox, SubresourceData, TextureFilter, Viewport,
};

/// Every event kind an observer can subscribe to.
///
/// The discriminant doubles as the bit index in the registry's "anyone listening" mask, so the
/// enumeration must stay below 64 entries.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    BindPipeline,
    BindPipelineStates,
    BindViewports,
    BindScissorRects,
    BindIndexBuffer,
    BindVertexBuffers,
    PushDescriptors,
    BeginRenderPass,
    FinishRenderPass,
    Draw,
    DrawIndexed,
    DrawOrDispatchIndirect,
    Dispatch,
    CopyResource,
    CopyBufferRegion,
    CopyTextureRegion,
    ResolveTextureRegion,
    UploadBufferRegion,
    UploadTextureRegion,
    ClearRenderTargetViews,
    ClearDepthStencilView,
    ClearUnorderedAccessViewUint,
    ClearUnorderedAccessViewFloat,
    ExecuteCommandList,
    ExecuteSecondaryCommandList,
}

impl EventKind {
    pub const COUNT: usize = 25;

    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::BindPipeline,
        EventKind::BindPipelineStates,
        EventKind::BindViewports,
        EventKind::BindScissorRects,
        EventKind::BindIndexBuffer,
        EventKind::BindVertexBuffers,
        EventKind::PushDescriptors,
        EventKind::BeginRenderPass,
        EventKind::FinishRenderPass,
        EventKind::Draw,
        EventKind::DrawIndexed,
        EventKind::DrawOrDispatchIndirect,
        EventKind::Dispatch,
        EventKind::CopyResource,
        EventKind::CopyBufferRegion,
        EventKind::CopyTextureRegion,
        EventKind::ResolveTextureRegion,
        EventKind::UploadBufferRegion,
        EventKind::UploadTextureRegion,
        EventKind::ClearRenderTargetViews,
        EventKind::ClearDepthStencilView,
        EventKind::ClearUnorderedAccessViewUint,
        EventKind::ClearUnorderedAccessViewFloat,
        EventKind::ExecuteCommandList,
        EventKind::ExecuteSecondaryCommandList,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub(crate) const fn mask_bit(self) -> u64 {
        1u64 << (self as u8)
    }

    /// Whether the event fires before the native call and may veto it.
    ///
    /// For every other kind the native call has already executed (or is not vetoable) and the
    /// observer's [`Verdict`] is ignored.
    pub const fn is_suppressible(self) -> bool {
        matches!(
            self,
            EventKind::Draw
                | EventKind::DrawIndexed
                | EventKind::DrawOrDispatchIndirect
                | EventKind::Dispatch
                | EventKind::CopyResource
                | EventKind::CopyBufferRegion
                | EventKind::CopyTextureRegion
                | EventKind::ResolveTextureRegion
                | EventKind::UploadBufferRegion
                | EventKind::UploadTextureRegion
                | EventKind::ClearRenderTargetViews
                | EventKind::ClearDepthStencilView
                | EventKind::ClearUnorderedAccessViewUint
                | EventKind::ClearUnorderedAccessViewFloat
        )
    }
}

const _: () = assert!(EventKind::COUNT <= 64);
const _: () = assert!(EventKind::ExecuteSecondaryCommandList as usize + 1 == EventKind::COUNT);

/// Object an event is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventSource {
    Context(ContextHandle),
    /// Initial-data style writes are attributed to the device rather than the recording context.
    Device(DeviceHandle),
    CommandList(CommandListHandle),
}

/// An observer's answer to a suppressible event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Verdict {
    #[default]
    Proceed,
    /// Skip the native call. The intercepted operation still reports success.
    Suppress,
}

/// Descriptor array of a [`Event::PushDescriptors`] event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Descriptors<'a> {
    Samplers(&'a [SamplerHandle]),
    ShaderResourceViews(&'a [ResourceViewHandle]),
    UnorderedAccessViews(&'a [ResourceViewHandle]),
    ConstantBuffers(&'a [ResourceHandle]),
}

impl Descriptors<'_> {
    pub fn descriptor_type(&self) -> DescriptorType {
        match self {
            Descriptors::Samplers(_) => DescriptorType::Sampler,
            Descriptors::ShaderResourceViews(_) => DescriptorType::ShaderResourceView,
            Descriptors::UnorderedAccessViews(_) => DescriptorType::UnorderedAccessView,
            Descriptors::ConstantBuffers(_) => DescriptorType::ConstantBuffer,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Descriptors::Samplers(v) => v.len(),
            Descriptors::ShaderResourceViews(v) | Descriptors::UnorderedAccessViews(v) => v.len(),
            Descriptors::ConstantBuffers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A normalized event. Slices borrow the caller's argument memory and are only valid for the
/// duration of the publish call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event<'a> {
    BindPipeline {
        ty: PipelineType,
        pipeline: PipelineHandle,
    },
    BindPipelineStates {
        states: &'a [DynamicState],
        values: &'a [u32],
    },
    BindViewports {
        first: u32,
        viewports: &'a [Viewport],
    },
    BindScissorRects {
        first: u32,
        rects: &'a [ScissorRect],
    },
    BindIndexBuffer {
        buffer: ResourceHandle,
        offset: u64,
        /// Bytes per index; `0` when the index buffer is unbound.
        index_size: u32,
    },
    BindVertexBuffers {
        first: u32,
        buffers: &'a [ResourceHandle],
        offsets: &'a [u64],
        strides: &'a [u32],
    },
    PushDescriptors {
        stages: ShaderStage,
        first: u32,
        descriptors: Descriptors<'a>,
    },
    BeginRenderPass {
        render_targets: &'a [ResourceViewHandle],
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
        /// Byte count, or [`crate::WHOLE_SIZE`] for the rest of the source buffer.
        size: u64,
    },
    CopyTextureRegion {
        source: ResourceHandle,
        source_subresource: u32,
        source_box: Option<SubresourceBox>,
        dest: ResourceHandle,
        dest_subresource: u32,
        dest_box: Option<SubresourceBox>,
        filter: TextureFilter,
    },
    ResolveTextureRegion {
        source: ResourceHandle,
        source_subresource: u32,
        source_box: Option<SubresourceBox>,
        dest: ResourceHandle,
        dest_subresource: u32,
        dest_offset: Option<[i32; 3]>,
        format: Format,
    },
    UploadBufferRegion {
        data: &'a [u8],
        dest: ResourceHandle,
        dest_offset: u64,
        size: u64,
    },
    UploadTextureRegion {
        data: SubresourceData<'a>,
        dest: ResourceHandle,
        dest_subresource: u32,
        dest_box: Option<SubresourceBox>,
    },
    ClearRenderTargetViews {
        views: &'a [ResourceViewHandle],
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
        list: CommandListHandle,
    },
    /// A deferred context finished recording `list`; fired with the list as the event source.
    ExecuteSecondaryCommandList {
        list: CommandListHandle,
        recording_context: ContextHandle,
    },
}

impl Event<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::BindPipeline { .. } => EventKind::BindPipeline,
            Event::BindPipelineStates { .. } => EventKind::BindPipelineStates,
            Event::BindViewports { .. } => EventKind::BindViewports,
            Event::BindScissorRects { .. } => EventKind::BindScissorRects,
            Event::BindIndexBuffer { .. } => EventKind::BindIndexBuffer,
            Event::BindVertexBuffers { .. } => EventKind::BindVertexBuffers,
            Event::PushDescriptors { .. } => EventKind::PushDescriptors,
            Event::BeginRenderPass { .. } => EventKind::BeginRenderPass,
            Event::FinishRenderPass => EventKind::FinishRenderPass,
            Event::Draw { .. } => EventKind::Draw,
            Event::DrawIndexed { .. } => EventKind::DrawIndexed,
            Event::DrawOrDispatchIndirect { .. } => EventKind::DrawOrDispatchIndirect,
            Event::Dispatch { .. } => EventKind::Dispatch,
            Event::CopyResource { .. } => EventKind::CopyResource,
            Event::CopyBufferRegion { .. } => EventKind::CopyBufferRegion,
            Event::CopyTextureRegion { .. } => EventKind::CopyTextureRegion,
            Event::ResolveTextureRegion { .. } => EventKind::ResolveTextureRegion,
            Event::UploadBufferRegion { .. } => EventKind::UploadBufferRegion,
            Event::UploadTextureRegion { .. } => EventKind::UploadTextureRegion,
            Event::ClearRenderTargetViews { .. } => EventKind::ClearRenderTargetViews,
            Event::ClearDepthStencilView { .. } => EventKind::ClearDepthStencilView,
            Event::ClearUnorderedAccessViewUint { .. } => EventKind::ClearUnorderedAccessViewUint,
            Event::ClearUnorderedAccessViewFloat { .. } => {
                EventKind::ClearUnorderedAccessViewFloat
            }
            Event::ExecuteCommandList { .. } => EventKind::ExecuteCommandList,
            Event::ExecuteSecondaryCommandList { .. } => EventKind::ExecuteSecondaryCommandList,
        }
    }
}
