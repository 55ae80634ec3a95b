//! Event translation shared by several entry points.

use aero_intercept_api::{
    ClearFlags, Descriptors, Event, EventKind, EventSource, ShaderStage, SubresourceData,
    TextureFilter,
};

use super::DeviceContextProxy;
use crate::convert::{
    buffer_copy_range, buffer_upload_range, texture_copy_dest_box, with_api_handles,
    with_wide_offsets,
};
use crate::guid::{iid, Guid};
use crate::limits::{MAX_RENDER_TARGETS, MAX_VERTEX_BUFFERS};
use crate::native::{
    Box3, Buffer, DepthStencilView, NativeHandle, RenderTargetView, Resource, ResourceDimension,
    ToApiHandle, View,
};

impl DeviceContextProxy {
    pub(super) fn source(&self) -> EventSource {
        EventSource::Context(self.handle())
    }

    #[inline]
    pub(super) fn wants(&self, kind: EventKind) -> bool {
        self.events.wants(kind)
    }

    /// Publishes an event that follows the native call. Verdicts are ignored.
    pub(super) fn notify(&self, event: &Event<'_>) {
        self.events.publish(self.source(), event);
    }

    /// Publishes an event that precedes the native call. Returns `true` if the call must be
    /// skipped.
    pub(super) fn suppressed(&self, event: &Event<'_>) -> bool {
        self.suppressed_from(self.source(), event)
    }

    pub(super) fn suppressed_from(&self, source: EventSource, event: &Event<'_>) -> bool {
        let suppressed = self.events.publish(source, event);
        if suppressed {
            self.stats.inc_suppressed_calls();
        }
        suppressed
    }

    /// Closes the render pass opened by the last render-target bind, if any.
    pub(super) fn finish_render_pass(&self) {
        if self.render_pass.close() {
            self.stats.inc_render_passes_finished();
            self.notify(&Event::FinishRenderPass);
        }
    }

    /// Opens a render pass for a new render-target binding. An all-null binding opens nothing.
    pub(super) fn begin_render_pass(
        &self,
        render_targets: &[RenderTargetView],
        depth_stencil: DepthStencilView,
    ) {
        debug_assert!(render_targets.len() <= MAX_RENDER_TARGETS);

        if !self.wants(EventKind::BeginRenderPass)
            || (depth_stencil.is_null() && render_targets.iter().all(|rtv| rtv.is_null()))
        {
            return;
        }

        self.render_pass.open();
        self.stats.inc_render_passes_begun();
        with_api_handles::<MAX_RENDER_TARGETS, _, _>(render_targets, |render_targets| {
            self.notify(&Event::BeginRenderPass {
                render_targets,
                depth_stencil: depth_stencil.to_api(),
            });
        });
    }

    pub(super) fn push_descriptors<const MAX: usize, H>(
        &self,
        stages: ShaderStage,
        first: u32,
        handles: &[H],
        wrap: impl for<'a> FnOnce(&'a [H::Api]) -> Descriptors<'a>,
    ) where
        H: ToApiHandle,
    {
        if !self.wants(EventKind::PushDescriptors) {
            return;
        }
        with_api_handles::<MAX, _, _>(handles, |api| {
            self.notify(&Event::PushDescriptors {
                stages,
                first,
                descriptors: wrap(api),
            });
        });
    }

    pub(super) fn bind_vertex_buffers(
        &self,
        first: u32,
        buffers: &[Buffer],
        strides: &[u32],
        offsets: &[u32],
    ) {
        if !self.wants(EventKind::BindVertexBuffers) {
            return;
        }
        debug_assert_eq!(buffers.len(), strides.len());
        debug_assert_eq!(buffers.len(), offsets.len());

        with_api_handles::<MAX_VERTEX_BUFFERS, _, _>(buffers, |buffers| {
            with_wide_offsets::<MAX_VERTEX_BUFFERS, _>(offsets, |offsets| {
                self.notify(&Event::BindVertexBuffers {
                    first,
                    buffers,
                    offsets,
                    strides,
                });
            });
        });
    }

    /// Translates a subresource region copy into a buffer or texture region event, depending on
    /// the kind of the destination resource.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn copy_region_suppressed(
        &self,
        dst: Resource,
        dst_subresource: u32,
        dst_offset: [u32; 3],
        src: Resource,
        src_subresource: u32,
        src_box: Option<&Box3>,
    ) -> bool {
        let wants_buffer = self.wants(EventKind::CopyBufferRegion);
        let wants_texture = self.wants(EventKind::CopyTextureRegion);
        if !wants_buffer && !wants_texture {
            return false;
        }

        let dimension = self.base(|native| native.resource_dimension(dst));
        if dimension == ResourceDimension::Buffer {
            debug_assert!(src_subresource == 0 && dst_subresource == 0);
            if !wants_buffer {
                return false;
            }
            let (source_offset, size) = buffer_copy_range(src_box);
            self.suppressed(&Event::CopyBufferRegion {
                source: src.to_api(),
                source_offset,
                dest: dst.to_api(),
                dest_offset: u64::from(dst_offset[0]),
                size,
            })
        } else {
            if !wants_texture {
                return false;
            }
            self.suppressed(&Event::CopyTextureRegion {
                source: src.to_api(),
                source_subresource: src_subresource,
                source_box: src_box.map(|b| (*b).into()),
                dest: dst.to_api(),
                dest_subresource: dst_subresource,
                dest_box: texture_copy_dest_box(dst_offset, src_box),
                filter: TextureFilter::MinMagMipPoint,
            })
        }
    }

    /// Translates a subresource update into an upload event attributed to the device.
    pub(super) fn upload_suppressed(
        &self,
        dst: Resource,
        dst_subresource: u32,
        dst_box: Option<&Box3>,
        data: &[u8],
        row_pitch: u32,
        depth_pitch: u32,
    ) -> bool {
        let wants_buffer = self.wants(EventKind::UploadBufferRegion);
        let wants_texture = self.wants(EventKind::UploadTextureRegion);
        if !wants_buffer && !wants_texture {
            return false;
        }

        let source = EventSource::Device(self.device_handle);
        let dimension = self.base(|native| native.resource_dimension(dst));
        if dimension == ResourceDimension::Buffer {
            debug_assert_eq!(dst_subresource, 0);
            if !wants_buffer {
                return false;
            }
            let (dest_offset, size) = buffer_upload_range(dst_box, row_pitch);
            self.suppressed_from(
                source,
                &Event::UploadBufferRegion {
                    data,
                    dest: dst.to_api(),
                    dest_offset,
                    size,
                },
            )
        } else {
            if !wants_texture {
                return false;
            }
            self.suppressed_from(
                source,
                &Event::UploadTextureRegion {
                    data: SubresourceData {
                        data,
                        row_pitch,
                        slice_pitch: depth_pitch,
                    },
                    dest: dst.to_api(),
                    dest_subresource: dst_subresource,
                    dest_box: dst_box.map(|b| (*b).into()),
                },
            )
        }
    }

    /// Routes a generic view clear to the clear event of the view's concrete kind, probing
    /// render target, then depth-stencil, then unordered access.
    pub(super) fn clear_view_suppressed(&self, view: View, color: &[f32; 4]) -> bool {
        let probe = |kind: &Guid| self.base(|native| native.view_as(view, kind));

        if self.wants(EventKind::ClearRenderTargetViews) {
            if let Some(rtv) = probe(&iid::ID3D11_RENDER_TARGET_VIEW) {
                if self.suppressed(&Event::ClearRenderTargetViews {
                    views: &[rtv.to_api()],
                    color: *color,
                }) {
                    return true;
                }
            }
        }
        if self.wants(EventKind::ClearDepthStencilView) {
            if let Some(dsv) = probe(&iid::ID3D11_DEPTH_STENCIL_VIEW) {
                // Only depth-only views can be cleared this way; the stencil part is never touched.
                if self.suppressed(&Event::ClearDepthStencilView {
                    view: dsv.to_api(),
                    flags: ClearFlags::DEPTH,
                    depth: color[0],
                    stencil: 0,
                }) {
                    return true;
                }
            }
        }
        if self.wants(EventKind::ClearUnorderedAccessViewFloat) {
            if let Some(uav) = probe(&iid::ID3D11_UNORDERED_ACCESS_VIEW) {
                if self.suppressed(&Event::ClearUnorderedAccessViewFloat {
                    view: uav.to_api(),
                    values: *color,
                }) {
                    return true;
                }
            }
        }
        false
    }
}
