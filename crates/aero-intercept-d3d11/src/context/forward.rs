//! Revision 0 entry points.

use std::sync::Arc;

use aero_intercept_api::{
    ClearFlags, Descriptors, DynamicState, Event, EventKind, EventSource, Format,
    IndirectCommand, PipelineType, ShaderStage,
};

use super::DeviceContextProxy;
use crate::command_list::CommandListProxy;
use crate::convert::{index_size, pack_blend_factor};
use crate::guid::Guid;
use crate::hresult::HResult;
use crate::limits::{
    MAX_CONSTANT_BUFFERS, MAX_SAMPLERS, MAX_SHADER_RESOURCE_VIEWS, MAX_UNORDERED_ACCESS_VIEWS,
};
use crate::native::*;

impl DeviceContext for DeviceContextProxy {
    type CommandList = Arc<CommandListProxy>;

    fn get_private_data(&self, guid: &Guid, data: &mut [u8]) -> Result<usize, HResult> {
        self.base(|native| native.get_private_data(guid, data))
    }

    fn set_private_data(&self, guid: &Guid, data: Option<&[u8]>) -> HResult {
        self.base(|native| native.set_private_data(guid, data))
    }

    fn set_private_data_interface(&self, guid: &Guid, data: Option<&dyn Unknown>) -> HResult {
        self.base(|native| native.set_private_data_interface(guid, data))
    }

    fn set_constant_buffers(&self, stage: Stage, start_slot: u32, buffers: &[Buffer]) {
        self.base(|native| native.set_constant_buffers(stage, start_slot, buffers));
        self.push_descriptors::<MAX_CONSTANT_BUFFERS, _>(
            stage.shader_stage(),
            start_slot,
            buffers,
            |handles| Descriptors::ConstantBuffers(handles),
        );
    }

    fn get_constant_buffers(&self, stage: Stage, start_slot: u32, buffers: &mut [Buffer]) {
        self.base(|native| native.get_constant_buffers(stage, start_slot, buffers))
    }

    fn set_shader_resources(&self, stage: Stage, start_slot: u32, views: &[ShaderResourceView]) {
        self.base(|native| native.set_shader_resources(stage, start_slot, views));
        self.push_descriptors::<MAX_SHADER_RESOURCE_VIEWS, _>(
            stage.shader_stage(),
            start_slot,
            views,
            |handles| Descriptors::ShaderResourceViews(handles),
        );
    }

    fn get_shader_resources(
        &self,
        stage: Stage,
        start_slot: u32,
        views: &mut [ShaderResourceView],
    ) {
        self.base(|native| native.get_shader_resources(stage, start_slot, views))
    }

    fn set_samplers(&self, stage: Stage, start_slot: u32, samplers: &[SamplerState]) {
        self.base(|native| native.set_samplers(stage, start_slot, samplers));
        self.push_descriptors::<MAX_SAMPLERS, _>(
            stage.shader_stage(),
            start_slot,
            samplers,
            |handles| Descriptors::Samplers(handles),
        );
    }

    fn get_samplers(&self, stage: Stage, start_slot: u32, samplers: &mut [SamplerState]) {
        self.base(|native| native.get_samplers(stage, start_slot, samplers))
    }

    fn set_shader(&self, stage: Stage, shader: Shader, class_instances: &[ClassInstance]) {
        self.base(|native| native.set_shader(stage, shader, class_instances));
        if self.wants(EventKind::BindPipeline) {
            self.notify(&Event::BindPipeline {
                ty: stage.pipeline_type(),
                pipeline: shader.to_api(),
            });
        }
    }

    fn get_shader(&self, stage: Stage, class_instances: &mut [ClassInstance]) -> (Shader, u32) {
        self.base(|native| native.get_shader(stage, class_instances))
    }

    fn draw(&self, vertex_count: u32, start_vertex: u32) {
        if self.wants(EventKind::Draw)
            && self.suppressed(&Event::Draw {
                vertex_count,
                instance_count: 1,
                first_vertex: start_vertex,
                first_instance: 0,
            })
        {
            return;
        }
        self.base(|native| native.draw(vertex_count, start_vertex))
    }

    fn draw_indexed(&self, index_count: u32, start_index: u32, base_vertex: i32) {
        if self.wants(EventKind::DrawIndexed)
            && self.suppressed(&Event::DrawIndexed {
                index_count,
                instance_count: 1,
                first_index: start_index,
                vertex_offset: base_vertex,
                first_instance: 0,
            })
        {
            return;
        }
        self.base(|native| native.draw_indexed(index_count, start_index, base_vertex))
    }

    fn draw_instanced(
        &self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    ) {
        if self.wants(EventKind::Draw)
            && self.suppressed(&Event::Draw {
                vertex_count: vertex_count_per_instance,
                instance_count,
                first_vertex: start_vertex,
                first_instance: start_instance,
            })
        {
            return;
        }
        self.base(|native| {
            native.draw_instanced(
                vertex_count_per_instance,
                instance_count,
                start_vertex,
                start_instance,
            )
        })
    }

    fn draw_indexed_instanced(
        &self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    ) {
        if self.wants(EventKind::DrawIndexed)
            && self.suppressed(&Event::DrawIndexed {
                index_count: index_count_per_instance,
                instance_count,
                first_index: start_index,
                vertex_offset: base_vertex,
                first_instance: start_instance,
            })
        {
            return;
        }
        self.base(|native| {
            native.draw_indexed_instanced(
                index_count_per_instance,
                instance_count,
                start_index,
                base_vertex,
                start_instance,
            )
        })
    }

    fn draw_auto(&self) {
        // Vertex count comes from the stream-output buffer and is not known here.
        if self.wants(EventKind::Draw)
            && self.suppressed(&Event::Draw {
                vertex_count: 0,
                instance_count: 0,
                first_vertex: 0,
                first_instance: 0,
            })
        {
            return;
        }
        self.base(|native| native.draw_auto())
    }

    fn draw_instanced_indirect(&self, args: Buffer, aligned_byte_offset: u32) {
        if self.indirect_suppressed(IndirectCommand::Draw, args, aligned_byte_offset) {
            return;
        }
        self.base(|native| native.draw_instanced_indirect(args, aligned_byte_offset))
    }

    fn draw_indexed_instanced_indirect(&self, args: Buffer, aligned_byte_offset: u32) {
        if self.indirect_suppressed(IndirectCommand::DrawIndexed, args, aligned_byte_offset) {
            return;
        }
        self.base(|native| native.draw_indexed_instanced_indirect(args, aligned_byte_offset))
    }

    fn dispatch(&self, x: u32, y: u32, z: u32) {
        if self.wants(EventKind::Dispatch)
            && self.suppressed(&Event::Dispatch {
                group_count_x: x,
                group_count_y: y,
                group_count_z: z,
            })
        {
            return;
        }
        self.base(|native| native.dispatch(x, y, z))
    }

    fn dispatch_indirect(&self, args: Buffer, aligned_byte_offset: u32) {
        if self.indirect_suppressed(IndirectCommand::Dispatch, args, aligned_byte_offset) {
            return;
        }
        self.base(|native| native.dispatch_indirect(args, aligned_byte_offset))
    }

    fn map(
        &self,
        resource: Resource,
        subresource: u32,
        map_type: MapType,
        flags: MapFlags,
    ) -> Result<MappedSubresource, HResult> {
        self.base(|native| native.map(resource, subresource, map_type, flags))
    }

    fn unmap(&self, resource: Resource, subresource: u32) {
        self.base(|native| native.unmap(resource, subresource))
    }

    fn ia_set_input_layout(&self, layout: InputLayout) {
        self.base(|native| native.ia_set_input_layout(layout))
    }

    fn ia_get_input_layout(&self) -> InputLayout {
        self.base(|native| native.ia_get_input_layout())
    }

    fn ia_set_vertex_buffers(
        &self,
        start_slot: u32,
        buffers: &[Buffer],
        strides: &[u32],
        offsets: &[u32],
    ) {
        self.base(|native| native.ia_set_vertex_buffers(start_slot, buffers, strides, offsets));
        self.bind_vertex_buffers(start_slot, buffers, strides, offsets);
    }

    fn ia_get_vertex_buffers(
        &self,
        start_slot: u32,
        buffers: &mut [Buffer],
        strides: &mut [u32],
        offsets: &mut [u32],
    ) {
        self.base(|native| native.ia_get_vertex_buffers(start_slot, buffers, strides, offsets))
    }

    fn ia_set_index_buffer(&self, buffer: Buffer, format: Format, offset: u32) {
        self.base(|native| native.ia_set_index_buffer(buffer, format, offset));
        if self.wants(EventKind::BindIndexBuffer) {
            let buffer = buffer.to_api();
            self.notify(&Event::BindIndexBuffer {
                buffer,
                offset: u64::from(offset),
                index_size: index_size(buffer, format),
            });
        }
    }

    fn ia_get_index_buffer(&self) -> (Buffer, Format, u32) {
        self.base(|native| native.ia_get_index_buffer())
    }

    fn ia_set_primitive_topology(&self, topology: PrimitiveTopology) {
        self.base(|native| native.ia_set_primitive_topology(topology));
        if self.wants(EventKind::BindPipelineStates) {
            self.notify(&Event::BindPipelineStates {
                states: &[DynamicState::PrimitiveTopology],
                values: &[topology.0],
            });
        }
    }

    fn ia_get_primitive_topology(&self) -> PrimitiveTopology {
        self.base(|native| native.ia_get_primitive_topology())
    }

    fn begin(&self, query: Asynchronous) {
        self.base(|native| native.begin(query))
    }

    fn end(&self, query: Asynchronous) {
        self.base(|native| native.end(query))
    }

    fn get_data(&self, query: Asynchronous, data: &mut [u8], flags: u32) -> HResult {
        self.base(|native| native.get_data(query, data, flags))
    }

    fn set_predication(&self, predicate: Predicate, value: bool) {
        self.base(|native| native.set_predication(predicate, value))
    }

    fn get_predication(&self) -> (Predicate, bool) {
        self.base(|native| native.get_predication())
    }

    fn om_set_render_targets(
        &self,
        render_targets: &[RenderTargetView],
        depth_stencil: DepthStencilView,
    ) {
        self.finish_render_pass();
        self.base(|native| native.om_set_render_targets(render_targets, depth_stencil));
        self.begin_render_pass(render_targets, depth_stencil);
    }

    fn om_set_render_targets_and_unordered_access_views(
        &self,
        render_targets: Option<(&[RenderTargetView], DepthStencilView)>,
        uav_start_slot: u32,
        uavs: Option<&[UnorderedAccessView]>,
        initial_counts: Option<&[u32]>,
    ) {
        if render_targets.is_some() {
            self.finish_render_pass();
        }
        self.base(|native| {
            native.om_set_render_targets_and_unordered_access_views(
                render_targets,
                uav_start_slot,
                uavs,
                initial_counts,
            )
        });
        if let Some((render_targets, depth_stencil)) = render_targets {
            self.begin_render_pass(render_targets, depth_stencil);
        }
        if let Some(uavs) = uavs {
            self.push_descriptors::<MAX_UNORDERED_ACCESS_VIEWS, _>(
                ShaderStage::PIXEL,
                uav_start_slot,
                uavs,
                |handles| Descriptors::UnorderedAccessViews(handles),
            );
        }
    }

    fn om_get_render_targets(&self, render_targets: &mut [RenderTargetView]) -> DepthStencilView {
        self.base(|native| native.om_get_render_targets(render_targets))
    }

    fn om_get_render_targets_and_unordered_access_views(
        &self,
        render_targets: &mut [RenderTargetView],
        uav_start_slot: u32,
        uavs: &mut [UnorderedAccessView],
    ) -> DepthStencilView {
        self.base(|native| {
            native.om_get_render_targets_and_unordered_access_views(
                render_targets,
                uav_start_slot,
                uavs,
            )
        })
    }

    fn om_set_blend_state(
        &self,
        state: BlendState,
        blend_factor: Option<&[f32; 4]>,
        sample_mask: u32,
    ) {
        self.base(|native| native.om_set_blend_state(state, blend_factor, sample_mask));
        if self.wants(EventKind::BindPipeline) {
            self.notify(&Event::BindPipeline {
                ty: PipelineType::BlendState,
                pipeline: state.to_api(),
            });
        }
        if self.wants(EventKind::BindPipelineStates) {
            self.notify(&Event::BindPipelineStates {
                states: &[DynamicState::BlendConstant, DynamicState::SampleMask],
                values: &[pack_blend_factor(blend_factor), sample_mask],
            });
        }
    }

    fn om_get_blend_state(&self) -> (BlendState, [f32; 4], u32) {
        self.base(|native| native.om_get_blend_state())
    }

    fn om_set_depth_stencil_state(&self, state: DepthStencilState, stencil_ref: u32) {
        self.base(|native| native.om_set_depth_stencil_state(state, stencil_ref));
        if self.wants(EventKind::BindPipeline) {
            self.notify(&Event::BindPipeline {
                ty: PipelineType::DepthStencilState,
                pipeline: state.to_api(),
            });
        }
        if self.wants(EventKind::BindPipelineStates) {
            self.notify(&Event::BindPipelineStates {
                states: &[DynamicState::StencilReferenceValue],
                values: &[stencil_ref],
            });
        }
    }

    fn om_get_depth_stencil_state(&self) -> (DepthStencilState, u32) {
        self.base(|native| native.om_get_depth_stencil_state())
    }

    fn so_set_targets(&self, targets: &[Buffer], offsets: &[u32]) {
        self.base(|native| native.so_set_targets(targets, offsets))
    }

    fn so_get_targets(&self, targets: &mut [Buffer]) {
        self.base(|native| native.so_get_targets(targets))
    }

    fn rs_set_state(&self, state: RasterizerState) {
        self.base(|native| native.rs_set_state(state));
        if self.wants(EventKind::BindPipeline) {
            self.notify(&Event::BindPipeline {
                ty: PipelineType::RasterizerState,
                pipeline: state.to_api(),
            });
        }
    }

    fn rs_get_state(&self) -> RasterizerState {
        self.base(|native| native.rs_get_state())
    }

    fn rs_set_viewports(&self, viewports: &[Viewport]) {
        self.base(|native| native.rs_set_viewports(viewports));
        if self.wants(EventKind::BindViewports) {
            self.notify(&Event::BindViewports {
                first: 0,
                viewports,
            });
        }
    }

    fn rs_get_viewports(&self, viewports: &mut [Viewport]) -> u32 {
        self.base(|native| native.rs_get_viewports(viewports))
    }

    fn rs_set_scissor_rects(&self, rects: &[Rect]) {
        self.base(|native| native.rs_set_scissor_rects(rects));
        if self.wants(EventKind::BindScissorRects) {
            self.notify(&Event::BindScissorRects { first: 0, rects });
        }
    }

    fn rs_get_scissor_rects(&self, rects: &mut [Rect]) -> u32 {
        self.base(|native| native.rs_get_scissor_rects(rects))
    }

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
    ) {
        if self.copy_region_suppressed(
            dst,
            dst_subresource,
            [dst_x, dst_y, dst_z],
            src,
            src_subresource,
            src_box,
        ) {
            return;
        }
        self.base(|native| {
            native.copy_subresource_region(
                dst,
                dst_subresource,
                dst_x,
                dst_y,
                dst_z,
                src,
                src_subresource,
                src_box,
            )
        })
    }

    fn copy_resource(&self, dst: Resource, src: Resource) {
        if self.wants(EventKind::CopyResource)
            && self.suppressed(&Event::CopyResource {
                source: src.to_api(),
                dest: dst.to_api(),
            })
        {
            return;
        }
        self.base(|native| native.copy_resource(dst, src))
    }

    fn update_subresource(
        &self,
        dst: Resource,
        dst_subresource: u32,
        dst_box: Option<&Box3>,
        data: &[u8],
        row_pitch: u32,
        depth_pitch: u32,
    ) {
        if self.upload_suppressed(dst, dst_subresource, dst_box, data, row_pitch, depth_pitch) {
            return;
        }
        self.base(|native| {
            native.update_subresource(dst, dst_subresource, dst_box, data, row_pitch, depth_pitch)
        })
    }

    fn copy_structure_count(
        &self,
        dst: Buffer,
        dst_aligned_byte_offset: u32,
        src: UnorderedAccessView,
    ) {
        if self.wants(EventKind::CopyBufferRegion) {
            let info = self.base(|native| native.unordered_access_view_info(src));
            if let UavDimension::Buffer {
                first_element,
                num_elements,
            } = info.dimension
            {
                if self.suppressed(&Event::CopyBufferRegion {
                    source: info.resource.to_api(),
                    source_offset: u64::from(first_element),
                    dest: dst.to_api(),
                    dest_offset: u64::from(dst_aligned_byte_offset),
                    size: u64::from(num_elements),
                }) {
                    return;
                }
            }
        }
        self.base(|native| native.copy_structure_count(dst, dst_aligned_byte_offset, src))
    }

    fn clear_render_target_view(&self, view: RenderTargetView, color: &[f32; 4]) {
        if self.wants(EventKind::ClearRenderTargetViews)
            && self.suppressed(&Event::ClearRenderTargetViews {
                views: &[view.to_api()],
                color: *color,
            })
        {
            return;
        }
        self.base(|native| native.clear_render_target_view(view, color))
    }

    fn clear_unordered_access_view_uint(&self, view: UnorderedAccessView, values: &[u32; 4]) {
        if self.wants(EventKind::ClearUnorderedAccessViewUint)
            && self.suppressed(&Event::ClearUnorderedAccessViewUint {
                view: view.to_api(),
                values: *values,
            })
        {
            return;
        }
        self.base(|native| native.clear_unordered_access_view_uint(view, values))
    }

    fn clear_unordered_access_view_float(&self, view: UnorderedAccessView, values: &[f32; 4]) {
        if self.wants(EventKind::ClearUnorderedAccessViewFloat)
            && self.suppressed(&Event::ClearUnorderedAccessViewFloat {
                view: view.to_api(),
                values: *values,
            })
        {
            return;
        }
        self.base(|native| native.clear_unordered_access_view_float(view, values))
    }

    fn clear_depth_stencil_view(
        &self,
        view: DepthStencilView,
        flags: ClearFlag,
        depth: f32,
        stencil: u8,
    ) {
        if self.wants(EventKind::ClearDepthStencilView)
            && self.suppressed(&Event::ClearDepthStencilView {
                view: view.to_api(),
                flags: ClearFlags::from_bits_truncate(flags.bits()),
                depth,
                stencil,
            })
        {
            return;
        }
        self.base(|native| native.clear_depth_stencil_view(view, flags, depth, stencil))
    }

    fn generate_mips(&self, view: ShaderResourceView) {
        self.base(|native| native.generate_mips(view))
    }

    fn set_resource_min_lod(&self, resource: Resource, min_lod: f32) {
        self.base(|native| native.set_resource_min_lod(resource, min_lod))
    }

    fn get_resource_min_lod(&self, resource: Resource) -> f32 {
        self.base(|native| native.get_resource_min_lod(resource))
    }

    fn resolve_subresource(
        &self,
        dst: Resource,
        dst_subresource: u32,
        src: Resource,
        src_subresource: u32,
        format: Format,
    ) {
        if self.wants(EventKind::ResolveTextureRegion)
            && self.suppressed(&Event::ResolveTextureRegion {
                source: src.to_api(),
                source_subresource: src_subresource,
                source_box: None,
                dest: dst.to_api(),
                dest_subresource: dst_subresource,
                dest_offset: None,
                format,
            })
        {
            return;
        }
        self.base(|native| {
            native.resolve_subresource(dst, dst_subresource, src, src_subresource, format)
        })
    }

    fn execute_command_list(&self, list: &Arc<CommandListProxy>, restore_context_state: bool) {
        if self.wants(EventKind::ExecuteCommandList) {
            self.notify(&Event::ExecuteCommandList { list: list.handle() });
        }
        self.stats.inc_command_lists_executed();
        self.base(|native| native.execute_command_list(list.unwrap_native(), restore_context_state))
    }

    fn finish_command_list(
        &self,
        restore_deferred_context_state: bool,
    ) -> Result<Arc<CommandListProxy>, HResult> {
        self.finish_render_pass();

        let native =
            self.base(|native| native.finish_command_list(restore_deferred_context_state))?;
        let list = CommandListProxy::new(self.weak_device(), native, self.config.verbose_log);
        self.stats.inc_command_lists_recorded();

        if self.wants(EventKind::ExecuteSecondaryCommandList) {
            self.events.publish(
                EventSource::CommandList(list.handle()),
                &Event::ExecuteSecondaryCommandList {
                    list: list.handle(),
                    recording_context: self.handle(),
                },
            );
        }
        Ok(list)
    }

    fn cs_set_unordered_access_views(
        &self,
        start_slot: u32,
        uavs: &[UnorderedAccessView],
        initial_counts: Option<&[u32]>,
    ) {
        self.base(|native| native.cs_set_unordered_access_views(start_slot, uavs, initial_counts));
        self.push_descriptors::<MAX_UNORDERED_ACCESS_VIEWS, _>(
            ShaderStage::COMPUTE,
            start_slot,
            uavs,
            |handles| Descriptors::UnorderedAccessViews(handles),
        );
    }

    fn cs_get_unordered_access_views(&self, start_slot: u32, uavs: &mut [UnorderedAccessView]) {
        self.base(|native| native.cs_get_unordered_access_views(start_slot, uavs))
    }

    fn clear_state(&self) {
        // Unbinds the render targets along with everything else.
        self.finish_render_pass();
        self.base(|native| native.clear_state())
    }

    fn flush(&self) {
        self.base(|native| native.flush())
    }

    fn get_type(&self) -> DeviceContextType {
        self.base(|native| native.get_type())
    }

    fn get_context_flags(&self) -> u32 {
        self.base(|native| native.get_context_flags())
    }
}

impl DeviceContextProxy {
    fn indirect_suppressed(&self, command: IndirectCommand, args: Buffer, offset: u32) -> bool {
        self.wants(EventKind::DrawOrDispatchIndirect)
            && self.suppressed(&Event::DrawOrDispatchIndirect {
                command,
                buffer: args.to_api(),
                offset: u64::from(offset),
                draw_count: 1,
                stride: 0,
            })
    }
}

