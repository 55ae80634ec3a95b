mod harness;

use std::sync::{Arc, Mutex, Weak};

use aero_intercept::api::{
    ClearFlags, DynamicState, EventKind, EventSource, Format, IndirectCommand, PipelineHandle,
    PipelineType, ResourceHandle, ResourceViewHandle, SamplerHandle, ShaderStage,
    SubresourceBox, Viewport, WHOLE_SIZE,
};
use aero_intercept::d3d11::native::*;
use aero_intercept::d3d11::testing::{FakeDriver, RecordedEvent};
use aero_intercept::d3d11::{
    iid, ContextRevision, DeviceContextProxy, InterceptConfig, QueriedInterface,
};
use harness::Rig;
use pretty_assertions::assert_eq;

const RTV_A: RenderTargetView = RenderTargetView(0x1000);
const RTV_B: RenderTargetView = RenderTargetView(0x2000);
const DSV: DepthStencilView = DepthStencilView(0x3000);

fn begin(render_targets: &[u64], depth_stencil: u64) -> RecordedEvent {
    RecordedEvent::BeginRenderPass {
        render_targets: render_targets.iter().map(|&h| ResourceViewHandle(h)).collect(),
        depth_stencil: ResourceViewHandle(depth_stencil),
    }
}

#[test]
fn rebinding_render_targets_closes_the_previous_pass_first() {
    let rig = Rig::new(ContextRevision::Base);

    rig.proxy.om_set_render_targets(&[RTV_A], DSV);
    rig.proxy.om_set_render_targets(&[RTV_B], DepthStencilView::NULL);

    assert_eq!(
        rig.recorder.events(),
        vec![
            begin(&[0x1000], 0x3000),
            RecordedEvent::FinishRenderPass,
            begin(&[0x2000], 0),
        ]
    );
    assert!(rig.proxy.has_open_render_pass());
    assert_eq!(rig.driver.call_count("om_set_render_targets"), 2);

    let stats = rig.proxy.stats().snapshot();
    assert_eq!((stats.render_passes_begun, stats.render_passes_finished), (2, 1));
}

#[test]
fn empty_rebind_finishes_without_beginning() {
    let rig = Rig::new(ContextRevision::Base);

    rig.proxy.om_set_render_targets(&[RTV_A], DepthStencilView::NULL);
    rig.proxy.om_set_render_targets(&[], DepthStencilView::NULL);
    rig.proxy.om_set_render_targets(
        &[RenderTargetView::NULL, RenderTargetView::NULL],
        DepthStencilView::NULL,
    );

    assert_eq!(
        rig.recorder.events(),
        vec![begin(&[0x1000], 0), RecordedEvent::FinishRenderPass]
    );
    assert!(!rig.proxy.has_open_render_pass());
}

#[test]
fn depth_only_binding_opens_a_pass() {
    let rig = Rig::new(ContextRevision::Base);
    rig.proxy.om_set_render_targets(&[], DSV);
    assert_eq!(rig.recorder.events(), vec![begin(&[], 0x3000)]);
}

#[test]
fn keeping_render_targets_leaves_the_pass_alone() {
    let rig = Rig::new(ContextRevision::Base);
    rig.proxy.om_set_render_targets(&[RTV_A], DepthStencilView::NULL);
    rig.recorder.clear();

    let uavs = [UnorderedAccessView(0x7000)];
    rig.proxy
        .om_set_render_targets_and_unordered_access_views(None, 1, Some(&uavs), None);

    assert_eq!(
        rig.recorder.events(),
        vec![RecordedEvent::PushUnorderedAccessViews {
            stages: ShaderStage::PIXEL,
            first: 1,
            views: vec![ResourceViewHandle(0x7000)],
        }]
    );
    assert!(rig.proxy.has_open_render_pass());

    rig.proxy.om_set_render_targets_and_unordered_access_views(
        Some((&[RTV_B], DepthStencilView::NULL)),
        0,
        None,
        None,
    );
    assert_eq!(
        rig.recorder.events()[1..].to_vec(),
        vec![RecordedEvent::FinishRenderPass, begin(&[0x2000], 0)]
    );
}

#[test]
fn clear_state_closes_the_open_pass() {
    let rig = Rig::new(ContextRevision::Base);
    rig.proxy.om_set_render_targets(&[RTV_A], DepthStencilView::NULL);
    rig.proxy.clear_state();
    rig.proxy.clear_state();

    assert_eq!(
        rig.recorder.events(),
        vec![begin(&[0x1000], 0), RecordedEvent::FinishRenderPass]
    );
    assert_eq!(rig.driver.call_count("clear_state"), 2);
}

#[test]
fn suppressed_draw_never_reaches_the_driver() {
    let rig = Rig::new(ContextRevision::Base);
    rig.recorder.suppress(EventKind::Draw);

    rig.proxy.draw_instanced(36, 4, 0, 1);
    rig.proxy.draw_indexed(6, 0, -2);

    assert_eq!(rig.driver.call_count("draw_instanced"), 0);
    assert_eq!(rig.driver.call_count("draw_indexed"), 1);
    assert_eq!(
        rig.recorder.events(),
        vec![
            RecordedEvent::Draw {
                vertex_count: 36,
                instance_count: 4,
                first_vertex: 0,
                first_instance: 1,
            },
            RecordedEvent::DrawIndexed {
                index_count: 6,
                instance_count: 1,
                first_index: 0,
                vertex_offset: -2,
                first_instance: 0,
            },
        ]
    );
    assert_eq!(rig.proxy.stats().snapshot().suppressed_calls, 1);
}

#[test]
fn suppressing_a_bind_has_no_effect() {
    let rig = Rig::new(ContextRevision::Base);
    rig.recorder.suppress(EventKind::BindPipeline);

    rig.proxy.rs_set_state(RasterizerState(0x55));

    assert_eq!(rig.driver.call_count("rs_set_state"), 1);
    assert_eq!(rig.proxy.stats().snapshot().suppressed_calls, 0);
}

#[test]
fn indirect_and_auto_draws() {
    let rig = Rig::new(ContextRevision::Base);

    rig.proxy.draw_indexed_instanced_indirect(Buffer(0x900), 64);
    rig.proxy.dispatch_indirect(Buffer(0x910), 12);
    rig.proxy.draw_auto();

    assert_eq!(
        rig.recorder.events(),
        vec![
            RecordedEvent::DrawOrDispatchIndirect {
                command: IndirectCommand::DrawIndexed,
                buffer: ResourceHandle(0x900),
                offset: 64,
                draw_count: 1,
                stride: 0,
            },
            RecordedEvent::DrawOrDispatchIndirect {
                command: IndirectCommand::Dispatch,
                buffer: ResourceHandle(0x910),
                offset: 12,
                draw_count: 1,
                stride: 0,
            },
            RecordedEvent::Draw {
                vertex_count: 0,
                instance_count: 0,
                first_vertex: 0,
                first_instance: 0,
            },
        ]
    );
}

#[test]
fn pipeline_binds_translate_per_stage() {
    let rig = Rig::new(ContextRevision::Base);

    rig.proxy.set_shader(Stage::Pixel, Shader(0x10), &[]);
    rig.proxy.set_shader(Stage::Compute, Shader(0x20), &[]);
    rig.proxy.om_set_blend_state(BlendState(0x30), Some(&[1.0, 0.0, 0.0, 1.0]), 0xF);
    rig.proxy.om_set_depth_stencil_state(DepthStencilState(0x40), 7);
    rig.proxy.ia_set_primitive_topology(PrimitiveTopology::TRIANGLE_LIST);

    assert_eq!(
        rig.recorder.events(),
        vec![
            RecordedEvent::BindPipeline {
                ty: PipelineType::PixelShader,
                pipeline: PipelineHandle(0x10),
            },
            RecordedEvent::BindPipeline {
                ty: PipelineType::ComputeShader,
                pipeline: PipelineHandle(0x20),
            },
            RecordedEvent::BindPipeline {
                ty: PipelineType::BlendState,
                pipeline: PipelineHandle(0x30),
            },
            RecordedEvent::BindPipelineStates {
                states: vec![DynamicState::BlendConstant, DynamicState::SampleMask],
                values: vec![0xFF00_00FF, 0xF],
            },
            RecordedEvent::BindPipeline {
                ty: PipelineType::DepthStencilState,
                pipeline: PipelineHandle(0x40),
            },
            RecordedEvent::BindPipelineStates {
                states: vec![DynamicState::StencilReferenceValue],
                values: vec![7],
            },
            RecordedEvent::BindPipelineStates {
                states: vec![DynamicState::PrimitiveTopology],
                values: vec![PrimitiveTopology::TRIANGLE_LIST.0],
            },
        ]
    );
    assert_eq!(rig.driver.bound_topology(), PrimitiveTopology::TRIANGLE_LIST);
}

#[test]
fn descriptor_and_buffer_binds() {
    let rig = Rig::new(ContextRevision::Base);

    rig.proxy.set_samplers(Stage::Vertex, 2, &[SamplerState(0x1), SamplerState::NULL]);
    rig.proxy.set_constant_buffers(Stage::Hull, 0, &[Buffer(0x2)]);
    rig.proxy.set_shader_resources(Stage::Domain, 5, &[ShaderResourceView(0x3)]);
    rig.proxy.cs_set_unordered_access_views(1, &[UnorderedAccessView(0x4)], None);
    rig.proxy
        .ia_set_vertex_buffers(3, &[Buffer(0x50), Buffer(0x60)], &[16, 32], &[0, u32::MAX]);
    rig.proxy.ia_set_index_buffer(Buffer(0x70), Format::R16_UINT, 8);
    rig.proxy.ia_set_index_buffer(Buffer::NULL, Format::UNKNOWN, 0);

    assert_eq!(
        rig.recorder.events(),
        vec![
            RecordedEvent::PushSamplers {
                stages: ShaderStage::VERTEX,
                first: 2,
                samplers: vec![SamplerHandle(0x1), SamplerHandle::NULL],
            },
            RecordedEvent::PushConstantBuffers {
                stages: ShaderStage::HULL,
                first: 0,
                buffers: vec![ResourceHandle(0x2)],
            },
            RecordedEvent::PushShaderResourceViews {
                stages: ShaderStage::DOMAIN,
                first: 5,
                views: vec![ResourceViewHandle(0x3)],
            },
            RecordedEvent::PushUnorderedAccessViews {
                stages: ShaderStage::COMPUTE,
                first: 1,
                views: vec![ResourceViewHandle(0x4)],
            },
            RecordedEvent::BindVertexBuffers {
                first: 3,
                buffers: vec![ResourceHandle(0x50), ResourceHandle(0x60)],
                offsets: vec![0, u64::from(u32::MAX)],
                strides: vec![16, 32],
            },
            RecordedEvent::BindIndexBuffer {
                buffer: ResourceHandle(0x70),
                offset: 8,
                index_size: 2,
            },
            RecordedEvent::BindIndexBuffer {
                buffer: ResourceHandle::NULL,
                offset: 0,
                index_size: 0,
            },
        ]
    );
}

#[test]
fn viewports_and_scissors_start_at_slot_zero() {
    let rig = Rig::new(ContextRevision::Base);
    let viewport = Viewport {
        x: 0.0,
        y: 0.0,
        width: 1280.0,
        height: 720.0,
        min_depth: 0.0,
        max_depth: 1.0,
    };
    let rect = Rect {
        left: 0,
        top: 0,
        right: 640,
        bottom: 360,
    };

    rig.proxy.rs_set_viewports(&[viewport]);
    rig.proxy.rs_set_scissor_rects(&[rect, rect]);

    assert_eq!(
        rig.recorder.events(),
        vec![
            RecordedEvent::BindViewports {
                first: 0,
                viewports: vec![viewport],
            },
            RecordedEvent::BindScissorRects {
                first: 0,
                rects: vec![rect, rect],
            },
        ]
    );
}

#[test]
fn buffer_copy_without_source_box_copies_everything() {
    let rig = Rig::new(ContextRevision::Base);
    rig.driver
        .set_resource_dimension(Resource(0xB0), ResourceDimension::Buffer);

    rig.proxy
        .copy_subresource_region(Resource(0xB0), 0, 16, 0, 0, Resource(0xA0), 0, None);

    assert_eq!(
        rig.recorder.events(),
        vec![RecordedEvent::CopyBufferRegion {
            source: ResourceHandle(0xA0),
            source_offset: 0,
            dest: ResourceHandle(0xB0),
            dest_offset: 16,
            size: WHOLE_SIZE,
        }]
    );
    assert_eq!(rig.driver.call_count("copy_subresource_region"), 1);
}

#[test]
fn texture_copy_places_the_source_box_at_the_offset() {
    let rig = Rig::new(ContextRevision::Rev1);
    rig.driver
        .set_resource_dimension(Resource(0xC0), ResourceDimension::Texture2D);
    let src_box = Box3 {
        left: 8,
        top: 8,
        front: 0,
        right: 24,
        bottom: 16,
        back: 1,
    };

    rig.proxy.copy_subresource_region1(
        Resource(0xC0),
        1,
        4,
        2,
        0,
        Resource(0xD0),
        3,
        Some(&src_box),
        CopyFlags::empty(),
    );

    assert_eq!(
        rig.recorder.events(),
        vec![RecordedEvent::CopyTextureRegion {
            source: ResourceHandle(0xD0),
            source_subresource: 3,
            source_box: Some(SubresourceBox {
                left: 8,
                top: 8,
                front: 0,
                right: 24,
                bottom: 16,
                back: 1,
            }),
            dest: ResourceHandle(0xC0),
            dest_subresource: 1,
            dest_box: Some(SubresourceBox {
                left: 4,
                top: 2,
                front: 0,
                right: 20,
                bottom: 10,
                back: 1,
            }),
        }]
    );
    assert_eq!(rig.driver.call_count("copy_subresource_region1"), 1);
}

#[test]
fn copy_resource_and_resolve_are_suppressible() {
    let rig = Rig::new(ContextRevision::Base);
    rig.recorder.suppress(EventKind::CopyResource);
    rig.recorder.suppress(EventKind::ResolveTextureRegion);

    rig.proxy.copy_resource(Resource(0x1), Resource(0x2));
    rig.proxy
        .resolve_subresource(Resource(0x3), 0, Resource(0x4), 2, Format::R8G8B8A8_UNORM);

    assert_eq!(rig.driver.call_count("copy_resource"), 0);
    assert_eq!(rig.driver.call_count("resolve_subresource"), 0);
    assert_eq!(
        rig.recorder.events(),
        vec![
            RecordedEvent::CopyResource {
                source: ResourceHandle(0x2),
                dest: ResourceHandle(0x1),
            },
            RecordedEvent::ResolveTextureRegion {
                source: ResourceHandle(0x4),
                source_subresource: 2,
                dest: ResourceHandle(0x3),
                dest_subresource: 0,
                format: Format::R8G8B8A8_UNORM,
            },
        ]
    );
    assert_eq!(rig.proxy.stats().snapshot().suppressed_calls, 2);
}

#[test]
fn structure_count_copy_reads_the_view_range() {
    let rig = Rig::new(ContextRevision::Base);
    rig.driver.set_unordered_access_view_info(
        UnorderedAccessView(0x44),
        UnorderedAccessViewInfo {
            resource: Resource(0x40),
            format: Format::R32_UINT,
            dimension: UavDimension::Buffer {
                first_element: 4,
                num_elements: 64,
            },
        },
    );

    rig.proxy
        .copy_structure_count(Buffer(0x80), 12, UnorderedAccessView(0x44));

    assert_eq!(
        rig.recorder.events(),
        vec![RecordedEvent::CopyBufferRegion {
            source: ResourceHandle(0x40),
            source_offset: 4,
            dest: ResourceHandle(0x80),
            dest_offset: 12,
            size: 64,
        }]
    );
    assert_eq!(rig.driver.call_count("copy_structure_count"), 1);
}

#[test]
fn structure_count_from_a_texture_view_is_not_a_buffer_copy() {
    let rig = Rig::new(ContextRevision::Base);
    rig.driver.set_unordered_access_view_info(
        UnorderedAccessView(0x45),
        UnorderedAccessViewInfo {
            resource: Resource(0x41),
            format: Format::R32_UINT,
            dimension: UavDimension::Texture2D,
        },
    );

    rig.proxy
        .copy_structure_count(Buffer(0x80), 0, UnorderedAccessView(0x45));

    assert!(rig.recorder.events().is_empty());
    assert_eq!(rig.driver.call_count("copy_structure_count"), 1);
}

#[test]
fn uploads_are_attributed_to_the_device() {
    let rig = Rig::new(ContextRevision::Base);
    rig.driver
        .set_resource_dimension(Resource(0xE0), ResourceDimension::Buffer);
    rig.driver
        .set_resource_dimension(Resource(0xF0), ResourceDimension::Texture2D);
    let data = [7u8; 64];

    rig.proxy
        .update_subresource(Resource(0xE0), 0, None, &data[..32], 32, 0);
    rig.proxy
        .update_subresource(Resource(0xF0), 2, None, &data, 16, 64);

    let device = EventSource::Device(rig.proxy.device_handle());
    assert_eq!(
        rig.recorder.events_with_sources(),
        vec![
            (
                device,
                RecordedEvent::UploadBufferRegion {
                    data: vec![7; 32],
                    dest: ResourceHandle(0xE0),
                    dest_offset: 0,
                    size: 32,
                }
            ),
            (
                device,
                RecordedEvent::UploadTextureRegion {
                    data: vec![7; 64],
                    row_pitch: 16,
                    slice_pitch: 64,
                    dest: ResourceHandle(0xF0),
                    dest_subresource: 2,
                    dest_box: None,
                }
            ),
        ]
    );
}

#[test]
fn clears_are_pre_call_events() {
    let rig = Rig::new(ContextRevision::Base);
    rig.recorder.suppress(EventKind::ClearDepthStencilView);

    rig.proxy.clear_render_target_view(RTV_A, &[0.0, 0.5, 1.0, 1.0]);
    rig.proxy
        .clear_depth_stencil_view(DSV, ClearFlag::DEPTH | ClearFlag::STENCIL, 1.0, 0x80);
    rig.proxy
        .clear_unordered_access_view_uint(UnorderedAccessView(0x9), &[1, 2, 3, 4]);

    assert_eq!(
        rig.recorder.events(),
        vec![
            RecordedEvent::ClearRenderTargetViews {
                views: vec![ResourceViewHandle(0x1000)],
                color: [0.0, 0.5, 1.0, 1.0],
            },
            RecordedEvent::ClearDepthStencilView {
                view: ResourceViewHandle(0x3000),
                flags: ClearFlags::DEPTH | ClearFlags::STENCIL,
                depth: 1.0,
                stencil: 0x80,
            },
            RecordedEvent::ClearUnorderedAccessViewUint {
                view: ResourceViewHandle(0x9),
                values: [1, 2, 3, 4],
            },
        ]
    );
    assert_eq!(rig.driver.call_count("clear_render_target_view"), 1);
    assert_eq!(rig.driver.call_count("clear_depth_stencil_view"), 0);
    assert_eq!(rig.driver.call_count("clear_unordered_access_view_uint"), 1);
}

#[test]
fn generic_view_clear_routes_by_view_kind() {
    let rig = Rig::new(ContextRevision::Rev1);
    rig.driver.set_view_kind(View(0x100), iid::ID3D11_RENDER_TARGET_VIEW);
    rig.driver.set_view_kind(View(0x200), iid::ID3D11_DEPTH_STENCIL_VIEW);
    rig.driver.set_view_kind(View(0x300), iid::ID3D11_UNORDERED_ACCESS_VIEW);
    let color = [0.25, 0.5, 0.75, 1.0];

    rig.proxy.clear_view(View(0x100), &color, &[]);
    rig.proxy.clear_view(View(0x200), &color, &[]);
    rig.proxy.clear_view(View(0x300), &color, &[]);

    assert_eq!(
        rig.recorder.events(),
        vec![
            RecordedEvent::ClearRenderTargetViews {
                views: vec![ResourceViewHandle(0x100)],
                color,
            },
            RecordedEvent::ClearDepthStencilView {
                view: ResourceViewHandle(0x200),
                flags: ClearFlags::DEPTH,
                depth: 0.25,
                stencil: 0,
            },
            RecordedEvent::ClearUnorderedAccessViewFloat {
                view: ResourceViewHandle(0x300),
                values: color,
            },
        ]
    );
    assert_eq!(rig.driver.call_count("clear_view"), 3);
}

#[test]
fn suppressed_generic_clear_skips_the_driver() {
    let rig = Rig::new(ContextRevision::Rev1);
    rig.recorder.suppress(EventKind::ClearRenderTargetViews);
    rig.driver.set_view_kind(View(0x100), iid::ID3D11_RENDER_TARGET_VIEW);

    rig.proxy.clear_view(View(0x100), &[0.0; 4], &[]);
    assert_eq!(rig.driver.call_count("clear_view"), 0);
}

#[test]
fn finishing_a_command_list_closes_the_pass_and_reports_the_list() {
    let rig = Rig::deferred();
    rig.proxy.om_set_render_targets(&[RTV_A], DepthStencilView::NULL);

    let list = rig.proxy.finish_command_list(false).expect("deferred context records");
    assert!(!rig.proxy.has_open_render_pass());

    let events = rig.recorder.events_with_sources();
    let context = EventSource::Context(rig.proxy.handle());
    assert_eq!(
        events,
        vec![
            (context, begin(&[0x1000], 0)),
            (context, RecordedEvent::FinishRenderPass),
            (
                EventSource::CommandList(list.handle()),
                RecordedEvent::ExecuteSecondaryCommandList {
                    list: list.handle(),
                    recording_context: rig.proxy.handle(),
                }
            ),
        ]
    );

    rig.recorder.clear();
    rig.proxy.execute_command_list(&list, true);
    assert_eq!(
        rig.recorder.events(),
        vec![RecordedEvent::ExecuteCommandList { list: list.handle() }]
    );
    assert_eq!(rig.driver.executed_lists(), vec![list.unwrap_native().handle()]);

    let stats = rig.proxy.stats().snapshot();
    assert_eq!((stats.command_lists_recorded, stats.command_lists_executed), (1, 1));

    assert_eq!(rig.driver.live_command_lists(), 1);
    drop(list);
    assert_eq!(rig.driver.live_command_lists(), 0);
}

#[test]
fn failed_finish_reports_nothing() {
    let rig = Rig::new(ContextRevision::Base);
    let err = rig.proxy.finish_command_list(false).unwrap_err();
    assert_eq!(err, aero_intercept::d3d11::HResult::DXGI_ERROR_INVALID_CALL);
    assert!(rig.recorder.events().is_empty());
    assert_eq!(rig.proxy.stats().snapshot().command_lists_recorded, 0);
}

#[test]
fn unobserved_kinds_do_no_translation_work() {
    let rig = Rig::observing(ContextRevision::Rev1, &[EventKind::Dispatch]);
    rig.driver
        .set_resource_dimension(Resource(0xB0), ResourceDimension::Buffer);

    rig.proxy
        .copy_subresource_region(Resource(0xB0), 0, 0, 0, 0, Resource(0xA0), 0, None);
    rig.proxy.update_subresource(Resource(0xB0), 0, None, &[0; 4], 4, 0);
    rig.proxy.clear_view(View(0x1), &[0.0; 4], &[]);
    rig.proxy.om_set_render_targets(&[RTV_A], DepthStencilView::NULL);

    assert_eq!(rig.driver.call_count("resource_dimension"), 0);
    assert_eq!(rig.driver.call_count("view_as"), 0);
    assert!(rig.recorder.events().is_empty());
    assert!(!rig.proxy.has_open_render_pass());

    rig.proxy.dispatch(8, 8, 1);
    assert_eq!(
        rig.recorder.events(),
        vec![RecordedEvent::Dispatch {
            group_count_x: 8,
            group_count_y: 8,
            group_count_z: 1,
        }]
    );
}

#[test]
fn disabled_dispatch_turns_the_proxy_into_a_pass_through() {
    let config = InterceptConfig {
        dispatch_events: false,
        ..InterceptConfig::default()
    };
    let rig = Rig::build_with_config(
        FakeDriver::new(ContextRevision::Rev4),
        ContextRevision::Base,
        &EventKind::ALL,
        config,
    );
    rig.recorder.suppress(EventKind::Draw);

    rig.proxy.om_set_render_targets(&[RTV_A], DSV);
    rig.proxy.draw(3, 0);

    assert!(rig.recorder.events().is_empty());
    assert_eq!(rig.driver.call_count("draw"), 1);
}

#[test]
fn observers_may_query_the_context_they_observe() {
    let rig = Rig::observing(ContextRevision::Base, &[]);
    let target: Arc<Mutex<Weak<DeviceContextProxy>>> = Arc::new(Mutex::new(Weak::new()));
    *target.lock().unwrap() = Arc::downgrade(&rig.proxy);

    let seen = Arc::clone(&target);
    rig.registry.register(
        EventKind::Draw,
        move |_: EventSource, _: &aero_intercept::api::Event<'_>| {
            if let Some(proxy) = seen.lock().unwrap().upgrade() {
                if let Ok(QueriedInterface::Proxy(p)) =
                    proxy.query_interface(&iid::ID3D11_DEVICE_CONTEXT2)
                {
                    p.release();
                }
            }
            aero_intercept::api::Verdict::Proceed
        },
    );

    rig.proxy.draw(3, 0);

    assert_eq!(rig.proxy.revision(), ContextRevision::Rev2);
    assert_eq!(rig.proxy.ref_count(), 1);
    assert_eq!(rig.driver.native_ref_count(), 1);
    assert_eq!(rig.driver.call_count("draw"), 1);
}

#[test]
fn constant_buffer_ranges_still_push_descriptors() {
    let rig = Rig::new(ContextRevision::Rev1);
    rig.proxy.set_constant_buffers1(
        Stage::Geometry,
        1,
        &[Buffer(0x11), Buffer(0x22)],
        Some(&[0, 16]),
        Some(&[16, 16]),
    );

    assert_eq!(
        rig.recorder.events(),
        vec![RecordedEvent::PushConstantBuffers {
            stages: ShaderStage::GEOMETRY,
            first: 1,
            buffers: vec![ResourceHandle(0x11), ResourceHandle(0x22)],
        }]
    );
    assert_eq!(rig.driver.call_count("set_constant_buffers1"), 1);
}

#[test]
fn swapping_context_state_closes_the_pass() {
    let rig = Rig::new(ContextRevision::Rev1);
    rig.proxy.om_set_render_targets(&[RTV_A], DepthStencilView::NULL);
    rig.proxy.swap_device_context_state(DeviceContextState(0x77));

    assert_eq!(
        rig.recorder.events(),
        vec![begin(&[0x1000], 0), RecordedEvent::FinishRenderPass]
    );
    assert_eq!(rig.driver.call_count("swap_device_context_state"), 1);
}

#[test]
fn unevented_calls_forward_with_results() {
    let rig = Rig::new(ContextRevision::Rev4);

    let mapped = rig
        .proxy
        .map(Resource(0x5), 0, MapType::WriteDiscard, MapFlags::empty())
        .expect("map succeeds");
    assert_eq!(mapped.row_pitch, 256);
    assert_eq!(
        rig.proxy
            .map(Resource(0x5), 0, MapType::Read, MapFlags::DO_NOT_WAIT)
            .unwrap_err(),
        aero_intercept::d3d11::HResult::DXGI_ERROR_WAS_STILL_DRAWING
    );
    rig.proxy.unmap(Resource(0x5), 0);

    assert!(rig.proxy.signal(Fence(0x9), 3).is_ok());
    assert!(rig.proxy.wait(Fence(0x9), 3).is_ok());
    rig.proxy.set_marker_int("frame", 1);
    assert_eq!(rig.proxy.get_type(), DeviceContextType::Immediate);

    assert_eq!(
        rig.driver.calls(),
        vec!["map", "map", "unmap", "signal", "wait", "set_marker_int"]
    );
    assert!(rig.recorder.events().is_empty());
}
