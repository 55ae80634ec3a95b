//! Entry points added by `ID3D11DeviceContext1` through `ID3D11DeviceContext4`.
//!
//! Calling any of these on a proxy whose negotiated revision is lower than the interface that
//! declares them is a caller bug and panics.

use aero_intercept_api::Descriptors;

use super::DeviceContextProxy;
use crate::hresult::HResult;
use crate::limits::MAX_CONSTANT_BUFFERS;
use crate::native::*;

impl DeviceContext1 for DeviceContextProxy {
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
        self.rev1(|native| {
            native.copy_subresource_region1(
                dst,
                dst_subresource,
                dst_x,
                dst_y,
                dst_z,
                src,
                src_subresource,
                src_box,
                flags,
            )
        })
    }

    fn update_subresource1(
        &self,
        dst: Resource,
        dst_subresource: u32,
        dst_box: Option<&Box3>,
        data: &[u8],
        row_pitch: u32,
        depth_pitch: u32,
        flags: CopyFlags,
    ) {
        if self.upload_suppressed(dst, dst_subresource, dst_box, data, row_pitch, depth_pitch) {
            return;
        }
        self.rev1(|native| {
            native.update_subresource1(
                dst,
                dst_subresource,
                dst_box,
                data,
                row_pitch,
                depth_pitch,
                flags,
            )
        })
    }

    fn discard_resource(&self, resource: Resource) {
        self.rev1(|native| native.discard_resource(resource))
    }

    fn discard_view(&self, view: View) {
        self.rev1(|native| native.discard_view(view))
    }

    fn discard_view1(&self, view: View, rects: &[Rect]) {
        self.rev1(|native| native.discard_view1(view, rects))
    }

    fn set_constant_buffers1(
        &self,
        stage: Stage,
        start_slot: u32,
        buffers: &[Buffer],
        first_constant: Option<&[u32]>,
        num_constants: Option<&[u32]>,
    ) {
        self.rev1(|native| {
            native.set_constant_buffers1(stage, start_slot, buffers, first_constant, num_constants)
        });
        // Constant ranges are not part of the normalized descriptor.
        self.push_descriptors::<MAX_CONSTANT_BUFFERS, _>(
            stage.shader_stage(),
            start_slot,
            buffers,
            |handles| Descriptors::ConstantBuffers(handles),
        );
    }

    fn get_constant_buffers1(
        &self,
        stage: Stage,
        start_slot: u32,
        buffers: &mut [Buffer],
        first_constant: Option<&mut [u32]>,
        num_constants: Option<&mut [u32]>,
    ) {
        self.rev1(|native| {
            native.get_constant_buffers1(stage, start_slot, buffers, first_constant, num_constants)
        })
    }

    fn swap_device_context_state(&self, state: DeviceContextState) -> DeviceContextState {
        // The incoming state carries its own render-target binding.
        self.finish_render_pass();
        self.rev1(|native| native.swap_device_context_state(state))
    }

    fn clear_view(&self, view: View, color: &[f32; 4], rects: &[Rect]) {
        if self.clear_view_suppressed(view, color) {
            return;
        }
        self.rev1(|native| native.clear_view(view, color, rects))
    }
}

impl DeviceContext2 for DeviceContextProxy {
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
    ) -> HResult {
        self.rev2(|native| {
            native.update_tile_mappings(
                tiled_resource,
                region_start_coordinates,
                region_sizes,
                tile_pool,
                range_flags,
                tile_pool_start_offsets,
                range_tile_counts,
                flags,
            )
        })
    }

    fn copy_tile_mappings(
        &self,
        dst: Resource,
        dst_start: &TiledResourceCoordinate,
        src: Resource,
        src_start: &TiledResourceCoordinate,
        size: &TileRegionSize,
        flags: u32,
    ) -> HResult {
        self.rev2(|native| native.copy_tile_mappings(dst, dst_start, src, src_start, size, flags))
    }

    fn copy_tiles(
        &self,
        tiled_resource: Resource,
        start: &TiledResourceCoordinate,
        size: &TileRegionSize,
        buffer: Buffer,
        buffer_start_offset: u64,
        flags: u32,
    ) {
        self.rev2(|native| {
            native.copy_tiles(tiled_resource, start, size, buffer, buffer_start_offset, flags)
        })
    }

    fn update_tiles(
        &self,
        dst: Resource,
        start: &TiledResourceCoordinate,
        size: &TileRegionSize,
        data: &[u8],
        flags: u32,
    ) {
        self.rev2(|native| native.update_tiles(dst, start, size, data, flags))
    }

    fn resize_tile_pool(&self, tile_pool: Buffer, new_size: u64) -> HResult {
        self.rev2(|native| native.resize_tile_pool(tile_pool, new_size))
    }

    fn tiled_resource_barrier(&self, before: DeviceChild, after: DeviceChild) {
        self.rev2(|native| native.tiled_resource_barrier(before, after))
    }

    fn is_annotation_enabled(&self) -> bool {
        self.rev2(|native| native.is_annotation_enabled())
    }

    fn set_marker_int(&self, label: &str, data: i32) {
        self.rev2(|native| native.set_marker_int(label, data))
    }

    fn begin_event_int(&self, label: &str, data: i32) {
        self.rev2(|native| native.begin_event_int(label, data))
    }

    fn end_event(&self) {
        self.rev2(|native| native.end_event())
    }
}

impl DeviceContext3 for DeviceContextProxy {
    fn flush1(&self, context_type: DeviceContextType, event: EventHandle) {
        self.rev3(|native| native.flush1(context_type, event))
    }

    fn set_hardware_protection_state(&self, enable: bool) {
        self.rev3(|native| native.set_hardware_protection_state(enable))
    }

    fn get_hardware_protection_state(&self) -> bool {
        self.rev3(|native| native.get_hardware_protection_state())
    }
}

impl DeviceContext4 for DeviceContextProxy {
    fn signal(&self, fence: Fence, value: u64) -> HResult {
        self.rev4(|native| native.signal(fence, value))
    }

    fn wait(&self, fence: Fence, value: u64) -> HResult {
        self.rev4(|native| native.wait(fence, value))
    }
}
