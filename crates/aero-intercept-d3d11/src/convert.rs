//! Conversions from native argument shapes to normalized event fields.

use aero_intercept_api::{Format, ResourceHandle, SubresourceBox, WHOLE_SIZE};
use bytemuck::Zeroable;

use crate::native::{Box3, ToApiHandle};

/// Calls `f` with `native` converted to normalized handles.
///
/// When the native and normalized handle layouts agree (64-bit hosts) the slice is reinterpreted
/// in place. Otherwise the handles are widened into a stack buffer of `MAX` entries; `MAX` is the
/// slot limit of the category, which callers must already respect.
pub fn with_api_handles<const MAX: usize, H, R>(native: &[H], f: impl FnOnce(&[H::Api]) -> R) -> R
where
    H: ToApiHandle,
{
    debug_assert!(
        native.len() <= MAX,
        "{} handles exceed the slot limit of {MAX}",
        native.len()
    );

    if let Ok(api) = bytemuck::try_cast_slice::<H, H::Api>(native) {
        return f(api);
    }

    let mut widened = [H::Api::zeroed(); MAX];
    let count = native.len().min(MAX);
    for (dst, src) in widened.iter_mut().zip(&native[..count]) {
        *dst = src.to_api();
    }
    f(&widened[..count])
}

/// Calls `f` with `offsets` widened to 64 bits, using a stack buffer of `MAX` entries.
pub fn with_wide_offsets<const MAX: usize, R>(offsets: &[u32], f: impl FnOnce(&[u64]) -> R) -> R {
    debug_assert!(offsets.len() <= MAX);

    let mut widened = [0u64; MAX];
    let count = offsets.len().min(MAX);
    for (dst, &src) in widened.iter_mut().zip(&offsets[..count]) {
        *dst = u64::from(src);
    }
    f(&widened[..count])
}

/// Packs a blend factor into RGBA8, red in the low byte. A missing factor means `{1, 1, 1, 1}`.
pub fn pack_blend_factor(factor: Option<&[f32; 4]>) -> u32 {
    let Some(factor) = factor else {
        return 0xFFFF_FFFF;
    };
    factor
        .iter()
        .enumerate()
        .fold(0u32, |packed, (i, &channel)| {
            packed | (((channel * 255.0) as u32 & 0xFF) << (8 * i))
        })
}

/// Index size in bytes of an index buffer binding. A null buffer reports 0.
pub fn index_size(buffer: ResourceHandle, format: Format) -> u32 {
    if buffer.is_null() {
        0
    } else if format == Format::R16_UINT {
        2
    } else {
        4
    }
}

/// Source offset and size of a buffer region copy. A missing box copies the whole buffer.
pub fn buffer_copy_range(src_box: Option<&Box3>) -> (u64, u64) {
    match src_box {
        Some(b) => (u64::from(b.left), u64::from(b.width())),
        None => (0, WHOLE_SIZE),
    }
}

/// Destination box of a texture region copy placed at `dst` (x, y, z).
///
/// Returns `None` when the copy lands at the origin, in which case the destination box is
/// implied by the source box (or the whole subresource).
pub fn texture_copy_dest_box(dst: [u32; 3], src_box: Option<&Box3>) -> Option<SubresourceBox> {
    if dst == [0, 0, 0] {
        return None;
    }

    let [x, y, z] = dst.map(|v| v as i32);
    match src_box {
        Some(b) => Some(SubresourceBox {
            left: x,
            top: y,
            front: z,
            right: x.wrapping_add(b.width() as i32),
            bottom: y.wrapping_add(b.height() as i32),
            back: z.wrapping_add(b.depth() as i32),
        }),
        None => {
            debug_assert!(false, "whole-subresource copy to a non-zero offset {dst:?}");
            None
        }
    }
}

/// Destination offset and size of a buffer upload.
pub fn buffer_upload_range(dst_box: Option<&Box3>, row_pitch: u32) -> (u64, u64) {
    match dst_box {
        Some(b) => (u64::from(b.left), u64::from(b.width())),
        None => (0, u64::from(row_pitch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{Buffer, RenderTargetView};
    use aero_intercept_api::ResourceViewHandle;
    use pretty_assertions::assert_eq;

    fn b(left: u32, right: u32) -> Box3 {
        Box3 {
            left,
            top: 0,
            front: 0,
            right,
            bottom: 1,
            back: 1,
        }
    }

    #[test]
    fn handles_keep_order_and_nulls() {
        let native = [RenderTargetView(0x10), RenderTargetView::NULL, RenderTargetView(0x30)];
        let api = with_api_handles::<8, _, _>(&native, |api| api.to_vec());
        assert_eq!(
            api,
            vec![
                ResourceViewHandle(0x10),
                ResourceViewHandle::NULL,
                ResourceViewHandle(0x30)
            ]
        );
    }

    #[test]
    fn empty_handle_slice_is_empty() {
        let native: [Buffer; 0] = [];
        assert!(with_api_handles::<4, _, _>(&native, |api| api.is_empty()));
    }

    #[test]
    fn offsets_widen_exactly() {
        let widened = with_wide_offsets::<32, _>(&[0, 16, u32::MAX], |o| o.to_vec());
        assert_eq!(widened, vec![0, 16, u64::from(u32::MAX)]);
    }

    #[test]
    fn blend_factor_packs_rgba8_red_low() {
        assert_eq!(pack_blend_factor(None), 0xFFFF_FFFF);
        assert_eq!(pack_blend_factor(Some(&[1.0, 0.0, 0.0, 0.0])), 0x0000_00FF);
        assert_eq!(pack_blend_factor(Some(&[0.0, 0.0, 0.0, 1.0])), 0xFF00_0000);
        assert_eq!(pack_blend_factor(Some(&[0.5, 0.5, 0.5, 0.5])), 0x7F7F_7F7F);
    }

    #[test]
    fn index_size_follows_format() {
        let buf = ResourceHandle(0x100);
        assert_eq!(index_size(ResourceHandle::NULL, Format::R16_UINT), 0);
        assert_eq!(index_size(buf, Format::R16_UINT), 2);
        assert_eq!(index_size(buf, Format::R32_UINT), 4);
    }

    #[test]
    fn missing_source_box_copies_whole_buffer() {
        assert_eq!(buffer_copy_range(None), (0, WHOLE_SIZE));
        assert_eq!(buffer_copy_range(Some(&b(16, 48))), (16, 32));
    }

    #[test]
    fn texture_copy_to_origin_has_no_dest_box() {
        assert_eq!(texture_copy_dest_box([0, 0, 0], Some(&b(4, 12))), None);
        assert_eq!(
            texture_copy_dest_box([2, 3, 0], Some(&b(4, 12))),
            Some(SubresourceBox {
                left: 2,
                top: 3,
                front: 0,
                right: 10,
                bottom: 4,
                back: 1,
            })
        );
    }

    #[test]
    fn upload_without_box_uses_row_pitch() {
        assert_eq!(buffer_upload_range(None, 256), (0, 256));
        assert_eq!(buffer_upload_range(Some(&b(64, 96)), 256), (64, 32));
    }
}
