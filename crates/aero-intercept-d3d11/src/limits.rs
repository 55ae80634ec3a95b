//! Per-category slot limits of the D3D11 pipeline.
//!
//! Callers of the intercepted entry points must stay within these; the driver rejects or
//! misbehaves otherwise. They also size the stack buffers used to translate handle arrays.

/// `D3D11_IA_VERTEX_INPUT_RESOURCE_SLOT_COUNT`.
pub const MAX_VERTEX_BUFFERS: usize = 32;
/// `D3D11_COMMONSHADER_SAMPLER_SLOT_COUNT`.
pub const MAX_SAMPLERS: usize = 16;
/// `D3D11_COMMONSHADER_INPUT_RESOURCE_SLOT_COUNT`.
pub const MAX_SHADER_RESOURCE_VIEWS: usize = 128;
/// `D3D11_1_UAV_SLOT_COUNT`.
pub const MAX_UNORDERED_ACCESS_VIEWS: usize = 64;
/// `D3D11_COMMONSHADER_CONSTANT_BUFFER_API_SLOT_COUNT`.
pub const MAX_CONSTANT_BUFFERS: usize = 14;
/// `D3D11_SIMULTANEOUS_RENDER_TARGET_COUNT`.
pub const MAX_RENDER_TARGETS: usize = 8;
