//! `aero-intercept-api` is the version-independent side of Aero's graphics interception layer.
//!
//! Intercepting proxies translate native call arguments into the [`Event`] payloads defined here
//! and publish them through an [`EventRegistry`]. Observers never see native interface types;
//! they receive opaque handles ([`ResourceHandle`], [`ResourceViewHandle`], ...) and normalized
//! value types.

mod event;
mod handle;
mod registry;
mod types;

pub use event::{Descriptors, Event, EventKind, EventSource, Verdict};
pub use handle::{
    CommandListHandle, ContextHandle, DeviceHandle, PipelineHandle, ResourceHandle,
    ResourceViewHandle, SamplerHandle,
};
pub use registry::{EventRegistry, Observer, ObserverId};
pub use types::{
    ClearFlags, DescriptorType, DynamicState, Format, IndirectCommand, PipelineType,
    ScissorRect, ShaderStage, SubresourceBox, SubresourceData, TextureFilter, Viewport,
    WHOLE_SIZE,
};
