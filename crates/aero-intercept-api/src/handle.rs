//! Opaque object handles used by normalized events.
//!
//! Every handle is a transparent `u64` so arrays of native interface pointers can be reinterpreted
//! in place on 64-bit hosts (see `aero-intercept-d3d11`'s handle conversion). The value `0` is the
//! null handle.

use bytemuck::{Pod, Zeroable};

macro_rules! api_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
        pub struct $name(pub u64);

        impl $name {
            pub const NULL: Self = Self(0);

            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

api_handle!(
    /// A buffer or texture.
    ResourceHandle
);
api_handle!(
    /// A view onto a resource (render target, depth-stencil, shader resource or unordered access).
    ResourceViewHandle
);
api_handle!(
    /// A sampler state object.
    SamplerHandle
);
api_handle!(
    /// A shader or fixed-function state object bound as part of the pipeline.
    PipelineHandle
);
api_handle!(
    /// Identity of the device an event is attributed to.
    DeviceHandle
);
api_handle!(
    /// Identity of an intercepted command-submission context.
    ContextHandle
);
api_handle!(
    /// Identity of a recorded command list proxy.
    CommandListHandle
);
