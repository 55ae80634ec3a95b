//! Native object handles.
//!
//! Each handle is the address of a driver object, stored as a transparent `usize` so that slices
//! of handles have the exact layout of the native pointer arrays the driver expects. `0` is null.
//! Handles do not own a reference; the caller of an intercepted entry point keeps its objects
//! alive for the duration of the call.

use aero_intercept_api::{PipelineHandle, ResourceHandle, ResourceViewHandle, SamplerHandle};
use bytemuck::{Pod, Zeroable};

/// Common behavior of native handle newtypes.
pub trait NativeHandle: Copy + Pod + Eq + std::fmt::Debug {
    fn raw(self) -> usize;

    fn is_null(self) -> bool {
        self.raw() == 0
    }
}

/// Maps a native handle onto the normalized handle observers see.
///
/// The normalized value is the object address widened to `u64`, so identical objects always map
/// to identical handles regardless of which native interface type they were passed as.
pub trait ToApiHandle: NativeHandle {
    type Api: Pod + From<u64>;

    fn to_api(self) -> Self::Api {
        Self::Api::from(self.raw() as u64)
    }
}

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident $(=> $api:ty)?) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
        pub struct $name(pub usize);

        impl $name {
            pub const NULL: Self = Self(0);
        }

        impl NativeHandle for $name {
            fn raw(self) -> usize {
                self.0
            }
        }

        $(
            impl ToApiHandle for $name {
                type Api = $api;
            }
        )?
    };
}

native_handle!(
    /// `ID3D11Resource` (buffer or texture).
    Resource => ResourceHandle
);
native_handle!(
    /// `ID3D11Buffer`.
    Buffer => ResourceHandle
);
native_handle!(ShaderResourceView => ResourceViewHandle);
native_handle!(RenderTargetView => ResourceViewHandle);
native_handle!(DepthStencilView => ResourceViewHandle);
native_handle!(UnorderedAccessView => ResourceViewHandle);
native_handle!(
    /// Any view kind (`ID3D11View`). The concrete kind is found with
    /// [`super::ObjectQuery::view_as`].
    View => ResourceViewHandle
);
native_handle!(SamplerState => SamplerHandle);
native_handle!(
    /// Shader object of any stage. The stage is implied by the entry point it is passed to.
    Shader => PipelineHandle
);
native_handle!(BlendState => PipelineHandle);
native_handle!(DepthStencilState => PipelineHandle);
native_handle!(RasterizerState => PipelineHandle);
native_handle!(ClassInstance);
native_handle!(InputLayout);
native_handle!(
    /// Query, predicate or counter.
    Asynchronous
);
native_handle!(Predicate);
native_handle!(DeviceChild);
native_handle!(Fence);
native_handle!(DeviceContextState);
native_handle!(
    /// OS event object signaled by `flush1`.
    EventHandle
);

impl From<Buffer> for Resource {
    fn from(buffer: Buffer) -> Self {
        Self(buffer.0)
    }
}

impl From<Predicate> for Asynchronous {
    fn from(predicate: Predicate) -> Self {
        Self(predicate.0)
    }
}

macro_rules! view_upcast {
    ($($name:ident),*) => {
        $(
            impl From<$name> for View {
                fn from(view: $name) -> Self {
                    Self(view.0)
                }
            }
        )*
    };
}

view_upcast!(
    ShaderResourceView,
    RenderTargetView,
    DepthStencilView,
    UnorderedAccessView
);
