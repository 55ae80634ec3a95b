//! Model of the native D3D11 objects the proxy wraps.

mod context;
mod handle;
mod types;

pub use context::{
    DeviceContext, DeviceContext1, DeviceContext2, DeviceContext3, DeviceContext4,
    NativeCommandList, NativeContext, NativeContext0, NativeContext1, NativeContext2,
    NativeContext3, NativeContext4, NativeInterface, ObjectQuery, Unknown,
};
pub use handle::*;
pub use types::*;
