use std::fmt;
use std::sync::{Arc, Weak};

use aero_intercept_api::CommandListHandle;
use tracing::{debug, warn};

use crate::device::ProxyDevice;
use crate::native::NativeCommandList;

/// Stand-in for a recorded `ID3D11CommandList`.
///
/// Only [`crate::DeviceContextProxy`]'s `finish_command_list` creates these, so every command
/// list an application submits for execution is one of them. The proxy owns the native
/// reference returned by the driver and releases it when the last `Arc` goes away.
pub struct CommandListProxy {
    native: Box<dyn NativeCommandList>,
    device: Weak<dyn ProxyDevice>,
    verbose_log: bool,
}

impl CommandListProxy {
    pub(crate) fn new(
        device: Weak<dyn ProxyDevice>,
        native: Box<dyn NativeCommandList>,
        verbose_log: bool,
    ) -> Arc<Self> {
        let list = Arc::new(Self {
            native,
            device,
            verbose_log,
        });
        if verbose_log {
            debug!(
                list = format_args!("{:#x}", list.handle().0),
                native = format_args!("{:#x}", list.native.handle()),
                "created ID3D11CommandList proxy"
            );
        }
        list
    }

    /// Identity of this command list as seen by observers.
    pub fn handle(&self) -> CommandListHandle {
        CommandListHandle(self as *const Self as usize as u64)
    }

    /// The native command list to hand to the driver.
    #[allow(clippy::borrowed_box)]
    pub fn unwrap_native(&self) -> &Box<dyn NativeCommandList> {
        &self.native
    }

    /// Adds a reference to the owning device for the caller.
    pub fn device(&self) -> Option<Arc<dyn ProxyDevice>> {
        let device = self.device.upgrade()?;
        device.add_ref();
        Some(device)
    }

    pub fn context_flags(&self) -> u32 {
        self.native.context_flags()
    }
}

impl Drop for CommandListProxy {
    fn drop(&mut self) {
        let native = self.native.handle();
        if self.verbose_log {
            debug!(native = format_args!("{native:#x}"), "destroying ID3D11CommandList proxy");
        }
        let remaining = self.native.release();
        if remaining != 0 {
            warn!(
                native = format_args!("{native:#x}"),
                remaining, "reference count for ID3D11CommandList object is inconsistent"
            );
        }
    }
}

impl fmt::Debug for CommandListProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandListProxy")
            .field("handle", &self.handle())
            .field("native", &format_args!("{:#x}", self.native.handle()))
            .finish_non_exhaustive()
    }
}
