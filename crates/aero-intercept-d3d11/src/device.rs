use aero_intercept_api::DeviceHandle;

/// The device proxy that owns a context.
///
/// Contexts keep only a weak back-reference to their device and hand out new device references
/// from `get_device`.
pub trait ProxyDevice: Send + Sync {
    /// Identity of the device as seen by observers. Uploads are attributed to it.
    fn handle(&self) -> DeviceHandle;

    /// Returns the new reference count.
    fn add_ref(&self) -> u32;

    /// Returns the remaining reference count.
    fn release(&self) -> u32;
}
