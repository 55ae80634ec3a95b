//! The intercepting device context.
//!
//! [`DeviceContextProxy`] stands in for a native `ID3D11DeviceContext*` object. It forwards every
//! entry point to the wrapped native context and, where observers are registered, translates the
//! call into a normalized [`aero_intercept_api::Event`] first (pre-call, suppressible) or
//! afterwards (post-call, observational).
//!
//! Reference counting follows the native object model: the proxy keeps its own external count
//! and mirrors every increment and decrement onto the native object, so both counts move in
//! lockstep. When the external count reaches zero the proxy releases the one native reference it
//! owns and the native object is expected to go away with it.

mod forward;
mod notify;
mod revisions;

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, RwLock, Weak};

use aero_intercept_api::{ContextHandle, DeviceHandle, EventRegistry};
use tracing::{debug, warn};

use crate::config::InterceptConfig;
use crate::device::ProxyDevice;
use crate::error::UpgradeError;
use crate::events::EventSink;
use crate::guid::Guid;
use crate::hresult::HResult;
use crate::native::{
    NativeContext, NativeContext0, NativeContext1, NativeContext2, NativeContext3, NativeContext4,
    NativeInterface,
};
use crate::render_pass::RenderPassTracker;
use crate::revision::{self, ContextRevision, Resolution};
use crate::stats::ContextStats;

/// Answer to [`DeviceContextProxy::query_interface`].
#[derive(Debug)]
pub enum QueriedInterface {
    /// The proxy itself, carrying one new reference.
    Proxy(Arc<DeviceContextProxy>),
    /// An interface the proxy does not model, straight from the native object.
    Native(NativeInterface),
}

pub struct DeviceContextProxy {
    /// `None` once the final reference was released.
    native: RwLock<Option<NativeContext>>,
    revision: AtomicU8,
    ref_count: AtomicU32,
    device: Weak<dyn ProxyDevice>,
    device_handle: DeviceHandle,
    events: EventSink,
    render_pass: RenderPassTracker,
    stats: ContextStats,
    config: InterceptConfig,
}

impl DeviceContextProxy {
    /// Wraps `native`, taking over the reference the caller holds on it. The proxy starts with
    /// an external reference count of one.
    pub fn new(
        device: &Arc<dyn ProxyDevice>,
        native: NativeContext,
        registry: Option<Arc<EventRegistry>>,
        config: InterceptConfig,
    ) -> Arc<Self> {
        let revision = native.revision();
        let proxy = Arc::new(Self {
            native: RwLock::new(Some(native)),
            revision: AtomicU8::new(revision.index()),
            ref_count: AtomicU32::new(1),
            device: Arc::downgrade(device),
            device_handle: device.handle(),
            events: EventSink::new(registry, &config),
            render_pass: RenderPassTracker::new(),
            stats: ContextStats::new(),
            config,
        });
        if config.verbose_log {
            debug!(
                context = format_args!("{:#x}", proxy.handle().0),
                %revision,
                "created device context proxy"
            );
        }
        proxy
    }

    /// Identity of this context as seen by observers.
    pub fn handle(&self) -> ContextHandle {
        ContextHandle(self as *const Self as usize as u64)
    }

    pub fn device_handle(&self) -> DeviceHandle {
        self.device_handle
    }

    pub fn revision(&self) -> ContextRevision {
        let index = self.revision.load(Ordering::Acquire);
        ContextRevision::from_index(index).unwrap_or(ContextRevision::Base)
    }

    /// Current external reference count.
    pub fn ref_count(&self) -> u32 {
        self.ref_count.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> &ContextStats {
        &self.stats
    }

    pub fn config(&self) -> &InterceptConfig {
        &self.config
    }

    pub fn has_open_render_pass(&self) -> bool {
        self.render_pass.is_open()
    }

    pub fn add_ref(&self) -> u32 {
        self.base(|native| native.add_ref());
        self.ref_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Drops one external reference. The last release tears the proxy down and releases the
    /// native object.
    pub fn release(&self) -> u32 {
        let previous = self.ref_count.fetch_sub(1, Ordering::AcqRel);
        assert!(previous != 0, "device context released more often than referenced");

        let remaining = previous - 1;
        if remaining != 0 {
            self.base(|native| native.release());
            return remaining;
        }

        let Some(native) = self.native.write().unwrap().take() else {
            panic!("device context torn down twice");
        };
        let revision = native.revision();
        if self.config.verbose_log {
            debug!(
                context = format_args!("{:#x}", self.handle().0),
                %revision,
                "destroying device context proxy"
            );
        }

        let leftover = native.base().release();
        drop(native);
        if leftover != 0 {
            warn!(
                context = format_args!("{:#x}", self.handle().0),
                %revision,
                leftover,
                "reference count for device context is inconsistent"
            );
        }
        0
    }

    /// Answers an interface query.
    ///
    /// Context interfaces (and the base identities) are answered with the proxy itself, upgrading
    /// the wrapped native context first when a newer revision is requested. Anything else is
    /// forwarded to the native object, including context revisions the native object refuses.
    ///
    /// The one failure that is not forwarded: if the native object answers a context query with
    /// a different kind of object, that object is released and the query fails with
    /// `E_NOINTERFACE`. The proxy keeps its current revision and native context in either case.
    pub fn query_interface(self: &Arc<Self>, iid: &Guid) -> Result<QueriedInterface, HResult> {
        match self.upgrade_interface(iid) {
            Ok(_) => {
                self.add_ref();
                Ok(QueriedInterface::Proxy(Arc::clone(self)))
            }
            Err(err @ UpgradeError::UnexpectedInterface { .. }) => Err(err.into()),
            Err(_) => self
                .with_native(|native| native.base().query_interface(iid))
                .map(QueriedInterface::Native),
        }
    }

    /// Makes sure the wrapped context supports `iid`, replacing it with a newer revision if
    /// needed. Returns the revision in effect afterwards.
    pub fn upgrade_interface(&self, iid: &Guid) -> Result<ContextRevision, UpgradeError> {
        let current = self.revision();
        match revision::resolve(iid, current) {
            Resolution::Identity | Resolution::Satisfied(_) => Ok(current),
            Resolution::Upgrade(requested) => self.upgrade_to(requested),
            Resolution::Foreign => Err(UpgradeError::NotAContextInterface(*iid)),
        }
    }

    fn upgrade_to(&self, requested: ContextRevision) -> Result<ContextRevision, UpgradeError> {
        let mut slot = self.native.write().unwrap();
        let Some(current_native) = slot.as_ref() else {
            panic!("device context used after its final release");
        };

        let current = self.revision();
        if requested <= current {
            return Ok(current);
        }

        let upgraded = match current_native.base().query_interface(&requested.iid()) {
            Ok(NativeInterface::DeviceContext(upgraded)) if upgraded.revision() >= requested => {
                upgraded
            }
            Ok(other) => {
                other.release();
                return Err(UpgradeError::UnexpectedInterface { requested });
            }
            Err(hr) => return Err(UpgradeError::Refused { requested, hr }),
        };

        if let Some(old) = slot.replace(upgraded) {
            old.base().release();
        }
        self.revision.store(requested.index(), Ordering::Release);
        self.stats.inc_interface_upgrades();

        if self.config.verbose_log {
            debug!(
                context = format_args!("{:#x}", self.handle().0),
                from = %current,
                to = %requested,
                "upgraded device context"
            );
        }
        Ok(requested)
    }

    /// Adds a reference to the owning device for the caller.
    pub fn get_device(&self) -> Option<Arc<dyn ProxyDevice>> {
        let device = self.device.upgrade()?;
        device.add_ref();
        Some(device)
    }

    /// Runs `f` against the wrapped native context.
    ///
    /// # Panics
    ///
    /// Panics if the proxy was already torn down.
    pub fn with_native<R>(&self, f: impl FnOnce(&NativeContext) -> R) -> R {
        let guard = self.native.read().unwrap();
        match guard.as_ref() {
            Some(native) => f(native),
            None => panic!("device context used after its final release"),
        }
    }

    fn base<R>(&self, f: impl FnOnce(&dyn NativeContext0) -> R) -> R {
        self.with_native(|native| f(native.base()))
    }

    #[track_caller]
    fn rev1<R>(&self, f: impl FnOnce(&dyn NativeContext1) -> R) -> R {
        self.require(ContextRevision::Rev1);
        self.with_native(|native| f(native.rev1()))
    }

    #[track_caller]
    fn rev2<R>(&self, f: impl FnOnce(&dyn NativeContext2) -> R) -> R {
        self.require(ContextRevision::Rev2);
        self.with_native(|native| f(native.rev2()))
    }

    #[track_caller]
    fn rev3<R>(&self, f: impl FnOnce(&dyn NativeContext3) -> R) -> R {
        self.require(ContextRevision::Rev3);
        self.with_native(|native| f(native.rev3()))
    }

    #[track_caller]
    fn rev4<R>(&self, f: impl FnOnce(&dyn NativeContext4) -> R) -> R {
        self.require(ContextRevision::Rev4);
        self.with_native(|native| f(native.rev4()))
    }

    #[track_caller]
    fn require(&self, revision: ContextRevision) {
        let current = self.revision();
        assert!(
            current >= revision,
            "{revision} entry point called on a device context negotiated at {current}"
        );
    }

    fn weak_device(&self) -> Weak<dyn ProxyDevice> {
        Weak::clone(&self.device)
    }
}

impl fmt::Debug for DeviceContextProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceContextProxy")
            .field("handle", &self.handle())
            .field("revision", &self.revision())
            .field("ref_count", &self.ref_count())
            .field("render_pass_open", &self.has_open_render_pass())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::iid;
    use crate::native::{DeviceContext, DeviceContext1, DeviceContext3};
    use crate::testing::{FakeDevice, FakeDriver, FOREIGN_IID};

    fn setup(
        max: ContextRevision,
        start: ContextRevision,
    ) -> (FakeDriver, Arc<FakeDevice>, Arc<DeviceContextProxy>) {
        let driver = FakeDriver::new(max);
        let device = FakeDevice::new();
        let dyn_device: Arc<dyn ProxyDevice> = device.clone();
        let proxy = DeviceContextProxy::new(
            &dyn_device,
            driver.create_context(start),
            None,
            InterceptConfig::default(),
        );
        (driver, device, proxy)
    }

    fn expect_proxy(answer: Result<QueriedInterface, HResult>) -> Arc<DeviceContextProxy> {
        match answer {
            Ok(QueriedInterface::Proxy(proxy)) => proxy,
            other => panic!("expected the proxy, got {other:?}"),
        }
    }

    #[test]
    fn counts_move_in_lockstep() {
        let (driver, _device, proxy) = setup(ContextRevision::Base, ContextRevision::Base);
        assert_eq!((proxy.ref_count(), driver.native_ref_count()), (1, 1));

        assert_eq!(proxy.add_ref(), 2);
        assert_eq!(proxy.add_ref(), 3);
        assert_eq!(driver.native_ref_count(), 3);

        assert_eq!(proxy.release(), 2);
        assert_eq!(proxy.release(), 1);
        assert_eq!(driver.native_ref_count(), 1);

        assert_eq!(proxy.release(), 0);
        assert_eq!(driver.native_ref_count(), 0);
    }

    #[test]
    fn query_for_newer_revision_upgrades_in_place() {
        let (driver, _device, proxy) = setup(ContextRevision::Rev4, ContextRevision::Base);

        let same = expect_proxy(proxy.query_interface(&iid::ID3D11_DEVICE_CONTEXT3));
        assert!(Arc::ptr_eq(&same, &proxy));
        assert_eq!(proxy.revision(), ContextRevision::Rev3);
        assert_eq!(proxy.ref_count(), 2);
        assert_eq!(driver.native_ref_count(), 2);
        assert_eq!(proxy.stats().snapshot().interface_upgrades, 1);

        // Older revisions are answered without touching the native object.
        driver.clear_calls();
        let _ = expect_proxy(proxy.query_interface(&iid::ID3D11_DEVICE_CONTEXT1));
        assert_eq!(driver.call_count("query_interface"), 0);
        assert_eq!(proxy.revision(), ContextRevision::Rev3);

        proxy.set_hardware_protection_state(true);
        assert_eq!(driver.call_count("set_hardware_protection_state"), 1);

        assert_eq!(proxy.release(), 2);
        assert_eq!(proxy.release(), 1);
        assert_eq!(proxy.release(), 0);
        assert_eq!(driver.native_ref_count(), 0);
    }

    #[test]
    fn identity_queries_return_the_proxy() {
        let (driver, _device, proxy) = setup(ContextRevision::Rev1, ContextRevision::Rev1);
        for id in [iid::IUNKNOWN, iid::ID3D11_DEVICE_CHILD, iid::AERO_CONTEXT_PROXY] {
            let same = expect_proxy(proxy.query_interface(&id));
            assert!(Arc::ptr_eq(&same, &proxy));
        }
        assert_eq!(proxy.ref_count(), 4);
        assert_eq!(driver.native_ref_count(), 4);
        assert_eq!(proxy.revision(), ContextRevision::Rev1);
    }

    #[test]
    fn refused_upgrade_keeps_revision() {
        let (driver, _device, proxy) = setup(ContextRevision::Rev1, ContextRevision::Base);
        driver.refuse_upgrades(true);

        assert_eq!(
            proxy.upgrade_interface(&iid::ID3D11_DEVICE_CONTEXT1),
            Err(UpgradeError::Refused {
                requested: ContextRevision::Rev1,
                hr: HResult::E_NOINTERFACE,
            })
        );
        assert_eq!(
            proxy.query_interface(&iid::ID3D11_DEVICE_CONTEXT1).err(),
            Some(HResult::E_NOINTERFACE)
        );
        assert_eq!(proxy.revision(), ContextRevision::Base);
        assert_eq!((proxy.ref_count(), driver.native_ref_count()), (1, 1));
    }

    #[test]
    fn upgrade_answered_with_wrong_kind_is_released() {
        let (driver, _device, proxy) = setup(ContextRevision::Rev2, ContextRevision::Base);
        driver.answer_upgrades_with_foreign(true);

        assert_eq!(
            proxy.query_interface(&iid::ID3D11_DEVICE_CONTEXT2).err(),
            Some(HResult::E_NOINTERFACE)
        );
        assert_eq!(proxy.revision(), ContextRevision::Base);
        assert_eq!(driver.native_ref_count(), 1);
    }

    #[test]
    fn foreign_interfaces_come_from_the_native_object() {
        let (driver, _device, proxy) = setup(ContextRevision::Base, ContextRevision::Base);
        match proxy.query_interface(&FOREIGN_IID) {
            Ok(QueriedInterface::Native(native)) => {
                assert_eq!(driver.native_ref_count(), 2);
                assert_eq!(native.release(), 1);
            }
            other => panic!("expected a native interface, got {other:?}"),
        }
        assert_eq!(proxy.ref_count(), 1);
        assert_eq!(
            proxy.query_interface(&iid::ID3D11_RENDER_TARGET_VIEW).err(),
            Some(HResult::E_NOINTERFACE)
        );
    }

    #[test]
    fn get_device_adds_a_device_reference() {
        let (_driver, device, proxy) = setup(ContextRevision::Base, ContextRevision::Base);
        let got = proxy.get_device().expect("device is alive");
        assert_eq!(got.handle(), device.handle());
        assert_eq!(device.ref_count(), 2);
        got.release();
        assert_eq!(device.ref_count(), 1);
    }

    #[test]
    #[should_panic(expected = "ID3D11DeviceContext1 entry point")]
    fn newer_entry_point_on_older_revision_panics() {
        let (_driver, _device, proxy) = setup(ContextRevision::Rev4, ContextRevision::Base);
        proxy.discard_resource(crate::native::Resource(0x10));
    }

    #[test]
    fn pass_through_without_registry() {
        let (driver, _device, proxy) = setup(ContextRevision::Base, ContextRevision::Base);
        proxy.draw(3, 0);
        proxy.flush();
        assert_eq!(driver.calls(), vec!["draw", "flush"]);
        assert!(!proxy.has_open_render_pass());
    }
}
