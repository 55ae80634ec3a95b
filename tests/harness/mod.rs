#![allow(dead_code)]

use std::sync::Arc;

use aero_intercept::api::{EventKind, EventRegistry};
use aero_intercept::d3d11::testing::{EventRecorder, FakeDevice, FakeDriver};
use aero_intercept::d3d11::{ContextRevision, DeviceContextProxy, InterceptConfig, ProxyDevice};

/// A proxy wired to a simulated driver and a registry with one recorder.
pub struct Rig {
    pub driver: FakeDriver,
    pub device: Arc<FakeDevice>,
    pub registry: Arc<EventRegistry>,
    pub recorder: Arc<EventRecorder>,
    pub proxy: Arc<DeviceContextProxy>,
}

impl Rig {
    /// Immediate context at `revision`, recording every event kind.
    pub fn new(revision: ContextRevision) -> Self {
        Self::build(FakeDriver::new(ContextRevision::Rev4), revision, &EventKind::ALL)
    }

    /// Immediate context at `revision`, recording only `kinds`.
    pub fn observing(revision: ContextRevision, kinds: &[EventKind]) -> Self {
        Self::build(FakeDriver::new(ContextRevision::Rev4), revision, kinds)
    }

    pub fn deferred() -> Self {
        Self::build(
            FakeDriver::deferred(ContextRevision::Rev4),
            ContextRevision::Base,
            &EventKind::ALL,
        )
    }

    pub fn build(driver: FakeDriver, revision: ContextRevision, kinds: &[EventKind]) -> Self {
        Self::build_with_config(driver, revision, kinds, InterceptConfig::default())
    }

    pub fn build_with_config(
        driver: FakeDriver,
        revision: ContextRevision,
        kinds: &[EventKind],
        config: InterceptConfig,
    ) -> Self {
        let device = FakeDevice::new();
        let registry = Arc::new(EventRegistry::new());
        let recorder = EventRecorder::attach(&registry, kinds);
        let dyn_device: Arc<dyn ProxyDevice> = device.clone();
        let proxy = DeviceContextProxy::new(
            &dyn_device,
            driver.create_context(revision),
            Some(Arc::clone(&registry)),
            config,
        );
        Self {
            driver,
            device,
            registry,
            recorder,
            proxy,
        }
    }
}
