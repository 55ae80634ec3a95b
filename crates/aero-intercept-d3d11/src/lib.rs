//! Direct3D 11 device-context interception.
//!
//! A [`DeviceContextProxy`] wraps a native device context and is handed to the application in
//! its place. Every call is forwarded to the native context unchanged. Calls that affect what is
//! drawn (pipeline and descriptor binds, render-target changes, draws, copies, clears, command
//! list recording and execution) are additionally translated into the normalized
//! [`aero_intercept_api::Event`] vocabulary and published to the observers registered in an
//! [`aero_intercept_api::EventRegistry`]. Observers of pre-call events can veto the native call.
//!
//! The native side is modelled by the traits in [`native`]: one trait per interface revision
//! (`ID3D11DeviceContext` through `ID3D11DeviceContext4`). The proxy implements the same traits,
//! so anything that drives a native context can drive a proxy instead.
//!
//! The proxy negotiates its revision lazily. It starts at the revision of the native context it
//! was created from and upgrades when an application queries for a newer context interface.

mod command_list;
mod config;
mod context;
mod convert;
mod device;
mod error;
mod events;
mod guid;
mod hresult;
pub mod limits;
pub mod native;
mod render_pass;
mod revision;
mod stats;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use command_list::CommandListProxy;
pub use config::{InterceptConfig, DISABLE_EVENTS_ENV, VERBOSE_LOG_ENV};
pub use context::{DeviceContextProxy, QueriedInterface};
pub use device::ProxyDevice;
pub use error::UpgradeError;
pub use guid::{iid, Guid};
pub use hresult::HResult;
pub use revision::{resolve as resolve_interface, ContextRevision, Resolution};
pub use stats::{ContextStats, ContextStatsSnapshot};
