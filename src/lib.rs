//! Aero's graphics interception layer.
//!
//! - [`api`]: the version-independent event vocabulary and observer registry.
//! - [`d3d11`]: the Direct3D 11 device-context proxy that publishes into it.

pub use aero_intercept_api as api;
pub use aero_intercept_d3d11 as d3d11;
