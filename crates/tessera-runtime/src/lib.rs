#![forbid(unsafe_code)]

//! Host-side glue for Tessera overlays.
//!
//! - [`host::OverlayHost`] owns the window stack, notification registry and
//!   menu chain, routes input through them and commits deferred ordering.
//! - [`variables::BatchedVariables`] coalesces outgoing variables between
//!   round trips.
//! - [`policy_config::PolicyConfig`] holds every component tunable and loads
//!   from TOML/JSON with the `policy-config` feature.
//! - `logging` installs a `tracing` subscriber (`tracing-json` feature).

pub mod host;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod policy_config;
pub mod variables;

pub use host::{DispatchOutcome, HitTarget, OverlayHost, TickReport};
#[cfg(feature = "tracing-json")]
pub use logging::{LogConfig, LoggingError};
pub use policy_config::{PolicyConfig, PolicyConfigError};
pub use variables::BatchedVariables;
