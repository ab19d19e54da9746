#![forbid(unsafe_code)]

//! Tessera public facade crate.
//!
//! Re-exports the grid layout engine, the overlay widgets and the host
//! runtime, and offers a prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use tessera_core::environment::{Environment, EnvironmentFlags};
pub use tessera_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerButton, PointerEvent,
    PointerEventKind, WheelEvent,
};
pub use tessera_core::geometry::{Point, Rect, Sides, Size};
pub use tessera_core::metrics::{BoxMetrics, LayoutReporter, NodeId};
pub use tessera_core::variables::{VariableSink, VariableUpdate, VariableValue};

// --- Layout re-exports -----------------------------------------------------

pub use tessera_layout::{Alignment, Axis, ChildPlacement, GridLayout, LayoutSlot};

// --- Widget re-exports -----------------------------------------------------

pub use tessera_widgets::{
    DelayPolicy, LayeredWindow, MenuPopupChain, NotificationCenter, NotificationPosition,
    OverlayConfig, OverlaySurface, WindowChrome, WindowEvent, WindowId, WindowPart,
    WindowStackService,
};

// --- Runtime re-exports ----------------------------------------------------

pub use tessera_runtime::{
    BatchedVariables, HitTarget, OverlayHost, PolicyConfig, PolicyConfigError,
};
#[cfg(feature = "tracing-json")]
pub use tessera_runtime::{LogConfig, LoggingError};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Tessera hosts.
#[derive(Debug)]
pub enum Error {
    /// Policy configuration could not be loaded or is invalid.
    Config(PolicyConfigError),
    /// The tracing subscriber could not be installed.
    #[cfg(feature = "tracing-json")]
    Logging(LoggingError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "policy config: {err}"),
            #[cfg(feature = "tracing-json")]
            Self::Logging(err) => write!(f, "logging: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            #[cfg(feature = "tracing-json")]
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<PolicyConfigError> for Error {
    fn from(err: PolicyConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "tracing-json")]
impl From<LoggingError> for Error {
    fn from(err: LoggingError) -> Self {
        Self::Logging(err)
    }
}

/// Standard result type for Tessera APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Build a host from a validated policy.
pub fn host_from_policy(env: Environment, policy: PolicyConfig) -> Result<OverlayHost> {
    let policy = policy.validated()?;
    Ok(OverlayHost::from_policy(env, &policy))
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BoxMetrics, Environment, Error, Event, GridLayout, HitTarget, LayeredWindow, NodeId,
        OverlayHost, PolicyConfig, Rect, Result, Size, VariableSink, WindowChrome,
    };

    pub use crate::{core, layout, runtime, widgets};
}

pub use tessera_core as core;
pub use tessera_layout as layout;
pub use tessera_runtime as runtime;
pub use tessera_widgets as widgets;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_policy_surfaces_as_config_error() {
        let mut policy = PolicyConfig::default();
        policy.notification.start_opacity = 120;
        let err = host_from_policy(Environment::default(), policy).unwrap_err();
        assert!(matches!(err, Error::Config(PolicyConfigError::Validation(_))));
        assert!(err.to_string().starts_with("policy config: validation errors"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn default_policy_builds_host() {
        let host = host_from_policy(Environment::new(640, 480), PolicyConfig::default());
        assert!(host.is_ok_and(|h| h.windows().is_empty()));
    }
}
