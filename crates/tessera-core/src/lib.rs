#![forbid(unsafe_code)]

//! Core: geometry, input events, box metrics, and timing for Tessera.
//!
//! # Role in Tessera
//! `tessera-core` is the leaf crate. It defines the vocabulary the layout
//! engine and the overlay widgets share, and the narrow traits through
//! which they reach their environment.
//!
//! # Primary responsibilities
//! - **Geometry**: signed pixel `Point`, `Size`, `Rect`, `Sides`.
//! - **Event**: pointer, key, wheel, scroll and capture-loss input.
//! - **Metrics**: the `BoxMetrics` / `LayoutReporter` boundary plus
//!   headless implementations.
//! - **Timing**: `Animation` tweens, a deterministic `Scheduler`, and a
//!   wall-clock `FrameClock`.
//! - **Environment**: viewport and rendering-quirk capabilities.
//! - **Variables**: the fire-and-forget `VariableSink` channel.

pub mod animation;
pub mod environment;
pub mod event;
pub mod geometry;
pub mod metrics;
pub mod scheduler;
pub mod variables;

pub use environment::{Environment, EnvironmentFlags};
pub use geometry::{Point, Rect, Sides, Size};
pub use metrics::{BoxMetrics, LayoutReporter, NodeId};
pub use variables::{VariableSink, VariableValue};
