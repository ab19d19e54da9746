#![forbid(unsafe_code)]

//! Grid layout engine and slot positioning.
//!
//! [`GridLayout`] sizes columns and rows from measured children, shares
//! spare space by expansion ratio and positions each child's
//! [`LayoutSlot`]. All measurement goes through
//! [`tessera_core::BoxMetrics`] and all results leave through
//! [`tessera_core::LayoutReporter`], so the engine runs headless.

pub mod grid;
pub mod slot;

pub use grid::{
    Cell, CellId, ChildPlacement, GridLayout, distribute_span_size, normalize_expand_ratios,
};
pub use slot::{
    Alignment, Axis, Caption, CaptionPlacement, HorizontalAlignment, LayoutSlot, SlotGeometry,
    VerticalAlignment,
};
