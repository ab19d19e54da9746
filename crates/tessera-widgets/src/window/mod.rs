#![forbid(unsafe_code)]

//! Layered sub-windows.
//!
//! A [`LayeredWindow`] is an [`OverlaySurface`] with window chrome and a
//! place in a stack. The [`WindowStackService`] owns every open window,
//! keeps their z-indices consistent with their order, runs the modal
//! curtain, and drives the drag/resize interaction.
//!
//! Per window:
//!
//! ```text
//! Closed → Opening → Open → [Dragging | Resizing]* → Closing → Closed
//! ```

mod interaction;
mod stack;

use std::time::Duration;

use bitflags::bitflags;
use tessera_core::geometry::{Point, Rect, Size};
use tessera_core::metrics::NodeId;

use crate::overlay::{OverlayConfig, OverlaySurface};

pub use stack::WindowStackService;

pub(crate) use interaction::Interaction;

/// Z-index of the bottom window.
pub const WINDOW_Z_INDEX: i32 = 10000;
/// Cascade offset between successive default window positions.
pub const STACKING_OFFSET: i32 = 15;
/// Z-index of the drag/resize curtain.
pub const CURTAIN_Z_INDEX: i32 = 20000;

/// Handle of an open window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u32);

impl WindowId {
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

bitflags! {
    /// Behaviour switches of a window.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u8 {
        const DRAGGABLE = 0b0000_0001;
        const RESIZABLE = 0b0000_0010;
        const CLOSABLE = 0b0000_0100;
        const MODAL = 0b0000_1000;
        const CENTERED = 0b0001_0000;
        /// Defer content re-measurement until resizing pauses.
        const LAZY_RESIZE = 0b0010_0000;
    }
}

impl Default for WindowFlags {
    fn default() -> Self {
        Self::DRAGGABLE | Self::RESIZABLE | Self::CLOSABLE
    }
}

/// Stack-wide tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    /// Z-index of the window at order 0.
    pub base_z: i32,
    /// Cascade offset for windows without an explicit position.
    pub stacking_offset: i32,
    /// Z-index of the drag/resize curtain.
    pub curtain_z: i32,
    /// Default minimum content size for new windows.
    pub min_content_size: Size,
    /// Quiet period before a lazy resize re-measures content.
    pub lazy_resize_delay: Duration,
    /// Surface options used for every window.
    pub overlay: OverlayConfig,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            base_z: WINDOW_Z_INDEX,
            stacking_offset: STACKING_OFFSET,
            curtain_z: CURTAIN_Z_INDEX,
            min_content_size: Size::new(150, 100),
            lazy_resize_delay: Duration::from_millis(200),
            overlay: OverlayConfig::default(),
        }
    }
}

impl WindowConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn base_z(mut self, z: i32) -> Self {
        self.base_z = z;
        self
    }

    #[must_use]
    pub fn stacking_offset(mut self, offset: i32) -> Self {
        self.stacking_offset = offset;
        self
    }

    #[must_use]
    pub fn curtain_z(mut self, z: i32) -> Self {
        self.curtain_z = z;
        self
    }

    #[must_use]
    pub fn min_content_size(mut self, size: Size) -> Self {
        self.min_content_size = size;
        self
    }

    #[must_use]
    pub fn lazy_resize_delay(mut self, delay: Duration) -> Self {
        self.lazy_resize_delay = delay;
        self
    }

    #[must_use]
    pub fn overlay(mut self, overlay: OverlayConfig) -> Self {
        self.overlay = overlay;
        self
    }
}

/// Nodes making up a window's decoration, measured during resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowChrome {
    /// The whole window element.
    pub root: NodeId,
    pub header: NodeId,
    pub footer: NodeId,
    pub contents: NodeId,
}

/// Which part of a window an event hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowPart {
    Header,
    Footer,
    ResizeHandle,
    CloseButton,
    Content,
}

/// Outcome of a window interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The window came to the front after a pointer-down.
    Activated(WindowId),
    /// A drag ended.
    Moved { id: WindowId, position: Point },
    /// A resize was committed.
    Resized { id: WindowId, size: Size },
    /// The user asked to close; the `close` variable was signalled.
    CloseRequested(WindowId),
    /// Content must be re-measured after a size change.
    ContentLayoutRequested(WindowId),
}

/// A modal or drag/resize curtain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Curtain {
    /// The window the curtain belongs to.
    pub owner: WindowId,
    pub rect: Rect,
    pub z_index: i32,
}

/// A window as handed to [`WindowStackService::open`].
#[derive(Debug, Clone)]
pub struct LayeredWindow {
    component: String,
    chrome: WindowChrome,
    flags: WindowFlags,
    min_content_size: Option<Size>,
    explicit_position: Option<Point>,
    pub(crate) surface: Option<OverlaySurface>,
    pub(crate) order: usize,
    pub(crate) bring_to_front_sequence: i64,
    pub(crate) interaction: Interaction,
    pub(crate) reported_position: Option<Point>,
}

impl LayeredWindow {
    /// A window signalling variables as `component`.
    #[must_use]
    pub fn new(component: impl Into<String>, chrome: WindowChrome) -> Self {
        Self {
            component: component.into(),
            chrome,
            flags: WindowFlags::default(),
            min_content_size: None,
            explicit_position: None,
            surface: None,
            order: 0,
            bring_to_front_sequence: -1,
            interaction: Interaction::Idle,
            reported_position: None,
        }
    }

    /// Builder: replace all behaviour flags.
    #[must_use]
    pub fn flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn draggable(self, on: bool) -> Self {
        self.with_flag(WindowFlags::DRAGGABLE, on)
    }

    #[must_use]
    pub fn resizable(self, on: bool) -> Self {
        self.with_flag(WindowFlags::RESIZABLE, on)
    }

    #[must_use]
    pub fn closable(self, on: bool) -> Self {
        self.with_flag(WindowFlags::CLOSABLE, on)
    }

    #[must_use]
    pub fn modal(self, on: bool) -> Self {
        self.with_flag(WindowFlags::MODAL, on)
    }

    #[must_use]
    pub fn centered(self, on: bool) -> Self {
        self.with_flag(WindowFlags::CENTERED, on)
    }

    #[must_use]
    pub fn lazy_resize(self, on: bool) -> Self {
        self.with_flag(WindowFlags::LAZY_RESIZE, on)
    }

    /// Builder: open at an explicit position instead of cascading.
    #[must_use]
    pub fn at(mut self, left: i32, top: i32) -> Self {
        self.explicit_position = Some(Point::new(left, top));
        self
    }

    /// Builder: override the stack's minimum content size.
    #[must_use]
    pub fn min_content_size(mut self, size: Size) -> Self {
        self.min_content_size = Some(size);
        self
    }

    fn with_flag(mut self, flag: WindowFlags, on: bool) -> Self {
        self.flags.set(flag, on);
        self
    }

    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    #[must_use]
    pub fn chrome(&self) -> &WindowChrome {
        &self.chrome
    }

    #[must_use]
    pub fn is(&self, flag: WindowFlags) -> bool {
        self.flags.contains(flag)
    }

    pub(crate) fn set_flag(&mut self, flag: WindowFlags, on: bool) {
        self.flags.set(flag, on);
    }

    /// Position in the stack, 0 = bottom.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Pending bring-to-front request, `-1` when none.
    #[must_use]
    pub fn bring_to_front_sequence(&self) -> i64 {
        self.bring_to_front_sequence
    }

    /// The window's surface once opened.
    #[must_use]
    pub fn surface(&self) -> Option<&OverlaySurface> {
        self.surface.as_ref()
    }

    #[must_use]
    pub fn z_index(&self) -> Option<i32> {
        self.surface.as_ref().map(OverlaySurface::z_index)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::Dragging { .. })
    }

    #[must_use]
    pub fn is_resizing(&self) -> bool {
        matches!(self.interaction, Interaction::Resizing { .. })
    }

    pub(crate) fn explicit_position(&self) -> Option<Point> {
        self.explicit_position
    }

    pub(crate) fn min_content(&self, fallback: Size) -> Size {
        self.min_content_size.unwrap_or(fallback)
    }
}
