#![forbid(unsafe_code)]

//! Host environment: viewport and rendering capabilities.

use bitflags::bitflags;

use crate::geometry::{Point, Rect, Size};

bitflags! {
    /// Capability and quirk flags reported by the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EnvironmentFlags: u8 {
        const NONE = 0;
        /// Plugin/legacy content paints through overlay stacking gaps, so
        /// overlays need an inert shim layer behind them.
        const NEEDS_SHIM = 0b0001;
        /// Primary input is touch; centring uses the visual viewport.
        const TOUCH = 0b0010;
        /// The containing block is a relatively positioned body whose
        /// origin is shifted by its own margins.
        const RELATIVE_BODY = 0b0100;
    }
}

impl Default for EnvironmentFlags {
    fn default() -> Self {
        Self::NONE
    }
}

/// Snapshot of the host environment consulted during positioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    /// Layout viewport (client area) size.
    pub viewport: Size,
    /// Scroll offset of the viewport.
    pub scroll: Point,
    /// Visible portion of the layout viewport on zoomed mobile screens.
    pub visual_viewport: Option<Rect>,
    /// Offset between overlay coordinates and the containing block origin.
    /// Only meaningful with [`EnvironmentFlags::RELATIVE_BODY`].
    pub containing_block_offset: Point,
    /// Width of a native vertical scrollbar.
    pub scrollbar_size: i32,
    pub flags: EnvironmentFlags,
}

impl Environment {
    /// A desktop environment with the given viewport and no quirks.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            viewport: Size::new(width, height),
            scroll: Point::ZERO,
            visual_viewport: None,
            containing_block_offset: Point::ZERO,
            scrollbar_size: 17,
            flags: EnvironmentFlags::NONE,
        }
    }

    /// Builder: set capability flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: EnvironmentFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Builder: set the visual viewport.
    #[must_use]
    pub const fn with_visual_viewport(mut self, visual: Rect) -> Self {
        self.visual_viewport = Some(visual);
        self
    }

    /// Builder: set the relative-body origin shift.
    #[must_use]
    pub const fn with_containing_block_offset(mut self, offset: Point) -> Self {
        self.containing_block_offset = offset;
        self.flags = self.flags.union(EnvironmentFlags::RELATIVE_BODY);
        self
    }

    /// Builder: set the viewport scroll offset.
    #[must_use]
    pub const fn with_scroll(mut self, scroll: Point) -> Self {
        self.scroll = scroll;
        self
    }

    /// Builder: set the native scrollbar width.
    #[must_use]
    pub const fn with_scrollbar_size(mut self, size: i32) -> Self {
        self.scrollbar_size = size;
        self
    }

    /// Whether overlays need a shim layer.
    #[must_use]
    pub const fn needs_shim(&self) -> bool {
        self.flags.contains(EnvironmentFlags::NEEDS_SHIM)
    }

    /// Whether the primary input is touch.
    #[must_use]
    pub const fn is_touch(&self) -> bool {
        self.flags.contains(EnvironmentFlags::TOUCH)
    }

    /// The origin fix applied to overlay positions.
    #[must_use]
    pub const fn origin_fix(&self) -> Point {
        if self.flags.contains(EnvironmentFlags::RELATIVE_BODY) {
            self.containing_block_offset
        } else {
            Point::ZERO
        }
    }

    /// Whether a viewport-relative point lies inside the client area.
    #[must_use]
    pub const fn viewport_contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.viewport.width && y >= 0 && y < self.viewport.height
    }

    /// Area used for centring overlays.
    #[must_use]
    pub fn centering_area(&self) -> Rect {
        match self.visual_viewport {
            Some(visual) if self.is_touch() => visual,
            _ => Rect::new(
                self.scroll.x,
                self.scroll.y,
                self.viewport.width,
                self.viewport.height,
            ),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}
