#![forbid(unsafe_code)]

//! Layout slots: positioning one child inside the space a layout allocated.
//!
//! A slot wraps a child node (and an optional caption). The owning layout
//! decides *where* the slot starts and *how much* room it gets; the slot
//! decides where the child sits inside that room according to its
//! [`Alignment`], and resolves percentage sizes to pixels.
//!
//! Results are written into [`SlotGeometry`] rather than applied to a
//! rendering backend, so hosts can read them back after a pass.

use serde::{Deserialize, Serialize};
use tessera_core::geometry::Rect;
use tessera_core::metrics::{BoxMetrics, LayoutReporter, NodeId};

/// Layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Horizontal placement inside a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement inside a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Combined child alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
}

impl Alignment {
    pub const TOP_LEFT: Self = Self::new(HorizontalAlignment::Left, VerticalAlignment::Top);
    pub const MIDDLE_CENTER: Self =
        Self::new(HorizontalAlignment::Center, VerticalAlignment::Middle);
    pub const BOTTOM_RIGHT: Self = Self::new(HorizontalAlignment::Right, VerticalAlignment::Bottom);

    // Wire bitmask used by server-side alignment data.
    const BIT_LEFT: u8 = 1;
    const BIT_RIGHT: u8 = 2;
    const BIT_TOP: u8 = 4;
    const BIT_BOTTOM: u8 = 8;
    const BIT_H_CENTER: u8 = 16;
    const BIT_V_CENTER: u8 = 32;

    /// Create an alignment.
    #[must_use]
    pub const fn new(horizontal: HorizontalAlignment, vertical: VerticalAlignment) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Decode the server alignment bitmask. Missing bits mean left/top.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        let horizontal = if bits & Self::BIT_H_CENTER != 0 {
            HorizontalAlignment::Center
        } else if bits & Self::BIT_RIGHT != 0 {
            HorizontalAlignment::Right
        } else {
            HorizontalAlignment::Left
        };
        let vertical = if bits & Self::BIT_V_CENTER != 0 {
            VerticalAlignment::Middle
        } else if bits & Self::BIT_BOTTOM != 0 {
            VerticalAlignment::Bottom
        } else {
            VerticalAlignment::Top
        };
        Self::new(horizontal, vertical)
    }

    /// Encode back into the server bitmask.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        let h = match self.horizontal {
            HorizontalAlignment::Left => Self::BIT_LEFT,
            HorizontalAlignment::Center => Self::BIT_H_CENTER,
            HorizontalAlignment::Right => Self::BIT_RIGHT,
        };
        let v = match self.vertical {
            VerticalAlignment::Top => Self::BIT_TOP,
            VerticalAlignment::Middle => Self::BIT_V_CENTER,
            VerticalAlignment::Bottom => Self::BIT_BOTTOM,
        };
        h | v
    }
}

/// Where a caption sits relative to its child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptionPlacement {
    /// Caption above the child (the common case).
    #[default]
    Above,
    /// Caption after (to the right of) the child, e.g. checkbox labels.
    After,
}

/// A caption attached to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caption {
    pub node: NodeId,
    pub placement: CaptionPlacement,
}

/// Output of the last positioning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotGeometry {
    /// Wrapper box relative to the layout's padding box.
    pub wrapper: Rect,
    /// Trailing margin reserved for the layout's own padding.
    pub margin_right: i32,
    pub margin_bottom: i32,
    /// Room kept for an after-caption.
    pub padding_right: i32,
    /// Room kept for an above-caption.
    pub padding_top: i32,
    /// Child offset inside the wrapper; `None` means flush left/top.
    pub child_left: Option<i32>,
    pub child_top: Option<i32>,
    /// Caption offset inside the wrapper, when a caption is present.
    pub caption_left: Option<i32>,
    pub caption_top: Option<i32>,
}

/// One child's slot in a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSlot {
    child: NodeId,
    caption: Option<Caption>,
    alignment: Alignment,
    relative_width: Option<f32>,
    relative_height: Option<f32>,
    geometry: SlotGeometry,
}

impl LayoutSlot {
    /// Slot for a fixed- or content-sized child.
    #[must_use]
    pub fn new(child: NodeId) -> Self {
        Self {
            child,
            caption: None,
            alignment: Alignment::TOP_LEFT,
            relative_width: None,
            relative_height: None,
            geometry: SlotGeometry::default(),
        }
    }

    /// Builder: child width is `percent`% of the allocated space.
    #[must_use]
    pub fn relative_width(mut self, percent: f32) -> Self {
        self.relative_width = Some(percent);
        self
    }

    /// Builder: child height is `percent`% of the allocated space.
    #[must_use]
    pub fn relative_height(mut self, percent: f32) -> Self {
        self.relative_height = Some(percent);
        self
    }

    /// Builder: attach a caption.
    #[must_use]
    pub fn caption(mut self, node: NodeId, placement: CaptionPlacement) -> Self {
        self.caption = Some(Caption { node, placement });
        self
    }

    /// Builder: set alignment.
    #[must_use]
    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    #[must_use]
    pub fn child(&self) -> NodeId {
        self.child
    }

    #[must_use]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    /// Replace or remove the caption.
    pub fn set_caption(&mut self, caption: Option<Caption>) {
        self.caption = caption;
    }

    #[must_use]
    pub fn geometry(&self) -> &SlotGeometry {
        &self.geometry
    }

    /// Whether the child is percentage-sized on `axis`.
    #[must_use]
    pub fn is_relative(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.relative_width.is_some(),
            Axis::Vertical => self.relative_height.is_some(),
        }
    }

    fn caption_width(&self, metrics: &dyn BoxMetrics) -> i32 {
        self.caption.map_or(0, |c| metrics.outer_width(c.node))
    }

    fn caption_height(&self, metrics: &dyn BoxMetrics) -> i32 {
        self.caption.map_or(0, |c| metrics.outer_height(c.node))
    }

    /// Width the slot needs: the child plus any caption.
    #[must_use]
    pub fn used_width(&self, metrics: &dyn BoxMetrics) -> i32 {
        let widget = metrics.outer_width(self.child);
        match self.caption {
            None => widget,
            Some(c) if c.placement == CaptionPlacement::After => {
                widget + self.caption_width(metrics)
            }
            Some(_) => widget.max(self.caption_width(metrics)),
        }
    }

    /// Height the slot needs: the child plus any caption.
    #[must_use]
    pub fn used_height(&self, metrics: &dyn BoxMetrics) -> i32 {
        let widget = metrics.outer_height(self.child);
        match self.caption {
            None => widget,
            Some(c) if c.placement == CaptionPlacement::After => {
                widget.max(self.caption_height(metrics))
            }
            Some(_) => widget + self.caption_height(metrics),
        }
    }

    /// Used size on `axis`.
    #[must_use]
    pub fn used_size(&self, axis: Axis, metrics: &dyn BoxMetrics) -> i32 {
        match axis {
            Axis::Horizontal => self.used_width(metrics),
            Axis::Vertical => self.used_height(metrics),
        }
    }

    /// Position along `axis`.
    pub fn position(
        &mut self,
        axis: Axis,
        location: i32,
        allocated: i32,
        trailing_margin: i32,
        metrics: &dyn BoxMetrics,
        reporter: &mut dyn LayoutReporter,
    ) {
        match axis {
            Axis::Horizontal => {
                self.position_horizontally(location, allocated, trailing_margin, metrics, reporter);
            }
            Axis::Vertical => {
                self.position_vertically(location, allocated, trailing_margin, metrics, reporter);
            }
        }
    }

    /// Place the slot at `location` with `allocated` width.
    pub fn position_horizontally(
        &mut self,
        location: i32,
        allocated: i32,
        margin_right: i32,
        metrics: &dyn BoxMetrics,
        reporter: &mut dyn LayoutReporter,
    ) {
        let mut available = f64::from(allocated);
        let caption_width = self.caption_width(metrics);
        let caption_above = match self.caption {
            None => None,
            Some(c) if c.placement == CaptionPlacement::After => {
                available = (available - f64::from(caption_width)).max(0.0);
                Some(false)
            }
            Some(_) => Some(true),
        };

        let geo = &mut self.geometry;
        geo.padding_right = if caption_above == Some(false) {
            caption_width
        } else {
            0
        };
        geo.margin_right = margin_right.max(0);
        geo.wrapper.x = location;
        geo.wrapper.width = available as i32;

        let used = match self.relative_width {
            Some(percent) => {
                let content = available * f64::from(percent) / 100.0;
                reporter.report_width_assigned_to_relative(self.child, content.round() as i32);
                content
            }
            None => f64::from(metrics.outer_width(self.child)),
        };

        if self.alignment.horizontal == HorizontalAlignment::Left {
            geo.child_left = None;
            geo.caption_left = caption_above.map(|above| if above { 0 } else { used as i32 });
        } else {
            let mut padding = available - used;
            if self.alignment.horizontal == HorizontalAlignment::Center {
                padding /= 2.0;
            }
            let rounded = padding.round() as i32;
            geo.child_left = Some(rounded);
            geo.caption_left = caption_above.map(|above| {
                if above {
                    rounded
                } else {
                    rounded + used as i32
                }
            });
        }
    }

    /// Place the slot at `location` with `allocated` height.
    pub fn position_vertically(
        &mut self,
        location: i32,
        allocated: i32,
        margin_bottom: i32,
        metrics: &dyn BoxMetrics,
        reporter: &mut dyn LayoutReporter,
    ) {
        let allocated = f64::from(allocated);
        let mut content_height = allocated;
        let caption_height = match self.caption {
            Some(c) if c.placement == CaptionPlacement::Above => {
                let h = self.caption_height(metrics);
                content_height = (content_height - f64::from(h)).max(0.0);
                h
            }
            _ => 0,
        };
        let has_caption = self.caption.is_some();
        let used_height = self.used_height(metrics);

        let geo = &mut self.geometry;
        geo.padding_top = caption_height;
        geo.margin_bottom = margin_bottom.max(0);
        geo.wrapper.y = location;
        geo.wrapper.height = content_height as i32;

        let relative_content = self.relative_height.map(|percent| {
            let content = content_height * f64::from(percent) / 100.0;
            reporter.report_height_assigned_to_relative(self.child, content.round() as i32);
            content
        });

        if self.alignment.vertical == VerticalAlignment::Top {
            geo.child_top = None;
            geo.caption_top = has_caption.then_some(0);
        } else {
            let used = match relative_content {
                Some(content) => f64::from(caption_height) + content,
                None => f64::from(used_height),
            };
            let mut padding = allocated - used;
            if self.alignment.vertical == VerticalAlignment::Middle {
                padding /= 2.0;
            }
            padding += f64::from(caption_height);
            let rounded = padding.round() as i32;
            geo.child_top = Some(rounded);
            geo.caption_top = has_caption.then_some(rounded - caption_height);
        }
    }
}
