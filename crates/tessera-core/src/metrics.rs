#![forbid(unsafe_code)]

//! Box-model measurement and layout-result reporting.
//!
//! Layout and overlay code never touches a rendering backend directly.
//! It reads sizes through [`BoxMetrics`] and pushes results out through
//! [`LayoutReporter`]. [`HeadlessMetrics`] and [`RecordingReporter`] are
//! in-memory implementations for hosts without a real box model (and for
//! tests).

use ahash::AHashMap;

use crate::geometry::{Sides, Size};

/// Opaque handle for a measurable element or component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node id.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Synchronous read access to the current rendered box model.
///
/// Outer sizes include padding and border; inner sizes are the content
/// box. Unknown nodes measure as zero.
pub trait BoxMetrics {
    fn outer_width(&self, node: NodeId) -> i32;
    fn outer_height(&self, node: NodeId) -> i32;
    fn inner_width(&self, node: NodeId) -> i32;
    fn inner_height(&self, node: NodeId) -> i32;
    fn padding(&self, node: NodeId) -> Sides;
    /// Left + right border.
    fn border_width(&self, node: NodeId) -> i32;
    /// Top + bottom border.
    fn border_height(&self, node: NodeId) -> i32;

    /// Outer width and height together.
    fn outer_size(&self, node: NodeId) -> Size {
        Size::new(self.outer_width(node), self.outer_height(node))
    }
}

/// Receiver for layout results produced by a pass.
pub trait LayoutReporter {
    /// The owner's outer width was computed from its content.
    fn report_outer_width(&mut self, owner: NodeId, px: i32);
    /// The owner's outer height was computed from its content.
    fn report_outer_height(&mut self, owner: NodeId, px: i32);
    /// A percentage-width child was resolved to a pixel width.
    fn report_width_assigned_to_relative(&mut self, child: NodeId, px: i32);
    /// A percentage-height child was resolved to a pixel height.
    fn report_height_assigned_to_relative(&mut self, child: NodeId, px: i32);
    /// The child must be re-measured before its size is trusted again.
    fn set_needs_measure(&mut self, child: NodeId);
}

/// Stored box model for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeBox {
    /// Outer (border-box) size.
    pub outer: Size,
    pub padding: Sides,
    pub border: Sides,
}

impl NodeBox {
    /// A box with the given outer size and no padding or border.
    #[must_use]
    pub const fn sized(width: i32, height: i32) -> Self {
        Self {
            outer: Size::new(width, height),
            padding: Sides::all(0),
            border: Sides::all(0),
        }
    }

    /// Builder: set padding.
    #[must_use]
    pub const fn padding(mut self, padding: Sides) -> Self {
        self.padding = padding;
        self
    }

    /// Builder: set border.
    #[must_use]
    pub const fn border(mut self, border: Sides) -> Self {
        self.border = border;
        self
    }
}

/// In-memory [`BoxMetrics`] backend.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMetrics {
    boxes: AHashMap<NodeId, NodeBox>,
}

impl HeadlessMetrics {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full box for a node.
    pub fn set(&mut self, node: NodeId, node_box: NodeBox) {
        self.boxes.insert(node, node_box);
    }

    /// Set only the outer size for a node, keeping padding and border.
    pub fn set_outer(&mut self, node: NodeId, width: i32, height: i32) {
        self.boxes.entry(node).or_default().outer = Size::new(width, height);
    }

    /// Builder form of [`HeadlessMetrics::set`].
    #[must_use]
    pub fn with(mut self, node: NodeId, node_box: NodeBox) -> Self {
        self.set(node, node_box);
        self
    }

    /// Forget a node.
    pub fn remove(&mut self, node: NodeId) {
        self.boxes.remove(&node);
    }

    fn get(&self, node: NodeId) -> NodeBox {
        self.boxes.get(&node).copied().unwrap_or_default()
    }
}

impl BoxMetrics for HeadlessMetrics {
    fn outer_width(&self, node: NodeId) -> i32 {
        self.get(node).outer.width
    }

    fn outer_height(&self, node: NodeId) -> i32 {
        self.get(node).outer.height
    }

    fn inner_width(&self, node: NodeId) -> i32 {
        let b = self.get(node);
        (b.outer.width - b.padding.horizontal_sum() - b.border.horizontal_sum()).max(0)
    }

    fn inner_height(&self, node: NodeId) -> i32 {
        let b = self.get(node);
        (b.outer.height - b.padding.vertical_sum() - b.border.vertical_sum()).max(0)
    }

    fn padding(&self, node: NodeId) -> Sides {
        self.get(node).padding
    }

    fn border_width(&self, node: NodeId) -> i32 {
        self.get(node).border.horizontal_sum()
    }

    fn border_height(&self, node: NodeId) -> i32 {
        self.get(node).border.vertical_sum()
    }
}

/// One report captured by [`RecordingReporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutReport {
    OuterWidth(NodeId, i32),
    OuterHeight(NodeId, i32),
    RelativeWidth(NodeId, i32),
    RelativeHeight(NodeId, i32),
    NeedsMeasure(NodeId),
}

/// [`LayoutReporter`] that records every report in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    reports: Vec<LayoutReport>,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports so far, oldest first.
    #[must_use]
    pub fn reports(&self) -> &[LayoutReport] {
        &self.reports
    }

    /// Most recent outer width reported for `owner`.
    #[must_use]
    pub fn last_outer_width(&self, owner: NodeId) -> Option<i32> {
        self.reports.iter().rev().find_map(|r| match *r {
            LayoutReport::OuterWidth(n, px) if n == owner => Some(px),
            _ => None,
        })
    }

    /// Most recent outer height reported for `owner`.
    #[must_use]
    pub fn last_outer_height(&self, owner: NodeId) -> Option<i32> {
        self.reports.iter().rev().find_map(|r| match *r {
            LayoutReport::OuterHeight(n, px) if n == owner => Some(px),
            _ => None,
        })
    }

    /// Most recent relative width resolved for `child`.
    #[must_use]
    pub fn last_relative_width(&self, child: NodeId) -> Option<i32> {
        self.reports.iter().rev().find_map(|r| match *r {
            LayoutReport::RelativeWidth(n, px) if n == child => Some(px),
            _ => None,
        })
    }

    /// Most recent relative height resolved for `child`.
    #[must_use]
    pub fn last_relative_height(&self, child: NodeId) -> Option<i32> {
        self.reports.iter().rev().find_map(|r| match *r {
            LayoutReport::RelativeHeight(n, px) if n == child => Some(px),
            _ => None,
        })
    }

    /// Number of re-measure requests for `child`.
    #[must_use]
    pub fn measure_requests(&self, child: NodeId) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r, LayoutReport::NeedsMeasure(n) if *n == child))
            .count()
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }
}

impl LayoutReporter for RecordingReporter {
    fn report_outer_width(&mut self, owner: NodeId, px: i32) {
        self.reports.push(LayoutReport::OuterWidth(owner, px));
    }

    fn report_outer_height(&mut self, owner: NodeId, px: i32) {
        self.reports.push(LayoutReport::OuterHeight(owner, px));
    }

    fn report_width_assigned_to_relative(&mut self, child: NodeId, px: i32) {
        self.reports.push(LayoutReport::RelativeWidth(child, px));
    }

    fn report_height_assigned_to_relative(&mut self, child: NodeId, px: i32) {
        self.reports.push(LayoutReport::RelativeHeight(child, px));
    }

    fn set_needs_measure(&mut self, child: NodeId) {
        self.reports.push(LayoutReport::NeedsMeasure(child));
    }
}
