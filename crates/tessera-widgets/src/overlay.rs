#![forbid(unsafe_code)]

//! Floating overlay surfaces with shadow and shim layers.
//!
//! An [`OverlaySurface`] is one floating layer positioned in viewport
//! coordinates. While attached it keeps two optional companion layers in
//! sync with its box:
//!
//! - a **shadow** drawn beneath the surface, and
//! - a **shim**, an inert layer that stops foreign content from painting
//!   through, created only when the [`Environment`] asks for one.
//!
//! # Lifecycle
//!
//! ```text
//! Hidden ──show──▶ Opening ──tick/cancel──▶ Open ──hide──▶ Closing ──tick──▶ Hidden
//!                     │                       │                │
//!                     └─hide: deferred────────┘  (no close     └─show: reverse
//!                                                 animation:
//!                                                 straight to Hidden)
//! ```
//!
//! # Invariants
//!
//! 1. While Opening or Open, shadow and shim (if present) share the surface
//!    box interpolated by [`OverlayBox::animate_from_center`].
//! 2. The shadow is invisible while progress < 0.9.
//! 3. `hide()` detaches shadow and shim synchronously, whatever the phase.
//! 4. A surface that is not attached ignores position and size updates.

use std::time::Duration;

use tessera_core::animation::{Animation, Tween};
use tessera_core::environment::Environment;
use tessera_core::geometry::{Point, Rect};
use tessera_core::metrics::{BoxMetrics, NodeId};

/// Default z-index of overlays.
pub const OVERLAY_Z_INDEX: i32 = 20000;

/// Progress below which the shadow stays hidden.
const SHADOW_VISIBLE_FROM: f32 = 0.9;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Construction-time options for an [`OverlaySurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    /// Initial z-index.
    pub z_index: i32,
    /// Whether a shadow layer is kept under the surface.
    pub shadow: bool,
    /// Open animation length. `None` or zero opens instantly.
    pub open_duration: Option<Duration>,
    /// Close animation length. `None` or zero closes instantly.
    pub close_duration: Option<Duration>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            z_index: OVERLAY_Z_INDEX,
            shadow: true,
            open_duration: None,
            close_duration: None,
        }
    }
}

impl OverlayConfig {
    /// Default configuration: z 20000, shadow on, no animations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    #[must_use]
    pub fn shadow(mut self, enabled: bool) -> Self {
        self.shadow = enabled;
        self
    }

    #[must_use]
    pub fn open_duration(mut self, duration: Duration) -> Self {
        self.open_duration = Some(duration);
        self
    }

    #[must_use]
    pub fn close_duration(mut self, duration: Duration) -> Self {
        self.close_duration = Some(duration);
        self
    }

    fn open_tween(&self) -> Option<Tween> {
        self.open_duration
            .filter(|d| !d.is_zero())
            .map(Tween::new)
    }

    fn close_tween(&self) -> Option<Tween> {
        self.close_duration
            .filter(|d| !d.is_zero())
            .map(Tween::new)
    }
}

// ----------------------------------------------------------------------------
// Geometry
// ----------------------------------------------------------------------------

/// Position and size of an overlay, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl OverlayBox {
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The box as it appears `progress` of the way through a grow-from-centre
    /// animation. Progress 1.0 returns the box unchanged.
    #[must_use]
    pub fn animate_from_center(self, progress: f32) -> Self {
        let p = f64::from(progress.clamp(0.0, 1.0));
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        Self {
            left: self.left + (w * (1.0 - p) / 2.0) as i32,
            top: self.top + (h * (1.0 - p) / 2.0) as i32,
            width: (w * p) as i32,
            height: (h * p) as i32,
        }
    }

    #[must_use]
    pub const fn to_rect(self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

/// A companion layer (shadow or shim) mirroring the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanionLayer {
    pub rect: Rect,
    pub z_index: i32,
    pub visible: bool,
}

// ----------------------------------------------------------------------------
// Surface
// ----------------------------------------------------------------------------

/// Lifecycle phase of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    /// Not attached.
    #[default]
    Hidden,
    /// Attached, open animation running.
    Opening,
    /// Attached and at rest.
    Open,
    /// Close animation running; shadow and shim already gone.
    Closing,
}

impl OverlayPhase {
    /// Whether the surface is attached to the viewport.
    #[inline]
    #[must_use]
    pub fn is_attached(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// One floating surface.
#[derive(Debug, Clone)]
pub struct OverlaySurface {
    node: NodeId,
    owner: Option<NodeId>,
    config: OverlayConfig,
    phase: OverlayPhase,
    left: i32,
    top: i32,
    width: Option<i32>,
    height: Option<i32>,
    z_index: i32,
    visible: bool,
    needs_shim: bool,
    origin_fix: Option<Point>,
    animation: Option<Tween>,
    hide_pending: bool,
    progress: f32,
    bounds: Option<OverlayBox>,
    shadow: Option<CompanionLayer>,
    shim: Option<CompanionLayer>,
}

impl OverlaySurface {
    /// A hidden surface for `node` (the element measured for "auto" size).
    #[must_use]
    pub fn new(node: NodeId, config: OverlayConfig) -> Self {
        Self {
            node,
            owner: None,
            config,
            phase: OverlayPhase::Hidden,
            left: 0,
            top: 0,
            width: None,
            height: None,
            z_index: config.z_index,
            visible: true,
            needs_shim: false,
            origin_fix: None,
            animation: None,
            hide_pending: false,
            progress: 0.0,
            bounds: None,
            shadow: None,
            shim: None,
        }
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Component this overlay logically belongs to.
    #[must_use]
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Option<NodeId>) {
        self.owner = owner;
    }

    #[must_use]
    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.phase.is_attached()
    }

    /// Requested position (before the origin fix).
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    #[must_use]
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Explicit width, `None` when sized by content.
    #[must_use]
    pub fn width(&self) -> Option<i32> {
        self.width
    }

    /// Explicit height, `None` when sized by content.
    #[must_use]
    pub fn height(&self) -> Option<i32> {
        self.height
    }

    /// Progress reported by the last geometry update.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Full (un-animated) surface box from the last update.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds.map(OverlayBox::to_rect)
    }

    #[must_use]
    pub fn shadow(&self) -> Option<&CompanionLayer> {
        self.shadow.as_ref()
    }

    #[must_use]
    pub fn shim(&self) -> Option<&CompanionLayer> {
        self.shim.as_ref()
    }

    /// Attach the surface.
    ///
    /// Returns `false` if the surface was already opening or open.
    pub fn show(&mut self, metrics: &dyn BoxMetrics, env: &Environment) -> bool {
        match self.phase {
            OverlayPhase::Opening | OverlayPhase::Open => {
                tracing::warn!(
                    node = self.node.get(),
                    phase = ?self.phase,
                    "overlay show refused: already showing"
                );
                return false;
            }
            OverlayPhase::Closing => {
                let closed = self.animation.map_or(1.0, |t| t.progress());
                self.animation = self
                    .config
                    .open_tween()
                    .map(|t| t.starting_at(1.0 - closed));
                tracing::debug!(node = self.node.get(), "overlay close reversed");
            }
            OverlayPhase::Hidden => {
                self.animation = self.config.open_tween();
                tracing::debug!(node = self.node.get(), "overlay shown");
            }
        }

        self.needs_shim = env.needs_shim();
        self.ensure_origin_fix(env);
        self.hide_pending = false;
        match self.animation {
            Some(tween) => {
                self.phase = OverlayPhase::Opening;
                self.position_or_size_updated(tween.value(), metrics);
            }
            None => {
                self.phase = OverlayPhase::Open;
                self.position_or_size_updated(1.0, metrics);
            }
        }
        true
    }

    /// Detach the surface.
    ///
    /// Shadow and shim go at once. While opening, the surface itself stays
    /// until the open animation ends.
    pub fn hide(&mut self) {
        self.shadow = None;
        self.shim = None;
        match self.phase {
            OverlayPhase::Hidden | OverlayPhase::Closing => {}
            OverlayPhase::Opening => {
                self.hide_pending = true;
                tracing::debug!(node = self.node.get(), "overlay hide deferred");
            }
            OverlayPhase::Open => match self.config.close_tween() {
                Some(tween) => {
                    self.animation = Some(tween);
                    self.phase = OverlayPhase::Closing;
                    tracing::debug!(node = self.node.get(), "overlay closing");
                }
                None => self.detach(),
            },
        }
    }

    fn detach(&mut self) {
        self.phase = OverlayPhase::Hidden;
        self.animation = None;
        self.hide_pending = false;
        self.bounds = None;
        self.shadow = None;
        self.shim = None;
        tracing::debug!(node = self.node.get(), "overlay detached");
    }

    /// Stop a running animation.
    ///
    /// Opening snaps to its end state (then applies a deferred hide);
    /// Closing detaches immediately.
    pub fn cancel_animation(&mut self, metrics: &dyn BoxMetrics) {
        match self.phase {
            OverlayPhase::Opening => {
                self.animation = None;
                self.phase = OverlayPhase::Open;
                if self.hide_pending {
                    self.detach();
                } else {
                    self.position_or_size_updated(1.0, metrics);
                }
            }
            OverlayPhase::Closing => self.detach(),
            OverlayPhase::Hidden | OverlayPhase::Open => {}
        }
    }

    /// Advance the running animation by `dt`. Returns `true` when the phase
    /// changed.
    pub fn tick(&mut self, dt: Duration, metrics: &dyn BoxMetrics) -> bool {
        let Some(mut tween) = self.animation else {
            return false;
        };
        tween.tick(dt);
        self.animation = Some(tween);

        match self.phase {
            OverlayPhase::Opening => {
                if tween.is_complete() {
                    self.animation = None;
                    self.phase = OverlayPhase::Open;
                    if self.hide_pending {
                        self.hide_pending = false;
                        self.hide();
                    } else {
                        self.position_or_size_updated(1.0, metrics);
                    }
                    true
                } else {
                    self.position_or_size_updated(tween.value(), metrics);
                    false
                }
            }
            OverlayPhase::Closing => {
                self.progress = 1.0 - tween.value();
                if tween.is_complete() {
                    self.detach();
                    true
                } else {
                    false
                }
            }
            OverlayPhase::Hidden | OverlayPhase::Open => false,
        }
    }

    fn ensure_origin_fix(&mut self, env: &Environment) -> Point {
        *self.origin_fix.get_or_insert_with(|| env.origin_fix())
    }

    /// Move the surface. The containing-block origin fix is resolved on the
    /// first call and cached.
    pub fn set_popup_position(
        &mut self,
        left: i32,
        top: i32,
        metrics: &dyn BoxMetrics,
        env: &Environment,
    ) {
        self.left = left;
        self.top = top;
        self.ensure_origin_fix(env);
        let progress = if self.phase == OverlayPhase::Opening {
            0.0
        } else {
            1.0
        };
        self.position_or_size_updated(progress, metrics);
    }

    /// Recompute the surface box and mirror it into shadow and shim.
    ///
    /// With a hide pending only the box is tracked; companions stay detached.
    pub fn position_or_size_updated(&mut self, progress: f32, metrics: &dyn BoxMetrics) {
        if !matches!(self.phase, OverlayPhase::Opening | OverlayPhase::Open) {
            return;
        }
        let fix = self.origin_fix.unwrap_or(Point::ZERO);
        let full = OverlayBox::new(
            self.left + fix.x,
            self.top + fix.y,
            self.width.unwrap_or_else(|| metrics.outer_width(self.node)),
            self.height.unwrap_or_else(|| metrics.outer_height(self.node)),
        );
        self.bounds = Some(full);
        self.progress = progress.clamp(0.0, 1.0);
        if self.hide_pending {
            return;
        }

        let rect = full.animate_from_center(self.progress).to_rect();
        self.shadow = self.config.shadow.then_some(CompanionLayer {
            rect,
            z_index: self.z_index,
            visible: self.visible && self.progress >= SHADOW_VISIBLE_FROM,
        });
        self.shim = self.needs_shim.then_some(CompanionLayer {
            rect,
            z_index: self.z_index,
            visible: self.visible,
        });
    }

    /// Set or clear the explicit width.
    pub fn set_width(&mut self, width: Option<i32>, metrics: &dyn BoxMetrics) {
        self.width = width;
        self.position_or_size_updated(1.0, metrics);
    }

    /// Set or clear the explicit height.
    pub fn set_height(&mut self, height: Option<i32>, metrics: &dyn BoxMetrics) {
        self.height = height;
        self.position_or_size_updated(1.0, metrics);
    }

    pub fn set_z_index(&mut self, z: i32) {
        self.z_index = z;
        for layer in [self.shadow.as_mut(), self.shim.as_mut()].into_iter().flatten() {
            layer.z_index = z;
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if let Some(shadow) = self.shadow.as_mut() {
            shadow.visible = visible && self.progress >= SHADOW_VISIBLE_FROM;
        }
        if let Some(shim) = self.shim.as_mut() {
            shim.visible = visible;
        }
    }

    /// Centre in the viewport (the visual viewport on touch environments),
    /// never above or left of the origin.
    pub fn center(&mut self, metrics: &dyn BoxMetrics, env: &Environment) {
        let area = env.centering_area();
        let w = self.width.unwrap_or_else(|| metrics.outer_width(self.node));
        let h = self.height.unwrap_or_else(|| metrics.outer_height(self.node));
        let left = area.x + ((area.width - w) >> 1);
        let top = area.y + ((area.height - h) >> 1);
        self.set_popup_position(left.max(0), top.max(0), metrics, env);
    }
}
