#![forbid(unsafe_code)]

//! Menu popups: viewport-fitting placement and the open-popup chain.
//!
//! [`place_menu_popup`] is pure. [`MenuPopupChain`] keeps one surface per
//! open level (level 0 hangs off the menu bar) and closes the whole chain on
//! a pointer-down outside every popup and the items that opened them.

use std::time::Duration;

use tessera_core::environment::Environment;
use tessera_core::geometry::{Rect, Size};
use tessera_core::metrics::{BoxMetrics, NodeId};

use crate::overlay::{OverlayConfig, OverlaySurface};

/// Gap kept free around popups for their shadow.
pub const SHADOW_SPACE: i32 = 10;

/// Chain-wide tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuPopupConfig {
    pub shadow_space: i32,
    pub overlay: OverlayConfig,
}

impl Default for MenuPopupConfig {
    fn default() -> Self {
        Self {
            shadow_space: SHADOW_SPACE,
            overlay: OverlayConfig::default(),
        }
    }
}

impl MenuPopupConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shadow_space(mut self, px: i32) -> Self {
        self.shadow_space = px;
        self
    }

    #[must_use]
    pub fn overlay(mut self, overlay: OverlayConfig) -> Self {
        self.overlay = overlay;
        self
    }
}

/// Which way a popup hangs off its item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKind {
    /// Below a menu bar item.
    Root,
    /// Right of the parent menu, level with the item.
    Submenu,
}

/// Where the popup's item sits, in absolute pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuAnchor {
    /// The item that opens the popup.
    pub item: Rect,
    /// The menu containing the item.
    pub parent: Rect,
}

/// Result of [`place_menu_popup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuPlacement {
    pub left: i32,
    pub top: i32,
    /// Height limit when the popup does not fit vertically.
    pub height: Option<i32>,
    /// Width including room for the scrollbar, set together with `height`.
    pub width: Option<i32>,
    /// Whether the popup scrolls vertically.
    pub scroll: bool,
}

/// Fit a popup of `popup` size into `body`.
///
/// A popup that would cross the right edge flips (submenus) or aligns to the
/// edge (root menus). A popup that is too tall first moves up, then gets a
/// height limit and a scrollbar.
#[must_use]
pub fn place_menu_popup(
    kind: MenuKind,
    anchor: MenuAnchor,
    popup: Size,
    body: Size,
    scrollbar_size: i32,
    shadow_space: i32,
) -> MenuPlacement {
    let (mut left, mut top) = match kind {
        MenuKind::Submenu => (anchor.parent.right(), anchor.item.y),
        MenuKind::Root => (anchor.item.x, anchor.parent.bottom()),
    };

    if left + popup.width >= body.width - shadow_space {
        left = match kind {
            MenuKind::Submenu => anchor.parent.x - popup.width - shadow_space,
            MenuKind::Root => body.width - popup.width - shadow_space,
        };
        left = left.max(shadow_space);
    }

    let mut placement = MenuPlacement {
        left,
        top,
        height: None,
        width: None,
        scroll: false,
    };
    let mut available = body.height - top - shadow_space;
    let mut missing = popup.height - available;
    if missing > 0 {
        let move_up = (top - shadow_space).min(missing).max(0);
        top -= move_up;
        missing -= move_up;
        available += move_up;
        if missing > 0 {
            placement.height = Some(available);
            placement.width = Some(popup.width + scrollbar_size);
            placement.scroll = true;
        }
    }
    placement.top = top;
    placement
}

/// One open popup.
#[derive(Debug, Clone)]
pub struct OpenMenu {
    /// Item that opened the popup; presses on it do not auto-close.
    pub partner: Rect,
    pub placement: MenuPlacement,
    pub surface: OverlaySurface,
}

/// The path of open menu popups, outermost first.
#[derive(Debug, Default)]
pub struct MenuPopupChain {
    config: MenuPopupConfig,
    open: Vec<OpenMenu>,
    closing: Vec<OverlaySurface>,
}

impl MenuPopupChain {
    #[must_use]
    pub fn new(config: MenuPopupConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Number of open levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    #[must_use]
    pub fn popup(&self, level: usize) -> Option<&OpenMenu> {
        self.open.get(level)
    }

    /// Open `content` at `level`, closing that level and everything deeper
    /// first.
    pub fn open(
        &mut self,
        level: usize,
        kind: MenuKind,
        anchor: MenuAnchor,
        content: NodeId,
        metrics: &dyn BoxMetrics,
        env: &Environment,
    ) -> MenuPlacement {
        debug_assert!(level <= self.open.len(), "menu level {level} skips a parent");
        self.hide_children(level);

        let mut surface = OverlaySurface::new(content, self.config.overlay);
        surface.set_popup_position(0, 0, metrics, env);
        surface.show(metrics, env);

        let placement = place_menu_popup(
            kind,
            anchor,
            metrics.outer_size(content),
            env.viewport,
            env.scrollbar_size,
            self.config.shadow_space,
        );
        if placement.scroll {
            surface.set_height(placement.height, metrics);
            surface.set_width(placement.width, metrics);
        }
        surface.set_popup_position(placement.left, placement.top, metrics, env);
        tracing::debug!(
            level,
            left = placement.left,
            top = placement.top,
            scroll = placement.scroll,
            "menu popup opened"
        );
        self.open.push(OpenMenu {
            partner: anchor.item,
            placement,
            surface,
        });
        placement
    }

    /// Close every popup at `level` and deeper, innermost first.
    pub fn hide_children(&mut self, level: usize) {
        while self.open.len() > level {
            let Some(mut menu) = self.open.pop() else {
                break;
            };
            menu.surface.hide();
            if menu.surface.is_attached() {
                self.closing.push(menu.surface);
            }
        }
    }

    pub fn close_all(&mut self) {
        self.hide_children(0);
    }

    /// Auto-close on a pointer-down outside every popup and partner.
    /// Returns whether the chain closed.
    pub fn handle_pointer_down(&mut self, x: i32, y: i32) -> bool {
        if self.open.is_empty() {
            return false;
        }
        let inside = self.open.iter().any(|menu| {
            menu.partner.contains(x, y) || menu.surface.bounds().is_some_and(|b| b.contains(x, y))
        });
        if inside {
            return false;
        }
        tracing::debug!(depth = self.open.len(), "menu chain auto-closed");
        self.close_all();
        true
    }

    /// Advance popup animations.
    pub fn tick(&mut self, dt: Duration, metrics: &dyn BoxMetrics) {
        for menu in &mut self.open {
            menu.surface.tick(dt, metrics);
        }
        for surface in &mut self.closing {
            surface.tick(dt, metrics);
        }
        self.closing.retain(OverlaySurface::is_attached);
    }
}
