#![forbid(unsafe_code)]

//! Window stack: ordering, z-indices and the modal curtain.
//!
//! # Invariants
//!
//! 1. `order` lists every open window exactly once; a window's `order`
//!    field is its index there.
//! 2. z-index = `base_z + order` for every open window.
//! 3. At most one modal curtain exists, owned by the topmost modal window
//!    and sharing its z-index (placed beneath it).

use std::time::Duration;

use ahash::AHashMap;
use tessera_core::environment::Environment;
use tessera_core::geometry::{Point, Rect, Size};
use tessera_core::metrics::BoxMetrics;
use tessera_core::scheduler::{Scheduler, TimerId};
use tessera_core::variables::VariableSink;

use super::{Curtain, LayeredWindow, WindowConfig, WindowEvent, WindowFlags, WindowId};
use crate::overlay::OverlaySurface;

/// Owner of all open windows. Passed by reference; there is no global list.
#[derive(Debug)]
pub struct WindowStackService {
    pub(super) config: WindowConfig,
    pub(super) windows: AHashMap<WindowId, LayeredWindow>,
    order: Vec<WindowId>,
    closing: Vec<OverlaySurface>,
    next_id: u32,
    next_sequence: i64,
    ordering_dirty: bool,
    modal_curtain: Option<Curtain>,
    pub(super) drag_curtain: Option<Curtain>,
    pub(super) captured: Option<WindowId>,
    pub(super) viewport: Size,
    pub(super) timers: Scheduler<WindowId>,
    pub(super) lazy_timer: Option<(WindowId, TimerId)>,
}

impl Default for WindowStackService {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

impl WindowStackService {
    #[must_use]
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            windows: AHashMap::new(),
            order: Vec::new(),
            closing: Vec::new(),
            next_id: 1,
            next_sequence: 0,
            ordering_dirty: false,
            modal_curtain: None,
            drag_curtain: None,
            captured: None,
            viewport: Environment::default().viewport,
            timers: Scheduler::new(),
            lazy_timer: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&LayeredWindow> {
        self.windows.get(&id)
    }

    /// Window ids from bottom to top.
    #[must_use]
    pub fn order(&self) -> &[WindowId] {
        &self.order
    }

    /// Topmost window.
    #[must_use]
    pub fn top(&self) -> Option<WindowId> {
        self.order.last().copied()
    }

    #[must_use]
    pub fn modal_curtain(&self) -> Option<&Curtain> {
        self.modal_curtain.as_ref()
    }

    /// Whether the body carries the modal-open marker.
    #[must_use]
    pub fn is_modal_open(&self) -> bool {
        self.modal_curtain.is_some()
    }

    /// Full-viewport curtain shown while dragging or resizing.
    #[must_use]
    pub fn drag_curtain(&self) -> Option<&Curtain> {
        self.drag_curtain.as_ref()
    }

    /// Window currently holding pointer capture.
    #[must_use]
    pub fn captured(&self) -> Option<WindowId> {
        self.captured
    }

    /// Closed windows whose close animation is still running.
    #[must_use]
    pub fn closing_count(&self) -> usize {
        self.closing.len()
    }

    /// Whether a deferred ordering change awaits [`Self::commit_ordering`].
    #[must_use]
    pub fn is_ordering_dirty(&self) -> bool {
        self.ordering_dirty
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        for curtain in [self.modal_curtain.as_mut(), self.drag_curtain.as_mut()]
            .into_iter()
            .flatten()
        {
            curtain.rect = Rect::from_size(viewport);
        }
    }

    /// Open a window on top of the stack.
    ///
    /// Windows without an explicit position cascade by the stacking offset;
    /// centred windows are centred after showing.
    pub fn open(
        &mut self,
        mut window: LayeredWindow,
        metrics: &dyn BoxMetrics,
        env: &Environment,
    ) -> WindowId {
        self.viewport = env.viewport;
        let id = WindowId(self.next_id);
        self.next_id += 1;
        let order = self.order.len();

        let mut surface = OverlaySurface::new(window.chrome().root, self.config.overlay);
        surface.set_z_index(self.z_for(order));
        let centered = window.is(WindowFlags::CENTERED);
        if !centered {
            let cascade = self.config.stacking_offset * order as i32;
            let p = window
                .explicit_position()
                .unwrap_or(Point::new(cascade, cascade));
            surface.set_popup_position(p.x, p.y.max(0), metrics, env);
        }
        surface.show(metrics, env);
        if centered {
            surface.center(metrics, env);
        }

        window.order = order;
        window.reported_position = Some(surface.position());
        window.surface = Some(surface);
        self.order.push(id);
        self.windows.insert(id, window);
        self.refresh_modal_curtain();
        tracing::debug!(window = id.get(), order, "window opened");
        id
    }

    /// Remove a window. Windows above it move down one place.
    ///
    /// Returns `false` for unknown ids.
    pub fn close(&mut self, id: WindowId) -> bool {
        let Some(mut window) = self.windows.remove(&id) else {
            return false;
        };
        let index = window.order;
        self.order.remove(index);
        self.reindex_from(index);

        if self.captured == Some(id) {
            self.captured = None;
            self.drag_curtain = None;
        }
        if let Some((owner, timer)) = self.lazy_timer {
            if owner == id {
                self.timers.cancel(timer);
                self.lazy_timer = None;
            }
        }
        if let Some(mut surface) = window.surface.take() {
            surface.hide();
            if surface.is_attached() {
                self.closing.push(surface);
            }
        }
        self.refresh_modal_curtain();
        tracing::debug!(window = id.get(), "window closed");
        true
    }

    /// Move a window to the top. Only windows from its old index upwards
    /// are re-indexed. Returns whether anything moved.
    pub fn bring_to_front(&mut self, id: WindowId) -> bool {
        let Some(index) = self.windows.get(&id).map(|w| w.order) else {
            return false;
        };
        if index + 1 == self.order.len() {
            return false;
        }
        self.order.remove(index);
        self.order.push(id);
        self.reindex_from(index);
        self.refresh_modal_curtain();
        true
    }

    /// Ask for `id` to be raised at the next commit. Later requests end up
    /// above earlier ones.
    pub fn request_bring_to_front(&mut self, id: WindowId) {
        let sequence = self.next_sequence;
        if let Some(window) = self.windows.get_mut(&id) {
            window.bring_to_front_sequence = sequence;
            self.next_sequence += 1;
            self.ordering_dirty = true;
        }
    }

    /// Change modality. Ordering is settled at the next commit.
    pub fn set_modal(&mut self, id: WindowId, modal: bool) {
        if let Some(window) = self.windows.get_mut(&id) {
            window.set_flag(WindowFlags::MODAL, modal);
            self.ordering_dirty = true;
            self.refresh_modal_curtain();
        }
    }

    /// Apply deferred ordering: requested windows rise in request order,
    /// then modal windows rise above everything. Returns the number of
    /// windows moved.
    pub fn commit_ordering(&mut self) -> usize {
        if !self.ordering_dirty {
            return 0;
        }
        self.ordering_dirty = false;
        let _span =
            tracing::debug_span!("window_stack.commit", windows = self.order.len()).entered();

        let mut pending: Vec<(bool, i64, WindowId)> = self
            .order
            .iter()
            .filter_map(|id| {
                self.windows
                    .get(id)
                    .map(|w| (w.is(WindowFlags::MODAL), w.bring_to_front_sequence, *id))
            })
            .collect();
        pending.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut moved = 0;
        for (modal, sequence, id) in pending {
            if (sequence != -1 || modal) && self.bring_to_front(id) {
                moved += 1;
            }
        }
        for window in self.windows.values_mut() {
            window.bring_to_front_sequence = -1;
        }
        tracing::debug!(moved, "window ordering committed");
        moved
    }

    /// Move a window, clamping its top to the viewport. `positionx` and
    /// `positiony` are signalled when they change.
    pub fn set_window_position(
        &mut self,
        id: WindowId,
        left: i32,
        top: i32,
        metrics: &dyn BoxMetrics,
        env: &Environment,
        sink: &mut dyn VariableSink,
    ) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let top = top.max(0);
        if let Some(surface) = window.surface.as_mut() {
            surface.set_popup_position(left, top, metrics, env);
        }
        let previous = window.reported_position;
        if previous.is_none_or(|p| p.x != left) {
            sink.update_variable(window.component(), "positionx", left.into(), false);
        }
        if previous.is_none_or(|p| p.y != top) {
            sink.update_variable(window.component(), "positiony", top.into(), false);
        }
        window.reported_position = Some(Point::new(left, top));
    }

    /// Advance animations and timers.
    pub fn tick(&mut self, dt: Duration, metrics: &dyn BoxMetrics) -> Vec<WindowEvent> {
        for window in self.windows.values_mut() {
            if let Some(surface) = window.surface.as_mut() {
                surface.tick(dt, metrics);
            }
        }
        for surface in &mut self.closing {
            surface.tick(dt, metrics);
        }
        self.closing.retain(OverlaySurface::is_attached);

        let until = self.timers.now().saturating_add(dt);
        let mut events = Vec::new();
        while let Some(fired) = self.timers.poll(until) {
            if self.lazy_timer.is_some_and(|(_, t)| t == fired.id) {
                self.lazy_timer = None;
            }
            if self.windows.contains_key(&fired.payload) {
                events.push(WindowEvent::ContentLayoutRequested(fired.payload));
            }
        }
        self.timers.settle(until);
        events
    }

    fn z_for(&self, order: usize) -> i32 {
        self.config.base_z + order as i32
    }

    fn reindex_from(&mut self, start: usize) {
        for index in start..self.order.len() {
            let z = self.z_for(index);
            if let Some(window) = self.windows.get_mut(&self.order[index]) {
                window.order = index;
                if let Some(surface) = window.surface.as_mut() {
                    surface.set_z_index(z);
                }
            }
        }
    }

    fn refresh_modal_curtain(&mut self) {
        let curtain = self.order.iter().rev().find_map(|id| {
            let window = self.windows.get(id)?;
            window.is(WindowFlags::MODAL).then(|| Curtain {
                owner: *id,
                rect: Rect::from_size(self.viewport),
                z_index: self.z_for(window.order),
            })
        });
        let before = self.modal_curtain.map(|c| c.owner);
        let after = curtain.map(|c| c.owner);
        if before != after {
            tracing::debug!(
                owner = after.map(WindowId::get),
                "modal curtain moved"
            );
        }
        self.modal_curtain = curtain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayConfig;
    use crate::window::WindowChrome;
    use tessera_core::metrics::{HeadlessMetrics, NodeBox, NodeId};
    use tessera_core::variables::{RecordingSink, VariableValue};

    fn chrome(n: u32) -> WindowChrome {
        WindowChrome {
            root: NodeId(n * 10),
            header: NodeId(n * 10 + 1),
            footer: NodeId(n * 10 + 2),
            contents: NodeId(n * 10 + 3),
        }
    }

    fn metrics() -> HeadlessMetrics {
        let mut m = HeadlessMetrics::new();
        for n in 1..=4 {
            m.set(NodeId(n * 10), NodeBox::sized(300, 200));
        }
        m
    }

    fn open(stack: &mut WindowStackService, n: u32) -> WindowId {
        let env = Environment::new(1024, 768);
        stack.open(LayeredWindow::new(format!("w{n}"), chrome(n)), &metrics(), &env)
    }

    #[test]
    fn new_windows_cascade_and_stack() {
        let mut stack = WindowStackService::default();
        let a = open(&mut stack, 1);
        let b = open(&mut stack, 2);
        let pos = |id| stack.window(id).and_then(|w| w.surface()).map(OverlaySurface::position);
        assert_eq!(pos(a), Some(Point::new(0, 0)));
        assert_eq!(pos(b), Some(Point::new(15, 15)));
        assert_eq!(stack.window(b).and_then(LayeredWindow::z_index), Some(10001));
        assert_eq!(stack.top(), Some(b));
    }

    #[test]
    fn bring_to_front_swaps_order_and_z() {
        let mut stack = WindowStackService::default();
        let a = open(&mut stack, 1);
        let b = open(&mut stack, 2);
        assert!(stack.bring_to_front(a));
        assert_eq!(stack.order(), &[b, a]);
        assert_eq!(stack.window(a).map(LayeredWindow::order), Some(1));
        assert_eq!(stack.window(a).and_then(LayeredWindow::z_index), Some(10001));
        assert_eq!(stack.window(b).map(LayeredWindow::order), Some(0));
        assert_eq!(stack.window(b).and_then(LayeredWindow::z_index), Some(10000));
        assert!(!stack.bring_to_front(a));
    }

    #[test]
    fn close_reindexes_windows_above() {
        let mut stack = WindowStackService::default();
        let a = open(&mut stack, 1);
        let b = open(&mut stack, 2);
        let c = open(&mut stack, 3);
        assert!(stack.close(a));
        assert!(!stack.close(a));
        assert_eq!(stack.order(), &[b, c]);
        assert_eq!(stack.window(c).and_then(LayeredWindow::z_index), Some(10001));
    }

    #[test]
    fn close_animation_finishes_on_tick() {
        let config = WindowConfig::new()
            .overlay(OverlayConfig::new().close_duration(Duration::from_millis(100)));
        let mut stack = WindowStackService::new(config);
        let a = open(&mut stack, 1);
        stack.close(a);
        assert_eq!(stack.closing_count(), 1);
        stack.tick(Duration::from_millis(100), &metrics());
        assert_eq!(stack.closing_count(), 0);
    }

    #[test]
    fn modal_curtain_follows_topmost_modal() {
        let mut stack = WindowStackService::default();
        let env = Environment::new(800, 600);
        let a = stack.open(
            LayeredWindow::new("a", chrome(1)).modal(true),
            &metrics(),
            &env,
        );
        let b = open(&mut stack, 2);
        let curtain = stack.modal_curtain().copied();
        assert_eq!(curtain.map(|c| c.owner), Some(a));
        assert_eq!(curtain.map(|c| c.z_index), Some(10000));
        assert!(stack.is_modal_open());

        stack.set_modal(b, true);
        assert_eq!(stack.modal_curtain().map(|c| c.owner), Some(b));

        stack.close(b);
        stack.close(a);
        assert!(stack.modal_curtain().is_none());
        assert!(!stack.is_modal_open());
    }

    #[test]
    fn commit_raises_requests_then_modals() {
        let mut stack = WindowStackService::default();
        let a = open(&mut stack, 1);
        let b = open(&mut stack, 2);
        let c = open(&mut stack, 3);
        stack.set_modal(a, true);
        stack.request_bring_to_front(b);
        assert_eq!(stack.commit_ordering(), 2);
        assert_eq!(stack.order(), &[c, b, a]);
        assert!(stack.windows.values().all(|w| w.bring_to_front_sequence() == -1));
        assert_eq!(stack.commit_ordering(), 0);
    }

    #[test]
    fn later_requests_end_on_top() {
        let mut stack = WindowStackService::default();
        let a = open(&mut stack, 1);
        let b = open(&mut stack, 2);
        let c = open(&mut stack, 3);
        stack.request_bring_to_front(b);
        stack.request_bring_to_front(a);
        stack.commit_ordering();
        assert_eq!(stack.order(), &[c, b, a]);
    }

    #[test]
    fn centered_window_ignores_cascade() {
        let mut stack = WindowStackService::default();
        let env = Environment::new(800, 600);
        let id = stack.open(
            LayeredWindow::new("c", chrome(1)).centered(true),
            &metrics(),
            &env,
        );
        let pos = stack.window(id).and_then(|w| w.surface()).map(OverlaySurface::position);
        assert_eq!(pos, Some(Point::new(250, 200)));
    }

    #[test]
    fn position_signals_only_changes() {
        let mut stack = WindowStackService::default();
        let env = Environment::new(800, 600);
        let a = open(&mut stack, 1);
        let mut sink = RecordingSink::new();
        stack.set_window_position(a, 40, -5, &metrics(), &env, &mut sink);
        assert_eq!(sink.last("w1", "positionx"), Some(&VariableValue::Int(40)));
        assert_eq!(sink.count("w1", "positiony"), 0);
        stack.set_window_position(a, 40, 30, &metrics(), &env, &mut sink);
        assert_eq!(sink.count("w1", "positionx"), 1);
        assert_eq!(sink.last("w1", "positiony"), Some(&VariableValue::Int(30)));
    }
}
