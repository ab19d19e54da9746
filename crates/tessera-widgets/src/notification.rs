#![forbid(unsafe_code)]

//! Transient notifications.
//!
//! A notification is an [`OverlaySurface`] with a dismissal policy. While
//! it waits for user activity it previews input; the first qualifying event
//! starts the delay, the delay starts the fade, and the fade hides it.
//!
//! ```text
//! Showing ──trigger──▶ Delaying ──timer──▶ Fading ──opacity ≤ 0──▶ hidden
//!    │                                       ▲
//!    └──delay 0 / click inside / Escape──────┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one delay timer and one fade timer per notification.
//! 2. Registered notifications have z-index `z_base + registry index` after
//!    [`NotificationCenter::bring_to_front`].
//! 3. Hiding cancels both timers before hide listeners run.
//!
//! # Failure Modes
//!
//! - Operations on an id that was already hidden are no-ops.

use std::fmt;
use std::time::Duration;

use tessera_core::environment::Environment;
use tessera_core::event::{Event, KeyEventKind, PointerEventKind};
use tessera_core::geometry::Point;
use tessera_core::metrics::{BoxMetrics, NodeId};
use tessera_core::scheduler::{Scheduler, TimerId};

use crate::overlay::{OverlayConfig, OverlaySurface};

/// Style name for system notifications: modal-like, but input passes.
pub const STYLE_SYSTEM: &str = "system";

/// Where a notification sits in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotificationPosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    #[default]
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    /// Off-screen, for assistive technology only.
    Assistive,
}

/// When a notification starts fading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayPolicy {
    /// Fade on the first trigger.
    None,
    /// Fade this long after the first trigger.
    Fixed(Duration),
    /// Stay until clicked or dismissed with Escape; all other input is
    /// swallowed.
    Forever,
}

impl DelayPolicy {
    /// Negative means forever, zero means none.
    #[must_use]
    pub fn from_millis(ms: i32) -> Self {
        match ms {
            ms if ms < 0 => Self::Forever,
            0 => Self::None,
            ms => Self::Fixed(Duration::from_millis(ms.unsigned_abs().into())),
        }
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::Fixed(Duration::from_secs(1))
    }
}

/// Center-wide tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotificationConfig {
    /// z-index of the first registered notification.
    pub z_base: i32,
    /// Delay used by [`NotificationCenter::show_default`].
    pub default_delay: DelayPolicy,
    /// Fade length. Zero hides without fading.
    pub fade: Duration,
    /// Opacity (percent) when the fade starts.
    pub start_opacity: i32,
    /// Fade timer period.
    pub fade_interval: Duration,
    /// Pointer travel (px, either axis) that counts as activity.
    pub move_threshold: i32,
    /// Extra wait on touch devices before an untouched notification fades.
    pub touch_idle_delay: Duration,
    pub overlay: OverlayConfig,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            z_base: 20000,
            default_delay: DelayPolicy::default(),
            fade: Duration::from_millis(400),
            start_opacity: 90,
            fade_interval: Duration::from_millis(50),
            move_threshold: 7,
            touch_idle_delay: Duration::from_secs(1),
            overlay: OverlayConfig::default(),
        }
    }
}

impl NotificationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn z_base(mut self, z: i32) -> Self {
        self.z_base = z;
        self
    }

    #[must_use]
    pub fn default_delay(mut self, delay: DelayPolicy) -> Self {
        self.default_delay = delay;
        self
    }

    #[must_use]
    pub fn fade(mut self, fade: Duration) -> Self {
        self.fade = fade;
        self
    }

    #[must_use]
    pub fn start_opacity(mut self, opacity: i32) -> Self {
        self.start_opacity = opacity;
        self
    }

    #[must_use]
    pub fn fade_interval(mut self, interval: Duration) -> Self {
        self.fade_interval = interval;
        self
    }

    #[must_use]
    pub fn move_threshold(mut self, px: i32) -> Self {
        self.move_threshold = px;
        self
    }

    #[must_use]
    pub fn touch_idle_delay(mut self, delay: Duration) -> Self {
        self.touch_idle_delay = delay;
        self
    }

    #[must_use]
    pub fn overlay(mut self, overlay: OverlayConfig) -> Self {
        self.overlay = overlay;
        self
    }
}

/// Handle of a shown notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u32);

impl NotificationId {
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Dismissal progress of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationState {
    /// Waiting for user activity.
    Showing,
    /// Delay timer armed.
    Delaying,
    Fading,
}

/// Called once when a notification is hidden.
pub type HideListener = Box<dyn FnMut(NotificationId)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotificationTimer {
    Delay(NotificationId),
    Fade(NotificationId),
    TouchIdle(NotificationId),
}

#[derive(Debug, Clone, Copy)]
struct Fader {
    timer: TimerId,
    started: Duration,
}

struct Notification {
    id: NotificationId,
    surface: OverlaySurface,
    position: NotificationPosition,
    delay: DelayPolicy,
    style: Option<String>,
    opacity: i32,
    previewing: bool,
    pointer_origin: Option<Point>,
    delay_timer: Option<TimerId>,
    fader: Option<Fader>,
    listeners: Vec<HideListener>,
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("delay", &self.delay)
            .field("style", &self.style)
            .field("opacity", &self.opacity)
            .field("previewing", &self.previewing)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Notification {
    fn is_modal(&self) -> bool {
        self.delay == DelayPolicy::Forever || self.is_system()
    }

    fn is_system(&self) -> bool {
        self.style.as_deref() == Some(STYLE_SYSTEM)
    }
}

/// Registry and dismissal engine for notifications.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    config: NotificationConfig,
    entries: Vec<Notification>,
    closing: Vec<OverlaySurface>,
    timers: Scheduler<NotificationTimer>,
    next_id: u32,
}

impl NotificationCenter {
    #[must_use]
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered notifications, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = NotificationId> + '_ {
        self.entries.iter().map(|n| n.id)
    }

    #[must_use]
    pub fn surface(&self, id: NotificationId) -> Option<&OverlaySurface> {
        self.get(id).map(|n| &n.surface)
    }

    /// Current opacity in percent.
    #[must_use]
    pub fn opacity(&self, id: NotificationId) -> Option<i32> {
        self.get(id).map(|n| n.opacity)
    }

    #[must_use]
    pub fn state(&self, id: NotificationId) -> Option<NotificationState> {
        self.get(id).map(|n| {
            if n.fader.is_some() {
                NotificationState::Fading
            } else if n.delay_timer.is_some() {
                NotificationState::Delaying
            } else {
                NotificationState::Showing
            }
        })
    }

    fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    fn get_mut(&mut self, id: NotificationId) -> Option<&mut Notification> {
        self.entries.iter_mut().find(|n| n.id == id)
    }

    /// Show `content` centred with the configured default delay.
    pub fn show_default(
        &mut self,
        content: NodeId,
        metrics: &dyn BoxMetrics,
        env: &Environment,
    ) -> NotificationId {
        let delay = self.config.default_delay;
        self.show(content, NotificationPosition::default(), delay, None, metrics, env)
    }

    /// Show a notification and start previewing input for it.
    pub fn show(
        &mut self,
        content: NodeId,
        position: NotificationPosition,
        delay: DelayPolicy,
        style: Option<&str>,
        metrics: &dyn BoxMetrics,
        env: &Environment,
    ) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        let mut surface = OverlaySurface::new(content, self.config.overlay);
        surface.set_z_index(self.config.z_base + self.entries.len() as i32);
        surface.show(metrics, env);

        if env.is_touch() {
            let wait = match delay {
                DelayPolicy::None => Some(Duration::ZERO),
                DelayPolicy::Fixed(d) => Some(d),
                DelayPolicy::Forever => None,
            };
            if let Some(wait) = wait {
                self.timers.schedule(
                    wait.saturating_add(self.config.touch_idle_delay),
                    NotificationTimer::TouchIdle(id),
                );
            }
        }

        self.entries.push(Notification {
            id,
            surface,
            position,
            delay,
            style: style.map(str::to_owned),
            opacity: self.config.start_opacity,
            previewing: true,
            pointer_origin: None,
            delay_timer: None,
            fader: None,
            listeners: Vec::new(),
        });
        self.set_position(id, position, metrics, env);
        tracing::debug!(notification = id.get(), ?position, ?delay, "notification shown");
        id
    }

    /// Anchor a notification. Right and bottom anchors use the current
    /// viewport and content size.
    pub fn set_position(
        &mut self,
        id: NotificationId,
        position: NotificationPosition,
        metrics: &dyn BoxMetrics,
        env: &Environment,
    ) {
        let Some(n) = self.get_mut(id) else {
            return;
        };
        n.position = position;
        let node = n.surface.node();
        let w = n.surface.width().unwrap_or_else(|| metrics.outer_width(node));
        let h = n.surface.height().unwrap_or_else(|| metrics.outer_height(node));
        let area = env.centering_area();
        let center_x = (area.x + ((area.width - w) >> 1)).max(0);
        let center_y = (area.y + ((area.height - h) >> 1)).max(0);
        let right = env.viewport.width - w;
        let bottom = env.viewport.height - h;

        use NotificationPosition as P;
        let (left, top) = match position {
            P::TopLeft => (0, 0),
            P::TopCenter => (center_x, 0),
            P::TopRight => (right, 0),
            P::MiddleLeft => (0, center_y),
            P::MiddleCenter => (center_x, center_y),
            P::MiddleRight => (right, center_y),
            P::BottomLeft => (0, bottom),
            P::BottomCenter => (center_x, bottom),
            P::BottomRight => (right, bottom),
            P::Assistive => (-2000, -2000),
        };
        n.surface.set_popup_position(left, top, metrics, env);
    }

    /// Re-anchor every notification, e.g. after a viewport resize.
    pub fn reposition_all(&mut self, metrics: &dyn BoxMetrics, env: &Environment) {
        let anchors: Vec<_> = self.entries.iter().map(|n| (n.id, n.position)).collect();
        for (id, position) in anchors {
            self.set_position(id, position, metrics, env);
        }
    }

    /// Restack every registered notification above the window stack.
    pub fn bring_to_front(&mut self) {
        let base = self.config.z_base;
        for (index, n) in self.entries.iter_mut().enumerate() {
            n.surface.set_z_index(base + index as i32);
        }
    }

    pub fn add_hide_listener(&mut self, id: NotificationId, listener: HideListener) {
        if let Some(n) = self.get_mut(id) {
            n.listeners.push(listener);
        }
    }

    /// Offer an input event. `inside` is the notification the event hit,
    /// if any. Returns `false` when the event must not reach anything else.
    pub fn handle_event(&mut self, event: &Event, inside: Option<NotificationId>) -> bool {
        if let (Event::Pointer(pointer), Some(id)) = (event, inside) {
            if matches!(pointer.kind, PointerEventKind::Up(_)) && self.get(id).is_some() {
                self.fade(id, "click");
                return false;
            }
        }

        let Some(n) = self.entries.iter_mut().rev().find(|n| n.previewing) else {
            return true;
        };
        let id = n.id;

        if n.is_modal() {
            if let Event::Key(key) = event {
                if key.is_escape() && key.kind == KeyEventKind::Press {
                    self.fade(id, "escape");
                    return false;
                }
            }
            return n.is_system();
        }

        match event {
            Event::Pointer(pointer) => match pointer.kind {
                PointerEventKind::Moved => match n.pointer_origin {
                    None => n.pointer_origin = Some(Point::new(pointer.x, pointer.y)),
                    Some(origin) => {
                        let threshold = self.config.move_threshold;
                        if (pointer.x - origin.x).abs() > threshold
                            || (pointer.y - origin.y).abs() > threshold
                        {
                            self.start_delay(id, event.name());
                        }
                    }
                },
                PointerEventKind::Down(_) => self.start_delay(id, event.name()),
                PointerEventKind::Up(_) | PointerEventKind::Cancel => {}
            },
            Event::Wheel(_) | Event::Scroll => self.start_delay(id, event.name()),
            Event::Key(key) => {
                if key.is_fresh_press() {
                    self.start_delay(id, event.name());
                }
            }
            Event::CaptureLost | Event::Resize { .. } | Event::Focus(_) => {}
        }
        true
    }

    /// Stop previewing and start the delay.
    pub fn start_delay(&mut self, id: NotificationId, trigger: &str) {
        let Some(n) = self.entries.iter_mut().find(|n| n.id == id) else {
            return;
        };
        n.previewing = false;
        let policy = n.delay;
        match policy {
            DelayPolicy::Fixed(delay) => {
                if n.delay_timer.is_none() {
                    n.delay_timer = Some(self.timers.schedule(delay, NotificationTimer::Delay(id)));
                    tracing::debug!(notification = id.get(), trigger, "notification delay started");
                }
            }
            DelayPolicy::None => self.fade(id, trigger),
            DelayPolicy::Forever => {}
        }
    }

    /// Start fading. A zero fade duration hides at once.
    pub fn fade(&mut self, id: NotificationId, trigger: &str) {
        let Some(n) = self.entries.iter_mut().find(|n| n.id == id) else {
            return;
        };
        n.previewing = false;
        if let Some(timer) = n.delay_timer.take() {
            self.timers.cancel(timer);
        }
        if n.fader.is_some() {
            return;
        }
        if self.config.fade.is_zero() {
            self.hide(id, trigger);
            return;
        }
        n.fader = Some(Fader {
            timer: self
                .timers
                .schedule_repeating(self.config.fade_interval, NotificationTimer::Fade(id)),
            started: self.timers.now(),
        });
        tracing::debug!(notification = id.get(), trigger, "notification fading");
    }

    /// Remove a notification now. Returns `false` if it was already gone.
    pub fn hide(&mut self, id: NotificationId, trigger: &str) -> bool {
        let Some(index) = self.entries.iter().position(|n| n.id == id) else {
            return false;
        };
        let mut n = self.entries.remove(index);
        if let Some(timer) = n.delay_timer.take() {
            self.timers.cancel(timer);
        }
        if let Some(fader) = n.fader.take() {
            self.timers.cancel(fader.timer);
        }
        n.surface.hide();
        if n.surface.is_attached() {
            self.closing.push(n.surface);
        }
        for listener in &mut n.listeners {
            listener(id);
        }
        tracing::debug!(notification = id.get(), trigger, "notification hidden");
        true
    }

    /// Advance timers and animations. Returns the notifications hidden.
    pub fn tick(&mut self, dt: Duration, metrics: &dyn BoxMetrics) -> Vec<NotificationId> {
        for n in &mut self.entries {
            n.surface.tick(dt, metrics);
        }
        for surface in &mut self.closing {
            surface.tick(dt, metrics);
        }
        self.closing.retain(OverlaySurface::is_attached);

        let until = self.timers.now().saturating_add(dt);
        let mut hidden = Vec::new();
        while let Some(fired) = self.timers.poll(until) {
            match fired.payload {
                NotificationTimer::Delay(id) => {
                    if let Some(n) = self.get_mut(id) {
                        n.delay_timer = None;
                    }
                    self.fade(id, "delay");
                }
                NotificationTimer::TouchIdle(id) => self.fade(id, "touch_idle"),
                NotificationTimer::Fade(id) => {
                    if self.fade_step(id, fired.at) {
                        hidden.push(id);
                    }
                }
            }
        }
        self.timers.settle(until);
        hidden
    }

    /// Returns `true` when the step hid the notification.
    fn fade_step(&mut self, id: NotificationId, at: Duration) -> bool {
        let fade = self.config.fade.as_nanos() as i128;
        let start = i128::from(self.config.start_opacity);
        let Some(n) = self.get_mut(id) else {
            return false;
        };
        let Some(fader) = n.fader else {
            return false;
        };
        let elapsed = at.saturating_sub(fader.started).as_nanos() as i128;
        let opacity = (start * (fade - elapsed) / fade) as i32;
        if opacity <= 0 {
            self.hide(id, "fade")
        } else {
            n.opacity = opacity;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use tessera_core::environment::EnvironmentFlags;
    use tessera_core::event::{KeyCode, KeyEvent, PointerEvent, WheelEvent};
    use tessera_core::metrics::{HeadlessMetrics, NodeBox};

    const CONTENT: NodeId = NodeId(7);

    fn metrics() -> HeadlessMetrics {
        HeadlessMetrics::new().with(CONTENT, NodeBox::sized(200, 50))
    }

    fn env() -> Environment {
        Environment::new(800, 600)
    }

    fn show(
        center: &mut NotificationCenter,
        delay: DelayPolicy,
        style: Option<&str>,
    ) -> NotificationId {
        center.show(CONTENT, NotificationPosition::MiddleCenter, delay, style, &metrics(), &env())
    }

    fn down() -> Event {
        Event::Pointer(PointerEvent::down(5, 5))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn delay_policy_from_millis() {
        assert_eq!(DelayPolicy::from_millis(-1), DelayPolicy::Forever);
        assert_eq!(DelayPolicy::from_millis(0), DelayPolicy::None);
        assert_eq!(DelayPolicy::from_millis(1500), DelayPolicy::Fixed(ms(1500)));
    }

    #[test]
    fn top_right_shadow_follows_second_position() {
        let mut center = NotificationCenter::default();
        let mut m = metrics();
        let id = center.show(
            CONTENT,
            NotificationPosition::TopRight,
            DelayPolicy::None,
            None,
            &m,
            &env(),
        );
        assert_eq!(center.surface(id).map(OverlaySurface::position), Some(Point::new(600, 0)));

        m.set(CONTENT, NodeBox::sized(300, 40));
        center.set_position(id, NotificationPosition::TopRight, &m, &env());
        let shadow = center.surface(id).and_then(|s| s.shadow()).map(|s| s.rect);
        assert_eq!(shadow.map(|r| (r.x, r.y, r.width)), Some((500, 0, 300)));
    }

    #[test]
    fn anchors_cover_the_viewport() {
        let mut center = NotificationCenter::default();
        let m = metrics();
        let e = env();
        let at = |center: &mut NotificationCenter, p| {
            let id = center.show(CONTENT, p, DelayPolicy::Forever, None, &m, &e);
            center.surface(id).map(OverlaySurface::position)
        };
        assert_eq!(at(&mut center, NotificationPosition::MiddleCenter), Some(Point::new(300, 275)));
        assert_eq!(at(&mut center, NotificationPosition::BottomLeft), Some(Point::new(0, 550)));
        assert_eq!(at(&mut center, NotificationPosition::BottomCenter), Some(Point::new(300, 550)));
        assert_eq!(at(&mut center, NotificationPosition::MiddleRight), Some(Point::new(600, 275)));
        assert_eq!(
            at(&mut center, NotificationPosition::Assistive),
            Some(Point::new(-2000, -2000))
        );
    }

    #[test]
    fn zero_delay_fades_on_first_trigger_without_tick() {
        let mut center = NotificationCenter::default();
        let id = show(&mut center, DelayPolicy::None, None);
        assert_eq!(center.state(id), Some(NotificationState::Showing));
        assert!(center.handle_event(&down(), None));
        assert_eq!(center.state(id), Some(NotificationState::Fading));
    }

    #[test]
    fn zero_fade_hides_at_once_and_notifies() {
        let mut center = NotificationCenter::new(NotificationConfig::new().fade(Duration::ZERO));
        let id = show(&mut center, DelayPolicy::None, None);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        center.add_hide_listener(id, Box::new(move |hidden| log.borrow_mut().push(hidden)));

        center.handle_event(&down(), None);
        assert!(center.is_empty());
        assert_eq!(*seen.borrow(), vec![id]);
    }

    #[test]
    fn fixed_delay_arms_once_then_fades_out() {
        let mut center = NotificationCenter::default();
        let m = metrics();
        let id = show(&mut center, DelayPolicy::Fixed(ms(1000)), None);
        center.handle_event(&Event::Wheel(WheelEvent::new(0, 0, 3)), None);
        assert_eq!(center.state(id), Some(NotificationState::Delaying));
        center.start_delay(id, "again");

        assert!(center.tick(ms(999), &m).is_empty());
        assert_eq!(center.state(id), Some(NotificationState::Delaying));
        assert!(center.tick(ms(1), &m).is_empty());
        assert_eq!(center.state(id), Some(NotificationState::Fading));

        center.tick(ms(50), &m);
        assert_eq!(center.opacity(id), Some(78));
        assert_eq!(center.tick(ms(350), &m), vec![id]);
        assert!(center.state(id).is_none());
    }

    #[test]
    fn small_pointer_moves_do_not_start_delay() {
        let mut center = NotificationCenter::default();
        let id = show(&mut center, DelayPolicy::Fixed(ms(500)), None);
        let moved = |x, y| Event::Pointer(PointerEvent::moved(x, y));
        center.handle_event(&moved(100, 100), None);
        center.handle_event(&moved(107, 93), None);
        assert_eq!(center.state(id), Some(NotificationState::Showing));
        center.handle_event(&moved(108, 100), None);
        assert_eq!(center.state(id), Some(NotificationState::Delaying));
    }

    #[test]
    fn key_repeat_passes_without_trigger() {
        let mut center = NotificationCenter::default();
        let id = show(&mut center, DelayPolicy::Fixed(ms(500)), None);
        let repeat = Event::Key(KeyEvent::new(KeyCode::Char('a')).with_kind(KeyEventKind::Repeat));
        assert!(center.handle_event(&repeat, None));
        assert_eq!(center.state(id), Some(NotificationState::Showing));
        let press = Event::Key(KeyEvent::new(KeyCode::Char('a')));
        assert!(center.handle_event(&press, None));
        assert_eq!(center.state(id), Some(NotificationState::Delaying));
    }

    #[test]
    fn forever_swallows_until_escape() {
        let mut center = NotificationCenter::default();
        let id = show(&mut center, DelayPolicy::Forever, None);
        assert!(!center.handle_event(&down(), None));
        assert_eq!(center.state(id), Some(NotificationState::Showing));
        let esc = Event::Key(KeyEvent::new(KeyCode::Escape));
        assert!(!center.handle_event(&esc, None));
        assert_eq!(center.state(id), Some(NotificationState::Fading));
        // No longer previewing: input flows again.
        assert!(center.handle_event(&down(), None));
    }

    #[test]
    fn system_style_lets_input_pass() {
        let mut center = NotificationCenter::default();
        let id = show(&mut center, DelayPolicy::Fixed(ms(500)), Some(STYLE_SYSTEM));
        assert!(center.handle_event(&down(), None));
        assert_eq!(center.state(id), Some(NotificationState::Showing));
        let click = Event::Pointer(PointerEvent::up(310, 290));
        assert!(!center.handle_event(&click, Some(id)));
        assert_eq!(center.state(id), Some(NotificationState::Fading));
    }

    #[test]
    fn z_index_follows_registry_after_restack() {
        let mut center = NotificationCenter::default();
        let a = show(&mut center, DelayPolicy::Forever, None);
        let b = show(&mut center, DelayPolicy::Forever, None);
        assert_eq!(center.surface(b).map(OverlaySurface::z_index), Some(20001));
        center.hide(a, "test");
        center.bring_to_front();
        assert_eq!(center.surface(b).map(OverlaySurface::z_index), Some(20000));
    }

    #[test]
    fn touch_devices_fade_untouched_notifications() {
        let mut center = NotificationCenter::default();
        let touch = env().with_flags(EnvironmentFlags::TOUCH);
        let id = center.show(
            CONTENT,
            NotificationPosition::TopLeft,
            DelayPolicy::Fixed(ms(500)),
            None,
            &metrics(),
            &touch,
        );
        center.tick(ms(1499), &metrics());
        assert_eq!(center.state(id), Some(NotificationState::Showing));
        center.tick(ms(1), &metrics());
        assert_eq!(center.state(id), Some(NotificationState::Fading));
    }
}
