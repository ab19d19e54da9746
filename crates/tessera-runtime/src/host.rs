#![forbid(unsafe_code)]

//! The overlay host: one owner for every overlay service.
//!
//! [`OverlayHost`] owns the window stack, the notification registry, the
//! menu popup chain and the outgoing variable batch, and routes input and
//! frame ticks through them in a fixed order.
//!
//! # Update cycle
//!
//! ```text
//! dispatch(event)*  ──▶  finish_update()  ──▶  tick(dt)  ──▶  flush_variables()
//!                        (commit ordering,
//!                         restack notifications)
//! ```
//!
//! # Invariants
//!
//! 1. Notifications preview every event before anything else sees it.
//! 2. A pointer-down reaches the menu chain before the window stack.
//! 3. After [`OverlayHost::finish_update`], notifications sit above every
//!    window and no ordering change is pending.

use std::time::Duration;

use tessera_core::environment::Environment;
use tessera_core::event::{Event, PointerEventKind};
use tessera_core::geometry::Size;
use tessera_core::metrics::{BoxMetrics, NodeId};
use tessera_core::variables::VariableUpdate;
use tessera_widgets::menu_popup::MenuPopupChain;
use tessera_widgets::notification::{
    DelayPolicy, NotificationCenter, NotificationId, NotificationPosition,
};
use tessera_widgets::window::{LayeredWindow, WindowEvent, WindowId, WindowPart, WindowStackService};

use crate::policy_config::PolicyConfig;
use crate::variables::BatchedVariables;

/// What an event hit, as resolved by the host's hit testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitTarget {
    /// Window and part under the event (or the focused window for keys).
    pub window: Option<(WindowId, WindowPart)>,
    /// Notification under the pointer.
    pub notification: Option<NotificationId>,
}

impl HitTarget {
    #[must_use]
    pub const fn window(id: WindowId, part: WindowPart) -> Self {
        Self {
            window: Some((id, part)),
            notification: None,
        }
    }

    #[must_use]
    pub const fn notification(id: NotificationId) -> Self {
        Self {
            window: None,
            notification: Some(id),
        }
    }
}

/// Result of [`OverlayHost::dispatch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The event must not reach the page underneath.
    pub consumed: bool,
    /// The menu chain auto-closed.
    pub menu_closed: bool,
    pub window: Option<WindowEvent>,
}

/// Everything one frame tick produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub window_events: Vec<WindowEvent>,
    /// Notifications hidden during this tick.
    pub hidden: Vec<NotificationId>,
}

impl TickReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window_events.is_empty() && self.hidden.is_empty()
    }
}

/// Owner of the overlay services for one viewport.
#[derive(Debug)]
pub struct OverlayHost {
    env: Environment,
    windows: WindowStackService,
    notifications: NotificationCenter,
    menus: MenuPopupChain,
    variables: BatchedVariables,
}

impl Default for OverlayHost {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

impl OverlayHost {
    /// A host with default component configuration.
    #[must_use]
    pub fn new(env: Environment) -> Self {
        Self::from_policy(env, &PolicyConfig::default())
    }

    /// A host whose components are configured from `policy`.
    #[must_use]
    pub fn from_policy(env: Environment, policy: &PolicyConfig) -> Self {
        let mut windows = WindowStackService::new(policy.to_window_config());
        windows.set_viewport(env.viewport);
        Self {
            env,
            windows,
            notifications: NotificationCenter::new(policy.to_notification_config()),
            menus: MenuPopupChain::new(policy.to_menu_popup_config()),
            variables: BatchedVariables::new(),
        }
    }

    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    #[must_use]
    pub fn windows(&self) -> &WindowStackService {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut WindowStackService {
        &mut self.windows
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    #[must_use]
    pub fn menus(&self) -> &MenuPopupChain {
        &self.menus
    }

    pub fn menus_mut(&mut self) -> &mut MenuPopupChain {
        &mut self.menus
    }

    /// Pending outgoing variables.
    #[must_use]
    pub fn variables(&self) -> &BatchedVariables {
        &self.variables
    }

    /// Open a window in this host's environment.
    pub fn open_window(&mut self, window: LayeredWindow, metrics: &dyn BoxMetrics) -> WindowId {
        self.windows.open(window, metrics, &self.env)
    }

    /// Show a notification in this host's environment.
    pub fn show_notification(
        &mut self,
        content: NodeId,
        position: NotificationPosition,
        delay: DelayPolicy,
        style: Option<&str>,
        metrics: &dyn BoxMetrics,
    ) -> NotificationId {
        self.notifications
            .show(content, position, delay, style, metrics, &self.env)
    }

    /// Apply the deferred work of one update round: commit window ordering
    /// and restack notifications above the windows. Returns the number of
    /// windows moved.
    pub fn finish_update(&mut self) -> usize {
        let committed = self.windows.commit_ordering();
        self.notifications.bring_to_front();
        committed
    }

    /// Route one input event through notifications, menus and windows.
    pub fn dispatch(
        &mut self,
        event: &Event,
        hit: HitTarget,
        metrics: &dyn BoxMetrics,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        if !self.notifications.handle_event(event, hit.notification) {
            tracing::trace!(event = event.name(), "event swallowed by notification");
            outcome.consumed = true;
            return outcome;
        }

        match event {
            Event::Pointer(pointer) if matches!(pointer.kind, PointerEventKind::Down(_)) => {
                outcome.menu_closed = self.menus.handle_pointer_down(pointer.x, pointer.y);
            }
            Event::Resize { width, height } => self.resize(*width, *height, metrics),
            _ => {}
        }

        outcome.window =
            self.windows
                .handle_event(event, hit.window, metrics, &self.env, &mut self.variables);
        outcome.consumed = outcome.window.is_some() || self.windows.captured().is_some();
        outcome
    }

    fn resize(&mut self, width: i32, height: i32, metrics: &dyn BoxMetrics) {
        self.env.viewport = Size::new(width, height);
        self.windows.set_viewport(self.env.viewport);
        self.notifications.reposition_all(metrics, &self.env);
        tracing::debug!(width, height, "overlay viewport resized");
    }

    /// Advance animations and timers of every service by `dt`.
    pub fn tick(&mut self, dt: Duration, metrics: &dyn BoxMetrics) -> TickReport {
        self.menus.tick(dt, metrics);
        TickReport {
            window_events: self.windows.tick(dt, metrics),
            hidden: self.notifications.tick(dt, metrics),
        }
    }

    /// Take the coalesced variable batch.
    pub fn flush_variables(&mut self) -> Vec<VariableUpdate> {
        self.variables.flush()
    }
}
