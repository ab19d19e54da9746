#![forbid(unsafe_code)]

//! Pointer and key handling for windows: activation, drag, resize, close.
//!
//! A header or footer press only arms a drag; the first move starts it.
//! Dragging and resizing capture the pointer and raise a full-viewport
//! curtain at the curtain z-index so nothing underneath reacts.
//!
//! # Failure Modes
//!
//! - Losing capture mid-drag ends the drag as if the pointer were released.
//! - Losing capture mid-resize drops the resize without committing sizes.

use tessera_core::environment::Environment;
use tessera_core::event::{Event, KeyEvent, KeyEventKind, PointerEvent, PointerEventKind};
use tessera_core::geometry::{Point, Rect, Size};
use tessera_core::metrics::BoxMetrics;
use tessera_core::variables::VariableSink;

use super::{Curtain, WindowEvent, WindowFlags, WindowId, WindowPart, WindowStackService};

/// Per-window interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Interaction {
    #[default]
    Idle,
    /// Header or footer pressed; no movement yet.
    DragPending,
    Dragging {
        start: Point,
        origin: Point,
    },
    Resizing {
        start: Point,
        size: Size,
    },
}

impl WindowStackService {
    /// Route one input event.
    ///
    /// `target` names the window (and part of it) the event hit. While a
    /// window holds pointer capture every event goes to that window instead.
    pub fn handle_event(
        &mut self,
        event: &Event,
        target: Option<(WindowId, WindowPart)>,
        metrics: &dyn BoxMetrics,
        env: &Environment,
        sink: &mut dyn VariableSink,
    ) -> Option<WindowEvent> {
        self.viewport = env.viewport;
        if let Some(id) = self.captured {
            return self.handle_captured(id, event, metrics, env, sink);
        }
        if ends_press(event) {
            self.disarm_drags();
        }
        let (id, part) = target?;
        match event {
            Event::Pointer(pointer) => self.handle_pointer(id, part, pointer, metrics, sink),
            Event::Key(key) => self.handle_key(id, key, sink),
            _ => None,
        }
    }

    fn handle_pointer(
        &mut self,
        id: WindowId,
        part: WindowPart,
        pointer: &PointerEvent,
        metrics: &dyn BoxMetrics,
        sink: &mut dyn VariableSink,
    ) -> Option<WindowEvent> {
        let window = self.windows.get_mut(&id)?;
        match pointer.kind {
            PointerEventKind::Down(_) => {
                let resize = part == WindowPart::ResizeHandle && window.is(WindowFlags::RESIZABLE);
                if matches!(part, WindowPart::Header | WindowPart::Footer)
                    && window.is(WindowFlags::DRAGGABLE)
                {
                    window.interaction = Interaction::DragPending;
                }
                let activated = self.bring_to_front(id);
                if resize {
                    self.begin_resize(id, pointer, metrics);
                }
                activated.then_some(WindowEvent::Activated(id))
            }
            PointerEventKind::Moved => {
                if window.interaction == Interaction::DragPending {
                    self.begin_drag(id, pointer);
                }
                None
            }
            PointerEventKind::Up(_) => {
                window.interaction = Interaction::Idle;
                if part == WindowPart::CloseButton && window.is(WindowFlags::CLOSABLE) {
                    return self.request_close(id, sink);
                }
                None
            }
            PointerEventKind::Cancel => {
                window.interaction = Interaction::Idle;
                None
            }
        }
    }

    fn handle_key(
        &mut self,
        id: WindowId,
        key: &KeyEvent,
        sink: &mut dyn VariableSink,
    ) -> Option<WindowEvent> {
        let window = self.windows.get(&id)?;
        if key.kind == KeyEventKind::Release
            && key.is_escape()
            && window.is(WindowFlags::CLOSABLE)
        {
            return self.request_close(id, sink);
        }
        None
    }

    fn handle_captured(
        &mut self,
        id: WindowId,
        event: &Event,
        metrics: &dyn BoxMetrics,
        env: &Environment,
        sink: &mut dyn VariableSink,
    ) -> Option<WindowEvent> {
        let Some(state) = self.windows.get(&id).map(|w| w.interaction) else {
            self.release_capture(id);
            return None;
        };
        match (state, event) {
            (Interaction::Dragging { start, origin }, Event::Pointer(pointer)) => {
                match pointer.kind {
                    PointerEventKind::Moved => {
                        if env.viewport_contains(pointer.x, pointer.y) {
                            self.set_window_position(
                                id,
                                origin.x + pointer.x - start.x,
                                origin.y + pointer.y - start.y,
                                metrics,
                                env,
                                sink,
                            );
                        }
                        None
                    }
                    PointerEventKind::Up(_) | PointerEventKind::Cancel => self.finish_drag(id),
                    PointerEventKind::Down(_) => None,
                }
            }
            (Interaction::Dragging { .. }, Event::CaptureLost) => self.finish_drag(id),
            (Interaction::Resizing { start, size }, Event::Pointer(pointer)) => {
                let width = pointer.x - start.x + size.width;
                let height = pointer.y - start.y + size.height;
                match pointer.kind {
                    PointerEventKind::Moved => {
                        if env.viewport_contains(pointer.x, pointer.y) {
                            self.apply_resize(id, width, height, metrics)
                        } else {
                            None
                        }
                    }
                    PointerEventKind::Up(_) => {
                        if env.viewport_contains(pointer.x, pointer.y) {
                            self.resize_surface(id, width, height, metrics);
                        }
                        self.commit_resize(id, sink)
                    }
                    PointerEventKind::Cancel => {
                        self.release_capture(id);
                        None
                    }
                    PointerEventKind::Down(_) => None,
                }
            }
            (Interaction::Resizing { .. }, Event::CaptureLost) => {
                self.release_capture(id);
                None
            }
            (Interaction::Idle | Interaction::DragPending, _) => {
                self.release_capture(id);
                None
            }
            _ => None,
        }
    }

    /// Forget every armed-but-unstarted drag.
    fn disarm_drags(&mut self) {
        for window in self.windows.values_mut() {
            if window.interaction == Interaction::DragPending {
                window.interaction = Interaction::Idle;
            }
        }
    }

    fn begin_drag(&mut self, id: WindowId, pointer: &PointerEvent) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let origin = window.surface().map_or(Point::ZERO, |s| s.position());
        window.interaction = Interaction::Dragging {
            start: Point::new(pointer.x, pointer.y),
            origin,
        };
        window.set_flag(WindowFlags::CENTERED, false);
        self.capture(id);
        tracing::debug!(window = id.get(), x = origin.x, y = origin.y, "window drag started");
    }

    fn begin_resize(&mut self, id: WindowId, pointer: &PointerEvent, metrics: &dyn BoxMetrics) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let root = window.chrome().root;
        let size = window.surface().map_or_else(
            || metrics.outer_size(root),
            |s| {
                Size::new(
                    s.width().unwrap_or_else(|| metrics.outer_width(root)),
                    s.height().unwrap_or_else(|| metrics.outer_height(root)),
                )
            },
        );
        window.interaction = Interaction::Resizing {
            start: Point::new(pointer.x, pointer.y),
            size,
        };
        window.set_flag(WindowFlags::CENTERED, false);
        self.capture(id);
        tracing::debug!(
            window = id.get(),
            width = size.width,
            height = size.height,
            "window resize started"
        );
    }

    fn capture(&mut self, id: WindowId) {
        self.captured = Some(id);
        self.drag_curtain = Some(Curtain {
            owner: id,
            rect: Rect::from_size(self.viewport),
            z_index: self.config.curtain_z,
        });
    }

    fn release_capture(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get_mut(&id) {
            window.interaction = Interaction::Idle;
        }
        if self.captured == Some(id) {
            self.captured = None;
            self.drag_curtain = None;
        }
    }

    fn finish_drag(&mut self, id: WindowId) -> Option<WindowEvent> {
        self.release_capture(id);
        let position = self.windows.get(&id)?.surface()?.position();
        tracing::debug!(window = id.get(), x = position.x, y = position.y, "window drag ended");
        Some(WindowEvent::Moved { id, position })
    }

    /// Clamp to the minimum size (content minimum plus decoration) and
    /// apply it to the surface. Returns the applied size.
    fn resize_surface(
        &mut self,
        id: WindowId,
        width: i32,
        height: i32,
        metrics: &dyn BoxMetrics,
    ) -> Option<Size> {
        let fallback = self.config.min_content_size;
        let window = self.windows.get_mut(&id)?;
        let chrome = *window.chrome();
        let min = window.min_content(fallback);
        let decoration_height =
            metrics.outer_height(chrome.header) + metrics.outer_height(chrome.footer);
        let decoration_width =
            metrics.outer_width(chrome.root) - metrics.outer_width(chrome.contents);
        let size = Size::new(
            width.max(min.width + decoration_width),
            height.max(min.height + decoration_height),
        );
        let surface = window.surface.as_mut()?;
        surface.set_width(Some(size.width), metrics);
        surface.set_height(Some(size.height), metrics);
        Some(size)
    }

    fn apply_resize(
        &mut self,
        id: WindowId,
        width: i32,
        height: i32,
        metrics: &dyn BoxMetrics,
    ) -> Option<WindowEvent> {
        self.resize_surface(id, width, height, metrics)?;
        let lazy = self.windows.get(&id)?.is(WindowFlags::LAZY_RESIZE);
        if !lazy {
            return Some(WindowEvent::ContentLayoutRequested(id));
        }
        if let Some((_, timer)) = self.lazy_timer.take() {
            self.timers.cancel(timer);
        }
        let timer = self.timers.schedule(self.config.lazy_resize_delay, id);
        self.lazy_timer = Some((id, timer));
        None
    }

    fn commit_resize(&mut self, id: WindowId, sink: &mut dyn VariableSink) -> Option<WindowEvent> {
        self.release_capture(id);
        if let Some((owner, timer)) = self.lazy_timer {
            if owner == id {
                self.timers.cancel(timer);
                self.lazy_timer = None;
            }
        }
        let window = self.windows.get(&id)?;
        let surface = window.surface()?;
        let size = Size::new(surface.width()?, surface.height()?);
        sink.update_variable(window.component(), "height", size.height.into(), false);
        sink.update_variable(window.component(), "width", size.width.into(), true);
        tracing::debug!(
            window = id.get(),
            width = size.width,
            height = size.height,
            "window resized"
        );
        Some(WindowEvent::Resized { id, size })
    }

    fn request_close(&mut self, id: WindowId, sink: &mut dyn VariableSink) -> Option<WindowEvent> {
        let window = self.windows.get(&id)?;
        sink.update_variable(window.component(), "close", true.into(), true);
        Some(WindowEvent::CloseRequested(id))
    }
}

/// Events after which no earlier press may still arm a drag.
fn ends_press(event: &Event) -> bool {
    match event {
        Event::Pointer(pointer) => !matches!(pointer.kind, PointerEventKind::Moved),
        Event::CaptureLost => true,
        _ => false,
    }
}
