#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! These are the events the overlay widgets react to: pointer traffic for
//! drag/resize and dismissal, key traffic for Escape handling, and the
//! scroll/wheel/capture signals that browsers deliver as separate native
//! events. Touch input is folded into pointer events with
//! [`PointerSource::Touch`].
//!
//! # Design Notes
//!
//! - Coordinates are viewport pixels and may be negative or exceed the
//!   viewport while a pointer is captured.
//! - `KeyEventKind::Repeat` marks auto-repeat key-downs, which dismissal
//!   logic ignores.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A pointer (mouse or touch) event.
    Pointer(PointerEvent),

    /// Mouse wheel rotation.
    Wheel(WheelEvent),

    /// The viewport or a scroll container scrolled.
    Scroll,

    /// Pointer capture was taken away by the host.
    CaptureLost,

    /// Viewport was resized.
    Resize {
        /// New viewport width in pixels.
        width: i32,
        /// New viewport height in pixels.
        height: i32,
    },

    /// Focus gained (`true`) or lost (`false`).
    Focus(bool),
}

impl Event {
    /// Short name used in trace fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Key(_) => "key",
            Self::Pointer(p) => match p.kind {
                PointerEventKind::Down(_) => "pointer_down",
                PointerEventKind::Up(_) => "pointer_up",
                PointerEventKind::Moved => "pointer_move",
                PointerEventKind::Cancel => "pointer_cancel",
            },
            Self::Wheel(_) => "wheel",
            Self::Scroll => "scroll",
            Self::CaptureLost => "capture_lost",
            Self::Resize { .. } => "resize",
            Self::Focus(_) => "focus",
        }
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// Press, repeat, or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Key-down that is not an auto-repeat.
    #[must_use]
    pub const fn is_fresh_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press)
    }

    /// Check if this is the Escape key.
    #[must_use]
    pub const fn is_escape(&self) -> bool {
        matches!(self.code, KeyCode::Escape)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    /// Function key (F1-F24).
    F(u8),
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key went down.
    #[default]
    Press,

    /// Key is being held (auto-repeat key-down).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta/Command key.
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerEventKind,

    /// X coordinate in viewport pixels.
    pub x: i32,

    /// Y coordinate in viewport pixels.
    pub y: i32,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// Whether the pointer is a mouse or a touch contact.
    pub source: PointerSource,
}

impl PointerEvent {
    /// Create a new mouse pointer event.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
            source: PointerSource::Mouse,
        }
    }

    /// Shorthand for a primary-button press.
    #[must_use]
    pub const fn down(x: i32, y: i32) -> Self {
        Self::new(PointerEventKind::Down(PointerButton::Primary), x, y)
    }

    /// Shorthand for a primary-button release.
    #[must_use]
    pub const fn up(x: i32, y: i32) -> Self {
        Self::new(PointerEventKind::Up(PointerButton::Primary), x, y)
    }

    /// Shorthand for a move.
    #[must_use]
    pub const fn moved(x: i32, y: i32) -> Self {
        Self::new(PointerEventKind::Moved, x, y)
    }

    /// Mark the event as coming from a touch contact.
    #[must_use]
    pub const fn touch(mut self) -> Self {
        self.source = PointerSource::Touch;
        self
    }

    /// Create a pointer event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Get the position as a tuple.
    #[must_use]
    pub const fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed or touch started.
    Down(PointerButton),

    /// Button released or touch ended.
    Up(PointerButton),

    /// Pointer moved.
    Moved,

    /// The platform cancelled the pointer sequence (e.g. touchcancel).
    Cancel,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Origin of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

/// Mouse wheel rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelEvent {
    pub x: i32,
    pub y: i32,
    /// Vertical delta in pixels, positive downward.
    pub delta_y: i32,
}

impl WheelEvent {
    /// Create a new wheel event.
    #[must_use]
    pub const fn new(x: i32, y: i32, delta_y: i32) -> Self {
        Self { x, y, delta_y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_kind_default() {
        assert_eq!(KeyEventKind::default(), KeyEventKind::Press);
    }

    #[test]
    fn repeat_is_not_fresh_press() {
        let press = KeyEvent::new(KeyCode::Char('a'));
        assert!(press.is_fresh_press());
        assert!(!press.with_kind(KeyEventKind::Repeat).is_fresh_press());
        assert!(!press.with_kind(KeyEventKind::Release).is_fresh_press());
    }

    #[test]
    fn escape_detection() {
        assert!(KeyEvent::new(KeyCode::Escape).is_escape());
        assert!(!KeyEvent::new(KeyCode::Enter).is_escape());
    }

    #[test]
    fn pointer_shorthands() {
        let down = PointerEvent::down(10, 20);
        assert_eq!(down.kind, PointerEventKind::Down(PointerButton::Primary));
        assert_eq!(down.position(), (10, 20));
        assert_eq!(down.source, PointerSource::Mouse);
        assert_eq!(PointerEvent::moved(1, 2).touch().source, PointerSource::Touch);
    }

    #[test]
    fn event_names() {
        assert_eq!(Event::Pointer(PointerEvent::up(0, 0)).name(), "pointer_up");
        assert_eq!(Event::CaptureLost.name(), "capture_lost");
        assert_eq!(Event::Wheel(WheelEvent::new(0, 0, 3)).name(), "wheel");
    }

    #[test]
    fn modifiers_default() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
        let ev = PointerEvent::down(0, 0).with_modifiers(Modifiers::SHIFT | Modifiers::CTRL);
        assert!(ev.modifiers.contains(Modifiers::CTRL));
    }
}
