#![forbid(unsafe_code)]

//! Floating surfaces for Tessera.
//!
//! - [`overlay`]: the base [`OverlaySurface`] with shadow and shim layers.
//! - [`window`]: layered windows and the [`WindowStackService`].
//! - [`notification`]: transient notifications and their dismissal rules.
//! - [`menu_popup`]: menu popup placement and the open-popup chain.
//!
//! Nothing here touches a real display. Sizes come from
//! [`tessera_core::BoxMetrics`], time from `tick(dt)`, and state changes
//! leave through [`tessera_core::VariableSink`].

pub mod menu_popup;
pub mod notification;
pub mod overlay;
pub mod window;

pub use menu_popup::{
    MenuAnchor, MenuKind, MenuPlacement, MenuPopupChain, MenuPopupConfig, place_menu_popup,
};
pub use notification::{
    DelayPolicy, NotificationCenter, NotificationConfig, NotificationId, NotificationPosition,
    NotificationState,
};
pub use overlay::{CompanionLayer, OverlayBox, OverlayConfig, OverlayPhase, OverlaySurface};
pub use window::{
    Curtain, LayeredWindow, WindowChrome, WindowConfig, WindowEvent, WindowFlags, WindowId,
    WindowPart, WindowStackService,
};
