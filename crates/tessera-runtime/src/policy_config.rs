#![forbid(unsafe_code)]

//! Policy-as-data configuration for Tessera overlays and layouts.
//!
//! Captures every tunable of the overlay, window, notification, menu and
//! grid components as a single [`PolicyConfig`] that can be loaded from TOML
//! or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # tessera-policy.toml
//! [window]
//! stacking_offset = 20
//!
//! [notification]
//! fade_ms = 250
//! ```
//!
//! ```rust,ignore
//! let policy = PolicyConfig::from_toml_file("tessera-policy.toml")?;
//! let policy = PolicyConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the value the matching component uses on its
//! own, so `PolicyConfig::default()` changes nothing.

use std::time::Duration;

#[cfg(feature = "policy-config")]
use std::path::Path;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

use tessera_core::geometry::Size;
use tessera_layout::GridLayout;
use tessera_widgets::menu_popup::{MenuPopupConfig, SHADOW_SPACE};
use tessera_widgets::notification::{DelayPolicy, NotificationConfig};
use tessera_widgets::overlay::{OVERLAY_Z_INDEX, OverlayConfig};
use tessera_widgets::window::{CURTAIN_Z_INDEX, STACKING_OFFSET, WINDOW_Z_INDEX, WindowConfig};

// ---------------------------------------------------------------------------
// Top-level PolicyConfig
// ---------------------------------------------------------------------------

/// Top-level policy configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct PolicyConfig {
    /// Surface defaults shared by windows, notifications and menus.
    pub overlay: OverlayPolicyConfig,

    /// Window stack parameters.
    pub window: WindowPolicyConfig,

    /// Notification dismissal parameters.
    pub notification: NotificationPolicyConfig,

    /// Menu popup parameters.
    pub menu: MenuPolicyConfig,

    /// Grid layout defaults.
    pub grid: GridPolicyConfig,
}

impl PolicyConfig {
    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyConfigError> {
        toml::from_str(s).map_err(PolicyConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        serde_json::from_str(s).map_err(PolicyConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate and return `self`, or every problem found.
    pub fn validated(self) -> Result<Self, PolicyConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(PolicyConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.window.stacking_offset < 0 {
            errors.push(format!(
                "window.stacking_offset must be >= 0, got {}",
                self.window.stacking_offset
            ));
        }
        if self.window.min_content_width < 0 || self.window.min_content_height < 0 {
            errors.push(format!(
                "window.min_content size must be >= 0, got {}x{}",
                self.window.min_content_width, self.window.min_content_height
            ));
        }
        if self.window.curtain_z <= self.window.base_z {
            errors.push(format!(
                "window.curtain_z must be above window.base_z ({}), got {}",
                self.window.base_z, self.window.curtain_z
            ));
        }

        // Notifications restack above the whole window stack.
        if self.notification.z_base <= self.window.base_z {
            errors.push(format!(
                "notification.z_base must be above window.base_z ({}), got {}",
                self.window.base_z, self.notification.z_base
            ));
        }
        if !(1..=100).contains(&self.notification.start_opacity) {
            errors.push(format!(
                "notification.start_opacity must be in 1..=100, got {}",
                self.notification.start_opacity
            ));
        }
        if self.notification.fade_interval_ms == 0 {
            errors.push("notification.fade_interval_ms must be > 0".into());
        }
        if self.notification.move_threshold < 0 {
            errors.push(format!(
                "notification.move_threshold must be >= 0, got {}",
                self.notification.move_threshold
            ));
        }

        if self.menu.shadow_space < 0 {
            errors.push(format!(
                "menu.shadow_space must be >= 0, got {}",
                self.menu.shadow_space
            ));
        }

        errors
    }

    /// Build an [`OverlayConfig`] from this policy.
    #[must_use]
    pub fn to_overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            z_index: self.overlay.z_index,
            shadow: self.overlay.shadow,
            open_duration: nonzero_ms(self.overlay.open_duration_ms),
            close_duration: nonzero_ms(self.overlay.close_duration_ms),
        }
    }

    /// Build a [`WindowConfig`] from this policy.
    #[must_use]
    pub fn to_window_config(&self) -> WindowConfig {
        WindowConfig {
            base_z: self.window.base_z,
            stacking_offset: self.window.stacking_offset,
            curtain_z: self.window.curtain_z,
            min_content_size: Size::new(
                self.window.min_content_width,
                self.window.min_content_height,
            ),
            lazy_resize_delay: Duration::from_millis(self.window.lazy_resize_delay_ms),
            overlay: self.to_overlay_config(),
        }
    }

    /// Build a [`NotificationConfig`] from this policy.
    #[must_use]
    pub fn to_notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            z_base: self.notification.z_base,
            default_delay: DelayPolicy::from_millis(self.notification.default_delay_ms),
            fade: Duration::from_millis(self.notification.fade_ms),
            start_opacity: self.notification.start_opacity,
            fade_interval: Duration::from_millis(self.notification.fade_interval_ms),
            move_threshold: self.notification.move_threshold,
            touch_idle_delay: Duration::from_millis(self.notification.touch_idle_delay_ms),
            overlay: self.to_overlay_config(),
        }
    }

    /// Build a [`MenuPopupConfig`] from this policy.
    #[must_use]
    pub fn to_menu_popup_config(&self) -> MenuPopupConfig {
        MenuPopupConfig {
            shadow_space: self.menu.shadow_space,
            overlay: self.to_overlay_config(),
        }
    }

    /// Apply the grid defaults to a freshly built grid.
    #[must_use]
    pub fn configure_grid(&self, grid: GridLayout) -> GridLayout {
        grid.hide_empty_rows_and_columns(self.grid.hide_empty_rows_and_columns)
    }

    /// Format as a JSONL line for structured logging.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"schema":"tessera-policy-v1","overlay_z_index":{},"window_base_z":{},"window_stacking_offset":{},"notification_z_base":{},"notification_fade_ms":{},"menu_shadow_space":{},"grid_hide_empty":{}}}"#,
            self.overlay.z_index,
            self.window.base_z,
            self.window.stacking_offset,
            self.notification.z_base,
            self.notification.fade_ms,
            self.menu.shadow_space,
            self.grid.hide_empty_rows_and_columns,
        )
    }
}

fn nonzero_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

// ---------------------------------------------------------------------------
// Sub-configs (flat, serde-friendly)
// ---------------------------------------------------------------------------

/// Overlay surface policy parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct OverlayPolicyConfig {
    /// Initial z-index of stand-alone overlays. Default: 20 000.
    pub z_index: i32,
    /// Keep a shadow layer under each surface. Default: true.
    pub shadow: bool,
    /// Open animation length; 0 opens instantly. Default: 0.
    pub open_duration_ms: u64,
    /// Close animation length; 0 closes instantly. Default: 0.
    pub close_duration_ms: u64,
}

impl Default for OverlayPolicyConfig {
    fn default() -> Self {
        Self {
            z_index: OVERLAY_Z_INDEX,
            shadow: true,
            open_duration_ms: 0,
            close_duration_ms: 0,
        }
    }
}

/// Window stack policy parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct WindowPolicyConfig {
    /// z-index of the bottom window. Default: 10 000.
    pub base_z: i32,
    /// Cascade step for windows without a position. Default: 15.
    pub stacking_offset: i32,
    /// z-index of the drag/resize curtain. Default: 20 000.
    pub curtain_z: i32,
    /// Default: 150.
    pub min_content_width: i32,
    /// Default: 100.
    pub min_content_height: i32,
    /// Quiet period before lazy content re-measurement. Default: 200.
    pub lazy_resize_delay_ms: u64,
}

impl Default for WindowPolicyConfig {
    fn default() -> Self {
        Self {
            base_z: WINDOW_Z_INDEX,
            stacking_offset: STACKING_OFFSET,
            curtain_z: CURTAIN_Z_INDEX,
            min_content_width: 150,
            min_content_height: 100,
            lazy_resize_delay_ms: 200,
        }
    }
}

/// Notification policy parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct NotificationPolicyConfig {
    /// z-index of the first notification. Default: 20 000.
    pub z_base: i32,
    /// Delay after the first trigger; negative = forever, 0 = none.
    /// Default: 1000.
    pub default_delay_ms: i32,
    /// Default: 400.
    pub fade_ms: u64,
    /// Opacity percentage when fading starts. Default: 90.
    pub start_opacity: i32,
    /// Default: 50.
    pub fade_interval_ms: u64,
    /// Pointer travel that counts as activity. Default: 7.
    pub move_threshold: i32,
    /// Extra wait on touch devices. Default: 1000.
    pub touch_idle_delay_ms: u64,
}

impl Default for NotificationPolicyConfig {
    fn default() -> Self {
        Self {
            z_base: 20_000,
            default_delay_ms: 1000,
            fade_ms: 400,
            start_opacity: 90,
            fade_interval_ms: 50,
            move_threshold: 7,
            touch_idle_delay_ms: 1000,
        }
    }
}

/// Menu popup policy parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct MenuPolicyConfig {
    /// Free space kept for popup shadows. Default: 10.
    pub shadow_space: i32,
}

impl Default for MenuPolicyConfig {
    fn default() -> Self {
        Self {
            shadow_space: SHADOW_SPACE,
        }
    }
}

/// Grid layout policy parameters.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct GridPolicyConfig {
    /// Collapse rows and columns without children. Default: false.
    pub hide_empty_rows_and_columns: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading a policy configuration.
#[derive(Debug)]
pub enum PolicyConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for PolicyConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for PolicyConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
