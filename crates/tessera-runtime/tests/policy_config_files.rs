#![forbid(unsafe_code)]

//! File-based policy loading.

use std::time::Duration;

use tessera_runtime::policy_config::{PolicyConfig, PolicyConfigError};
use tessera_widgets::notification::DelayPolicy;

// ── Helpers ─────────────────────────────────────────────────────────────

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ═════════════════════════════════════════════════════════════════════════
// TOML
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn toml_partial_override_preserves_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "policy.toml",
        r#"
[window]
stacking_offset = 20

[notification]
fade_ms = 250
default_delay_ms = -1
"#,
    );

    let policy = PolicyConfig::from_toml_file(&path).unwrap();
    assert_eq!(policy.window.stacking_offset, 20);
    assert_eq!(policy.window.base_z, 10_000);
    assert_eq!(policy.overlay, PolicyConfig::default().overlay);

    let notification = policy.to_notification_config();
    assert_eq!(notification.fade, Duration::from_millis(250));
    assert_eq!(notification.default_delay, DelayPolicy::Forever);
    assert!(policy.validate().is_empty());
}

#[test]
fn empty_toml_is_default() {
    let policy = PolicyConfig::from_toml_str("").unwrap();
    assert_eq!(policy, PolicyConfig::default());
}

#[test]
fn toml_syntax_error_is_reported() {
    let err = PolicyConfig::from_toml_str("[window\nbase_z = 1").unwrap_err();
    assert!(matches!(err, PolicyConfigError::Toml(_)));
    assert!(err.to_string().starts_with("TOML parse error"));
}

#[test]
fn toml_type_mismatch_is_reported() {
    let err = PolicyConfig::from_toml_str("[menu]\nshadow_space = \"wide\"").unwrap_err();
    assert!(matches!(err, PolicyConfigError::Toml(_)));
}

// ═════════════════════════════════════════════════════════════════════════
// JSON
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn json_file_loads_nested_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "policy.json",
        r#"{"overlay":{"open_duration_ms":150},"grid":{"hide_empty_rows_and_columns":true}}"#,
    );

    let policy = PolicyConfig::from_json_file(&path).unwrap();
    assert_eq!(
        policy.to_overlay_config().open_duration,
        Some(Duration::from_millis(150))
    );
    assert!(policy.grid.hide_empty_rows_and_columns);
    assert_eq!(policy.menu, PolicyConfig::default().menu);
}

#[test]
fn json_syntax_error_is_reported() {
    let err = PolicyConfig::from_json_str("{\"window\":").unwrap_err();
    assert!(matches!(err, PolicyConfigError::Json(_)));
    assert!(err.to_string().starts_with("JSON parse error"));
}

// ═════════════════════════════════════════════════════════════════════════
// Failure modes
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PolicyConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, PolicyConfigError::Io(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn loaded_but_invalid_policy_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "bad.toml",
        "[notification]\nstart_opacity = 0\nfade_interval_ms = 0\n",
    );
    let err = PolicyConfig::from_toml_file(&path)
        .unwrap()
        .validated()
        .unwrap_err();
    match err {
        PolicyConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation error, got {other}"),
    }
}
