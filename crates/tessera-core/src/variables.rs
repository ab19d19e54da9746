#![forbid(unsafe_code)]

//! Outgoing state-change channel to the server collaborator.
//!
//! Widgets never talk to the server directly. They emit named variables
//! keyed by component id into a [`VariableSink`]; what happens next
//! (batching, transport) is the sink's business.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A variable value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum VariableValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for VariableValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Fire-and-forget variable channel.
pub trait VariableSink {
    /// Record `name = value` for `component`. `immediate` asks the sink to
    /// flush as soon as possible instead of waiting for the next batch.
    fn update_variable(
        &mut self,
        component: &str,
        name: &'static str,
        value: VariableValue,
        immediate: bool,
    );
}

/// One recorded update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableUpdate {
    pub component: String,
    pub name: &'static str,
    pub value: VariableValue,
    pub immediate: bool,
}

/// Sink that keeps every update in order. Handy as a test double.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    updates: Vec<VariableUpdate>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All updates, oldest first.
    #[must_use]
    pub fn updates(&self) -> &[VariableUpdate] {
        &self.updates
    }

    /// Latest value of `name` for `component`.
    #[must_use]
    pub fn last(&self, component: &str, name: &str) -> Option<&VariableValue> {
        self.updates
            .iter()
            .rev()
            .find(|u| u.component == component && u.name == name)
            .map(|u| &u.value)
    }

    /// Number of updates of `name` for `component`.
    #[must_use]
    pub fn count(&self, component: &str, name: &str) -> usize {
        self.updates
            .iter()
            .filter(|u| u.component == component && u.name == name)
            .count()
    }

    /// Remove and return all recorded updates.
    pub fn take(&mut self) -> Vec<VariableUpdate> {
        std::mem::take(&mut self.updates)
    }
}

impl VariableSink for RecordingSink {
    fn update_variable(
        &mut self,
        component: &str,
        name: &'static str,
        value: VariableValue,
        immediate: bool,
    ) {
        self.updates.push(VariableUpdate {
            component: component.to_owned(),
            name,
            value,
            immediate,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_tracks_latest() {
        let mut sink = RecordingSink::new();
        sink.update_variable("w1", "positionx", 10.into(), false);
        sink.update_variable("w1", "positionx", 20.into(), false);
        sink.update_variable("w1", "close", true.into(), true);
        assert_eq!(sink.last("w1", "positionx"), Some(&VariableValue::Int(20)));
        assert_eq!(sink.count("w1", "positionx"), 2);
        assert_eq!(sink.last("w2", "positionx"), None);
        assert_eq!(sink.take().len(), 3);
        assert!(sink.updates().is_empty());
    }

    #[test]
    fn display_formats_plainly() {
        assert_eq!(VariableValue::Bool(true).to_string(), "true");
        assert_eq!(VariableValue::Int(-4).to_string(), "-4");
        assert_eq!(VariableValue::from("x").to_string(), "x");
    }
}
