#![forbid(unsafe_code)]

//! Coalescing variable sink.
//!
//! Widgets emit a variable every time a value changes; a drag can report
//! hundreds of positions between two round trips. [`BatchedVariables`]
//! keeps only the latest value per `(component, name)` and hands the batch
//! over on [`flush`](BatchedVariables::flush).
//!
//! # Invariants
//!
//! - At most one pending update per `(component, name)`.
//! - Flush order is the order in which each key was first recorded since
//!   the previous flush.
//! - A key is immediate if any of its coalesced updates was.

use ahash::AHashMap;

use tessera_core::variables::{VariableSink, VariableUpdate, VariableValue};

type Key = (String, &'static str);

/// Variable sink that keeps the latest value per component variable.
#[derive(Debug, Default)]
pub struct BatchedVariables {
    pending: Vec<VariableUpdate>,
    index: AHashMap<Key, usize>,
    immediate: bool,
}

impl BatchedVariables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct pending variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending updates in flush order.
    #[must_use]
    pub fn pending(&self) -> &[VariableUpdate] {
        &self.pending
    }

    /// Whether any pending update asked to be sent right away.
    #[must_use]
    pub fn needs_immediate_flush(&self) -> bool {
        self.immediate
    }

    /// Take the batch.
    pub fn flush(&mut self) -> Vec<VariableUpdate> {
        self.index.clear();
        self.immediate = false;
        let batch = std::mem::take(&mut self.pending);
        if !batch.is_empty() {
            tracing::trace!(count = batch.len(), "variables flushed");
        }
        batch
    }
}

impl VariableSink for BatchedVariables {
    fn update_variable(
        &mut self,
        component: &str,
        name: &'static str,
        value: VariableValue,
        immediate: bool,
    ) {
        self.immediate |= immediate;
        let key = (component.to_owned(), name);
        if let Some(&slot) = self.index.get(&key) {
            let update = &mut self.pending[slot];
            update.value = value;
            update.immediate |= immediate;
            return;
        }
        self.index.insert(key, self.pending.len());
        self.pending.push(VariableUpdate {
            component: component.to_owned(),
            name,
            value,
            immediate,
        });
    }
}
