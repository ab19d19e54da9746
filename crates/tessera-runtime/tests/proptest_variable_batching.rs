//! Property tests for coalesced variable batches.

use proptest::prelude::*;
use tessera_core::variables::{VariableSink, VariableValue};
use tessera_runtime::variables::BatchedVariables;

// ── Helpers ─────────────────────────────────────────────────────────────

const COMPONENTS: [&str; 3] = ["win-a", "win-b", "toast"];
const NAMES: [&str; 4] = ["positionx", "positiony", "width", "close"];

/// One update: (component index, name index, value, immediate).
fn update() -> impl Strategy<Value = (usize, usize, i64, bool)> {
    (0..COMPONENTS.len(), 0..NAMES.len(), -500i64..500, any::<bool>())
}

fn key(c: usize, n: usize) -> (String, &'static str) {
    (COMPONENTS[c].to_owned(), NAMES[n])
}

proptest! {
    #[test]
    fn one_entry_per_key_holding_the_last_value(
        updates in proptest::collection::vec(update(), 0..60),
    ) {
        let mut vars = BatchedVariables::new();
        for &(c, n, v, imm) in &updates {
            vars.update_variable(COMPONENTS[c], NAMES[n], VariableValue::Int(v), imm);
        }
        let batch = vars.flush();

        let mut first_seen: Vec<(String, &'static str)> = Vec::new();
        for &(c, n, _, _) in &updates {
            if !first_seen.contains(&key(c, n)) {
                first_seen.push(key(c, n));
            }
        }
        let flushed: Vec<_> = batch.iter().map(|u| (u.component.clone(), u.name)).collect();
        prop_assert_eq!(&flushed, &first_seen);

        for entry in &batch {
            let matching = updates.iter().filter(|&&(c, n, _, _)| {
                COMPONENTS[c] == entry.component && NAMES[n] == entry.name
            });
            let last = matching.clone().last().map(|&(_, _, v, _)| VariableValue::Int(v));
            prop_assert_eq!(Some(&entry.value), last.as_ref());
            let sticky = matching.clone().any(|&(_, _, _, imm)| imm);
            prop_assert_eq!(entry.immediate, sticky);
        }
    }

    #[test]
    fn immediate_flag_reflects_any_update_and_resets_on_flush(
        updates in proptest::collection::vec(update(), 0..40),
    ) {
        let mut vars = BatchedVariables::new();
        for &(c, n, v, imm) in &updates {
            vars.update_variable(COMPONENTS[c], NAMES[n], VariableValue::Int(v), imm);
        }
        prop_assert_eq!(vars.needs_immediate_flush(), updates.iter().any(|u| u.3));
        vars.flush();
        prop_assert!(!vars.needs_immediate_flush());
        prop_assert!(vars.is_empty());
    }
}
