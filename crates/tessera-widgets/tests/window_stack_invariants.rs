//! Property invariants for the window stack.
//!
//! Random sequences of open/close/raise/modal operations must leave:
//!
//! 1. `order()` a permutation of the open windows, each window's `order`
//!    equal to its index.
//! 2. z-index = base + order for every window.
//! 3. The modal curtain owned by the topmost modal window, at its z-index.
//! 4. A dragged window's top never negative.

use proptest::prelude::*;
use tessera_core::environment::Environment;
use tessera_core::event::{Event, PointerEvent};
use tessera_core::metrics::{HeadlessMetrics, NodeBox, NodeId};
use tessera_core::variables::RecordingSink;
use tessera_widgets::{
    LayeredWindow, WindowChrome, WindowFlags, WindowId, WindowPart, WindowStackService,
};

const CHROME: WindowChrome = WindowChrome {
    root: NodeId(1),
    header: NodeId(2),
    footer: NodeId(3),
    contents: NodeId(4),
};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Open { modal: bool },
    Close(usize),
    Raise(usize),
    Request(usize),
    SetModal(usize, bool),
    Commit,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(|modal| Op::Open { modal }),
        (0usize..8).prop_map(Op::Close),
        (0usize..8).prop_map(Op::Raise),
        (0usize..8).prop_map(Op::Request),
        ((0usize..8), any::<bool>()).prop_map(|(i, m)| Op::SetModal(i, m)),
        Just(Op::Commit),
    ]
}

fn metrics() -> HeadlessMetrics {
    HeadlessMetrics::new()
        .with(NodeId(1), NodeBox::sized(300, 200))
        .with(NodeId(2), NodeBox::sized(300, 24))
        .with(NodeId(4), NodeBox::sized(300, 176))
}

fn pick(stack: &WindowStackService, i: usize) -> Option<WindowId> {
    let order = stack.order();
    (!order.is_empty()).then(|| order[i % order.len()])
}

fn apply(stack: &mut WindowStackService, op: &Op, env: &Environment) {
    let m = metrics();
    match *op {
        Op::Open { modal } => {
            stack.open(LayeredWindow::new("w", CHROME).modal(modal), &m, env);
        }
        Op::Close(i) => {
            if let Some(id) = pick(stack, i) {
                stack.close(id);
            }
        }
        Op::Raise(i) => {
            if let Some(id) = pick(stack, i) {
                stack.bring_to_front(id);
            }
        }
        Op::Request(i) => {
            if let Some(id) = pick(stack, i) {
                stack.request_bring_to_front(id);
            }
        }
        Op::SetModal(i, modal) => {
            if let Some(id) = pick(stack, i) {
                stack.set_modal(id, modal);
            }
        }
        Op::Commit => {
            stack.commit_ordering();
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1–3. Ordering, z-index and curtain
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn order_stays_a_permutation_with_matching_z(ops in proptest::collection::vec(op(), 0..40)) {
        let env = Environment::new(1024, 768);
        let mut stack = WindowStackService::default();
        for op in &ops {
            apply(&mut stack, op, &env);
        }

        let base = stack.config().base_z;
        let mut seen: Vec<WindowId> = stack.order().to_vec();
        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), stack.len());

        for (index, id) in stack.order().iter().enumerate() {
            let window = stack.window(*id);
            prop_assert!(window.is_some());
            let window = window.unwrap();
            prop_assert_eq!(window.order(), index);
            prop_assert_eq!(window.z_index(), Some(base + index as i32));
        }
    }

    #[test]
    fn curtain_belongs_to_topmost_modal(ops in proptest::collection::vec(op(), 0..40)) {
        let env = Environment::new(1024, 768);
        let mut stack = WindowStackService::default();
        for op in &ops {
            apply(&mut stack, op, &env);
        }

        let top_modal = stack
            .order()
            .iter()
            .rev()
            .copied()
            .find(|id| stack.window(*id).is_some_and(|w| w.is(WindowFlags::MODAL)));
        prop_assert_eq!(stack.modal_curtain().map(|c| c.owner), top_modal);
        prop_assert_eq!(stack.is_modal_open(), top_modal.is_some());
        if let (Some(curtain), Some(id)) = (stack.modal_curtain(), top_modal) {
            prop_assert_eq!(Some(curtain.z_index), stack.window(id).and_then(|w| w.z_index()));
        }
    }

    #[test]
    fn commit_puts_modal_windows_on_top(ops in proptest::collection::vec(op(), 0..40)) {
        let env = Environment::new(1024, 768);
        let mut stack = WindowStackService::default();
        for op in &ops {
            apply(&mut stack, op, &env);
        }
        stack.request_bring_to_front(match stack.order().first() {
            Some(id) => *id,
            None => return Ok(()),
        });
        stack.commit_ordering();

        let modal: Vec<bool> = stack
            .order()
            .iter()
            .map(|id| stack.window(*id).is_some_and(|w| w.is(WindowFlags::MODAL)))
            .collect();
        let first_modal = modal.iter().position(|m| *m).unwrap_or(modal.len());
        prop_assert!(modal[first_modal..].iter().all(|m| *m), "{modal:?}");
        prop_assert!(!stack.is_ordering_dirty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Drag containment
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dragged_window_top_never_negative(
        moves in proptest::collection::vec((-200i32..1200, -200i32..900), 1..20),
    ) {
        let env = Environment::new(1024, 768);
        let m = metrics();
        let mut sink = RecordingSink::new();
        let mut stack = WindowStackService::default();
        let id = stack.open(LayeredWindow::new("w", CHROME).at(200, 200), &m, &env);
        let header = Some((id, WindowPart::Header));

        stack.handle_event(
            &Event::Pointer(PointerEvent::down(210, 205)),
            header,
            &m,
            &env,
            &mut sink,
        );
        stack.handle_event(
            &Event::Pointer(PointerEvent::moved(210, 205)),
            header,
            &m,
            &env,
            &mut sink,
        );
        for (x, y) in moves {
            stack.handle_event(
                &Event::Pointer(PointerEvent::moved(x, y)),
                None,
                &m,
                &env,
                &mut sink,
            );
            let top = stack.window(id).and_then(|w| w.surface()).map(|s| s.position().y);
            prop_assert!(top.is_some_and(|t| t >= 0));
        }
        stack.handle_event(&Event::Pointer(PointerEvent::up(0, 0)), None, &m, &env, &mut sink);
        prop_assert!(stack.drag_curtain().is_none());
    }
}
