#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tessera_core::environment::Environment;
use tessera_core::event::{Event, KeyCode, KeyEvent, KeyEventKind, PointerEvent};
use tessera_core::metrics::{HeadlessMetrics, NodeBox, NodeId};
use tessera_core::variables::RecordingSink;
use tessera_widgets::{LayeredWindow, WindowChrome, WindowPart, WindowStackService};

const CHROME: WindowChrome = WindowChrome {
    root: NodeId(1),
    header: NodeId(2),
    footer: NodeId(3),
    contents: NodeId(4),
};

#[derive(Debug, Arbitrary)]
enum Part {
    Header,
    Footer,
    ResizeHandle,
    CloseButton,
    Content,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Open { modal: bool, lazy: bool },
    Close(u8),
    Request(u8),
    Commit,
    Down { window: u8, part: Part, x: i16, y: i16 },
    Move { x: i16, y: i16 },
    Up { x: i16, y: i16 },
    CaptureLost,
    Escape(u8),
    Tick(u8),
}

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 256 {
        return;
    }
    let env = Environment::new(800, 600);
    let metrics = HeadlessMetrics::new()
        .with(NodeId(1), NodeBox::sized(300, 200))
        .with(NodeId(2), NodeBox::sized(300, 24))
        .with(NodeId(3), NodeBox::sized(300, 16))
        .with(NodeId(4), NodeBox::sized(290, 160));
    let mut stack = WindowStackService::default();
    let mut sink = RecordingSink::new();

    let pick = |stack: &WindowStackService, i: u8| {
        let order = stack.order();
        (!order.is_empty()).then(|| order[i as usize % order.len()])
    };

    for op in ops {
        match op {
            Op::Open { modal, lazy } => {
                let window = LayeredWindow::new("w", CHROME).modal(modal).lazy_resize(lazy);
                stack.open(window, &metrics, &env);
            }
            Op::Close(i) => {
                if let Some(id) = pick(&stack, i) {
                    stack.close(id);
                }
            }
            Op::Request(i) => {
                if let Some(id) = pick(&stack, i) {
                    stack.request_bring_to_front(id);
                }
            }
            Op::Commit => {
                stack.commit_ordering();
            }
            Op::Down { window, part, x, y } => {
                let part = match part {
                    Part::Header => WindowPart::Header,
                    Part::Footer => WindowPart::Footer,
                    Part::ResizeHandle => WindowPart::ResizeHandle,
                    Part::CloseButton => WindowPart::CloseButton,
                    Part::Content => WindowPart::Content,
                };
                let target = pick(&stack, window).map(|id| (id, part));
                let event = Event::Pointer(PointerEvent::down(x.into(), y.into()));
                stack.handle_event(&event, target, &metrics, &env, &mut sink);
            }
            Op::Move { x, y } => {
                let event = Event::Pointer(PointerEvent::moved(x.into(), y.into()));
                stack.handle_event(&event, None, &metrics, &env, &mut sink);
            }
            Op::Up { x, y } => {
                let event = Event::Pointer(PointerEvent::up(x.into(), y.into()));
                stack.handle_event(&event, None, &metrics, &env, &mut sink);
            }
            Op::CaptureLost => {
                stack.handle_event(&Event::CaptureLost, None, &metrics, &env, &mut sink);
            }
            Op::Escape(i) => {
                let target = pick(&stack, i).map(|id| (id, WindowPart::Content));
                let event =
                    Event::Key(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Release));
                stack.handle_event(&event, target, &metrics, &env, &mut sink);
            }
            Op::Tick(ms) => {
                stack.tick(std::time::Duration::from_millis(ms.into()), &metrics);
            }
        }

        // Post-conditions that must always hold:
        let base = stack.config().base_z;
        for (index, id) in stack.order().iter().enumerate() {
            let window = stack.window(*id).expect("ordered window exists");
            assert_eq!(window.z_index(), Some(base + index as i32), "z drifted from order");
            let top = window.surface().map(|s| s.position().y).unwrap_or(0);
            assert!(top >= 0, "window dragged above the viewport");
        }
        if let Some(captured) = stack.captured() {
            assert!(stack.window(captured).is_some(), "capture held by a closed window");
        }
        assert_eq!(stack.drag_curtain().is_some(), stack.captured().is_some());
    }
});
