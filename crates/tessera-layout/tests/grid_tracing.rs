//! Span coverage for grid passes.

use std::sync::{Arc, Mutex};

use tessera_core::metrics::{HeadlessMetrics, NodeBox, NodeId, RecordingReporter};
use tessera_layout::{ChildPlacement, GridLayout, LayoutSlot};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Debug, Default)]
struct GridTraceState {
    spans: Vec<GridSpan>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct GridSpan {
    name: String,
    rows: Option<u64>,
    cols: Option<u64>,
    defined: Option<bool>,
}

struct GridTraceCapture {
    state: Arc<Mutex<GridTraceState>>,
}

impl<S> Layer<S> for GridTraceCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::Id,
        _ctx: Context<'_, S>,
    ) {
        let name = attrs.metadata().name();
        if !name.starts_with("grid.") {
            return;
        }

        struct GridVisitor(GridSpan);

        impl tracing::field::Visit for GridVisitor {
            fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
                match field.name() {
                    "rows" => self.0.rows = Some(value),
                    "cols" => self.0.cols = Some(value),
                    _ => {}
                }
            }

            fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
                if field.name() == "defined" {
                    self.0.defined = Some(value);
                }
            }

            fn record_debug(
                &mut self,
                _field: &tracing::field::Field,
                _value: &dyn std::fmt::Debug,
            ) {
            }
        }

        let mut visitor = GridVisitor(GridSpan {
            name: name.to_owned(),
            ..GridSpan::default()
        });
        attrs.record(&mut visitor);
        self.state
            .lock()
            .expect("trace state lock")
            .spans
            .push(visitor.0);
    }
}

#[test]
fn width_and_height_passes_open_named_spans() {
    let state = Arc::new(Mutex::new(GridTraceState::default()));
    let subscriber = tracing_subscriber::registry().with(GridTraceCapture {
        state: Arc::clone(&state),
    });
    let _guard = tracing::subscriber::set_default(subscriber);
    tracing::callsite::rebuild_interest_cache();

    let metrics = HeadlessMetrics::new().with(NodeId(1), NodeBox::sized(30, 10));
    let mut grid = GridLayout::new(NodeId(0))
        .with_size(2, 3)
        .with_defined_size(false, true);
    let id = grid.create_cell(0, 0);
    grid.update_cell(id, ChildPlacement::at(0, 0));
    grid.set_child(id, LayoutSlot::new(NodeId(1)));

    let mut rec = RecordingReporter::new();
    grid.update_width(&metrics, &mut rec);
    grid.update_height(&metrics, &mut rec);

    tracing::callsite::rebuild_interest_cache();
    let snapshot = state.lock().expect("trace state lock");
    assert_eq!(
        snapshot.spans,
        vec![
            GridSpan {
                name: "grid.update_width".to_owned(),
                rows: Some(2),
                cols: Some(3),
                defined: Some(false),
            },
            GridSpan {
                name: "grid.update_height".to_owned(),
                rows: Some(2),
                cols: Some(3),
                defined: Some(true),
            },
        ]
    );
}
