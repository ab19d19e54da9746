#![no_main]

use libfuzzer_sys::fuzz_target;
use tessera_core::metrics::{HeadlessMetrics, NodeBox, NodeId, RecordingReporter};
use tessera_layout::{Axis, ChildPlacement, GridLayout, LayoutSlot};

fuzz_target!(|data: &[u8]| {
    // First two bytes pick the matrix (1..8 x 1..8).
    if data.len() < 2 {
        return;
    }
    let mut rows = (data[0] % 8) as usize + 1;
    let mut cols = (data[1] % 8) as usize + 1;
    let payload = &data[2..];

    let mut grid = GridLayout::new(NodeId(0))
        .with_size(rows, cols)
        .with_spacing(4, 2);
    let mut metrics = HeadlessMetrics::new();
    let mut next_node = 1u32;
    let mut children = Vec::new();

    for op in payload.chunks_exact(4) {
        match op[0] % 5 {
            0 => {
                let row = op[1] as usize % rows;
                let col = op[2] as usize % cols;
                if grid.cell_at(row, col).is_some() {
                    continue;
                }
                let span = (op[3] as usize % 3 + 1).min(cols - col);
                let node = NodeId(next_node);
                next_node += 1;
                metrics.set(node, NodeBox::sized(i32::from(op[3]), i32::from(op[1])));
                let id = grid.create_cell(row, col);
                grid.update_cell(id, ChildPlacement::at(row, col).spanning(1, span));
                grid.set_child(id, LayoutSlot::new(node));
                children.push(node);
            }
            1 => {
                if let Some(node) = children.pop() {
                    grid.remove_child(node);
                }
            }
            2 => {
                rows = op[1] as usize % 8 + 1;
                cols = op[2] as usize % 8 + 1;
                for slot in grid.set_size(rows, cols) {
                    children.retain(|&c| c != slot.child());
                }
            }
            3 => grid.set_hide_empty_rows_and_columns(op[1] & 1 == 1),
            _ => {
                grid.set_width_defined(op[1] & 1 == 1);
                grid.set_height_defined(op[2] & 1 == 1);
                metrics.set_outer(NodeId(0), i32::from(op[3]) * 4, i32::from(op[3]) * 2);
            }
        }
    }

    let mut reporter = RecordingReporter::new();
    grid.update_width(&metrics, &mut reporter);
    grid.update_height(&metrics, &mut reporter);

    // Post-conditions that must always hold:
    assert_eq!(grid.column_widths().len(), cols, "column count drifted");
    assert_eq!(grid.row_heights().len(), rows, "row count drifted");
    assert!(grid.column_widths().iter().all(|&w| w >= 0), "negative column width");
    assert!(grid.row_heights().iter().all(|&h| h >= 0), "negative row height");
    for &child in &children {
        assert!(grid.slot_for(child).is_some(), "live child lost its slot");
    }
    for col in 0..cols {
        if grid.is_hidden(Axis::Horizontal, col) {
            assert!(!grid.is_occupied(Axis::Horizontal, col), "hidden column holds a child");
        }
    }
});
