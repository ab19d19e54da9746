#![forbid(unsafe_code)]

//! Grid layout engine.
//!
//! Computes column widths and row heights for a sparse grid of cells with
//! row/column spans and per-row/column expansion ratios, then positions
//! every cell's [`LayoutSlot`].
//!
//! Width and height are independent passes ([`GridLayout::update_width`],
//! [`GridLayout::update_height`]) because a container may have a definite
//! width and a content-driven height, or vice versa. Each pass runs three
//! phases on the same arrays, strictly in order:
//!
//! 1. **Detect**: the minimum size of every column (row) is the largest
//!    used size of a non-spanned, non-relative cell in it. Spanned cells
//!    are then folded in, smallest span first, by growing the columns
//!    they cross until their total (plus inner spacing) fits.
//! 2. **Expand**: with a definite container size, excess space is shared
//!    by expansion ratio (equally when no ratio applies). Rounding
//!    leftovers go one pixel at a time from the first index.
//! 3. **Position**: slots are placed at cumulative offsets. With a
//!    content-driven container size the resulting outer size is reported.
//!
//! # Invariants
//!
//! 1. A non-spanned, non-relative cell's used size never exceeds its
//!    column's (row's) final size.
//! 2. A spanned cell's covered sizes plus inner spacing cover its used size.
//! 3. With a definite size and positive excess, final sizes plus visible
//!    spacing equal the container's inner size exactly.
//! 4. A pass over unchanged inputs yields unchanged outputs.
//!
//! # Failure Modes
//!
//! Coordinates outside the configured matrix are caller bugs and trip
//! `debug_assert!`; release builds clamp spans to the matrix.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tessera_core::geometry::Size;
use tessera_core::metrics::{BoxMetrics, LayoutReporter, NodeId};

use crate::slot::{Alignment, Axis, LayoutSlot};

/// Arena index of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Server-described placement of one child: inclusive corner coordinates
/// plus alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildPlacement {
    pub row1: usize,
    pub column1: usize,
    pub row2: usize,
    pub column2: usize,
    #[serde(default)]
    pub alignment: Alignment,
}

impl ChildPlacement {
    /// Single-cell placement.
    #[must_use]
    pub const fn at(row: usize, column: usize) -> Self {
        Self {
            row1: row,
            column1: column,
            row2: row,
            column2: column,
            alignment: Alignment::TOP_LEFT,
        }
    }

    /// Builder: span `rows` × `cols` from the top-left corner.
    #[must_use]
    pub const fn spanning(mut self, rows: usize, cols: usize) -> Self {
        self.row2 = self.row1 + rows - 1;
        self.column2 = self.column1 + cols - 1;
        self
    }

    /// Builder: set alignment.
    #[must_use]
    pub const fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// One occupied grid position.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    row: usize,
    col: usize,
    rowspan: usize,
    colspan: usize,
    alignment: Alignment,
    slot: Option<LayoutSlot>,
}

impl Cell {
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }

    #[must_use]
    pub fn rowspan(&self) -> usize {
        self.rowspan
    }

    #[must_use]
    pub fn colspan(&self) -> usize {
        self.colspan
    }

    #[must_use]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    #[must_use]
    pub fn slot(&self) -> Option<&LayoutSlot> {
        self.slot.as_ref()
    }

    fn start(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.col,
            Axis::Vertical => self.row,
        }
    }

    fn span(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.colspan,
            Axis::Vertical => self.rowspan,
        }
    }

    /// A cell without a child behaves like a relative-sized one.
    fn is_relative(&self, axis: Axis) -> bool {
        self.slot.as_ref().is_none_or(|s| s.is_relative(axis))
    }

    fn used_size(&self, axis: Axis, metrics: &dyn BoxMetrics) -> i32 {
        self.slot.as_ref().map_or(0, |s| s.used_size(axis, metrics))
    }

    fn covers(&self, axis: Axis, index: usize) -> bool {
        let start = self.start(axis);
        start <= index && index < start + self.span(axis)
    }
}

/// Spanned cells sharing one span length. Rebuilt every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SpanGroup {
    span: usize,
    cells: Vec<CellId>,
}

/// Insert `cell` into the group for `span`, keeping groups in ascending
/// span order.
fn store_spanned_cell(groups: &mut Vec<SpanGroup>, span: usize, cell: CellId) {
    match groups.binary_search_by_key(&span, |g| g.span) {
        Ok(i) => groups[i].cells.push(cell),
        Err(i) => groups.insert(
            i,
            SpanGroup {
                span,
                cells: vec![cell],
            },
        ),
    }
}

/// Grow `dims[start..start + span]` so that together with inner spacing
/// they cover `size`.
///
/// The shortfall is shared by `ratios` when any covered ratio is non-zero,
/// equally otherwise. Pixels lost to integer division are then added one
/// at a time from the first covered index.
pub fn distribute_span_size(
    dims: &mut [i32],
    start: usize,
    span: usize,
    spacing: i32,
    size: i32,
    ratios: &[i32],
) {
    let covered = start..start + span;
    let allocated =
        dims[covered.clone()].iter().sum::<i32>() + spacing * (span.saturating_sub(1) as i32);
    if allocated >= size {
        return;
    }

    let needed = i64::from(size - allocated);
    let total_ratio: i64 = ratios[covered.clone()].iter().map(|&r| i64::from(r)).sum();
    let mut distributed = 0i64;
    for i in covered.clone() {
        let extra = if total_ratio == 0 {
            needed / span as i64
        } else {
            needed * i64::from(ratios[i]) / total_ratio
        };
        dims[i] += extra as i32;
        distributed += extra;
    }

    for i in covered {
        if distributed >= needed {
            break;
        }
        dims[i] += 1;
        distributed += 1;
    }
}

/// Normalise float expansion ratios to integer weights summing to 1000.
///
/// All-zero (or empty-sum) input gives every entry an equal share. The
/// rounding error is absorbed by the first entry.
#[must_use]
pub fn normalize_expand_ratios(ratios: &[f32]) -> Vec<i32> {
    if ratios.is_empty() {
        return Vec::new();
    }
    let sum: f32 = ratios.iter().map(|r| r.max(0.0)).sum();
    let mut out: Vec<i32> = if sum <= 0.0 {
        let equal = (1000.0 / ratios.len() as f32).round() as i32;
        vec![equal; ratios.len()]
    } else {
        ratios
            .iter()
            .map(|r| (r.max(0.0) / sum * 1000.0).round() as i32)
            .collect()
    };
    let real_sum: i32 = out.iter().sum();
    out[0] -= real_sum - 1000;
    out
}

/// Per-axis sizing state.
#[derive(Debug, Clone, Default, PartialEq)]
struct AxisDims {
    sizes: Vec<i32>,
    minimums: Vec<i32>,
    ratios: Vec<i32>,
    explicit: FxHashSet<usize>,
}

impl AxisDims {
    fn resize(&mut self, len: usize) {
        self.sizes.resize(len, 0);
        self.minimums.resize(len, 0);
        self.ratios.resize(len, 0);
        self.explicit.retain(|&i| i < len);
    }
}

/// Sparse two-dimensional grid layout.
#[derive(Debug, Clone)]
pub struct GridLayout {
    owner: NodeId,
    rows: usize,
    cols: usize,
    /// Row-major `rows × cols`, holding the cell whose top-left corner is there.
    matrix: Vec<Option<CellId>>,
    cells: Vec<Option<Cell>>,
    free: Vec<CellId>,
    child_cells: FxHashMap<NodeId, CellId>,
    columns: AxisDims,
    rows_dims: AxisDims,
    spacing: Size,
    hide_empty_rows_and_columns: bool,
    width_defined: bool,
    height_defined: bool,
}

impl GridLayout {
    /// Create an empty grid owned by `owner` (the node whose padding,
    /// border and inner size frame the grid).
    #[must_use]
    pub fn new(owner: NodeId) -> Self {
        Self {
            owner,
            rows: 0,
            cols: 0,
            matrix: Vec::new(),
            cells: Vec::new(),
            free: Vec::new(),
            child_cells: FxHashMap::default(),
            columns: AxisDims::default(),
            rows_dims: AxisDims::default(),
            spacing: Size::new(0, 0),
            hide_empty_rows_and_columns: false,
            width_defined: false,
            height_defined: false,
        }
    }

    /// Builder: set the matrix size.
    #[must_use]
    pub fn with_size(mut self, rows: usize, cols: usize) -> Self {
        self.set_size(rows, cols);
        self
    }

    /// Builder: set spacing between columns (`width`) and rows (`height`).
    #[must_use]
    pub fn with_spacing(mut self, horizontal: i32, vertical: i32) -> Self {
        self.spacing = Size::new(horizontal, vertical);
        self
    }

    /// Builder: mark the container's width and height as definite.
    #[must_use]
    pub fn with_defined_size(mut self, width: bool, height: bool) -> Self {
        self.width_defined = width;
        self.height_defined = height;
        self
    }

    /// Builder: hide empty rows and columns.
    #[must_use]
    pub fn hide_empty_rows_and_columns(mut self, hide: bool) -> Self {
        self.hide_empty_rows_and_columns = hide;
        self
    }

    #[must_use]
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn set_spacing(&mut self, horizontal: i32, vertical: i32) {
        self.spacing = Size::new(horizontal, vertical);
    }

    pub fn set_hide_empty_rows_and_columns(&mut self, hide: bool) {
        self.hide_empty_rows_and_columns = hide;
    }

    /// Whether the container width is definite (`false` = sized by content).
    pub fn set_width_defined(&mut self, defined: bool) {
        self.width_defined = defined;
    }

    /// Whether the container height is definite (`false` = sized by content).
    pub fn set_height_defined(&mut self, defined: bool) {
        self.height_defined = defined;
    }

    /// Resize the matrix, keeping cells whose top-left corner still fits.
    ///
    /// Cells outside the new bounds are dropped and their slots returned
    /// so the caller can detach them. Spans that now overhang the matrix
    /// are clipped. Unchanged dimensions are a no-op.
    pub fn set_size(&mut self, rows: usize, cols: usize) -> Vec<LayoutSlot> {
        if rows == self.rows && cols == self.cols {
            return Vec::new();
        }

        let mut matrix = vec![None; rows * cols];
        let mut dropped = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let Some(id) = self.matrix[row * self.cols + col] else {
                    continue;
                };
                if row < rows && col < cols {
                    matrix[row * cols + col] = Some(id);
                    if let Some(cell) = self.cells[id.index()].as_mut() {
                        cell.rowspan = cell.rowspan.min(rows - row);
                        cell.colspan = cell.colspan.min(cols - col);
                    }
                } else if let Some(slot) = self.release_cell(id) {
                    dropped.push(slot);
                }
            }
        }

        self.matrix = matrix;
        self.rows = rows;
        self.cols = cols;
        self.columns.resize(cols);
        self.rows_dims.resize(rows);
        tracing::debug!(rows, cols, dropped = dropped.len(), "grid resized");
        dropped
    }

    /// Create an empty cell at `(row, col)`.
    pub fn create_cell(&mut self, row: usize, col: usize) -> CellId {
        debug_assert!(
            row < self.rows && col < self.cols,
            "cell ({row},{col}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        let cell = Cell {
            row,
            col,
            rowspan: 1,
            colspan: 1,
            alignment: Alignment::TOP_LEFT,
            slot: None,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.cells[id.index()] = Some(cell);
                id
            }
            None => {
                let id = CellId(self.cells.len() as u32);
                self.cells.push(Some(cell));
                id
            }
        };
        if let Some(entry) = self.matrix_entry_mut(row, col) {
            *entry = Some(id);
        }
        id
    }

    /// Apply placement data: move, re-span and re-align the cell.
    pub fn update_cell(&mut self, id: CellId, placement: ChildPlacement) {
        debug_assert!(placement.row2 >= placement.row1 && placement.column2 >= placement.column1);
        debug_assert!(
            placement.row2 < self.rows && placement.column2 < self.cols,
            "placement {placement:?} outside {}x{} grid",
            self.rows,
            self.cols
        );
        let Some((old_row, old_col)) = self.cell(id).map(|c| (c.row, c.col)) else {
            return;
        };

        if (old_row, old_col) != (placement.row1, placement.column1) {
            if let Some(entry) = self.matrix_entry_mut(old_row, old_col) {
                if *entry == Some(id) {
                    *entry = None;
                }
            }
            if let Some(entry) = self.matrix_entry_mut(placement.row1, placement.column1) {
                *entry = Some(id);
            }
        }

        let (rows, cols) = (self.rows, self.cols);
        if let Some(cell) = self.cells[id.index()].as_mut() {
            cell.row = placement.row1;
            cell.col = placement.column1;
            cell.rowspan = (1 + placement.row2.saturating_sub(placement.row1))
                .min(rows.saturating_sub(cell.row).max(1));
            cell.colspan = (1 + placement.column2.saturating_sub(placement.column1))
                .min(cols.saturating_sub(cell.col).max(1));
            cell.alignment = placement.alignment;
            if let Some(slot) = cell.slot.as_mut() {
                slot.set_alignment(placement.alignment);
            }
        }
    }

    /// Put `slot` into cell `id`.
    ///
    /// If the slot's child already lives in another cell, that cell loses
    /// its slot. Returns the slot previously held by `id`, if any.
    pub fn set_child(&mut self, id: CellId, mut slot: LayoutSlot) -> Option<LayoutSlot> {
        let child = slot.child();
        if let Some(old) = self.child_cells.insert(child, id) {
            if old != id {
                if let Some(old_cell) = self.cells[old.index()].as_mut() {
                    old_cell.slot = None;
                }
            }
        }
        let cell = self.cells[id.index()].as_mut()?;
        slot.set_alignment(cell.alignment);
        let previous = cell.slot.replace(slot);
        if let Some(prev) = previous.as_ref() {
            if prev.child() != child {
                self.child_cells.remove(&prev.child());
            }
        }
        previous
    }

    /// Remove a child and destroy its cell. Returns the detached slot.
    pub fn remove_child(&mut self, child: NodeId) -> Option<LayoutSlot> {
        let id = self.child_cells.get(&child).copied()?;
        self.release_cell(id)
    }

    fn release_cell(&mut self, id: CellId) -> Option<LayoutSlot> {
        let cell = self.cells.get_mut(id.index())?.take()?;
        if let Some(entry) = self.matrix_entry_mut(cell.row, cell.col) {
            if *entry == Some(id) {
                *entry = None;
            }
        }
        self.free.push(id);
        if let Some(slot) = cell.slot.as_ref() {
            self.child_cells.remove(&slot.child());
        }
        cell.slot
    }

    fn matrix_entry_mut(&mut self, row: usize, col: usize) -> Option<&mut Option<CellId>> {
        if row < self.rows && col < self.cols {
            self.matrix.get_mut(row * self.cols + col)
        } else {
            None
        }
    }

    /// Cell by id.
    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index()).and_then(Option::as_ref)
    }

    /// Cell whose top-left corner is `(row, col)`.
    #[must_use]
    pub fn cell_at(&self, row: usize, col: usize) -> Option<CellId> {
        if row < self.rows && col < self.cols {
            self.matrix[row * self.cols + col]
        } else {
            None
        }
    }

    /// Slot holding `child`.
    #[must_use]
    pub fn slot_for(&self, child: NodeId) -> Option<&LayoutSlot> {
        let id = self.child_cells.get(&child)?;
        self.cell(*id)?.slot.as_ref()
    }

    /// Set column expansion ratios (integer weights).
    pub fn set_column_expand_ratios(&mut self, ratios: &[i32]) {
        set_ratios(&mut self.columns, ratios);
    }

    /// Set row expansion ratios (integer weights).
    pub fn set_row_expand_ratios(&mut self, ratios: &[i32]) {
        set_ratios(&mut self.rows_dims, ratios);
    }

    /// Columns whose ratio was set explicitly; they are never hidden.
    pub fn set_explicit_column_ratios(&mut self, columns: impl IntoIterator<Item = usize>) {
        self.columns.explicit = columns.into_iter().collect();
    }

    /// Rows whose ratio was set explicitly; they are never hidden.
    pub fn set_explicit_row_ratios(&mut self, rows: impl IntoIterator<Item = usize>) {
        self.rows_dims.explicit = rows.into_iter().collect();
    }

    /// Final column widths from the last width pass.
    #[must_use]
    pub fn column_widths(&self) -> &[i32] {
        &self.columns.sizes
    }

    /// Final row heights from the last height pass.
    #[must_use]
    pub fn row_heights(&self) -> &[i32] {
        &self.rows_dims.sizes
    }

    /// Column widths before expansion.
    #[must_use]
    pub fn min_column_widths(&self) -> &[i32] {
        &self.columns.minimums
    }

    /// Row heights before expansion.
    #[must_use]
    pub fn min_row_heights(&self) -> &[i32] {
        &self.rows_dims.minimums
    }

    fn dims(&self, axis: Axis) -> &AxisDims {
        match axis {
            Axis::Horizontal => &self.columns,
            Axis::Vertical => &self.rows_dims,
        }
    }

    fn dims_mut(&mut self, axis: Axis) -> &mut AxisDims {
        match axis {
            Axis::Horizontal => &mut self.columns,
            Axis::Vertical => &mut self.rows_dims,
        }
    }

    fn spacing_on(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.spacing.width,
            Axis::Vertical => self.spacing.height,
        }
    }

    fn defined_on(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.width_defined,
            Axis::Vertical => self.height_defined,
        }
    }

    /// Whether any cell occupies `index` on `axis`, directly or by span.
    #[must_use]
    pub fn is_occupied(&self, axis: Axis, index: usize) -> bool {
        self.cells.iter().flatten().any(|c| c.covers(axis, index))
    }

    /// Whether the row/column at `index` is treated as non-existent.
    #[must_use]
    pub fn is_hidden(&self, axis: Axis, index: usize) -> bool {
        self.hide_empty_rows_and_columns
            && !self.is_occupied(axis, index)
            && !self.dims(axis).explicit.contains(&index)
    }

    /// Cells in matrix order (columns outer, rows inner).
    fn matrix_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        (0..self.cols).flat_map(move |col| {
            (0..self.rows).filter_map(move |row| self.matrix[row * self.cols + col])
        })
    }

    /// Recompute column widths and position every slot horizontally.
    pub fn update_width(&mut self, metrics: &dyn BoxMetrics, reporter: &mut dyn LayoutReporter) {
        self.update_axis(Axis::Horizontal, metrics, reporter);
    }

    /// Recompute row heights and position every slot vertically.
    pub fn update_height(&mut self, metrics: &dyn BoxMetrics, reporter: &mut dyn LayoutReporter) {
        self.update_axis(Axis::Vertical, metrics, reporter);
    }

    fn update_axis(
        &mut self,
        axis: Axis,
        metrics: &dyn BoxMetrics,
        reporter: &mut dyn LayoutReporter,
    ) {
        let _span = match axis {
            Axis::Horizontal => tracing::debug_span!(
                "grid.update_width",
                rows = self.rows,
                cols = self.cols,
                defined = self.width_defined
            ),
            Axis::Vertical => tracing::debug_span!(
                "grid.update_height",
                rows = self.rows,
                cols = self.cols,
                defined = self.height_defined
            ),
        }
        .entered();

        if self.rows == 0 || self.cols == 0 {
            return;
        }
        self.detect_minimums(axis, metrics);
        self.expand(axis, metrics);
        self.position_cells(axis, metrics, reporter);
    }

    fn detect_minimums(&mut self, axis: Axis, metrics: &dyn BoxMetrics) {
        let mut sizes = vec![0; self.dims(axis).sizes.len()];
        let mut spans = Vec::new();

        for id in self.matrix_cells().collect::<Vec<_>>() {
            let Some(cell) = self.cell(id) else { continue };
            if cell.span(axis) == 1 {
                if !cell.is_relative(axis) {
                    let start = cell.start(axis);
                    sizes[start] = sizes[start].max(cell.used_size(axis, metrics));
                }
            } else {
                store_spanned_cell(&mut spans, cell.span(axis), id);
            }
        }

        let spacing = self.spacing_on(axis);
        let ratios = self.dims(axis).ratios.clone();
        for group in &spans {
            for id in &group.cells {
                let Some(cell) = self.cell(*id) else { continue };
                let size = if cell.is_relative(axis) {
                    0
                } else {
                    cell.used_size(axis, metrics)
                };
                distribute_span_size(
                    &mut sizes,
                    cell.start(axis),
                    cell.span(axis),
                    spacing,
                    size,
                    &ratios,
                );
            }
        }

        let dims = self.dims_mut(axis);
        dims.minimums = sizes.clone();
        dims.sizes = sizes;
    }

    fn used_space(&self, axis: Axis) -> i32 {
        let minimums = &self.dims(axis).minimums;
        let spacing = self.spacing_on(axis);
        let mut used = minimums[0];
        for (i, &min) in minimums.iter().enumerate().skip(1) {
            if min > 0 || !self.is_hidden(axis, i) {
                used += spacing + min;
            }
        }
        used
    }

    fn expand(&mut self, axis: Axis, metrics: &dyn BoxMetrics) {
        if !self.defined_on(axis) {
            return;
        }
        let available = match axis {
            Axis::Horizontal => metrics.inner_width(self.owner),
            Axis::Vertical => metrics.inner_height(self.owner),
        };
        let mut excess = available - self.used_space(axis);
        if excess <= 0 {
            return;
        }

        let len = self.dims(axis).sizes.len();
        let visible: Vec<bool> = (0..len).map(|i| !self.is_hidden(axis, i)).collect();
        let mut weights: Vec<i64> = (0..len)
            .map(|i| {
                if visible[i] {
                    i64::from(self.dims(axis).ratios[i].max(0))
                } else {
                    0
                }
            })
            .collect();
        if weights.iter().all(|&w| w == 0) {
            for (w, &v) in weights.iter_mut().zip(&visible) {
                *w = i64::from(v);
            }
        }
        let weight_sum: i64 = weights.iter().sum();

        let dims = self.dims_mut(axis);
        let mut distributed = 0;
        for i in 0..len {
            let extra = if weight_sum == 0 {
                0
            } else {
                (i64::from(excess) * weights[i] / weight_sum) as i32
            };
            dims.sizes[i] = dims.minimums[i] + extra;
            distributed += extra;
        }
        excess -= distributed;

        // Rounding leftovers go one pixel at a time from index 0, hidden
        // indices included.
        let mut c = 0;
        while excess > 0 && len > 0 {
            dims.sizes[c % len] += 1;
            excess -= 1;
            c += 1;
        }
    }

    fn available_for(&self, axis: Axis, start: usize, span: usize) -> i32 {
        let sizes = &self.dims(axis).sizes;
        let end = (start + span).min(sizes.len());
        sizes[start..end].iter().sum::<i32>()
            + self.spacing_on(axis) * (end - start).saturating_sub(1) as i32
    }

    fn position_cells(
        &mut self,
        axis: Axis,
        metrics: &dyn BoxMetrics,
        reporter: &mut dyn LayoutReporter,
    ) {
        let padding = metrics.padding(self.owner);
        let (leading, trailing, border) = match axis {
            Axis::Horizontal => (padding.left, padding.right, metrics.border_width(self.owner)),
            Axis::Vertical => (padding.top, padding.bottom, metrics.border_height(self.owner)),
        };
        let spacing = self.spacing_on(axis);
        let len = self.dims(axis).sizes.len();

        // Offsets first, so slot positioning below only needs the arena.
        let mut offsets = vec![leading; len];
        let mut offset = leading;
        for (i, slot_offset) in offsets.iter_mut().enumerate() {
            *slot_offset = offset;
            let size = self.dims(axis).sizes[i];
            if !self.is_hidden(axis, i) || size > 0 {
                offset += size + spacing;
            }
        }

        let placements: Vec<(CellId, i32, i32, i32)> = self
            .cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (CellId(i as u32), c)))
            .filter(|(_, c)| c.slot.is_some())
            .map(|(id, c)| {
                let start = c.start(axis);
                let span = c.span(axis);
                let margin = if start + span >= len { trailing } else { 0 };
                (id, offsets[start], self.available_for(axis, start, span), margin)
            })
            .collect();

        for (id, location, available, margin) in placements {
            if let Some(slot) = self.cells[id.index()].as_mut().and_then(|c| c.slot.as_mut()) {
                slot.position(axis, location, available, margin, metrics, reporter);
            }
        }

        if !self.defined_on(axis) {
            let outer = offset - spacing + trailing + border;
            match axis {
                Axis::Horizontal => reporter.report_outer_width(self.owner, outer),
                Axis::Vertical => reporter.report_outer_height(self.owner, outer),
            }
        }
    }
}

fn set_ratios(dims: &mut AxisDims, ratios: &[i32]) {
    for (i, r) in dims.ratios.iter_mut().enumerate() {
        *r = ratios.get(i).copied().unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::geometry::Sides;
    use tessera_core::metrics::{HeadlessMetrics, NodeBox, RecordingReporter};

    const OWNER: NodeId = NodeId(0);

    fn child(n: u32) -> NodeId {
        NodeId(100 + n)
    }

    fn place(grid: &mut GridLayout, n: u32, placement: ChildPlacement) -> CellId {
        let id = grid.create_cell(placement.row1, placement.column1);
        grid.update_cell(id, placement);
        grid.set_child(id, LayoutSlot::new(child(n)));
        id
    }

    #[test]
    fn span_distribution_splits_evenly_with_remainder_first() {
        let mut dims = vec![30, 20, 0];
        distribute_span_size(&mut dims, 0, 2, 5, 100, &[0, 0, 0]);
        assert_eq!(dims, vec![53, 42, 0]);
        assert_eq!(dims[0] + dims[1] + 5, 100);
    }

    #[test]
    fn span_distribution_uses_ratios() {
        let mut dims = vec![0, 0];
        distribute_span_size(&mut dims, 0, 2, 0, 100, &[1, 3]);
        assert_eq!(dims, vec![25, 75]);
    }

    #[test]
    fn span_distribution_noop_when_already_fits() {
        let mut dims = vec![60, 60];
        distribute_span_size(&mut dims, 0, 2, 10, 100, &[0, 0]);
        assert_eq!(dims, vec![60, 60]);
    }

    #[test]
    fn ratio_normalisation_sums_to_1000() {
        assert_eq!(normalize_expand_ratios(&[1.0, 1.0, 1.0]), vec![334, 333, 333]);
        assert_eq!(normalize_expand_ratios(&[0.0, 0.0]), vec![500, 500]);
        assert_eq!(normalize_expand_ratios(&[0.0, 2.0]), vec![0, 1000]);
        assert!(normalize_expand_ratios(&[]).is_empty());
    }

    #[test]
    fn spanned_scenario_from_three_by_three() {
        let metrics = HeadlessMetrics::new()
            .with(child(0), NodeBox::sized(100, 10))
            .with(child(1), NodeBox::sized(30, 10))
            .with(child(2), NodeBox::sized(20, 10));
        let mut grid = GridLayout::new(OWNER).with_size(3, 3).with_spacing(5, 0);
        place(&mut grid, 0, ChildPlacement::at(0, 0).spanning(1, 2));
        place(&mut grid, 1, ChildPlacement::at(1, 0));
        place(&mut grid, 2, ChildPlacement::at(1, 1));

        let mut rec = RecordingReporter::new();
        grid.update_width(&metrics, &mut rec);
        assert_eq!(&grid.column_widths()[..2], &[53, 42]);
        assert_eq!(grid.min_column_widths(), grid.column_widths());
    }

    #[test]
    fn undefined_width_reports_outer_size() {
        let metrics = HeadlessMetrics::new()
            .with(
                OWNER,
                NodeBox::sized(0, 0)
                    .padding(Sides::new(0, 4, 0, 6))
                    .border(Sides::all(1)),
            )
            .with(child(0), NodeBox::sized(40, 10))
            .with(child(1), NodeBox::sized(60, 10));
        let mut grid = GridLayout::new(OWNER).with_size(1, 2).with_spacing(3, 0);
        place(&mut grid, 0, ChildPlacement::at(0, 0));
        place(&mut grid, 1, ChildPlacement::at(0, 1));

        let mut rec = RecordingReporter::new();
        grid.update_width(&metrics, &mut rec);
        // 6 + 40 + 3 + 60 + 4 + 2
        assert_eq!(rec.last_outer_width(OWNER), Some(115));
        let second = grid.slot_for(child(1)).map(|s| s.geometry().wrapper.x);
        assert_eq!(second, Some(49));
        let last_margin = grid.slot_for(child(1)).map(|s| s.geometry().margin_right);
        assert_eq!(last_margin, Some(4));
        let first_margin = grid.slot_for(child(0)).map(|s| s.geometry().margin_right);
        assert_eq!(first_margin, Some(0));
    }

    #[test]
    fn defined_width_expands_by_ratio() {
        let metrics = HeadlessMetrics::new()
            .with(OWNER, NodeBox::sized(210, 50))
            .with(child(0), NodeBox::sized(20, 10))
            .with(child(1), NodeBox::sized(20, 10));
        let mut grid = GridLayout::new(OWNER)
            .with_size(1, 2)
            .with_spacing(10, 0)
            .with_defined_size(true, false);
        place(&mut grid, 0, ChildPlacement::at(0, 0));
        place(&mut grid, 1, ChildPlacement::at(0, 1));
        grid.set_column_expand_ratios(&[250, 750]);

        let mut rec = RecordingReporter::new();
        grid.update_width(&metrics, &mut rec);
        // excess = 210 - 50 = 160 → 40 / 120
        assert_eq!(grid.column_widths(), &[60, 140]);
        assert_eq!(rec.last_outer_width(OWNER), None);
    }

    #[test]
    fn zero_ratios_fall_back_to_equal_split() {
        let metrics = HeadlessMetrics::new()
            .with(OWNER, NodeBox::sized(101, 50))
            .with(child(0), NodeBox::sized(10, 10))
            .with(child(1), NodeBox::sized(10, 10));
        let mut grid = GridLayout::new(OWNER)
            .with_size(1, 2)
            .with_defined_size(true, false);
        place(&mut grid, 0, ChildPlacement::at(0, 0));
        place(&mut grid, 1, ChildPlacement::at(0, 1));

        let mut rec = RecordingReporter::new();
        grid.update_width(&metrics, &mut rec);
        // excess 81 → 40 each, leftover pixel to index 0
        assert_eq!(grid.column_widths(), &[51, 50]);
    }

    #[test]
    fn leftover_pixels_start_at_first_index_even_when_hidden() {
        let metrics = HeadlessMetrics::new()
            .with(OWNER, NodeBox::sized(101, 50))
            .with(child(0), NodeBox::sized(10, 10))
            .with(child(1), NodeBox::sized(10, 10));
        let mut grid = GridLayout::new(OWNER)
            .with_size(1, 3)
            .with_defined_size(true, false)
            .hide_empty_rows_and_columns(true);
        place(&mut grid, 0, ChildPlacement::at(0, 1));
        place(&mut grid, 1, ChildPlacement::at(0, 2));

        let mut rec = RecordingReporter::new();
        grid.update_width(&metrics, &mut rec);
        assert!(grid.is_hidden(Axis::Horizontal, 0));
        // excess 81 → 40 to each visible column, leftover pixel to index 0
        assert_eq!(grid.column_widths(), &[1, 50, 50]);
    }

    #[test]
    fn hidden_column_is_skipped_in_positioning() {
        let metrics = HeadlessMetrics::new()
            .with(child(0), NodeBox::sized(10, 10))
            .with(child(1), NodeBox::sized(10, 10));
        let mut grid = GridLayout::new(OWNER)
            .with_size(1, 3)
            .with_spacing(5, 0)
            .hide_empty_rows_and_columns(true);
        place(&mut grid, 0, ChildPlacement::at(0, 0));
        place(&mut grid, 1, ChildPlacement::at(0, 2));

        let mut rec = RecordingReporter::new();
        grid.update_width(&metrics, &mut rec);
        assert!(grid.is_hidden(Axis::Horizontal, 1));
        let x = grid.slot_for(child(1)).map(|s| s.geometry().wrapper.x);
        assert_eq!(x, Some(15));
        assert_eq!(rec.last_outer_width(OWNER), Some(25));

        grid.set_hide_empty_rows_and_columns(false);
        grid.update_width(&metrics, &mut rec);
        let x = grid.slot_for(child(1)).map(|s| s.geometry().wrapper.x);
        assert_eq!(x, Some(20));
    }

    #[test]
    fn explicit_ratio_keeps_empty_column_visible() {
        let mut grid = GridLayout::new(OWNER)
            .with_size(1, 3)
            .hide_empty_rows_and_columns(true);
        place(&mut grid, 0, ChildPlacement::at(0, 0));
        grid.set_explicit_column_ratios([1]);
        assert!(!grid.is_hidden(Axis::Horizontal, 1));
        assert!(grid.is_hidden(Axis::Horizontal, 2));
    }

    #[test]
    fn relative_cells_do_not_contribute_minimums() {
        let metrics = HeadlessMetrics::new().with(child(0), NodeBox::sized(80, 10));
        let mut grid = GridLayout::new(OWNER).with_size(1, 1);
        let id = grid.create_cell(0, 0);
        grid.set_child(id, LayoutSlot::new(child(0)).relative_width(100.0));
        let mut rec = RecordingReporter::new();
        grid.update_width(&metrics, &mut rec);
        assert_eq!(grid.column_widths(), &[0]);
        assert_eq!(rec.last_relative_width(child(0)), Some(0));
    }

    #[test]
    fn set_size_drops_out_of_bounds_cells() {
        let mut grid = GridLayout::new(OWNER).with_size(2, 2);
        place(&mut grid, 0, ChildPlacement::at(0, 0).spanning(2, 2));
        place(&mut grid, 1, ChildPlacement::at(1, 1));
        assert!(grid.set_size(2, 2).is_empty());

        let dropped = grid.set_size(1, 1);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].child(), child(1));
        assert!(grid.slot_for(child(1)).is_none());
        let kept = grid
            .cell_at(0, 0)
            .and_then(|id| grid.cell(id))
            .map(|c| (c.rowspan(), c.colspan()));
        assert_eq!(kept, Some((1, 1)));
    }

    #[test]
    fn moving_a_cell_updates_the_matrix() {
        let mut grid = GridLayout::new(OWNER).with_size(3, 3);
        let id = place(&mut grid, 0, ChildPlacement::at(0, 0));
        grid.update_cell(id, ChildPlacement::at(2, 1));
        assert_eq!(grid.cell_at(0, 0), None);
        assert_eq!(grid.cell_at(2, 1), Some(id));
    }

    #[test]
    fn reassigning_a_child_clears_its_old_cell() {
        let mut grid = GridLayout::new(OWNER).with_size(1, 2);
        let first = place(&mut grid, 0, ChildPlacement::at(0, 0));
        let second = grid.create_cell(0, 1);
        grid.set_child(second, LayoutSlot::new(child(0)));
        assert!(grid.cell(first).and_then(Cell::slot).is_none());
        assert_eq!(grid.slot_for(child(0)).map(LayoutSlot::child), Some(child(0)));
    }

    #[test]
    fn remove_child_frees_cell() {
        let mut grid = GridLayout::new(OWNER).with_size(1, 1);
        place(&mut grid, 0, ChildPlacement::at(0, 0));
        let slot = grid.remove_child(child(0));
        assert_eq!(slot.map(|s| s.child()), Some(child(0)));
        assert_eq!(grid.cell_at(0, 0), None);
        assert!(grid.remove_child(child(0)).is_none());
        let reused = grid.create_cell(0, 0);
        assert_eq!(grid.cell_at(0, 0), Some(reused));
    }

    #[test]
    fn vertical_pass_is_independent() {
        let metrics = HeadlessMetrics::new()
            .with(OWNER, NodeBox::sized(100, 100))
            .with(child(0), NodeBox::sized(10, 30))
            .with(child(1), NodeBox::sized(10, 20));
        let mut grid = GridLayout::new(OWNER)
            .with_size(2, 1)
            .with_spacing(0, 4)
            .with_defined_size(false, true);
        place(&mut grid, 0, ChildPlacement::at(0, 0));
        place(&mut grid, 1, ChildPlacement::at(1, 0));
        grid.set_row_expand_ratios(&[0, 1000]);

        let mut rec = RecordingReporter::new();
        grid.update_height(&metrics, &mut rec);
        // used = 30 + 4 + 20 = 54, excess 46 all to row 1
        assert_eq!(grid.row_heights(), &[30, 66]);
        assert!(grid.column_widths().iter().all(|&w| w == 0));
        let y = grid.slot_for(child(1)).map(|s| s.geometry().wrapper.y);
        assert_eq!(y, Some(34));
    }

    #[test]
    fn placement_deserializes_from_json() {
        let placement: ChildPlacement =
            serde_json::from_str(r#"{"row1":0,"column1":1,"row2":2,"column2":1}"#)
                .expect("valid placement json");
        assert_eq!(placement, ChildPlacement::at(0, 1).spanning(3, 1));
    }
}
