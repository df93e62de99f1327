//! Workbook mutation operations.

use std::cmp::Ordering;

use gridpilot_engine::sheet::{Cell, CellRef, CellType, ChartKind, NumberFormat, RangeRef};

use super::state::{ChartObject, TableObject, Workbook};

/// Dimension for row/column operations
#[derive(Copy, Clone)]
enum Dimension {
    Row,
    Column,
}

impl Dimension {
    /// Get the coordinate value from a CellRef for this dimension
    fn get_coord(&self, cell_ref: &CellRef) -> usize {
        match self {
            Dimension::Row => cell_ref.row,
            Dimension::Column => cell_ref.col,
        }
    }

    /// Create a new CellRef with modified coordinate in this dimension
    fn new_cell_ref(&self, cell_ref: &CellRef, new_coord: usize) -> CellRef {
        match self {
            Dimension::Row => CellRef::new(cell_ref.col, new_coord),
            Dimension::Column => CellRef::new(new_coord, cell_ref.row),
        }
    }
}

impl Workbook {
    /// Read a rectangle of cells, row-major. Unset positions read as empty.
    pub fn read_range(&self, range: &RangeRef) -> Vec<Vec<Cell>> {
        (range.start.row..=range.end.row)
            .map(|row| {
                (range.start.col..=range.end.col)
                    .map(|col| {
                        self.cell_at(&CellRef::new(col, row))
                            .unwrap_or_else(Cell::new_empty)
                    })
                    .collect()
            })
            .collect()
    }

    /// Write a rectangle of cells anchored at the range's top-left corner.
    /// Rows or cells beyond the provided data are left untouched.
    pub fn write_range(&mut self, range: &RangeRef, cells: &[Vec<Cell>]) {
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let at = CellRef::new(range.start.col + c, range.start.row + r);
                if !range.contains(&at) {
                    continue;
                }
                self.set_cell(at, cell.clone());
            }
        }
    }

    /// Fill every cell of a range with a copy of the given cell.
    pub fn fill_range(&mut self, range: &RangeRef, cell: &Cell) {
        for at in range.cells() {
            self.set_cell(at, cell.clone());
        }
    }

    /// Clear a rectangle of cells.
    pub fn clear_range(&mut self, range: &RangeRef) {
        for at in range.cells() {
            self.grid.remove(&at);
        }
        self.modified = true;
    }

    /// Write a formula into a single cell (stored without the leading '=').
    pub fn set_formula(&mut self, at: CellRef, formula: &str) {
        let text = formula.strip_prefix('=').unwrap_or(formula);
        self.set_cell(at, Cell::new_formula(text));
    }

    /// Apply a number format to every cell in a range, creating number cells
    /// lazily so formats survive on otherwise-empty positions.
    pub fn set_number_format(&mut self, range: &RangeRef, format: NumberFormat) {
        for at in range.cells() {
            let mut cell = self.cell_at(&at).unwrap_or_else(Cell::new_empty);
            cell.format = format;
            // Bypass set_cell: an empty cell with a non-default format must
            // still be stored.
            self.grid.insert(at, cell);
        }
        self.modified = true;
    }

    /// Generic insert operation for row or column
    fn insert_dimension(&mut self, dim: Dimension, at: usize) {
        // Collect all cells at coord >= at
        let cells_to_move: Vec<(CellRef, Cell)> = self
            .grid
            .iter()
            .filter(|entry| dim.get_coord(entry.key()) >= at)
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        // Remove them from grid
        for (cell_ref, _) in &cells_to_move {
            self.grid.remove(cell_ref);
        }

        // Reinsert moved cells with coord + 1
        for (cell_ref, cell) in cells_to_move {
            let coord = dim.get_coord(&cell_ref);
            let new_ref = dim.new_cell_ref(&cell_ref, coord + 1);
            self.grid.insert(new_ref, cell);
        }

        self.modified = true;
    }

    /// Insert a full-height column at the given column index, shifting
    /// existing cells right.
    pub fn insert_column_at(&mut self, at_col: usize) {
        self.insert_dimension(Dimension::Column, at_col);
    }

    /// Insert a full-width row at the given row index, shifting existing
    /// cells down.
    pub fn insert_row_at(&mut self, at_row: usize) {
        self.insert_dimension(Dimension::Row, at_row);
    }

    /// Sort the rows of a range by one of its columns, ascending.
    /// `key_col` is 0-based relative to the range. Numbers order before
    /// text; rows with an empty key cell sink to the bottom.
    pub fn sort_range(&mut self, range: &RangeRef, key_col: usize) {
        let mut rows = self.read_range(range);
        let empty = Cell::new_empty();
        rows.sort_by(|a, b| {
            let ka = sort_rank(a.get(key_col).unwrap_or(&empty));
            let kb = sort_rank(b.get(key_col).unwrap_or(&empty));
            ka.0.cmp(&kb.0)
                .then_with(|| ka.1.partial_cmp(&kb.1).unwrap_or(Ordering::Equal))
                .then_with(|| ka.2.cmp(&kb.2))
        });
        self.write_range(range, &rows);
    }

    /// Apply (or move) the worksheet auto-filter to a range.
    pub fn apply_auto_filter(&mut self, range: RangeRef) {
        self.auto_filter = Some(range);
        self.modified = true;
    }

    /// Record a chart over a source range.
    pub fn add_chart(&mut self, kind: ChartKind, source: RangeRef, title: &str) {
        self.charts.push(ChartObject {
            kind,
            source,
            title: title.to_string(),
        });
        self.modified = true;
    }

    /// Convert a range into a named table object.
    pub fn add_table(&mut self, range: RangeRef, has_headers: bool) -> &TableObject {
        let name = format!("GeneratedTable{}", self.tables.len() + 1);
        self.tables.push(TableObject {
            name,
            range,
            has_headers,
        });
        self.modified = true;
        self.tables.last().expect("just pushed")
    }

    /// The smallest rectangle covering all populated cells.
    pub fn used_range(&self) -> Option<RangeRef> {
        let mut bounds: Option<(CellRef, CellRef)> = None;
        for entry in self.grid.iter() {
            let at = *entry.key();
            bounds = Some(match bounds {
                None => (at, at),
                Some((min, max)) => (
                    CellRef::new(min.col.min(at.col), min.row.min(at.row)),
                    CellRef::new(max.col.max(at.col), max.row.max(at.row)),
                ),
            });
        }
        bounds.map(|(min, max)| RangeRef::new(min, max))
    }
}

fn sort_rank(cell: &Cell) -> (u8, f64, &str) {
    match &cell.contents {
        CellType::Number(n) => (0, *n, ""),
        CellType::Text(s) => (1, 0.0, s.as_str()),
        CellType::Formula(s) => (1, 0.0, s.as_str()),
        CellType::Empty => (2, 0.0, ""),
    }
}
