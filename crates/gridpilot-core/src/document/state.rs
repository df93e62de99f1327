//! Workbook state: the grid plus the ambient selection and host objects.

use std::path::PathBuf;

use gridpilot_engine::sheet::{Cell, CellRef, ChartKind, Grid, RangeRef};

use crate::op::DocumentContext;

/// A chart recorded on the worksheet.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartObject {
    pub kind: ChartKind,
    pub source: RangeRef,
    pub title: String,
}

/// A named table over a rectangle of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct TableObject {
    pub name: String,
    pub range: RangeRef,
    pub has_headers: bool,
}

/// UI-agnostic single-worksheet document state.
///
/// The current selection is deliberately explicit state here rather than a
/// hidden global: operation handlers read it through the host interface, and
/// tests drive it directly.
pub struct Workbook {
    /// The spreadsheet grid (DashMap is internally Arc-based, clones are cheap).
    pub grid: Grid,
    /// Worksheet name reported in context snapshots.
    pub sheet_name: String,
    /// The ambient selection, if any.
    pub selection: Option<RangeRef>,
    /// The active cell; falls back to the origin.
    pub active_cell: CellRef,
    /// Charts created so far.
    pub charts: Vec<ChartObject>,
    /// Tables created so far.
    pub tables: Vec<TableObject>,
    /// The range an auto-filter is applied to, if any.
    pub auto_filter: Option<RangeRef>,
    /// Current file path, when loaded from or saved to disk.
    pub file_path: Option<PathBuf>,
    /// Whether the grid has been modified since load/save.
    pub modified: bool,
    /// Host readiness probe; a live host flips this once its runtime is up.
    pub ready: bool,
}

impl Workbook {
    /// Create a new empty workbook. Side-effect free: does not touch the
    /// filesystem.
    pub fn new() -> Self {
        let grid: Grid = std::sync::Arc::new(dashmap::DashMap::new());
        Workbook {
            grid,
            sheet_name: "Sheet1".to_string(),
            selection: None,
            active_cell: CellRef::new(0, 0),
            charts: Vec::new(),
            tables: Vec::new(),
            auto_filter: None,
            file_path: None,
            modified: false,
            ready: true,
        }
    }

    /// Select a range; the active cell moves to its top-left corner.
    pub fn select(&mut self, range: RangeRef) {
        self.active_cell = range.anchor();
        self.selection = Some(range);
    }

    /// Select a single cell.
    pub fn select_cell(&mut self, at: CellRef) {
        self.select(RangeRef::cell(at));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Snapshot the context for a classification request.
    ///
    /// Degrades gracefully: selection address, else the active cell for both
    /// fields, else the fixed origin cell.
    pub fn context_snapshot(&self) -> DocumentContext {
        let (selected_range, active_cell) = match &self.selection {
            Some(range) => (range.to_string(), range.anchor().to_string()),
            None => {
                let cell = self.active_cell.to_string();
                (cell.clone(), cell)
            }
        };
        DocumentContext {
            selected_range: Some(selected_range),
            worksheet_name: Some(self.sheet_name.clone()),
            active_cell: Some(active_cell),
        }
    }

    pub fn set_cell(&mut self, at: CellRef, cell: Cell) {
        if cell.is_empty() {
            self.grid.remove(&at);
        } else {
            self.grid.insert(at, cell);
        }
        self.modified = true;
    }

    /// Set cell contents from a raw input string ('=' prefix means formula).
    pub fn input_at(&mut self, at: CellRef, input: &str) {
        self.set_cell(at, Cell::from_input(input));
    }

    pub fn cell_at(&self, at: &CellRef) -> Option<Cell> {
        self.grid.get(at).map(|c| c.clone())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
