//! The document-host boundary.
//!
//! Every call is one document round-trip: reads load values out of the host,
//! writes flush mutations back in. The trait keeps the execution engine
//! testable without a live host — the in-memory [`Workbook`] is the stock
//! implementation, and tests substitute failure-injecting doubles.

use async_trait::async_trait;
use thiserror::Error;

use gridpilot_engine::sheet::{Cell, CellRef, ChartKind, NumberFormat, RangeRef};

use crate::document::Workbook;
use crate::op::DocumentContext;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("document host is not ready")]
    NotReady,

    #[error("no range is selected")]
    NoSelection,

    #[error("invalid cell or range reference: {0}")]
    InvalidReference(String),

    #[error("{0}")]
    InsufficientData(String),

    #[error("unknown chart type: {0}")]
    UnknownChartKind(String),

    #[error("{0}")]
    Other(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// The outbound interface to the spreadsheet host.
///
/// The host is a single shared mutable resource; callers hold it exclusively
/// for the duration of a batch, so no method needs internal locking.
#[async_trait]
pub trait SheetHost: Send {
    /// Whether the host runtime is up. Checked once before any batch.
    fn is_ready(&self) -> bool;

    /// Snapshot the document context. Must degrade gracefully: selection
    /// address, else active cell, else a fixed origin cell.
    async fn context(&mut self) -> HostResult<DocumentContext>;

    /// The current selection; `NoSelection` when nothing is selected.
    async fn selection(&mut self) -> HostResult<RangeRef>;

    async fn active_cell(&mut self) -> HostResult<CellRef>;

    async fn read_range(&mut self, range: &RangeRef) -> HostResult<Vec<Vec<Cell>>>;

    async fn write_range(&mut self, range: &RangeRef, cells: &[Vec<Cell>]) -> HostResult<()>;

    async fn fill_range(&mut self, range: &RangeRef, cell: &Cell) -> HostResult<()>;

    async fn clear_range(&mut self, range: &RangeRef) -> HostResult<()>;

    async fn set_formula(&mut self, at: CellRef, formula: &str) -> HostResult<()>;

    async fn set_number_format(&mut self, range: &RangeRef, format: NumberFormat)
        -> HostResult<()>;

    async fn insert_column_at(&mut self, at_col: usize) -> HostResult<()>;

    async fn insert_row_at(&mut self, at_row: usize) -> HostResult<()>;

    /// Sort a range by a 0-based column index relative to the range.
    async fn sort_range(&mut self, range: &RangeRef, key_col: usize) -> HostResult<()>;

    async fn apply_auto_filter(&mut self, range: &RangeRef) -> HostResult<()>;

    async fn add_chart(
        &mut self,
        kind: ChartKind,
        source: &RangeRef,
        title: &str,
    ) -> HostResult<()>;

    async fn add_table(&mut self, range: &RangeRef, has_headers: bool) -> HostResult<()>;
}

#[async_trait]
impl SheetHost for Workbook {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn context(&mut self) -> HostResult<DocumentContext> {
        Ok(self.context_snapshot())
    }

    async fn selection(&mut self) -> HostResult<RangeRef> {
        self.selection.ok_or(HostError::NoSelection)
    }

    async fn active_cell(&mut self) -> HostResult<CellRef> {
        Ok(self.active_cell)
    }

    async fn read_range(&mut self, range: &RangeRef) -> HostResult<Vec<Vec<Cell>>> {
        Ok(Workbook::read_range(self, range))
    }

    async fn write_range(&mut self, range: &RangeRef, cells: &[Vec<Cell>]) -> HostResult<()> {
        Workbook::write_range(self, range, cells);
        Ok(())
    }

    async fn fill_range(&mut self, range: &RangeRef, cell: &Cell) -> HostResult<()> {
        Workbook::fill_range(self, range, cell);
        Ok(())
    }

    async fn clear_range(&mut self, range: &RangeRef) -> HostResult<()> {
        Workbook::clear_range(self, range);
        Ok(())
    }

    async fn set_formula(&mut self, at: CellRef, formula: &str) -> HostResult<()> {
        Workbook::set_formula(self, at, formula);
        Ok(())
    }

    async fn set_number_format(
        &mut self,
        range: &RangeRef,
        format: NumberFormat,
    ) -> HostResult<()> {
        Workbook::set_number_format(self, range, format);
        Ok(())
    }

    async fn insert_column_at(&mut self, at_col: usize) -> HostResult<()> {
        Workbook::insert_column_at(self, at_col);
        Ok(())
    }

    async fn insert_row_at(&mut self, at_row: usize) -> HostResult<()> {
        Workbook::insert_row_at(self, at_row);
        Ok(())
    }

    async fn sort_range(&mut self, range: &RangeRef, key_col: usize) -> HostResult<()> {
        if key_col >= range.cols() {
            return Err(HostError::InvalidReference(format!(
                "sort column index {} is outside {}",
                key_col, range
            )));
        }
        Workbook::sort_range(self, range, key_col);
        Ok(())
    }

    async fn apply_auto_filter(&mut self, range: &RangeRef) -> HostResult<()> {
        Workbook::apply_auto_filter(self, *range);
        Ok(())
    }

    async fn add_chart(
        &mut self,
        kind: ChartKind,
        source: &RangeRef,
        title: &str,
    ) -> HostResult<()> {
        Workbook::add_chart(self, kind, *source, title);
        Ok(())
    }

    async fn add_table(&mut self, range: &RangeRef, has_headers: bool) -> HostResult<()> {
        Workbook::add_table(self, *range, has_headers);
        Ok(())
    }
}
