//! Cell data structures for the spreadsheet grid.
//!
//! - [`CellType`] - The content of a cell (empty, text, number, or formula)
//! - [`Cell`] - Content plus its display format
//! - [`Grid`] - Thread-safe sparse storage for cells (backed by `DashMap`)

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::cell_ref::CellRef;
use super::format::NumberFormat;

/// The content stored in a cell. Formulas are carried as text; evaluation
/// belongs to the document host, not to this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    Empty,
    Text(String),
    Number(f64),
    Formula(String),
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub contents: CellType,
    pub format: NumberFormat,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell {
            contents: CellType::Empty,
            format: NumberFormat::General,
        }
    }

    pub fn new_text(text: &str) -> Cell {
        Cell {
            contents: CellType::Text(text.to_string()),
            format: NumberFormat::General,
        }
    }

    pub fn new_number(n: f64) -> Cell {
        Cell {
            contents: CellType::Number(n),
            format: NumberFormat::General,
        }
    }

    /// Create a cell containing a formula (stored without the leading '=').
    pub fn new_formula(formula: &str) -> Cell {
        Cell {
            contents: CellType::Formula(formula.to_string()),
            format: NumberFormat::General,
        }
    }

    /// Parse a raw value the way cell modification does: numeric parse first,
    /// falling back to text. Blank input yields an empty cell.
    pub fn from_value(value: &str) -> Cell {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Cell::new_empty();
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            return Cell::new_number(n);
        }
        Cell::new_text(trimmed)
    }

    /// Parse user input and create the appropriate cell type.
    /// - Empty string or whitespace -> Empty
    /// - Starts with '=' -> Formula (without the '=')
    /// - Valid number -> Number
    /// - Otherwise -> Text
    pub fn from_input(input: &str) -> Cell {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Cell::new_empty();
        }
        if let Some(formula) = trimmed.strip_prefix('=') {
            return Cell::new_formula(formula);
        }
        Cell::from_value(trimmed)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.contents, CellType::Empty)
    }

    /// Get the editable representation of the cell content.
    pub fn to_input_string(&self) -> String {
        match &self.contents {
            CellType::Empty => String::new(),
            CellType::Text(s) => s.clone(),
            CellType::Number(n) => n.to_string(),
            CellType::Formula(s) => format!("={}", s),
        }
    }

    /// Get the display string for the cell, honoring its number format.
    pub fn display_value(&self) -> String {
        match &self.contents {
            CellType::Empty => String::new(),
            CellType::Text(s) => s.clone(),
            CellType::Number(n) => self.format.render(*n),
            CellType::Formula(s) => format!("={}", s),
        }
    }

    pub fn with_format(mut self, format: NumberFormat) -> Cell {
        self.format = format;
        self
    }
}

/// Thread-safe sparse grid storage (DashMap is internally Arc-based, clones
/// are cheap).
pub type Grid = Arc<DashMap<CellRef, Cell>>;

#[cfg(test)]
mod tests {
    use super::{Cell, CellType, NumberFormat};

    #[test]
    fn test_from_input_variants() {
        assert!(Cell::from_input("   ").is_empty());
        assert_eq!(
            Cell::from_input("=SUM(A1:A3)").contents,
            CellType::Formula("SUM(A1:A3)".to_string())
        );
        assert_eq!(Cell::from_input("42.5").contents, CellType::Number(42.5));
        assert_eq!(
            Cell::from_input("hello").contents,
            CellType::Text("hello".to_string())
        );
    }

    #[test]
    fn test_from_value_never_parses_formulas() {
        assert_eq!(
            Cell::from_value("=SUM(A1:A3)").contents,
            CellType::Text("=SUM(A1:A3)".to_string())
        );
        assert_eq!(Cell::from_value("32").contents, CellType::Number(32.0));
    }

    #[test]
    fn test_display_honors_format() {
        let cell = Cell::new_number(1234.5).with_format(NumberFormat::Currency);
        assert_eq!(cell.display_value(), "$1,234.50");
    }

    #[test]
    fn test_input_round_trip() {
        for input in ["=A1+B1", "3.25", "plain text"] {
            assert_eq!(Cell::from_input(input).to_input_string(), input);
        }
    }
}
