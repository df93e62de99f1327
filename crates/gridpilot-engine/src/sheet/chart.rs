//! Chart type names understood by the document host.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    #[default]
    ColumnClustered,
    BarClustered,
    Line,
    Pie,
    XYScatter,
}

impl ChartKind {
    /// Resolve a wire name case-insensitively ("line" -> Line).
    /// Returns None for names the host does not know.
    pub fn from_name(name: &str) -> Option<ChartKind> {
        match name.to_ascii_lowercase().as_str() {
            "columnclustered" => Some(ChartKind::ColumnClustered),
            "barclustered" => Some(ChartKind::BarClustered),
            "line" => Some(ChartKind::Line),
            "pie" => Some(ChartKind::Pie),
            "xyscatter" => Some(ChartKind::XYScatter),
            _ => None,
        }
    }

    /// The canonical wire name.
    pub fn as_name(&self) -> &'static str {
        match self {
            ChartKind::ColumnClustered => "ColumnClustered",
            ChartKind::BarClustered => "BarClustered",
            ChartKind::Line => "Line",
            ChartKind::Pie => "Pie",
            ChartKind::XYScatter => "XYScatter",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_name())
    }
}
