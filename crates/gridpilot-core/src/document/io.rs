//! Workbook file loading and saving.

use std::path::Path;

use crate::error::Result;
use crate::storage::{parse_csv, write_csv};

use super::state::Workbook;

impl Workbook {
    /// Load a CSV file into the workbook at the origin, replacing nothing
    /// that is outside the file's footprint. Selects the loaded area.
    pub fn load_csv(&mut self, path: &Path) -> Result<()> {
        let cells = parse_csv(path, 0, 0)?;
        for (cell_ref, cell) in cells {
            self.grid.insert(cell_ref, cell);
        }
        if let Some(range) = self.used_range() {
            self.select(range);
        }
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// Export the used range as CSV.
    pub fn save_csv(&mut self, path: &Path) -> Result<()> {
        write_csv(self, path)?;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }
}
