//! Storage backends for workbook data.

mod csv;

pub use csv::{parse_csv, write_csv};
