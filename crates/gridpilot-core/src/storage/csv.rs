//! CSV import/export functionality

use std::io::Write;
use std::path::Path;

use gridpilot_engine::sheet::{Cell, CellRef};

use crate::document::Workbook;
use crate::error::Result;

/// Parse a CSV file into cells, starting at the given offset
pub fn parse_csv(path: &Path, start_col: usize, start_row: usize) -> Result<Vec<(CellRef, Cell)>> {
    let content = std::fs::read_to_string(path)?;
    let mut cells = Vec::new();

    for (row_idx, line) in content.lines().enumerate() {
        for (col_idx, field) in parse_csv_line(line).into_iter().enumerate() {
            if field.is_empty() {
                continue;
            }
            let cell_ref = CellRef::new(start_col + col_idx, start_row + row_idx);
            cells.push((cell_ref, Cell::from_input(&field)));
        }
    }

    Ok(cells)
}

/// Parse a single CSV line, handling quoted fields
pub(crate) fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => {
                    in_quotes = true;
                    field_was_quoted = true;
                }
                ',' => {
                    if field_was_quoted {
                        fields.push(current.clone());
                    } else {
                        fields.push(current.trim().to_string());
                    }
                    current.clear();
                    field_was_quoted = false;
                }
                _ => current.push(c),
            }
        }
    }

    if field_was_quoted {
        fields.push(current);
    } else {
        fields.push(current.trim().to_string());
    }

    fields
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write the workbook's used range as CSV.
pub fn write_csv(book: &Workbook, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;

    let Some(range) = book.used_range() else {
        return Ok(());
    };
    for row in range.start.row..=range.end.row {
        let fields: Vec<String> = (range.start.col..=range.end.col)
            .map(|col| {
                book.cell_at(&CellRef::new(col, row))
                    .map(|cell| escape_csv_field(&cell.to_input_string()))
                    .unwrap_or_default()
            })
            .collect();
        writeln!(file, "{}", fields.join(","))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_csv, parse_csv_line, write_csv};
    use crate::document::Workbook;
    use gridpilot_engine::sheet::{CellRef, CellType};

    #[test]
    fn test_csv_round_trip() {
        let mut book = Workbook::new();
        book.input_at(CellRef::new(0, 0), "name, with comma");
        book.input_at(CellRef::new(1, 0), "42");
        book.input_at(CellRef::new(1, 1), "=SUM(B1:B1)");

        let path = std::env::temp_dir().join(format!(
            "gridpilot_csv_round_trip_{}_{:?}.csv",
            std::process::id(),
            std::thread::current().id(),
        ));
        struct Cleanup(std::path::PathBuf);
        impl Drop for Cleanup {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }
        let _cleanup = Cleanup(path.clone());

        write_csv(&book, &path).unwrap();
        let cells = parse_csv(&path, 0, 0).unwrap();
        let mut reloaded = Workbook::new();
        for (at, cell) in cells {
            reloaded.set_cell(at, cell);
        }

        assert_eq!(
            reloaded.cell_at(&CellRef::new(0, 0)).unwrap().contents,
            CellType::Text("name, with comma".to_string())
        );
        assert_eq!(
            reloaded.cell_at(&CellRef::new(1, 0)).unwrap().contents,
            CellType::Number(42.0)
        );
        assert_eq!(
            reloaded.cell_at(&CellRef::new(1, 1)).unwrap().contents,
            CellType::Formula("SUM(B1:B1)".to_string())
        );
    }

    #[test]
    fn test_parse_csv_line_simple() {
        assert_eq!(parse_csv_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_csv_line_quoted_fields() {
        assert_eq!(
            parse_csv_line(r#""hello, world",2"#),
            vec!["hello, world", "2"]
        );
        assert_eq!(parse_csv_line(r#""say ""hi""""#), vec![r#"say "hi""#]);
    }

    #[test]
    fn test_parse_csv_line_trims_unquoted() {
        assert_eq!(parse_csv_line(" a , b "), vec!["a", "b"]);
        assert_eq!(parse_csv_line(r#"" padded ""#), vec![" padded "]);
    }
}
