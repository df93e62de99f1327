//! The operation execution engine.
//!
//! Applies a classified operation list against a [`SheetHost`], one result
//! per operation in input order. Failures are isolated per operation: a
//! handler error is captured in its own result and never aborts the batch.

use gridpilot_engine::sheet::{Cell, CellRef, ChartKind, NumberFormat, RangeRef};

use crate::host::{HostError, HostResult, SheetHost};
use crate::op::{ChartOptions, Operation, OperationResult, SortOptions};

/// Execute a batch of operations.
///
/// Host readiness is checked once up front; an unavailable host yields a
/// single synthetic failed result instead of per-operation results.
pub async fn execute_operations<H: SheetHost>(
    host: &mut H,
    operations: &[Operation],
) -> Vec<OperationResult> {
    if !host.is_ready() {
        tracing::error!("document host is not ready");
        return vec![OperationResult::failed(
            "Document host is not ready",
            HostError::NotReady.to_string(),
        )];
    }

    let mut results = Vec::with_capacity(operations.len());
    for operation in operations {
        let result = match apply_operation(host, operation).await {
            Ok(message) => OperationResult::ok(message),
            Err(err) => {
                tracing::error!(
                    operation = operation.kind(),
                    target = operation.target(),
                    error = %err,
                    "operation failed"
                );
                OperationResult::failed(
                    format!("Failed to execute {}", operation.description()),
                    err.to_string(),
                )
            }
        };
        results.push(result);
    }
    results
}

async fn apply_operation<H: SheetHost>(host: &mut H, operation: &Operation) -> HostResult<String> {
    match operation {
        Operation::Formula { value, .. } => insert_formula(host, value).await,
        Operation::Format { value, .. } => apply_formatting(host, value).await,
        Operation::Insert { target, .. } => insert_element(host, target).await,
        Operation::Delete { description, .. } => Ok(delete_element(description)),
        Operation::Modify { target, value, .. } => modify_element(host, target, value).await,
        Operation::Copy { target, range, .. } => {
            transfer(host, target, range.as_deref(), false).await
        }
        Operation::Move { target, range, .. } => {
            transfer(host, target, range.as_deref(), true).await
        }
        Operation::Sort { options, .. } => sort_data(host, options).await,
        Operation::Filter { .. } => filter_data(host).await,
        Operation::Chart { options, .. } => create_chart(host, options).await,
        Operation::Table { .. } => create_table(host).await,
        Operation::Clean { .. } => Err(HostError::Other(
            "clean operations are not executable".to_string(),
        )),
    }
}

/// The selection, falling back to a 1x1 range at the active cell.
async fn selection_or_active<H: SheetHost>(host: &mut H) -> HostResult<RangeRef> {
    match host.selection().await {
        Ok(range) => Ok(range),
        Err(HostError::NoSelection) => Ok(RangeRef::cell(host.active_cell().await?)),
        Err(err) => Err(err),
    }
}

/// Write a formula into the anchor of the current selection.
async fn insert_formula<H: SheetHost>(host: &mut H, value: &str) -> HostResult<String> {
    let range = selection_or_active(host).await?;
    host.set_formula(range.anchor(), value).await?;
    Ok(format!("Formula inserted: {}", value))
}

/// Apply a number format chosen by substring match on the human label.
/// Requires a current selection.
async fn apply_formatting<H: SheetHost>(host: &mut H, value: &str) -> HostResult<String> {
    let range = host.selection().await?;
    let format = NumberFormat::from_label(value);
    host.set_number_format(&range, format).await?;
    Ok(format!("Applied {} formatting", value))
}

async fn insert_element<H: SheetHost>(host: &mut H, target: &str) -> HostResult<String> {
    let target_lower = target.to_lowercase();
    if target_lower.contains("column") {
        let range = selection_or_active(host).await?;
        // The new column lands just right of the selection.
        host.insert_column_at(range.anchor().col + 1).await?;
        Ok("New column inserted".to_string())
    } else if target_lower.contains("row") {
        let range = selection_or_active(host).await?;
        host.insert_row_at(range.anchor().row + 1).await?;
        Ok("New row inserted".to_string())
    } else if target_lower.contains("chart") {
        let range = selection_or_active(host).await?;
        require_dims(&range, 2, 2)?;
        host.add_chart(ChartKind::ColumnClustered, &range, "Generated Chart")
            .await?;
        Ok("Chart created successfully".to_string())
    } else {
        Err(HostError::Other(format!(
            "Unknown insert operation: {}",
            target
        )))
    }
}

/// Deletion is recorded but not applied yet; the host-side contract for
/// shifting surrounding data is still unsettled.
fn delete_element(description: &str) -> String {
    format!("Delete operation: {}", description)
}

async fn modify_element<H: SheetHost>(
    host: &mut H,
    target: &str,
    value: &str,
) -> HostResult<String> {
    // An explicit cell address wins over the ambient selection.
    let range = match CellRef::from_str(target) {
        Some(at) if crate::validate::valid_cell_ref(target) => RangeRef::cell(at),
        _ => selection_or_active(host).await?,
    };
    host.fill_range(&range, &Cell::from_value(value)).await?;
    Ok(format!("Modified {} with value: {}", target, value))
}

/// Shared body of copy and move: resolve source and destination, transfer
/// values, formulas, and number formats; move additionally clears the source.
async fn transfer<H: SheetHost>(
    host: &mut H,
    target: &str,
    source: Option<&str>,
    clear_source: bool,
) -> HostResult<String> {
    let source_range = match source {
        Some(text) => RangeRef::parse(text)
            .ok_or_else(|| HostError::InvalidReference(text.to_string()))?,
        None => selection_or_active(host).await?,
    };
    // Symbolic targets ("Next available cell") fail parsing and resolve to
    // the cell after the active one.
    let dest_anchor = match RangeRef::parse(target) {
        Some(range) => range.anchor(),
        None => {
            let active = host.active_cell().await?;
            CellRef::new(active.col + 1, active.row)
        }
    };
    let dest = RangeRef::with_dims(dest_anchor, source_range.rows(), source_range.cols());

    let cells = host.read_range(&source_range).await?;
    host.write_range(&dest, &cells).await?;
    if clear_source {
        host.clear_range(&source_range).await?;
        Ok(format!("Moved data to {}", target))
    } else {
        Ok(format!("Copied data to {}", target))
    }
}

async fn sort_data<H: SheetHost>(host: &mut H, options: &SortOptions) -> HostResult<String> {
    let range = selection_or_active(host).await?;
    require_rows(&range, 2, "sorting")?;
    let key_col = CellRef::letters_to_col(&options.sort_by)
        .ok_or_else(|| HostError::InvalidReference(options.sort_by.clone()))?;
    host.sort_range(&range, key_col).await?;
    Ok(format!("Sorted data by column {}", options.sort_by))
}

/// The captured criteria ride along in the description only; the host call
/// enables a plain auto-filter on the selection.
async fn filter_data<H: SheetHost>(host: &mut H) -> HostResult<String> {
    let range = selection_or_active(host).await?;
    require_rows(&range, 2, "filtering")?;
    host.apply_auto_filter(&range).await?;
    Ok("Applied filter to data".to_string())
}

async fn create_chart<H: SheetHost>(host: &mut H, options: &ChartOptions) -> HostResult<String> {
    let range = selection_or_active(host).await?;
    require_dims(&range, 2, 2)?;
    let kind = ChartKind::from_name(&options.chart_type)
        .ok_or_else(|| HostError::UnknownChartKind(options.chart_type.clone()))?;
    host.add_chart(kind, &range, "Generated Chart").await?;
    Ok(format!("Created {} chart", kind))
}

async fn create_table<H: SheetHost>(host: &mut H) -> HostResult<String> {
    let range = selection_or_active(host).await?;
    require_rows(&range, 2, "table creation")?;
    host.add_table(&range, true).await?;
    Ok("Created formatted table".to_string())
}

fn require_rows(range: &RangeRef, min: usize, what: &str) -> HostResult<()> {
    if range.rows() < min {
        return Err(HostError::InsufficientData(format!(
            "Need at least {} rows for {}",
            min, what
        )));
    }
    Ok(())
}

fn require_dims(range: &RangeRef, min_rows: usize, min_cols: usize) -> HostResult<()> {
    if range.rows() < min_rows || range.cols() < min_cols {
        return Err(HostError::InsufficientData(format!(
            "Insufficient data for chart creation. Select at least {}x{} range.",
            min_rows, min_cols
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::execute_operations;
    use crate::document::Workbook;
    use crate::op::{ChartOptions, FilterOptions, Operation, SortOptions};
    use gridpilot_engine::sheet::{CellRef, CellType, ChartKind, NumberFormat, RangeRef};
    use serde_json::json;

    fn seeded_book() -> Workbook {
        let mut book = Workbook::new();
        for (at, input) in [
            ("A1", "banana"),
            ("B1", "3"),
            ("A2", "apple"),
            ("B2", "1"),
            ("A3", "cherry"),
            ("B3", "2"),
        ] {
            book.input_at(CellRef::from_str(at).unwrap(), input);
        }
        book
    }

    fn modify(target: &str, value: &str) -> Operation {
        Operation::Modify {
            target: target.to_string(),
            value: value.to_string(),
            description: format!("Set {} to {}", target, value),
        }
    }

    #[tokio::test]
    async fn test_batch_isolation_middle_failure() {
        let mut book = seeded_book();
        // 1x1 selection: the chart operation in the middle must fail while
        // its neighbors succeed.
        book.select_cell(CellRef::new(0, 4));
        let ops = vec![
            modify("D1", "10"),
            Operation::Chart {
                target: "Chart object".to_string(),
                description: "Create a chart".to_string(),
                options: ChartOptions {
                    chart_type: "Line".to_string(),
                },
            },
            modify("D2", "20"),
        ];

        let results = execute_operations(&mut book, &ops).await;
        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[1].error.as_deref().unwrap().contains("2x2"));
        assert!(results[2].success);

        // Both modifications actually landed.
        assert_eq!(
            book.cell_at(&CellRef::from_str("D1").unwrap()).unwrap().contents,
            CellType::Number(10.0)
        );
        assert_eq!(
            book.cell_at(&CellRef::from_str("D2").unwrap()).unwrap().contents,
            CellType::Number(20.0)
        );
    }

    #[tokio::test]
    async fn test_not_ready_host_yields_single_synthetic_result() {
        let mut book = seeded_book();
        book.ready = false;
        let ops = vec![modify("A1", "1"), modify("A2", "2")];
        let results = execute_operations(&mut book, &ops).await;
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert!(results[0].message.contains("not ready"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty_results() {
        let mut book = Workbook::new();
        assert!(execute_operations(&mut book, &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_formula_written_to_selection_anchor() {
        let mut book = seeded_book();
        book.select(RangeRef::parse("C5:C7").unwrap());
        let ops = vec![Operation::Formula {
            target: "Next available cell".to_string(),
            value: "=SUM(selected_range)".to_string(),
            description: "Calculate sum of selected range".to_string(),
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success);
        assert_eq!(
            book.cell_at(&CellRef::from_str("C5").unwrap()).unwrap().contents,
            CellType::Formula("SUM(selected_range)".to_string())
        );
    }

    #[tokio::test]
    async fn test_format_requires_selection() {
        let mut book = seeded_book();
        book.clear_selection();
        let ops = vec![Operation::Format {
            target: "Selected range".to_string(),
            value: "Currency format".to_string(),
            description: "Apply currency formatting to selected cells".to_string(),
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(!results[0].success);

        book.select(RangeRef::parse("B1:B3").unwrap());
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success);
        assert_eq!(
            book.cell_at(&CellRef::from_str("B2").unwrap()).unwrap().format,
            NumberFormat::Currency
        );
    }

    #[tokio::test]
    async fn test_modify_resolves_explicit_cell_over_selection() {
        let mut book = seeded_book();
        book.select(RangeRef::parse("A1:B3").unwrap());
        let results = execute_operations(&mut book, &[modify("E7", "hello")]).await;
        assert!(results[0].success);
        assert_eq!(
            book.cell_at(&CellRef::from_str("E7").unwrap()).unwrap().contents,
            CellType::Text("hello".to_string())
        );
        // Selection untouched.
        assert_eq!(
            book.cell_at(&CellRef::from_str("A1").unwrap()).unwrap().contents,
            CellType::Text("banana".to_string())
        );
    }

    #[tokio::test]
    async fn test_modify_parses_numbers_first() {
        let mut book = seeded_book();
        let results = execute_operations(&mut book, &[modify("F1", "42")]).await;
        assert!(results[0].success);
        assert_eq!(
            book.cell_at(&CellRef::from_str("F1").unwrap()).unwrap().contents,
            CellType::Number(42.0)
        );
    }

    #[tokio::test]
    async fn test_copy_transfers_values_formulas_and_formats() {
        let mut book = seeded_book();
        book.set_formula(CellRef::from_str("A4").unwrap(), "SUM(B1:B3)");
        book.set_number_format(&RangeRef::parse("B1:B3").unwrap(), NumberFormat::Currency);

        let ops = vec![Operation::Copy {
            target: "D1".to_string(),
            range: Some("A1:B4".to_string()),
            description: "Copy A1:B4 to D1".to_string(),
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success);

        assert_eq!(
            book.cell_at(&CellRef::from_str("D1").unwrap()).unwrap().contents,
            CellType::Text("banana".to_string())
        );
        assert_eq!(
            book.cell_at(&CellRef::from_str("D4").unwrap()).unwrap().contents,
            CellType::Formula("SUM(B1:B3)".to_string())
        );
        assert_eq!(
            book.cell_at(&CellRef::from_str("E2").unwrap()).unwrap().format,
            NumberFormat::Currency
        );
        // Source kept.
        assert!(book.cell_at(&CellRef::from_str("A1").unwrap()).is_some());
    }

    #[tokio::test]
    async fn test_move_clears_source() {
        let mut book = seeded_book();
        let ops = vec![Operation::Move {
            target: "D1".to_string(),
            range: Some("A1:B3".to_string()),
            description: "Move A1:B3 to D1".to_string(),
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success);
        assert!(book.cell_at(&CellRef::from_str("A1").unwrap()).is_none());
        assert_eq!(
            book.cell_at(&CellRef::from_str("D1").unwrap()).unwrap().contents,
            CellType::Text("banana".to_string())
        );
    }

    #[tokio::test]
    async fn test_copy_symbolic_target_lands_after_active_cell() {
        let mut book = seeded_book();
        book.select_cell(CellRef::from_str("B1").unwrap());
        let ops = vec![Operation::Copy {
            target: "Next available cell".to_string(),
            range: Some("A1:A3".to_string()),
            description: "Copy selected data to next available cell".to_string(),
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success);
        assert_eq!(
            book.cell_at(&CellRef::from_str("C1").unwrap()).unwrap().contents,
            CellType::Text("banana".to_string())
        );
    }

    #[tokio::test]
    async fn test_sort_by_column_letter() {
        let mut book = seeded_book();
        book.select(RangeRef::parse("A1:B3").unwrap());
        let ops = vec![Operation::Sort {
            target: "Selected range".to_string(),
            description: "Sort data by column B in ascending order".to_string(),
            options: SortOptions {
                sort_by: "B".to_string(),
            },
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success, "{:?}", results[0]);
        assert_eq!(
            book.cell_at(&CellRef::from_str("A1").unwrap()).unwrap().contents,
            CellType::Text("apple".to_string())
        );
        assert_eq!(
            book.cell_at(&CellRef::from_str("A3").unwrap()).unwrap().contents,
            CellType::Text("banana".to_string())
        );
    }

    #[tokio::test]
    async fn test_sort_needs_two_rows() {
        let mut book = seeded_book();
        book.select(RangeRef::parse("A1:B1").unwrap());
        let ops = vec![Operation::Sort {
            target: "Selected range".to_string(),
            description: "Sort data".to_string(),
            options: SortOptions {
                sort_by: "A".to_string(),
            },
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("2 rows"));
    }

    #[tokio::test]
    async fn test_filter_applies_auto_filter() {
        let mut book = seeded_book();
        book.select(RangeRef::parse("A1:B3").unwrap());
        let ops = vec![Operation::Filter {
            target: "Selected range".to_string(),
            description: "Filter data to show apples in column A".to_string(),
            options: FilterOptions {
                filter_criteria: json!({"column": "A", "value": "apples"}),
            },
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success);
        assert_eq!(book.auto_filter.unwrap().to_string(), "A1:B3");
    }

    #[tokio::test]
    async fn test_chart_unknown_kind_fails() {
        let mut book = seeded_book();
        book.select(RangeRef::parse("A1:B3").unwrap());
        let ops = vec![Operation::Chart {
            target: "Chart object".to_string(),
            description: "Create a chart".to_string(),
            options: ChartOptions {
                chart_type: "Sunburst".to_string(),
            },
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("Sunburst"));
        assert!(book.charts.is_empty());
    }

    #[tokio::test]
    async fn test_chart_created_from_selection() {
        let mut book = seeded_book();
        book.select(RangeRef::parse("A1:B3").unwrap());
        let ops = vec![Operation::Chart {
            target: "Chart object".to_string(),
            description: "Create a Line chart from selected data".to_string(),
            options: ChartOptions {
                chart_type: "Line".to_string(),
            },
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success);
        assert_eq!(book.charts[0].kind, ChartKind::Line);
    }

    #[tokio::test]
    async fn test_insert_row_below_selection() {
        let mut book = seeded_book();
        book.select(RangeRef::parse("A1:B1").unwrap());
        let ops = vec![Operation::Insert {
            target: "Next available row".to_string(),
            description: "Add a new row".to_string(),
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success);
        // Row 2 data shifted to row 3.
        assert!(book.cell_at(&CellRef::from_str("A2").unwrap()).is_none());
        assert_eq!(
            book.cell_at(&CellRef::from_str("A3").unwrap()).unwrap().contents,
            CellType::Text("apple".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_is_recorded_noop() {
        let mut book = seeded_book();
        let ops = vec![Operation::Delete {
            target: "Selected range".to_string(),
            description: "Remove duplicate values from selected data".to_string(),
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success);
        assert!(results[0].message.contains("duplicate"));
        // Nothing actually removed.
        assert!(book.cell_at(&CellRef::from_str("A1").unwrap()).is_some());
    }

    #[tokio::test]
    async fn test_table_created_over_selection() {
        let mut book = seeded_book();
        book.select(RangeRef::parse("A1:B3").unwrap());
        let ops = vec![Operation::Table {
            target: "Selected range".to_string(),
            description: "Convert selected data to a formatted table".to_string(),
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(results[0].success);
        assert_eq!(book.tables.len(), 1);
        assert!(book.tables[0].has_headers);
    }

    #[tokio::test]
    async fn test_clean_operation_is_rejected() {
        let mut book = seeded_book();
        let ops = vec![Operation::Clean {
            target: "Selected range".to_string(),
            description: "Clean up selected data".to_string(),
        }];
        let results = execute_operations(&mut book, &ops).await;
        assert!(!results[0].success);
    }
}
