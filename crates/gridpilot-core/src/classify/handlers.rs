//! Handlers for each rule in the cascade: parameter capture and the
//! resulting classification, one operation at most per prompt.

use serde_json::json;

use super::patterns;
use super::PromptScan;
use crate::op::{
    ActionKind, ChartOptions, Classification, FilterOptions, Operation, SortOptions,
};

fn classification(
    action: ActionKind,
    description: &str,
    operations: Vec<Operation>,
    suggestions: [&str; 3],
) -> Classification {
    Classification {
        action,
        description: description.to_string(),
        operations,
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
    }
}

pub(super) fn explain(_scan: &PromptScan) -> Classification {
    classification(
        ActionKind::Explain,
        "I'll explain the selected formula or data structure.",
        Vec::new(),
        [
            "Select a cell with a formula to get a detailed explanation",
            "Ask \"What does this range contain?\" to understand your data",
            "Use \"Explain this chart\" to understand visualizations",
        ],
    )
}

pub(super) fn clean(scan: &PromptScan) -> Classification {
    let description = if scan.contains("duplicate") {
        "Remove duplicate values from selected data"
    } else if scan.contains("empty") || scan.contains("blank") {
        "Remove empty cells from selected data"
    } else {
        "Clean up selected data"
    };
    let op = Operation::Delete {
        target: "Selected range".to_string(),
        description: description.to_string(),
    };
    classification(
        ActionKind::Clean,
        "I'll clean up your data as requested.",
        vec![op],
        [
            "Select the data range before cleaning",
            "Use \"Remove duplicates\" for duplicate elimination",
            "Try \"Delete empty rows\" for data cleanup",
        ],
    )
}

pub(super) fn filter(scan: &PromptScan) -> Classification {
    let criteria = patterns::FILTER_CRITERIA
        .captures(&scan.text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "matching criteria".to_string());
    let column = patterns::FILTER_COLUMN
        .captures(&scan.text)
        .map(|c| c[1].to_uppercase())
        .unwrap_or_else(|| "A".to_string());
    let op = Operation::Filter {
        target: "Selected range".to_string(),
        description: format!("Filter data to show {} in column {}", criteria, column),
        options: FilterOptions {
            filter_criteria: json!({ "column": column, "value": criteria }),
        },
    };
    classification(
        ActionKind::Transform,
        "I'll filter the data as requested.",
        vec![op],
        [
            "Select the data range before filtering",
            "Use \"Show only values > 100\" for numeric filters",
            "Try \"Filter by date\" for date-based filtering",
        ],
    )
}

pub(super) fn copy(scan: &PromptScan) -> Classification {
    let source = patterns::COPY_SOURCE
        .captures(&scan.text)
        .map(|c| c[1].to_uppercase());
    let dest = patterns::DEST_CELL
        .captures(&scan.text)
        .map(|c| c[1].to_uppercase());
    let op = match (source, dest) {
        (Some(source), Some(dest)) => Operation::Copy {
            description: format!("Copy {} to {}", source, dest),
            target: dest,
            range: Some(source),
        },
        _ => Operation::Copy {
            target: "Next available cell".to_string(),
            description: "Copy selected data to next available cell".to_string(),
            range: None,
        },
    };
    classification(
        ActionKind::Transform,
        "I'll copy the data as requested.",
        vec![op],
        [
            "Specify source and target ranges for copying",
            "Use \"Copy A1:B5 to C1\" for explicit copy",
            "Try \"Copy selected data\" for quick copy",
        ],
    )
}

pub(super) fn move_data(scan: &PromptScan) -> Classification {
    let source = patterns::MOVE_SOURCE
        .captures(&scan.text)
        .map(|c| c[1].to_uppercase());
    let dest = patterns::DEST_CELL
        .captures(&scan.text)
        .map(|c| c[1].to_uppercase());
    let op = match (source, dest) {
        (Some(source), Some(dest)) => Operation::Move {
            description: format!("Move {} to {}", source, dest),
            target: dest,
            range: Some(source),
        },
        _ => Operation::Move {
            target: "New location".to_string(),
            description: "Move selected data to new location".to_string(),
            range: None,
        },
    };
    classification(
        ActionKind::Transform,
        "I'll move the data as requested.",
        vec![op],
        [
            "Specify source and target for moving",
            "Use \"Move A1:B5 to D1\" for explicit move",
            "Try \"Move selected data\" for quick move",
        ],
    )
}

pub(super) fn sort(scan: &PromptScan) -> Classification {
    let sort_by = patterns::SORT_COLUMN
        .captures(&scan.text)
        .map(|c| c[1].to_uppercase())
        .unwrap_or_else(|| "A".to_string());
    let order = patterns::SORT_ORDER
        .captures(&scan.text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "ascending".to_string());
    let op = Operation::Sort {
        target: "Selected range".to_string(),
        description: format!("Sort data by column {} in {} order", sort_by, order),
        options: SortOptions { sort_by },
    };
    classification(
        ActionKind::Transform,
        "I'll sort the data as requested.",
        vec![op],
        [
            "Select the data range before sorting",
            "Use \"Sort by column B descending\" for specific sorting",
            "Try \"Sort alphabetically\" for text data",
        ],
    )
}

pub(super) fn chart(scan: &PromptScan) -> Classification {
    let chart_type = chart_subtype(scan);
    let op = Operation::Chart {
        target: "Chart object".to_string(),
        description: format!("Create a {} chart from selected data", chart_type),
        options: ChartOptions {
            chart_type: chart_type.to_string(),
        },
    };
    classification(
        ActionKind::Create,
        "I'll create a chart from your data.",
        vec![op],
        [
            "Select the data range before creating charts",
            "Use \"Create line chart\" for trend visualization",
            "Try \"Make pie chart\" for proportion data",
        ],
    )
}

fn chart_subtype(scan: &PromptScan) -> &'static str {
    if scan.contains("line") {
        "Line"
    } else if scan.contains("pie") {
        "Pie"
    } else if scan.contains("bar") {
        "BarClustered"
    } else if scan.contains("scatter") {
        "XYScatter"
    } else {
        "ColumnClustered"
    }
}

pub(super) fn table(_scan: &PromptScan) -> Classification {
    let op = Operation::Table {
        target: "Selected range".to_string(),
        description: "Convert selected data to a formatted table".to_string(),
    };
    classification(
        ActionKind::Create,
        "I'll convert your data to a formatted table.",
        vec![op],
        [
            "Select the data range before creating tables",
            "Use \"Create pivot table\" for data analysis",
            "Try \"Format as table\" for better appearance",
        ],
    )
}

pub(super) fn create(scan: &PromptScan) -> Classification {
    let mut operations = Vec::new();
    if scan.contains("column") {
        operations.push(Operation::Insert {
            target: "Next available column".to_string(),
            description: "Add a new column".to_string(),
        });
    } else if scan.contains("row") {
        operations.push(Operation::Insert {
            target: "Next available row".to_string(),
            description: "Add a new row".to_string(),
        });
    } else if scan.contains("chart") || scan.contains("graph") {
        operations.push(Operation::Chart {
            target: "Chart object".to_string(),
            description: "Create a chart based on selected data".to_string(),
            options: ChartOptions {
                chart_type: "ColumnClustered".to_string(),
            },
        });
    }
    classification(
        ActionKind::Create,
        "I'll create the requested elements in your spreadsheet.",
        operations,
        [
            "Select the data range before creating charts",
            "Specify column headers for better organization",
            "Use \"Add a column for [purpose]\" for specific needs",
        ],
    )
}

pub(super) fn format(scan: &PromptScan) -> Classification {
    let mut operations = Vec::new();
    let label = if scan.contains("currency") {
        Some("Currency format")
    } else if scan.contains("percentage") {
        Some("Percentage format")
    } else if scan.contains("date") {
        Some("Date format")
    } else {
        None
    };
    if let Some(label) = label {
        let style = label.trim_end_matches(" format").to_lowercase();
        operations.push(Operation::Format {
            target: "Selected range".to_string(),
            value: label.to_string(),
            description: format!("Apply {} formatting to selected cells", style),
        });
    }
    classification(
        ActionKind::Format,
        "I'll apply the requested formatting to your data.",
        operations,
        [
            "Select the cells you want to format first",
            "Use \"Format as table\" for professional appearance",
            "Try \"Auto-fit columns\" for better readability",
        ],
    )
}

pub(super) fn calculation(scan: &PromptScan) -> Classification {
    let mut operations = Vec::new();
    let formula = if scan.contains("sum") {
        Some(("=SUM(selected_range)", "Calculate sum of selected range"))
    } else if scan.contains("average") {
        Some(("=AVERAGE(selected_range)", "Calculate average of selected range"))
    } else if scan.contains("count") {
        Some(("=COUNT(selected_range)", "Count items in selected range"))
    } else {
        None
    };
    if let Some((value, description)) = formula {
        operations.push(Operation::Formula {
            target: "Next available cell".to_string(),
            value: value.to_string(),
            description: description.to_string(),
        });
    }
    classification(
        ActionKind::Analyze,
        "I'll perform the requested calculation.",
        operations,
        [
            "Select the range before calculating",
            "Use \"Sum column B\" for totals",
            "Try \"Average of A1:A10\" for averages",
        ],
    )
}

pub(super) fn add_value(scan: &PromptScan) -> Classification {
    let cell = patterns::CELL_TOKEN
        .captures(&scan.text)
        .map(|c| c[1].to_uppercase());
    let number = patterns::NUMBER_KEYWORD
        .captures(&scan.text)
        .or_else(|| patterns::ANY_NUMBER.captures(&scan.text))
        .map(|c| c[1].to_string());
    let op = match (cell, number) {
        (Some(cell), Some(number)) => Operation::Modify {
            description: format!("Add the number {} to cell {}", number, cell),
            target: cell,
            value: number,
        },
        _ => Operation::Modify {
            target: "Selected cell".to_string(),
            value: "32".to_string(),
            description: "Add a number to the selected cell".to_string(),
        },
    };
    classification(
        ActionKind::Modify,
        "I'll add the value to the specified cell.",
        vec![op],
        [
            "Select a cell before adding values",
            "Use \"Add formula to cell A1\" for calculations",
            "Try \"Format cell A1 as currency\" for formatting",
        ],
    )
}

pub(super) fn generic(_scan: &PromptScan) -> Classification {
    classification(
        ActionKind::Analyze,
        "I understand your request. Let me help you with that.",
        Vec::new(),
        [
            "Be more specific about what you want to do",
            "Try selecting cells before asking questions",
            "Use phrases like \"Add a column for...\" or \"Format this as...\"",
        ],
    )
}
