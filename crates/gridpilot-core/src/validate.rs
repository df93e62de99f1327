//! Schema validation for untrusted classification payloads.
//!
//! This is the sole trust boundary for content originating from the external
//! text-generation service. Rule-based classifications are constructed
//! directly as typed values and never pass through here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::op::Classification;

/// The twelve operation tags the schema knows.
pub const OPERATION_TYPES: [&str; 12] = [
    "formula", "format", "insert", "delete", "modify", "copy", "move", "sort", "filter", "chart",
    "table", "clean",
];

/// The seven action categories.
pub const ACTION_KINDS: [&str; 7] = [
    "explain",
    "create",
    "modify",
    "format",
    "analyze",
    "transform",
    "clean",
];

static CELL_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]+\d+$").unwrap());
static RANGE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]+\d+:[A-Z]+\d+$").unwrap());

#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("response payload failed schema validation")]
    Schema,
    #[error("operation at index {0} failed schema validation")]
    Operation(usize),
}

/// Is this a bare A1 cell reference ("B2")?
pub fn valid_cell_ref(text: &str) -> bool {
    CELL_REF.is_match(&text.to_uppercase())
}

/// Is this an A1 rectangle reference ("A1:B10")?
pub fn valid_range_ref(text: &str) -> bool {
    RANGE_REF.is_match(&text.to_uppercase())
}

/// Is this one of the known action categories?
pub fn valid_action(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| ACTION_KINDS.contains(&s))
}

fn non_empty_str(value: Option<&Value>) -> bool {
    value.and_then(Value::as_str).is_some_and(|s| !s.is_empty())
}

/// Type-narrowing predicate for a single operation object.
///
/// Rejects anything that is not an object, whose `type` is unknown, whose
/// `target` is missing/empty, or whose `description` is not a non-empty
/// string, plus the per-variant requirements (a `sort` without
/// `options.sortBy` must never reach execution).
pub fn valid_operation(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let Some(op_type) = obj.get("type").and_then(Value::as_str) else {
        return false;
    };
    if !OPERATION_TYPES.contains(&op_type) {
        return false;
    }
    if !non_empty_str(obj.get("target")) || !non_empty_str(obj.get("description")) {
        return false;
    }

    let options = obj.get("options").and_then(Value::as_object);
    match op_type {
        "formula" | "format" | "modify" => non_empty_str(obj.get("value")),
        // Only target and description are required; `range` stays optional
        // for copy/move.
        "insert" | "delete" | "table" | "clean" | "copy" | "move" => true,
        "sort" => options.is_some_and(|o| non_empty_str(o.get("sortBy"))),
        "filter" => options.is_some_and(|o| o.get("filterCriteria").is_some_and(|v| !v.is_null())),
        "chart" => options.is_some_and(|o| non_empty_str(o.get("chartType"))),
        _ => false,
    }
}

/// Validate the full success payload: `action`, `description`, `operations`
/// (every element must independently validate), and `suggestions` (strings
/// only).
pub fn valid_payload(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if !obj.get("action").is_some_and(valid_action) {
        return false;
    }
    if !non_empty_str(obj.get("description")) {
        return false;
    }
    let Some(operations) = obj.get("operations").and_then(Value::as_array) else {
        return false;
    };
    if !operations.iter().all(valid_operation) {
        return false;
    }
    let Some(suggestions) = obj.get("suggestions").and_then(Value::as_array) else {
        return false;
    };
    suggestions.iter().all(Value::is_string)
}

/// Validate and convert an untrusted payload into typed values in one pass.
pub fn decode_payload(value: &Value) -> Result<Classification, ValidateError> {
    if !valid_payload(value) {
        if let Some(operations) = value.get("operations").and_then(Value::as_array) {
            if let Some(index) = operations.iter().position(|op| !valid_operation(op)) {
                return Err(ValidateError::Operation(index));
            }
        }
        return Err(ValidateError::Schema);
    }
    serde_json::from_value(value.clone()).map_err(|_| ValidateError::Schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{ActionKind, Operation};
    use serde_json::json;

    #[test]
    fn test_valid_operation_accepts_classifier_output() {
        // Every operation the rule cascade can construct must round-trip.
        let ops = [
            json!({"type": "formula", "target": "Next available cell",
                   "value": "=SUM(selected_range)", "description": "Calculate sum"}),
            json!({"type": "delete", "target": "Selected range",
                   "description": "Remove duplicate values from selected data"}),
            json!({"type": "copy", "target": "C1", "range": "A1:B5",
                   "description": "Copy A1:B5 to C1"}),
            json!({"type": "sort", "target": "Selected range",
                   "description": "Sort data", "options": {"sortBy": "B"}}),
            json!({"type": "filter", "target": "Selected range",
                   "description": "Filter data",
                   "options": {"filterCriteria": {"column": "A", "value": "x"}}}),
            json!({"type": "chart", "target": "Chart object",
                   "description": "Create a chart", "options": {"chartType": "Line"}}),
        ];
        for op in &ops {
            assert!(valid_operation(op), "rejected: {}", op);
        }
    }

    #[test]
    fn test_valid_operation_rejects_missing_required_fields() {
        // No value on a formula.
        assert!(!valid_operation(&json!({
            "type": "formula", "target": "A1", "description": "sum"
        })));
        // Sort without sortBy.
        assert!(!valid_operation(&json!({
            "type": "sort", "target": "A1:A5", "description": "sort", "options": {}
        })));
        // Filter with null criteria.
        assert!(!valid_operation(&json!({
            "type": "filter", "target": "A1:A5", "description": "filter",
            "options": {"filterCriteria": null}
        })));
        // Chart with empty chartType.
        assert!(!valid_operation(&json!({
            "type": "chart", "target": "A1:B5", "description": "chart",
            "options": {"chartType": ""}
        })));
        // Unknown tag.
        assert!(!valid_operation(&json!({
            "type": "merge", "target": "A1", "description": "merge"
        })));
        // Not an object at all.
        assert!(!valid_operation(&json!("formula")));
        // Missing target.
        assert!(!valid_operation(&json!({
            "type": "delete", "description": "remove"
        })));
    }

    #[test]
    fn test_valid_payload() {
        let payload = json!({
            "action": "transform",
            "description": "I'll sort the data as requested.",
            "operations": [
                {"type": "sort", "target": "Selected range",
                 "description": "Sort data", "options": {"sortBy": "A"}}
            ],
            "suggestions": ["Select the data range before sorting"]
        });
        assert!(valid_payload(&payload));

        let mut bad_action = payload.clone();
        bad_action["action"] = json!("reticulate");
        assert!(!valid_payload(&bad_action));

        let mut bad_suggestion = payload.clone();
        bad_suggestion["suggestions"] = json!(["ok", 7]);
        assert!(!valid_payload(&bad_suggestion));

        let mut bad_op = payload;
        bad_op["operations"][0]["options"] = json!({});
        assert!(!valid_payload(&bad_op));
    }

    #[test]
    fn test_decode_payload_produces_typed_values() {
        let payload = json!({
            "action": "create",
            "description": "I'll create a chart from your data.",
            "operations": [
                {"type": "chart", "target": "Chart object",
                 "description": "Create a Line chart from selected data",
                 "options": {"chartType": "Line"}}
            ],
            "suggestions": ["Select the data range before creating charts"]
        });
        let classification = decode_payload(&payload).unwrap();
        assert_eq!(classification.action, ActionKind::Create);
        assert_eq!(classification.operations.len(), 1);
        match &classification.operations[0] {
            Operation::Chart { options, .. } => assert_eq!(options.chart_type, "Line"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_decode_payload_reports_bad_operation_index() {
        let payload = json!({
            "action": "create",
            "description": "desc",
            "operations": [
                {"type": "table", "target": "Selected range", "description": "table"},
                {"type": "sort", "target": "Selected range", "description": "sort"}
            ],
            "suggestions": []
        });
        assert!(matches!(
            decode_payload(&payload),
            Err(ValidateError::Operation(1))
        ));
    }

    #[test]
    fn test_reference_predicates() {
        assert!(valid_cell_ref("A1"));
        assert!(valid_cell_ref("b12"));
        assert!(!valid_cell_ref("Selected range"));
        assert!(!valid_cell_ref("A1:B2"));

        assert!(valid_range_ref("A1:B10"));
        assert!(!valid_range_ref("A1"));
    }
}
