//! The operation schema: what a classified prompt asks the document to do.
//!
//! [`Operation`] is a tagged sum type; per-variant required fields are
//! enforced at construction and re-checked at the validation boundary
//! (`crate::validate`) for operations arriving from the external text
//! service. Symbolic targets ("Selected range", "Next available cell") are
//! plain strings that fail A1 parsing and route execution to the ambient
//! selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One spreadsheet mutation (or annotation) requested by a classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    Formula {
        target: String,
        value: String,
        description: String,
    },
    Format {
        target: String,
        value: String,
        description: String,
    },
    Insert {
        target: String,
        description: String,
    },
    Delete {
        target: String,
        description: String,
    },
    Modify {
        target: String,
        value: String,
        description: String,
    },
    Copy {
        target: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<String>,
    },
    Move {
        target: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<String>,
    },
    Sort {
        target: String,
        description: String,
        options: SortOptions,
    },
    Filter {
        target: String,
        description: String,
        options: FilterOptions,
    },
    Chart {
        target: String,
        description: String,
        options: ChartOptions,
    },
    Table {
        target: String,
        description: String,
    },
    Clean {
        target: String,
        description: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortOptions {
    #[serde(rename = "sortBy")]
    pub sort_by: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Free-form criteria captured from the prompt. Any non-null JSON value.
    #[serde(rename = "filterCriteria")]
    pub filter_criteria: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(rename = "chartType")]
    pub chart_type: String,
}

impl Operation {
    /// The discriminant tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Formula { .. } => "formula",
            Operation::Format { .. } => "format",
            Operation::Insert { .. } => "insert",
            Operation::Delete { .. } => "delete",
            Operation::Modify { .. } => "modify",
            Operation::Copy { .. } => "copy",
            Operation::Move { .. } => "move",
            Operation::Sort { .. } => "sort",
            Operation::Filter { .. } => "filter",
            Operation::Chart { .. } => "chart",
            Operation::Table { .. } => "table",
            Operation::Clean { .. } => "clean",
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Operation::Formula { target, .. }
            | Operation::Format { target, .. }
            | Operation::Insert { target, .. }
            | Operation::Delete { target, .. }
            | Operation::Modify { target, .. }
            | Operation::Copy { target, .. }
            | Operation::Move { target, .. }
            | Operation::Sort { target, .. }
            | Operation::Filter { target, .. }
            | Operation::Chart { target, .. }
            | Operation::Table { target, .. }
            | Operation::Clean { target, .. } => target,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Operation::Formula { description, .. }
            | Operation::Format { description, .. }
            | Operation::Insert { description, .. }
            | Operation::Delete { description, .. }
            | Operation::Modify { description, .. }
            | Operation::Copy { description, .. }
            | Operation::Move { description, .. }
            | Operation::Sort { description, .. }
            | Operation::Filter { description, .. }
            | Operation::Chart { description, .. }
            | Operation::Table { description, .. }
            | Operation::Clean { description, .. } => description,
        }
    }
}

/// The high-level category of a classified prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Explain,
    Create,
    Modify,
    Format,
    Analyze,
    Transform,
    Clean,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Explain => "explain",
            ActionKind::Create => "create",
            ActionKind::Modify => "modify",
            ActionKind::Format => "format",
            ActionKind::Analyze => "analyze",
            ActionKind::Transform => "transform",
            ActionKind::Clean => "clean",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only snapshot of the document state at classification time.
/// Fetched once per request and never mutated by the classifier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worksheet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_cell: Option<String>,
}

/// The success payload of a classification: what to do, in which order, and
/// what to suggest next.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub action: ActionKind,
    pub description: String,
    pub operations: Vec<Operation>,
    pub suggestions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassifyOutcome {
    Success(Classification),
    Failure(String),
}

/// The classifier's answer. Success implies a well-formed payload by
/// construction.
#[derive(Clone, Debug)]
pub struct ClassifyResponse {
    pub outcome: ClassifyOutcome,
    pub timestamp: DateTime<Utc>,
}

impl ClassifyResponse {
    pub fn success(classification: Classification) -> Self {
        Self {
            outcome: ClassifyOutcome::Success(classification),
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            outcome: ClassifyOutcome::Failure(error.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ClassifyOutcome::Success(_))
    }

    pub fn classification(&self) -> Option<&Classification> {
        match &self.outcome {
            ClassifyOutcome::Success(c) => Some(c),
            ClassifyOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ClassifyOutcome::Success(_) => None,
            ClassifyOutcome::Failure(e) => Some(e),
        }
    }
}

/// Outcome of executing one [`Operation`], order-preserving and 1:1 with the
/// input list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error.into()),
        }
    }
}
