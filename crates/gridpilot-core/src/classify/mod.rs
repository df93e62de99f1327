//! Rule-based intent classification.
//!
//! The deterministic reference strategy: a prioritized, first-match cascade
//! of keyword and regex predicates over the lower-cased prompt. The cascade
//! is an explicit ordered list of (predicate, handler) pairs — precedence is
//! the list order, most specific rules first ("filter" must win over the
//! generic "add/create/insert" rule).
//!
//! Classification is a pure function of the prompt and context; it never
//! panics and never errors — every failure is a `Failure` outcome.

mod handlers;
mod patterns;

use crate::op::{Classification, ClassifyResponse, DocumentContext};

/// A prompt pre-scanned for the token classes the cascade cares about.
pub(crate) struct PromptScan {
    /// Lower-cased prompt text.
    pub text: String,
    /// A cell or rectangle token is present ("A1", "A1:B10").
    pub has_range: bool,
    /// "column <letters>" is present.
    pub has_column: bool,
    /// "row <digits>" is present.
    pub has_row: bool,
}

impl PromptScan {
    fn new(prompt: &str) -> PromptScan {
        let text = prompt.to_lowercase();
        PromptScan {
            has_range: patterns::CELL_OR_RANGE.is_match(&text),
            has_column: patterns::COLUMN_TOKEN.is_match(&text),
            has_row: patterns::ROW_TOKEN.is_match(&text),
            text,
        }
    }

    pub(crate) fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.text.contains(n))
    }
}

struct Rule {
    name: &'static str,
    applies: fn(&PromptScan) -> bool,
    build: fn(&PromptScan) -> Classification,
}

/// The cascade, in precedence order. First match wins.
const RULES: &[Rule] = &[
    Rule {
        name: "remove-duplicates",
        applies: |s| s.contains("remove") && (s.contains("duplicates") || s.contains("duplicate")),
        build: handlers::clean,
    },
    Rule {
        name: "filter",
        applies: |s| s.contains_any(&["filter", "show only", "show values"]),
        build: handlers::filter,
    },
    Rule {
        name: "explain",
        applies: |s| s.contains_any(&["explain", "what", "how"]),
        build: handlers::explain,
    },
    Rule {
        name: "delete",
        applies: |s| s.contains("delete") && (s.has_row || s.has_column || s.has_range),
        build: handlers::clean,
    },
    Rule {
        name: "copy",
        applies: |s| s.contains("copy") && s.has_range,
        build: handlers::copy,
    },
    Rule {
        name: "move",
        applies: |s| s.contains("move") && (s.has_range || s.has_column),
        build: handlers::move_data,
    },
    Rule {
        name: "sort",
        applies: |s| s.contains("sort") && (s.has_column || s.has_range),
        build: handlers::sort,
    },
    Rule {
        name: "chart",
        applies: |s| s.contains_any(&["chart", "graph", "visualize"]),
        build: handlers::chart,
    },
    Rule {
        name: "table",
        applies: |s| s.contains_any(&["table", "pivot"]),
        build: handlers::table,
    },
    Rule {
        name: "add-column-or-row",
        applies: |s| s.contains("add") && (s.contains("column") || s.contains("row")),
        build: handlers::create,
    },
    Rule {
        name: "format",
        applies: |s| s.contains_any(&["format", "style"]),
        build: handlers::format,
    },
    Rule {
        name: "calculation",
        applies: |s| s.contains_any(&["sum", "average", "calculate", "formula"]),
        build: handlers::calculation,
    },
    Rule {
        name: "add-value",
        applies: |s| s.contains("add") && s.contains_any(&["cell", "number", "value"]),
        build: handlers::add_value,
    },
    Rule {
        name: "create",
        applies: |s| s.contains_any(&["add", "create", "insert"]),
        build: handlers::create,
    },
];

/// Classify a prompt with the rule cascade.
///
/// The context snapshot is accepted for interface parity with the external
/// strategy; the rules themselves only consult the prompt text.
pub fn classify(prompt: &str, _context: &DocumentContext) -> ClassifyResponse {
    if prompt.trim().is_empty() {
        return ClassifyResponse::failure("prompt must be a non-empty string");
    }

    let scan = PromptScan::new(prompt);
    for rule in RULES {
        if (rule.applies)(&scan) {
            tracing::debug!(rule = rule.name, "prompt matched rule");
            return ClassifyResponse::success((rule.build)(&scan));
        }
    }

    // No keyword matched: a generic analyze response, whether or not the
    // prompt mentioned a range or column token.
    tracing::debug!("prompt matched no rule, returning generic response");
    ClassifyResponse::success(handlers::generic(&scan))
}
