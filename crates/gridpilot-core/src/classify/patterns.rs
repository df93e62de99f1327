//! Shared regexes for prompt scanning and parameter capture.

use once_cell::sync::Lazy;
use regex::Regex;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

/// A cell or rectangle token anywhere in the prompt ("A1", "A1:B10").
pub static CELL_OR_RANGE: Lazy<Regex> = Lazy::new(|| re(r"[a-z]+\d+:[a-z]+\d+|[a-z]+\d+"));

/// "column B"
pub static COLUMN_TOKEN: Lazy<Regex> = Lazy::new(|| re(r"column\s+([a-z]+)"));

/// "row 5"
pub static ROW_TOKEN: Lazy<Regex> = Lazy::new(|| re(r"row\s+(\d+)"));

/// "copy A1:B5"
pub static COPY_SOURCE: Lazy<Regex> = Lazy::new(|| re(r"copy\s+([a-z]+\d+:[a-z]+\d+)"));

/// "move A1:B5"
pub static MOVE_SOURCE: Lazy<Regex> = Lazy::new(|| re(r"move\s+([a-z]+\d+:[a-z]+\d+)"));

/// "to C1"
pub static DEST_CELL: Lazy<Regex> = Lazy::new(|| re(r"to\s+([a-z]+\d+)"));

/// "cell A1"
pub static CELL_TOKEN: Lazy<Regex> = Lazy::new(|| re(r"cell\s+([a-z]+\d+)"));

/// "number 42"
pub static NUMBER_KEYWORD: Lazy<Regex> = Lazy::new(|| re(r"number\s+(\d+)"));

/// Any bare integer literal.
pub static ANY_NUMBER: Lazy<Regex> = Lazy::new(|| re(r"(\d+)"));

/// "sort by column B" / "sort B"
pub static SORT_COLUMN: Lazy<Regex> = Lazy::new(|| re(r"sort\s+(?:by\s+)?(?:column\s+)?([a-z]+)"));

/// Sort direction words, captured for the description only.
pub static SORT_ORDER: Lazy<Regex> = Lazy::new(|| re(r"(ascending|descending|a-z|z-a)"));

/// "show only <criteria> in/where/with ..."
pub static FILTER_CRITERIA: Lazy<Regex> =
    Lazy::new(|| re(r"show\s+(?:only\s+)?(.+?)(?:\s+in\s+|\s+where\s+|\s+with\s+)"));

/// "... in column B" / "... where B"
pub static FILTER_COLUMN: Lazy<Regex> =
    Lazy::new(|| re(r"(?:in\s+|where\s+|with\s+)(?:column\s+)?([a-z]+)"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_or_range_token() {
        assert!(CELL_OR_RANGE.is_match("sum a1:b10 please"));
        assert!(CELL_OR_RANGE.is_match("put it in c3"));
        assert!(!CELL_OR_RANGE.is_match("no references here"));
    }

    #[test]
    fn test_sort_column_capture() {
        let caps = SORT_COLUMN.captures("sort by column b descending").unwrap();
        assert_eq!(&caps[1], "b");
        let caps = SORT_COLUMN.captures("sort c").unwrap();
        assert_eq!(&caps[1], "c");
    }

    #[test]
    fn test_filter_captures() {
        let prompt = "show only values over 100 in column b";
        let criteria = FILTER_CRITERIA.captures(prompt).unwrap();
        assert_eq!(&criteria[1], "values over 100");
        let column = FILTER_COLUMN.captures(prompt).unwrap();
        assert_eq!(&column[1], "b");
    }
}
