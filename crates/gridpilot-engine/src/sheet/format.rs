//! Number format patterns and display rendering.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell's display format, the subset of host number formats the assistant
/// knows how to apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFormat {
    #[default]
    General,
    Currency,
    Percentage,
    Date,
}

impl NumberFormat {
    /// The host-side format pattern string.
    pub fn pattern(&self) -> &'static str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::Currency => "$#,##0.00",
            NumberFormat::Percentage => "0.00%",
            NumberFormat::Date => "mm/dd/yyyy",
        }
    }

    /// Choose a format from a human label by substring match
    /// ("Currency format" -> Currency). Unknown labels fall back to General.
    pub fn from_label(label: &str) -> NumberFormat {
        if label.contains("Currency") {
            NumberFormat::Currency
        } else if label.contains("Percentage") {
            NumberFormat::Percentage
        } else if label.contains("Date") {
            NumberFormat::Date
        } else {
            NumberFormat::General
        }
    }

    /// Render a number for display under this format.
    pub fn render(&self, n: f64) -> String {
        if n.is_nan() {
            return "#NAN!".to_string();
        }
        if n.is_infinite() {
            return "#INF!".to_string();
        }
        match self {
            NumberFormat::General => {
                if n.fract() == 0.0 && n.abs() < 1e10 {
                    format!("{:.0}", n)
                } else {
                    format!("{:.2}", n)
                }
            }
            NumberFormat::Currency => {
                let sign = if n < 0.0 { "-" } else { "" };
                format!("{}${}", sign, group_thousands(n.abs()))
            }
            NumberFormat::Percentage => format!("{:.2}%", n * 100.0),
            NumberFormat::Date => render_serial_date(n),
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern())
    }
}

fn group_thousands(n: f64) -> String {
    let raw = format!("{:.2}", n);
    let (whole, frac) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));
    let mut grouped = String::new();
    for (i, c) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let whole: String = grouped.chars().rev().collect();
    format!("{}.{}", whole, frac)
}

/// Interpret a number as a day serial (days since 1899-12-30, the host
/// spreadsheet epoch) and render it as mm/dd/yyyy.
fn render_serial_date(n: f64) -> String {
    if n < 0.0 || n.fract() != 0.0 {
        return format!("{:.2}", n);
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    match epoch.checked_add_days(Days::new(n as u64)) {
        Some(date) => date.format("%m/%d/%Y").to_string(),
        None => format!("{:.0}", n),
    }
}
