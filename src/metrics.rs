// src/metrics.rs
//
// The registry of published figures: which table each one lives in, which
// row labels identify it, and how raw cells become dollar values.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{MetricError, Result};

/// Published figures are in millions of dollars.
pub const MILLIONS: f64 = 1_000_000.0;

/// Column holding the current-period figure in every table.
pub const VALUE_COLUMN: usize = 2;

/// Row and column of the reporting-period label, fixed across tables.
pub const AS_OF_ROW: usize = 2;
pub const AS_OF_COLUMN: usize = 2;

/// The five figures the service republishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    NationalDebt,
    Deficit,
    Interest,
    Procurement,
    Payroll,
}

pub const ALL_METRICS: [Metric; 5] = [
    Metric::NationalDebt,
    Metric::Deficit,
    Metric::Interest,
    Metric::Procurement,
    Metric::Payroll,
];

/// How a metric's matched rows combine into one figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// One row, one figure.
    Single,
    /// Sum the figure from every pattern's row, then scale once.
    Sum,
}

/// Where a metric lives and how to pull it out.
#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    pub table_number: u32,
    pub patterns: &'static [&'static str],
    pub aggregation: Aggregation,
}

impl Metric {
    /// Key used in logs and client-side lookups.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::NationalDebt => "nationalDebt",
            Metric::Deficit => "deficit",
            Metric::Interest => "interest",
            Metric::Procurement => "procurement",
            Metric::Payroll => "payroll",
        }
    }

    /// URL path segment the metric is served under.
    pub fn endpoint(self) -> &'static str {
        match self {
            Metric::NationalDebt => "national-debt",
            Metric::Deficit => "deficit",
            Metric::Interest => "interest",
            Metric::Procurement => "procurement",
            Metric::Payroll => "payroll",
        }
    }

    pub fn spec(self) -> MetricSpec {
        match self {
            // Table 7 restates the accumulated deficit as federal debt.
            Metric::NationalDebt => MetricSpec {
                table_number: 7,
                patterns: &[r"(?i)^Federal debt.*accumulated deficit\)?$"],
                aggregation: Aggregation::Single,
            },
            Metric::Deficit => MetricSpec {
                table_number: 1,
                patterns: &[r"(?i)^Budgetary balance.*deficit/surplus"],
                aggregation: Aggregation::Single,
            },
            Metric::Interest => MetricSpec {
                table_number: 1,
                patterns: &[r"(?i)^Public debt charges"],
                aggregation: Aggregation::Single,
            },
            // Procurement has no single line; it is the sum of the five
            // purchased-goods-and-services rows of table 4. Patterns are
            // unanchored, so the first row containing the phrase wins.
            Metric::Procurement => MetricSpec {
                table_number: 4,
                patterns: &[
                    r"(?i)professional\s+and\s+special\s+services?",
                    r"(?i)rentals?",
                    r"(?i)repair\s+and\s+maintenance",
                    r"(?i)utilities?,?\s*materials?\s*(and)?\s*supplies?",
                    r"(?i)transportation\s+and\s+communications?",
                ],
                aggregation: Aggregation::Sum,
            },
            Metric::Payroll => MetricSpec {
                table_number: 4,
                patterns: &[r"(?i)^Personnel, excluding net actuarial losses"],
                aggregation: Aggregation::Single,
            },
        }
    }

    /// Compiled row patterns for this metric, in declaration order.
    pub fn matchers(self) -> &'static [Regex] {
        &MATCHERS[&self]
    }
}

static MATCHERS: Lazy<HashMap<Metric, Vec<Regex>>> = Lazy::new(|| {
    ALL_METRICS
        .iter()
        .map(|&metric| {
            let compiled = metric
                .spec()
                .patterns
                .iter()
                .map(|p| Regex::new(p).expect("metric row pattern is valid"))
                .collect();
            (metric, compiled)
        })
        .collect()
});

/// Strip everything but digits, `.` and `-` from a cell and parse the rest
/// as an unsigned magnitude. Published cells carry currency symbols, comma
/// grouping and footnote daggers; deficits are bracketed or negative, and
/// the sign is dropped here because each metric reports a size.
pub fn cell_magnitude(cell: &str) -> Result<f64> {
    let numeric: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    numeric
        .parse::<f64>()
        .map(f64::abs)
        .map_err(|_| MetricError::ParseError(format!("cannot parse {:?} as a figure", cell)))
}

/// Loose shape check for a reporting-period label: something like
/// `2025-Q1`, `April 2025` or `2025-03-31`, as opposed to a stray figure
/// or an empty cell.
pub fn looks_like_period(text: &str) -> bool {
    !text.is_empty()
        && text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .any(|c| c.is_alphabetic() || c == '-' || c == '/')
}

/// Reporting-period label of a parsed table. Every Fiscal Monitor table
/// carries it in the same cell, above the data rows.
pub fn as_of_label(rows: &[Vec<String>], table_number: u32) -> Result<String> {
    let cell = rows
        .get(AS_OF_ROW)
        .and_then(|row| row.get(AS_OF_COLUMN))
        .map(|cell| cell.trim())
        .unwrap_or("");
    if looks_like_period(cell) {
        Ok(cell.to_string())
    } else {
        Err(MetricError::ParseError(format!(
            "Table_{} cell ({},{}) {:?} does not look like a reporting period",
            table_number, AS_OF_ROW, AS_OF_COLUMN, cell
        )))
    }
}
