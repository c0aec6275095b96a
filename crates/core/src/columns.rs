//! Column layout of a report row. This is the only place that knows which
//! spreadsheet column carries which field.
//!
//! | col    | content                                   |
//! |--------|-------------------------------------------|
//! | 0      | description text                          |
//! | 1      | cost center code (empty on overall rows)  |
//! | 2..=8  | the 7 scalar fields, in [`ScalarField::ALL`] order |
//! | 9..=34 | 13 aging buckets × (accounts, balance)    |

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::fields::{AgingMetric, Field, ScalarField};
use crate::model::FinancialMetrics;

pub const DESCRIPTION_COL: usize = 0;
pub const COST_CENTER_COL: usize = 1;
pub const FIRST_VALUE_COL: usize = 2;
pub const AGING_START_COL: usize = 9;
/// Columns 0..=34.
pub const TOTAL_COLUMNS: usize = 35;

/// Spreadsheet column index of a field.
pub fn column_of(field: Field) -> usize {
    match field {
        Field::Scalar(s) => {
            let pos = ScalarField::ALL.iter().position(|f| *f == s).unwrap_or(0);
            FIRST_VALUE_COL + pos
        }
        Field::Aging(bucket, metric) => {
            let base = AGING_START_COL + bucket.index() * 2;
            match metric {
                AgingMetric::Accounts => base,
                AgingMetric::Balance => base + 1,
            }
        }
    }
}

/// Parse a numeric cell the way the billing export writes them: optional
/// thousands separators, optional trailing `%`. Blank or unparseable cells
/// read as zero.
pub fn parse_amount(cell: &str) -> Decimal {
    let cleaned: String = cell
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(Decimal::ZERO)
}

/// Build a metrics record from the financial columns of a row. Short rows are
/// zero-filled.
pub fn read_metrics<S: AsRef<str>>(cells: &[S]) -> FinancialMetrics {
    let mut metrics = FinancialMetrics::zero();
    for field in Field::all() {
        let raw = cells.get(column_of(field)).map(|c| c.as_ref()).unwrap_or("");
        metrics.set_value(field, parse_amount(raw));
    }
    metrics
}

/// Lay out a full row: description, cost center, then every financial column.
pub fn write_row(description: &str, cost_center: &str, metrics: &FinancialMetrics) -> Vec<String> {
    let mut row = vec![String::new(); TOTAL_COLUMNS];
    row[DESCRIPTION_COL] = description.to_string();
    row[COST_CENTER_COL] = cost_center.to_string();
    for field in Field::all() {
        row[column_of(field)] = metrics.value(field).normalize().to_string();
    }
    row
}
