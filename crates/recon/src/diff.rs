//! Field-level comparison. Pure functions over [`FinancialMetrics`].

use rust_decimal::Decimal;

use brdiff_core::{Field, FinancialMetrics};

use crate::model::{FieldDifference, SectionComparison};

/// `(value1 - value2) / |value2| * 100`, or `None` when `value2` is zero
/// (or the result does not fit a decimal).
pub fn percentage_change(value1: Decimal, value2: Decimal) -> Option<Decimal> {
    if value2.is_zero() {
        return None;
    }
    value1
        .checked_sub(value2)?
        .checked_div(value2.abs())?
        .checked_mul(Decimal::ONE_HUNDRED)
}

pub fn field_difference(field: Field, value1: Decimal, value2: Decimal) -> FieldDifference {
    let difference = value1.saturating_sub(value2);
    FieldDifference {
        field: field.key(),
        display_name: field.display_name(),
        value1,
        value2,
        difference,
        percentage_change: percentage_change(value1, value2),
        is_zero_diff: difference.is_zero(),
    }
}

/// Every field, always, in catalogue order.
pub fn diff_metrics(m1: &FinancialMetrics, m2: &FinancialMetrics) -> Vec<FieldDifference> {
    Field::all()
        .into_iter()
        .map(|f| field_difference(f, m1.value(f), m2.value(f)))
        .collect()
}

/// Compare a section that may be missing on either side.
pub fn compare_section(
    m1: Option<&FinancialMetrics>,
    m2: Option<&FinancialMetrics>,
) -> SectionComparison {
    let differences = match (m1, m2) {
        (Some(a), Some(b)) => diff_metrics(a, b),
        _ => Vec::new(),
    };
    SectionComparison {
        exists_in_file1: m1.is_some(),
        exists_in_file2: m2.is_some(),
        has_differences: differences.iter().any(|d| !d.is_zero_diff),
        differences,
        file1_data: m1.cloned(),
        file2_data: m2.cloned(),
    }
}
