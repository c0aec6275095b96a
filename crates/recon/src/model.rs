use rust_decimal::Decimal;
use serde::Serialize;

use brdiff_core::{Category, FinancialMetrics, SubType};

// ---------------------------------------------------------------------------
// Field level
// ---------------------------------------------------------------------------

/// One field compared across the two files. `difference` is `value1 - value2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDifference {
    pub field: String,
    pub display_name: String,
    pub value1: Decimal,
    pub value2: Decimal,
    pub difference: Decimal,
    /// `None` when `value2` is zero.
    pub percentage_change: Option<Decimal>,
    pub is_zero_diff: bool,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Comparison of one set of financial metrics (a total or a sub-type row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionComparison {
    pub exists_in_file1: bool,
    pub exists_in_file2: bool,
    pub has_differences: bool,
    /// All 33 fields when the section exists in both files, else empty.
    pub differences: Vec<FieldDifference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file1_data: Option<FinancialMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file2_data: Option<FinancialMetrics>,
}

impl SectionComparison {
    pub fn in_both(&self) -> bool {
        self.exists_in_file1 && self.exists_in_file2
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubTypeComparison {
    #[serde(rename = "type")]
    pub sub_type: SubType,
    #[serde(flatten)]
    pub section: SectionComparison,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainDescriptionComparison {
    pub name: Category,
    /// The main total row.
    #[serde(flatten)]
    pub total: SectionComparison,
    pub description_types: Vec<SubTypeComparison>,
}

impl MainDescriptionComparison {
    /// Differences at the main-total or any sub-type level.
    pub fn any_differences(&self) -> bool {
        self.total.has_differences || self.description_types.iter().any(|t| t.section.has_differences)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostCenterComparison {
    pub code: String,
    pub exists_in_file1: bool,
    pub exists_in_file2: bool,
    pub main_descriptions: Vec<MainDescriptionComparison>,
    /// Sum of the main totals present in both files. Only when the cost
    /// center exists in both.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_center_total: Option<SectionComparison>,
}

impl CostCenterComparison {
    pub fn in_both(&self) -> bool {
        self.exists_in_file1 && self.exists_in_file2
    }

    pub fn any_differences(&self) -> bool {
        self.main_descriptions.iter().any(|m| m.any_differences())
            || self.cost_center_total.as_ref().map_or(false, |t| t.has_differences)
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub total_cost_centers: usize,
    pub matched_cost_centers: usize,
    pub only_in_file1: usize,
    pub only_in_file2: usize,
    /// Cost center main descriptions with a non-zero diff at main or sub-type level.
    pub with_differences: usize,
    /// Overall main descriptions, report totals and age balance with a non-zero diff.
    pub overall_with_differences: usize,
}

impl ComparisonSummary {
    pub fn has_differences(&self) -> bool {
        self.with_differences > 0
            || self.overall_with_differences > 0
            || self.only_in_file1 > 0
            || self.only_in_file2 > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file1_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file2_title: Option<String>,
    pub include_cst: bool,
    pub engine_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub meta: ComparisonMeta,
    pub summary: ComparisonSummary,
    pub cost_centers: Vec<CostCenterComparison>,
    pub overall_totals: Vec<MainDescriptionComparison>,
    pub report_totals: SectionComparison,
    pub age_balance: SectionComparison,
}

impl ComparisonResult {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.meta.comparison_name = Some(name.into());
        self
    }

    /// Any non-zero field difference, or any section present in only one file.
    pub fn has_differences(&self) -> bool {
        let one_sided_main = |m: &MainDescriptionComparison| {
            !m.total.in_both() || m.description_types.iter().any(|t| !t.section.in_both())
        };
        self.summary.has_differences()
            || self
                .cost_centers
                .iter()
                .flat_map(|cc| &cc.main_descriptions)
                .chain(&self.overall_totals)
                .any(one_sided_main)
            || self.report_totals.exists_in_file1 != self.report_totals.exists_in_file2
            || self.age_balance.exists_in_file1 != self.age_balance.exists_in_file2
    }

    /// Drop everything that matches exactly: zero field diffs, and sections,
    /// sub-types, main descriptions and cost centers present in both files
    /// without differences. One-sided entries are kept. The summary is left
    /// as computed.
    pub fn retain_changes(&mut self) {
        for cc in &mut self.cost_centers {
            retain_main_changes(&mut cc.main_descriptions);
            if let Some(total) = &mut cc.cost_center_total {
                retain_field_changes(total);
            }
        }
        self.cost_centers.retain(|cc| !cc.in_both() || cc.any_differences());
        retain_main_changes(&mut self.overall_totals);
        retain_field_changes(&mut self.report_totals);
        retain_field_changes(&mut self.age_balance);
    }
}

fn retain_field_changes(section: &mut SectionComparison) {
    section.differences.retain(|d| !d.is_zero_diff);
}

fn retain_main_changes(mains: &mut Vec<MainDescriptionComparison>) {
    for md in mains.iter_mut() {
        retain_field_changes(&mut md.total);
        for st in &mut md.description_types {
            retain_field_changes(&mut st.section);
        }
        md.description_types
            .retain(|st| !st.section.in_both() || st.section.has_differences);
    }
    mains.retain(|md| !md.total.in_both() || md.any_differences());
}
