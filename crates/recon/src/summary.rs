use crate::model::{
    ComparisonSummary, CostCenterComparison, MainDescriptionComparison, SectionComparison,
};

/// Summary statistics for a finished comparison.
pub fn compute_summary(
    cost_centers: &[CostCenterComparison],
    overall_totals: &[MainDescriptionComparison],
    report_totals: &SectionComparison,
    age_balance: &SectionComparison,
) -> ComparisonSummary {
    let mut summary = ComparisonSummary {
        total_cost_centers: cost_centers.len(),
        ..Default::default()
    };

    for cc in cost_centers {
        match (cc.exists_in_file1, cc.exists_in_file2) {
            (true, true) => summary.matched_cost_centers += 1,
            (true, false) => summary.only_in_file1 += 1,
            (false, true) => summary.only_in_file2 += 1,
            (false, false) => {}
        }
        summary.with_differences += cc.main_descriptions.iter().filter(|m| m.any_differences()).count();
    }

    summary.overall_with_differences = overall_totals.iter().filter(|m| m.any_differences()).count()
        + usize::from(report_totals.has_differences)
        + usize::from(age_balance.has_differences);

    summary
}
