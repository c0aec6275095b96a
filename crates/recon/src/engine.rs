use brdiff_core::{Category, CostCenter, FinancialMetrics, MainDescription, ReportDocument, SubType};

use crate::diff::compare_section;
use crate::model::{
    ComparisonMeta, ComparisonResult, CostCenterComparison, MainDescriptionComparison,
    SubTypeComparison,
};
use crate::summary::compute_summary;

/// Compare two normalized documents. Pure: no IO, inputs untouched.
///
/// Missing structure on either side is reported through the existence flags
/// and never fails.
pub fn compare(doc1: &ReportDocument, doc2: &ReportDocument) -> ComparisonResult {
    let cost_centers: Vec<CostCenterComparison> = union_codes(doc1, doc2)
        .into_iter()
        .map(|code| compare_cost_center(code, doc1.cost_center(code), doc2.cost_center(code)))
        .collect();

    let overall_totals = compare_mains(&doc1.overall_totals, &doc2.overall_totals);
    let report_totals = compare_section(doc1.report_totals.as_ref(), doc2.report_totals.as_ref());
    let age_balance = compare_section(doc1.age_balance.as_ref(), doc2.age_balance.as_ref());

    let summary = compute_summary(&cost_centers, &overall_totals, &report_totals, &age_balance);
    log::debug!(
        "compared {} cost center(s): {} matched, {} main description(s) differ",
        summary.total_cost_centers,
        summary.matched_cost_centers,
        summary.with_differences
    );

    ComparisonResult {
        meta: ComparisonMeta {
            comparison_name: None,
            file1_title: doc1.report_title.clone(),
            file2_title: doc2.report_title.clone(),
            include_cst: doc1.include_cst || doc2.include_cst,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        summary,
        cost_centers,
        overall_totals,
        report_totals,
        age_balance,
    }
}

/// File-1 order, then codes only in file 2.
fn union_codes<'d>(doc1: &'d ReportDocument, doc2: &'d ReportDocument) -> Vec<&'d str> {
    let mut codes: Vec<&str> = Vec::new();
    for code in doc1.codes().chain(doc2.codes()) {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

fn compare_cost_center(
    code: &str,
    cc1: Option<&CostCenter>,
    cc2: Option<&CostCenter>,
) -> CostCenterComparison {
    let (main_descriptions, cost_center_total) = match (cc1, cc2) {
        (Some(a), Some(b)) => {
            let mains = compare_mains(&a.main_descriptions, &b.main_descriptions);
            // Recomputed from the main totals present in both files, so a
            // block missing on one side does not show up twice.
            let (t1, t2) = matched_totals(a, b);
            (mains, Some(compare_section(Some(&t1), Some(&t2))))
        }
        _ => (Vec::new(), None),
    };

    CostCenterComparison {
        code: code.to_string(),
        exists_in_file1: cc1.is_some(),
        exists_in_file2: cc2.is_some(),
        main_descriptions,
        cost_center_total,
    }
}

fn matched_totals(a: &CostCenter, b: &CostCenter) -> (FinancialMetrics, FinancialMetrics) {
    let mut t1 = FinancialMetrics::zero();
    let mut t2 = FinancialMetrics::zero();
    for md1 in &a.main_descriptions {
        if let Some(md2) = b.main_description(md1.name) {
            t1 += &md1.main_total;
            t2 += &md2.main_total;
        }
    }
    (t1, t2)
}

/// One comparison per category present on either side, in canonical order.
fn compare_mains(
    mains1: &[MainDescription],
    mains2: &[MainDescription],
) -> Vec<MainDescriptionComparison> {
    Category::ALL
        .iter()
        .filter_map(|name| {
            let md1 = mains1.iter().find(|m| m.name == *name);
            let md2 = mains2.iter().find(|m| m.name == *name);
            if md1.is_none() && md2.is_none() {
                return None;
            }
            Some(compare_main(*name, md1, md2))
        })
        .collect()
}

fn compare_main(
    name: Category,
    md1: Option<&MainDescription>,
    md2: Option<&MainDescription>,
) -> MainDescriptionComparison {
    let total = compare_section(md1.map(|m| &m.main_total), md2.map(|m| &m.main_total));

    let description_types = match (md1, md2) {
        (Some(a), Some(b)) => SubType::required(true)
            .iter()
            .filter_map(|st| {
                let e1 = a.entry(*st).map(|e| &e.data);
                let e2 = b.entry(*st).map(|e| &e.data);
                if e1.is_none() && e2.is_none() {
                    return None;
                }
                Some(SubTypeComparison {
                    sub_type: *st,
                    section: compare_section(e1, e2),
                })
            })
            .collect(),
        _ => Vec::new(),
    };

    MainDescriptionComparison {
        name,
        total,
        description_types,
    }
}
