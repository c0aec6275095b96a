use brdiff_core::{Category, RawRow, ReportDocument, ReportSchema, SubType};
use brdiff_engine::{align_cst, ReportParser};
use brdiff_recon::compare;
use rust_decimal_macros::dec;

/// Rows in the sheet layout: description, cost center, then the value columns
/// starting at billing total. Line numbers start after a 6-row header.
fn rows(spec: &[(&str, &str, &[&str])]) -> Vec<RawRow> {
    spec.iter()
        .enumerate()
        .map(|(i, (desc, cc, values))| {
            let mut cells = vec![desc.to_string(), cc.to_string()];
            cells.extend(values.iter().map(|v| v.to_string()));
            RawRow::new(i + 7, cells)
        })
        .collect()
}

fn parse(spec: &[(&str, &str, &[&str])], include_cst: bool) -> ReportDocument {
    ReportParser::new(ReportSchema::standard(), include_cst)
        .parse(&rows(spec))
        .unwrap()
}

fn january() -> ReportDocument {
    parse(
        &[
            ("Connected", "1A01840", &["1,000", "900", "0", "10"]),
            ("Nil", "1A01840", &["0", "0", "0", "2"]),
            ("IST", "1A01840", &["50", "50", "0", "1"]),
            ("CC1A01840 Commercial Totals", "", &["1,050", "950", "0", "13"]),
            ("Connected", "1A01840", &["200", "200", "0", "4"]),
            ("CC1A01840 Domestic Totals", "", &["200", "200", "0", "4"]),
            ("Cost Center Total", "1A01840", &["1,250", "1,150", "0", "17"]),
            ("Connected", "1B00002", &["70", "70", "0", "1"]),
            ("CC1B00002 Industrial Totals", "", &["70", "70", "0", "1"]),
            ("Connected", "", &["1,270", "1,220", "0", "15"]),
            ("Commercial Totals", "", &["1,270", "1,220", "0", "15"]),
            ("Cost Centre Report Totals", "", &["1,320", "1,220", "0", "18"]),
            ("Age Balance %", "", &["0", "0", "0", "0"]),
        ],
        false,
    )
}

// -------------------------------------------------------------------------
// Identical inputs
// -------------------------------------------------------------------------

#[test]
fn identical_documents_have_no_differences() {
    let doc = january();
    let result = compare(&doc, &doc);

    assert_eq!(result.summary.total_cost_centers, 2);
    assert_eq!(result.summary.matched_cost_centers, 2);
    assert_eq!(result.summary.only_in_file1, 0);
    assert_eq!(result.summary.only_in_file2, 0);
    assert_eq!(result.summary.with_differences, 0);
    assert_eq!(result.summary.overall_with_differences, 0);
    assert!(!result.has_differences());

    // Every field is still emitted.
    let md = &result.cost_centers[0].main_descriptions[0];
    assert_eq!(md.total.differences.len(), 33);
    assert!(md.total.differences.iter().all(|d| d.is_zero_diff));
}

// -------------------------------------------------------------------------
// Differences
// -------------------------------------------------------------------------

#[test]
fn changed_sub_type_is_reported_at_both_levels() {
    let jan = january();
    let feb = parse(
        &[
            ("Connected", "1A01840", &["1,100", "900", "0", "10"]),
            ("Nil", "1A01840", &["0", "0", "0", "2"]),
            ("IST", "1A01840", &["50", "50", "0", "1"]),
            ("CC1A01840 Commercial Totals", "", &["1,150", "950", "0", "13"]),
            ("Connected", "1A01840", &["200", "200", "0", "4"]),
            ("CC1A01840 Domestic Totals", "", &["200", "200", "0", "4"]),
        ],
        false,
    );
    let result = compare(&jan, &feb);

    let cc = &result.cost_centers[0];
    assert_eq!(cc.code, "1A01840");
    let commercial = &cc.main_descriptions[0];
    assert_eq!(commercial.name, Category::Commercial);
    let billing = &commercial.total.differences[0];
    assert_eq!(billing.value1, dec!(1050));
    assert_eq!(billing.value2, dec!(1150));
    assert_eq!(billing.difference, dec!(-100));

    let connected = &commercial.description_types[0];
    assert_eq!(connected.sub_type, SubType::Connected);
    assert!(connected.section.has_differences);
    assert!(!commercial.description_types[1].section.has_differences);

    // Synthetic total over the two matched blocks.
    let total = cc.cost_center_total.as_ref().unwrap();
    assert_eq!(total.differences[0].value1, dec!(1250));
    assert_eq!(total.differences[0].value2, dec!(1350));

    assert_eq!(result.summary.with_differences, 1);
    assert_eq!(result.summary.only_in_file1, 1);
    // Report totals and age balance only exist in January.
    assert!(result.report_totals.exists_in_file1 && !result.report_totals.exists_in_file2);
    assert!(result.has_differences());
}

#[test]
fn cost_center_only_in_second_file() {
    let jan = january();
    let mut feb = jan.clone();
    let mut extra = feb.cost_centers[1].clone();
    extra.code = "1C00003".into();
    feb.cost_centers.push(extra);

    let result = compare(&jan, &feb);
    assert_eq!(result.summary.total_cost_centers, 3);
    assert_eq!(result.summary.only_in_file2, 1);
    let last = result.cost_centers.last().unwrap();
    assert_eq!(last.code, "1C00003");
    assert!(!last.exists_in_file1 && last.exists_in_file2);
    assert!(last.main_descriptions.is_empty());
    assert!(last.cost_center_total.is_none());
}

#[test]
fn cst_alignment_before_compare() {
    let jan = january();
    let feb = parse(
        &[
            ("Connected", "1A01840", &["1,000", "900", "0", "10"]),
            ("Nil", "1A01840", &["0", "0", "0", "2"]),
            ("IST", "1A01840", &["50", "50", "0", "1"]),
            ("CST", "1A01840", &["0", "0", "0", "0"]),
            ("CC1A01840 Commercial Totals", "", &["1,050", "950", "0", "13"]),
        ],
        true,
    );
    let (jan, feb) = align_cst(jan, feb);
    assert!(jan.include_cst);

    let result = compare(&jan, &feb);
    let commercial = &result.cost_centers[0].main_descriptions[0];
    assert_eq!(commercial.description_types.len(), 4);
    assert!(commercial.description_types.iter().all(|t| !t.section.has_differences));
    // February has no Domestic block, so it is zero there.
    assert_eq!(result.summary.with_differences, 1);
    assert_eq!(result.cost_centers[0].main_descriptions[1].name, Category::Domestic);
}

#[test]
fn changes_only_keeps_just_the_differences() {
    let jan = january();
    let mut feb = jan.clone();
    feb.cost_centers[0].main_descriptions[1].main_total.no_accounts = 5;

    let mut result = compare(&jan, &feb);
    let summary = result.summary.clone();
    result.retain_changes();

    assert_eq!(result.summary, summary);
    assert_eq!(result.cost_centers.len(), 1);
    let mains = &result.cost_centers[0].main_descriptions;
    assert_eq!(mains.len(), 1);
    assert_eq!(mains[0].name, Category::Domestic);
    assert_eq!(mains[0].total.differences.len(), 1);
    assert_eq!(mains[0].total.differences[0].display_name, "Number of Accounts");
    assert!(mains[0].description_types.is_empty());
    assert!(result.overall_totals.is_empty());
}

#[test]
fn result_serializes_with_stable_keys() {
    let doc = january();
    let json = serde_json::to_value(compare(&doc, &doc)).unwrap();
    assert!(json["summary"]["matched_cost_centers"].is_number());
    let cc = &json["cost_centers"][0];
    assert_eq!(cc["code"], "1A01840");
    let md = &cc["main_descriptions"][0];
    assert_eq!(md["name"], "Commercial Totals");
    assert_eq!(md["exists_in_file1"], true);
    assert_eq!(md["description_types"][0]["type"], "Connected");
    assert_eq!(md["differences"][0]["field"], "billing_total");
}

// -------------------------------------------------------------------------
// Synthesized structure
// -------------------------------------------------------------------------

/// One cost center whose Commercial/Connected billing is `billing`; every
/// other block is synthesized by the normalizer.
fn single_connected(billing: rust_decimal::Decimal) -> ReportDocument {
    use brdiff_core::FinancialMetrics;
    use brdiff_engine::builder::SubRow;
    use brdiff_engine::{Normalizer, RawBlock, RawCostCenter};

    let mut data = FinancialMetrics::zero();
    data.billing_total = billing;
    let mut block = RawBlock::new(Category::Commercial);
    block.sub_rows.push(SubRow {
        sub_type: SubType::Connected,
        data,
        line: 7,
    });
    let mut raw = RawCostCenter::new("1A01840");
    raw.blocks.push(block);

    let normalizer = Normalizer::new(false, "Service Level:");
    ReportDocument {
        cost_centers: vec![normalizer.cost_center(&raw)],
        overall_totals: normalizer.overall(&[]),
        ..Default::default()
    }
}

#[test]
fn single_billing_difference_cascades() {
    let result = compare(&single_connected(dec!(1100)), &single_connected(dec!(1000)));
    let cc = &result.cost_centers[0];
    assert_eq!(cc.main_descriptions.len(), 8);

    let commercial = &cc.main_descriptions[0];
    let connected = &commercial.description_types[0];
    let changed: Vec<_> = connected.section.differences.iter().filter(|d| !d.is_zero_diff).collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].field, "billing_total");
    assert_eq!(changed[0].difference, dec!(100));
    assert_eq!(changed[0].percentage_change, Some(dec!(10)));

    assert!(commercial.total.has_differences);
    assert!(cc.cost_center_total.as_ref().unwrap().has_differences);
    for md in &cc.main_descriptions[1..] {
        assert!(md.total.differences.iter().all(|d| d.is_zero_diff));
        assert_eq!(md.total.differences.len(), 33);
    }
    assert_eq!(result.summary.with_differences, 1);
    assert_eq!(result.summary.overall_with_differences, 0);
}

#[test]
fn cost_center_only_in_first_file_is_not_diffed() {
    let result = compare(&single_connected(dec!(1)), &ReportDocument::default());
    let cc = &result.cost_centers[0];
    assert!(cc.exists_in_file1 && !cc.exists_in_file2);
    assert!(cc.main_descriptions.is_empty());
    assert_eq!(result.summary.only_in_file1, 1);
    assert_eq!(result.summary.with_differences, 0);
}

#[test]
fn blocks_absent_in_both_files_compare_as_zero() {
    let result = compare(&single_connected(dec!(5)), &single_connected(dec!(5)));
    let govt = result.cost_centers[0]
        .main_descriptions
        .iter()
        .find(|m| m.name == Category::GovtQuarters)
        .unwrap();
    assert!(govt.total.in_both());
    assert!(govt.total.differences.iter().all(|d| d.is_zero_diff && d.value1.is_zero()));
    assert_eq!(govt.description_types.len(), 3);
}
