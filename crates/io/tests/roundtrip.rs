use std::path::Path;

use brdiff_core::{Category, ReportDocument, ReportSchema, SubType};
use brdiff_engine::ReportParser;
use brdiff_io::{export_normalized, json, load, IoError, LoadedReport, ReadOptions, ReportSheet};
use rust_decimal_macros::dec;

const SOURCE: &str = "\
Monthly Billing Report - March 2024,,,,
Region: North,,,,
,,,,
Printed 2024-04-02,,,,
,,,,
Description,Cost Center,Billing,Receipts,CR Bal
Connected,1A01840,\"1,000.50\",900,0
Nil,1A01840,0,0,0
Service Level: IST,1A01840,49.50,50,0
CC1A01840 Commercial Totals,,\"1,050.00\",950,0
Connected,1A01840,200,200,0
CC1A01840 Govt. Domestic Totals,,200,200,0
Cost Center Total,1A01840,\"1,250.00\",\"1,150\",0
Connected,,\"1,250.00\",\"1,150\",0
Commercial Totals,,\"1,250.00\",\"1,150\",0
Cost Centre Report Totals,,\"1,250.00\",\"1,150\",0
Age Balance %,,0,0,0
";

fn sheet(path: &Path) -> ReportSheet {
    match load(path, &ReadOptions::default()).unwrap() {
        LoadedReport::Sheet(sheet) => sheet,
        LoadedReport::Document(_) => panic!("expected rows from {}", path.display()),
    }
}

fn parse(sheet: &ReportSheet) -> ReportDocument {
    let mut doc = ReportParser::new(ReportSchema::standard(), false)
        .parse(&sheet.rows)
        .unwrap();
    doc.report_title = sheet.title.clone();
    doc
}

fn source_document(dir: &Path) -> (ReportSheet, ReportDocument) {
    let path = dir.join("march.csv");
    std::fs::write(&path, SOURCE).unwrap();
    let sheet = sheet(&path);
    let doc = parse(&sheet);
    (sheet, doc)
}

#[test]
fn csv_source_parses() {
    let dir = tempfile::tempdir().unwrap();
    let (sheet, doc) = source_document(dir.path());

    assert_eq!(sheet.title.as_deref(), Some("Monthly Billing Report - March 2024"));
    assert_eq!(sheet.header.len(), 6);
    assert_eq!(sheet.rows[0].line, 7);

    let cc = doc.cost_center("1A01840").unwrap();
    let commercial = cc.main_description(Category::Commercial).unwrap();
    assert_eq!(commercial.entry(SubType::Connected).unwrap().data.billing_total, dec!(1000.50));
    assert_eq!(commercial.entry(SubType::Ist).unwrap().data.billing_total, dec!(49.50));
    let govt = cc.main_description(Category::GovtDomestic).unwrap();
    assert_eq!(govt.main_total.receipts_total, dec!(200));
    assert_eq!(cc.cost_center_total.receipts_total, dec!(1150));
    assert_eq!(doc.report_totals.as_ref().unwrap().billing_total, dec!(1250));
}

#[test]
fn normalized_csv_reparses_to_the_same_document() {
    let dir = tempfile::tempdir().unwrap();
    let (sheet, doc) = source_document(dir.path());

    let out = dir.path().join("normalized.csv");
    export_normalized(&doc, &sheet.header, 6, &out).unwrap();

    let again = parse(&self::sheet(&out));
    assert_eq!(again, doc);
}

#[test]
fn normalized_xlsx_reparses_to_the_same_document() {
    let dir = tempfile::tempdir().unwrap();
    let (sheet, doc) = source_document(dir.path());

    let out = dir.path().join("normalized.xlsx");
    export_normalized(&doc, &sheet.header, 6, &out).unwrap();

    let again = parse(&self::sheet(&out));
    assert_eq!(again, doc);
}

#[test]
fn saved_json_loads_as_document() {
    let dir = tempfile::tempdir().unwrap();
    let (_, doc) = source_document(dir.path());

    let path = dir.path().join("march.json");
    json::save_document(&doc, &path).unwrap();
    match load(&path, &ReadOptions::default()).unwrap() {
        LoadedReport::Document(loaded) => assert_eq!(loaded, doc),
        LoadedReport::Sheet(_) => panic!("expected a document"),
    }
}

#[test]
fn errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.csv");
    assert!(matches!(load(&missing, &ReadOptions::default()), Err(IoError::Read { .. })));

    let pdf = dir.path().join("report.pdf");
    assert!(matches!(load(&pdf, &ReadOptions::default()), Err(IoError::UnsupportedFormat { .. })));

    let bad_json = dir.path().join("bad.json");
    std::fs::write(&bad_json, "{ not json").unwrap();
    assert!(matches!(load(&bad_json, &ReadOptions::default()), Err(IoError::Json { .. })));

    let doc = ReportDocument::default();
    let out = dir.path().join("out.txt");
    assert!(matches!(
        export_normalized(&doc, &[], 6, &out),
        Err(IoError::UnsupportedFormat { .. })
    ));
}

#[test]
fn named_sheet_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let (sheet, doc) = source_document(dir.path());
    let out = dir.path().join("normalized.xlsx");
    export_normalized(&doc, &sheet.header, 6, &out).unwrap();

    let options = ReadOptions {
        sheet: Some("Summary".into()),
        ..ReadOptions::default()
    };
    match load(&out, &options) {
        Err(IoError::SheetNotFound { name, available, .. }) => {
            assert_eq!(name, "Summary");
            assert_eq!(available, vec!["Normalized".to_string()]);
        }
        other => panic!("unexpected {other:?}"),
    }
}
