//! Render a [`ReportDocument`] back into sheet rows in the canonical layout.
//!
//! Per cost center: each main description's sub-type rows followed by its
//! `CC<code> <label>` total, then the cost center total and a blank row.
//! Then the overall section, the report totals and the age balance. Parsing
//! the output again yields the same document, except that an absent report
//! total or age balance comes back as a zero row.

use brdiff_core::columns::write_row;
use brdiff_core::{FinancialMetrics, MainDescription, ReportDocument};

pub const COST_CENTER_TOTAL_LABEL: &str = "Cost Center Totals";
pub const REPORT_TOTAL_LABEL: &str = "Cost Centre Report Totals";
pub const AGE_BALANCE_LABEL: &str = "Age Balance %";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Header,
    Detail,
    Total,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub cells: Vec<String>,
    pub style: RowStyle,
}

impl OutputRow {
    fn blank() -> Self {
        Self {
            cells: Vec::new(),
            style: RowStyle::Blank,
        }
    }

    fn detail(cells: Vec<String>) -> Self {
        Self {
            cells,
            style: RowStyle::Detail,
        }
    }

    fn total(cells: Vec<String>) -> Self {
        Self {
            cells,
            style: RowStyle::Total,
        }
    }

    /// Label only, all value cells empty.
    fn placeholder(label: &str) -> Self {
        Self::total(vec![label.to_string()])
    }
}

/// Header block for the output: the source header padded or cut to
/// `header_rows`, or a title row plus blanks when there is no source header.
pub fn header_block(doc: &ReportDocument, source: &[Vec<String>], header_rows: usize) -> Vec<OutputRow> {
    let mut rows: Vec<OutputRow> = source
        .iter()
        .take(header_rows)
        .map(|cells| OutputRow {
            cells: cells.clone(),
            style: RowStyle::Header,
        })
        .collect();
    if rows.is_empty() && header_rows > 0 {
        let title = doc
            .report_title
            .clone()
            .unwrap_or_else(|| "Normalized Report".to_string());
        rows.push(OutputRow {
            cells: vec![title],
            style: RowStyle::Header,
        });
    }
    while rows.len() < header_rows {
        rows.push(OutputRow::blank());
    }
    rows
}

/// Full normalized sheet: header block, then the canonical data rows.
pub fn normalized_rows(doc: &ReportDocument, source_header: &[Vec<String>], header_rows: usize) -> Vec<OutputRow> {
    let mut rows = header_block(doc, source_header, header_rows);

    for cc in &doc.cost_centers {
        for md in &cc.main_descriptions {
            push_block(&mut rows, md, Some(&cc.code));
        }
        rows.push(OutputRow::total(write_row(COST_CENTER_TOTAL_LABEL, &cc.code, &cc.cost_center_total)));
        rows.push(OutputRow::blank());
    }

    for md in &doc.overall_totals {
        push_block(&mut rows, md, None);
    }

    push_singleton(&mut rows, REPORT_TOTAL_LABEL, doc.report_totals.as_ref());
    rows.push(OutputRow::blank());
    push_singleton(&mut rows, AGE_BALANCE_LABEL, doc.age_balance.as_ref());
    rows
}

fn push_block(rows: &mut Vec<OutputRow>, md: &MainDescription, code: Option<&str>) {
    let code_cell = code.unwrap_or("");
    for entry in &md.description_types {
        rows.push(OutputRow::detail(write_row(entry.sub_type.label(), code_cell, &entry.data)));
    }
    let label = match code {
        Some(code) => format!("CC{code} {}", md.name.label()),
        None => md.name.label().to_string(),
    };
    rows.push(OutputRow::total(write_row(&label, code_cell, &md.main_total)));
}

fn push_singleton(rows: &mut Vec<OutputRow>, label: &str, metrics: Option<&FinancialMetrics>) {
    match metrics {
        Some(m) => rows.push(OutputRow::total(write_row(label, "", m))),
        None => rows.push(OutputRow::placeholder(label)),
    }
}
