// Output formatting for `brdiff compare` and `brdiff parse`.
// Pure functions: results in, strings and serializable values out.
// No IO, no clap.

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use brdiff_recon::{ComparisonResult, MainDescriptionComparison, SectionComparison};

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// A result document with its generation timestamp first.
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    pub generated_at: String,
    #[serde(flatten)]
    pub body: &'a T,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    pub fn new(body: &'a T, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            body,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Human-readable comparison report: header, summary, then every section
/// that differs or exists on one side only.
pub fn render_text(result: &ComparisonResult, file1: &str, file2: &str) -> String {
    let mut out = String::new();
    let meta = &result.meta;

    if let Some(name) = &meta.comparison_name {
        let _ = writeln!(out, "comparison: {name}");
    }
    let _ = writeln!(out, "file 1: {file1}{}", title_suffix(meta.file1_title.as_deref()));
    let _ = writeln!(out, "file 2: {file2}{}", title_suffix(meta.file2_title.as_deref()));
    let _ = writeln!(
        out,
        "CST: {}",
        if meta.include_cst { "included" } else { "not included" }
    );
    out.push('\n');

    let s = &result.summary;
    let _ = writeln!(
        out,
        "cost centers: {} ({} matched, {} only in file 1, {} only in file 2)",
        s.total_cost_centers, s.matched_cost_centers, s.only_in_file1, s.only_in_file2
    );
    let _ = writeln!(out, "main descriptions with differences: {}", s.with_differences);
    let _ = writeln!(out, "overall sections with differences: {}", s.overall_with_differences);

    let mut body = String::new();
    for cc in &result.cost_centers {
        let mut lines = Vec::new();
        match (cc.exists_in_file1, cc.exists_in_file2) {
            (true, false) => lines.push("  only in file 1".to_string()),
            (false, true) => lines.push("  only in file 2".to_string()),
            _ => {
                for md in &cc.main_descriptions {
                    main_lines(&mut lines, md);
                }
                if let Some(total) = &cc.cost_center_total {
                    section_lines(&mut lines, 2, "Cost Center Total", total);
                }
            }
        }
        if !lines.is_empty() {
            let _ = writeln!(body, "\ncost center {}", cc.code);
            push_lines(&mut body, &lines);
        }
    }

    let mut overall = Vec::new();
    for md in &result.overall_totals {
        main_lines(&mut overall, md);
    }
    section_lines(&mut overall, 2, "Report Totals", &result.report_totals);
    section_lines(&mut overall, 2, "Age Balance", &result.age_balance);
    if !overall.is_empty() {
        body.push_str("\noverall\n");
        push_lines(&mut body, &overall);
    }

    if body.is_empty() {
        out.push_str("\nno differences\n");
    } else {
        out.push_str(&body);
    }
    out
}

fn title_suffix(title: Option<&str>) -> String {
    title.map(|t| format!(" ({t})")).unwrap_or_default()
}

fn push_lines(out: &mut String, lines: &[String]) {
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}

fn main_lines(lines: &mut Vec<String>, md: &MainDescriptionComparison) {
    let mut inner = Vec::new();
    section_lines(&mut inner, 4, "total", &md.total);
    for st in &md.description_types {
        section_lines(&mut inner, 4, st.sub_type.label(), &st.section);
    }
    if !inner.is_empty() {
        lines.push(format!("  {}", md.name.label()));
        lines.extend(inner);
    }
}

fn section_lines(lines: &mut Vec<String>, indent: usize, label: &str, section: &SectionComparison) {
    let pad = " ".repeat(indent);
    match (section.exists_in_file1, section.exists_in_file2) {
        (false, false) => {}
        (true, false) => lines.push(format!("{pad}{label}: only in file 1")),
        (false, true) => lines.push(format!("{pad}{label}: only in file 2")),
        (true, true) if section.has_differences => {
            lines.push(format!("{pad}{label}"));
            for d in section.differences.iter().filter(|d| !d.is_zero_diff) {
                lines.push(format!(
                    "{pad}  {}: {} vs {} (diff {}{})",
                    d.display_name,
                    d.value1,
                    d.value2,
                    signed(d.difference),
                    d.percentage_change
                        .map(|p| format!(", {}%", signed(p.round_dp(2).normalize())))
                        .unwrap_or_default()
                ));
            }
        }
        (true, true) => {}
    }
}

fn signed(value: Decimal) -> String {
    if value.is_sign_positive() && !value.is_zero() {
        format!("+{value}")
    } else {
        value.to_string()
    }
}
