//! Row stream → raw report tree.
//!
//! Groups classified rows into cost centers and main-description blocks and
//! attaches the sub-type rows that precede each total. Nothing is synthesized
//! here: absent blocks and sub-types are represented by omission.

use brdiff_core::{Category, FinancialMetrics, RawRow, SubType};

use crate::classify::{Classification, RowClassifier, RowKind};

// ============================================================================
// Raw tree
// ============================================================================

/// A sub-type row attached to a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRow {
    pub sub_type: SubType,
    pub data: FinancialMetrics,
    pub line: usize,
}

/// One main-description block as found in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub category: Category,
    /// Stored total row; `None` for blocks rebuilt from a canonical document.
    pub total: Option<FinancialMetrics>,
    pub total_line: Option<usize>,
    /// Selected sub-type rows, at most one per type, in file order.
    pub sub_rows: Vec<SubRow>,
    /// Unselected rows from the wider safe zone, closest first.
    pub spare_rows: Vec<RawRow>,
}

impl RawBlock {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            total: None,
            total_line: None,
            sub_rows: Vec::new(),
            spare_rows: Vec::new(),
        }
    }

    pub fn sub_row(&self, sub_type: SubType) -> Option<&SubRow> {
        self.sub_rows.iter().find(|r| r.sub_type == sub_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCostCenter {
    pub code: String,
    /// Blocks in file order, at most one per category.
    pub blocks: Vec<RawBlock>,
    pub cost_center_total: Option<FinancialMetrics>,
}

impl RawCostCenter {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            blocks: Vec::new(),
            cost_center_total: None,
        }
    }

    pub fn block(&self, category: Category) -> Option<&RawBlock> {
        self.blocks.iter().find(|b| b.category == category)
    }
}

/// Row counts gathered while building, for logging and `parse` output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub data_rows: usize,
    pub blank_rows: usize,
    pub classified_rows: usize,
    pub unclassified_rows: usize,
    pub duplicate_blocks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReport {
    pub include_cst: bool,
    pub cost_centers: Vec<RawCostCenter>,
    pub overall: Vec<RawBlock>,
    pub report_totals: Option<FinancialMetrics>,
    pub age_balance: Option<FinancialMetrics>,
    pub stats: BuildStats,
}

impl RawReport {
    fn new(include_cst: bool) -> Self {
        Self {
            include_cst,
            cost_centers: Vec::new(),
            overall: Vec::new(),
            report_totals: None,
            age_balance: None,
            stats: BuildStats::default(),
        }
    }

    pub fn cost_center(&self, code: &str) -> Option<&RawCostCenter> {
        self.cost_centers.iter().find(|c| c.code == code)
    }

    /// Existing entry for `code`, or a new one appended in file order.
    fn cost_center_mut(&mut self, code: &str) -> &mut RawCostCenter {
        let idx = match self.cost_centers.iter().position(|c| c.code == code) {
            Some(idx) => idx,
            None => {
                self.cost_centers.push(RawCostCenter::new(code));
                self.cost_centers.len() - 1
            }
        };
        &mut self.cost_centers[idx]
    }

    /// True when nothing at all was recognized.
    pub fn is_empty(&self) -> bool {
        self.cost_centers.is_empty()
            && self.overall.is_empty()
            && self.report_totals.is_none()
            && self.age_balance.is_none()
    }
}

// ============================================================================
// Builder
// ============================================================================

pub struct TreeBuilder<'a> {
    classifier: &'a RowClassifier,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(classifier: &'a RowClassifier) -> Self {
        Self { classifier }
    }

    pub fn build(&self, rows: &[RawRow]) -> RawReport {
        let classes = self.classify_all(rows);
        let mut report = RawReport::new(self.classifier.include_cst());
        let lookback = self.classifier.schema().lookback_rows();
        let near = self.classifier.sub_types().len();

        for (idx, (row, class)) in rows.iter().zip(&classes).enumerate() {
            report.stats.data_rows += 1;
            if row.is_blank() {
                report.stats.blank_rows += 1;
                continue;
            }
            match class.kind {
                RowKind::Unclassified => report.stats.unclassified_rows += 1,
                _ => report.stats.classified_rows += 1,
            }

            match &class.kind {
                RowKind::MainTotal { code, category } => {
                    let window = Window {
                        code: Some(code),
                        near,
                        wide: lookback,
                    };
                    let block = self.block_at(rows, &classes, idx, *category, &window);
                    let cc = report.cost_center_mut(code);
                    if cc.block(*category).is_some() {
                        log::warn!(
                            "row {}: duplicate '{}' block for cost center {code}, keeping the first",
                            row.line,
                            category.label()
                        );
                        report.stats.duplicate_blocks += 1;
                        continue;
                    }
                    cc.blocks.push(block);
                }
                RowKind::CostCenterTotal { code } => {
                    let cc = report.cost_center_mut(code);
                    if cc.cost_center_total.is_some() {
                        log::debug!("row {}: replacing cost center {code} total", row.line);
                    }
                    cc.cost_center_total = Some(row.metrics());
                }
                RowKind::OverallTotal(category) => {
                    if report.overall.iter().any(|b| b.category == *category) {
                        log::warn!(
                            "row {}: duplicate overall '{}' block, keeping the first",
                            row.line,
                            category.label()
                        );
                        report.stats.duplicate_blocks += 1;
                        continue;
                    }
                    let window = Window {
                        code: None,
                        near: lookback,
                        wide: lookback,
                    };
                    let mut block = self.block_at(rows, &classes, idx, *category, &window);
                    // Overall blocks are never backfilled.
                    block.spare_rows.clear();
                    report.overall.push(block);
                }
                RowKind::ReportTotal => {
                    if report.report_totals.is_some() {
                        log::warn!("row {}: second report totals row ignored", row.line);
                    } else {
                        report.report_totals = Some(row.metrics());
                    }
                }
                RowKind::AgeBalance => {
                    if report.age_balance.is_some() {
                        log::warn!("row {}: second age balance row ignored", row.line);
                    } else {
                        report.age_balance = Some(row.metrics());
                    }
                }
                RowKind::SubType(_) | RowKind::Unclassified => {}
            }
        }

        log::debug!(
            "built {} cost center(s), {} overall block(s) from {} row(s)",
            report.cost_centers.len(),
            report.overall.len(),
            report.stats.data_rows
        );
        report
    }

    /// Classify every row, threading the current cost center through.
    fn classify_all(&self, rows: &[RawRow]) -> Vec<Classification> {
        let mut current: Option<String> = None;
        rows.iter()
            .map(|row| {
                let class = self.classifier.classify(row, current.as_deref());
                match &class.kind {
                    RowKind::MainTotal { code, .. } => current = Some(code.clone()),
                    RowKind::CostCenterTotal { .. }
                    | RowKind::OverallTotal(_)
                    | RowKind::ReportTotal
                    | RowKind::AgeBalance => current = None,
                    RowKind::SubType(_) | RowKind::Unclassified => {}
                }
                class
            })
            .collect()
    }

    fn block_at(
        &self,
        rows: &[RawRow],
        classes: &[Classification],
        idx: usize,
        category: Category,
        window: &Window<'_>,
    ) -> RawBlock {
        let mut block = RawBlock::new(category);
        block.total = Some(rows[idx].metrics());
        block.total_line = Some(rows[idx].line);

        let mut seen = 0;
        for j in (0..idx).rev() {
            if classes[j].kind.is_boundary() {
                break;
            }
            let row = &rows[j];
            if row.is_blank() {
                continue;
            }
            seen += 1;
            if seen > window.wide {
                break;
            }
            if !self.belongs(row, window.code) {
                continue;
            }
            if seen <= window.near {
                if let Some(sub_type) = classes[j].kind.sub_type() {
                    // Walking backwards, so the first hit per type is the closest.
                    if block.sub_row(sub_type).is_none() {
                        block.sub_rows.push(SubRow {
                            sub_type,
                            data: row.metrics(),
                            line: row.line,
                        });
                        continue;
                    }
                    log::debug!("row {}: duplicate {} row discarded", row.line, sub_type.label());
                }
            }
            block.spare_rows.push(row.clone());
        }
        block.sub_rows.reverse();
        block
    }

    /// Whether a candidate row may feed a block of cost center `code`
    /// (`None` for the overall section).
    fn belongs(&self, row: &RawRow, code: Option<&str>) -> bool {
        let row_code = self
            .classifier
            .code_in_text(row.description())
            .or(row.cost_center());
        match (code, row_code) {
            (_, None) => true,
            (Some(code), Some(row_code)) => code == row_code,
            (None, Some(_)) => false,
        }
    }
}

/// Search window for the sub-type rows preceding a total row.
struct Window<'c> {
    code: Option<&'c str>,
    /// Rows eligible as sub-type rows.
    near: usize,
    /// Rows kept as spares.
    wide: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use brdiff_core::ReportSchema;
    use rust_decimal::Decimal;

    fn row(line: usize, desc: &str, cc: &str, billing: i64) -> RawRow {
        RawRow::new(line, vec![desc.to_string(), cc.to_string(), billing.to_string()])
    }

    fn build(rows: &[RawRow], include_cst: bool) -> RawReport {
        let classifier = RowClassifier::new(ReportSchema::standard(), include_cst);
        TreeBuilder::new(&classifier).build(rows)
    }

    fn billing(m: &FinancialMetrics) -> i64 {
        m.billing_total.try_into().unwrap_or(i64::MIN)
    }

    #[test]
    fn groups_blocks_by_cost_center() {
        let rows = vec![
            row(7, "Connected", "1A01840", 1),
            row(8, "Nil", "1A01840", 2),
            row(9, "IST", "1A01840", 3),
            row(10, "CC1A01840 Commercial Totals", "", 6),
            row(11, "Connected", "1A01840", 10),
            row(12, "CC1A01840 Domestic Totals", "", 10),
            row(13, "Cost Center Total", "1A01840", 16),
            row(14, "Connected", "1B00001", 5),
            row(15, "CC1B00001 Commercial Totals", "", 5),
        ];
        let report = build(&rows, false);
        assert_eq!(report.cost_centers.len(), 2);

        let cc = report.cost_center("1A01840").unwrap();
        assert_eq!(cc.blocks.len(), 2);
        let commercial = cc.block(Category::Commercial).unwrap();
        assert_eq!(commercial.sub_rows.len(), 3);
        assert_eq!(commercial.sub_rows[0].sub_type, SubType::Connected);
        assert_eq!(billing(commercial.total.as_ref().unwrap()), 6);
        assert_eq!(commercial.total_line, Some(10));

        let domestic = cc.block(Category::Domestic).unwrap();
        assert_eq!(domestic.sub_rows.len(), 1);
        assert_eq!(billing(&domestic.sub_rows[0].data), 10);

        assert_eq!(billing(cc.cost_center_total.as_ref().unwrap()), 16);
        assert_eq!(report.stats.classified_rows, 9);
    }

    #[test]
    fn sub_rows_never_cross_a_previous_total() {
        let rows = vec![
            row(7, "Connected", "1A01840", 1),
            row(8, "CC1A01840 Commercial Totals", "", 1),
            row(9, "CC1A01840 Domestic Totals", "", 0),
        ];
        let report = build(&rows, false);
        let cc = report.cost_center("1A01840").unwrap();
        assert!(cc.block(Category::Domestic).unwrap().sub_rows.is_empty());
    }

    #[test]
    fn closest_duplicate_wins() {
        let rows = vec![
            row(7, "Nil", "1A01840", 1),
            row(8, "Nil", "1A01840", 2),
            row(9, "CC1A01840 Commercial Totals", "", 2),
        ];
        let report = build(&rows, false);
        let block = report.cost_centers[0].block(Category::Commercial).unwrap().clone();
        assert_eq!(block.sub_rows.len(), 1);
        assert_eq!(block.sub_rows[0].line, 8);
    }

    #[test]
    fn rows_beyond_near_window_become_spares() {
        let rows = vec![
            row(7, "Service Level: IST extra", "1A01840", 9),
            row(8, "Note", "1A01840", 0),
            row(9, "Note", "1A01840", 0),
            row(10, "Note", "1A01840", 0),
            row(11, "CC1A01840 Commercial Totals", "", 9),
        ];
        let report = build(&rows, false);
        let block = report.cost_centers[0].block(Category::Commercial).unwrap().clone();
        assert!(block.sub_rows.is_empty());
        assert_eq!(block.spare_rows.len(), 4);
        assert_eq!(block.spare_rows.last().unwrap().line, 7);
    }

    #[test]
    fn codes_reappearing_merge() {
        let rows = vec![
            row(7, "CC1A01840 Commercial Totals", "", 1),
            row(8, "CC1B00001 Commercial Totals", "", 2),
            row(9, "CC1A01840 Domestic Totals", "", 3),
            row(10, "CC1A01840 Domestic Totals", "", 4),
        ];
        let report = build(&rows, false);
        assert_eq!(report.cost_centers.len(), 2);
        let cc = report.cost_center("1A01840").unwrap();
        assert_eq!(cc.blocks.len(), 2);
        assert_eq!(billing(cc.block(Category::Domestic).unwrap().total.as_ref().unwrap()), 3);
        assert_eq!(report.stats.duplicate_blocks, 1);
    }

    #[test]
    fn overall_section_and_report_rows() {
        let rows = vec![
            row(7, "CC1A01840 Commercial Totals", "", 1),
            row(8, "Connected", "", 4),
            row(9, "Nil", "", 5),
            row(10, "Commercial Totals", "", 9),
            row(11, "Cost Centre Report Totals", "", 9),
            row(12, "Cost Center Report Totals", "", 99),
            row(13, "Age Balance %", "", 0),
        ];
        let report = build(&rows, false);
        assert_eq!(report.overall.len(), 1);
        let overall = &report.overall[0];
        assert_eq!(overall.category, Category::Commercial);
        assert_eq!(overall.sub_rows.len(), 2);
        assert!(overall.spare_rows.is_empty());
        assert_eq!(billing(report.report_totals.as_ref().unwrap()), 9);
        assert_eq!(report.age_balance.as_ref().unwrap().billing_total, Decimal::ZERO);
    }

    #[test]
    fn overall_ignores_coded_rows() {
        let rows = vec![
            row(7, "Connected", "1A01840", 4),
            row(8, "Commercial Totals", "", 4),
        ];
        let report = build(&rows, false);
        assert!(report.overall[0].sub_rows.is_empty());
    }

    #[test]
    fn uncoded_cost_center_total_uses_current() {
        let rows = vec![
            row(7, "CC1A01840 Commercial Totals", "", 1),
            row(8, "Cost Center Total", "", 1),
        ];
        let report = build(&rows, false);
        assert!(report.cost_centers[0].cost_center_total.is_some());
        assert!(report.report_totals.is_none());
    }

    #[test]
    fn empty_input() {
        let report = build(&[], false);
        assert!(report.is_empty());
        assert_eq!(report.stats, BuildStats::default());
    }
}
