//! Raw tree → canonical [`ReportDocument`].
//!
//! Every main description ends up with exactly the required sub-types in
//! canonical order. Stored totals are trusted; a total is only computed when
//! the file has none.

use brdiff_core::{
    Category, CostCenter, FinancialMetrics, MainDescription, ReportDocument, SubType, SubTypeEntry,
};

use crate::builder::{RawBlock, RawCostCenter, RawReport, SubRow};
use crate::matcher::strip_service_level;

#[derive(Debug, Clone)]
pub struct Normalizer {
    include_cst: bool,
    service_level_prefix: String,
}

impl Normalizer {
    pub fn new(include_cst: bool, service_level_prefix: impl Into<String>) -> Self {
        Self {
            include_cst,
            service_level_prefix: service_level_prefix.into(),
        }
    }

    pub fn include_cst(&self) -> bool {
        self.include_cst
    }

    pub fn normalize(&self, raw: &RawReport) -> ReportDocument {
        ReportDocument {
            report_title: None,
            include_cst: self.include_cst,
            cost_centers: raw.cost_centers.iter().map(|cc| self.cost_center(cc)).collect(),
            overall_totals: self.overall(&raw.overall),
            report_totals: raw.report_totals.clone(),
            age_balance: raw.age_balance.clone(),
        }
    }

    /// All eight categories in canonical order, plus the cost center total.
    /// Categories the file omits become zero blocks.
    pub fn cost_center(&self, raw: &RawCostCenter) -> CostCenter {
        let main_descriptions: Vec<MainDescription> = Category::ALL
            .iter()
            .map(|cat| match raw.block(*cat) {
                Some(block) => self.block(block, true),
                None => self.block(&RawBlock::new(*cat), false),
            })
            .collect();

        let cost_center_total = match &raw.cost_center_total {
            Some(total) => total.clone(),
            None => main_descriptions.iter().map(|m| &m.main_total).sum(),
        };

        CostCenter {
            code: raw.code.clone(),
            main_descriptions,
            cost_center_total,
        }
    }

    /// Always all eight categories; missing blocks and sub-types are zero.
    pub fn overall(&self, blocks: &[RawBlock]) -> Vec<MainDescription> {
        Category::ALL
            .iter()
            .map(|cat| match blocks.iter().find(|b| b.category == *cat) {
                Some(block) => self.block(block, false),
                None => self.block(&RawBlock::new(*cat), false),
            })
            .collect()
    }

    fn block(&self, block: &RawBlock, backfill: bool) -> MainDescription {
        let description_types: Vec<SubTypeEntry> = SubType::required(self.include_cst)
            .iter()
            .map(|st| {
                if let Some(row) = block.sub_row(*st) {
                    return SubTypeEntry {
                        sub_type: *st,
                        data: row.data.clone(),
                    };
                }
                if backfill {
                    if let Some(data) = self.backfill(block, *st) {
                        return SubTypeEntry { sub_type: *st, data };
                    }
                }
                SubTypeEntry::zero(*st)
            })
            .collect();

        let main_total = match &block.total {
            Some(total) => {
                let sum: FinancialMetrics = description_types.iter().map(|e| &e.data).sum();
                if sum != *total {
                    log::debug!(
                        "'{}' total differs from the sum of its sub-types; keeping the stored total",
                        block.category.label()
                    );
                }
                total.clone()
            }
            None => description_types.iter().map(|e| &e.data).sum(),
        };

        MainDescription {
            name: block.category,
            description_types,
            main_total,
        }
    }

    /// Closest spare row whose cleaned description starts with the sub-type label.
    fn backfill(&self, block: &RawBlock, sub_type: SubType) -> Option<FinancialMetrics> {
        let label = sub_type.label().to_lowercase();
        let row = block.spare_rows.iter().find(|row| {
            let (body, _) = strip_service_level(row.description(), &self.service_level_prefix);
            body.to_lowercase().starts_with(&label)
        })?;
        log::debug!(
            "row {}: backfilled {} for '{}'",
            row.line,
            sub_type.label(),
            block.category.label()
        );
        Some(row.metrics())
    }

    /// Re-run normalization over an already canonical document, e.g. after
    /// changing `include_cst`. A fixed point when the flag is unchanged.
    pub fn renormalize(&self, doc: &ReportDocument) -> ReportDocument {
        let overall: Vec<RawBlock> = doc.overall_totals.iter().map(RawBlock::from).collect();
        ReportDocument {
            report_title: doc.report_title.clone(),
            include_cst: self.include_cst,
            cost_centers: doc
                .cost_centers
                .iter()
                .map(|cc| self.cost_center(&RawCostCenter::from(cc)))
                .collect(),
            overall_totals: self.overall(&overall),
            report_totals: doc.report_totals.clone(),
            age_balance: doc.age_balance.clone(),
        }
    }
}

impl From<&MainDescription> for RawBlock {
    fn from(md: &MainDescription) -> Self {
        let mut block = RawBlock::new(md.name);
        block.total = Some(md.main_total.clone());
        block.sub_rows = md
            .description_types
            .iter()
            .map(|e| SubRow {
                sub_type: e.sub_type,
                data: e.data.clone(),
                line: 0,
            })
            .collect();
        block
    }
}

impl From<&CostCenter> for RawCostCenter {
    fn from(cc: &CostCenter) -> Self {
        Self {
            code: cc.code.clone(),
            blocks: cc.main_descriptions.iter().map(RawBlock::from).collect(),
            cost_center_total: Some(cc.cost_center_total.clone()),
        }
    }
}
