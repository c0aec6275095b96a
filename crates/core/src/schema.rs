//! Fixed label tables of the billing report.
//!
//! A [`ReportSchema`] is built once (standard tables plus any user aliases) and
//! handed to the classifier and normalizer; it is never mutated afterwards.

use crate::model::Category;

/// A spelling of a main description label that resolves to a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSpelling {
    pub text: String,
    pub category: Category,
}

#[derive(Debug, Clone)]
pub struct ReportSchema {
    main_labels: Vec<LabelSpelling>,
    report_total_labels: Vec<String>,
    age_balance_labels: Vec<String>,
    cost_center_total_markers: Vec<String>,
    service_level_prefix: String,
    lookback_rows: usize,
}

/// Default bound on how far back sub-type rows are searched.
pub const DEFAULT_LOOKBACK_ROWS: usize = 10;

impl Default for ReportSchema {
    fn default() -> Self {
        Self::standard()
    }
}

impl ReportSchema {
    /// The labels used by the billing export, including the two known
    /// alternative spellings of the government categories.
    pub fn standard() -> Self {
        let mut main_labels: Vec<LabelSpelling> = Category::ALL
            .iter()
            .map(|c| LabelSpelling {
                text: c.label().to_string(),
                category: *c,
            })
            .collect();
        main_labels.push(LabelSpelling {
            text: "Govt. Domestic Totals".into(),
            category: Category::GovtDomestic,
        });
        main_labels.push(LabelSpelling {
            text: "Govt.  Premises Totals".into(),
            category: Category::GovtPremises,
        });

        Self {
            main_labels,
            report_total_labels: vec![
                "Cost Center Report Totals".into(),
                "Cost Centre Report Totals".into(),
            ],
            age_balance_labels: vec!["Age Balance %".into()],
            cost_center_total_markers: vec!["Cost Center Total".into(), "Cost Centre Total".into()],
            service_level_prefix: "Service Level:".into(),
            lookback_rows: DEFAULT_LOOKBACK_ROWS,
        }
    }

    /// Accept an additional spelling for a category. Duplicate spellings are ignored.
    pub fn with_alias(mut self, text: impl Into<String>, category: Category) -> Self {
        let text = text.into();
        if !self.main_labels.iter().any(|l| l.text == text) {
            self.main_labels.push(LabelSpelling { text, category });
        }
        self
    }

    pub fn with_lookback_rows(mut self, rows: usize) -> Self {
        self.lookback_rows = rows.max(1);
        self
    }

    pub fn main_labels(&self) -> &[LabelSpelling] {
        &self.main_labels
    }

    pub fn report_total_labels(&self) -> &[String] {
        &self.report_total_labels
    }

    pub fn age_balance_labels(&self) -> &[String] {
        &self.age_balance_labels
    }

    pub fn cost_center_total_markers(&self) -> &[String] {
        &self.cost_center_total_markers
    }

    pub fn service_level_prefix(&self) -> &str {
        &self.service_level_prefix
    }

    pub fn lookback_rows(&self) -> usize {
        self.lookback_rows
    }
}
