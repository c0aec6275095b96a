use regex::Regex;

use brdiff_core::{Category, RawRow, ReportSchema, SubType};

use crate::matcher::{best_match, clean_label, strip_service_level, MatchContext, MatchStrategy};

const TOTALS_KEYWORD: &[&str] = &["Totals"];
const REPORT_KEYWORDS: &[&str] = &["Report", "Total"];
const AGE_KEYWORDS: &[&str] = &["Age", "Balance", "%"];
const REPORT_STEMS: [&str; 2] = ["Cost Center", "Cost Centre"];

/// What a single report row is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// Connected / Nil / IST / CST detail row.
    SubType(SubType),
    /// `CC<code> <category>` total row.
    MainTotal { code: String, category: Category },
    /// Total of one cost center.
    CostCenterTotal { code: String },
    /// Category total outside any cost center.
    OverallTotal(Category),
    /// "Cost Center Report Totals".
    ReportTotal,
    /// "Age Balance %".
    AgeBalance,
    Unclassified,
}

impl RowKind {
    /// Total-type rows delimit blocks; sub-type rows are never searched past them.
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            Self::MainTotal { .. }
                | Self::CostCenterTotal { .. }
                | Self::OverallTotal(_)
                | Self::ReportTotal
                | Self::AgeBalance
        )
    }

    pub fn sub_type(&self) -> Option<SubType> {
        match self {
            Self::SubType(st) => Some(*st),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: RowKind,
    /// Canonical label for the row (empty when unclassified).
    pub label: String,
    /// Strategy that produced the match, if any.
    pub strategy: Option<MatchStrategy>,
}

impl Classification {
    fn new(kind: RowKind, label: impl Into<String>, strategy: MatchStrategy) -> Self {
        Self {
            kind,
            label: label.into(),
            strategy: Some(strategy),
        }
    }

    fn unclassified() -> Self {
        Self {
            kind: RowKind::Unclassified,
            label: String::new(),
            strategy: None,
        }
    }
}

/// Labels raw rows. Never fails: anything unrecognized is `Unclassified`.
#[derive(Debug, Clone)]
pub struct RowClassifier {
    schema: ReportSchema,
    include_cst: bool,
    cc_pattern: Regex,
}

impl RowClassifier {
    pub fn new(schema: ReportSchema, include_cst: bool) -> Self {
        Self {
            schema,
            include_cst,
            cc_pattern: Regex::new(r"^CC(\w{7})\s+\S").expect("cost center pattern is valid"),
        }
    }

    pub fn schema(&self) -> &ReportSchema {
        &self.schema
    }

    pub fn include_cst(&self) -> bool {
        self.include_cst
    }

    pub fn sub_types(&self) -> &'static [SubType] {
        SubType::required(self.include_cst)
    }

    /// Classify one row. `current_cost_center` is the code of the last
    /// main-total row seen, used for total rows that carry no code of their own.
    pub fn classify(&self, row: &RawRow, current_cost_center: Option<&str>) -> Classification {
        let desc = row.description();
        if desc.is_empty() {
            return Classification::unclassified();
        }

        let text_code = self.code_in_text(desc);
        let code = text_code.or(row.cost_center());

        let class = match code {
            Some(code) => self.classify_cost_center_row(desc, code),
            None => self.classify_overall_row(desc, current_cost_center),
        };
        let class = class.or_else(|| self.match_sub_type(desc, code));

        match class {
            Some(c) => {
                log::debug!("row {}: {:?} via {:?} ({desc:?})", row.line, c.kind, c.strategy);
                c
            }
            None => {
                log::debug!("row {}: unclassified ({desc:?})", row.line);
                Classification::unclassified()
            }
        }
    }

    /// Code from a `CC<code> <label>` description.
    pub fn code_in_text<'t>(&self, desc: &'t str) -> Option<&'t str> {
        self.cc_pattern
            .captures(desc)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    fn classify_cost_center_row(&self, desc: &str, code: &str) -> Option<Classification> {
        if self.is_cost_center_total(desc) {
            return Some(Classification::new(
                RowKind::CostCenterTotal { code: code.to_string() },
                "Cost Center Totals",
                MatchStrategy::ContainsWithKeyword,
            ));
        }
        let (category, strategy) = self.match_main(desc, Some(code))?;
        Some(Classification::new(
            RowKind::MainTotal {
                code: code.to_string(),
                category,
            },
            format!("CC{code} {}", category.label()),
            strategy,
        ))
    }

    fn classify_overall_row(&self, desc: &str, current_cost_center: Option<&str>) -> Option<Classification> {
        if let Some(strategy) = self.match_report_total(desc) {
            return Some(Classification::new(RowKind::ReportTotal, "Cost Centre Report Totals", strategy));
        }
        if let Some(strategy) = self.match_age_balance(desc) {
            return Some(Classification::new(RowKind::AgeBalance, "Age Balance %", strategy));
        }
        if self.is_cost_center_total(desc) {
            // A cost center total without its own code closes the current cost
            // center; with no cost center open it can only be the report total.
            let kind = match current_cost_center {
                Some(code) => RowKind::CostCenterTotal { code: code.to_string() },
                None => RowKind::ReportTotal,
            };
            let label = match kind {
                RowKind::ReportTotal => "Cost Centre Report Totals",
                _ => "Cost Center Totals",
            };
            return Some(Classification::new(kind, label, MatchStrategy::ContainsWithKeyword));
        }
        let (category, strategy) = self.match_main(desc, None)?;
        Some(Classification::new(RowKind::OverallTotal(category), category.label(), strategy))
    }

    fn match_main(&self, desc: &str, code: Option<&str>) -> Option<(Category, MatchStrategy)> {
        let candidates = self
            .schema
            .main_labels()
            .iter()
            .map(|l| (l.text.as_str(), l.category));
        let ctx = MatchContext {
            cost_center: code,
            keywords: TOTALS_KEYWORD,
        };
        best_match(desc, candidates, &ctx)
    }

    fn match_report_total(&self, desc: &str) -> Option<MatchStrategy> {
        let labels = self.schema.report_total_labels().iter().map(|l| (l.as_str(), ()));
        let strict = MatchContext::default();
        for strategy in [MatchStrategy::Exact, MatchStrategy::StartsWith] {
            if labels.clone().any(|(l, _)| strategy.matches(desc, l, &strict)) {
                return Some(strategy);
            }
        }
        let ctx = MatchContext {
            cost_center: None,
            keywords: REPORT_KEYWORDS,
        };
        REPORT_STEMS
            .iter()
            .any(|stem| MatchStrategy::ContainsWithKeyword.matches(desc, stem, &ctx))
            .then_some(MatchStrategy::ContainsWithKeyword)
    }

    fn match_age_balance(&self, desc: &str) -> Option<MatchStrategy> {
        let labels = self.schema.age_balance_labels();
        let strict = MatchContext::default();
        for strategy in [MatchStrategy::Exact, MatchStrategy::StartsWith] {
            if labels.iter().any(|l| strategy.matches(desc, l, &strict)) {
                return Some(strategy);
            }
        }
        let ctx = MatchContext {
            cost_center: None,
            keywords: AGE_KEYWORDS,
        };
        // "Age" must be a word of its own: "Average Balance" is not this row.
        let age_word = desc
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| w.eq_ignore_ascii_case("age"));
        (age_word && MatchStrategy::ContainsWithKeyword.matches(desc, "Age", &ctx))
            .then_some(MatchStrategy::ContainsWithKeyword)
    }

    fn is_cost_center_total(&self, desc: &str) -> bool {
        let lower = clean_label(desc).to_lowercase();
        !lower.contains("report")
            && self
                .schema
                .cost_center_total_markers()
                .iter()
                .any(|m| lower.contains(&m.to_lowercase()))
    }

    /// Sub-type rows: strip the service-level prefix, then run the strategies.
    /// A prefixed row may also match by containment.
    pub fn match_sub_type(&self, desc: &str, code: Option<&str>) -> Option<Classification> {
        let prefix = self.schema.service_level_prefix();
        let (body, prefixed) = strip_service_level(desc, prefix);
        let candidates = self.sub_types().iter().map(|st| (st.label(), *st));

        let ctx = MatchContext {
            cost_center: code,
            keywords: &[],
        };
        let found = best_match(body, candidates.clone(), &ctx).or_else(|| {
            if !prefixed {
                return None;
            }
            let keyword = [prefix.trim_end_matches(':')];
            let ctx = MatchContext {
                cost_center: None,
                keywords: &keyword,
            };
            candidates
                .clone()
                .filter(|(label, _)| MatchStrategy::ContainsWithKeyword.matches(desc, label, &ctx))
                .max_by_key(|(label, _)| label.len())
                .map(|(_, st)| (st, MatchStrategy::ContainsWithKeyword))
        })?;

        let (sub_type, strategy) = found;
        Some(Classification::new(RowKind::SubType(sub_type), sub_type.label(), strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(include_cst: bool) -> RowClassifier {
        RowClassifier::new(ReportSchema::standard(), include_cst)
    }

    fn row(desc: &str, cc: &str) -> RawRow {
        RawRow::new(10, vec![desc.to_string(), cc.to_string(), "1".to_string()])
    }

    fn kind(c: &RowClassifier, desc: &str, cc: &str) -> RowKind {
        c.classify(&row(desc, cc), None).kind
    }

    #[test]
    fn main_total_with_code_in_text() {
        let c = classifier(false);
        let class = c.classify(&row("CC1A01840 Commercial Totals", ""), None);
        assert_eq!(
            class.kind,
            RowKind::MainTotal {
                code: "1A01840".into(),
                category: Category::Commercial
            }
        );
        assert_eq!(class.label, "CC1A01840 Commercial Totals");
        assert_eq!(class.strategy, Some(MatchStrategy::CostCenterPrefix));
    }

    #[test]
    fn main_total_with_code_in_column() {
        let c = classifier(false);
        assert_eq!(
            kind(&c, "Industrial Totals:", "1B00001"),
            RowKind::MainTotal {
                code: "1B00001".into(),
                category: Category::Industrial
            }
        );
    }

    #[test]
    fn spelling_variants_normalize() {
        let c = classifier(false);
        assert_eq!(
            kind(&c, "CC1A01840 Govt. Domestic Totals", ""),
            RowKind::MainTotal {
                code: "1A01840".into(),
                category: Category::GovtDomestic
            }
        );
        assert_eq!(
            kind(&c, "Govt.  Premises Totals", ""),
            RowKind::OverallTotal(Category::GovtPremises)
        );
        assert_eq!(
            kind(&c, "Govt.Domestic Totals", ""),
            RowKind::OverallTotal(Category::GovtDomestic)
        );
    }

    #[test]
    fn overall_totals_do_not_confuse_domestic_variants() {
        let c = classifier(false);
        assert_eq!(
            kind(&c, "Total of Govt.Domestic Totals", ""),
            RowKind::OverallTotal(Category::GovtDomestic)
        );
        assert_eq!(kind(&c, "Domestic Totals", ""), RowKind::OverallTotal(Category::Domestic));
    }

    #[test]
    fn report_and_age_rows() {
        let c = classifier(false);
        assert_eq!(kind(&c, "Cost Center Report Totals", ""), RowKind::ReportTotal);
        assert_eq!(kind(&c, "Cost Centre Report Totals:", ""), RowKind::ReportTotal);
        assert_eq!(kind(&c, "cost centre REPORT totals - final", ""), RowKind::ReportTotal);
        assert_eq!(kind(&c, "Age Balance %", ""), RowKind::AgeBalance);
        assert_eq!(kind(&c, "Overall Age Balance %", ""), RowKind::AgeBalance);
    }

    #[test]
    fn age_balance_needs_the_word_age_and_a_percent() {
        let c = classifier(false);
        assert_ne!(kind(&c, "Average Balance", ""), RowKind::AgeBalance);
        assert_ne!(kind(&c, "Percentage Balance %", ""), RowKind::AgeBalance);
        assert_ne!(kind(&c, "Overall Age Balance", ""), RowKind::AgeBalance);
    }

    #[test]
    fn cost_center_total_rows() {
        let c = classifier(false);
        assert_eq!(
            kind(&c, "Cost Center Totals", "1A01840"),
            RowKind::CostCenterTotal { code: "1A01840".into() }
        );
        let with_context = c.classify(&row("Cost Center Total", ""), Some("1A01840"));
        assert_eq!(with_context.kind, RowKind::CostCenterTotal { code: "1A01840".into() });
        assert_eq!(kind(&c, "Cost Center Total", ""), RowKind::ReportTotal);
    }

    #[test]
    fn sub_types() {
        let c = classifier(false);
        assert_eq!(kind(&c, "Connected", "1A01840"), RowKind::SubType(SubType::Connected));
        assert_eq!(kind(&c, "nil:", "1A01840"), RowKind::SubType(SubType::Nil));
        assert_eq!(kind(&c, "Service Level: IST", "1A01840"), RowKind::SubType(SubType::Ist));
        assert_eq!(kind(&c, "Service Level: Type IST", ""), RowKind::SubType(SubType::Ist));
        assert_eq!(kind(&c, "IST", ""), RowKind::SubType(SubType::Ist));
    }

    #[test]
    fn cst_only_when_enabled() {
        assert_eq!(kind(&classifier(false), "CST", "1A01840"), RowKind::Unclassified);
        assert_eq!(kind(&classifier(true), "CST", "1A01840"), RowKind::SubType(SubType::Cst));
    }

    #[test]
    fn unmatched_rows_are_unclassified() {
        let c = classifier(false);
        assert_eq!(kind(&c, "", ""), RowKind::Unclassified);
        assert_eq!(kind(&c, "Printed by billing system", ""), RowKind::Unclassified);
        assert_eq!(kind(&c, "Random Totals", "1A01840"), RowKind::Unclassified);
    }

    #[test]
    fn boundaries() {
        assert!(RowKind::ReportTotal.is_boundary());
        assert!(RowKind::OverallTotal(Category::Commercial).is_boundary());
        assert!(!RowKind::SubType(SubType::Nil).is_boundary());
        assert!(!RowKind::Unclassified.is_boundary());
    }
}
