use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Aging buckets
// ---------------------------------------------------------------------------

/// One of the 13 fixed overdue-duration ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgingBucket {
    Over1,
    Over2,
    Over3,
    Over6,
    Over12,
    Over18,
    Over24,
    Over30,
    Over36,
    Over42,
    Over48,
    Over54,
    Over60,
}

const AGING_LABELS: [&str; 13] = [
    "Overdue > 1 month",
    "Overdue > 2 month",
    "Overdue > 3 month",
    "Overdue > 6 month",
    "Overdue > 12 month",
    "Overdue > 18 month",
    "Overdue > 24 month",
    "Overdue > 30 month",
    "Overdue > 36 month",
    "Overdue > 42 month",
    "Overdue > 48 month",
    "Overdue > 54 month",
    "Overdue > 60 month",
];

impl AgingBucket {
    pub const ALL: [AgingBucket; 13] = [
        AgingBucket::Over1,
        AgingBucket::Over2,
        AgingBucket::Over3,
        AgingBucket::Over6,
        AgingBucket::Over12,
        AgingBucket::Over18,
        AgingBucket::Over24,
        AgingBucket::Over30,
        AgingBucket::Over36,
        AgingBucket::Over42,
        AgingBucket::Over48,
        AgingBucket::Over54,
        AgingBucket::Over60,
    ];

    /// Position in report order (0 = "Overdue > 1 month").
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        AGING_LABELS[self.index()]
    }

    pub fn from_label(label: &str) -> Option<Self> {
        AGING_LABELS
            .iter()
            .position(|l| *l == label.trim())
            .map(|i| Self::ALL[i])
    }
}

impl std::fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingEntry {
    pub no_accounts: i64,
    pub balance: Decimal,
}

/// All 13 aging buckets, always present and in report order.
///
/// Serialized as an ordered map keyed by bucket label. Deserializing zero-fills
/// absent buckets and rejects labels that are not one of the fixed 13.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aging {
    entries: [AgingEntry; 13],
}

impl Aging {
    pub fn get(&self, bucket: AgingBucket) -> &AgingEntry {
        &self.entries[bucket.index()]
    }

    pub fn get_mut(&mut self, bucket: AgingBucket) -> &mut AgingEntry {
        &mut self.entries[bucket.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgingBucket, &AgingEntry)> {
        AgingBucket::ALL.iter().copied().zip(self.entries.iter())
    }
}

impl Serialize for Aging {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (bucket, entry) in self.iter() {
            map.serialize_entry(bucket.label(), entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Aging {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, AgingEntry> = BTreeMap::deserialize(deserializer)?;
        let mut aging = Aging::default();
        for (label, entry) in raw {
            let bucket = AgingBucket::from_label(&label)
                .ok_or_else(|| de::Error::custom(format!("unknown aging bucket '{label}'")))?;
            *aging.get_mut(bucket) = entry;
        }
        Ok(aging)
    }
}

// ---------------------------------------------------------------------------
// Financial metrics
// ---------------------------------------------------------------------------

/// The financial columns of one report row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialMetrics {
    pub billing_total: Decimal,
    pub receipts_total: Decimal,
    pub crbal_total: Decimal,
    pub no_accounts: i64,
    pub outstanding_balance: Decimal,
    pub current_no_accounts: i64,
    pub current_balance: Decimal,
    pub aging: Aging,
}

impl FinancialMetrics {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Field-wise sum. Saturates at the numeric limits instead of overflowing.
impl AddAssign<&FinancialMetrics> for FinancialMetrics {
    fn add_assign(&mut self, rhs: &FinancialMetrics) {
        self.billing_total = self.billing_total.saturating_add(rhs.billing_total);
        self.receipts_total = self.receipts_total.saturating_add(rhs.receipts_total);
        self.crbal_total = self.crbal_total.saturating_add(rhs.crbal_total);
        self.no_accounts = self.no_accounts.saturating_add(rhs.no_accounts);
        self.outstanding_balance = self.outstanding_balance.saturating_add(rhs.outstanding_balance);
        self.current_no_accounts = self.current_no_accounts.saturating_add(rhs.current_no_accounts);
        self.current_balance = self.current_balance.saturating_add(rhs.current_balance);
        for bucket in AgingBucket::ALL {
            let src = rhs.aging.get(bucket);
            let dst = self.aging.get_mut(bucket);
            dst.no_accounts = dst.no_accounts.saturating_add(src.no_accounts);
            dst.balance = dst.balance.saturating_add(src.balance);
        }
    }
}

impl AddAssign for FinancialMetrics {
    fn add_assign(&mut self, rhs: FinancialMetrics) {
        *self += &rhs;
    }
}

impl Add for FinancialMetrics {
    type Output = FinancialMetrics;

    fn add(mut self, rhs: FinancialMetrics) -> FinancialMetrics {
        self += &rhs;
        self
    }
}

impl<'a> Sum<&'a FinancialMetrics> for FinancialMetrics {
    fn sum<I: Iterator<Item = &'a FinancialMetrics>>(iter: I) -> Self {
        iter.fold(FinancialMetrics::zero(), |mut acc, m| {
            acc += m;
            acc
        })
    }
}

impl Sum for FinancialMetrics {
    fn sum<I: Iterator<Item = FinancialMetrics>>(iter: I) -> Self {
        iter.fold(FinancialMetrics::zero(), |acc, m| acc + m)
    }
}

// ---------------------------------------------------------------------------
// Sub-types and main description categories
// ---------------------------------------------------------------------------

/// Customer-connection category nested under a main description.
///
/// Declaration order is the canonical row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubType {
    Connected,
    Nil,
    #[serde(rename = "IST")]
    Ist,
    #[serde(rename = "CST")]
    Cst,
}

impl SubType {
    const BASE: [SubType; 3] = [SubType::Connected, SubType::Nil, SubType::Ist];
    const WITH_CST: [SubType; 4] = [SubType::Connected, SubType::Nil, SubType::Ist, SubType::Cst];

    /// The required sub-types, in canonical order.
    pub fn required(include_cst: bool) -> &'static [SubType] {
        if include_cst {
            &Self::WITH_CST
        } else {
            &Self::BASE
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Nil => "Nil",
            Self::Ist => "IST",
            Self::Cst => "CST",
        }
    }
}

impl std::fmt::Display for SubType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the 8 fixed billing categories. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Commercial Totals")]
    Commercial,
    #[serde(rename = "Domestic Totals")]
    Domestic,
    #[serde(rename = "Non-billable Totals")]
    NonBillable,
    #[serde(rename = "Govt.Domestic Totals")]
    GovtDomestic,
    #[serde(rename = "Govt. Premises Totals")]
    GovtPremises,
    #[serde(rename = "Govt. Quarters Totals")]
    GovtQuarters,
    #[serde(rename = "Industrial Totals")]
    Industrial,
    #[serde(rename = "Ind. No HC Totals")]
    IndNoHc,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Commercial,
        Category::Domestic,
        Category::NonBillable,
        Category::GovtDomestic,
        Category::GovtPremises,
        Category::GovtQuarters,
        Category::Industrial,
        Category::IndNoHc,
    ];

    /// Canonical label as printed in the source report.
    pub fn label(self) -> &'static str {
        match self {
            Self::Commercial => "Commercial Totals",
            Self::Domestic => "Domestic Totals",
            Self::NonBillable => "Non-billable Totals",
            Self::GovtDomestic => "Govt.Domestic Totals",
            Self::GovtPremises => "Govt. Premises Totals",
            Self::GovtQuarters => "Govt. Quarters Totals",
            Self::Industrial => "Industrial Totals",
            Self::IndNoHc => "Ind. No HC Totals",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Report tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTypeEntry {
    #[serde(rename = "type")]
    pub sub_type: SubType,
    pub data: FinancialMetrics,
}

impl SubTypeEntry {
    pub fn zero(sub_type: SubType) -> Self {
        Self {
            sub_type,
            data: FinancialMetrics::zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainDescription {
    pub name: Category,
    pub description_types: Vec<SubTypeEntry>,
    pub main_total: FinancialMetrics,
}

impl MainDescription {
    pub fn entry(&self, sub_type: SubType) -> Option<&SubTypeEntry> {
        self.description_types.iter().find(|e| e.sub_type == sub_type)
    }

    /// Field-wise sum of the sub-type rows.
    pub fn sum_of_types(&self) -> FinancialMetrics {
        self.description_types.iter().map(|e| &e.data).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostCenter {
    pub code: String,
    pub main_descriptions: Vec<MainDescription>,
    pub cost_center_total: FinancialMetrics,
}

impl CostCenter {
    pub fn main_description(&self, name: Category) -> Option<&MainDescription> {
        self.main_descriptions.iter().find(|m| m.name == name)
    }

    /// Field-wise sum of the main description totals.
    pub fn sum_of_main_totals(&self) -> FinancialMetrics {
        self.main_descriptions.iter().map(|m| &m.main_total).sum()
    }
}

/// One parsed and normalized report file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_title: Option<String>,
    #[serde(default)]
    pub include_cst: bool,
    /// Unique by code, in order of first appearance in the source.
    #[serde(default)]
    pub cost_centers: Vec<CostCenter>,
    #[serde(default)]
    pub overall_totals: Vec<MainDescription>,
    #[serde(default)]
    pub report_totals: Option<FinancialMetrics>,
    #[serde(default)]
    pub age_balance: Option<FinancialMetrics>,
}

impl ReportDocument {
    pub fn cost_center(&self, code: &str) -> Option<&CostCenter> {
        self.cost_centers.iter().find(|cc| cc.code == code)
    }

    pub fn overall(&self, name: Category) -> Option<&MainDescription> {
        self.overall_totals.iter().find(|m| m.name == name)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.cost_centers.iter().map(|cc| cc.code.as_str())
    }
}
