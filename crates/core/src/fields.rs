//! Field catalogue: the 7 scalar fields plus 13 × 2 aging sub-fields that make
//! up a [`FinancialMetrics`] record, addressable by a single [`Field`] value.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::model::{AgingBucket, FinancialMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    BillingTotal,
    ReceiptsTotal,
    CrbalTotal,
    NoAccounts,
    OutstandingBalance,
    CurrentNoAccounts,
    CurrentBalance,
}

impl ScalarField {
    pub const ALL: [ScalarField; 7] = [
        ScalarField::BillingTotal,
        ScalarField::ReceiptsTotal,
        ScalarField::CrbalTotal,
        ScalarField::NoAccounts,
        ScalarField::OutstandingBalance,
        ScalarField::CurrentNoAccounts,
        ScalarField::CurrentBalance,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::BillingTotal => "billing_total",
            Self::ReceiptsTotal => "receipts_total",
            Self::CrbalTotal => "crbal_total",
            Self::NoAccounts => "no_accounts",
            Self::OutstandingBalance => "outstanding_balance",
            Self::CurrentNoAccounts => "current_no_accounts",
            Self::CurrentBalance => "current_balance",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::BillingTotal => "Billing Total",
            Self::ReceiptsTotal => "Receipts Total",
            Self::CrbalTotal => "CR Bal Total",
            Self::NoAccounts => "Number of Accounts",
            Self::OutstandingBalance => "Outstanding Balance",
            Self::CurrentNoAccounts => "Current No. Accounts",
            Self::CurrentBalance => "Current Balance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgingMetric {
    Accounts,
    Balance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Scalar(ScalarField),
    Aging(AgingBucket, AgingMetric),
}

impl Field {
    /// Number of comparable fields per metrics record.
    pub const COUNT: usize = ScalarField::ALL.len() + AgingBucket::ALL.len() * 2;

    /// All fields: scalars first, then buckets in order, accounts before balance.
    pub fn all() -> impl Iterator<Item = Field> {
        let scalars = ScalarField::ALL.iter().copied().map(Field::Scalar);
        let aging = AgingBucket::ALL.iter().copied().flat_map(|b| {
            [
                Field::Aging(b, AgingMetric::Accounts),
                Field::Aging(b, AgingMetric::Balance),
            ]
        });
        scalars.chain(aging)
    }

    /// Stable identifier, e.g. `billing_total` or `aging.Overdue > 3 month.balance`.
    pub fn key(self) -> String {
        match self {
            Field::Scalar(s) => s.key().to_string(),
            Field::Aging(b, AgingMetric::Accounts) => format!("aging.{}.no_accounts", b.label()),
            Field::Aging(b, AgingMetric::Balance) => format!("aging.{}.balance", b.label()),
        }
    }

    pub fn display_name(self) -> String {
        match self {
            Field::Scalar(s) => s.display_name().to_string(),
            Field::Aging(b, AgingMetric::Accounts) => format!("{} - Accounts", b.label()),
            Field::Aging(b, AgingMetric::Balance) => format!("{} - Balance", b.label()),
        }
    }
}

impl FinancialMetrics {
    /// Read one field as a decimal (counts are widened losslessly).
    pub fn value(&self, field: Field) -> Decimal {
        match field {
            Field::Scalar(ScalarField::BillingTotal) => self.billing_total,
            Field::Scalar(ScalarField::ReceiptsTotal) => self.receipts_total,
            Field::Scalar(ScalarField::CrbalTotal) => self.crbal_total,
            Field::Scalar(ScalarField::NoAccounts) => Decimal::from(self.no_accounts),
            Field::Scalar(ScalarField::OutstandingBalance) => self.outstanding_balance,
            Field::Scalar(ScalarField::CurrentNoAccounts) => Decimal::from(self.current_no_accounts),
            Field::Scalar(ScalarField::CurrentBalance) => self.current_balance,
            Field::Aging(b, AgingMetric::Accounts) => Decimal::from(self.aging.get(b).no_accounts),
            Field::Aging(b, AgingMetric::Balance) => self.aging.get(b).balance,
        }
    }

    /// Write one field. Count fields truncate toward zero.
    pub fn set_value(&mut self, field: Field, value: Decimal) {
        let count = || value.trunc().to_i64().unwrap_or(0);
        match field {
            Field::Scalar(ScalarField::BillingTotal) => self.billing_total = value,
            Field::Scalar(ScalarField::ReceiptsTotal) => self.receipts_total = value,
            Field::Scalar(ScalarField::CrbalTotal) => self.crbal_total = value,
            Field::Scalar(ScalarField::NoAccounts) => self.no_accounts = count(),
            Field::Scalar(ScalarField::OutstandingBalance) => self.outstanding_balance = value,
            Field::Scalar(ScalarField::CurrentNoAccounts) => self.current_no_accounts = count(),
            Field::Scalar(ScalarField::CurrentBalance) => self.current_balance = value,
            Field::Aging(b, AgingMetric::Accounts) => self.aging.get_mut(b).no_accounts = count(),
            Field::Aging(b, AgingMetric::Balance) => self.aging.get_mut(b).balance = value,
        }
    }
}
