//! `brdiff-core`: shared types for billing report parsing and comparison.
//!
//! No IO and no parsing heuristics: just the canonical report tree, the field
//! catalogue, the column layout and the label tables.

pub mod columns;
pub mod fields;
pub mod model;
pub mod row;
pub mod schema;

pub use fields::{AgingMetric, Field, ScalarField};
pub use model::{
    Aging, AgingBucket, AgingEntry, Category, CostCenter, FinancialMetrics, MainDescription,
    ReportDocument, SubType, SubTypeEntry,
};
pub use row::RawRow;
pub use schema::ReportSchema;
