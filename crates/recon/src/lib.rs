//! `brdiff-recon`: field-by-field comparison of two report documents.
//!
//! Pure engine crate: receives normalized documents, returns the comparison
//! tree and summary. No CLI or IO dependencies.

pub mod diff;
pub mod engine;
pub mod model;
pub mod summary;

pub use engine::compare;
pub use model::{
    ComparisonMeta, ComparisonResult, ComparisonSummary, CostCenterComparison, FieldDifference,
    MainDescriptionComparison, SectionComparison, SubTypeComparison,
};
