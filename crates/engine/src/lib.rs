//! `brdiff-engine`: turns raw report rows into a canonical [`ReportDocument`].
//!
//! Pure: callers hand in rows with the header removed and get a document back.
//! Reading files lives in `brdiff-io`.
//!
//! [`ReportDocument`]: brdiff_core::ReportDocument

pub mod builder;
pub mod classify;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod pipeline;

pub use builder::{BuildStats, RawBlock, RawCostCenter, RawReport, TreeBuilder};
pub use classify::{Classification, RowClassifier, RowKind};
pub use error::EngineError;
pub use matcher::MatchStrategy;
pub use normalize::Normalizer;
pub use pipeline::{align_cst, ReportParser};
