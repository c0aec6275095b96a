use brdiff_core::{RawRow, ReportDocument, ReportSchema};

use crate::builder::{RawReport, TreeBuilder};
use crate::classify::RowClassifier;
use crate::error::EngineError;
use crate::normalize::Normalizer;

/// Classify → build → normalize, over rows with the header already removed.
#[derive(Debug, Clone)]
pub struct ReportParser {
    classifier: RowClassifier,
    normalizer: Normalizer,
}

impl ReportParser {
    pub fn new(schema: ReportSchema, include_cst: bool) -> Self {
        let normalizer = Normalizer::new(include_cst, schema.service_level_prefix());
        Self {
            classifier: RowClassifier::new(schema, include_cst),
            normalizer,
        }
    }

    pub fn classifier(&self) -> &RowClassifier {
        &self.classifier
    }

    /// The raw tree, before any synthesis.
    pub fn build(&self, rows: &[RawRow]) -> Result<RawReport, EngineError> {
        if rows.iter().all(RawRow::is_blank) {
            return Err(EngineError::EmptyDocument);
        }
        let raw = TreeBuilder::new(&self.classifier).build(rows);
        if raw.is_empty() {
            return Err(EngineError::UnrecognizedStructure {
                rows: raw.stats.data_rows - raw.stats.blank_rows,
            });
        }
        Ok(raw)
    }

    pub fn parse(&self, rows: &[RawRow]) -> Result<ReportDocument, EngineError> {
        let raw = self.build(rows)?;
        let doc = self.normalizer.normalize(&raw);
        log::info!(
            "parsed {} cost center(s) ({} row(s), {} unclassified)",
            doc.cost_centers.len(),
            raw.stats.data_rows,
            raw.stats.unclassified_rows
        );
        Ok(doc)
    }
}

/// Bring two documents to the same `include_cst` setting before comparing.
///
/// CST is enabled for both when either has it; the side that lacked it gets
/// zero CST entries.
pub fn align_cst(doc1: ReportDocument, doc2: ReportDocument) -> (ReportDocument, ReportDocument) {
    if doc1.include_cst == doc2.include_cst {
        return (doc1, doc2);
    }
    // Only the prefix used for backfill differs between schemas; renormalizing
    // never backfills.
    let normalizer = Normalizer::new(true, ReportSchema::standard().service_level_prefix());
    let fix = |doc: ReportDocument| {
        if doc.include_cst {
            doc
        } else {
            log::debug!("enabling CST on {:?}", doc.report_title);
            normalizer.renormalize(&doc)
        }
    };
    (fix(doc1), fix(doc2))
}
