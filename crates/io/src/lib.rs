//! `brdiff-io`: reading billing reports and writing normalized ones.
//!
//! Readers produce a [`ReportSheet`] (title, header block, data rows) for the
//! engine; saved JSON documents bypass parsing entirely.

pub mod csv;
pub mod error;
pub mod json;
pub mod normalized;
pub mod sheet;
pub mod xlsx;

use std::path::Path;

use brdiff_core::ReportDocument;

pub use error::IoError;
pub use normalized::{normalized_rows, OutputRow, RowStyle};
pub use sheet::{ReadOptions, ReportSheet, SourceFormat, DEFAULT_HEADER_ROWS};

/// What an input file turned out to be.
#[derive(Debug, Clone)]
pub enum LoadedReport {
    /// Rows still to be parsed.
    Sheet(ReportSheet),
    /// Already normalized.
    Document(ReportDocument),
}

pub fn load(path: &Path, options: &ReadOptions) -> Result<LoadedReport, IoError> {
    let format = SourceFormat::from_path(path)?;
    let grid = match format {
        SourceFormat::Json => return json::load_document(path).map(LoadedReport::Document),
        SourceFormat::Spreadsheet => xlsx::read_grid(path, options.sheet.as_deref())?,
        SourceFormat::Csv => csv::read_grid(path, None)?,
        SourceFormat::Tsv => csv::read_grid(path, Some(b'\t'))?,
    };
    Ok(LoadedReport::Sheet(ReportSheet::from_grid(grid, options.header_rows)))
}

/// Output format for the normalized report, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("csv") => Ok(Self::Csv),
            _ => Err(IoError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Write `doc` in the canonical sheet layout, keeping `source_header` (padded
/// to `header_rows`) above the data.
pub fn export_normalized(
    doc: &ReportDocument,
    source_header: &[Vec<String>],
    header_rows: usize,
    path: &Path,
) -> Result<usize, IoError> {
    let rows = normalized_rows(doc, source_header, header_rows);
    match ExportFormat::from_path(path)? {
        ExportFormat::Xlsx => xlsx::write_rows(path, &rows, "Normalized")?,
        ExportFormat::Csv => csv::write_rows(path, &rows, b',')?,
    }
    log::info!("wrote {} row(s) to {}", rows.len(), path.display());
    Ok(rows.len())
}
