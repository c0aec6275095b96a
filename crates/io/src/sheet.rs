//! Header stripping and the format dispatch shared by every reader.

use std::path::Path;

use brdiff_core::RawRow;

use crate::error::IoError;

/// Number of header rows above the data in the billing system's export.
pub const DEFAULT_HEADER_ROWS: usize = 6;

#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Worksheet name; the first sheet when `None`. Ignored for CSV.
    pub sheet: Option<String>,
    pub header_rows: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            header_rows: DEFAULT_HEADER_ROWS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// xlsx, xlsm, xls, ods
    Spreadsheet,
    Csv,
    Tsv,
    /// A previously saved `ReportDocument`.
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            _ => Err(IoError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// A report sheet split into its header block and data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSheet {
    /// Cell A1, when non-empty.
    pub title: Option<String>,
    pub header: Vec<Vec<String>>,
    pub rows: Vec<RawRow>,
}

impl ReportSheet {
    /// Split a dense cell grid (row 0 = sheet row 1).
    pub fn from_grid(mut grid: Vec<Vec<String>>, header_rows: usize) -> Self {
        let split = header_rows.min(grid.len());
        let data = grid.split_off(split);
        let header = grid;

        let title = header
            .first()
            .and_then(|r| r.first())
            .map(|c| c.trim().to_string())
            .filter(|t| !t.is_empty());

        let rows = data
            .into_iter()
            .enumerate()
            .map(|(i, cells)| RawRow::new(split + i + 1, cells))
            .collect();

        Self { title, header, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn splits_header_and_numbers_lines() {
        let sheet = ReportSheet::from_grid(
            grid(&[&[" March 2024 "], &[], &["Description"], &["Connected", "1A01840", "5"]]),
            3,
        );
        assert_eq!(sheet.title.as_deref(), Some("March 2024"));
        assert_eq!(sheet.header.len(), 3);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].line, 4);
    }

    #[test]
    fn short_grid_is_all_header() {
        let sheet = ReportSheet::from_grid(grid(&[&[""], &["x"]]), 6);
        assert!(sheet.title.is_none());
        assert_eq!(sheet.header.len(), 2);
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.XLSX")).unwrap(), SourceFormat::Spreadsheet);
        assert_eq!(SourceFormat::from_path(Path::new("a.ods")).unwrap(), SourceFormat::Spreadsheet);
        assert_eq!(SourceFormat::from_path(Path::new("a.csv")).unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("a.tsv")).unwrap(), SourceFormat::Tsv);
        assert_eq!(SourceFormat::from_path(Path::new("a.json")).unwrap(), SourceFormat::Json);
        assert!(SourceFormat::from_path(Path::new("a.pdf")).is_err());
        assert!(SourceFormat::from_path(Path::new("noext")).is_err());
    }
}
