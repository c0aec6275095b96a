use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum IoError {
    /// Extension not recognized as a spreadsheet, CSV or JSON file.
    UnsupportedFormat { path: PathBuf },
    /// File could not be opened or decoded.
    Read { path: PathBuf, message: String },
    /// Workbook has no worksheets.
    NoSheets { path: PathBuf },
    /// Requested sheet name does not exist.
    SheetNotFound { path: PathBuf, name: String, available: Vec<String> },
    /// Saved document JSON could not be parsed.
    Json { path: PathBuf, message: String },
    /// Output file could not be written.
    Write { path: PathBuf, message: String },
}

impl IoError {
    pub(crate) fn read(path: &Path, err: impl fmt::Display) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, err: impl fmt::Display) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// True for failures on the output side.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat { path } => {
                write!(f, "{}: unsupported file type", path.display())
            }
            Self::Read { path, message } => write!(f, "{}: {message}", path.display()),
            Self::NoSheets { path } => write!(f, "{}: workbook contains no sheets", path.display()),
            Self::SheetNotFound { path, name, available } => write!(
                f,
                "{}: no sheet named '{name}' (available: {})",
                path.display(),
                available.join(", ")
            ),
            Self::Json { path, message } => {
                write!(f, "{}: invalid report JSON: {message}", path.display())
            }
            Self::Write { path, message } => {
                write!(f, "cannot write {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for IoError {}
