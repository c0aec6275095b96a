use std::fmt;

/// Fatal parse outcomes. Malformed rows and missing structure are not errors;
/// they are skipped or synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No non-blank data rows after the header block.
    EmptyDocument,
    /// Data rows exist but none of them is a recognizable report row.
    UnrecognizedStructure { rows: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDocument => write!(f, "report has no data rows"),
            Self::UnrecognizedStructure { rows } => {
                write!(f, "none of the {rows} data row(s) look like a billing report row")
            }
        }
    }
}

impl std::error::Error for EngineError {}
