use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file could not be read.
    Read { path: PathBuf, message: String },
    /// TOML syntax or type error.
    Parse { path: Option<PathBuf>, message: String },
    /// Alias points at a label that is not a main description.
    UnknownLabel { alias: String, label: String },
    /// Value out of range.
    Invalid(String),
    /// Settings file could not be written.
    Write { path: PathBuf, message: String },
}

impl ConfigError {
    /// Attach the file a parse error came from.
    pub(crate) fn at(self, file: &Path) -> Self {
        match self {
            Self::Parse { path: None, message } => Self::Parse {
                path: Some(file.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse { path: Some(path), message } => {
                write!(f, "{}: {message}", path.display())
            }
            Self::Parse { path: None, message } => write!(f, "settings parse error: {message}"),
            Self::UnknownLabel { alias, label } => write!(
                f,
                "alias '{alias}': '{label}' is not a main description label"
            ),
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {}
