use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use brdiff_core::schema::DEFAULT_LOOKBACK_ROWS;
use brdiff_core::{Category, ReportSchema};

use crate::error::ConfigError;

/// Header rows above the data in the billing export.
pub const DEFAULT_HEADER_ROWS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Treat CST as a required sub-type.
    pub include_cst: bool,
    pub header_rows: usize,
    /// How far back sub-type rows are searched for a total row.
    pub lookback_rows: usize,
    /// Worksheet to read; the first sheet when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Extra spellings → canonical main description label.
    pub aliases: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include_cst: false,
            header_rows: DEFAULT_HEADER_ROWS,
            lookback_rows: DEFAULT_LOOKBACK_ROWS,
            sheet: None,
            aliases: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// `<config dir>/brdiff/settings.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("brdiff")
            .join("settings.toml")
    }

    /// Load from `path`, or from [`Settings::config_path`] when `None`.
    ///
    /// A missing default file means defaults; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    log::debug!("no settings at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml(&contents).map_err(|e| e.at(path))?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_rows == 0 {
            return Err(ConfigError::Invalid("lookback_rows must be at least 1".into()));
        }
        for (spelling, label) in &self.aliases {
            if spelling.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("empty alias for '{label}'")));
            }
            if Category::from_label(label).is_none() {
                return Err(ConfigError::UnknownLabel {
                    alias: spelling.clone(),
                    label: label.clone(),
                });
            }
        }
        Ok(())
    }

    /// The label tables for the classifier: standard spellings plus aliases.
    pub fn schema(&self) -> Result<ReportSchema, ConfigError> {
        let mut schema = ReportSchema::standard().with_lookback_rows(self.lookback_rows);
        for (spelling, label) in &self.aliases {
            let category = Category::from_label(label).ok_or_else(|| ConfigError::UnknownLabel {
                alias: spelling.clone(),
                label: label.clone(),
            })?;
            schema = schema.with_alias(spelling.clone(), category);
        }
        Ok(schema)
    }

    /// Write a commented default file at `path`, creating parent directories.
    /// Refuses to overwrite an existing file.
    pub fn write_default_file(path: &Path) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        if path.exists() {
            return Err(ConfigError::Write {
                path: path.to_path_buf(),
                message: "file already exists".into(),
            });
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, DEFAULT_FILE).map_err(write_err)
    }
}

const DEFAULT_FILE: &str = r#"# brdiff settings

# Treat CST as a required sub-type in every main description.
include_cst = false

# Rows above the data (title, period, column headings).
header_rows = 6

# How many rows above a total row are searched for its sub-type rows.
lookback_rows = 10

# Worksheet to read from Excel files; the first sheet when unset.
# sheet = "Report"

# Extra spellings of main description labels.
[aliases]
# "Comm. Totals" = "Commercial Totals"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn default_file_parses_to_defaults() {
        assert_eq!(Settings::from_toml(DEFAULT_FILE).unwrap(), Settings::default());
    }

    #[test]
    fn partial_file() {
        let s = Settings::from_toml("include_cst = true\nsheet = \"March\"\n").unwrap();
        assert!(s.include_cst);
        assert_eq!(s.sheet.as_deref(), Some("March"));
        assert_eq!(s.header_rows, 6);
    }

    #[test]
    fn aliases_reach_the_schema() {
        let s = Settings::from_toml("[aliases]\n\"Comm. Totals\" = \"Commercial Totals\"\n").unwrap();
        let schema = s.schema().unwrap();
        assert!(schema
            .main_labels()
            .iter()
            .any(|l| l.text == "Comm. Totals" && l.category == Category::Commercial));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Settings::from_toml("[aliases]\n\"X\" = \"Bogus Totals\"\n"),
            Err(ConfigError::UnknownLabel { .. })
        ));
        assert!(matches!(Settings::from_toml("lookback_rows = 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(Settings::from_toml("colour = 1"), Err(ConfigError::Parse { .. })));
        assert!(matches!(Settings::from_toml("header_rows = \"six\""), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn toml_roundtrip() {
        let mut s = Settings::default();
        s.include_cst = true;
        s.aliases.insert("Dom. Totals".into(), "Domestic Totals".into());
        assert_eq!(Settings::from_toml(&s.to_toml().unwrap()).unwrap(), s);
    }
}
