use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::format::DigitSet;

pub const CONFIG_FILE_NAME: &str = "fastinvo.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// File name of the SQLite store inside the app data directory.
    pub database_file: String,
    pub digits: DigitSet,
    pub currency_label: String,
    pub default_tax_percent: f64,
    pub default_unit: String,
    /// TTF used by the PDF backend. Builtin Helvetica has no Persian glyphs.
    pub pdf_font_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_file: "invoices.db".to_string(),
            digits: DigitSet::Persian,
            currency_label: "ریال".to_string(),
            default_tax_percent: 9.0,
            default_unit: "عدد".to_string(),
            pdf_font_path: None,
        }
    }
}

impl AppConfig {
    /// Reads `fastinvo.toml` from `dir` when present, then `FASTINVO_*`
    /// environment variables on top.
    pub fn load(dir: &Path) -> AppResult<Self> {
        let settings = Config::builder()
            .add_source(File::from(dir.join(CONFIG_FILE_NAME)).required(false))
            .add_source(Environment::with_prefix("FASTINVO").try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path()).unwrap();

        assert_eq!(config.database_file, "invoices.db");
        assert_eq!(config.digits, DigitSet::Persian);
        assert!((config.default_tax_percent - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "digits = \"latin\"\ncurrency_label = \"IRR\"\ndefault_tax_percent = 10\n",
        )
        .unwrap();

        let config = AppConfig::load(dir.path()).unwrap();
        assert_eq!(config.digits, DigitSet::Latin);
        assert_eq!(config.currency_label, "IRR");
        assert!((config.default_tax_percent - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.default_unit, "عدد");
        assert_eq!(
            config.database_path(dir.path()),
            dir.path().join("invoices.db")
        );
    }
}
