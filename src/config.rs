//! Lab configuration

use crate::error::{FitLabError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Public copy of the Titanic passenger table
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/datasciencedojo/datasets/master/titanic.csv";

/// Seed shared by every split in the lab
pub const DEFAULT_SEED: u64 = 42;

/// Where the dataset comes from and where artifacts are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Remote CSV fetched when `data_path` does not exist yet
    pub data_url: String,
    /// Local copy of the CSV
    pub data_path: PathBuf,
    /// Directory holding the comparison cache and the primary model
    pub models_dir: PathBuf,
    /// Random seed for train/test splits
    pub seed: u64,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            data_path: PathBuf::from("data/titanic.csv"),
            models_dir: PathBuf::from("models"),
            seed: DEFAULT_SEED,
        }
    }
}

impl LabConfig {
    /// Load a configuration from a JSON file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            FitLabError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_data_url(mut self, url: impl Into<String>) -> Self {
        self.data_url = url.into();
        self
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject configurations that cannot locate a dataset
    pub fn validate(&self) -> Result<()> {
        if self.data_path.as_os_str().is_empty() {
            return Err(FitLabError::Config("data_path must not be empty".to_string()));
        }
        if self.models_dir.as_os_str().is_empty() {
            return Err(FitLabError::Config("models_dir must not be empty".to_string()));
        }
        if !self.data_url.starts_with("http://") && !self.data_url.starts_with("https://") {
            return Err(FitLabError::Config(format!(
                "data_url must be an http(s) URL, got '{}'",
                self.data_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LabConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.data_url, DEFAULT_DATA_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = LabConfig::default()
            .with_data_path("/tmp/t.csv")
            .with_models_dir("/tmp/models")
            .with_seed(7);
        assert_eq!(config.data_path, PathBuf::from("/tmp/t.csv"));
        assert_eq!(config.models_dir, PathBuf::from("/tmp/models"));
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{"seed": 3, "models_dir": "cache"}}"#).unwrap();

        let config = LabConfig::from_file(file.path()).unwrap();
        assert_eq!(config.seed, 3);
        assert_eq!(config.models_dir, PathBuf::from("cache"));
        assert_eq!(config.data_url, DEFAULT_DATA_URL);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = LabConfig::default().with_data_url("ftp://example.org/t.csv");
        assert!(matches!(config.validate(), Err(FitLabError::Config(_))));
    }
}
