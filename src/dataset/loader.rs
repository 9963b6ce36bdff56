//! Dataset loading

use super::RawTable;
use crate::config::LabConfig;
use crate::error::{FitLabError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Fetches the passenger CSV once and reads it into a [`RawTable`]
#[derive(Debug, Clone)]
pub struct DatasetProvider {
    url: String,
    path: PathBuf,
}

impl DatasetProvider {
    pub fn new(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }

    pub fn from_config(config: &LabConfig) -> Self {
        Self::new(config.data_url.clone(), config.data_path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table, downloading the CSV first if there is no local copy
    pub fn load(&self) -> Result<RawTable> {
        let path = self.ensure_local()?;
        Self::read_csv(&path)
    }

    /// Make sure the CSV exists on disk and return its path
    pub fn ensure_local(&self) -> Result<PathBuf> {
        if self.path.exists() {
            debug!(path = %self.path.display(), "Using local dataset");
            return Ok(self.path.clone());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!(url = %self.url, path = %self.path.display(), "Downloading dataset");
        let start = Instant::now();
        let response = reqwest::blocking::get(&self.url)?.error_for_status()?;
        let bytes = response.bytes()?;
        if bytes.is_empty() {
            return Err(FitLabError::Network(format!("{} returned an empty body", self.url)));
        }
        std::fs::write(&self.path, &bytes)?;
        info!(bytes = bytes.len(), elapsed = ?start.elapsed(), "Dataset downloaded");

        Ok(self.path.clone())
    }

    /// Read a passenger CSV from disk
    pub fn read_csv(path: &Path) -> Result<RawTable> {
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10_000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;
        debug!(rows = frame.height(), cols = frame.width(), "Dataset parsed");
        RawTable::new(frame)
    }
}
