//! Single-slot JSON cache for the comparison bundle

use super::ComparisonBundle;
use crate::error::{FitLabError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CACHE_FILE: &str = "comparison.json";

#[derive(Debug, Clone)]
pub struct ComparisonCache {
    path: PathBuf,
}

impl ComparisonCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache file inside a models directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CACHE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored bundle, or `CacheMiss` when the file is absent or unreadable
    pub fn load(&self) -> Result<ComparisonBundle> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Comparison cache not readable");
                return Err(FitLabError::CacheMiss);
            }
        };
        serde_json::from_str(&json).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Ignoring corrupt comparison cache");
            FitLabError::CacheMiss
        })
    }

    /// Overwrite the slot
    pub fn store(&self, bundle: &ComparisonBundle) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(bundle)?)?;
        info!(path = %self.path.display(), "Comparison cache stored");
        Ok(())
    }

    /// Cached bundle unless `retrain` is set; otherwise build and store a new one
    pub fn load_or_build<F>(&self, retrain: bool, build: F) -> Result<ComparisonBundle>
    where
        F: FnOnce() -> Result<ComparisonBundle>,
    {
        if !retrain {
            match self.load() {
                Ok(bundle) => return Ok(bundle),
                Err(FitLabError::CacheMiss) => {}
                Err(e) => return Err(e),
            }
        }
        let bundle = build()?;
        self.store(&bundle)?;
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_corrupt_are_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ComparisonCache::in_dir(dir.path());
        assert!(matches!(cache.load(), Err(FitLabError::CacheMiss)));

        std::fs::write(cache.path(), "{ not json").unwrap();
        assert!(matches!(cache.load(), Err(FitLabError::CacheMiss)));
    }
}
