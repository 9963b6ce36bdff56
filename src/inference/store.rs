//! On-disk model store

use super::{FeatureStats, PrimaryModel, SexEncoder};
use crate::error::{FitLabError, Result};
use crate::training::FittedModel;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

const MODEL_FILE: &str = "model.json";
const ENCODER_FILE: &str = "sex_encoder.json";
const STATS_FILE: &str = "feature_stats.json";

/// Three JSON files in one directory
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn exists(&self) -> bool {
        self.model_path().exists()
    }

    pub fn save(&self, primary: &PrimaryModel) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        primary.model.save(self.model_path())?;
        std::fs::write(
            self.dir.join(ENCODER_FILE),
            serde_json::to_string_pretty(&primary.encoder)?,
        )?;
        std::fs::write(
            self.dir.join(STATS_FILE),
            serde_json::to_string_pretty(&primary.stats)?,
        )?;
        info!(dir = %self.dir.display(), "Primary model saved");
        Ok(())
    }

    pub fn load(&self) -> Result<PrimaryModel> {
        let model_path = self.model_path();
        if !model_path.exists() {
            return Err(FitLabError::ModelNotFound(format!(
                "{} does not exist; run `fitlab train-model` first",
                model_path.display()
            )));
        }
        let model = FittedModel::load(&model_path)?;

        let encoder_path = self.dir.join(ENCODER_FILE);
        let encoder: SexEncoder = if encoder_path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&encoder_path)?)?
        } else {
            warn!("Sex encoder missing, using female/male");
            SexEncoder::fit(["female", "male"])?
        };

        let stats_path = self.dir.join(STATS_FILE);
        let stats: FeatureStats = if stats_path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&stats_path)?)?
        } else {
            FeatureStats::default()
        };

        Ok(PrimaryModel {
            model,
            encoder,
            stats,
        })
    }
}

/// Loads the store at most once per process
#[derive(Debug)]
pub struct ModelHandle {
    store: ModelStore,
    cell: OnceLock<PrimaryModel>,
}

impl ModelHandle {
    pub fn new(store: ModelStore) -> Self {
        Self {
            store,
            cell: OnceLock::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The loaded model. A failed load is not cached, so a later call may succeed.
    pub fn get(&self) -> Result<&PrimaryModel> {
        if let Some(primary) = self.cell.get() {
            return Ok(primary);
        }
        let loaded = self.store.load()?;
        Ok(self.cell.get_or_init(|| loaded))
    }
}
