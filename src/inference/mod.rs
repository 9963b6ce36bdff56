//! Primary model persistence and single-passenger prediction
//!
//! The good-fit comparison model doubles as the prediction model. It is
//! stored next to the sex encoder it was trained with and the medians used
//! to fill missing inputs.

mod predictor;
mod store;

pub use predictor::{normalize_sex, Passenger, Prediction, SurvivalPredictor};
pub use store::{ModelHandle, ModelStore};

use crate::error::{FitLabError, Result};
use crate::training::FittedModel;
use serde::{Deserialize, Serialize};

/// Label encoder for `Sex`: sorted distinct values map to 0, 1, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SexEncoder {
    classes: Vec<String>,
}

impl SexEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut classes: Vec<String> = values.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        if classes.is_empty() {
            return Err(FitLabError::DataInvalid("no Sex values to encode".to_string()));
        }
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Code for a known value
    pub fn transform(&self, value: &str) -> Option<f64> {
        self.classes
            .iter()
            .position(|c| c == value)
            .map(|i| i as f64)
    }
}

/// Medians used to fill missing prediction inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub age_median: f64,
    pub fare_median: f64,
}

impl Default for FeatureStats {
    fn default() -> Self {
        Self {
            age_median: 28.0,
            fare_median: 14.45,
        }
    }
}

/// Everything the predictor needs
#[derive(Debug, Clone)]
pub struct PrimaryModel {
    pub model: FittedModel,
    pub encoder: SexEncoder,
    pub stats: FeatureStats,
}
