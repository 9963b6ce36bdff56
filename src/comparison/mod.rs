//! Explanation mode: three fixed-recipe models, one per fit regime
//!
//! - Overfitting: a deep tree on the first 50 cleaned rows
//! - Underfitting: a shallow tree on `PassengerId` alone
//! - Good fit: a depth-5 tree on the six curated features
//!
//! The good-fit build also yields the primary model used for predictions.

mod cache;

pub use cache::ComparisonCache;

use crate::config::DEFAULT_SEED;
use crate::dataset::{Feature, RawTable, TARGET};
use crate::error::{FitLabError, Result};
use crate::feedback::{fit_label, FitLabel};
use crate::inference::{FeatureStats, PrimaryModel, SexEncoder};
use crate::preprocessing::{column_f64, column_strings, median, replace_column, AgeStrategy};
use crate::training::{FittedModel, TrainEngine, TrainingConfig};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Columns of the cleaned comparison dataset, label first
const CLEAN_COLUMNS: [&str; 7] = ["Survived", "Pclass", "Sex", "Age", "SibSp", "Parch", "Fare"];

const OVERFIT_ROWS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Overfitting,
    Underfitting,
    GoodFit,
}

impl Regime {
    pub const ALL: [Regime; 3] = [Regime::Overfitting, Regime::Underfitting, Regime::GoodFit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Overfitting => "Overfitting",
            Regime::Underfitting => "Underfitting",
            Regime::GoodFit => "Good Fit",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings a regime was trained with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeParams {
    pub description: String,
    pub features: Vec<String>,
    pub n_rows: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub test_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub regime: Regime,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    /// `train_accuracy - test_accuracy`
    pub difference: f64,
    pub params: RecipeParams,
}

impl ComparisonEntry {
    /// Label the scoring rules give this entry
    pub fn fit_label(&self) -> FitLabel {
        fit_label(self.train_accuracy, self.test_accuracy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonBundle {
    pub overfitting: ComparisonEntry,
    pub underfitting: ComparisonEntry,
    pub good_fit: ComparisonEntry,
    pub created_at: DateTime<Utc>,
}

impl ComparisonBundle {
    pub fn entries(&self) -> [&ComparisonEntry; 3] {
        [&self.overfitting, &self.underfitting, &self.good_fit]
    }

    pub fn get(&self, regime: Regime) -> &ComparisonEntry {
        match regime {
            Regime::Overfitting => &self.overfitting,
            Regime::Underfitting => &self.underfitting,
            Regime::GoodFit => &self.good_fit,
        }
    }
}

/// Result of a full build
#[derive(Debug, Clone)]
pub struct ComparisonBuild {
    pub bundle: ComparisonBundle,
    pub primary: PrimaryModel,
}

/// Trains the three regimes from a raw table
#[derive(Debug, Clone)]
pub struct ComparisonBuilder {
    seed: u64,
}

impl Default for ComparisonBuilder {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

impl ComparisonBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn build(&self, raw: &RawTable) -> Result<ComparisonBuild> {
        let (clean, encoder) = clean_dataset(raw)?;
        info!(rows = clean.height(), "Building comparison models");

        let overfit_df = clean.head(Some(OVERFIT_ROWS));
        let overfit_config = TrainingConfig::new(15)
            .with_min_samples_split(2)
            .with_min_samples_leaf(1)
            .with_test_size(0.4)
            .with_stratify(false)
            .with_random_seed(self.seed);
        let overfit = self.train(
            Regime::Overfitting,
            &overfit_df,
            overfit_config,
            format!("Little data ({} rows), deep tree (depth=15)", overfit_df.height()),
        )?;

        let id_df = raw
            .frame()
            .select([Feature::PassengerId.column(), TARGET])?
            .drop_nulls::<String>(None)?;
        let underfit_config = TrainingConfig::new(3)
            .with_min_samples_split(2)
            .with_min_samples_leaf(1)
            .with_test_size(0.3)
            .with_stratify(false)
            .with_random_seed(self.seed);
        let underfit = self.train(
            Regime::Underfitting,
            &id_df,
            underfit_config,
            "Plenty of data, useless feature (PassengerId)".to_string(),
        )?;

        let good_config = TrainingConfig::new(5)
            .with_min_samples_split(20)
            .with_min_samples_leaf(1)
            .with_test_size(0.3)
            .with_stratify(false)
            .with_random_seed(self.seed);
        let good = self.train(
            Regime::GoodFit,
            &clean,
            good_config,
            "Plenty of data, useful features, depth=5".to_string(),
        )?;

        let stats = feature_stats(&clean)?;
        let bundle = ComparisonBundle {
            overfitting: overfit.0,
            underfitting: underfit.0,
            good_fit: good.0,
            created_at: Utc::now(),
        };
        Ok(ComparisonBuild {
            bundle,
            primary: PrimaryModel {
                model: good.1,
                encoder,
                stats,
            },
        })
    }

    fn train(
        &self,
        regime: Regime,
        df: &DataFrame,
        config: TrainingConfig,
        description: String,
    ) -> Result<(ComparisonEntry, FittedModel)> {
        let model = TrainEngine::new(config).fit_frame(df, TARGET).map_err(|e| {
            FitLabError::Training(format!("{} model: {}", regime, e))
        })?;
        let metrics = model.metrics;
        info!(
            regime = %regime,
            train_accuracy = metrics.train_accuracy,
            test_accuracy = metrics.test_accuracy,
            "Comparison model trained"
        );
        let entry = ComparisonEntry {
            regime,
            train_accuracy: metrics.train_accuracy,
            test_accuracy: metrics.test_accuracy,
            difference: metrics.difference(),
            params: RecipeParams {
                description,
                features: model.feature_names.clone(),
                n_rows: df.height(),
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                test_size: config.test_size,
            },
        };
        Ok((entry, model))
    }
}

/// Six curated features plus the label; Age median-filled, Sex label-encoded, null rows dropped
pub fn clean_dataset(raw: &RawTable) -> Result<(DataFrame, SexEncoder)> {
    let df = raw.frame().select(CLEAN_COLUMNS)?;
    let df = AgeStrategy::Median.apply(&df)?;

    let sex_name = Feature::Sex.column();
    let sexes = column_strings(&df, sex_name)?;
    let encoder = SexEncoder::fit(sexes.iter().flatten().map(String::as_str))?;
    let codes = sexes
        .iter()
        .map(|v| v.as_deref().and_then(|s| encoder.transform(s)))
        .collect();
    let df = replace_column(&df, sex_name, codes)?;

    Ok((df.drop_nulls::<String>(None)?, encoder))
}

fn feature_stats(clean: &DataFrame) -> Result<FeatureStats> {
    let defaults = FeatureStats::default();
    Ok(FeatureStats {
        age_median: median(&column_f64(clean, Feature::Age.column())?).unwrap_or(defaults.age_median),
        fare_median: median(&column_f64(clean, Feature::Fare.column())?)
            .unwrap_or(defaults.fare_median),
    })
}
