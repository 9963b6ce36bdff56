//! Training engine: validation, split, fit, evaluate

use super::decision_tree::{Criterion, DecisionTree};
use super::metrics::ClassificationMetrics;
use super::split::{take, take_rows, TrainTestSplitter};
use crate::error::{FitLabError, Result};
use crate::preprocessing::non_numeric_columns;
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Rows required before a model may be trained
pub const MIN_TRAINING_ROWS: usize = 50;

/// Split and tree settings for one training run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub criterion: Criterion,
    pub test_size: f64,
    pub stratify: bool,
    pub random_seed: u64,
    pub min_rows: usize,
}

impl TrainingConfig {
    /// Settings used by the game: 80/20 stratified split, seed 42,
    /// `min_samples_split = 5`, `min_samples_leaf = 2`
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            min_samples_split: 5,
            min_samples_leaf: 2,
            criterion: Criterion::Gini,
            test_size: 0.2,
            stratify: true,
            random_seed: 42,
            min_rows: MIN_TRAINING_ROWS,
        }
    }

    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_stratify(mut self, stratify: bool) -> Self {
        self.stratify = stratify;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }
}

/// Train/test evaluation of a fitted tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    /// Test-split precision for class 1
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub training_time_secs: f64,
}

impl EvaluationMetrics {
    /// `train_accuracy - test_accuracy`
    pub fn difference(&self) -> f64 {
        self.train_accuracy - self.test_accuracy
    }
}

/// A fitted tree with everything needed to explain and reuse it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    pub tree: DecisionTree,
    pub feature_names: Vec<String>,
    pub max_depth: usize,
    pub metrics: EvaluationMetrics,
    pub trained_at: DateTime<Utc>,
}

impl FittedModel {
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.tree.predict(x)
    }

    /// Probability of class 1 for each row
    pub fn predict_positive_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.tree.predict_proba(x)?;
        let positive = self.tree.classes().iter().position(|c| *c == 1.0);
        Ok(match positive {
            Some(col) => proba.column(col).to_owned(),
            None => Array1::zeros(x.nrows()),
        })
    }

    /// Feature importances sorted from most to least important
    pub fn feature_importance(&self) -> Vec<(String, f64)> {
        let mut pairs: Vec<(String, f64)> = match self.tree.feature_importances() {
            Some(imp) => self
                .feature_names
                .iter()
                .cloned()
                .zip(imp.iter().copied())
                .collect(),
            None => self.feature_names.iter().map(|n| (n.clone(), 0.0)).collect(),
        };
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs
    }

    /// Save the model to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a model from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&json)?;
        Ok(model)
    }
}

/// Runs the split / fit / evaluate cycle for a [`TrainingConfig`]
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on every column of `df` except `target`
    pub fn fit_frame(&self, df: &DataFrame, target: &str) -> Result<FittedModel> {
        let (x, y, feature_names) = frame_to_arrays(df, target)?;
        self.fit_and_evaluate(&x, &y, &feature_names)
    }

    /// Split, fit and score. Either a complete model comes back or an error; nothing in between.
    pub fn fit_and_evaluate(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        feature_names: &[String],
    ) -> Result<FittedModel> {
        let start = Instant::now();
        self.validate(x, y, feature_names)?;

        let split = TrainTestSplitter::new(self.config.test_size)
            .with_stratify(self.config.stratify)
            .with_random_state(self.config.random_seed)
            .split(y)?;
        let (x_train, y_train) = (take_rows(x, &split.train), take(y, &split.train));
        let (x_test, y_test) = (take_rows(x, &split.test), take(y, &split.test));
        debug!(train = split.train.len(), test = split.test.len(), "Split data");

        let mut tree = DecisionTree::new()
            .with_max_depth(self.config.max_depth)
            .with_min_samples_split(self.config.min_samples_split)
            .with_min_samples_leaf(self.config.min_samples_leaf)
            .with_criterion(self.config.criterion);
        tree.fit(&x_train, &y_train).map_err(|e| match e {
            FitLabError::Training(_) => e,
            other => FitLabError::Training(other.to_string()),
        })?;

        let train = ClassificationMetrics::compute(&y_train, &tree.predict(&x_train)?);
        let test = ClassificationMetrics::compute(&y_test, &tree.predict(&x_test)?);

        let metrics = EvaluationMetrics {
            train_accuracy: train.accuracy,
            test_accuracy: test.accuracy,
            precision: test.precision,
            recall: test.recall,
            f1_score: test.f1_score,
            n_train: split.train.len(),
            n_test: split.test.len(),
            training_time_secs: start.elapsed().as_secs_f64(),
        };
        info!(
            max_depth = self.config.max_depth,
            train_accuracy = metrics.train_accuracy,
            test_accuracy = metrics.test_accuracy,
            depth = tree.get_depth(),
            leaves = tree.get_n_leaves(),
            "Model trained"
        );

        Ok(FittedModel {
            tree,
            feature_names: feature_names.to_vec(),
            max_depth: self.config.max_depth,
            metrics,
            trained_at: Utc::now(),
        })
    }

    fn validate(&self, x: &Array2<f64>, y: &Array1<f64>, feature_names: &[String]) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(FitLabError::DataInvalid(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if x.ncols() != feature_names.len() {
            return Err(FitLabError::DataInvalid(format!(
                "{} feature columns but {} names",
                x.ncols(),
                feature_names.len()
            )));
        }
        if x.ncols() == 0 {
            return Err(FitLabError::DataInvalid("no feature columns".to_string()));
        }
        if x.nrows() < self.config.min_rows {
            return Err(FitLabError::DataInvalid(format!(
                "only {} rows; at least {} are needed",
                x.nrows(),
                self.config.min_rows
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(FitLabError::DataInvalid(
                "data contains missing or infinite values".to_string(),
            ));
        }

        let positives = y.iter().filter(|v| **v == 1.0).count();
        if y.iter().any(|v| *v != 0.0 && *v != 1.0) {
            return Err(FitLabError::DataInvalid("target must be 0 or 1".to_string()));
        }
        if positives == 0 || positives == y.len() {
            return Err(FitLabError::Training(
                "target has a single class; a classifier needs both".to_string(),
            ));
        }
        Ok(())
    }
}

/// Turn a fully numeric, null-free frame into a feature matrix and label vector
pub fn frame_to_arrays(df: &DataFrame, target: &str) -> Result<(Array2<f64>, Array1<f64>, Vec<String>)> {
    if df.column(target).is_err() {
        return Err(FitLabError::DataInvalid(format!("target column '{}' is missing", target)));
    }
    let non_numeric = non_numeric_columns(df);
    if !non_numeric.is_empty() {
        return Err(FitLabError::DataInvalid(format!(
            "non-numeric columns remain: {}",
            non_numeric.join(", ")
        )));
    }
    let nulls: usize = df.get_columns().iter().map(|c| c.null_count()).sum();
    if nulls > 0 {
        return Err(FitLabError::DataInvalid(format!("{} missing values remain", nulls)));
    }

    let feature_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != target)
        .map(|name| name.to_string())
        .collect();

    let x = columns_to_array2(df, &feature_names)?;
    let y = Array1::from_vec(columns_to_vec(df, target)?);
    Ok((x, y, feature_names))
}

fn columns_to_vec(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| FitLabError::FeatureNotFound(name.to_string()))?;
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Extract named columns into a row-major `Array2<f64>`
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| columns_to_vec(df, name))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((df.height(), col_names.len()), |(r, c)| {
        col_data[c][r]
    }))
}
