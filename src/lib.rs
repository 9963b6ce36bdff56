//! fitlab - learn overfitting, underfitting and good fit on the Titanic dataset
//!
//! Two modes sit on one small ML stack:
//! - Explanation mode trains three fixed-recipe decision trees, one per fit
//!   regime, and caches their scores
//! - Game mode walks a learner through a supervised-learning pipeline and
//!   scores the model their choices produce
//!
//! # Modules
//!
//! ## Data
//! - [`dataset`] - Titanic table download, schema check and column metadata
//! - [`preprocessing`] - Feature selection, age imputation, encodings, cleanup
//!
//! ## Learning
//! - [`training`] - CART decision tree, train/test split, metrics, training engine
//! - [`pipeline`] - Step state machine and choice replay
//! - [`feedback`] - Fit label, tier, feedback items and recommendations
//!
//! ## Artifacts
//! - [`comparison`] - Three-regime comparison bundle and its cache
//! - [`inference`] - Stored prediction model and single-passenger predictor
//!
//! ## Services
//! - [`config`] - Paths, dataset URL and seed
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Data
pub mod dataset;
pub mod preprocessing;

// Learning
pub mod training;
pub mod pipeline;
pub mod feedback;

// Artifacts
pub mod comparison;
pub mod inference;

// Services
pub mod cli;

pub use error::{FitLabError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{FitLabError, Result};

    // Data
    pub use crate::config::LabConfig;
    pub use crate::dataset::{DatasetProvider, Feature, RawTable, TARGET};
    pub use crate::preprocessing::{
        AgeStrategy, CleanupStrategy, ColumnEncoding, EncodingPlan, FeatureSelection, SexEncoding,
    };

    // Learning
    pub use crate::training::{FittedModel, TrainEngine, TrainingConfig};
    pub use crate::pipeline::{GameSession, MaxDepth, PipelineStep, StepChoice};
    pub use crate::feedback::{assess, Assessment, FitLabel, Tier};

    // Artifacts
    pub use crate::comparison::{ComparisonBuilder, ComparisonBundle, ComparisonCache};
    pub use crate::inference::{ModelHandle, ModelStore, Passenger, SurvivalPredictor};
}
