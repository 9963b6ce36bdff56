//! Model training module
//!
//! Provides the learner behind every fit regime in the lab:
//! - CART decision tree classifier
//! - Seeded (optionally stratified) train/test split
//! - Accuracy, precision, recall and F1
//! - [`TrainEngine`], which validates a numeric frame and runs split/fit/evaluate

pub mod decision_tree;
mod engine;
mod metrics;
pub mod split;

pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use engine::{
    columns_to_array2, frame_to_arrays, EvaluationMetrics, FittedModel, TrainEngine, TrainingConfig,
    MIN_TRAINING_ROWS,
};
pub use metrics::ClassificationMetrics;
pub use split::{SplitIndices, TrainTestSplitter};
