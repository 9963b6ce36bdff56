//! Feature selection

use crate::dataset::{Feature, TARGET};
use crate::error::{FitLabError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Non-empty set of chosen columns, kept in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Feature>", into = "Vec<Feature>")]
pub struct FeatureSelection {
    features: Vec<Feature>,
}

impl FeatureSelection {
    /// Columns suggested before the learner changes anything
    pub const DEFAULT: [Feature; 3] = [Feature::Pclass, Feature::Sex, Feature::Age];

    pub fn new(features: impl IntoIterator<Item = Feature>) -> Result<Self> {
        let unique: BTreeSet<Feature> = features.into_iter().collect();
        if unique.is_empty() {
            return Err(FitLabError::InvalidChoice(
                "select at least one feature".to_string(),
            ));
        }
        Ok(Self {
            features: unique.into_iter().collect(),
        })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Useful columns the learner left out
    pub fn excluded_useful(&self) -> Vec<Feature> {
        Feature::USEFUL
            .iter()
            .filter(|f| !self.contains(**f))
            .copied()
            .collect()
    }

    pub fn useful_count(&self) -> usize {
        Feature::USEFUL.len() - self.excluded_useful().len()
    }

    /// Selected columns that still hold text
    pub fn categorical(&self) -> Vec<Feature> {
        self.features
            .iter()
            .filter(|f| f.is_categorical())
            .copied()
            .collect()
    }

    /// Keep the selected columns plus the label
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let columns: Vec<&str> = self
            .features
            .iter()
            .map(|f| f.column())
            .chain(std::iter::once(TARGET))
            .collect();
        Ok(df.select(columns)?)
    }
}

impl TryFrom<Vec<Feature>> for FeatureSelection {
    type Error = FitLabError;

    fn try_from(features: Vec<Feature>) -> Result<Self> {
        Self::new(features)
    }
}

impl From<FeatureSelection> for Vec<Feature> {
    fn from(selection: FeatureSelection) -> Self {
        selection.features
    }
}

impl Default for FeatureSelection {
    fn default() -> Self {
        Self {
            features: Self::DEFAULT.to_vec(),
        }
    }
}
