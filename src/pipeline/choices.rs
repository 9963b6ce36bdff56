//! Learner choices, one typed slot per step

use super::PipelineStep;
use crate::dataset::{Feature, RawTable};
use crate::error::Result;
use crate::preprocessing::{AgeStrategy, CleanupStrategy, EncodingPlan, FeatureSelection};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Tree depth clamped into `[MIN, MAX]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaxDepth(usize);

/// Rough expectation for a depth, shown before training
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthHint {
    UnderfitRisk,
    Balanced,
    OverfitRisk,
}

impl MaxDepth {
    pub const MIN: usize = 1;
    pub const MAX: usize = 20;
    pub const DEFAULT: MaxDepth = MaxDepth(5);

    pub fn new(depth: i64) -> Self {
        Self(depth.clamp(Self::MIN as i64, Self::MAX as i64) as usize)
    }

    pub fn get(&self) -> usize {
        self.0
    }

    pub fn hint(&self) -> DepthHint {
        match self.0 {
            0..=2 => DepthHint::UnderfitRisk,
            d if d >= 15 => DepthHint::OverfitRisk,
            _ => DepthHint::Balanced,
        }
    }
}

impl Default for MaxDepth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A choice for exactly one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepChoice {
    Features(FeatureSelection),
    Age(AgeStrategy),
    Encodings(EncodingPlan),
    Cleanup(CleanupStrategy),
    MaxDepth(MaxDepth),
}

impl StepChoice {
    /// The step this choice belongs to
    pub fn step(&self) -> PipelineStep {
        match self {
            StepChoice::Features(_) => PipelineStep::FeatureSelection,
            StepChoice::Age(_) => PipelineStep::MissingValueHandling,
            StepChoice::Encodings(_) => PipelineStep::CategoricalEncoding,
            StepChoice::Cleanup(_) => PipelineStep::FinalCleanup,
            StepChoice::MaxDepth(_) => PipelineStep::HyperparameterChoice,
        }
    }
}

/// Everything the learner decided so far. An empty slot means the step was not reached.
///
/// `version` increases on every mutation so callers can tell when a cached
/// working dataset went stale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceSet {
    version: u64,
    features: Option<FeatureSelection>,
    age: Option<AgeStrategy>,
    encodings: Option<EncodingPlan>,
    cleanup: Option<CleanupStrategy>,
    max_depth: Option<MaxDepth>,
}

impl ChoiceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn features(&self) -> Option<&FeatureSelection> {
        self.features.as_ref()
    }

    pub fn age(&self) -> Option<AgeStrategy> {
        self.age
    }

    pub fn encodings(&self) -> Option<&EncodingPlan> {
        self.encodings.as_ref()
    }

    pub fn cleanup(&self) -> Option<CleanupStrategy> {
        self.cleanup
    }

    pub fn max_depth(&self) -> Option<MaxDepth> {
        self.max_depth
    }

    /// Whether a choice is recorded for `step`
    pub fn has(&self, step: PipelineStep) -> bool {
        match step {
            PipelineStep::Start | PipelineStep::TrainAndEvaluate => false,
            PipelineStep::FeatureSelection => self.features.is_some(),
            PipelineStep::MissingValueHandling => self.age.is_some(),
            PipelineStep::CategoricalEncoding => self.encodings.is_some(),
            PipelineStep::FinalCleanup => self.cleanup.is_some(),
            PipelineStep::HyperparameterChoice => self.max_depth.is_some(),
        }
    }

    pub fn record(&mut self, choice: StepChoice) {
        match choice {
            StepChoice::Features(v) => self.features = Some(v),
            StepChoice::Age(v) => self.age = Some(v),
            StepChoice::Encodings(v) => self.encodings = Some(v),
            StepChoice::Cleanup(v) => self.cleanup = Some(v),
            StepChoice::MaxDepth(v) => self.max_depth = Some(v),
        }
        self.version += 1;
    }

    pub fn clear(&mut self, step: PipelineStep) {
        match step {
            PipelineStep::Start | PipelineStep::TrainAndEvaluate => return,
            PipelineStep::FeatureSelection => self.features = None,
            PipelineStep::MissingValueHandling => self.age = None,
            PipelineStep::CategoricalEncoding => self.encodings = None,
            PipelineStep::FinalCleanup => self.cleanup = None,
            PipelineStep::HyperparameterChoice => self.max_depth = None,
        }
        self.version += 1;
    }

    /// Drop every choice recorded at steps after `step`
    pub fn truncate_after(&mut self, step: PipelineStep) {
        for later in PipelineStep::ALL.iter().filter(|s| **s > step) {
            if self.has(*later) {
                self.clear(*later);
            }
        }
    }

    pub fn clear_all(&mut self) {
        *self = Self {
            version: self.version + 1,
            ..Self::default()
        };
    }

    /// Rebuild the working dataset from the raw table by applying every
    /// recorded choice in step order
    pub fn replay(&self, raw: &RawTable) -> Result<DataFrame> {
        let Some(selection) = &self.features else {
            return Ok(raw.frame().clone());
        };
        let mut df = selection.apply(raw.frame())?;

        if let Some(age) = self.age {
            if selection.contains(Feature::Age) {
                df = age.apply(&df)?;
            }
        }
        if let Some(plan) = &self.encodings {
            df = plan.apply(&df, selection)?;
        }
        if let Some(cleanup) = self.cleanup {
            df = cleanup.apply(&df)?;
        }
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_depth_clamps() {
        assert_eq!(MaxDepth::new(0).get(), 1);
        assert_eq!(MaxDepth::new(-4).get(), 1);
        assert_eq!(MaxDepth::new(7).get(), 7);
        assert_eq!(MaxDepth::new(99).get(), 20);
        assert_eq!(MaxDepth::default().get(), 5);
    }

    #[test]
    fn test_depth_hint() {
        assert_eq!(MaxDepth::new(2).hint(), DepthHint::UnderfitRisk);
        assert_eq!(MaxDepth::new(5).hint(), DepthHint::Balanced);
        assert_eq!(MaxDepth::new(14).hint(), DepthHint::Balanced);
        assert_eq!(MaxDepth::new(15).hint(), DepthHint::OverfitRisk);
    }

    #[test]
    fn test_record_and_truncate() {
        let mut choices = ChoiceSet::new();
        choices.record(StepChoice::Features(FeatureSelection::default()));
        choices.record(StepChoice::Age(AgeStrategy::Median));
        choices.record(StepChoice::Cleanup(CleanupStrategy::DropMissing));
        assert_eq!(choices.version(), 3);

        choices.truncate_after(PipelineStep::MissingValueHandling);
        assert!(choices.has(PipelineStep::FeatureSelection));
        assert!(choices.has(PipelineStep::MissingValueHandling));
        assert!(!choices.has(PipelineStep::FinalCleanup));
        assert_eq!(choices.version(), 4);

        choices.clear_all();
        assert_eq!(choices.features(), None);
        assert_eq!(choices.age(), None);
    }

    #[test]
    fn test_choice_steps() {
        assert_eq!(
            StepChoice::MaxDepth(MaxDepth::DEFAULT).step(),
            PipelineStep::HyperparameterChoice
        );
        assert_eq!(
            StepChoice::Encodings(EncodingPlan::new()).step(),
            PipelineStep::CategoricalEncoding
        );
    }
}
