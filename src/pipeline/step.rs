//! Pipeline steps

use serde::{Deserialize, Serialize};
use std::fmt;

/// Linear sequence of game steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineStep {
    Start,
    FeatureSelection,
    MissingValueHandling,
    CategoricalEncoding,
    FinalCleanup,
    HyperparameterChoice,
    TrainAndEvaluate,
}

impl PipelineStep {
    pub const ALL: [PipelineStep; 7] = [
        PipelineStep::Start,
        PipelineStep::FeatureSelection,
        PipelineStep::MissingValueHandling,
        PipelineStep::CategoricalEncoding,
        PipelineStep::FinalCleanup,
        PipelineStep::HyperparameterChoice,
        PipelineStep::TrainAndEvaluate,
    ];

    /// Position in [`ALL`](Self::ALL)
    pub fn index(&self) -> usize {
        *self as usize
    }

    #[must_use]
    pub fn next(&self) -> Option<PipelineStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    #[must_use]
    pub fn prev(&self) -> Option<PipelineStep> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn is_terminal(&self) -> bool {
        *self == PipelineStep::TrainAndEvaluate
    }

    pub fn title(&self) -> &'static str {
        match self {
            PipelineStep::Start => "Start",
            PipelineStep::FeatureSelection => "Feature selection",
            PipelineStep::MissingValueHandling => "Missing values",
            PipelineStep::CategoricalEncoding => "Categorical encoding",
            PipelineStep::FinalCleanup => "Final cleanup",
            PipelineStep::HyperparameterChoice => "Hyperparameters",
            PipelineStep::TrainAndEvaluate => "Train and evaluate",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        assert_eq!(PipelineStep::Start.prev(), None);
        assert_eq!(PipelineStep::Start.next(), Some(PipelineStep::FeatureSelection));
        assert_eq!(PipelineStep::TrainAndEvaluate.next(), None);
        assert_eq!(
            PipelineStep::TrainAndEvaluate.prev(),
            Some(PipelineStep::HyperparameterChoice)
        );
        for (i, step) in PipelineStep::ALL.iter().enumerate() {
            assert_eq!(step.index(), i);
        }
    }
}
