//! Game session: the step state machine over a raw table

use super::{ChoiceSet, MaxDepth, PipelineStep, StepChoice};
use crate::config::DEFAULT_SEED;
use crate::dataset::{Feature, RawTable, TARGET};
use crate::error::{FitLabError, Result};
use crate::feedback::{assess, Assessment, AssessmentInput};
use crate::preprocessing::non_numeric_columns;
use crate::training::{FittedModel, TrainEngine, TrainingConfig, MIN_TRAINING_ROWS};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// One learner walking through the pipeline
#[derive(Debug, Clone)]
pub struct GameSession {
    raw: RawTable,
    state: PipelineStep,
    choices: ChoiceSet,
    model: Option<FittedModel>,
    seed: u64,
}

impl GameSession {
    #[must_use]
    pub fn new(raw: RawTable) -> Self {
        Self {
            raw,
            state: PipelineStep::Start,
            choices: ChoiceSet::new(),
            model: None,
            seed: DEFAULT_SEED,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn state(&self) -> PipelineStep {
        self.state
    }

    #[must_use]
    pub fn choices(&self) -> &ChoiceSet {
        &self.choices
    }

    #[must_use]
    pub fn fitted_model(&self) -> Option<&FittedModel> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn raw(&self) -> &RawTable {
        &self.raw
    }

    /// Whether `step` needs a recorded choice before the session can move on
    pub fn requires_choice(&self, step: PipelineStep) -> bool {
        match step {
            PipelineStep::Start | PipelineStep::TrainAndEvaluate => false,
            PipelineStep::FeatureSelection
            | PipelineStep::FinalCleanup
            | PipelineStep::HyperparameterChoice => true,
            PipelineStep::MissingValueHandling => self
                .choices
                .features()
                .is_some_and(|s| s.contains(Feature::Age)),
            PipelineStep::CategoricalEncoding => self
                .choices
                .features()
                .is_some_and(|s| !s.categorical().is_empty()),
        }
    }

    /// Record a choice for the current step
    pub fn choose(&mut self, choice: StepChoice) -> Result<()> {
        if choice.step() != self.state {
            return Err(FitLabError::InvalidChoice(format!(
                "a {} choice cannot be made at step {}",
                choice.step(),
                self.state
            )));
        }
        if let StepChoice::Encodings(plan) = &choice {
            if let Some(selection) = self.choices.features() {
                plan.check_covers(selection)?;
            }
        }
        debug!(step = %self.state, "Choice recorded");
        self.choices.record(choice);
        Ok(())
    }

    /// Move to the next step. From `HyperparameterChoice` this trains the model.
    pub fn advance(&mut self) -> Result<PipelineStep> {
        let Some(next) = self.state.next() else {
            return Err(FitLabError::InvalidTransition {
                from: self.state.to_string(),
                action: "advance".to_string(),
            });
        };
        if self.requires_choice(self.state) && !self.choices.has(self.state) {
            return Err(FitLabError::InvalidChoice(format!(
                "make a choice for {} first",
                self.state
            )));
        }
        if next == PipelineStep::TrainAndEvaluate {
            self.model = Some(self.train()?);
        }
        info!(from = %self.state, to = %next, "Step advanced");
        self.state = next;
        Ok(next)
    }

    /// Step back, discarding the choice of the step being left and everything after it
    pub fn retreat(&mut self) -> Result<PipelineStep> {
        let Some(prev) = self.state.prev() else {
            return Err(FitLabError::InvalidTransition {
                from: self.state.to_string(),
                action: "retreat".to_string(),
            });
        };
        self.choices.truncate_after(prev);
        if self.state == PipelineStep::TrainAndEvaluate {
            self.model = None;
        }
        info!(from = %self.state, to = %prev, "Step retreated");
        self.state = prev;
        Ok(prev)
    }

    pub fn reset(&mut self) {
        self.state = PipelineStep::Start;
        self.choices.clear_all();
        self.model = None;
        info!("Session reset");
    }

    /// The raw table with every recorded choice applied
    pub fn working_dataset(&self) -> Result<DataFrame> {
        self.choices.replay(&self.raw)
    }

    /// Train again with the recorded choices
    pub fn retrain(&mut self) -> Result<&FittedModel> {
        self.require_trained_state("retrain")?;
        let model = self.train()?;
        Ok(&*self.model.insert(model))
    }

    /// Train again with a new depth. On failure the previous depth and model stay.
    pub fn retrain_with(&mut self, depth: MaxDepth) -> Result<&FittedModel> {
        self.require_trained_state("retrain")?;
        let previous = self.choices.max_depth();
        self.choices.record(StepChoice::MaxDepth(depth));
        match self.train() {
            Ok(model) => Ok(&*self.model.insert(model)),
            Err(e) => {
                if let Some(old) = previous {
                    self.choices.record(StepChoice::MaxDepth(old));
                }
                Err(e)
            }
        }
    }

    /// Scoring of the current model, if there is one
    pub fn assessment(&self) -> Option<Assessment> {
        let model = self.model.as_ref()?;
        let features = self.choices.features()?;
        Some(assess(&AssessmentInput {
            features,
            age: self.choices.age(),
            encodings: self.choices.encodings(),
            max_depth: model.max_depth,
            train_accuracy: model.metrics.train_accuracy,
            test_accuracy: model.metrics.test_accuracy,
            f1_score: model.metrics.f1_score,
        }))
    }

    fn require_trained_state(&self, action: &str) -> Result<()> {
        if self.state == PipelineStep::TrainAndEvaluate {
            Ok(())
        } else {
            Err(FitLabError::InvalidTransition {
                from: self.state.to_string(),
                action: action.to_string(),
            })
        }
    }

    fn train(&self) -> Result<FittedModel> {
        let depth = self
            .choices
            .max_depth()
            .ok_or_else(|| FitLabError::InvalidChoice("choose a max depth first".to_string()))?;
        let df = prepare_training_frame(self.working_dataset()?)?;
        let config = TrainingConfig::new(depth.get()).with_random_seed(self.seed);
        TrainEngine::new(config).fit_frame(&df, TARGET)
    }
}

/// Check the working dataset and drop rows that still carry a null
fn prepare_training_frame(df: DataFrame) -> Result<DataFrame> {
    if df.column(TARGET).is_err() {
        return Err(FitLabError::DataInvalid(format!(
            "target column '{}' is missing",
            TARGET
        )));
    }
    let non_numeric = non_numeric_columns(&df);
    if !non_numeric.is_empty() {
        return Err(FitLabError::DataInvalid(format!(
            "encode these columns before training: {}",
            non_numeric.join(", ")
        )));
    }

    let before = df.height();
    let df = df.drop_nulls::<String>(None)?;
    if df.height() < before {
        warn!(
            dropped = before - df.height(),
            remaining = df.height(),
            "Dropped rows with missing values before training"
        );
    }
    if df.height() < MIN_TRAINING_ROWS {
        return Err(FitLabError::DataInvalid(format!(
            "only {} rows left; at least {} are needed",
            df.height(),
            MIN_TRAINING_ROWS
        )));
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::{AgeStrategy, CleanupStrategy, EncodingPlan, FeatureSelection, SexEncoding};

    fn table(n: usize) -> RawTable {
        let ids: Vec<i64> = (1..=n as i64).collect();
        let survived: Vec<i64> = (0..n).map(|i| i64::from(i % 3 == 0)).collect();
        let pclass: Vec<i64> = (0..n).map(|i| (i % 3) as i64 + 1).collect();
        let names: Vec<String> = (0..n).map(|i| format!("Person {}, Mr. A", i)).collect();
        let sex: Vec<&str> = (0..n).map(|i| if i % 3 == 0 { "female" } else { "male" }).collect();
        let age: Vec<Option<f64>> = (0..n)
            .map(|i| if i % 5 == 0 { None } else { Some(20.0 + (i % 40) as f64) })
            .collect();
        let sibsp: Vec<i64> = (0..n).map(|i| (i % 2) as i64).collect();
        let parch: Vec<i64> = vec![0; n];
        let tickets: Vec<String> = (0..n).map(|i| format!("{}", 1000 + i)).collect();
        let fare: Vec<f64> = (0..n).map(|i| 7.0 + (i % 10) as f64).collect();
        let cabin: Vec<Option<&str>> = vec![None; n];
        let embarked: Vec<Option<&str>> = vec![Some("S"); n];
        let df = df!(
            "PassengerId" => ids,
            "Survived" => survived,
            "Pclass" => pclass,
            "Name" => names,
            "Sex" => sex,
            "Age" => age,
            "SibSp" => sibsp,
            "Parch" => parch,
            "Ticket" => tickets,
            "Fare" => fare,
            "Cabin" => cabin,
            "Embarked" => embarked
        )
        .unwrap();
        RawTable::new(df).unwrap()
    }

    fn walk_to_depth(session: &mut GameSession) {
        session.advance().unwrap();
        session
            .choose(StepChoice::Features(FeatureSelection::default()))
            .unwrap();
        session.advance().unwrap();
        session.choose(StepChoice::Age(AgeStrategy::Median)).unwrap();
        session.advance().unwrap();
        session
            .choose(StepChoice::Encodings(EncodingPlan::new().with_sex(SexEncoding::MaleOne)))
            .unwrap();
        session.advance().unwrap();
        session
            .choose(StepChoice::Cleanup(CleanupStrategy::DropMissing))
            .unwrap();
        session.advance().unwrap();
        session.choose(StepChoice::MaxDepth(MaxDepth::new(4))).unwrap();
    }

    #[test]
    fn test_full_walk_trains() {
        let mut session = GameSession::new(table(120));
        walk_to_depth(&mut session);
        assert_eq!(session.advance().unwrap(), PipelineStep::TrainAndEvaluate);
        let model = session.fitted_model().unwrap();
        assert_eq!(model.feature_names, vec!["Pclass", "Sex", "Age"]);
        assert_eq!(model.metrics.test_accuracy, 1.0);
        assert!(session.assessment().is_some());
    }

    #[test]
    fn test_choice_for_other_step_rejected() {
        let mut session = GameSession::new(table(60));
        session.advance().unwrap();
        let err = session
            .choose(StepChoice::MaxDepth(MaxDepth::DEFAULT))
            .unwrap_err();
        assert!(matches!(err, FitLabError::InvalidChoice(_)));
        assert!(session.choices().max_depth().is_none());
    }

    #[test]
    fn test_advance_requires_choice() {
        let mut session = GameSession::new(table(60));
        session.advance().unwrap();
        assert!(matches!(session.advance(), Err(FitLabError::InvalidChoice(_))));
        assert_eq!(session.state(), PipelineStep::FeatureSelection);
    }

    #[test]
    fn test_age_step_skippable_without_age() {
        let mut session = GameSession::new(table(60));
        session.advance().unwrap();
        session
            .choose(StepChoice::Features(FeatureSelection::new([Feature::Pclass]).unwrap()))
            .unwrap();
        session.advance().unwrap();
        assert_eq!(session.advance().unwrap(), PipelineStep::CategoricalEncoding);
        assert_eq!(session.advance().unwrap(), PipelineStep::FinalCleanup);
    }

    #[test]
    fn test_incomplete_encoding_plan_rejected() {
        let mut session = GameSession::new(table(60));
        session.advance().unwrap();
        session
            .choose(StepChoice::Features(
                FeatureSelection::new([Feature::Sex, Feature::Embarked]).unwrap(),
            ))
            .unwrap();
        session.advance().unwrap();
        session.advance().unwrap();
        let plan = EncodingPlan::new().with_sex(SexEncoding::FemaleOne);
        assert!(matches!(
            session.choose(StepChoice::Encodings(plan)),
            Err(FitLabError::InvalidChoice(ref m)) if m.contains("Embarked")
        ));
    }

    #[test]
    fn test_retreat_from_start_rejected() {
        let mut session = GameSession::new(table(60));
        let err = session.retreat().unwrap_err();
        assert_eq!(err.to_string(), "Cannot retreat from step Start");
    }

    #[test]
    fn test_retreat_drops_model_and_reset_clears() {
        let mut session = GameSession::new(table(120));
        walk_to_depth(&mut session);
        session.advance().unwrap();
        assert_eq!(session.retreat().unwrap(), PipelineStep::HyperparameterChoice);
        assert!(session.fitted_model().is_none());
        assert!(session.choices().max_depth().is_some());

        session.reset();
        assert_eq!(session.state(), PipelineStep::Start);
        assert!(session.choices().features().is_none());
    }

    #[test]
    fn test_text_columns_block_training() {
        let mut session = GameSession::new(table(120));
        session.advance().unwrap();
        session
            .choose(StepChoice::Features(FeatureSelection::new([Feature::Ticket]).unwrap()))
            .unwrap();
        session.advance().unwrap();
        session.advance().unwrap();
        assert!(session.advance().is_err());
        assert_eq!(session.state(), PipelineStep::CategoricalEncoding);
    }

    #[test]
    fn test_retrain_with_depth() {
        let mut session = GameSession::new(table(120));
        assert!(matches!(session.retrain(), Err(FitLabError::InvalidTransition { .. })));
        walk_to_depth(&mut session);
        session.advance().unwrap();
        let model = session.retrain_with(MaxDepth::new(1)).unwrap();
        assert_eq!(model.max_depth, 1);
        assert_eq!(session.choices().max_depth(), Some(MaxDepth::new(1)));
        assert_eq!(session.state(), PipelineStep::TrainAndEvaluate);
    }
}
