//! Integration test: the pipeline game end-to-end

mod common;

use common::{small_table, titanic_table};
use fitlab::dataset::Feature;
use fitlab::error::FitLabError;
use fitlab::feedback::FitLabel;
use fitlab::pipeline::{GameSession, MaxDepth, PipelineStep, StepChoice};
use fitlab::preprocessing::{
    AgeStrategy, CleanupStrategy, EmbarkedEncoding, EncodingPlan, FeatureSelection, SexEncoding,
};

fn features(list: &[Feature]) -> StepChoice {
    StepChoice::Features(FeatureSelection::new(list.iter().copied()).unwrap())
}

/// Advance from `Start` through every step, recording the given choices
fn play(
    session: &mut GameSession,
    selected: &[Feature],
    age: Option<AgeStrategy>,
    plan: Option<EncodingPlan>,
    cleanup: CleanupStrategy,
    depth: i64,
) -> fitlab::Result<PipelineStep> {
    session.advance()?;
    session.choose(features(selected))?;
    session.advance()?;
    if let Some(age) = age {
        session.choose(StepChoice::Age(age))?;
    }
    session.advance()?;
    if let Some(plan) = plan {
        session.choose(StepChoice::Encodings(plan))?;
    }
    session.advance()?;
    session.choose(StepChoice::Cleanup(cleanup))?;
    session.advance()?;
    session.choose(StepChoice::MaxDepth(MaxDepth::new(depth)))?;
    session.advance()
}

#[test]
fn test_good_fit_scenario() {
    let mut session = GameSession::new(titanic_table());
    let state = play(
        &mut session,
        &Feature::USEFUL,
        Some(AgeStrategy::Median),
        Some(EncodingPlan::new().with_sex(SexEncoding::MaleOne)),
        CleanupStrategy::DropMissing,
        5,
    )
    .unwrap();
    assert_eq!(state, PipelineStep::TrainAndEvaluate);

    let model = session.fitted_model().unwrap();
    assert_eq!(model.feature_names.len(), 6);
    assert_eq!(model.metrics.n_train + model.metrics.n_test, 891);

    let assessment = session.assessment().unwrap();
    assert_eq!(assessment.fit_label, FitLabel::GoodFit);
    assert!((assessment.difference - model.metrics.difference()).abs() < 1e-9);
    assert_eq!(model.feature_importance()[0].0, "Sex");
}

#[test]
fn test_passenger_id_underfits() {
    let mut session = GameSession::new(titanic_table());
    play(
        &mut session,
        &[Feature::PassengerId],
        None,
        None,
        CleanupStrategy::Keep,
        3,
    )
    .unwrap();

    let assessment = session.assessment().unwrap();
    assert_eq!(assessment.fit_label, FitLabel::Underfitting);
    assert!(assessment
        .recommendations
        .iter()
        .any(|r| r.contains("PassengerId")));
}

#[test]
fn test_too_few_rows_stays_before_training() {
    // 60 rows, every fifth age missing: 48 rows survive the drop
    let mut session = GameSession::new(small_table(60));
    let err = play(
        &mut session,
        &[Feature::Pclass, Feature::Sex, Feature::Age],
        Some(AgeStrategy::DropRows),
        Some(EncodingPlan::new().with_sex(SexEncoding::FemaleOne)),
        CleanupStrategy::DropMissing,
        5,
    )
    .unwrap_err();

    assert!(matches!(err, FitLabError::DataInvalid(_)));
    assert_eq!(session.state(), PipelineStep::HyperparameterChoice);
    assert!(session.fitted_model().is_none());
    assert!(session.assessment().is_none());
}

#[test]
fn test_replay_is_deterministic() {
    let raw = titanic_table();
    let mut a = GameSession::new(raw.clone());
    let mut b = GameSession::new(raw);
    for session in [&mut a, &mut b] {
        play(
            session,
            &[Feature::Pclass, Feature::Sex, Feature::Age, Feature::Embarked],
            Some(AgeStrategy::Mean),
            Some(
                EncodingPlan::new()
                    .with_sex(SexEncoding::SurvivalWeighted)
                    .with_embarked(EmbarkedEncoding::Popularity),
            ),
            CleanupStrategy::FillZero,
            4,
        )
        .unwrap();
    }

    let first = a.working_dataset().unwrap();
    assert!(first.equals_missing(&a.working_dataset().unwrap()));
    assert!(first.equals_missing(&b.working_dataset().unwrap()));

    let (ma, mb) = (a.fitted_model().unwrap(), b.fitted_model().unwrap());
    assert_eq!(ma.metrics.train_accuracy, mb.metrics.train_accuracy);
    assert_eq!(ma.metrics.test_accuracy, mb.metrics.test_accuracy);
    assert_eq!(ma.feature_importance(), mb.feature_importance());
}

#[test]
fn test_retreat_leaves_no_residue() {
    let raw = titanic_table();
    let mut session = GameSession::new(raw.clone());
    session.advance().unwrap();
    session
        .choose(features(&[Feature::Pclass, Feature::Sex, Feature::Embarked]))
        .unwrap();
    session.advance().unwrap();
    session.advance().unwrap();
    session
        .choose(StepChoice::Encodings(
            EncodingPlan::new()
                .with_sex(SexEncoding::OppositeSigns)
                .with_embarked(EmbarkedEncoding::Alphabetical),
        ))
        .unwrap();
    session.advance().unwrap();
    session
        .choose(StepChoice::Cleanup(CleanupStrategy::FillZero))
        .unwrap();

    // back to feature selection
    while session.state() != PipelineStep::FeatureSelection {
        session.retreat().unwrap();
    }
    assert!(session.choices().features().is_some());
    assert!(session.choices().encodings().is_none());
    assert!(session.choices().cleanup().is_none());

    session
        .choose(features(&[Feature::Pclass, Feature::Age]))
        .unwrap();
    session.advance().unwrap();
    session.choose(StepChoice::Age(AgeStrategy::Median)).unwrap();
    session.advance().unwrap();
    session.advance().unwrap();
    session.choose(StepChoice::Cleanup(CleanupStrategy::Keep)).unwrap();

    let revised = session.working_dataset().unwrap();
    let names: Vec<&str> = revised
        .get_column_names()
        .into_iter()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(names, vec!["Pclass", "Age", "Survived"]);

    let mut fresh = GameSession::new(raw);
    fresh.advance().unwrap();
    fresh.choose(features(&[Feature::Pclass, Feature::Age])).unwrap();
    fresh.advance().unwrap();
    fresh.choose(StepChoice::Age(AgeStrategy::Median)).unwrap();
    fresh.advance().unwrap();
    fresh.advance().unwrap();
    fresh.choose(StepChoice::Cleanup(CleanupStrategy::Keep)).unwrap();
    assert!(revised.equals_missing(&fresh.working_dataset().unwrap()));
}

#[test]
fn test_missing_embarked_takes_fallback() {
    let mut session = GameSession::new(small_table(100));
    session.advance().unwrap();
    session.choose(features(&[Feature::Embarked])).unwrap();
    session.advance().unwrap();
    session.advance().unwrap();
    session
        .choose(StepChoice::Encodings(
            EncodingPlan::new().with_embarked(EmbarkedEncoding::Alphabetical),
        ))
        .unwrap();

    let df = session.working_dataset().unwrap();
    let embarked: Vec<Option<f64>> = df
        .column("Embarked")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    // every tenth passenger has no port
    assert_eq!(embarked[9], Some(0.0));
    assert_eq!(embarked[0], Some(1.0));
    assert_eq!(embarked[2], Some(2.0));
    assert!(embarked.iter().all(|v| v.is_some()));
}

#[test]
fn test_retrain_and_reset() {
    let mut session = GameSession::new(titanic_table());
    play(
        &mut session,
        &Feature::USEFUL,
        Some(AgeStrategy::Median),
        Some(EncodingPlan::new().with_sex(SexEncoding::FemaleOne)),
        CleanupStrategy::DropMissing,
        5,
    )
    .unwrap();

    let deep = session.retrain_with(MaxDepth::new(15)).unwrap();
    assert_eq!(deep.max_depth, 15);
    assert_eq!(session.state(), PipelineStep::TrainAndEvaluate);
    assert_eq!(session.choices().max_depth(), Some(MaxDepth::new(15)));

    let again = session.retrain().unwrap().metrics;
    assert_eq!(again.train_accuracy, session.fitted_model().unwrap().metrics.train_accuracy);

    session.reset();
    assert_eq!(session.state(), PipelineStep::Start);
    assert!(session.fitted_model().is_none());
    assert!(!session.choices().has(PipelineStep::FeatureSelection));
    assert!(matches!(session.retrain(), Err(FitLabError::InvalidTransition { .. })));
}

#[test]
fn test_terminal_step_cannot_advance() {
    let mut session = GameSession::new(titanic_table());
    play(
        &mut session,
        &[Feature::Sex],
        None,
        Some(EncodingPlan::new().with_sex(SexEncoding::MaleOne)),
        CleanupStrategy::Keep,
        2,
    )
    .unwrap();
    let err = session.advance().unwrap_err();
    assert_eq!(err.to_string(), "Cannot advance from step Train and evaluate");
}

#[test]
fn test_retreat_walks_back_through_pass_through_steps() {
    let mut session = GameSession::new(titanic_table());
    session.advance().unwrap();
    session.choose(features(&[Feature::Pclass, Feature::Fare])).unwrap();
    session.advance().unwrap();
    assert!(!session.requires_choice(PipelineStep::MissingValueHandling));
    session.advance().unwrap();
    assert!(!session.requires_choice(PipelineStep::CategoricalEncoding));
    session.advance().unwrap();
    assert_eq!(session.state(), PipelineStep::FinalCleanup);

    assert_eq!(session.retreat().unwrap(), PipelineStep::CategoricalEncoding);
    assert_eq!(session.retreat().unwrap(), PipelineStep::MissingValueHandling);
    assert_eq!(session.retreat().unwrap(), PipelineStep::FeatureSelection);
    assert!(session.choices().features().is_some());

    session.choose(features(&[Feature::Sex])).unwrap();
    session.advance().unwrap();
    session.advance().unwrap();
    assert!(session.requires_choice(PipelineStep::CategoricalEncoding));
    assert!(session.advance().is_err());
    assert_eq!(session.state(), PipelineStep::CategoricalEncoding);
}

#[test]
fn test_empty_stored_selection_is_rejected() {
    let err = serde_json::from_str::<StepChoice>(r#"{"Features":[]}"#).unwrap_err();
    assert!(err.to_string().contains("select at least one feature"));

    let choice: StepChoice = serde_json::from_str(r#"{"Features":["Sex"]}"#).unwrap();
    let mut session = GameSession::new(titanic_table());
    session.advance().unwrap();
    session.choose(choice).unwrap();
    assert_eq!(session.advance().unwrap(), PipelineStep::MissingValueHandling);
}
