//! Scoring and feedback
//!
//! Pure post-hoc commentary on a finished run. Nothing here feeds back
//! into training.

use crate::dataset::Feature;
use crate::preprocessing::{AgeStrategy, EncodingPlan, FeatureSelection, SexEncoding};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Train/test gap above which a model counts as overfitting
pub const OVERFIT_GAP: f64 = 0.15;
/// Test accuracy below which a model counts as underfitting
pub const UNDERFIT_ACCURACY: f64 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitLabel {
    Overfitting,
    Underfitting,
    GoodFit,
}

impl FitLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitLabel::Overfitting => "Overfitting",
            FitLabel::Underfitting => "Underfitting",
            FitLabel::GoodFit => "Good Fit",
        }
    }
}

impl fmt::Display for FitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall verdict, independent of the fit label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Excellent,
    Good,
    CouldBeBetter,
    NeedsImprovement,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent",
            Tier::Good => "Good",
            Tier::CouldBeBetter => "Could be better",
            Tier::NeedsImprovement => "Needs improvement",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Celebrate,
    Positive,
    Warning,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub severity: Severity,
    pub message: String,
}

impl FeedbackItem {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Everything the rules look at
#[derive(Debug, Clone, Copy)]
pub struct AssessmentInput<'a> {
    pub features: &'a FeatureSelection,
    pub age: Option<AgeStrategy>,
    pub encodings: Option<&'a EncodingPlan>,
    pub max_depth: usize,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub f1_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub fit_label: FitLabel,
    pub tier: Tier,
    /// `train_accuracy - test_accuracy`
    pub difference: f64,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub f1_score: f64,
    pub items: Vec<FeedbackItem>,
    pub recommendations: Vec<String>,
}

pub fn fit_label(train_accuracy: f64, test_accuracy: f64) -> FitLabel {
    let difference = train_accuracy - test_accuracy;
    if difference > OVERFIT_GAP {
        FitLabel::Overfitting
    } else if test_accuracy < UNDERFIT_ACCURACY {
        FitLabel::Underfitting
    } else {
        FitLabel::GoodFit
    }
}

pub fn tier(train_accuracy: f64, test_accuracy: f64) -> Tier {
    let difference = train_accuracy - test_accuracy;
    if test_accuracy >= 0.80 && difference < 0.10 {
        Tier::Excellent
    } else if test_accuracy >= 0.75 && difference < 0.15 {
        Tier::Good
    } else if test_accuracy >= 0.70 {
        Tier::CouldBeBetter
    } else {
        Tier::NeedsImprovement
    }
}

/// One-line explanation of a fit label
pub fn explain(label: FitLabel) -> &'static str {
    match label {
        FitLabel::Overfitting => {
            "The tree memorised the training rows; accuracy drops on passengers it has not seen."
        }
        FitLabel::Underfitting => {
            "The tree is too simple or its inputs carry no signal; it does poorly even on familiar rows."
        }
        FitLabel::GoodFit => {
            "Training and test accuracy are close and both high: the tree learned patterns that generalise."
        }
    }
}

fn pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

pub fn assess(input: &AssessmentInput<'_>) -> Assessment {
    let difference = input.train_accuracy - input.test_accuracy;
    let test = input.test_accuracy;
    let useful = input.features.useful_count();
    let uses_id = input.features.contains(Feature::PassengerId);
    let mut items = Vec::new();

    if uses_id {
        items.push(FeedbackItem::new(
            Severity::Warning,
            "PassengerId carries no information about survival",
        ));
    } else {
        items.push(FeedbackItem::new(Severity::Positive, "Left out PassengerId"));
    }

    let total = Feature::USEFUL.len();
    items.push(match useful {
        n if n >= 5 => FeedbackItem::new(
            Severity::Positive,
            format!("Picked {} of the {} most useful features", n, total),
        ),
        n if n >= 3 => FeedbackItem::new(
            Severity::Warning,
            format!("Picked {} useful features; more would help", n),
        ),
        n => FeedbackItem::new(Severity::Negative, format!("Only {} useful features selected", n)),
    });

    if input.features.contains(Feature::Age) {
        match input.age {
            Some(AgeStrategy::Median) => items.push(FeedbackItem::new(
                Severity::Positive,
                "Median is the robust choice for missing ages",
            )),
            Some(AgeStrategy::Mean) => items.push(FeedbackItem::new(
                Severity::Warning,
                "Mean works, but the median is less sensitive to outliers",
            )),
            Some(AgeStrategy::DropRows) => items.push(FeedbackItem::new(
                Severity::Warning,
                "Dropping rows without an age throws away a lot of data",
            )),
            Some(AgeStrategy::Keep) | None => {}
        }
    }

    match input.encodings.and_then(|plan| plan.sex) {
        Some(SexEncoding::SurvivalWeighted) => items.push(FeedbackItem::new(
            Severity::Positive,
            "Interesting Sex encoding: it follows the survival statistics",
        )),
        Some(SexEncoding::OppositeSigns) => items.push(FeedbackItem::new(
            Severity::Positive,
            "Creative Sex encoding",
        )),
        _ => {}
    }

    let depth = input.max_depth;
    items.push(match depth {
        3..=7 => FeedbackItem::new(Severity::Positive, format!("max_depth = {} is a good balance", depth)),
        0..=2 => FeedbackItem::new(
            Severity::Warning,
            format!("max_depth = {} may be too shallow", depth),
        ),
        _ => FeedbackItem::new(
            Severity::Warning,
            format!("max_depth = {} may lead to overfitting", depth),
        ),
    });

    if difference > OVERFIT_GAP {
        items.push(FeedbackItem::new(
            Severity::Warning,
            format!("Large train/test gap ({}): a sign of overfitting", pct(difference)),
        ));
    } else if difference < 0.05 {
        items.push(FeedbackItem::new(
            Severity::Positive,
            format!("Small train/test gap ({}): well balanced", pct(difference)),
        ));
    }

    if test >= 0.80 {
        items.push(FeedbackItem::new(
            Severity::Celebrate,
            format!("Excellent test accuracy: {}", pct(test)),
        ));
    } else if test >= 0.75 {
        items.push(FeedbackItem::new(
            Severity::Positive,
            format!("Good test accuracy: {}", pct(test)),
        ));
    } else if test < 0.65 {
        items.push(FeedbackItem::new(
            Severity::Warning,
            format!("Low test accuracy: {}", pct(test)),
        ));
    }

    let mut recommendations = Vec::new();
    if test < 0.80 || difference > 0.10 {
        if difference > OVERFIT_GAP {
            recommendations.push("Reduce max_depth to limit overfitting".to_string());
        }
        if test < 0.65 {
            recommendations.push("Increase max_depth or add more features".to_string());
        }
        if uses_id {
            recommendations.push("Remove PassengerId; it only adds noise".to_string());
        }
        if useful < 4 {
            let missing: Vec<String> = input
                .features
                .excluded_useful()
                .iter()
                .map(|f| f.to_string())
                .collect();
            recommendations.push(format!("Add more useful features: {}", missing.join(", ")));
        }
    }

    Assessment {
        fit_label: fit_label(input.train_accuracy, test),
        tier: tier(input.train_accuracy, test),
        difference,
        train_accuracy: input.train_accuracy,
        test_accuracy: test,
        f1_score: input.f1_score,
        items,
        recommendations,
    }
}
