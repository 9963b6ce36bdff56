//! Survival prediction for a single passenger

use super::{ModelHandle, PrimaryModel};
use crate::error::{FitLabError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prediction inputs. Missing age or fare fall back to stored medians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub pclass: u8,
    pub sex: String,
    pub age: Option<f64>,
    pub sibsp: u32,
    pub parch: u32,
    pub fare: Option<f64>,
}

impl Passenger {
    pub fn new(pclass: u8, sex: impl Into<String>) -> Self {
        Self {
            pclass,
            sex: sex.into(),
            age: None,
            sibsp: 0,
            parch: 0,
            fare: None,
        }
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_family(mut self, sibsp: u32, parch: u32) -> Self {
        self.sibsp = sibsp;
        self.parch = parch;
        self
    }

    pub fn with_fare(mut self, fare: f64) -> Self {
        self.fare = Some(fare);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub survived: bool,
    /// Probability of survival in `[0, 1]`
    pub probability: f64,
    pub label: String,
}

/// Canonical sex value; unknown input counts as male
pub fn normalize_sex(value: &str) -> &'static str {
    match value.trim().to_lowercase().as_str() {
        "female" | "жінка" => "female",
        _ => "male",
    }
}

/// Predicts with the primary model behind a [`ModelHandle`]
#[derive(Debug)]
pub struct SurvivalPredictor<'a> {
    handle: &'a ModelHandle,
}

impl<'a> SurvivalPredictor<'a> {
    pub fn new(handle: &'a ModelHandle) -> Self {
        Self { handle }
    }

    pub fn predict(&self, passenger: &Passenger) -> Result<Prediction> {
        let primary = self.handle.get()?;
        let row = feature_row(primary, passenger)?;
        let x = Array2::from_shape_vec((1, row.len()), row)?;

        let survived = primary.model.predict(&x)?[0] == 1.0;
        let probability = primary.model.predict_positive_proba(&x)?[0].clamp(0.0, 1.0);
        debug!(survived, probability, "Prediction made");

        let label = if survived { "Survived" } else { "Did not survive" };
        Ok(Prediction {
            survived,
            probability,
            label: label.to_string(),
        })
    }

    /// Features sorted from most to least important
    pub fn feature_importance(&self) -> Result<Vec<(String, f64)>> {
        Ok(self.handle.get()?.model.feature_importance())
    }
}

fn valid_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(fallback)
}

/// Lay the passenger out in the model's feature order
fn feature_row(primary: &PrimaryModel, passenger: &Passenger) -> Result<Vec<f64>> {
    let sex = normalize_sex(&passenger.sex);
    let sex_code = primary
        .encoder
        .transform(sex)
        .or_else(|| primary.encoder.transform("male"))
        .unwrap_or(1.0);

    primary
        .model
        .feature_names
        .iter()
        .map(|name| match name.as_str() {
            "Pclass" => Ok(f64::from(passenger.pclass)),
            "Sex" => Ok(sex_code),
            "Age" => Ok(valid_or(passenger.age, primary.stats.age_median)),
            "SibSp" => Ok(f64::from(passenger.sibsp)),
            "Parch" => Ok(f64::from(passenger.parch)),
            "Fare" => Ok(valid_or(passenger.fare, primary.stats.fare_median)),
            other => Err(FitLabError::FeatureNotFound(other.to_string())),
        })
        .collect()
}
