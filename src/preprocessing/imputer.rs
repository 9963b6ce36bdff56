//! Missing age handling

use super::{column_f64, replace_column};
use crate::dataset::Feature;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Strategy for missing `Age` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeStrategy {
    /// Leave the gaps for the final cleanup step
    Keep,
    /// Drop every row without an age
    DropRows,
    /// Fill with the mean age
    Mean,
    /// Fill with the median age
    Median,
}

impl AgeStrategy {
    pub const ALL: [AgeStrategy; 4] = [
        AgeStrategy::Keep,
        AgeStrategy::DropRows,
        AgeStrategy::Mean,
        AgeStrategy::Median,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeStrategy::Keep => "leave missing",
            AgeStrategy::DropRows => "drop rows with missing age",
            AgeStrategy::Mean => "fill with mean",
            AgeStrategy::Median => "fill with median",
        }
    }

    /// Apply to a frame that contains `Age`; frames without it pass through
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let name = Feature::Age.column();
        if df.column(name).is_err() {
            return Ok(df.clone());
        }

        match self {
            AgeStrategy::Keep => Ok(df.clone()),
            AgeStrategy::DropRows => {
                let mask = df.column(name)?.as_materialized_series().is_not_null();
                let out = df.filter(&mask)?;
                debug!(before = df.height(), after = out.height(), "Dropped rows without age");
                Ok(out)
            }
            AgeStrategy::Mean | AgeStrategy::Median => {
                let values = column_f64(df, name)?;
                let fill = match self {
                    AgeStrategy::Mean => mean(&values),
                    _ => median(&values),
                };
                let Some(fill) = fill else {
                    return Ok(df.clone());
                };
                debug!(strategy = ?self, fill, "Filling missing ages");
                let filled = values.into_iter().map(|v| Some(v.unwrap_or(fill))).collect();
                replace_column(df, name, filled)
            }
        }
    }
}

impl fmt::Display for AgeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub(crate) fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

pub(crate) fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(|a, b| a.total_cmp(b));
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ages() -> DataFrame {
        df!(
            "Age" => &[Some(10.0), None, Some(30.0), Some(80.0), None],
            "Survived" => &[1i64, 0, 1, 0, 0]
        )
        .unwrap()
    }

    #[test]
    fn test_keep_leaves_nulls() {
        let out = AgeStrategy::Keep.apply(&ages()).unwrap();
        assert_eq!(out.column("Age").unwrap().null_count(), 2);
    }

    #[test]
    fn test_drop_rows() {
        let out = AgeStrategy::DropRows.apply(&ages()).unwrap();
        assert_eq!(out.height(), 3);
        assert_eq!(out.column("Age").unwrap().null_count(), 0);
    }

    #[test]
    fn test_median_fill() {
        let out = AgeStrategy::Median.apply(&ages()).unwrap();
        let values = column_f64(&out, "Age").unwrap();
        assert_eq!(values[1], Some(30.0));
        assert_eq!(values[4], Some(30.0));
    }

    #[test]
    fn test_mean_fill() {
        let out = AgeStrategy::Mean.apply(&ages()).unwrap();
        let values = column_f64(&out, "Age").unwrap();
        assert_eq!(values[1], Some(40.0));
        assert_eq!(out.height(), 5);
    }

    #[test]
    fn test_without_age_column_is_noop() {
        let df = df!("Fare" => &[1.0, 2.0]).unwrap();
        let out = AgeStrategy::DropRows.apply(&df).unwrap();
        assert!(out.equals_missing(&df));
    }

    #[test]
    fn test_median_even() {
        assert_eq!(median(&[Some(1.0), Some(4.0), None, Some(2.0), Some(3.0)]), Some(2.5));
        assert_eq!(median(&[None]), None);
    }
}
