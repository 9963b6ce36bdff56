//! Final cleanup of remaining missing values

use super::{column_f64, is_numeric_dtype, replace_column};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CleanupStrategy {
    /// Drop any row that still has a missing value
    DropMissing,
    /// Leave the frame untouched
    Keep,
    /// Replace missing numeric values with zero
    FillZero,
}

impl CleanupStrategy {
    pub const ALL: [CleanupStrategy; 3] = [
        CleanupStrategy::DropMissing,
        CleanupStrategy::Keep,
        CleanupStrategy::FillZero,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CleanupStrategy::DropMissing => "drop rows with missing values",
            CleanupStrategy::Keep => "leave as is",
            CleanupStrategy::FillZero => "fill missing values with 0",
        }
    }

    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        match self {
            CleanupStrategy::Keep => Ok(df.clone()),
            CleanupStrategy::DropMissing => {
                let out = df.drop_nulls::<String>(None)?;
                debug!(before = df.height(), after = out.height(), "Dropped rows with missing values");
                Ok(out)
            }
            CleanupStrategy::FillZero => {
                let mut out = df.clone();
                for col in df.get_columns() {
                    if col.null_count() == 0 || !is_numeric_dtype(col.dtype()) {
                        continue;
                    }
                    let name = col.name().to_string();
                    let filled = column_f64(&out, &name)?
                        .into_iter()
                        .map(|v| Some(v.unwrap_or(0.0)))
                        .collect();
                    out = replace_column(&out, &name, filled)?;
                }
                Ok(out)
            }
        }
    }
}

impl fmt::Display for CleanupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
