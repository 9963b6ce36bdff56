//! Transform step library
//!
//! Pure per-column transforms used by the game pipeline:
//! - Feature selection
//! - Age imputation
//! - Categorical encoding (one closed enum per text column)
//! - Final cleanup of remaining missing values
//!
//! Every transform takes a frame by reference and returns a new frame.

mod cleanup;
mod encoder;
mod imputer;
mod selection;

pub use cleanup::CleanupStrategy;
pub use encoder::{
    CabinEncoding, ColumnEncoding, EmbarkedEncoding, EncodingPlan, NameEncoding, SexEncoding,
    TicketEncoding,
};
pub use imputer::AgeStrategy;
pub(crate) use imputer::median;
pub use selection::FeatureSelection;

use crate::error::{FitLabError, Result};
use polars::prelude::*;

/// Whether a column can be fed to the decision tree as-is
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

/// Names of columns that are not numeric
pub fn non_numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| !is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Numeric view of a column, nulls kept as `None`
pub(crate) fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| FitLabError::FeatureNotFound(name.to_string()))?;
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Text view of a column, nulls kept as `None`
pub(crate) fn column_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| FitLabError::FeatureNotFound(name.to_string()))?;
    let cast = column.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Replace (or add) a Float64 column
pub(crate) fn replace_column(df: &DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<DataFrame> {
    let mut out = df.clone();
    out.with_column(Column::new(name.into(), values))?;
    Ok(out)
}
