//! Passenger dataset
//!
//! The raw Titanic table is loaded once and shared read-only through
//! [`RawTable`]. Every selectable column is named by a [`Feature`] so that
//! the rest of the crate never matches on column strings.

mod loader;

pub use loader::DatasetProvider;

use crate::error::{FitLabError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Binary survival label; never transformed
pub const TARGET: &str = "Survived";

/// Semantic kind of a raw column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Identifier,
    Label,
    OrdinalCategory,
    Category,
    Continuous,
    Count,
    Currency,
    FreeText,
}

/// A selectable column of the passenger table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    PassengerId,
    Pclass,
    Name,
    Sex,
    Age,
    SibSp,
    Parch,
    Ticket,
    Fare,
    Cabin,
    Embarked,
}

impl Feature {
    /// All selectable columns in file order
    pub const ALL: [Feature; 11] = [
        Feature::PassengerId,
        Feature::Pclass,
        Feature::Name,
        Feature::Sex,
        Feature::Age,
        Feature::SibSp,
        Feature::Parch,
        Feature::Ticket,
        Feature::Fare,
        Feature::Cabin,
        Feature::Embarked,
    ];

    /// Curated columns that carry survival signal
    pub const USEFUL: [Feature; 6] = [
        Feature::Pclass,
        Feature::Sex,
        Feature::Age,
        Feature::SibSp,
        Feature::Parch,
        Feature::Fare,
    ];

    /// Columns that start out as text and must be encoded
    pub const CATEGORICAL: [Feature; 5] = [
        Feature::Sex,
        Feature::Embarked,
        Feature::Name,
        Feature::Ticket,
        Feature::Cabin,
    ];

    /// Column name in the CSV
    pub fn column(&self) -> &'static str {
        match self {
            Feature::PassengerId => "PassengerId",
            Feature::Pclass => "Pclass",
            Feature::Name => "Name",
            Feature::Sex => "Sex",
            Feature::Age => "Age",
            Feature::SibSp => "SibSp",
            Feature::Parch => "Parch",
            Feature::Ticket => "Ticket",
            Feature::Fare => "Fare",
            Feature::Cabin => "Cabin",
            Feature::Embarked => "Embarked",
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Feature::PassengerId => ColumnKind::Identifier,
            Feature::Pclass => ColumnKind::OrdinalCategory,
            Feature::Name => ColumnKind::FreeText,
            Feature::Sex | Feature::Embarked => ColumnKind::Category,
            Feature::Age => ColumnKind::Continuous,
            Feature::SibSp | Feature::Parch => ColumnKind::Count,
            Feature::Ticket | Feature::Cabin => ColumnKind::FreeText,
            Feature::Fare => ColumnKind::Currency,
        }
    }

    /// Short description shown next to the column in menus
    pub fn description(&self) -> &'static str {
        match self {
            Feature::PassengerId => "row identifier",
            Feature::Pclass => "ticket class 1-3",
            Feature::Name => "full name with title",
            Feature::Sex => "male / female",
            Feature::Age => "age in years, often missing",
            Feature::SibSp => "siblings and spouses aboard",
            Feature::Parch => "parents and children aboard",
            Feature::Ticket => "ticket number",
            Feature::Fare => "ticket price",
            Feature::Cabin => "cabin number, mostly missing",
            Feature::Embarked => "port of embarkation C/Q/S",
        }
    }

    pub fn is_categorical(&self) -> bool {
        Self::CATEGORICAL.contains(self)
    }

    pub fn is_useful(&self) -> bool {
        Self::USEFUL.contains(self)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Feature {
    type Err = FitLabError;

    fn from_str(s: &str) -> Result<Self> {
        Feature::ALL
            .iter()
            .find(|feature| feature.column().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| FitLabError::FeatureNotFound(s.to_string()))
    }
}

/// Immutable passenger table shared by every session
#[derive(Debug, Clone)]
pub struct RawTable {
    frame: Arc<DataFrame>,
}

impl RawTable {
    /// Wrap a loaded frame after checking that every expected column is there
    /// and that the label is a complete 0/1 column.
    pub fn new(frame: DataFrame) -> Result<Self> {
        let missing: Vec<&str> = std::iter::once(TARGET)
            .chain(Feature::ALL.iter().map(|f| f.column()))
            .filter(|name| frame.column(name).is_err())
            .collect();
        if !missing.is_empty() {
            return Err(FitLabError::DataInvalid(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        let target = frame.column(TARGET)?.cast(&DataType::Float64)?;
        let target = target.f64()?;
        if target.null_count() > 0 {
            return Err(FitLabError::DataInvalid(format!(
                "{} has {} missing values",
                TARGET,
                target.null_count()
            )));
        }
        if let Some(bad) = target.into_iter().flatten().find(|v| *v != 0.0 && *v != 1.0) {
            return Err(FitLabError::DataInvalid(format!(
                "{} must be 0 or 1, found {}",
                TARGET, bad
            )));
        }

        Ok(Self {
            frame: Arc::new(frame),
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        if column == TARGET {
            return Some(ColumnKind::Label);
        }
        column.parse::<Feature>().ok().map(|f| f.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_frame() -> DataFrame {
        df!(
            "PassengerId" => &[1i64, 2, 3],
            "Survived" => &[0i64, 1, 1],
            "Pclass" => &[3i64, 1, 3],
            "Name" => &["Braund, Mr. Owen Harris", "Cumings, Mrs. John Bradley", "Heikkinen, Miss. Laina"],
            "Sex" => &["male", "female", "female"],
            "Age" => &[Some(22.0), Some(38.0), None],
            "SibSp" => &[1i64, 1, 0],
            "Parch" => &[0i64, 0, 0],
            "Ticket" => &["A/5 21171", "PC 17599", "STON/O2. 3101282"],
            "Fare" => &[7.25, 71.2833, 7.925],
            "Cabin" => &[None, Some("C85"), None],
            "Embarked" => &[Some("S"), Some("C"), Some("S")]
        )
        .unwrap()
    }

    #[test]
    fn test_raw_table_accepts_full_schema() {
        let table = RawTable::new(tiny_frame()).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(table.kind_of("Survived"), Some(ColumnKind::Label));
        assert_eq!(table.kind_of("Fare"), Some(ColumnKind::Currency));
    }

    #[test]
    fn test_raw_table_rejects_missing_column() {
        let frame = tiny_frame().drop("Cabin").unwrap();
        let err = RawTable::new(frame).unwrap_err();
        assert!(matches!(err, FitLabError::DataInvalid(ref msg) if msg.contains("Cabin")));
    }

    #[test]
    fn test_raw_table_rejects_non_binary_label() {
        let mut frame = tiny_frame();
        frame
            .with_column(Column::new("Survived".into(), &[0i64, 2, 1]))
            .unwrap();
        assert!(matches!(RawTable::new(frame), Err(FitLabError::DataInvalid(_))));
    }

    #[test]
    fn test_feature_parse() {
        assert_eq!("sibsp".parse::<Feature>().unwrap(), Feature::SibSp);
        assert!("Survived".parse::<Feature>().is_err());
        assert!(Feature::Sex.is_categorical());
        assert!(!Feature::PassengerId.is_useful());
    }
}
