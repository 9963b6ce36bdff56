//! Categorical encodings
//!
//! Each text column has a closed set of encodings. A variant maps a raw
//! value to a number and defines the value used for missing or unseen input.

use super::{column_strings, replace_column, FeatureSelection};
use crate::dataset::Feature;
use crate::error::{FitLabError, Result};
use polars::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ([A-Za-z]+)\.").expect("title pattern is valid"));

/// Bucket for titles outside the common five
const RARE_TITLE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SexEncoding {
    /// male = 1, female = 0
    MaleOne,
    /// female = 1, male = 0
    FemaleOne,
    /// male = 1, female = 3, weighted by survival rate
    SurvivalWeighted,
    /// male = -1, female = 1
    OppositeSigns,
}

impl SexEncoding {
    pub const ALL: [SexEncoding; 4] = [
        SexEncoding::MaleOne,
        SexEncoding::FemaleOne,
        SexEncoding::SurvivalWeighted,
        SexEncoding::OppositeSigns,
    ];

    fn codes(&self) -> (f64, f64) {
        match self {
            SexEncoding::MaleOne => (1.0, 0.0),
            SexEncoding::FemaleOne => (0.0, 1.0),
            SexEncoding::SurvivalWeighted => (1.0, 3.0),
            SexEncoding::OppositeSigns => (-1.0, 1.0),
        }
    }

    /// Unknown and missing values take the male code
    pub fn encode(&self, value: Option<&str>) -> f64 {
        let (male, female) = self.codes();
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "female" => female,
            _ => male,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SexEncoding::MaleOne => "male=1, female=0",
            SexEncoding::FemaleOne => "female=1, male=0",
            SexEncoding::SurvivalWeighted => "male=1, female=3 (survival-weighted)",
            SexEncoding::OppositeSigns => "male=-1, female=1 (opposite signs)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbarkedEncoding {
    /// C = 1, Q = 2, S = 3
    Alphabetical,
    /// S = 3, C = 2, Q = 1
    Popularity,
}

impl EmbarkedEncoding {
    pub const ALL: [EmbarkedEncoding; 2] = [EmbarkedEncoding::Alphabetical, EmbarkedEncoding::Popularity];

    /// Unknown and missing ports map to 0
    pub fn encode(&self, value: Option<&str>) -> f64 {
        let port = value.map(|v| v.trim().to_ascii_uppercase());
        match (self, port.as_deref()) {
            (EmbarkedEncoding::Alphabetical, Some("C")) => 1.0,
            (EmbarkedEncoding::Alphabetical, Some("Q")) => 2.0,
            (EmbarkedEncoding::Alphabetical, Some("S")) => 3.0,
            (EmbarkedEncoding::Popularity, Some("S")) => 3.0,
            (EmbarkedEncoding::Popularity, Some("C")) => 2.0,
            (EmbarkedEncoding::Popularity, Some("Q")) => 1.0,
            _ => 0.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmbarkedEncoding::Alphabetical => "alphabetical: C=1, Q=2, S=3",
            EmbarkedEncoding::Popularity => "by popularity: S=3, C=2, Q=1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameEncoding {
    /// Title bucket: Mr 1, Mrs 2, Miss 3, Master 4, anything else 5
    Title,
    /// Character count
    Length,
}

impl NameEncoding {
    pub const ALL: [NameEncoding; 2] = [NameEncoding::Title, NameEncoding::Length];

    pub fn encode(&self, value: Option<&str>) -> f64 {
        match self {
            NameEncoding::Title => value
                .and_then(extract_title)
                .map_or(RARE_TITLE, |title| title_code(&title)),
            NameEncoding::Length => value.map_or(0.0, |v| v.chars().count() as f64),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NameEncoding::Title => "extract title (Mr, Mrs, Miss, Master, rare)",
            NameEncoding::Length => "name length",
        }
    }
}

/// Title between a space and a dot, e.g. "Braund, Mr. Owen" -> "Mr"
pub fn extract_title(name: &str) -> Option<String> {
    TITLE_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn title_code(title: &str) -> f64 {
    match title {
        "Mr" => 1.0,
        "Mrs" | "Mme" => 2.0,
        "Miss" | "Ms" | "Mlle" => 3.0,
        "Master" => 4.0,
        _ => RARE_TITLE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketEncoding {
    /// Character count, missing = 0
    Length,
    /// PC / STON = 1, A/ or A. prefix = 2, everything else = 3
    PrefixClass,
}

impl TicketEncoding {
    pub const ALL: [TicketEncoding; 2] = [TicketEncoding::Length, TicketEncoding::PrefixClass];

    pub fn encode(&self, value: Option<&str>) -> f64 {
        match self {
            TicketEncoding::Length => value.map_or(0.0, |v| v.chars().count() as f64),
            TicketEncoding::PrefixClass => match value.map(str::to_ascii_uppercase) {
                Some(v) if v.contains("PC") || v.contains("STON") => 1.0,
                Some(v) if v.starts_with("A/") || v.starts_with("A.") => 2.0,
                _ => 3.0,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketEncoding::Length => "ticket length",
            TicketEncoding::PrefixClass => "prefix class (PC/STON, A/, other)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CabinEncoding {
    /// 1 if a cabin is recorded
    HasCabin,
    /// A-C = 3, D-E = 2, F-G = 1, other = 0
    DeckLevel,
    /// A..G = 1..7, T = 8, other = 0
    DeckLetter,
}

impl CabinEncoding {
    pub const ALL: [CabinEncoding; 3] = [
        CabinEncoding::HasCabin,
        CabinEncoding::DeckLevel,
        CabinEncoding::DeckLetter,
    ];

    pub fn encode(&self, value: Option<&str>) -> f64 {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        let deck = value
            .and_then(|v| v.chars().next())
            .map(|c| c.to_ascii_uppercase());
        match self {
            CabinEncoding::HasCabin => {
                if value.is_some() {
                    1.0
                } else {
                    0.0
                }
            }
            CabinEncoding::DeckLevel => match deck {
                Some('A' | 'B' | 'C') => 3.0,
                Some('D' | 'E') => 2.0,
                Some('F' | 'G') => 1.0,
                _ => 0.0,
            },
            CabinEncoding::DeckLetter => match deck {
                Some(c @ 'A'..='G') => (c as u8 - b'A' + 1) as f64,
                Some('T') => 8.0,
                _ => 0.0,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CabinEncoding::HasCabin => "has cabin (1/0)",
            CabinEncoding::DeckLevel => "deck level (upper 3, middle 2, lower 1)",
            CabinEncoding::DeckLetter => "deck letter (A=1 .. G=7, T=8)",
        }
    }
}

/// One encoding bound to its column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnEncoding {
    Sex(SexEncoding),
    Embarked(EmbarkedEncoding),
    Name(NameEncoding),
    Ticket(TicketEncoding),
    Cabin(CabinEncoding),
}

impl ColumnEncoding {
    pub fn feature(&self) -> Feature {
        match self {
            ColumnEncoding::Sex(_) => Feature::Sex,
            ColumnEncoding::Embarked(_) => Feature::Embarked,
            ColumnEncoding::Name(_) => Feature::Name,
            ColumnEncoding::Ticket(_) => Feature::Ticket,
            ColumnEncoding::Cabin(_) => Feature::Cabin,
        }
    }

    pub fn encode(&self, value: Option<&str>) -> f64 {
        match self {
            ColumnEncoding::Sex(e) => e.encode(value),
            ColumnEncoding::Embarked(e) => e.encode(value),
            ColumnEncoding::Name(e) => e.encode(value),
            ColumnEncoding::Ticket(e) => e.encode(value),
            ColumnEncoding::Cabin(e) => e.encode(value),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnEncoding::Sex(e) => e.label(),
            ColumnEncoding::Embarked(e) => e.label(),
            ColumnEncoding::Name(e) => e.label(),
            ColumnEncoding::Ticket(e) => e.label(),
            ColumnEncoding::Cabin(e) => e.label(),
        }
    }

    /// Every encoding offered for a column; empty for numeric columns
    pub fn options(feature: Feature) -> Vec<ColumnEncoding> {
        match feature {
            Feature::Sex => SexEncoding::ALL.iter().copied().map(ColumnEncoding::Sex).collect(),
            Feature::Embarked => EmbarkedEncoding::ALL
                .iter()
                .copied()
                .map(ColumnEncoding::Embarked)
                .collect(),
            Feature::Name => NameEncoding::ALL.iter().copied().map(ColumnEncoding::Name).collect(),
            Feature::Ticket => TicketEncoding::ALL
                .iter()
                .copied()
                .map(ColumnEncoding::Ticket)
                .collect(),
            Feature::Cabin => CabinEncoding::ALL.iter().copied().map(ColumnEncoding::Cabin).collect(),
            _ => Vec::new(),
        }
    }

    /// Replace the column with its encoded Float64 version
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let name = self.feature().column();
        let encoded: Vec<Option<f64>> = column_strings(df, name)?
            .iter()
            .map(|v| Some(self.encode(v.as_deref())))
            .collect();
        replace_column(df, name, encoded)
    }
}

impl fmt::Display for ColumnEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.feature(), self.label())
    }
}

/// Chosen encoding per text column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingPlan {
    pub sex: Option<SexEncoding>,
    pub embarked: Option<EmbarkedEncoding>,
    pub name: Option<NameEncoding>,
    pub ticket: Option<TicketEncoding>,
    pub cabin: Option<CabinEncoding>,
}

impl EncodingPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sex(mut self, encoding: SexEncoding) -> Self {
        self.sex = Some(encoding);
        self
    }

    pub fn with_embarked(mut self, encoding: EmbarkedEncoding) -> Self {
        self.embarked = Some(encoding);
        self
    }

    pub fn with_name(mut self, encoding: NameEncoding) -> Self {
        self.name = Some(encoding);
        self
    }

    pub fn with_ticket(mut self, encoding: TicketEncoding) -> Self {
        self.ticket = Some(encoding);
        self
    }

    pub fn with_cabin(mut self, encoding: CabinEncoding) -> Self {
        self.cabin = Some(encoding);
        self
    }

    /// Set the encoding for whichever column it belongs to
    pub fn with(self, encoding: ColumnEncoding) -> Self {
        match encoding {
            ColumnEncoding::Sex(e) => self.with_sex(e),
            ColumnEncoding::Embarked(e) => self.with_embarked(e),
            ColumnEncoding::Name(e) => self.with_name(e),
            ColumnEncoding::Ticket(e) => self.with_ticket(e),
            ColumnEncoding::Cabin(e) => self.with_cabin(e),
        }
    }

    pub fn get(&self, feature: Feature) -> Option<ColumnEncoding> {
        match feature {
            Feature::Sex => self.sex.map(ColumnEncoding::Sex),
            Feature::Embarked => self.embarked.map(ColumnEncoding::Embarked),
            Feature::Name => self.name.map(ColumnEncoding::Name),
            Feature::Ticket => self.ticket.map(ColumnEncoding::Ticket),
            Feature::Cabin => self.cabin.map(ColumnEncoding::Cabin),
            _ => None,
        }
    }

    /// Every selected text column must have an encoding
    pub fn check_covers(&self, selection: &FeatureSelection) -> Result<()> {
        let missing: Vec<String> = selection
            .categorical()
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .map(|f| f.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FitLabError::InvalidChoice(format!(
                "choose an encoding for: {}",
                missing.join(", ")
            )))
        }
    }

    /// Encode the selected text columns; encodings for unselected columns are ignored
    pub fn apply(&self, df: &DataFrame, selection: &FeatureSelection) -> Result<DataFrame> {
        let mut out = df.clone();
        for feature in selection.categorical() {
            if let Some(encoding) = self.get(feature) {
                out = encoding.apply(&out)?;
            }
        }
        Ok(out)
    }
}
