use serde::{Deserialize, Serialize};
use std::fmt;

use crate::survey::SurveyError;

/// Raw measured channel family as it appears in survey databases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    Xip,
    Yip,
    Xqd,
    Yqd,
}

impl Component {
    pub const ALL: [Component; 4] = [Component::Xip, Component::Yip, Component::Xqd, Component::Yqd];

    pub fn code(&self) -> &'static str {
        match self {
            Component::Xip => "XIP",
            Component::Yip => "YIP",
            Component::Xqd => "XQD",
            Component::Yqd => "YQD",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|component| component.code().eq_ignore_ascii_case(code))
    }

    /// Channel name carrying this component at `frequency`, e.g. `XIP_030Hz`.
    pub fn channel_name(&self, frequency: u32) -> String {
        format!("{}_{:03}Hz", self.code(), frequency)
    }

    /// Tipper field this component feeds and the sign applied on the way.
    ///
    /// In-phase channels are flipped and the X/Y axes swap between the
    /// survey convention and the EDI convention.
    pub fn tipper_field(&self) -> (TipperField, f64) {
        match self {
            Component::Xip => (TipperField::Tzyr, -1.0),
            Component::Yip => (TipperField::Tzxr, -1.0),
            Component::Xqd => (TipperField::Tzyi, 1.0),
            Component::Yqd => (TipperField::Tzxi, 1.0),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Real/imaginary parts of the X and Y tipper responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TipperField {
    Tzxr,
    Tzyr,
    Tzxi,
    Tzyi,
}

/// One output station: coordinates plus one tipper value per frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub tzxr: Vec<f64>,
    pub tzyr: Vec<f64>,
    pub tzxi: Vec<f64>,
    pub tzyi: Vec<f64>,
}

impl StationRecord {
    pub fn field(&self, field: TipperField) -> &[f64] {
        match field {
            TipperField::Tzxr => &self.tzxr,
            TipperField::Tzyr => &self.tzyr,
            TipperField::Tzxi => &self.tzxi,
            TipperField::Tzyi => &self.tzyi,
        }
    }

    /// Number of frequencies carried, taken from the X real part.
    pub fn frequency_count(&self) -> usize {
        self.tzxr.len()
    }

    pub fn is_consistent(&self) -> bool {
        let n = self.tzxr.len();
        self.tzyr.len() == n && self.tzxi.len() == n && self.tzyi.len() == n
    }
}

/// Common error type for survey conversion.
#[derive(thiserror::Error, Debug)]
pub enum ConversionError {
    #[error("no XIP/YIP/XQD/YQD frequency channels found")]
    NoFrequencies,
    #[error("component {component} is missing frequencies {missing:?}")]
    FrequencyMismatch { component: Component, missing: Vec<u32> },
    #[error("line {line}: no latitude/longitude channel pair found")]
    MissingCoordinates { line: String },
    #[error("line {line}: distance downsampling needs X/Y positions")]
    MissingPositions { line: String },
    #[error("line {line}: channel {channel} is missing or short")]
    MissingChannel { line: String, channel: String },
    #[error("invalid downsample specification: {0}")]
    InvalidDownsample(String),
    #[error(transparent)]
    Survey(#[from] SurveyError),
}

pub type ConversionResult<T> = Result<T, ConversionError>;
