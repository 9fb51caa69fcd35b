//! Input boundary: flight lines as delivered by a survey database reader.

pub mod frequency;
pub mod line;
pub mod xyz;

pub use frequency::FrequencySet;
pub use line::{FlightLine, Position};
pub use xyz::read_xyz;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("unable to read survey file")]
    Io(#[from] std::io::Error),
    #[error("row {row}: expected {expected} values, got {found}")]
    BadRowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: unparseable value {value:?}")]
    UnparsableValue { row: usize, value: String },
    #[error("row {row}: data before any line marker")]
    DataOutsideLine { row: usize },
    #[error("no column header found")]
    MissingHeader,
    #[error("unknown line {0}")]
    UnknownLine(String),
}

/// Anything that can hand out flight lines by name.
pub trait SurveySource {
    /// Line identifiers in acquisition order.
    fn line_names(&self) -> Vec<String>;
    /// Every channel name available in the dataset.
    fn channel_names(&self) -> Vec<String>;
    fn read_line(&mut self, name: &str) -> Result<FlightLine, SurveyError>;
}

/// A survey held fully in memory.
#[derive(Debug, Clone, Default)]
pub struct Survey {
    lines: Vec<FlightLine>,
}

impl Survey {
    pub fn new(lines: Vec<FlightLine>) -> Self {
        Self { lines }
    }

    pub fn push(&mut self, line: FlightLine) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[FlightLine] {
        &self.lines
    }
}

impl SurveySource for Survey {
    fn line_names(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.name.clone()).collect()
    }

    fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for line in &self.lines {
            for name in line.channel_names() {
                if !names.iter().any(|known| known == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    fn read_line(&mut self, name: &str) -> Result<FlightLine, SurveyError> {
        self.lines
            .iter()
            .find(|line| line.name == name)
            .cloned()
            .ok_or_else(|| SurveyError::UnknownLine(name.to_string()))
    }
}
