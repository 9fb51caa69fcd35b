//! Reader for Geosoft ASCII XYZ exports.
//!
//! Comment lines start with `/`; the last comment before the first line
//! marker names the columns. `Line <id>` and `Tie <id>` start a new flight
//! line, and `*` stands for a dummy value.
use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
};

use super::{FlightLine, Position, Survey, SurveyError};

const EASTING_ALIASES: [&str; 2] = ["X", "Easting"];
const NORTHING_ALIASES: [&str; 2] = ["Y", "Northing"];

pub fn read_xyz(path: &Path) -> Result<Survey, SurveyError> {
    let f = File::open(path)?;
    parse_xyz(io::BufReader::new(f))
}

pub fn parse_xyz<R: BufRead>(reader: R) -> Result<Survey, SurveyError> {
    let mut survey = Survey::default();
    let mut last_comment: Option<Vec<String>> = None;
    let mut header: Option<Vec<String>> = None;
    let mut current: Option<LineBuilder> = None;

    for (index, text) in reader.lines().enumerate() {
        let text = text?;
        let row = index + 1;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(comment) = trimmed.strip_prefix('/') {
            if header.is_none() {
                let tokens: Vec<String> = comment.split_whitespace().map(String::from).collect();
                if tokens.len() > 1 {
                    last_comment = Some(tokens);
                }
            }
            continue;
        }

        if let Some(name) = line_marker(trimmed) {
            let columns = match header.as_ref() {
                Some(columns) => columns.len(),
                None => {
                    let columns = last_comment.take().ok_or(SurveyError::MissingHeader)?;
                    let count = columns.len();
                    header = Some(columns);
                    count
                }
            };
            if let (Some(builder), Some(columns)) = (current.take(), header.as_ref()) {
                survey.push(builder.finish(columns));
            }
            current = Some(LineBuilder::new(name, columns));
            continue;
        }

        let builder = current
            .as_mut()
            .ok_or(SurveyError::DataOutsideLine { row })?;
        builder.push_row(row, trimmed)?;
    }

    if let (Some(builder), Some(columns)) = (current, header.as_ref()) {
        survey.push(builder.finish(columns));
    }
    Ok(survey)
}

fn line_marker(text: &str) -> Option<String> {
    let mut parts = text.split_whitespace();
    let keyword = parts.next()?;
    let prefix = if keyword.eq_ignore_ascii_case("line") {
        "L"
    } else if keyword.eq_ignore_ascii_case("tie") {
        "T"
    } else {
        return None;
    };
    let id = parts.next()?;
    if id.starts_with(|c: char| c.is_ascii_alphabetic()) {
        Some(id.to_string())
    } else {
        Some(format!("{}{}", prefix, id))
    }
}

fn parse_value(row: usize, token: &str) -> Result<f64, SurveyError> {
    if token == "*" {
        return Ok(f64::NAN);
    }
    token.parse::<f64>().map_err(|_| SurveyError::UnparsableValue {
        row,
        value: token.to_string(),
    })
}

struct LineBuilder {
    name: String,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl LineBuilder {
    fn new(name: String, width: usize) -> Self {
        Self {
            name,
            columns: vec![Vec::new(); width],
            rows: 0,
        }
    }

    fn push_row(&mut self, row: usize, text: &str) -> Result<(), SurveyError> {
        let values = text
            .split_whitespace()
            .map(|token| parse_value(row, token))
            .collect::<Result<Vec<f64>, SurveyError>>()?;
        if values.len() != self.columns.len() {
            return Err(SurveyError::BadRowWidth {
                row,
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(value);
        }
        self.rows += 1;
        Ok(())
    }

    fn finish(self, header: &[String]) -> FlightLine {
        let find = |aliases: &[&str]| {
            aliases.iter().find_map(|alias| {
                header
                    .iter()
                    .position(|name| name.eq_ignore_ascii_case(alias))
            })
        };
        let positions = match (find(&EASTING_ALIASES[..]), find(&NORTHING_ALIASES[..])) {
            (Some(x), Some(y)) => self.columns[x]
                .iter()
                .zip(&self.columns[y])
                .map(|(&easting, &northing)| Position::new(easting, northing))
                .collect(),
            _ => Vec::new(),
        };

        let mut line = FlightLine::new(self.name, self.rows).with_positions(positions);
        for (name, values) in header.iter().zip(self.columns) {
            line.insert_channel(name.clone(), values);
        }
        line
    }
}
