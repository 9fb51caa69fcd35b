use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::prelude::{ConversionError, ConversionResult};
use crate::survey::{FlightLine, Position};

/// Fraction of the target spacing a neighbouring line may fall short by
/// before it is treated as repeated coverage.
pub const SEPARATION_TOLERANCE: f64 = 0.02;

/// How stations are picked along a line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDownsample", into = "String")]
pub enum Downsample {
    /// Every Nth raw sample.
    Stride(usize),
    /// Roughly one station per this many metres.
    Distance(f64),
}

impl FromStr for Downsample {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ConversionError::InvalidDownsample(s.to_string());
        if let Some(metres) = trimmed.strip_suffix(|c: char| c == 'm' || c == 'M') {
            let distance: f64 = metres.trim().parse().map_err(|_| invalid())?;
            if !distance.is_finite() || distance <= 0.0 {
                return Err(invalid());
            }
            Ok(Downsample::Distance(distance))
        } else {
            let stride: usize = trimmed.parse().map_err(|_| invalid())?;
            if stride == 0 {
                return Err(invalid());
            }
            Ok(Downsample::Stride(stride))
        }
    }
}

/// Config files may give a bare stride number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDownsample {
    Stride(usize),
    Text(String),
}

impl TryFrom<RawDownsample> for Downsample {
    type Error = ConversionError;

    fn try_from(value: RawDownsample) -> Result<Self, Self::Error> {
        match value {
            RawDownsample::Stride(stride) => stride.to_string().parse(),
            RawDownsample::Text(text) => text.parse(),
        }
    }
}

impl From<Downsample> for String {
    fn from(value: Downsample) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Downsample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Downsample::Stride(n) => write!(f, "{}", n),
            Downsample::Distance(d) => write!(f, "{}m", d),
        }
    }
}

impl Default for Downsample {
    fn default() -> Self {
        Downsample::Stride(10)
    }
}

/// Flight bearing recorded for one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightAngle {
    pub line: String,
    pub bearing_deg: f64,
}

/// State carried from one line to the next during a conversion run.
#[derive(Debug, Clone, Default)]
pub struct SamplerState {
    reference: Option<Position>,
    flight_angles: Vec<FlightAngle>,
}

impl SamplerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// First position of the most recent line that produced stations.
    pub fn reference(&self) -> Option<Position> {
        self.reference
    }

    pub fn record_angle(&mut self, line: &str, bearing_deg: f64) {
        self.flight_angles.push(FlightAngle {
            line: line.to_string(),
            bearing_deg,
        });
    }

    pub fn flight_angles(&self) -> &[FlightAngle] {
        &self.flight_angles
    }
}

/// Outcome of sampling one line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineSelection {
    Keep(Vec<usize>),
    /// Line runs too close to the previous kept line.
    Skip { separation: f64 },
}

/// Picks station indices along each line and filters repeated coverage.
#[derive(Debug, Clone)]
pub struct LineSampler {
    downsample: Downsample,
    skip_lines: bool,
    tolerance: f64,
}

impl LineSampler {
    pub fn new(downsample: Downsample, skip_lines: bool) -> Self {
        Self {
            downsample,
            skip_lines,
            tolerance: SEPARATION_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn downsample(&self) -> Downsample {
        self.downsample
    }

    /// Selects sample indices for `line`. The separation reference in
    /// `state` is only read here; see [`LineSampler::commit`].
    pub fn select(&self, line: &FlightLine, state: &SamplerState) -> ConversionResult<LineSelection> {
        let spacing = match self.downsample {
            Downsample::Stride(stride) => {
                let indices = (0..line.sample_count()).step_by(stride).collect();
                return Ok(LineSelection::Keep(indices));
            }
            Downsample::Distance(spacing) => spacing,
        };

        let positions = line
            .positions()
            .ok_or_else(|| ConversionError::MissingPositions {
                line: line.name.clone(),
            })?;
        let (first, last) = match (positions.first(), positions.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Ok(LineSelection::Keep(Vec::new())),
        };

        if self.skip_lines {
            if let Some(reference) = state.reference {
                let separation = reference
                    .distance_to(&first)
                    .min(reference.distance_to(&last));
                if separation < spacing - spacing * self.tolerance {
                    return Ok(LineSelection::Skip { separation });
                }
            }
        }

        Ok(LineSelection::Keep(distance_indices(positions, spacing)))
    }

    /// Makes the first position of `line` the separation reference.
    /// Called once the line has produced stations; stride mode has no
    /// reference.
    pub fn commit(&self, line: &FlightLine, state: &mut SamplerState) {
        if let Downsample::Distance(_) = self.downsample {
            if let Some(first) = line.positions().and_then(|p| p.first()) {
                state.reference = Some(*first);
            }
        }
    }
}

/// Indices where the distance from the first sample wraps past a multiple
/// of `spacing`.
pub fn distance_indices(positions: &[Position], spacing: f64) -> Vec<usize> {
    let origin = match positions.first() {
        Some(origin) => *origin,
        None => return Vec::new(),
    };
    let mut previous = 0.0;
    let mut indices = Vec::new();
    for (index, position) in positions.iter().enumerate().skip(1) {
        let remainder = origin.distance_to(position) % spacing;
        if remainder < previous {
            indices.push(index);
        }
        previous = remainder;
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_line(name: &str, northing: f64, length: f64, step: f64) -> FlightLine {
        let count = (length / step) as usize + 1;
        let positions = (0..count)
            .map(|i| Position::new(i as f64 * step, northing))
            .collect();
        FlightLine::new(name, count).with_positions(positions)
    }

    fn select_and_commit(
        sampler: &LineSampler,
        line: &FlightLine,
        state: &mut SamplerState,
    ) -> LineSelection {
        let selection = sampler.select(line, state).unwrap();
        if let LineSelection::Keep(_) = selection {
            sampler.commit(line, state);
        }
        selection
    }

    #[test]
    fn downsample_parses_stride_and_distance() {
        assert_eq!("10".parse::<Downsample>().unwrap(), Downsample::Stride(10));
        assert_eq!(
            "250m".parse::<Downsample>().unwrap(),
            Downsample::Distance(250.0)
        );
        assert!("0".parse::<Downsample>().is_err());
        assert!("-5m".parse::<Downsample>().is_err());
        assert!("ten".parse::<Downsample>().is_err());
    }

    #[test]
    fn stride_mode_takes_every_nth_sample() {
        let line = FlightLine::new("L1", 7);
        let sampler = LineSampler::new(Downsample::Stride(3), true);
        let selection = sampler.select(&line, &SamplerState::new()).unwrap();
        assert_eq!(selection, LineSelection::Keep(vec![0, 3, 6]));
    }

    #[test]
    fn distance_mode_spacing_matches_line_length() {
        let line = straight_line("L1", 0.0, 1000.0, 10.0);
        let sampler = LineSampler::new(Downsample::Distance(100.0), true);
        let LineSelection::Keep(indices) = sampler.select(&line, &SamplerState::new()).unwrap()
        else {
            panic!("line should be kept");
        };
        let expected = 1000.0 / 100.0;
        assert!((indices.len() as f64 - expected).abs() <= 1.0);
        assert_eq!(indices[0], 10);
    }

    #[test]
    fn select_leaves_reference_until_commit() {
        let sampler = LineSampler::new(Downsample::Distance(200.0), true);
        let mut state = SamplerState::new();
        let line = straight_line("L1", 0.0, 2000.0, 20.0);
        assert!(matches!(sampler.select(&line, &state).unwrap(), LineSelection::Keep(_)));
        assert_eq!(state.reference(), None);
        sampler.commit(&line, &mut state);
        assert_eq!(state.reference(), Some(Position::new(0.0, 0.0)));
    }

    #[test]
    fn close_line_is_skipped_and_does_not_move_reference() {
        let spacing = 200.0;
        let sampler = LineSampler::new(Downsample::Distance(spacing), true);
        let mut state = SamplerState::new();

        let first = straight_line("L1", 0.0, 2000.0, 20.0);
        let close = straight_line("L2", 0.5 * spacing, 2000.0, 20.0);
        let next = straight_line("L3", 1.05 * spacing, 2000.0, 20.0);

        assert!(matches!(
            select_and_commit(&sampler, &first, &mut state),
            LineSelection::Keep(_)
        ));
        match select_and_commit(&sampler, &close, &mut state) {
            LineSelection::Skip { separation } => assert!((separation - 100.0).abs() < 1e-9),
            other => panic!("expected skip, got {other:?}"),
        }
        assert_eq!(state.reference(), Some(Position::new(0.0, 0.0)));
        assert!(matches!(
            select_and_commit(&sampler, &next, &mut state),
            LineSelection::Keep(_)
        ));
        assert_eq!(state.reference(), Some(Position::new(0.0, 1.05 * spacing)));
    }

    #[test]
    fn reversed_line_is_skipped_by_its_last_sample() {
        let spacing = 200.0;
        let sampler = LineSampler::new(Downsample::Distance(spacing), true);
        let mut state = SamplerState::new();

        let first = straight_line("L1", 0.0, 2000.0, 20.0);
        // Flown back towards the start of L1: first sample far away, last
        // sample 100 m from the reference.
        let positions: Vec<Position> = (0..=200)
            .map(|i| Position::new(4000.0 - i as f64 * 20.0, 0.5 * spacing))
            .collect();
        let reversed = FlightLine::new("L2", positions.len()).with_positions(positions);

        select_and_commit(&sampler, &first, &mut state);
        match select_and_commit(&sampler, &reversed, &mut state) {
            LineSelection::Skip { separation } => assert!((separation - 100.0).abs() < 1e-9),
            other => panic!("expected skip, got {other:?}"),
        }
        assert_eq!(state.reference(), Some(Position::new(0.0, 0.0)));
    }

    #[test]
    fn well_separated_lines_are_both_kept() {
        let spacing = 200.0;
        let sampler = LineSampler::new(Downsample::Distance(spacing), true);
        let mut state = SamplerState::new();
        let a = straight_line("L1", 0.0, 2000.0, 20.0);
        let b = straight_line("L2", 1.1 * spacing, 2000.0, 20.0);
        assert!(matches!(select_and_commit(&sampler, &a, &mut state), LineSelection::Keep(_)));
        assert!(matches!(select_and_commit(&sampler, &b, &mut state), LineSelection::Keep(_)));
    }

    #[test]
    fn separation_filter_can_be_disabled() {
        let sampler = LineSampler::new(Downsample::Distance(200.0), false);
        let mut state = SamplerState::new();
        let a = straight_line("L1", 0.0, 2000.0, 20.0);
        let b = straight_line("L2", 10.0, 2000.0, 20.0);
        select_and_commit(&sampler, &a, &mut state);
        assert!(matches!(select_and_commit(&sampler, &b, &mut state), LineSelection::Keep(_)));
    }

    #[test]
    fn distance_mode_requires_positions() {
        let line = FlightLine::new("L1", 4);
        let sampler = LineSampler::new(Downsample::Distance(50.0), true);
        assert!(matches!(
            sampler.select(&line, &SamplerState::new()),
            Err(ConversionError::MissingPositions { .. })
        ));
    }
}
