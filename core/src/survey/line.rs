use std::collections::BTreeMap;

/// Projected sample position in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub easting: f64,
    pub northing: f64,
}

impl Position {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        crate::math::geo::planar_distance(self, other)
    }
}

/// One contiguous pass of the aircraft: positions plus named channel arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightLine {
    pub name: String,
    samples: usize,
    positions: Vec<Position>,
    channels: BTreeMap<String, Vec<f64>>,
}

impl FlightLine {
    pub fn new(name: impl Into<String>, samples: usize) -> Self {
        Self {
            name: name.into(),
            samples,
            positions: Vec::new(),
            channels: BTreeMap::new(),
        }
    }

    pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
        self.positions = positions;
        self
    }

    pub fn insert_channel(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.channels.insert(name.into(), values);
    }

    /// Number of raw samples recorded along the line.
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Positions, or `None` when they do not cover every sample.
    pub fn positions(&self) -> Option<&[Position]> {
        if self.positions.len() == self.samples {
            Some(&self.positions)
        } else {
            None
        }
    }

    /// Case-insensitive channel lookup.
    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        if let Some(values) = self.channels.get(name) {
            return Some(values.as_slice());
        }
        self.channels
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }
}
