use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::prelude::{Component, ConversionError, ConversionResult, StationRecord, TipperField};
use crate::survey::{FlightLine, FrequencySet};
use crate::telemetry::LogManager;

/// Value written in place of a channel sample that could not be read.
pub const PLACEHOLDER: f64 = 1e-10;

/// Latitude/longitude channel names, tried in order.
pub const COORDINATE_ALIASES: [(&str, &str); 3] =
    [("Latitude", "Longitude"), ("Lat", "Long"), ("Lat", "Lon")];

/// What to do when a frequency channel is absent or short on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingChannelPolicy {
    /// Fill with [`PLACEHOLDER`] and warn.
    #[default]
    Substitute,
    /// Abandon the line.
    Fail,
}

/// Returns the latitude and longitude arrays of a line.
pub fn resolve_coordinates(line: &FlightLine) -> ConversionResult<(&[f64], &[f64])> {
    COORDINATE_ALIASES
        .iter()
        .find_map(|(lat, lon)| Some((line.channel(lat)?, line.channel(lon)?)))
        .ok_or_else(|| ConversionError::MissingCoordinates {
            line: line.name.clone(),
        })
}

/// Whether any alias pair is present among a dataset's channel names.
pub fn has_coordinate_channels<S: AsRef<str>>(channel_names: &[S]) -> bool {
    let present = |wanted: &str| {
        channel_names
            .iter()
            .any(|name| name.as_ref().eq_ignore_ascii_case(wanted))
    };
    COORDINATE_ALIASES
        .iter()
        .any(|&(lat, lon)| present(lat) && present(lon))
}

/// Stations of one line, held as stations × frequencies matrices.
#[derive(Debug, Clone)]
pub struct LineStations {
    pub names: Vec<String>,
    pub latitude: Array1<f64>,
    pub longitude: Array1<f64>,
    pub tzxr: Array2<f64>,
    pub tzyr: Array2<f64>,
    pub tzxi: Array2<f64>,
    pub tzyi: Array2<f64>,
    /// Channels filled with [`PLACEHOLDER`] on this line.
    pub placeholders: usize,
}

impl LineStations {
    fn zeros(stations: usize, frequencies: usize) -> Self {
        let shape = (stations, frequencies);
        Self {
            names: Vec::with_capacity(stations),
            latitude: Array1::zeros(stations),
            longitude: Array1::zeros(stations),
            tzxr: Array2::zeros(shape),
            tzyr: Array2::zeros(shape),
            tzxi: Array2::zeros(shape),
            tzyi: Array2::zeros(shape),
            placeholders: 0,
        }
    }

    fn field_mut(&mut self, field: TipperField) -> &mut Array2<f64> {
        match field {
            TipperField::Tzxr => &mut self.tzxr,
            TipperField::Tzyr => &mut self.tzyr,
            TipperField::Tzxi => &mut self.tzxi,
            TipperField::Tzyi => &mut self.tzyi,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_records(self) -> Vec<StationRecord> {
        self.names
            .iter()
            .enumerate()
            .map(|(row, name)| StationRecord {
                name: name.clone(),
                latitude: self.latitude[row],
                longitude: self.longitude[row],
                tzxr: self.tzxr.row(row).to_vec(),
                tzyr: self.tzyr.row(row).to_vec(),
                tzxi: self.tzxi.row(row).to_vec(),
                tzyi: self.tzyi.row(row).to_vec(),
            })
            .collect()
    }
}

/// Reads the four components at every selected sample and maps them onto
/// tipper fields.
pub fn extract_stations(
    line: &FlightLine,
    freqs: &FrequencySet,
    indices: &[usize],
    policy: MissingChannelPolicy,
) -> ConversionResult<LineStations> {
    let logger = LogManager::new("extract");
    let (latitude, longitude) = resolve_coordinates(line)?;
    let available = latitude.len().min(longitude.len());

    let selected: Vec<usize> = indices.iter().copied().filter(|&i| i < available).collect();
    if selected.len() < indices.len() {
        logger.warn(&format!(
            "line {}: dropped {} samples beyond the coordinate channels",
            line.name,
            indices.len() - selected.len()
        ));
    }

    let mut stations = LineStations::zeros(selected.len(), freqs.len());
    for (row, &index) in selected.iter().enumerate() {
        stations.names.push(format!("{}_{:03}", line.name, row));
        stations.latitude[row] = latitude[index];
        stations.longitude[row] = longitude[index];
    }

    for (column, frequency) in freqs.iter().enumerate() {
        for component in Component::ALL {
            let channel = component.channel_name(frequency);
            let (field, sign) = component.tipper_field();
            let values = line.channel(&channel);
            let mut substituted = false;

            let matrix = stations.field_mut(field);
            for (row, &index) in selected.iter().enumerate() {
                matrix[[row, column]] = match values.and_then(|v| v.get(index)) {
                    Some(&value) => sign * value,
                    None if policy == MissingChannelPolicy::Fail => {
                        return Err(ConversionError::MissingChannel {
                            line: line.name.clone(),
                            channel,
                        });
                    }
                    None => {
                        substituted = true;
                        PLACEHOLDER
                    }
                };
            }

            if substituted {
                stations.placeholders += 1;
                logger.warn(&format!(
                    "line {}: channel {} missing or short, using placeholder",
                    line.name, channel
                ));
            }
        }
    }

    Ok(stations)
}
