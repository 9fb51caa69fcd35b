use crate::prelude::{ConversionResult, StationRecord};
use crate::processing::bearing::line_bearing;
use crate::processing::extract::{extract_stations, resolve_coordinates, MissingChannelPolicy};
use crate::processing::rotation::{rotate_station, RotationMode};
use crate::processing::sampler::{LineSampler, LineSelection, SamplerState};
use crate::survey::{FlightLine, FrequencySet};
use crate::telemetry::LogManager;

/// Result of running one flight line through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutput {
    Skipped {
        line: String,
        separation: f64,
    },
    Stations {
        line: String,
        bearing_deg: f64,
        rotation_deg: Option<f64>,
        placeholders: usize,
        stations: Vec<StationRecord>,
    },
}

/// Sampling, extraction and rotation for one line at a time.
pub struct LinePipeline {
    sampler: LineSampler,
    rotation: RotationMode,
    missing: MissingChannelPolicy,
    logger: LogManager,
}

impl LinePipeline {
    pub fn new(sampler: LineSampler, rotation: RotationMode, missing: MissingChannelPolicy) -> Self {
        Self {
            sampler,
            rotation,
            missing,
            logger: LogManager::new("pipeline"),
        }
    }

    pub fn process(
        &self,
        line: &FlightLine,
        freqs: &FrequencySet,
        state: &mut SamplerState,
    ) -> ConversionResult<LineOutput> {
        let indices = match self.sampler.select(line, &*state)? {
            LineSelection::Keep(indices) => indices,
            LineSelection::Skip { separation } => {
                self.logger.record(&format!(
                    "line {} skipped, {:.2} m from previous line",
                    line.name, separation
                ));
                return Ok(LineOutput::Skipped {
                    line: line.name.clone(),
                    separation,
                });
            }
        };

        let extracted = extract_stations(line, freqs, &indices, self.missing)?;
        self.sampler.commit(line, state);
        let placeholders = extracted.placeholders;
        let bearing_deg = self.bearing(line, state)?;

        let mut stations = extracted.into_records();
        let rotation_deg = self.rotation.angle_for(bearing_deg);
        if let Some(angle) = rotation_deg {
            for station in &mut stations {
                rotate_station(station, angle);
            }
        }

        self.logger.detail(&format!(
            "line {}: {} stations, bearing {:.2}",
            line.name,
            stations.len(),
            bearing_deg
        ));

        Ok(LineOutput::Stations {
            line: line.name.clone(),
            bearing_deg,
            rotation_deg,
            placeholders,
            stations,
        })
    }

    /// Computes and records the flight bearing of `line`.
    pub fn bearing(&self, line: &FlightLine, state: &mut SamplerState) -> ConversionResult<f64> {
        let (latitude, longitude) = resolve_coordinates(line)?;
        let bearing = line_bearing(latitude, longitude);
        if bearing.is_nan() {
            self.logger.warn(&format!(
                "line {}: flight bearing could not be computed",
                line.name
            ));
        }
        state.record_angle(&line.name, bearing);
        Ok(bearing)
    }
}
