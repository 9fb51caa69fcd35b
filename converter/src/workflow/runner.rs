use crate::workflow::config::ConversionConfig;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use ztemcore::edi::write_station_file;
use ztemcore::processing::extract::{has_coordinate_channels, COORDINATE_ALIASES};
use ztemcore::processing::{FlightAngle, LineOutput, SamplerState};
use ztemcore::survey::{FrequencySet, SurveySource};
use ztemcore::telemetry::{ConversionMetrics, Metrics};

pub struct RunSummary {
    pub frequencies: FrequencySet,
    pub metrics: Metrics,
    pub files: Vec<PathBuf>,
    pub flight_angles: Vec<FlightAngle>,
}

pub struct Runner {
    config: ConversionConfig,
    metrics: ConversionMetrics,
}

impl Runner {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            metrics: ConversionMetrics::new(),
        }
    }

    /// Dataset-level checks: frequency set and coordinate channels.
    fn prepare<S: SurveySource>(&self, source: &S) -> anyhow::Result<FrequencySet> {
        let channels = source.channel_names();
        let freqs =
            FrequencySet::from_channel_names(&channels).context("deriving frequency set")?;
        info!("Frequency set is: {:?}", freqs.as_slice());

        if !has_coordinate_channels(&channels) {
            bail!(
                "no latitude/longitude channels found (tried {:?})",
                COORDINATE_ALIASES
            );
        }
        Ok(freqs)
    }

    /// Converts every line of `source`, writing one EDI file per station
    /// into `out_dir`. Line-level failures are logged and skipped.
    pub fn execute<S: SurveySource>(
        &self,
        source: &mut S,
        out_dir: &Path,
        file_date: NaiveDate,
    ) -> anyhow::Result<RunSummary> {
        let freqs = self.prepare(source)?;
        let pipeline = self.config.to_pipeline();
        let options = self.config.to_edi_options(file_date);
        let mut state = SamplerState::new();
        let mut files = Vec::new();

        fs::create_dir_all(out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;

        for name in source.line_names() {
            let line = match source.read_line(&name) {
                Ok(line) => line,
                Err(err) => {
                    warn!("line {}: {}", name, err);
                    self.metrics.record_failed();
                    continue;
                }
            };

            match pipeline.process(&line, &freqs, &mut state) {
                Ok(LineOutput::Skipped { .. }) => self.metrics.record_skipped(),
                Ok(LineOutput::Stations {
                    stations,
                    placeholders,
                    ..
                }) => {
                    self.metrics.record_processed(placeholders);
                    for station in &stations {
                        match write_station_file(out_dir, station, &freqs, &options) {
                            Ok(path) => {
                                self.metrics.record_station();
                                files.push(path);
                            }
                            Err(err) => {
                                warn!("station {} not written: {}", station.name, err);
                                self.metrics.record_write_failed();
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!("line {} abandoned: {}", name, err);
                    self.metrics.record_failed();
                }
            }
        }

        let metrics = self.metrics.snapshot();
        info!(
            "{} lines converted, {} skipped, {} failed, {} stations written, {} writes failed",
            metrics.lines_processed,
            metrics.lines_skipped,
            metrics.lines_failed,
            metrics.stations_written,
            metrics.writes_failed
        );

        Ok(RunSummary {
            frequencies: freqs,
            metrics,
            files,
            flight_angles: state.flight_angles().to_vec(),
        })
    }

    /// Computes the flight bearing of every line without writing anything.
    pub fn report_bearings<S: SurveySource>(
        &self,
        source: &mut S,
    ) -> anyhow::Result<Vec<FlightAngle>> {
        let pipeline = self.config.to_pipeline();
        let mut state = SamplerState::new();
        for name in source.line_names() {
            let line = source
                .read_line(&name)
                .with_context(|| format!("reading line {}", name))?;
            if let Err(err) = pipeline.bearing(&line, &mut state) {
                warn!("line {}: {}", name, err);
            }
        }
        Ok(state.flight_angles().to_vec())
    }
}
