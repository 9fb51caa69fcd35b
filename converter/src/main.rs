use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::path::{Path, PathBuf};
use workflow::config::{ConversionConfig, RotationSetting};
use workflow::runner::Runner;
use ztemcore::edi::EdiFormat;
use ztemcore::processing::Downsample;
use ztemcore::survey::{read_xyz, Survey};

mod workflow;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    /// Tipper blocks only
    Tipper,
    /// Tipper plus placeholder impedance tensor
    FullTensor,
}

impl From<FormatArg> for EdiFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Tipper => EdiFormat::Tipper,
            FormatArg::FullTensor => EdiFormat::FullTensor,
        }
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert ZTEM tipper survey exports into per-station EDI files",
    after_help = "Frequency channels are expected as <component>_<freq>Hz, e.g. XIP_030Hz."
)]
struct Args {
    /// Survey export (.xyz)
    input: PathBuf,
    /// Directory receiving one EDI file per station
    output: PathBuf,
    /// Every Nth sample (e.g. 10) or a target spacing in metres (e.g. 250m)
    downsample: Option<Downsample>,
    /// Rotation in degrees, `self` for each line's flight bearing, or
    /// `report` to print flight bearings and write nothing
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<RotationSetting>,
    /// Load conversion settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Flat tipper error floor
    #[arg(long)]
    error_floor: Option<f64>,
    /// Keep lines that run closer than the target spacing to the previous line
    #[arg(long, default_value_t = false)]
    no_skip_lines: bool,
}

impl Args {
    fn to_config(&self) -> anyhow::Result<ConversionConfig> {
        let mut config = match &self.config {
            Some(path) => ConversionConfig::load(path)?,
            None => ConversionConfig::default(),
        };
        if let Some(downsample) = self.downsample {
            config.downsample = downsample;
        }
        if let Some(rotation) = self.rotation {
            config.rotation = rotation;
        }
        if let Some(format) = self.format {
            config.format = format.into();
        }
        if let Some(error_floor) = self.error_floor {
            config.error_floor = error_floor;
        }
        if self.no_skip_lines {
            config.skip_lines = false;
        }
        Ok(config)
    }
}

fn open_survey(path: &Path) -> anyhow::Result<Survey> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("xyz") => {
            read_xyz(path).with_context(|| format!("reading survey {}", path.display()))
        }
        Some("gdb") => bail!(
            "{} is a binary Geosoft database; export it to XYZ first",
            path.display()
        ),
        _ => bail!(
            "unrecognized input {}; expected a .xyz survey export",
            path.display()
        ),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = args.to_config()?;
    let mut survey = open_survey(&args.input)?;
    let runner = Runner::new(config.clone());

    if config.rotation == RotationSetting::ReportOnly {
        for angle in runner.report_bearings(&mut survey)? {
            println!("{}", serde_json::to_string(&angle)?);
        }
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    let summary = runner.execute(&mut survey, &args.output, today)?;
    info!(
        "Wrote {} EDI files for {} frequencies to {}",
        summary.files.len(),
        summary.frequencies.len(),
        args.output.display()
    );
    let metrics = summary.metrics;
    if metrics.placeholders > 0 {
        info!("{} channels were filled with placeholders", metrics.placeholders);
    }
    if metrics.writes_failed > 0 {
        warn!("{} station files could not be written", metrics.writes_failed);
    }
    let unresolved = summary
        .flight_angles
        .iter()
        .filter(|angle| angle.bearing_deg.is_nan())
        .count();
    if unresolved > 0 {
        info!("{} lines have no computable flight bearing", unresolved);
    }

    Ok(())
}
