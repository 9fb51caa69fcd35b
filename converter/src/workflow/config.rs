use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use ztemcore::edi::{EdiFormat, EdiOptions, SectionOverrides, DEFAULT_ERROR_FLOOR};
use ztemcore::processing::sampler::SEPARATION_TOLERANCE;
use ztemcore::processing::{
    Downsample, LinePipeline, LineSampler, MissingChannelPolicy, RotationMode,
};

/// Rotation requested for a run.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawRotation", into = "RawRotation")]
pub enum RotationSetting {
    #[default]
    None,
    Angle(f64),
    /// Rotate each line by its own flight bearing.
    SelfBearing,
    /// Print flight bearings and write no files.
    ReportOnly,
}

impl RotationSetting {
    pub fn mode(&self) -> RotationMode {
        match self {
            RotationSetting::Angle(angle) => RotationMode::Fixed(*angle),
            RotationSetting::SelfBearing => RotationMode::FlightBearing,
            RotationSetting::None | RotationSetting::ReportOnly => RotationMode::None,
        }
    }
}

impl FromStr for RotationSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(RotationSetting::None),
            "self" => Ok(RotationSetting::SelfBearing),
            "report" => Ok(RotationSetting::ReportOnly),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|angle| angle.is_finite())
                .map(RotationSetting::Angle)
                .ok_or_else(|| format!("invalid rotation {:?}: expected degrees, self or report", s)),
        }
    }
}

impl fmt::Display for RotationSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationSetting::None => f.write_str("none"),
            RotationSetting::Angle(angle) => write!(f, "{}", angle),
            RotationSetting::SelfBearing => f.write_str("self"),
            RotationSetting::ReportOnly => f.write_str("report"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawRotation {
    Angle(f64),
    Name(String),
}

impl TryFrom<RawRotation> for RotationSetting {
    type Error = String;

    fn try_from(value: RawRotation) -> Result<Self, Self::Error> {
        match value {
            RawRotation::Angle(angle) => Ok(RotationSetting::Angle(angle)),
            RawRotation::Name(name) => name.parse(),
        }
    }
}

impl From<RotationSetting> for RawRotation {
    fn from(value: RotationSetting) -> Self {
        match value {
            RotationSetting::Angle(angle) => RawRotation::Angle(angle),
            other => RawRotation::Name(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub downsample: Downsample,
    pub skip_lines: bool,
    pub separation_tolerance: f64,
    pub rotation: RotationSetting,
    pub format: EdiFormat,
    pub error_floor: f64,
    pub missing_channel: MissingChannelPolicy,
    pub head: SectionOverrides,
    pub info: SectionOverrides,
    pub definemeas: SectionOverrides,
    pub mtsect: SectionOverrides,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            downsample: Downsample::default(),
            skip_lines: true,
            separation_tolerance: SEPARATION_TOLERANCE,
            rotation: RotationSetting::None,
            format: EdiFormat::Tipper,
            error_floor: DEFAULT_ERROR_FLOOR,
            missing_channel: MissingChannelPolicy::Substitute,
            head: SectionOverrides::new(),
            info: SectionOverrides::new(),
            definemeas: SectionOverrides::new(),
            mtsect: SectionOverrides::new(),
        }
    }
}

impl ConversionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading conversion config {}", path_ref.display()))?;
        let config: ConversionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing conversion config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn to_pipeline(&self) -> LinePipeline {
        let sampler = LineSampler::new(self.downsample, self.skip_lines)
            .with_tolerance(self.separation_tolerance);
        LinePipeline::new(sampler, self.rotation.mode(), self.missing_channel)
    }

    pub fn to_edi_options(&self, file_date: NaiveDate) -> EdiOptions {
        EdiOptions {
            format: self.format,
            error_floor: self.error_floor,
            file_date,
            head: self.head.clone(),
            info: self.info.clone(),
            definemeas: self.definemeas.clone(),
            mtsect: self.mtsect.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use ztemcore::edi::FieldValue;

    #[test]
    fn defaults_match_legacy_behaviour() {
        let cfg = ConversionConfig::default();
        assert_eq!(cfg.downsample, Downsample::Stride(10));
        assert!(cfg.skip_lines);
        assert_eq!(cfg.error_floor, 0.03);
        assert_eq!(cfg.rotation.mode(), RotationMode::None);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"downsample: 250m\nrotation: self\nformat: full_tensor\nmissing_channel: fail\nhead:\n  COUNTRY: USA\n  ELEV: 120\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ConversionConfig::load(&path).unwrap();
        assert_eq!(cfg.downsample, Downsample::Distance(250.0));
        assert_eq!(cfg.rotation, RotationSetting::SelfBearing);
        assert_eq!(cfg.format, EdiFormat::FullTensor);
        assert_eq!(cfg.missing_channel, MissingChannelPolicy::Fail);
        assert_eq!(cfg.head["ELEV"], FieldValue::Integer(120));
        assert!(cfg.skip_lines);
    }

    #[test]
    fn numeric_rotation_in_yaml() {
        let cfg: ConversionConfig = serde_yaml::from_str("rotation: -12.5\ndownsample: 5\n").unwrap();
        assert_eq!(cfg.rotation, RotationSetting::Angle(-12.5));
        assert_eq!(cfg.downsample, Downsample::Stride(5));
    }

    #[test]
    fn invalid_downsample_is_rejected() {
        assert!(serde_yaml::from_str::<ConversionConfig>("downsample: fast\n").is_err());
    }

    #[test]
    fn rotation_setting_parses_keywords_and_angles() {
        assert_eq!("report".parse::<RotationSetting>(), Ok(RotationSetting::ReportOnly));
        assert_eq!("SELF".parse::<RotationSetting>(), Ok(RotationSetting::SelfBearing));
        assert_eq!("30".parse::<RotationSetting>(), Ok(RotationSetting::Angle(30.0)));
        assert!("sideways".parse::<RotationSetting>().is_err());
    }
}
