use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::edi::format::{format_exp, format_fixed};
use crate::edi::sections::{
    DefineMeasSection, EdiSection, HeadSection, InfoSection, MtSection, SectionOverrides,
};
use crate::prelude::StationRecord;
use crate::survey::FrequencySet;

/// Flat error written for every tipper value.
pub const DEFAULT_ERROR_FLOOR: f64 = 0.03;
/// Impedance value written in full-tensor files that carry tipper data only.
pub const DUMMY_IMPEDANCE: f64 = 1.0;
/// Variance paired with [`DUMMY_IMPEDANCE`]; large so downstream fits ignore it.
pub const DUMMY_IMPEDANCE_VARIANCE: f64 = 1.0e3;

const FREQ_WIDTH: usize = 14;
const FREQ_PRECISION: usize = 4;
const ROT_WIDTH: usize = 14;
const ROT_PRECISION: usize = 3;
const DATA_WIDTH: usize = 18;
const DATA_PRECISION: usize = 7;

const IMPEDANCE_COMPONENTS: [&str; 4] = ["ZXX", "ZXY", "ZYX", "ZYY"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdiFormat {
    /// Tipper blocks only.
    #[default]
    Tipper,
    /// Tipper blocks plus a placeholder impedance tensor.
    FullTensor,
}

/// Everything besides the station that shapes an EDI file.
#[derive(Debug, Clone)]
pub struct EdiOptions {
    pub format: EdiFormat,
    pub error_floor: f64,
    pub file_date: NaiveDate,
    pub head: SectionOverrides,
    pub info: SectionOverrides,
    pub definemeas: SectionOverrides,
    pub mtsect: SectionOverrides,
}

impl EdiOptions {
    pub fn new(file_date: NaiveDate) -> Self {
        Self {
            format: EdiFormat::default(),
            error_floor: DEFAULT_ERROR_FLOOR,
            file_date,
            head: SectionOverrides::new(),
            info: SectionOverrides::new(),
            definemeas: SectionOverrides::new(),
            mtsect: SectionOverrides::new(),
        }
    }

    /// Options dated with the local calendar day.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

impl Default for EdiOptions {
    fn default() -> Self {
        Self::today()
    }
}

/// Renders one station as EDI text.
///
/// The four tipper arrays must each hold one value per frequency.
pub fn render_edi(station: &StationRecord, freqs: &FrequencySet, options: &EdiOptions) -> String {
    debug_assert!(station.is_consistent());
    debug_assert_eq!(station.frequency_count(), freqs.len());

    let count = freqs.len();
    let mut head = HeadSection::new(station.latitude, station.longitude, options.file_date);
    head.merge(&options.head);
    let mut info = InfoSection::default();
    info.merge(&options.info);
    let mut definemeas =
        DefineMeasSection::new(station.latitude, station.longitude, options.format);
    definemeas.merge(&options.definemeas);
    let mut mtsect = MtSection::new(station.frequency_count(), options.format);
    mtsect.merge(&options.mtsect);

    let mut out = String::new();
    push_section(&mut out, &head);
    push_section(&mut out, &info);
    push_section(&mut out, &definemeas);
    push_section(&mut out, &mtsect);

    push_block(
        &mut out,
        "FREQ",
        count,
        freqs
            .iter()
            .map(|f| format_exp(f as f64, FREQ_PRECISION, FREQ_WIDTH)),
    );

    if options.format == EdiFormat::FullTensor {
        push_block(&mut out, "ZROT", count, rotation_zeros(count));
        for component in IMPEDANCE_COMPONENTS {
            for (suffix, value) in [
                ("R", DUMMY_IMPEDANCE),
                ("I", DUMMY_IMPEDANCE),
                (".VAR", DUMMY_IMPEDANCE_VARIANCE),
            ] {
                push_block(
                    &mut out,
                    &format!("{}{}", component, suffix),
                    count,
                    constant(value, count),
                );
            }
        }
    }

    push_block(&mut out, "TROT", count, rotation_zeros(count));
    for (tag, values) in [
        ("TXR.EXP", &station.tzxr),
        ("TXI.EXP", &station.tzxi),
        ("TYR.EXP", &station.tzyr),
        ("TYI.EXP", &station.tzyi),
    ] {
        push_block(&mut out, tag, count, values.iter().map(|&v| data_value(v)));
    }
    push_block(&mut out, "TXVAR.EXP", count, constant(options.error_floor, count));
    push_block(&mut out, "TYVAR.EXP", count, constant(options.error_floor, count));

    out.push_str(">END");
    out
}

pub fn write_edi<W: Write>(
    writer: &mut W,
    station: &StationRecord,
    freqs: &FrequencySet,
    options: &EdiOptions,
) -> io::Result<()> {
    writer.write_all(render_edi(station, freqs, options).as_bytes())
}

/// Writes `<station>.edi` into `dir`, creating the directory if needed.
pub fn write_station_file(
    dir: &Path,
    station: &StationRecord,
    freqs: &FrequencySet,
    options: &EdiOptions,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.edi", station.name));
    let mut file = io::BufWriter::new(fs::File::create(&path)?);
    write_edi(&mut file, station, freqs, options)?;
    file.flush()?;
    Ok(path)
}

fn push_section<S: EdiSection>(out: &mut String, section: &S) {
    out.push_str(S::TAG);
    out.push('\n');
    for (key, value) in section.entries() {
        out.push_str(&format!("{}={}\n", key, value));
    }
    out.push('\n');
}

fn push_block(out: &mut String, tag: &str, count: usize, values: impl Iterator<Item = String>) {
    out.push_str(&format!(">{} //{}\n", tag, count));
    for value in values {
        out.push_str(&value);
    }
    out.push_str("\n\n");
}

fn data_value(value: f64) -> String {
    format_exp(value, DATA_PRECISION, DATA_WIDTH)
}

fn constant(value: f64, count: usize) -> impl Iterator<Item = String> {
    std::iter::repeat(data_value(value)).take(count)
}

fn rotation_zeros(count: usize) -> impl Iterator<Item = String> {
    std::iter::repeat(format_fixed(0.0, ROT_PRECISION, ROT_WIDTH)).take(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn station() -> StationRecord {
        StationRecord {
            name: "L10010_000".into(),
            latitude: 54.5,
            longitude: -122.25,
            tzxr: vec![0.1, -0.02],
            tzyr: vec![-0.05, 0.3],
            tzxi: vec![0.001, 0.0],
            tzyi: vec![-0.4, 1e-10],
        }
    }

    fn options() -> EdiOptions {
        EdiOptions::new(NaiveDate::from_ymd_opt(2023, 11, 2).unwrap())
    }

    fn block<'a>(text: &'a str, tag: &str) -> (&'a str, &'a str) {
        let header = format!(">{} //", tag);
        let start = text.find(&header).unwrap();
        let mut lines = text[start..].lines();
        (lines.next().unwrap(), lines.next().unwrap())
    }

    #[test]
    fn tipper_file_layout() {
        let freqs = FrequencySet::new([30, 720]);
        let text = render_edi(&station(), &freqs, &options());

        assert!(text.starts_with(">HEAD\nACQBY=\"eroots\"\nFILEBY=\"pyMT\"\nFILEDATE=11/02/23\n"));
        assert!(text.contains("LAT=54:30:0.00\nLONG=-122:-15:-0.00\n"));
        assert!(text.contains("\n\n>INFO\nMAXINFO=999\nSURVEY ID=\"\"\n\n>=DEFINEMEAS\n"));
        assert!(text.contains(">=MTSECT\nSECTID=\"\"\nNFREQ=2\nHX=1.01\nHY=2.01\nHZ=3.01\n\n"));
        assert!(text.ends_with(">TYVAR.EXP //2\n     3.0000000E-02     3.0000000E-02\n\n>END"));

        assert_eq!(block(&text, "FREQ").1, "    3.0000E+01    7.2000E+02");
        assert_eq!(block(&text, "TROT").1, "         0.000         0.000");
        assert_eq!(block(&text, "TXR.EXP").1, "     1.0000000E-01    -2.0000000E-02");
        assert_eq!(block(&text, "TYI.EXP").1, "    -4.0000000E-01     1.0000000E-10");
        assert!(!text.contains("ZXYR"));
    }

    #[test]
    fn blocks_follow_tipper_order() {
        let text = render_edi(&station(), &FrequencySet::new([30, 720]), &options());
        let tags: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with('>') && l.contains("//"))
            .map(|l| l.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(
            tags,
            [">FREQ", ">TROT", ">TXR.EXP", ">TXI.EXP", ">TYR.EXP", ">TYI.EXP", ">TXVAR.EXP", ">TYVAR.EXP"]
        );
    }

    #[test]
    fn full_tensor_adds_dummy_impedance() {
        let mut opts = options();
        opts.format = EdiFormat::FullTensor;
        let text = render_edi(&station(), &FrequencySet::new([30, 720]), &opts);
        assert_eq!(block(&text, "ZROT").1, "         0.000         0.000");
        assert_eq!(block(&text, "ZXYR").1, "     1.0000000E+00     1.0000000E+00");
        assert_eq!(block(&text, "ZYY.VAR").1, "     1.0000000E+03     1.0000000E+03");
        assert!(text.find(">ZYY.VAR").unwrap() < text.find(">TROT").unwrap());
        assert!(text.contains("HZ=3.01\nEX=4.01\nEY=5.01\n"));
        assert!(text.ends_with(">END"));
    }

    #[test]
    fn overrides_and_error_floor_apply() {
        let mut opts = options();
        opts.error_floor = 0.05;
        opts.head.insert("COUNTRY".into(), "USA".into());
        opts.info.insert("PROJECT".into(), "\"Test\"".into());
        let text = render_edi(&station(), &FrequencySet::new([30, 720]), &opts);
        assert!(text.contains("COUNTRY=USA\n"));
        assert!(text.contains("SURVEY ID=\"\"\nPROJECT=\"Test\"\n\n"));
        assert_eq!(block(&text, "TXVAR.EXP").1, "     5.0000000E-02     5.0000000E-02");
    }

    #[test]
    fn rendering_is_deterministic() {
        let freqs = FrequencySet::new([30, 720]);
        let a = render_edi(&station(), &freqs, &options());
        let b = render_edi(&station(), &freqs, &options());
        assert_eq!(a, b);
    }

    #[test]
    fn station_file_is_written_into_new_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("edi");
        let path =
            write_station_file(&target, &station(), &FrequencySet::new([30, 720]), &options())
                .unwrap();
        assert_eq!(path.file_name().unwrap(), "L10010_000.edi");
        let text = fs::read_to_string(path).unwrap();
        assert!(text.ends_with(">END"));
    }
}
