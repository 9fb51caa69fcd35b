//! Typed `KEY=VALUE` sections with a sparse override merge.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::fmt;

use crate::edi::format::{format_dms, format_float};
use crate::edi::writer::EdiFormat;

/// Override value as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Float(v) => f.write_str(&format_float(*v)),
            FieldValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

/// Sparse per-key overrides for one section, kept in caller order.
pub type SectionOverrides = IndexMap<String, FieldValue>;

/// A header section: fixed known fields plus any extra keys added by
/// overrides, written in that order.
pub trait EdiSection {
    const TAG: &'static str;

    fn fields(&self) -> Vec<(&'static str, String)>;

    /// Sets a known field by its exact key. Returns false for keys the
    /// section does not define.
    fn set_field(&mut self, key: &str, value: String) -> bool;

    fn extra(&self) -> &[(String, String)];

    fn extra_mut(&mut self) -> &mut Vec<(String, String)>;

    /// Applies overrides key by key; unknown keys are appended in the
    /// order given. Keys match exactly, case included.
    fn merge(&mut self, overrides: &SectionOverrides) {
        for (key, value) in overrides {
            let text = value.to_string();
            if self.set_field(key, text.clone()) {
                continue;
            }
            let extra = self.extra_mut();
            match extra.iter_mut().find(|(known, _)| known == key) {
                Some(entry) => entry.1 = text,
                None => extra.push((key.clone(), text)),
            }
        }
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.fields()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .chain(self.extra().iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadSection {
    pub acqby: String,
    pub fileby: String,
    pub filedate: String,
    pub lat: String,
    pub long: String,
    pub elev: String,
    pub stdvers: String,
    pub country: String,
    pub empty: String,
    pub extra: Vec<(String, String)>,
}

impl HeadSection {
    pub fn new(latitude: f64, longitude: f64, file_date: NaiveDate) -> Self {
        Self {
            acqby: "\"eroots\"".into(),
            fileby: "\"pyMT\"".into(),
            filedate: file_date.format("%m/%d/%y").to_string(),
            lat: format_dms(latitude),
            long: format_dms(longitude),
            elev: "0".into(),
            stdvers: "\"SEG 1.0\"".into(),
            country: "CANADA".into(),
            empty: "1e+32".into(),
            extra: Vec::new(),
        }
    }
}

impl EdiSection for HeadSection {
    const TAG: &'static str = ">HEAD";

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ACQBY", self.acqby.clone()),
            ("FILEBY", self.fileby.clone()),
            ("FILEDATE", self.filedate.clone()),
            ("LAT", self.lat.clone()),
            ("LONG", self.long.clone()),
            ("ELEV", self.elev.clone()),
            ("STDVERS", self.stdvers.clone()),
            ("COUNTRY", self.country.clone()),
            ("EMPTY", self.empty.clone()),
        ]
    }

    fn set_field(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "ACQBY" => &mut self.acqby,
            "FILEBY" => &mut self.fileby,
            "FILEDATE" => &mut self.filedate,
            "LAT" => &mut self.lat,
            "LONG" => &mut self.long,
            "ELEV" => &mut self.elev,
            "STDVERS" => &mut self.stdvers,
            "COUNTRY" => &mut self.country,
            "EMPTY" => &mut self.empty,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn extra(&self) -> &[(String, String)] {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Vec<(String, String)> {
        &mut self.extra
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoSection {
    pub maxinfo: String,
    pub survey_id: String,
    pub extra: Vec<(String, String)>,
}

impl Default for InfoSection {
    fn default() -> Self {
        Self {
            maxinfo: "999".into(),
            survey_id: "\"\"".into(),
            extra: Vec::new(),
        }
    }
}

impl EdiSection for InfoSection {
    const TAG: &'static str = ">INFO";

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("MAXINFO", self.maxinfo.clone()),
            ("SURVEY ID", self.survey_id.clone()),
        ]
    }

    fn set_field(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "MAXINFO" => &mut self.maxinfo,
            "SURVEY ID" => &mut self.survey_id,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn extra(&self) -> &[(String, String)] {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Vec<(String, String)> {
        &mut self.extra
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineMeasSection {
    pub maxchan: String,
    pub maxrun: String,
    pub maxmeas: String,
    pub units: String,
    pub reftype: String,
    pub reflat: String,
    pub reflong: String,
    pub extra: Vec<(String, String)>,
}

impl DefineMeasSection {
    pub fn new(latitude: f64, longitude: f64, format: EdiFormat) -> Self {
        let maxchan = match format {
            EdiFormat::Tipper => "1",
            EdiFormat::FullTensor => "5",
        };
        Self {
            maxchan: maxchan.into(),
            maxrun: "999".into(),
            maxmeas: "9999".into(),
            units: "M".into(),
            reftype: "CART".into(),
            reflat: format_dms(latitude),
            reflong: format_dms(longitude),
            extra: Vec::new(),
        }
    }
}

impl EdiSection for DefineMeasSection {
    const TAG: &'static str = ">=DEFINEMEAS";

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("MAXCHAN", self.maxchan.clone()),
            ("MAXRUN", self.maxrun.clone()),
            ("MAXMEAS", self.maxmeas.clone()),
            ("UNITS", self.units.clone()),
            ("REFTYPE", self.reftype.clone()),
            ("REFLAT", self.reflat.clone()),
            ("REFLONG", self.reflong.clone()),
        ]
    }

    fn set_field(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "MAXCHAN" => &mut self.maxchan,
            "MAXRUN" => &mut self.maxrun,
            "MAXMEAS" => &mut self.maxmeas,
            "UNITS" => &mut self.units,
            "REFTYPE" => &mut self.reftype,
            "REFLAT" => &mut self.reflat,
            "REFLONG" => &mut self.reflong,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn extra(&self) -> &[(String, String)] {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Vec<(String, String)> {
        &mut self.extra
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MtSection {
    pub sectid: String,
    pub nfreq: String,
    pub hx: String,
    pub hy: String,
    pub hz: String,
    /// Electric channel ids, present only for full-tensor output.
    pub ex: Option<String>,
    pub ey: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl MtSection {
    pub fn new(nfreq: usize, format: EdiFormat) -> Self {
        let electric = |id: &str| match format {
            EdiFormat::Tipper => None,
            EdiFormat::FullTensor => Some(id.to_string()),
        };
        Self {
            sectid: "\"\"".into(),
            nfreq: nfreq.to_string(),
            hx: "1.01".into(),
            hy: "2.01".into(),
            hz: "3.01".into(),
            ex: electric("4.01"),
            ey: electric("5.01"),
            extra: Vec::new(),
        }
    }
}

impl EdiSection for MtSection {
    const TAG: &'static str = ">=MTSECT";

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("SECTID", self.sectid.clone()),
            ("NFREQ", self.nfreq.clone()),
            ("HX", self.hx.clone()),
            ("HY", self.hy.clone()),
            ("HZ", self.hz.clone()),
        ];
        if let Some(ex) = &self.ex {
            fields.push(("EX", ex.clone()));
        }
        if let Some(ey) = &self.ey {
            fields.push(("EY", ey.clone()));
        }
        fields
    }

    fn set_field(&mut self, key: &str, value: String) -> bool {
        match key {
            "SECTID" => self.sectid = value,
            "NFREQ" => self.nfreq = value,
            "HX" => self.hx = value,
            "HY" => self.hy = value,
            "HZ" => self.hz = value,
            "EX" => self.ex = Some(value),
            "EY" => self.ey = Some(value),
            _ => return false,
        }
        true
    }

    fn extra(&self) -> &[(String, String)] {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Vec<(String, String)> {
        &mut self.extra
    }
}
