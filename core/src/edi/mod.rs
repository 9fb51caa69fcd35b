//! Write-only EDI serialization of tipper stations.

pub mod format;
pub mod sections;
pub mod writer;

pub use sections::{EdiSection, FieldValue, SectionOverrides};
pub use writer::{
    render_edi, write_edi, write_station_file, EdiFormat, EdiOptions, DEFAULT_ERROR_FLOOR,
};
