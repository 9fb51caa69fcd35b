//! Station extraction and EDI rendering for airborne ZTEM tipper surveys.
//!
//! Flight lines come in through [`survey::SurveySource`], are downsampled
//! and filtered by [`processing::LineSampler`], optionally rotated, and
//! leave as one EDI file per station through [`edi::render_edi`].

pub mod edi;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod survey;
pub mod telemetry;

pub use prelude::{Component, ConversionError, ConversionResult, StationRecord};
