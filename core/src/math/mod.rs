pub mod geo;

pub use geo::{bearing_deg, dd_to_dms, planar_distance};
