pub mod bearing;
pub mod extract;
pub mod pipeline;
pub mod rotation;
pub mod sampler;

pub use bearing::line_bearing;
pub use extract::{extract_stations, LineStations, MissingChannelPolicy, PLACEHOLDER};
pub use pipeline::{LineOutput, LinePipeline};
pub use rotation::{rotate_station, RotationMode};
pub use sampler::{Downsample, FlightAngle, LineSampler, LineSelection, SamplerState};
