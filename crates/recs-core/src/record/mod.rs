//! Call/voicemail records returned by the search endpoint.

mod model;

pub use model::{Devices, Record, RecordColumn, RecordId};
