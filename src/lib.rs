//! Quality-of-Life scoring for street addresses.
//!
//! Amenity proximity and district statistics become six 0-100 category
//! scores, which a persona's weights blend into one total. Data comes from
//! the collaborators in [`source`]; everything in [`scoring`] is pure.

pub mod city;
pub mod compare;
pub mod config;
pub mod logging;
pub mod output;
pub mod scoring;
pub mod source;

pub use city::compute_city_data;
pub use city::types::{CityData, Coordinate};
pub use compare::{compare, score_address, AddressQuery, ComparisonResult, PipelineError};
pub use scoring::{compute_qol, normalize, resolve_weights, score_by_distance, QolResult};
