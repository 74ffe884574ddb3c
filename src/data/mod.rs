//! Remote data access (the sensor statistics API).

pub mod api;

pub use api::*;
