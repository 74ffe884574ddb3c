//! Domain model used throughout the panel.
//!
//! This module defines:
//!
//! - metrics, recommended bands, and statuses (`types`)
//! - the keyed full-outer-join of the two daily series (`merge`)
//! - range classification and within-range aggregation (`classify`)

pub mod classify;
pub mod merge;
pub mod types;

pub use classify::*;
pub use merge::*;
pub use types::*;
