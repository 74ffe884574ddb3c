//! File output helpers.
//!
//! - merged-table exports (CSV/JSON) and the markdown report (`export`)

pub mod export;

pub use export::*;
