//! Input/output helpers.
//!
//! - result exports (CSV/JSON) (`export`)
//!
//! Timeline ingest lives with the API client (`data::disease::read_historical_file`)
//! since a saved payload and a live response share one format.

pub mod export;

pub use export::*;
