//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw timeline payloads (`RawTimeline`) and normalized points (`TimelinePoint`)
//! - chart configuration (`Granularity`, `RangePreset`, `DateInterval`)
//! - pipeline outputs (`Statistics`, `ChartSeries`, `PopulationPartition`)

pub mod types;

pub use types::*;
