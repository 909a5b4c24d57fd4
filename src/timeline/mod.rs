//! Timeline pipeline: date parsing, bucketing/forward-fill, recovery fallback
//! and downsampling.
//!
//! Everything here is pure and deterministic; the orchestration layer feeds it
//! already-deserialized payloads.

pub mod dates;
pub mod downsample;
pub mod normalize;
pub mod recovery;

pub use dates::{SortedTimeline, parse_date_key};
pub use downsample::downsample;
pub use normalize::{
    SeriesOptions, chart_series_sorted, compute_chart_series, latest_sample, latest_sample_sorted,
    normalize_sorted, normalize_timeline,
};
pub use recovery::{DEFAULT_RECOVERY_RATIO, RecoveryFallback, estimate_recovered};
