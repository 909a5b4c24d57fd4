//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - deserialized straight from the disease.sh / restcountries payloads
//! - passed through the pure pipeline without copies of global state
//! - exported to JSON/CSV for offline inspection

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use chrono::{Datelike, Months, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::timeline::RecoveryFallback;

/// Default number of chart points kept after downsampling.
pub const DEFAULT_TARGET_POINTS: usize = 10;

/// Earliest date offered by the "all time" range preset.
pub const ALL_TIME_START: (i32, u32, u32) = (2019, 1, 1);

/// A per-metric mapping from raw date key to cumulative count.
pub type MetricSeries = BTreeMap<String, u64>;

/// Raw per-metric timelines as served by the disease-statistics API.
///
/// Keys are `M/D/YY` (disease.sh) or ISO `YYYY-MM-DD`. Map order carries no
/// meaning; everything downstream re-sorts by the parsed date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTimeline {
    #[serde(default)]
    pub cases: MetricSeries,
    #[serde(default)]
    pub deaths: MetricSeries,
    /// `None` when the source omits recoveries. An empty map is treated the same way.
    #[serde(default)]
    pub recovered: Option<MetricSeries>,
}

impl RawTimeline {
    /// Recovery data, if the source actually reported any.
    pub fn recovered_series(&self) -> Option<&MetricSeries> {
        self.recovered.as_ref().filter(|m| !m.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty() && self.deaths.is_empty() && self.recovered_series().is_none()
    }
}

/// One fully-populated day of cumulative counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub cases: u64,
    pub deaths: u64,
    pub recovered: u64,
}

/// Inclusive calendar-day interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PipelineError> {
        if start > end {
            return Err(PipelineError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Chart bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Month,
    Day,
}

impl Granularity {
    /// First day of the bucket containing `date`.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Year => date.with_ordinal(1).unwrap_or(date),
            Granularity::Month => date.with_day(1).unwrap_or(date),
            Granularity::Day => date,
        }
    }

    /// Axis label for a bucket start date.
    pub fn label(self, bucket_start: NaiveDate) -> String {
        match self {
            Granularity::Year => bucket_start.format("%Y").to_string(),
            Granularity::Month => bucket_start.format("%Y-%m").to_string(),
            Granularity::Day => bucket_start.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Granularity::Year => "year",
            Granularity::Month => "month",
            Granularity::Day => "day",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Granularity::Year => Granularity::Month,
            Granularity::Month => Granularity::Day,
            Granularity::Day => Granularity::Year,
        }
    }
}

/// Quick date-range choices offered by the front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RangePreset {
    #[value(name = "6m")]
    SixMonths,
    #[value(name = "1y")]
    OneYear,
    #[value(name = "2y")]
    TwoYears,
    #[value(name = "3y")]
    ThreeYears,
    #[value(name = "all")]
    AllTime,
}

impl RangePreset {
    pub const ALL: [RangePreset; 5] = [
        RangePreset::SixMonths,
        RangePreset::OneYear,
        RangePreset::TwoYears,
        RangePreset::ThreeYears,
        RangePreset::AllTime,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            RangePreset::SixMonths => "Last 6 months",
            RangePreset::OneYear => "Last year",
            RangePreset::TwoYears => "Last 2 years",
            RangePreset::ThreeYears => "Last 3 years",
            RangePreset::AllTime => "All time",
        }
    }

    /// Start of the preset window that ends on `end`.
    pub fn start_for(self, end: NaiveDate) -> NaiveDate {
        let months = match self {
            RangePreset::SixMonths => 6,
            RangePreset::OneYear => 12,
            RangePreset::TwoYears => 24,
            RangePreset::ThreeYears => 36,
            RangePreset::AllTime => {
                let (y, m, d) = ALL_TIME_START;
                return NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
            }
        };
        end.checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// A point-in-time statistic plus its trend against the reference sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub value: u64,
    /// Value the trend is measured against (30 samples back, or the earliest).
    pub reference: u64,
    /// Signed percentage string, e.g. `+1.25%`.
    pub percentage: String,
    /// True when the value comes from the recovery estimation policy.
    pub estimated: bool,
}

/// Statistics cards: always the absolute latest data, never range-filtered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub as_of: Option<NaiveDate>,
    pub cases: Sample,
    pub deaths: Sample,
    pub recovered: Sample,
}

/// One chart bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartRow {
    pub label: String,
    pub bucket_start: NaiveDate,
    pub cases: u64,
    pub deaths: u64,
    pub recovered: u64,
}

/// Line-chart input: ascending, unique bucket labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub granularity: Granularity,
    pub recovered_estimated: bool,
    pub rows: Vec<ChartRow>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_value(&self) -> u64 {
        self.rows
            .iter()
            .map(|r| r.cases.max(r.deaths).max(r.recovered))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceKind {
    Unaffected,
    Active,
    Recovered,
    Deaths,
}

impl SliceKind {
    pub fn label(self) -> &'static str {
        match self {
            SliceKind::Unaffected => "Unaffected",
            SliceKind::Active => "Active",
            SliceKind::Recovered => "Recovered",
            SliceKind::Deaths => "Deaths",
        }
    }

    /// Legend color shared by every front-end.
    pub fn color(self) -> &'static str {
        match self {
            SliceKind::Unaffected => "#FBEC85",
            SliceKind::Active => "#B8B5FF",
            SliceKind::Recovered => "#4ADE80",
            SliceKind::Deaths => "#FD6E6A",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionSlice {
    pub kind: SliceKind,
    pub label: String,
    pub value: u64,
    pub color: String,
}

/// Pie-chart input: Unaffected, Active, Recovered, Deaths (in that order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationPartition {
    pub population: u64,
    pub slices: [PartitionSlice; 4],
}

impl PopulationPartition {
    pub fn total(&self) -> u64 {
        self.slices.iter().map(|s| s.value).sum()
    }

    /// Share of the population covered by `slice`, in percent.
    pub fn share(&self, slice: &PartitionSlice) -> f64 {
        if self.population == 0 {
            return 0.0;
        }
        slice.value as f64 / self.population as f64 * 100.0
    }
}

/// Country metadata from the restcountries API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryMeta {
    pub name: String,
    pub official_name: String,
    /// ISO 3166-1 alpha-3 code (`cca3`).
    pub code: String,
    pub population: u64,
}

/// A full dashboard run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub country: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub preset: RangePreset,
    pub granularity: Granularity,
    pub target_points: NonZeroUsize,
    pub recovery: RecoveryFallback,

    /// Offline historical payload (skips the disease.sh timeline request).
    pub timeline_file: Option<PathBuf>,
    /// Use this population instead of looking the country up.
    pub population: Option<u64>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}

impl DashboardConfig {
    /// Resolve the chart interval. Missing bounds come from `preset`, ending `today`.
    pub fn resolve_interval(&self, today: NaiveDate) -> Result<DateInterval, PipelineError> {
        let end = self.end.unwrap_or(today);
        let start = self.start.unwrap_or_else(|| self.preset.start_for(end));
        DateInterval::new(start, end)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            country: "USA".to_string(),
            start: None,
            end: None,
            preset: RangePreset::ThreeYears,
            granularity: Granularity::Year,
            target_points: NonZeroUsize::new(DEFAULT_TARGET_POINTS).unwrap_or(NonZeroUsize::MIN),
            recovery: RecoveryFallback::default(),
            timeline_file: None,
            population: None,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_json: None,
            export_csv: None,
        }
    }
}
