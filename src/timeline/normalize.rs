//! Timeline normalization: raw per-metric maps -> one ordered chart series.
//!
//! Steps, per metric:
//! 1. parse every date key (all keys, before producing anything)
//! 2. drop records outside the interval
//! 3. bucket by granularity, keeping the chronologically last value per bucket
//!
//! The metrics are then merged on the union of buckets. A bucket missing a
//! metric carries that metric's last known value forward (zero before the
//! first one). Missing recoveries go through the `RecoveryFallback` policy.

use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroUsize;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{ChartRow, ChartSeries, DateInterval, Granularity, RawTimeline, TimelinePoint};
use crate::error::PipelineError;
use crate::timeline::dates::SortedTimeline;
use crate::timeline::downsample::downsample;
use crate::timeline::recovery::RecoveryFallback;

/// Caller-selected normalization knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesOptions {
    pub granularity: Granularity,
    pub recovery: RecoveryFallback,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Year,
            recovery: RecoveryFallback::default(),
        }
    }
}

/// Build the interval-filtered, bucketed chart series (no downsampling).
pub fn normalize_timeline(
    timeline: &RawTimeline,
    interval: &DateInterval,
    options: &SeriesOptions,
) -> Result<ChartSeries, PipelineError> {
    Ok(normalize_sorted(&SortedTimeline::from_raw(timeline)?, interval, options))
}

/// `normalize_timeline` over an already parsed timeline (infallible).
pub fn normalize_sorted(
    timeline: &SortedTimeline,
    interval: &DateInterval,
    options: &SeriesOptions,
) -> ChartSeries {
    let granularity = options.granularity;
    let cases = bucketize(&timeline.cases, interval, granularity);
    let deaths = bucketize(&timeline.deaths, interval, granularity);
    let recovered = timeline
        .recovered
        .as_ref()
        .map(|r| bucketize(r, interval, granularity));

    let mut buckets: BTreeSet<NaiveDate> = cases.keys().copied().collect();
    buckets.extend(deaths.keys().copied());
    if let Some(r) = &recovered {
        buckets.extend(r.keys().copied());
    }

    let mut last_cases = 0;
    let mut last_deaths = 0;
    let mut last_recovered = 0;
    let mut rows = Vec::with_capacity(buckets.len());

    for start in buckets {
        last_cases = cases.get(&start).copied().unwrap_or(last_cases);
        last_deaths = deaths.get(&start).copied().unwrap_or(last_deaths);
        let recovered_value = match &recovered {
            Some(r) => {
                last_recovered = r.get(&start).copied().unwrap_or(last_recovered);
                last_recovered
            }
            None => options.recovery.recovered_for(last_cases),
        };

        rows.push(ChartRow {
            label: granularity.label(start),
            bucket_start: start,
            cases: last_cases,
            deaths: last_deaths,
            recovered: recovered_value,
        });
    }

    ChartSeries {
        granularity,
        recovered_estimated: recovered.is_none() && options.recovery.is_estimate(),
        rows,
    }
}

/// Normalize, then reduce the rows to roughly `target_points` for plotting.
pub fn compute_chart_series(
    timeline: &RawTimeline,
    interval: &DateInterval,
    target_points: NonZeroUsize,
    options: &SeriesOptions,
) -> Result<ChartSeries, PipelineError> {
    Ok(chart_series_sorted(
        &SortedTimeline::from_raw(timeline)?,
        interval,
        target_points,
        options,
    ))
}

pub fn chart_series_sorted(
    timeline: &SortedTimeline,
    interval: &DateInterval,
    target_points: NonZeroUsize,
    options: &SeriesOptions,
) -> ChartSeries {
    let mut series = normalize_sorted(timeline, interval, options);
    series.rows = downsample(&series.rows, target_points);
    series
}

/// The chronologically last record of each metric, ignoring any interval.
///
/// Metrics are not merged by bucket: each contributes its own latest value and
/// the point is dated by the newest of them. Returns `None` for an empty timeline.
pub fn latest_sample(
    timeline: &RawTimeline,
    fallback: RecoveryFallback,
) -> Result<Option<TimelinePoint>, PipelineError> {
    Ok(latest_sample_sorted(&SortedTimeline::from_raw(timeline)?, fallback))
}

pub fn latest_sample_sorted(timeline: &SortedTimeline, fallback: RecoveryFallback) -> Option<TimelinePoint> {
    let date = timeline.latest_date()?;

    let cases = timeline.cases.last().map(|(_, v)| *v).unwrap_or(0);
    let deaths = timeline.deaths.last().map(|(_, v)| *v).unwrap_or(0);
    let recovered = match &timeline.recovered {
        Some(r) => r.last().map(|(_, v)| *v).unwrap_or(0),
        None => fallback.recovered_for(cases),
    };

    Some(TimelinePoint {
        date,
        cases,
        deaths,
        recovered,
    })
}

fn bucketize(
    points: &[(NaiveDate, u64)],
    interval: &DateInterval,
    granularity: Granularity,
) -> BTreeMap<NaiveDate, u64> {
    let mut out = BTreeMap::new();
    for &(date, value) in points {
        if !interval.contains(date) {
            continue;
        }
        // Input is ascending, so later days overwrite earlier ones in the bucket.
        out.insert(granularity.bucket_start(date), value);
    }
    out
}
