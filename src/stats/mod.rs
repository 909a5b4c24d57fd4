//! Statistics cards and population partition.
//!
//! Statistics always describe the absolute latest data in the timeline. They
//! are never restricted to the chart's date range.

use chrono::NaiveDate;

use crate::domain::{PopulationPartition, RawTimeline, Sample, Statistics};
use crate::error::PipelineError;
use crate::timeline::RecoveryFallback;
use crate::timeline::dates::SortedTimeline;

pub mod partition;
pub mod trend;

pub use partition::partition_population;
pub use trend::{calculate_percentage, is_increase};

/// How many samples back the trend reference sits.
pub const TREND_WINDOW: usize = 30;

/// Latest value and trend for cases, deaths and recoveries.
pub fn compute_statistics(
    timeline: &RawTimeline,
    fallback: RecoveryFallback,
) -> Result<Statistics, PipelineError> {
    Ok(statistics_sorted(&SortedTimeline::from_raw(timeline)?, fallback))
}

pub fn statistics_sorted(timeline: &SortedTimeline, fallback: RecoveryFallback) -> Statistics {
    let cases_sample = sample_of(&timeline.cases);
    let deaths_sample = sample_of(&timeline.deaths);
    let recovered_sample = match &timeline.recovered {
        Some(r) => sample_of(r),
        None => {
            let value = fallback.recovered_for(cases_sample.value);
            let reference = fallback.recovered_for(cases_sample.reference);
            Sample {
                value,
                reference,
                percentage: calculate_percentage(value as f64, reference as f64),
                estimated: fallback.is_estimate(),
            }
        }
    };

    Statistics {
        as_of: timeline.latest_date(),
        cases: cases_sample,
        deaths: deaths_sample,
        recovered: recovered_sample,
    }
}

/// Pie-chart buckets for the latest counts.
pub fn compute_population_partition(
    population: u64,
    latest_cases: u64,
    latest_deaths: u64,
    latest_recovered: u64,
) -> PopulationPartition {
    partition_population(population, latest_cases, latest_deaths, latest_recovered)
}

/// Index of the trend reference in a chronologically sorted metric.
fn reference_index(len: usize) -> Option<usize> {
    match len {
        0 => None,
        n if n > TREND_WINDOW => Some(n - TREND_WINDOW),
        _ => Some(0),
    }
}

fn sample_of(points: &[(NaiveDate, u64)]) -> Sample {
    let value = points.last().map(|(_, v)| *v).unwrap_or(0);
    let reference = reference_index(points.len())
        .map(|i| points[i].1)
        .unwrap_or(0);

    Sample {
        value,
        reference,
        percentage: calculate_percentage(value as f64, reference as f64),
        estimated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricSeries;

    fn daily(start: NaiveDate, values: impl IntoIterator<Item = u64>) -> MetricSeries {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let date = start + chrono::Duration::days(i as i64);
                (date.format("%-m/%-d/%y").to_string(), v)
            })
            .collect()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn reference_is_thirty_samples_back() {
        assert_eq!(reference_index(0), None);
        assert_eq!(reference_index(1), Some(0));
        assert_eq!(reference_index(30), Some(0));
        assert_eq!(reference_index(31), Some(1));
        assert_eq!(reference_index(100), Some(70));
    }

    #[test]
    fn statistics_use_latest_and_reference() {
        // 40 days: values 100, 101, ..., 139. Reference index 10 -> 110.
        let timeline = RawTimeline {
            cases: daily(d(2022, 1, 1), 100..140),
            deaths: daily(d(2022, 1, 1), std::iter::repeat(4).take(40)),
            recovered: Some(daily(d(2022, 1, 1), 0..40)),
        };
        let stats = compute_statistics(&timeline, RecoveryFallback::default()).unwrap();

        assert_eq!(stats.as_of, Some(d(2022, 2, 9)));
        assert_eq!(stats.cases.value, 139);
        assert_eq!(stats.cases.reference, 110);
        assert_eq!(stats.cases.percentage, "+26.36%");
        assert_eq!(stats.deaths.percentage, "+0.00%");
        assert_eq!(stats.recovered.value, 39);
        assert_eq!(stats.recovered.reference, 10);
        assert!(!stats.recovered.estimated);
    }

    #[test]
    fn short_series_compares_against_earliest() {
        let timeline = RawTimeline {
            cases: daily(d(2022, 1, 1), [0, 50, 100]),
            deaths: daily(d(2022, 1, 1), [2, 1]),
            recovered: None,
        };
        let stats = compute_statistics(&timeline, RecoveryFallback::default()).unwrap();

        assert_eq!(stats.cases.percentage, "0.00%");
        assert_eq!(stats.deaths.percentage, "-50.00%");
        assert_eq!(stats.recovered.value, 85);
        assert_eq!(stats.recovered.reference, 0);
        assert!(stats.recovered.estimated);
    }

    #[test]
    fn statistics_ignore_chart_interval() {
        // Latest raw record is what the cards show, whatever the chart range is.
        let timeline = RawTimeline {
            cases: MetricSeries::from([
                ("1/1/21".to_string(), 10),
                ("3/9/23".to_string(), 999),
            ]),
            deaths: MetricSeries::new(),
            recovered: None,
        };
        let stats = compute_statistics(&timeline, RecoveryFallback::Zero).unwrap();
        assert_eq!(stats.cases.value, 999);
        assert_eq!(stats.as_of, Some(d(2023, 3, 9)));
        assert_eq!(stats.recovered.value, 0);
        assert!(!stats.recovered.estimated);
    }

    #[test]
    fn empty_metrics_report_zero() {
        let stats = compute_statistics(&RawTimeline::default(), RecoveryFallback::default()).unwrap();
        assert_eq!(stats.as_of, None);
        assert_eq!(stats.cases.value, 0);
        assert_eq!(stats.cases.percentage, "0.00%");
    }

    #[test]
    fn malformed_key_is_a_parse_error() {
        let timeline = RawTimeline {
            cases: MetricSeries::from([("not-a-date".to_string(), 1)]),
            ..RawTimeline::default()
        };
        assert!(matches!(
            compute_statistics(&timeline, RecoveryFallback::default()),
            Err(PipelineError::Parse { .. })
        ));
    }

    #[test]
    fn partition_wrapper_matches_partitioner() {
        let p = compute_population_partition(1_000, 100, 5, 80);
        assert_eq!(p, partition_population(1_000, 100, 5, 80));
    }
}
