//! Offline end-to-end runs: saved timeline + population override, no network.

use std::path::PathBuf;

use chrono::NaiveDate;
use covid_dash::app::pipeline::run_dashboard;
use covid_dash::domain::{DashboardConfig, Granularity};
use covid_dash::io::{write_chart_csv, write_view_json};
use covid_dash::report::format_dashboard;
use covid_dash::timeline::RecoveryFallback;
use pretty_assertions::assert_eq;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/historical_zedland.json")
}

fn offline_config() -> DashboardConfig {
    DashboardConfig {
        country: "ZZZ".to_string(),
        start: Some(d(2022, 1, 1)),
        end: Some(d(2022, 12, 31)),
        granularity: Granularity::Month,
        timeline_file: Some(fixture()),
        population: Some(1_000),
        ..DashboardConfig::default()
    }
}

#[test]
fn saved_timeline_produces_full_view() {
    let (data, view) = run_dashboard(&offline_config(), d(2023, 1, 1)).unwrap();
    assert_eq!(data.timeline_country.as_deref(), Some("Zedland"));

    assert_eq!(view.country, "Zedland");
    assert_eq!(view.population, Some(1_000));

    // Chart: month buckets inside the interval, last value of each month wins.
    let rows: Vec<(&str, u64, u64, u64)> = view
        .chart
        .rows
        .iter()
        .map(|r| (r.label.as_str(), r.cases, r.deaths, r.recovered))
        .collect();
    assert_eq!(rows, vec![("2022-01", 110, 1, 94), ("2022-02", 200, 3, 170)]);
    assert!(view.chart.recovered_estimated);

    // Cards ignore the interval: the 12/30/21 record is the trend reference.
    assert_eq!(view.statistics.as_of, Some(d(2022, 2, 1)));
    assert_eq!(view.statistics.cases.value, 200);
    assert_eq!(view.statistics.cases.percentage, "+400.00%");
    assert_eq!(view.statistics.deaths.percentage, "0.00%");
    assert_eq!(view.statistics.recovered.value, 170);
    assert!(view.statistics.recovered.estimated);

    let partition = view.partition.as_ref().unwrap();
    let values: Vec<u64> = partition.slices.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![800, 27, 170, 3]);
    assert_eq!(partition.total(), 1_000);

    let report = format_dashboard(&view);
    assert!(report.contains("Country: Zedland (ZZZ)"));
    assert!(report.contains("recovered*"));
}

#[test]
fn zero_fallback_disables_estimates() {
    let config = DashboardConfig {
        recovery: RecoveryFallback::Zero,
        ..offline_config()
    };
    let (_, view) = run_dashboard(&config, d(2023, 1, 1)).unwrap();
    assert!(!view.chart.recovered_estimated);
    assert!(view.chart.rows.iter().all(|r| r.recovered == 0));
    assert_eq!(view.partition.unwrap().slices[1].value, 197);
}

#[test]
fn empty_period_is_not_an_error() {
    let config = DashboardConfig {
        start: Some(d(2023, 1, 1)),
        end: Some(d(2023, 6, 1)),
        ..offline_config()
    };
    let (_, view) = run_dashboard(&config, d(2023, 6, 1)).unwrap();
    assert!(view.chart.is_empty());
    assert_eq!(view.statistics.cases.value, 200);
}

#[test]
fn exports_round_out_the_run() {
    let (_, view) = run_dashboard(&offline_config(), d(2023, 1, 1)).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let csv = dir.path().join("chart.csv");
    write_chart_csv(&csv, &view.chart).unwrap();
    let text = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert_eq!(text.lines().nth(1), Some("2022-01,2022-01-01,110,1,94,true"));

    let json = dir.path().join("view.json");
    write_view_json(&json, &view).unwrap();
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value["code"], "ZZZ");
    assert_eq!(value["chart"]["rows"].as_array().map(Vec::len), Some(2));
}

#[test]
fn malformed_date_key_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(
        &path,
        r#"{"country": "Zedland", "timeline": {"cases": {"not-a-date": 1}, "deaths": {}}}"#,
    )
    .unwrap();

    let config = DashboardConfig {
        timeline_file: Some(path),
        ..offline_config()
    };
    let err = run_dashboard(&config, d(2023, 1, 1)).unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert!(err.message().contains("not-a-date"));
}
