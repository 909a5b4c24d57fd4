//! Shared "dashboard pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch (timeline ∥ metadata) -> statistics -> chart series -> partition
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::{CountrySummary, DataSources, HistoricalPayload, read_historical_file};
use crate::domain::{
    ChartSeries, CountryMeta, DashboardConfig, DateInterval, PopulationPartition, RawTimeline,
    Statistics, TimelinePoint,
};
use crate::error::{AppError, PipelineError};
use crate::stats::{compute_population_partition, statistics_sorted};
use crate::timeline::{SeriesOptions, SortedTimeline, chart_series_sorted, latest_sample_sorted};

/// Everything fetched for one country.
#[derive(Debug, Clone)]
pub struct CountryData {
    /// Code the user asked for (as typed).
    pub code: String,
    pub meta: Option<CountryMeta>,
    pub summary: Option<CountrySummary>,
    pub timeline_country: Option<String>,
    pub timeline: RawTimeline,
}

impl CountryData {
    pub fn from_payload(code: &str, payload: HistoricalPayload) -> Self {
        Self {
            code: code.to_string(),
            meta: None,
            summary: None,
            timeline_country: payload.country,
            timeline: payload.timeline,
        }
    }

    /// Population from country metadata, falling back to the disease.sh summary.
    pub fn population(&self) -> Option<u64> {
        self.meta
            .as_ref()
            .map(|m| m.population)
            .filter(|p| *p > 0)
            .or_else(|| self.summary.as_ref().map(|s| s.population).filter(|p| *p > 0))
    }

    pub fn display_name(&self) -> String {
        self.meta
            .as_ref()
            .map(|m| m.name.clone())
            .or_else(|| self.timeline_country.clone())
            .or_else(|| self.summary.as_ref().map(|s| s.country.clone()))
            .unwrap_or_else(|| self.code.clone())
    }
}

/// All computed outputs for one (country, interval, options) selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub country: String,
    /// Official name from country metadata, when known and different from `country`.
    pub official_name: Option<String>,
    pub code: String,
    pub population: Option<u64>,
    pub interval: DateInterval,
    pub options: SeriesOptions,
    pub statistics: Statistics,
    pub latest: Option<TimelinePoint>,
    pub chart: ChartSeries,
    pub partition: Option<PopulationPartition>,
}

/// Fetch everything and compute the view.
pub fn run_dashboard(
    config: &DashboardConfig,
    today: NaiveDate,
) -> Result<(CountryData, DashboardView), AppError> {
    // Resolve the interval before touching the network: a bad range is a user error.
    let interval = config.resolve_interval(today)?;
    let data = load_country_data(config)?;
    let view = build_view(&data, interval, config)?;
    Ok((data, view))
}

/// Load the timeline (file or API) plus metadata according to `config`.
pub fn load_country_data(config: &DashboardConfig) -> Result<CountryData, AppError> {
    match &config.timeline_file {
        Some(path) => {
            let payload = read_historical_file(path)?;
            let mut data = CountryData::from_payload(&config.country, payload);
            if config.population.is_none() {
                // Offline timeline, online population.
                let sources = DataSources::from_env()?;
                let (meta, summary) = fetch_metadata(&sources, &config.country);
                data.meta = meta;
                data.summary = summary;
            }
            Ok(data)
        }
        None => {
            let sources = DataSources::from_env()?;
            fetch_country_data(&sources, &config.country)
        }
    }
}

/// Fetch the timeline, country metadata and summary in parallel.
///
/// Only the timeline is required. Metadata failures are logged and leave the
/// population unknown.
pub fn fetch_country_data(sources: &DataSources, code: &str) -> Result<CountryData, AppError> {
    tracing::info!(country = code, "fetching country data");

    let (timeline, (meta, summary)) = rayon::join(
        || sources.disease.fetch_timeline(code),
        || fetch_metadata(sources, code),
    );

    let payload = timeline?.ok_or_else(|| {
        AppError::from(PipelineError::MissingData(format!(
            "COVID-19 data is not available for {code}."
        )))
    })?;

    let mut data = CountryData::from_payload(code, payload);
    data.meta = meta;
    data.summary = summary;
    Ok(data)
}

fn fetch_metadata(sources: &DataSources, code: &str) -> (Option<CountryMeta>, Option<CountrySummary>) {
    let (meta, summary) = rayon::join(
        || sources.countries.fetch_country(code),
        || sources.disease.fetch_summary(code),
    );

    let meta = meta.unwrap_or_else(|err| {
        tracing::warn!(country = code, %err, "country metadata unavailable");
        None
    });
    let summary = summary.unwrap_or_else(|err| {
        tracing::warn!(country = code, %err, "country summary unavailable");
        None
    });
    (meta, summary)
}

/// Compute the view from already-fetched data (pure).
///
/// This is what the TUI calls on date-range/granularity changes so it can
/// recompute without re-fetching.
pub fn build_view(
    data: &CountryData,
    interval: DateInterval,
    config: &DashboardConfig,
) -> Result<DashboardView, PipelineError> {
    if data.timeline.is_empty() {
        return Err(PipelineError::MissingData(format!(
            "the timeline for {} is empty.",
            data.display_name()
        )));
    }

    let options = SeriesOptions {
        granularity: config.granularity,
        recovery: config.recovery,
    };

    // Parse once; the three outputs share the sorted metrics.
    let sorted = SortedTimeline::from_raw(&data.timeline)?;
    let statistics = statistics_sorted(&sorted, options.recovery);
    let latest = latest_sample_sorted(&sorted, options.recovery);
    let chart = chart_series_sorted(&sorted, &interval, config.target_points, &options);
    if chart.recovered_estimated {
        tracing::debug!(country = %data.code, "recoveries estimated from cases");
    }

    let population = config.population.or_else(|| data.population());
    let partition = match (population, latest) {
        (Some(population), Some(latest)) => Some(compute_population_partition(
            population,
            latest.cases,
            latest.deaths,
            latest.recovered,
        )),
        (None, _) => {
            tracing::warn!(country = %data.code, "population unknown; skipping partition");
            None
        }
        (Some(_), None) => None,
    };

    let country = data.display_name();
    let official_name = data
        .meta
        .as_ref()
        .map(|m| m.official_name.clone())
        .filter(|name| !name.is_empty() && *name != country);

    Ok(DashboardView {
        country,
        official_name,
        code: data.code.clone(),
        population,
        interval,
        options,
        statistics,
        latest,
        chart,
        partition,
    })
}
