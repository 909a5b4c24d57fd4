//! Command-line parsing for the COVID-19 and population dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the timeline/statistics code.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{Granularity, RangePreset};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "covid-dash",
    version,
    about = "COVID-19 and population dashboard (disease.sh + restcountries)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print statistics, the chart table and the population breakdown for one country.
    Show(DashArgs),
    /// List countries known to the metadata API (optionally filtered).
    Countries(CountriesArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `covid-dash show`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(DashArgs),
}

/// Common options for the dashboard views.
#[derive(Debug, Parser, Clone)]
pub struct DashArgs {
    /// ISO 3166-1 alpha-3 country code (e.g. USA, DEU, IND).
    #[arg(short = 'c', long, default_value = "USA")]
    pub country: String,

    /// Chart start date (YYYY-MM-DD). Defaults to the start of `--range`.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Chart end date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Date-range preset used when `--start` is not given.
    #[arg(long, value_enum, default_value_t = RangePreset::ThreeYears)]
    pub range: RangePreset,

    /// Chart bucket size.
    #[arg(short = 'g', long, value_enum, default_value_t = Granularity::Year)]
    pub granularity: Granularity,

    /// Target number of chart points after downsampling.
    #[arg(long, default_value = "10")]
    pub points: NonZeroUsize,

    /// Report zero recoveries instead of estimating them when the API has none.
    #[arg(long)]
    pub no_estimate: bool,

    /// Read the historical payload from a JSON file instead of the API.
    #[arg(long, value_name = "JSON")]
    pub timeline_file: Option<PathBuf>,

    /// Use this population instead of looking the country up.
    #[arg(long)]
    pub population: Option<u64>,

    /// Render an ASCII chart below the report.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the full view to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Export chart rows to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}

/// Options for the country listing.
#[derive(Debug, Parser)]
pub struct CountriesArgs {
    /// Case-insensitive substring filter on the country name.
    #[arg(short = 's', long)]
    pub search: Option<String>,
}
