//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches disease.sh / restcountries data (or reads a saved timeline)
//! - computes statistics, chart series and the population partition
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, CountriesArgs, DashArgs};
use crate::domain::DashboardConfig;
use crate::error::AppError;
use crate::timeline::RecoveryFallback;

pub mod pipeline;

/// Entry point for the `covid-dash` binary.
pub fn run() -> Result<(), AppError> {
    // We want `covid-dash` and `covid-dash -c DEU` to behave like `covid-dash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Show(args) => {
            crate::logging::init_stderr();
            handle_show(args)
        }
        Command::Countries(args) => {
            crate::logging::init_stderr();
            handle_countries(args)
        }
        Command::Tui(args) => {
            crate::logging::init_for_tui()?;
            handle_tui(args)
        }
    }
}

fn handle_show(args: DashArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args);
    let today = chrono::Local::now().date_naive();
    let (_, view) = pipeline::run_dashboard(&config, today)?;

    println!("{}", crate::report::format_dashboard(&view));

    if config.plot {
        let plot = crate::plot::render_chart_plot(&view.chart, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_json {
        crate::io::export::write_view_json(path, &view)?;
        tracing::info!(path = %path.display(), "wrote JSON export");
    }
    if let Some(path) = &config.export_csv {
        crate::io::export::write_chart_csv(path, &view.chart)?;
        tracing::info!(path = %path.display(), "wrote CSV export");
    }

    Ok(())
}

fn handle_countries(args: CountriesArgs) -> Result<(), AppError> {
    let sources = crate::data::DataSources::from_env()?;
    let countries = sources.countries.fetch_all()?;

    let term = args.search.as_deref().unwrap_or("");
    let matches = crate::data::search_countries(&countries, term);
    if matches.is_empty() {
        println!("No countries match '{term}'.");
        return Ok(());
    }

    print!("{}", crate::report::format_country_list(&matches));
    Ok(())
}

fn handle_tui(args: DashArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

pub fn dashboard_config_from_args(args: &DashArgs) -> DashboardConfig {
    DashboardConfig {
        country: args.country.trim().to_uppercase(),
        start: args.start,
        end: args.end,
        preset: args.range,
        granularity: args.granularity,
        target_points: args.points,
        recovery: if args.no_estimate {
            RecoveryFallback::Zero
        } else {
            RecoveryFallback::default()
        },
        timeline_file: args.timeline_file.clone(),
        population: args.population,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_json: args.export.clone(),
        export_csv: args.export_csv.clone(),
    }
}

/// Rewrite argv so `covid-dash` defaults to `covid-dash tui`.
///
/// Rules:
/// - `covid-dash`                      -> `covid-dash tui`
/// - `covid-dash -c DEU ...`           -> `covid-dash tui -c DEU ...`
/// - `covid-dash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "countries" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_and_flags_default_to_tui() {
        assert_eq!(rewrite_args(argv(&["covid-dash"])), argv(&["covid-dash", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["covid-dash", "-c", "DEU"])),
            argv(&["covid-dash", "tui", "-c", "DEU"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for args in [
            &["covid-dash", "show", "-c", "IND"][..],
            &["covid-dash", "countries"][..],
            &["covid-dash", "--help"][..],
            &["covid-dash", "-V"][..],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn config_from_args_normalizes_country_and_recovery() {
        let cli = crate::cli::Cli::parse_from(["covid-dash", "show", "-c", " deu ", "--no-estimate"]);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        let config = dashboard_config_from_args(&args);
        assert_eq!(config.country, "DEU");
        assert_eq!(config.recovery, RecoveryFallback::Zero);
        assert_eq!(config.target_points.get(), 10);
    }
}
