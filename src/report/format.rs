//! Number formatting and text reports for terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (important for snapshot-style tests)

use crate::app::pipeline::DashboardView;
use crate::domain::{ChartSeries, CountryMeta, PopulationPartition, Sample, Statistics};
use crate::stats::is_increase;

/// Compact count: `999`, `1.5K`, `2.5M`, `1.4B`.
pub fn format_number(n: u64) -> String {
    scale(n, 1)
}

/// Like `format_number`, but the billion tier keeps two decimals (`1.41B`).
pub fn format_population(n: u64) -> String {
    scale(n, 2)
}

fn scale(n: u64, billion_decimals: usize) -> String {
    let v = n as f64;
    if v < 1e3 {
        return n.to_string();
    }

    let tiers = [(1e3, "K", 1), (1e6, "M", 1), (1e9, "B", billion_decimals)];
    let mut tier = tiers.iter().rposition(|(div, _, _)| v >= *div).unwrap_or(0);
    loop {
        let (div, suffix, decimals) = tiers[tier];
        let text = format!("{:.*}", decimals, v / div);
        // 999_950 rounds to "1000.0"; report it on the next tier instead.
        if tier + 1 < tiers.len() && text.starts_with("1000") {
            tier += 1;
            continue;
        }
        return format!("{text}{suffix}");
    }
}

/// Thousands-separated count: `1,234,567`.
pub fn format_grouped(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Full text report: header, cards, chart table, partition.
pub fn format_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();

    out.push_str("=== COVID-19 and Population Dashboard ===\n");
    out.push_str(&format!("Country: {} ({})\n", view.country, view.code));
    if let Some(official) = &view.official_name {
        out.push_str(&format!("Official name: {official}\n"));
    }
    if let Some(population) = view.population {
        out.push_str(&format!(
            "Population: {} ({})\n",
            format_population(population),
            format_grouped(population)
        ));
    }
    out.push_str(&format!(
        "Range: {} .. {} | granularity: {}\n",
        view.interval.start(),
        view.interval.end(),
        view.chart.granularity.display_name(),
    ));
    out.push('\n');

    out.push_str(&format_statistics(&view.statistics));
    out.push('\n');
    out.push_str(&format_chart_table(&view.chart));
    out.push('\n');

    match &view.partition {
        Some(partition) => out.push_str(&format_partition(partition)),
        None => out.push_str("Population breakdown: no population data for this country.\n"),
    }

    out
}

/// Statistics cards as a small table.
pub fn format_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    let as_of = stats
        .as_of
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!("Latest data: {as_of}\n"));

    for (title, sample) in [
        ("Total Cases", &stats.cases),
        ("Recoveries", &stats.recovered),
        ("Deaths", &stats.deaths),
    ] {
        out.push_str(&format_card(title, sample));
        out.push('\n');
    }
    out
}

fn format_card(title: &str, sample: &Sample) -> String {
    let direction = if is_increase(&sample.percentage) { "▲" } else { "▼" };
    let note = if sample.estimated { " (estimated)" } else { "" };
    format!(
        "{:<12} {:>8} {direction} {:>10}{note}",
        title,
        format_number(sample.value),
        sample.percentage,
    )
}

/// Chart rows as a table (one row per retained bucket).
pub fn format_chart_table(series: &ChartSeries) -> String {
    let mut out = String::new();
    if series.is_empty() {
        out.push_str("No data available for the selected period.\n");
        return out;
    }

    let recovered_header = if series.recovered_estimated {
        "recovered*"
    } else {
        "recovered"
    };
    out.push_str(
        format!(
            "{:<12} {:>15} {:>15} {:>15}",
            "bucket", "cases", "deaths", recovered_header
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<15} {:-<15} {:-<15}", "", "", "", "").trim_end());
    out.push('\n');

    for row in &series.rows {
        out.push_str(&format!(
            "{:<12} {:>15} {:>15} {:>15}\n",
            row.label,
            format_grouped(row.cases),
            format_grouped(row.deaths),
            format_grouped(row.recovered),
        ));
    }

    if series.recovered_estimated {
        out.push_str("* recoveries estimated from cases (no reported data)\n");
    }
    out
}

/// Population partition with shares of the total.
pub fn format_partition(partition: &PopulationPartition) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Population breakdown ({} total):\n",
        format_population(partition.population)
    ));
    for slice in &partition.slices {
        out.push_str(&format!(
            "{:<12} {:>15} {:>7.2}%\n",
            slice.label,
            format_grouped(slice.value),
            partition.share(slice),
        ));
    }
    out
}

/// Country list for `covid-dash countries`.
pub fn format_country_list(countries: &[&CountryMeta]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<5} {:<40} {:>12}", "code", "name", "population").trim_end());
    out.push('\n');
    for c in countries {
        out.push_str(&format!(
            "{:<5} {:<40} {:>12}\n",
            c.code,
            truncate(&c.name, 40),
            format_population(c.population),
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
