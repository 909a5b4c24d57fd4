//! Plotters-powered cases/recovered/deaths line chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{ChartSeries, SliceKind};
use crate::report::format_number;

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call (see
/// [`DashboardChart::from_series`]).
pub struct DashboardChart<'a> {
    /// `(bucket index, count)` per metric.
    pub cases: Vec<(f64, f64)>,
    pub recovered: Vec<(f64, f64)>,
    pub deaths: Vec<(f64, f64)>,
    /// Bucket labels, indexed by x.
    pub labels: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> DashboardChart<'a> {
    pub fn from_series(series: &ChartSeries, labels: &'a [String]) -> Self {
        let pick = |f: fn(&crate::domain::ChartRow) -> u64| -> Vec<(f64, f64)> {
            series
                .rows
                .iter()
                .enumerate()
                .map(|(i, r)| (i as f64, f(r) as f64))
                .collect()
        };

        // A single bucket still needs a non-empty x range.
        let x_max = (series.rows.len().max(2) - 1) as f64;
        // Headroom so the top line doesn't sit on the frame.
        let y_max = (series.max_value().max(1) as f64) * 1.05;

        Self {
            cases: pick(|r| r.cases),
            recovered: pick(|r| r.recovered),
            deaths: pick(|r| r.deaths),
            labels,
            x_bounds: [0.0, x_max],
            y_bounds: [0.0, y_max],
        }
    }
}

/// Parse `#RRGGBB`.
pub fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Legend color for a slice as a Plotters color (white if the hex is malformed).
fn plotters_color(kind: SliceKind) -> RGBColor {
    let (r, g, b) = hex_rgb(kind.color()).unwrap_or((255, 255, 255));
    RGBColor(r, g, b)
}

impl<'a> Widget for DashboardChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            let label_at = |v: &f64| {
                let idx = v.round();
                if idx < 0.0 || (idx - v).abs() > 0.01 {
                    return String::new();
                }
                self.labels.get(idx as usize).cloned().unwrap_or_default()
            };

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(self.labels.len().clamp(2, 6))
                .y_labels(5)
                .x_label_formatter(&label_at)
                .y_label_formatter(&|v| format_number(v.max(0.0) as u64))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Same palette as the partition legend: cases share the "Active" color.
            for (points, kind) in [
                (&self.cases, SliceKind::Active),
                (&self.recovered, SliceKind::Recovered),
                (&self.deaths, SliceKind::Deaths),
            ] {
                let color = plotters_color(kind);
                chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
                // `Circle` markers render far too large on this backend; a pixel dot
                // marks each bucket instead.
                chart.draw_series(points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartRow, Granularity};
    use chrono::NaiveDate;

    #[test]
    fn hex_rgb_parses_legend_colors() {
        assert_eq!(hex_rgb("#FBEC85"), Some((0xFB, 0xEC, 0x85)));
        assert_eq!(hex_rgb("#4ade80"), Some((0x4A, 0xDE, 0x80)));
        assert_eq!(hex_rgb("FBEC85"), None);
        assert_eq!(hex_rgb("#FBEC8"), None);
        assert_eq!(hex_rgb("#GGGGGG"), None);
    }

    #[test]
    fn bounds_cover_all_series() {
        let series = ChartSeries {
            granularity: Granularity::Year,
            recovered_estimated: false,
            rows: vec![ChartRow {
                label: "2022".to_string(),
                bucket_start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
                cases: 100,
                deaths: 5,
                recovered: 200,
            }],
        };
        let labels = vec!["2022".to_string()];
        let chart = DashboardChart::from_series(&series, &labels);
        assert_eq!(chart.x_bounds, [0.0, 1.0]);
        assert_eq!(chart.y_bounds[0], 0.0);
        assert!((chart.y_bounds[1] - 210.0).abs() < 1e-9);
        assert_eq!(chart.recovered, vec![(0.0, 200.0)]);
    }
}
