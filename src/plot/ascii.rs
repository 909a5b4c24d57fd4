//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements (x = bucket index, y = count from 0):
//! - cases: `c` line, `C` at each bucket
//! - recovered: `r` line, `R` at each bucket
//! - deaths: `d` line, `D` at each bucket

use crate::domain::{ChartRow, ChartSeries};

struct Track {
    line: char,
    marker: char,
    value: fn(&ChartRow) -> u64,
}

const TRACKS: [Track; 3] = [
    Track {
        line: 'c',
        marker: 'C',
        value: |r| r.cases,
    },
    Track {
        line: 'r',
        marker: 'R',
        value: |r| r.recovered,
    },
    Track {
        line: 'd',
        marker: 'D',
        value: |r| r.deaths,
    },
];

/// Render the chart series as a character grid with a one-line header.
pub fn render_chart_plot(series: &ChartSeries, width: usize, height: usize) -> String {
    let (Some(first), Some(last)) = (series.rows.first(), series.rows.last()) else {
        return "No data available for the selected period.\n".to_string();
    };

    let width = width.max(10);
    let height = height.max(5);

    let x_max = (series.rows.len().max(2) - 1) as f64;
    let y_max = series.max_value().max(1) as f64;

    let mut grid = vec![vec![' '; width]; height];

    // Lines first (so markers can overlay); earlier tracks win shared cells.
    for track in &TRACKS {
        let mut prev = None;
        for (i, row) in series.rows.iter().enumerate() {
            let x = map_x(i as f64, x_max, width);
            let y = map_y((track.value)(row) as f64, y_max, height);
            match prev {
                Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, y, track.line),
                None => draw_line(&mut grid, x, y, x, y, track.line),
            }
            prev = Some((x, y));
        }
    }

    // Markers in reverse so cases end up on top.
    for track in TRACKS.iter().rev() {
        for (i, row) in series.rows.iter().enumerate() {
            let x = map_x(i as f64, x_max, width);
            let y = map_y((track.value)(row) as f64, y_max, height);
            grid[y][x] = track.marker;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: buckets=[{}, {}] | y=[0, {}]\n",
        first.label, last.label, y_max as u64
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = (y / y_max).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
