//! Terminal plotting (text output for the `show` command).

pub mod ascii;

pub use ascii::render_chart_plot;
