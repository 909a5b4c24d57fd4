//! `covid-dash` library crate.
//!
//! The binary (`covid-dash`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the timeline/statistics pipeline is shared by the text report and the TUI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod stats;
pub mod timeline;
pub mod tui;
