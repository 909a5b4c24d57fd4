//! Reporting utilities: number formatting and plain-text dashboard output.

pub mod format;

pub use format::*;
