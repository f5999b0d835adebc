//! Thyme CLI
//!
//! Loads YAML suites, runs them through the report shell and writes the
//! rendered page and JSON results.

pub mod commands;
pub mod output;
