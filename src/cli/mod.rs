//! CLI command handlers

pub mod commands;

pub use commands::{output_path_for, process, ProcessReport, OUTPUT_PREFIX};
