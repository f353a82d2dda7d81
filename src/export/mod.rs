//! Record sinks: CSV and JSON files.

pub mod csv;
pub mod json;
