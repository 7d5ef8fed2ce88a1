//! Core library for GPSBabel Easy Converter.
//!
//! Backend logic with no UI dependencies:
//! - `babel` - running the external `gpsbabel` binary and discovering its
//!   supported formats
//! - `convert` - the conversion queue, worker, progress table, and
//!   post-conversion file handling
//! - `config` - persisted settings with most-recently-used bookkeeping
//! - `logging` - tracing setup

pub mod babel;
pub mod config;
pub mod convert;
pub mod logging;

/// Library version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
