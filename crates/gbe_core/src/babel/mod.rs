//! Interaction with the external `gpsbabel` command-line tool.
//!
//! All actual format conversion work happens inside `gpsbabel`; this module
//! only launches it, captures its output, and scrapes the format listing
//! out of its help text.

mod formats;
mod runner;

pub use formats::{discover_formats, parse_format_listing, Format};
pub use runner::{GpsBabel, RunOutput, ToolError, ToolResult, ToolRunner};
