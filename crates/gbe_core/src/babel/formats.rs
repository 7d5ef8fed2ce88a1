//! Format discovery by scraping the tool's help text.
//!
//! `gpsbabel -h` prints a file-type table after a header line naming the
//! `-i` and `-o` options. Format entries are indented by exactly one tab;
//! deeper-indented lines describe per-format options and are skipped. The
//! table ends at the first blank line.

use std::collections::HashSet;

use super::runner::{ToolError, ToolResult, ToolRunner};

/// A file format the external tool can read or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    /// Short code passed on the tool command line (also used as the output
    /// file extension).
    pub code: String,
    /// Human-readable label for display.
    pub label: String,
}

/// Run `-h` and parse the supported-format listing.
///
/// An unlaunchable tool, nonzero exit, or empty listing all mean the
/// application has nothing to offer the user; callers treat the error as
/// fatal.
pub fn discover_formats(runner: &dyn ToolRunner) -> ToolResult<Vec<Format>> {
    let output = runner.run(&["-h".into()])?;
    if !output.success() {
        return Err(ToolError::Failed {
            tool: "gpsbabel".to_string(),
            exit_code: output.exit_code,
            message: output.stderr.trim().to_string(),
        });
    }

    let formats = parse_format_listing(&output.stdout);
    if formats.is_empty() {
        return Err(ToolError::UnexpectedOutput {
            tool: "gpsbabel".to_string(),
            message: "no file formats found in help output".to_string(),
        });
    }

    tracing::info!("Discovered {} file formats", formats.len());
    Ok(formats)
}

/// Parse the file-type table out of help text.
///
/// Returns formats sorted by label and deduplicated by code.
pub fn parse_format_listing(help: &str) -> Vec<Format> {
    let mut formats: Vec<Format> = Vec::new();
    let mut in_listing = false;

    for raw in help.lines() {
        let line = raw.trim_end();

        if !in_listing {
            // Header: a line mentioning -i then -o, terminated by a colon.
            let flags_in_order = line
                .find("-i")
                .is_some_and(|pos| line[pos + 2..].contains("-o"));
            if line.ends_with(':') && flags_in_order {
                in_listing = true;
            }
            continue;
        }

        if line.trim().is_empty() {
            break;
        }

        // Exactly one tab of indentation marks a format line.
        let Some(rest) = line.strip_prefix('\t') else {
            continue;
        };
        if rest.starts_with(|c: char| c.is_whitespace()) {
            continue;
        }

        let mut parts = rest.splitn(2, |c: char| c.is_whitespace());
        let (Some(code), Some(label)) = (parts.next(), parts.next()) else {
            continue;
        };
        let label = label.trim_start();
        if label.is_empty() {
            continue;
        }

        formats.push(Format {
            code: code.to_string(),
            label: label.to_string(),
        });
    }

    formats.sort_by(|a, b| a.label.cmp(&b.label));
    let mut seen = HashSet::new();
    formats.retain(|f| seen.insert(f.code.clone()));
    formats
}
