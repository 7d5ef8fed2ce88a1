//! Conversion request types.

use std::path::PathBuf;

/// What to do with the source file after a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AfterAction {
    /// Leave the source file where it is.
    Leave,
    /// Move the source file to the OS trash.
    Trash,
    /// Move the source file into the given folder.
    MoveTo(PathBuf),
}

/// One file to convert.
///
/// Built when the user drops files, immutable once enqueued, consumed
/// exactly once by the worker.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Source file to convert.
    pub source: PathBuf,
    /// Input format code passed to the tool with `-i`.
    pub input_format: String,
    /// Output format code passed with `-o`; also the output extension.
    pub output_format: String,
    /// What happens to the source after conversion.
    pub after_action: AfterAction,
    /// Destination folder; `None` means the source file's folder.
    pub output_folder: Option<PathBuf>,
}
