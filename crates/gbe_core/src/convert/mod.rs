//! Conversion pipeline: requests, progress table, FIFO queue with a single
//! worker thread, and post-conversion handling of the source file.

mod after;
mod queue;
mod table;
mod types;

pub use after::{move_to_folder, run_after_action};
pub use queue::{destination_path, ConversionQueue};
pub use table::{ProgressRow, ProgressTable, RowId, RowState};
pub use types::{AfterAction, ConversionRequest};
