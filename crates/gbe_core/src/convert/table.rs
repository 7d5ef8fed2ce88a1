//! Shared progress model for the results table.
//!
//! Rows are appended in submission order and later mutated in place by the
//! worker. State transitions are monotonic and single-write: a row is marked
//! processing at most once and resolved exactly once. Violating that is a
//! programming error, so the setters panic rather than return an error.

use parking_lot::Mutex;

/// Lifecycle of one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowState {
    /// Queued, not yet picked up by the worker.
    Pending,
    /// The worker is currently converting this file.
    Processing,
    /// Conversion finished; message names the output file.
    Succeeded(String),
    /// Conversion failed; message explains why.
    Failed(String),
}

impl RowState {
    /// True once the row has reached a terminal state.
    pub fn is_resolved(&self) -> bool {
        matches!(self, RowState::Succeeded(_) | RowState::Failed(_))
    }
}

/// Snapshot of one row for display.
#[derive(Debug, Clone)]
pub struct ProgressRow {
    /// Source file name.
    pub label: String,
    /// Current state.
    pub state: RowState,
}

/// Handle to a row, valid for the lifetime of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowId(usize);

/// Table of per-file conversion outcomes, shared between the UI thread and
/// the worker.
#[derive(Debug, Default)]
pub struct ProgressTable {
    rows: Mutex<Vec<ProgressRow>>,
}

impl ProgressTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pending row and return its handle.
    pub fn push(&self, label: impl Into<String>) -> RowId {
        let mut rows = self.rows.lock();
        rows.push(ProgressRow {
            label: label.into(),
            state: RowState::Pending,
        });
        RowId(rows.len() - 1)
    }

    /// Mark a row as being worked on.
    ///
    /// # Panics
    /// If the row is not pending.
    pub fn set_processing(&self, id: RowId) {
        let mut rows = self.rows.lock();
        let row = &mut rows[id.0];
        assert!(
            row.state == RowState::Pending,
            "row {} marked processing twice",
            id.0
        );
        row.state = RowState::Processing;
    }

    /// Resolve a row as succeeded.
    ///
    /// # Panics
    /// If the row was already resolved.
    pub fn resolve_success(&self, id: RowId, message: impl Into<String>) {
        self.resolve(id, RowState::Succeeded(message.into()));
    }

    /// Resolve a row as failed.
    ///
    /// # Panics
    /// If the row was already resolved.
    pub fn resolve_failure(&self, id: RowId, message: impl Into<String>) {
        self.resolve(id, RowState::Failed(message.into()));
    }

    fn resolve(&self, id: RowId, state: RowState) {
        let mut rows = self.rows.lock();
        let row = &mut rows[id.0];
        assert!(!row.state.is_resolved(), "row {} resolved twice", id.0);
        row.state = state;
    }

    /// Copy of all rows, in submission order.
    pub fn snapshot(&self) -> Vec<ProgressRow> {
        self.rows.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_appear_in_submission_order() {
        let table = ProgressTable::new();
        table.push("a.kml");
        table.push("b.kml");

        let rows = table.snapshot();
        assert_eq!(rows[0].label, "a.kml");
        assert_eq!(rows[1].label, "b.kml");
        assert_eq!(rows[0].state, RowState::Pending);
    }

    #[test]
    fn full_lifecycle() {
        let table = ProgressTable::new();
        let id = table.push("a.kml");
        table.set_processing(id);
        assert_eq!(table.snapshot()[0].state, RowState::Processing);
        table.resolve_success(id, "\u{2192} a.gpx");
        assert_eq!(
            table.snapshot()[0].state,
            RowState::Succeeded("\u{2192} a.gpx".to_string())
        );
    }

    #[test]
    fn failure_straight_from_pending() {
        // Preflight failures resolve without ever entering processing.
        let table = ProgressTable::new();
        let id = table.push("a.kml");
        table.resolve_failure(id, "Target file already exists");
        assert!(table.snapshot()[0].state.is_resolved());
    }

    #[test]
    #[should_panic(expected = "resolved twice")]
    fn double_resolution_panics() {
        let table = ProgressTable::new();
        let id = table.push("a.kml");
        table.resolve_success(id, "ok");
        table.resolve_failure(id, "no");
    }

    #[test]
    #[should_panic(expected = "processing twice")]
    fn double_processing_panics() {
        let table = ProgressTable::new();
        let id = table.push("a.kml");
        table.set_processing(id);
        table.set_processing(id);
    }
}
