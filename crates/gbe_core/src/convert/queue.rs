//! FIFO conversion queue with a single background worker.
//!
//! Batches of requests go in; the worker drains them strictly in arrival
//! order, one external-tool invocation at a time. At most one worker thread
//! is alive: a batch submitted while the worker runs is appended to the live
//! queue. A close-lock counter is held while work is outstanding so the UI
//! can refuse to exit.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::babel::ToolRunner;

use super::after::run_after_action;
use super::table::{ProgressTable, RowId};
use super::types::ConversionRequest;

struct QueueState {
    pending: VecDeque<(RowId, ConversionRequest)>,
    worker_running: bool,
    close_locks: u32,
}

struct QueueInner {
    state: Mutex<QueueState>,
    runner: Arc<dyn ToolRunner>,
    table: Arc<ProgressTable>,
}

/// Handle for submitting conversion work.
pub struct ConversionQueue {
    inner: Arc<QueueInner>,
}

impl ConversionQueue {
    /// Create a queue that invokes the tool through `runner` and reports
    /// into `table`.
    pub fn new(runner: Arc<dyn ToolRunner>, table: Arc<ProgressTable>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    worker_running: false,
                    close_locks: 0,
                }),
                runner,
                table,
            }),
        }
    }

    /// The table this queue reports into.
    pub fn table(&self) -> Arc<ProgressTable> {
        Arc::clone(&self.inner.table)
    }

    /// Enqueue a batch of requests.
    ///
    /// A row is appended for every request before any conversion starts. If
    /// no worker is running one is spawned; otherwise the running worker
    /// picks the batch up after the items already queued.
    pub fn submit(&self, requests: Vec<ConversionRequest>) {
        if requests.is_empty() {
            return;
        }

        let mut batch = Vec::with_capacity(requests.len());
        for request in requests {
            let label = request
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| request.source.display().to_string());
            let row = self.inner.table.push(label);
            batch.push((row, request));
        }

        let spawn_worker = {
            let mut state = self.inner.state.lock();
            state.pending.extend(batch);
            if state.worker_running {
                false
            } else {
                state.worker_running = true;
                state.close_locks += 1;
                true
            }
        };

        if spawn_worker {
            let inner = Arc::clone(&self.inner);
            thread::spawn(move || worker_loop(inner));
        }
    }

    /// True while conversions are queued or running; the application must
    /// not exit while this holds.
    pub fn is_busy(&self) -> bool {
        self.inner.state.lock().close_locks > 0
    }
}

fn worker_loop(inner: Arc<QueueInner>) {
    loop {
        let (row, request) = {
            let mut state = inner.state.lock();
            match state.pending.pop_front() {
                Some(item) => item,
                None => {
                    state.worker_running = false;
                    state.close_locks -= 1;
                    return;
                }
            }
        };

        inner.table.set_processing(row);
        match process_request(&*inner.runner, &request) {
            Ok(message) => inner.table.resolve_success(row, message),
            Err(message) => {
                tracing::warn!("Conversion of {} failed: {}", request.source.display(), message);
                inner.table.resolve_failure(row, message);
            }
        }
    }
}

/// Run one conversion end to end: preflight, tool invocation, after-action.
///
/// Returns the success message for the row, or the failure message. A
/// failure here never stops the queue.
fn process_request(runner: &dyn ToolRunner, request: &ConversionRequest) -> Result<String, String> {
    let target = destination_path(
        &request.source,
        request.output_folder.as_deref(),
        &request.output_format,
    );

    // Preflight; none of these invoke the tool.
    if is_same_file(&request.source, &target).map_err(|e| format!("Error: {}", e))? {
        return Err("Target file would have same name as source".to_string());
    }
    if target.exists() {
        return Err("Target file already exists".to_string());
    }
    let target_dir = target.parent().unwrap_or(Path::new("."));
    if !dir_writable(target_dir) {
        return Err("Target file not writable".to_string());
    }

    let args: Vec<OsString> = vec![
        "-r".into(),
        "-t".into(),
        "-i".into(),
        request.input_format.clone().into(),
        "-f".into(),
        request.source.clone().into_os_string(),
        "-o".into(),
        request.output_format.clone().into(),
        "-F".into(),
        target.clone().into_os_string(),
    ];

    let output = runner.run(&args).map_err(|e| format!("Error: {}", e))?;
    if !output.stdout.is_empty() {
        tracing::debug!("gpsbabel stdout: {}", output.stdout.trim_end());
    }
    if !output.stderr.is_empty() {
        tracing::debug!("gpsbabel stderr: {}", output.stderr.trim_end());
    }
    if !output.success() {
        let detail = if output.stderr.trim().is_empty() {
            output.stdout.trim()
        } else {
            output.stderr.trim()
        };
        return Err(format!(
            "gpsbabel failed (exit code {}): {}",
            output.exit_code, detail
        ));
    }

    run_after_action(&request.source, &request.after_action)
        .map_err(|e| format!("Error: {}", e))?;

    let target_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.display().to_string());
    Ok(format!("\u{2192} {}", target_name))
}

/// Destination path: source file stem + "." + output format code, in the
/// source's folder or the override folder.
pub fn destination_path(source: &Path, folder: Option<&Path>, output_format: &str) -> PathBuf {
    let dir = folder
        .map(Path::to_path_buf)
        .unwrap_or_else(|| source.parent().unwrap_or(Path::new(".")).to_path_buf());

    let mut name = source.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(output_format);
    dir.join(name)
}

/// Compare canonical paths. A target that does not exist cannot collide.
fn is_same_file(source: &Path, target: &Path) -> std::io::Result<bool> {
    if !target.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(source)? == fs::canonicalize(target)?)
}

fn dir_writable(dir: &Path) -> bool {
    fs::metadata(dir)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}
