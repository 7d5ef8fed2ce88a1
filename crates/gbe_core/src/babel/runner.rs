//! Blocking subprocess invocation of the external tool.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

/// Errors from launching or running the external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The process could not be launched at all.
    #[error("Failed to run {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The process ran but exited with a nonzero code.
    #[error("{tool} exited with code {exit_code}: {message}")]
    Failed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The process produced output we could not make sense of.
    #[error("Failed to parse {tool} output: {message}")]
    UnexpectedOutput { tool: String, message: String },
}

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Captured result of one tool run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Process exit code (-1 if terminated by signal).
    pub exit_code: i32,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl RunOutput {
    /// True if the process exited with code zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Seam for invoking the external conversion tool.
///
/// The conversion worker and format discovery only see this trait, so tests
/// substitute a fake that never spawns a process.
pub trait ToolRunner: Send + Sync {
    /// Run the tool with the given arguments and block until it exits.
    fn run(&self, args: &[OsString]) -> ToolResult<RunOutput>;
}

/// The real `gpsbabel` binary.
#[derive(Debug, Clone)]
pub struct GpsBabel {
    path: PathBuf,
}

impl GpsBabel {
    /// Create a runner for the executable at `path`.
    ///
    /// A bare name like `"gpsbabel"` is resolved through `PATH` when
    /// launched.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the executable this runner launches.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Run `-V` and normalize the version banner for display.
    pub fn version(&self) -> ToolResult<String> {
        let output = self.run(&["-V".into()])?;
        if !output.success() {
            return Err(ToolError::Failed {
                tool: self.tool_name(),
                exit_code: output.exit_code,
                message: output.stderr.trim().to_string(),
            });
        }
        // "GPSBabel Version 1.9.0" -> "GPSBabel 1.9.0"
        Ok(output.stdout.trim().replace(" Version ", " "))
    }

    fn tool_name(&self) -> String {
        self.path.display().to_string()
    }
}

impl ToolRunner for GpsBabel {
    fn run(&self, args: &[OsString]) -> ToolResult<RunOutput> {
        tracing::debug!("Running {} {:?}", self.path.display(), args);

        let output = Command::new(&self.path)
            .args(args)
            .output()
            .map_err(|e| ToolError::Launch {
                tool: self.tool_name(),
                source: e,
            })?;

        Ok(RunOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_failure_on_missing_binary() {
        let babel = GpsBabel::new("/nonexistent/gpsbabel");
        let result = babel.run(&["-V".into()]);
        assert!(matches!(result, Err(ToolError::Launch { .. })));
    }

    #[test]
    fn tool_error_displays_context() {
        let err = ToolError::Failed {
            tool: "gpsbabel".to_string(),
            exit_code: 1,
            message: "Unknown file format".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("gpsbabel"));
        assert!(msg.contains("code 1"));
        assert!(msg.contains("Unknown file format"));
    }
}
