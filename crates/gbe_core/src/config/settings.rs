//! Settings struct with TOML-based sections.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How many recently used format codes to remember per side.
pub const MRU_LENGTH: usize = 3;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// External tool configuration.
    #[serde(default)]
    pub tool: ToolSettings,

    /// Recently used format codes.
    #[serde(default)]
    pub formats: FormatSettings,

    /// Output and move folders.
    #[serde(default)]
    pub folders: FolderSettings,

    /// What to do with source files after conversion.
    #[serde(default)]
    pub after: AfterSettings,
}

/// External tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Path or command name of the gpsbabel executable.
    #[serde(default = "default_gpsbabel_path")]
    pub gpsbabel_path: String,
}

fn default_gpsbabel_path() -> String {
    "gpsbabel".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            gpsbabel_path: default_gpsbabel_path(),
        }
    }
}

/// Recently used format codes, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatSettings {
    /// Recent input format codes.
    #[serde(default = "default_recent_formats")]
    pub recent_inputs: Vec<String>,

    /// Recent output format codes.
    #[serde(default = "default_recent_formats")]
    pub recent_outputs: Vec<String>,
}

// Both combos start out preselected on GPX.
fn default_recent_formats() -> Vec<String> {
    vec!["gpx".to_string()]
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            recent_inputs: default_recent_formats(),
            recent_outputs: default_recent_formats(),
        }
    }
}

/// Output and move folder choices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderSettings {
    /// Folder converted files are written to; `None` means next to the
    /// source file.
    #[serde(default)]
    pub output_override: Option<PathBuf>,

    /// Recently chosen output folders.
    #[serde(default)]
    pub recent_output_folders: Vec<PathBuf>,

    /// Folder sources are moved into when the after-action is `Move`.
    #[serde(default)]
    pub move_folder: Option<PathBuf>,

    /// Recently chosen move folders.
    #[serde(default)]
    pub recent_move_folders: Vec<PathBuf>,
}

/// What to do with the source file after a successful conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfterChoice {
    /// Leave the source where it is.
    #[default]
    Leave,
    /// Move the source to the OS trash.
    Trash,
    /// Move the source into the configured folder.
    Move,
}

/// After-conversion settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AfterSettings {
    /// Selected after-action.
    #[serde(default)]
    pub choice: AfterChoice,
}

/// Record `code` as the most recently used entry of an MRU list.
///
/// Duplicates are removed and the list is capped at [`MRU_LENGTH`].
pub fn push_recent(recent: &mut Vec<String>, code: &str) {
    recent.retain(|c| c != code);
    recent.insert(0, code.to_string());
    recent.truncate(MRU_LENGTH);
}

/// [`push_recent`] for folder lists.
pub fn push_recent_folder(recent: &mut Vec<PathBuf>, folder: &std::path::Path) {
    recent.retain(|f| f != folder);
    recent.insert(0, folder.to_path_buf());
    recent.truncate(MRU_LENGTH);
}
