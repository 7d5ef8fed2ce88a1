//! Persistent application settings.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    push_recent, push_recent_folder, AfterChoice, AfterSettings, FolderSettings,
    FormatSettings, Settings, ToolSettings, MRU_LENGTH,
};
