//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Template documents used to shape exported drafts.
    pub templates: TemplatePaths,

    /// Export defaults.
    pub export: ExportDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Locations of the template documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatePaths {
    /// Skeletal draft document. Required for export.
    pub base: Option<PathBuf>,

    /// Document whose `materials.video_effects` hold effect definitions.
    pub effects: Option<PathBuf>,

    /// Document whose `materials.transitions` hold transition definitions.
    pub transitions: Option<PathBuf>,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// File name of the serialized draft inside a project folder.
    pub file_name: String,

    /// Separator style applied to media paths in the output.
    pub path_style: PathStyleSetting,

    /// Schema profile written into version fields.
    pub schema: SchemaTarget,

    /// Draft frame rate.
    pub fps: f64,

    /// Draft canvas size in pixels.
    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Default on-screen duration for new image clips (microseconds).
    pub image_duration_micros: i64,

    /// Default on-screen duration for new video clips (microseconds).
    pub video_duration_micros: i64,

    /// Also write `draft_meta_info.json` next to the content file.
    pub write_meta_info: bool,
}

/// Separator style for media paths as the consuming editor expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    Posix,
    Windows,
}

impl PathStyle {
    /// Style native to the host the export runs on.
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// Configured path style; `auto` defers to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PathStyleSetting {
    #[default]
    Auto,
    Posix,
    Windows,
}

impl PathStyleSetting {
    pub fn resolve(self) -> PathStyle {
        match self {
            Self::Auto => PathStyle::host(),
            Self::Posix => PathStyle::Posix,
            Self::Windows => PathStyle::Windows,
        }
    }
}

/// Draft schema generation to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaTarget {
    #[default]
    Modern,
    Legacy,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "draftforge=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

/// One second in draft time units.
pub const MICROS_PER_SEC: i64 = 1_000_000;

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            file_name: "draft_content.json".to_string(),
            path_style: PathStyleSetting::Auto,
            schema: SchemaTarget::Modern,
            fps: 30.0,
            canvas_width: 1920,
            canvas_height: 1080,
            image_duration_micros: 3 * MICROS_PER_SEC,
            video_duration_micros: 5 * MICROS_PER_SEC,
            write_meta_info: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("draftforge").join("config.json")
}
