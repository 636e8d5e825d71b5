//! Configuration loading and parsing.
//!
//! Reads `rline.toml` (or an override path provided by the binary). Every
//! section and key is optional; absent values take their defaults and unknown
//! keys are ignored (TOML deserialization tolerance) so files written for a
//! newer version still load. A file that fails to parse is logged at `warn`
//! and replaced by defaults.
//!
//! Raw values are kept as parsed; `Config::settings` derives the effective
//! `EditorSettings`, clamping out-of-range values and logging each clamp on
//! the `config` target.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "rline.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    pub word_separators: Vec<char>,
    /// Trailing marker that turns Enter into a line break. Empty disables it.
    pub continuation_marker: String,
    pub default_value: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            word_separators: vec![' '],
            continuation_marker: "\\".to_string(),
            default_value: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    /// 0 keeps every entry.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CompletionConfig {
    pub max_columns: usize,
    pub max_rows: usize,
    pub margin: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_columns: 5,
            max_rows: 5,
            margin: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PasswordConfig {
    /// Echoed in place of each typed char. Empty echoes nothing.
    pub mask: String,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            mask: "*".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // raw file contents, when loaded from disk
    pub file: ConfigFile,    // parsed (or default) data
    pub source: Option<PathBuf>,
}

/// Effective settings consumed by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSettings {
    pub word_separators: Vec<char>,
    pub continuation_marker: Option<String>,
    pub default_value: String,
    pub history_enabled: bool,
    pub history_max_entries: usize,
    pub completion_max_columns: usize,
    pub completion_max_rows: usize,
    pub completion_margin: usize,
    pub password_mask: Option<char>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Config::default().settings()
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("rline").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_not_found_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                source: Some(path),
            })
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Derive effective settings. Zero column/row limits are raised to 1 and a
    /// multi-char password mask keeps its first char.
    pub fn settings(&self) -> EditorSettings {
        let f = &self.file;
        let max_columns = clamp_min_one("completion.max_columns", f.completion.max_columns);
        let max_rows = clamp_min_one("completion.max_rows", f.completion.max_rows);

        let mut mask_chars = f.password.mask.chars();
        let password_mask = mask_chars.next();
        if mask_chars.next().is_some() {
            info!(
                target: "config",
                mask_len = f.password.mask.chars().count(),
                "password_mask_truncated"
            );
        }

        let continuation_marker = if f.editor.continuation_marker.is_empty() {
            None
        } else {
            Some(f.editor.continuation_marker.clone())
        };

        EditorSettings {
            word_separators: f.editor.word_separators.clone(),
            continuation_marker,
            default_value: f.editor.default_value.clone(),
            history_enabled: f.history.enabled,
            history_max_entries: f.history.max_entries,
            completion_max_columns: max_columns,
            completion_max_rows: max_rows,
            completion_margin: f.completion.margin,
            password_mask,
        }
    }
}

fn clamp_min_one(key: &'static str, raw: usize) -> usize {
    if raw == 0 {
        info!(target: "config", key, raw, clamped = 1usize, "setting_clamped");
        1
    } else {
        raw
    }
}
