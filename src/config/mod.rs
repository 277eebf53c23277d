//! Configuration system for charm
//!
//! Loads settings from ~/.config/charm/config.toml

pub mod keymap;

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub use keymap::{UserCommand, UserCommands};

/// Main settings structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub editor: EditorSettings,
    pub colors: ColorSettings,
    /// User command table: name -> action
    pub commands: HashMap<String, String>,
}

/// Editor behavior settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Render width of a tab stop (default: 2)
    pub tab_stop: usize,
    /// Tab key inserts spaces (default: true)
    pub expand_tab: bool,
    /// New lines inherit indentation (default: true)
    pub auto_indent: bool,
    /// Auto-close brackets and quotes (default: false)
    pub auto_pairs: bool,
    /// Extra Ctrl-Q presses needed to quit with unsaved changes (default: 2)
    pub quit_times: usize,
    /// Show line numbers (default: true)
    pub line_numbers: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_stop: crate::editor::DEFAULT_TAB_STOP,
            expand_tab: true,
            auto_indent: true,
            auto_pairs: false,
            quit_times: 2,
            line_numbers: true,
        }
    }
}

/// 256-color palette indices
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub background: u8,
    pub normal: u8,
    pub comment: u8,
    pub keyword1: u8,
    pub keyword2: u8,
    pub string: u8,
    pub number: u8,
    pub function: u8,
    pub macro_color: u8,
    pub linenum: u8,
    pub linenum_bg: u8,
    pub status: u8,
    #[serde(rename = "match")]
    pub match_color: u8,
    pub visual: u8,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            background: 235,
            normal: 252,
            comment: 248,
            keyword1: 167,
            keyword2: 108,
            string: 136,
            number: 24,
            function: 34,
            macro_color: 173,
            linenum: 244,
            linenum_bg: 235,
            status: 238,
            match_color: 81,
            visual: 239,
        }
    }
}

/// Get the path to the config file
/// Always uses ~/.config/charm/config.toml (XDG-style) for consistency across platforms
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/charm/config.toml"))
}

/// Template config file with comments explaining all options
/// This is generated when no config file exists
fn default_config_template() -> &'static str {
    r#"# Charm Configuration
# Only add settings you want to change from the defaults.

# [editor]
# tab_stop = 2          # Render width of a tab
# expand_tab = true     # Tab key inserts spaces
# auto_indent = true    # New lines keep the indentation of the line above
# auto_pairs = false    # Auto-close brackets and quotes
# quit_times = 2        # Extra Ctrl-Q presses to quit with unsaved changes
# line_numbers = true

# 256-color palette indices
# [colors]
# background = 235
# normal = 252
# comment = 248
# keyword1 = 167
# keyword2 = 108
# string = 136
# number = 24
# function = 34
# macro_color = 173
# linenum = 244
# linenum_bg = 235
# status = 238
# match = 81
# visual = 239

# User commands, run with :Name
# A value starting with ':' is a command line, anything else is replayed as keys.
# [commands]
# Save = ":w"
# Top = "g0"
# Stamp = "o// reviewed<Esc>"
"#
}

/// Create the config file with the commented template if it doesn't exist
fn ensure_config_exists(path: &Path) {
    if path.exists() {
        return;
    }
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), error = %e, "could not create config directory");
            return;
        }
    }
    if let Err(e) = std::fs::write(path, default_config_template()) {
        tracing::warn!(path = %path.display(), error = %e, "could not write config template");
    }
}

/// Parse settings from a specific file
pub fn try_load_config(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    toml::from_str::<Settings>(&content).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings from the config file
/// Returns default settings if the file doesn't exist or can't be parsed
pub fn load_config() -> Settings {
    let Some(path) = config_path() else {
        return Settings::default();
    };

    // Ensure config file exists (creates template if not)
    ensure_config_exists(&path);

    match try_load_config(&path) {
        Ok(settings) => {
            tracing::debug!(path = %path.display(), commands = settings.commands.len(), "config loaded");
            settings
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            Settings::default()
        }
    }
}
