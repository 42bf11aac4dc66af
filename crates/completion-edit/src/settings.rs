//! Engine settings, loaded from TOML.
//!
//! ```toml
//! [match]
//! unifying_chars = "-_"
//!
//! [completion]
//! replace_prefix_threshold = 3
//! replace_suffix_threshold = 2
//!
//! [indent]
//! expand_tab = true
//! tab_size = 4
//! ```
//!
//! Every section and field is optional; unknown fields are ignored.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading [`EditSettings`].
pub enum SettingsError {
    #[error("I/O error: {0}")]
    /// Reading the settings file failed.
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    /// The settings file is not valid TOML for [`EditSettings`].
    Toml(#[from] toml::de::Error),
}

/// How words are recognised.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Non-alphanumeric characters that still count as part of a word.
    pub unifying_chars: String,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            unifying_chars: "-_".to_string(),
        }
    }
}

impl MatchOptions {
    /// Returns `true` if `c` belongs to a word.
    pub fn is_word_char(&self, c: char) -> bool {
        c.is_alphanumeric() || self.unifying_chars.contains(c)
    }
}

/// How much of the surrounding text a plain insertion may replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompleteOptions {
    /// Minimum overlap (chars) between the text before the cursor and the start of the
    /// insertion before that overlap is replaced.
    pub replace_prefix_threshold: usize,
    /// Minimum overlap (chars) between the text after the cursor and the end of the
    /// insertion before that overlap is replaced.
    pub replace_suffix_threshold: usize,
}

impl Default for CompleteOptions {
    fn default() -> Self {
        Self {
            replace_prefix_threshold: 3,
            replace_suffix_threshold: 2,
        }
    }
}

/// Buffer indentation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IndentOptions {
    /// Indent with spaces instead of tabs.
    pub expand_tab: bool,
    /// Width of a tab stop.
    pub tab_size: usize,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            expand_tab: true,
            tab_size: 4,
        }
    }
}

/// All settings consumed by an [`EditTransaction`](crate::EditTransaction).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct EditSettings {
    /// Word recognition.
    #[serde(rename = "match")]
    pub match_options: MatchOptions,
    /// Prefix/suffix replacement thresholds.
    pub completion: CompleteOptions,
    /// Indentation policy.
    pub indent: IndentOptions,
}

impl EditSettings {
    /// Parse settings from a TOML string.
    pub fn from_toml_str(raw: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(target: "edit.settings", path = %path.display(), "settings_file_missing");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}
