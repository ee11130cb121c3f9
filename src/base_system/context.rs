//! Runtime configuration and shared path helpers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::{ConfigSchema, FieldHelp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory all works are saved under.
    pub save_path: String,
    /// JPEG quality used when normalizing pages for the PDF (1-100).
    pub jpeg_quality: u8,
    /// Maximum number of search results shown when picking a work.
    pub search_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: "mangas".to_string(),
            jpeg_quality: 85,
            search_limit: 10,
        }
    }
}

impl Config {
    pub fn default_save_dir(&self) -> PathBuf {
        PathBuf::from(&self.save_path)
    }
}

impl ConfigSchema for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldHelp] {
        &[
            FieldHelp {
                name: "save_path",
                help: "Directory downloads are saved under (one folder per work)",
            },
            FieldHelp {
                name: "jpeg_quality",
                help: "JPEG quality for PDF page images, 1-100",
            },
            FieldHelp {
                name: "search_limit",
                help: "Maximum number of catalog search results to list",
            },
        ]
    }
}

/// Replace characters that are unsafe in file names and cap the length.
///
/// Keeps the result readable rather than hashing: forbidden characters and
/// whitespace collapse to the replacement string.
pub fn safe_fs_name(name: &str, replacement: &str, max_len: usize) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut last_was_replacement = false;
    for ch in name.trim().chars() {
        let forbidden = matches!(ch, ':' | '"' | '<' | '>' | '/' | '\\' | '|' | '?' | '*')
            || ch.is_whitespace()
            || ch.is_control();
        if forbidden {
            if !last_was_replacement {
                cleaned.push_str(replacement);
                last_was_replacement = true;
            }
        } else {
            cleaned.push(ch);
            last_was_replacement = false;
        }
    }
    let mut trimmed: String = cleaned.chars().take(max_len).collect();
    while !replacement.is_empty() && trimmed.ends_with(replacement) {
        trimmed.truncate(trimmed.len() - replacement.len());
    }
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed
    }
}
