//! Shell configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! gives the stock six-photo tree.

use std::fs;
use std::path::Path;

use memory_tree::LayoutParams;
use serde::Deserialize;

use crate::error::ShellError;

/// MIDI settings for the background jingle.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// General MIDI program, 0–127.
    pub instrument: u8,
    pub tempo_bpm:  u32,
    pub velocity:   u8,
    pub channel:    u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            instrument: 10, // music box
            tempo_bpm:  96,
            velocity:   80,
            channel:    0,
        }
    }
}

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Number of photo slots on the tree.
    pub slot_count:     usize,
    pub layout:         LayoutParams,
    pub window_width:   usize,
    pub window_height:  usize,
    /// Leaves and ornaments drawn around the photos.
    pub particle_count: usize,
    pub audio:          AudioConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            slot_count:     6,
            layout:         LayoutParams::default(),
            window_width:   960,
            window_height:  640,
            particle_count: 600,
            audio:          AudioConfig::default(),
        }
    }
}

impl ShellConfig {
    pub fn from_json(text: &str) -> Result<Self, ShellError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ShellError> {
        let text = fs::read_to_string(path).map_err(|source| ShellError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}
