//! Settings loaded from TOML
//!
//! Looked up from `--config`, then `$TETRIS_CONFIG`, then
//! `~/.config/tetris/settings.toml` (or the platform equivalent).

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::grid::{DEFAULT_COLS, DEFAULT_ROWS};
use crate::timer::DEFAULT_TICK_MS;

pub const CONFIG_ENV: &str = "TETRIS_CONFIG";

const MIN_ROWS: usize = 4;
/// Widest template (I) plus one, since spawning starts at `cols / 2 - 1`.
const MIN_COLS: usize = 5;
const MAX_DIMENSION: usize = 255;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gameplay: GameplaySettings,
    pub keys: KeyBindings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    pub rows: usize,
    pub cols: usize,
    /// Gravity interval in milliseconds
    pub tick_ms: u64,
    /// Fixed seed for a reproducible piece sequence
    pub seed: Option<u64>,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            tick_ms: DEFAULT_TICK_MS,
            seed: None,
        }
    }
}

/// Key names per action. Each entry accepts a single string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub rotate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub start: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub restart: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub quit: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: keys(&["Left"]),
            move_right: keys(&["Right"]),
            soft_drop: keys(&["Down"]),
            rotate: keys(&["Up"]),
            hard_drop: keys(&["Space"]),
            pause: keys(&["p"]),
            start: keys(&["Enter"]),
            restart: keys(&["r"]),
            quit: keys(&["q", "Esc"]),
        }
    }
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(key) => vec![key],
        OneOrMany::Many(keys) => keys,
    })
}

impl Settings {
    /// Default location under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "tetris", "tetris")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Picks the settings file: explicit path, then `$TETRIS_CONFIG`, then the default.
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(Self::default_path)
    }

    /// Loads from the resolved path. A missing file gives the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(explicit) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            result => result.with_context(|| format!("failed to read {}", path.display()))?,
        };
        Self::from_toml(&contents).with_context(|| format!("invalid settings in {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents).context("failed to parse TOML")?;
        Ok(settings.sanitized())
    }

    /// Clamps the board to 4..=255 rows and 5..=255 columns, and the tick to at least 1 ms.
    pub fn sanitized(mut self) -> Self {
        self.gameplay.rows = self.gameplay.rows.clamp(MIN_ROWS, MAX_DIMENSION);
        self.gameplay.cols = self.gameplay.cols.clamp(MIN_COLS, MAX_DIMENSION);
        self.gameplay.tick_ms = self.gameplay.tick_ms.max(1);
        self
    }
}
