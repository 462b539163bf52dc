//! Terminal settings loaded from `config.toml`.
//!
//! ```toml
//! cols = 120
//! rows = 40
//! foreground = "#C5C8C6"
//! background = "1D1F21"
//! scrollback-lines = 5000
//! ```

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Deserializer};
use tether_vt::{Rgb, DEFAULT_SCROLLBACK};

use crate::error::ConfigError;
use crate::style::DefaultColors;

const CONFIG_DIR: &str = "tether";
const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TerminalConfig {
    pub cols: u16,
    pub rows: u16,
    #[serde(rename = "foreground", deserialize_with = "deserialize_color")]
    pub default_fg: Rgb,
    #[serde(rename = "background", deserialize_with = "deserialize_color")]
    pub default_bg: Rgb,
    pub scrollback_lines: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        let colors = DefaultColors::default();
        Self {
            cols: 80,
            rows: 24,
            default_fg: colors.fg,
            default_bg: colors.bg,
            scrollback_lines: DEFAULT_SCROLLBACK,
        }
    }
}

impl TerminalConfig {
    pub fn default_colors(&self) -> DefaultColors {
        DefaultColors {
            fg: self.default_fg,
            bg: self.default_bg,
        }
    }
}

/// Parse `#RRGGBB` or `RRGGBB`.
pub fn parse_color(value: &str) -> Option<Rgb> {
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb::new(r, g, b))
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Rgb, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_color(&value).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid color {value:?}, expected #RRGGBB"))
    })
}

pub fn parse_config(contents: &str) -> Result<TerminalConfig, ConfigError> {
    Ok(toml::from_str(contents)?)
}

pub fn load_config_from_path(path: &Path) -> Result<TerminalConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Candidate config paths in search order.
fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        paths.push(PathBuf::from(xdg).join(CONFIG_DIR).join(CONFIG_FILE));
    }
    if let Some(dir) = dirs::config_dir() {
        let path = dir.join(CONFIG_DIR).join(CONFIG_FILE);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

/// Load the first config file found in the standard locations.
pub fn load_config() -> Result<TerminalConfig, ConfigError> {
    match config_paths().into_iter().find(|path| path.is_file()) {
        Some(path) => load_config_from_path(&path),
        None => Err(ConfigError::NotFound),
    }
}
