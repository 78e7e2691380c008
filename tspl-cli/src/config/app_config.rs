//! Runtime configuration loaded from environment (and `.env`) plus an
//! optional JSON options file.

use std::path::Path;

use anyhow::{Context, bail};
use bin_img::DEFAULT_THRESHOLD;
use tspl::TsplOptions;

use super::validation::validate_setting;

const KEYS: &[&str] = &[
    "TSPL_PEEL",
    "TSPL_DOTS_PER_UNIT",
    "TSPL_THRESHOLD",
    "TSPL_ROTATE_PRINT",
    "TSPL_OPTIONS_FILE",
];

/// Runtime configuration for the command-line tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub options: TsplOptions,
    pub threshold: u8,
    pub rotate_print: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            options: TsplOptions::default(),
            threshold: DEFAULT_THRESHOLD,
            rotate_print: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through `get`, validating every value that is set.
    ///
    /// `TSPL_OPTIONS_FILE` is applied first; the individual variables
    /// override whatever it sets.
    pub fn load_from(get: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        for key in KEYS {
            if let Some(value) = get(key) {
                if let Err(msg) = validate_setting(key, &value) {
                    bail!("invalid {key}={value:?}: {msg}");
                }
            }
        }

        let mut config = Self::default();
        if let Some(path) = get("TSPL_OPTIONS_FILE") {
            config.options = read_options_file(Path::new(&path))?;
        }
        if let Some(v) = get("TSPL_PEEL") {
            config.options.peel = v == "true";
        }
        if let Some(v) = get("TSPL_DOTS_PER_UNIT") {
            config.options.dots_per_unit = v.parse()?;
        }
        if let Some(v) = get("TSPL_THRESHOLD") {
            config.threshold = v.parse()?;
        }
        if let Some(v) = get("TSPL_ROTATE_PRINT") {
            config.rotate_print = v == "true";
        }
        Ok(config)
    }
}

/// Read [`TsplOptions`] from a JSON file. Missing fields take their defaults.
pub fn read_options_file(path: &Path) -> Result<TsplOptions, anyhow::Error> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read options file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid options file {}", path.display()))
}
