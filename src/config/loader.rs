//! Configuration loading from file system
//!
//! The settings file is plain JSON (`~/.gofaster/config.json` by default).
//! A missing or broken file never stops the palette: defaults are used and
//! the reason is logged.

use std::fs;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::error::{PaletteError, Result};

use super::types::PaletteConfig;

/// Parse a settings object. Unknown keys are ignored, missing keys default.
pub fn parse_config(json: &str) -> Result<PaletteConfig> {
    let config: PaletteConfig = serde_json::from_str(json.trim()).map_err(|e| {
        let hint = if e.is_syntax() || e.is_eof() {
            "settings must be a single JSON object"
        } else {
            "check field names and value types"
        };
        PaletteError::Config(format!("{} ({})", e, hint))
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &PaletteConfig) -> Result<()> {
    if config.search.max_tabs == 0 {
        return Err(PaletteError::Config(
            "search.maxTabs must be at least 1".to_string(),
        ));
    }
    if config.search.min_query_len == 0 {
        return Err(PaletteError::Config(
            "search.minQueryLen must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Load configuration from `path` (tilde-expanded).
///
/// Returns `PaletteConfig::default()` if the file is missing, unreadable or
/// invalid.
#[instrument(name = "load_config")]
pub fn load_config(path: &str) -> PaletteConfig {
    let config_path = PathBuf::from(shellexpand::tilde(path).as_ref());

    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return PaletteConfig::default();
    }

    let contents = match fs::read_to_string(&config_path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(
                path = %config_path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            return PaletteConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            info!(
                path = %config_path.display(),
                debug = config.debug,
                "Successfully loaded config"
            );
            config
        }
        Err(e) => {
            warn!(
                path = %config_path.display(),
                error = %e,
                "Failed to parse config JSON, using defaults"
            );
            PaletteConfig::default()
        }
    }
}
