//! TOML file loading.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::model::MirrorConfig;
use crate::validate;

/// Load the engine configuration.
///
/// With `path = None` the built-in defaults are returned. Otherwise the file
/// is read and parsed as TOML; absent sections fall back to their defaults.
/// The resulting configuration is validated either way.
///
/// # Errors
///
/// Returns an error when the file cannot be read, is not valid TOML, or
/// fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<MirrorConfig> {
    let config = match path {
        None => {
            debug!("no configuration file supplied, using defaults");
            MirrorConfig::default()
        }
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let config: MirrorConfig =
                toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            info!(path = %path.display(), "loaded mirror configuration");
            config
        }
    };

    validate::validate(&config)?;
    Ok(config)
}
