use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "chatfilter";
const CONFIG_FILENAME: &str = "config.toml";

/// Settings that shape how the `chatfilter` binary treats bad input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub invalid_filter: InvalidFilterPolicy,
    pub input: InputConfig,
}

/// What to do with a filter that fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidFilterPolicy {
    /// Abort before any message is processed.
    #[default]
    Reject,
    /// Drop the filter; messages are shown as if it did not exist.
    Show,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputConfig {
    /// Abort on a malformed message line instead of skipping it.
    pub strict: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Where a config file is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Passed on the command line; it must exist.
    Explicit(PathBuf),
    /// Derived from the XDG layout; a missing file means defaults.
    Standard(PathBuf),
}

impl ConfigLocation {
    pub fn path(&self) -> &Path {
        match self {
            ConfigLocation::Explicit(path) | ConfigLocation::Standard(path) => path,
        }
    }
}

/// A loaded configuration and the file it was read from, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot locate a home directory for the default config")]
    MissingHomeDir,
    #[error("config path is empty: {0:?}")]
    InvalidConfigPath(PathBuf),
    #[error("config file {0} does not exist")]
    MissingConfigFile(PathBuf),
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    invalid_filter: Option<InvalidFilterPolicy>,
    input: Option<RawInput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInput {
    strict: Option<bool>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let strict = raw
            .input
            .and_then(|input| input.strict)
            .unwrap_or(defaults.input.strict);
        AppConfig {
            invalid_filter: raw.invalid_filter.unwrap_or(defaults.invalid_filter),
            input: InputConfig { strict },
        }
    }
}

/// Loads the config from `custom`, or from the default location.
///
/// Without an explicit path, an unresolvable or missing default file yields
/// [`AppConfig::default`].
pub fn load(custom: Option<PathBuf>) -> Result<LoadedConfig> {
    let explicit = custom.is_some();
    let location = match locate(custom) {
        Ok(location) => location,
        Err(ConfigError::MissingHomeDir | ConfigError::InvalidConfigPath(_)) if !explicit => {
            return Ok(LoadedConfig {
                config: AppConfig::default(),
                source: None,
            });
        }
        Err(err) => return Err(err),
    };
    load_from(&location)
}

/// Resolves the config file location without reading it.
pub fn locate(custom: Option<PathBuf>) -> Result<ConfigLocation> {
    if let Some(path) = custom {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfigPath(path));
        }
        return Ok(ConfigLocation::Explicit(path));
    }

    let base = match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if dir.is_empty() => return Err(ConfigError::InvalidConfigPath(dir.into())),
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .ok_or(ConfigError::MissingHomeDir)?
            .join(".config"),
    };
    Ok(ConfigLocation::Standard(
        base.join(APP_DIR).join(CONFIG_FILENAME),
    ))
}

pub fn load_from(location: &ConfigLocation) -> Result<LoadedConfig> {
    let path = location.path();
    if !path.exists() {
        return match location {
            ConfigLocation::Explicit(path) => Err(ConfigError::MissingConfigFile(path.clone())),
            ConfigLocation::Standard(_) => Ok(LoadedConfig {
                config: AppConfig::default(),
                source: None,
            }),
        };
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedConfig {
        config: raw.into(),
        source: Some(path.to_path_buf()),
    })
}
