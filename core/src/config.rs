//! Launcher settings.
//!
//! Precedence, lowest first: defaults, config file, `EXDUMP_*` environment
//! variables, command-line overrides.

use crate::builder::{DEFAULT_INTERPRETER, DEFAULT_SCRIPT};
use crate::executor::DEFAULT_TIMEOUT;
use crate::{ExdumpError, Launcher};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "exdump.toml";

pub const ENV_INTERPRETER: &str = "EXDUMP_PYTHON";
pub const ENV_SCRIPT: &str = "EXDUMP_SCRIPT";
pub const ENV_TIMEOUT: &str = "EXDUMP_TIMEOUT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ExdumpConfig {
    pub interpreter: String,
    pub script_path: PathBuf,
    pub timeout_secs: u64,
    pub working_directory: Option<PathBuf>,
    /// Extra variables set for the analyzer process.
    pub environment: HashMap<String, String>,
}

impl Default for ExdumpConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            script_path: PathBuf::from(DEFAULT_SCRIPT),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            working_directory: None,
            environment: HashMap::new(),
        }
    }
}

/// Where the file layer of a loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
}

/// Values given on the command line; `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub interpreter: Option<String>,
    pub script_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl ExdumpConfig {
    /// Loads the file layer and the environment layer.
    ///
    /// An explicit path must exist. Without one, `exdump.toml` in the current
    /// directory is tried, then `<config dir>/exdump/config.toml`.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ExdumpError> {
        let (mut config, source) = match Self::locate(explicit)? {
            Some(path) => (Self::from_file(&path)?, ConfigSource::File(path)),
            None => (Self::default(), ConfigSource::Defaults),
        };
        debug!(?source, "configuration loaded");

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok((config, source))
    }

    fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>, ExdumpError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ExdumpError::Configuration(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path.to_path_buf()));
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Ok(Some(local));
        }

        Ok(user_config_path().filter(|path| path.is_file()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ExdumpError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ExdumpError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ExdumpError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Applies `EXDUMP_*` variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ExdumpError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(interpreter) = lookup(ENV_INTERPRETER) {
            self.interpreter = interpreter;
        }
        if let Some(script) = lookup(ENV_SCRIPT) {
            self.script_path = PathBuf::from(script);
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            self.timeout_secs = timeout.trim().parse().map_err(|_| {
                ExdumpError::Configuration(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT, timeout))
            })?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<(), ExdumpError> {
        if let Some(ref interpreter) = overrides.interpreter {
            self.interpreter = interpreter.clone();
        }
        if let Some(ref script) = overrides.script_path {
            self.script_path = script.clone();
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ExdumpError> {
        if self.interpreter.trim().is_empty() {
            return Err(ExdumpError::Configuration("interpreter must not be empty".to_string()));
        }
        if self.script_path.as_os_str().is_empty() {
            return Err(ExdumpError::Configuration("script_path must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ExdumpError::Configuration("timeout_secs must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn launcher(&self) -> Launcher {
        Launcher::new(self.interpreter.clone(), self.script_path.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `<config dir>/exdump/config.toml`, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("exdump").join("config.toml"))
}
