use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};

use crate::domain::errors::ConfigError;
use crate::domain::models::action::{Action, Actions};
use crate::domain::models::config::Settings;

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "config/jbi.yaml";

/// Prefix of the environment variables overriding settings.
pub const ENV_PREFIX: &str = "JBI_";

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. config/jbi.yaml (optional)
    /// 3. Environment variables (JBI_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Settings> {
        Self::load_from_file(DEFAULT_SETTINGS_FILE)
    }

    /// Load settings from a specific file, still honouring the environment
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Settings> {
        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context(format!(
                "Failed to load settings from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&settings)?;
        Ok(settings)
    }

    /// Validate settings after loading
    pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&settings.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(settings.logging.level.clone()));
        }

        if settings.actions_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyActionsFile);
        }

        Ok(())
    }

    /// Read and validate the actions file.
    pub fn load_actions(path: impl AsRef<Path>) -> Result<Actions, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Load(format!("{}: {err}", path.display())))?;
        Self::parse_actions(&yaml)
    }

    /// Parse a YAML list of actions and validate it.
    ///
    /// Step names are resolved here, so a typo in `steps` fails at startup.
    pub fn parse_actions(yaml: &str) -> Result<Actions, ConfigError> {
        let actions: Vec<Action> =
            serde_yaml::from_str(yaml).map_err(|err| ConfigError::Load(err.to_string()))?;
        Actions::new(actions)
    }
}
