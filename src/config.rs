//! Application-level configuration loading: rule variant, team names and history limit.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::{
    history::DEFAULT_MAX_HISTORY_SIZE,
    match_state::{Team, Variant},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "VOLLEY_SCORE_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Rules the initial match is played under.
    pub variant: Variant,
    /// Maximum number of undoable actions.
    pub max_history_size: usize,
    /// Initial home team.
    pub team_a: Team,
    /// Initial away team.
    pub team_b: Team,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        variant = %config.variant,
                        max_history_size = config.max_history_size,
                        "loaded match configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document. Missing keys take their default.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            team_a: Team::named("Team A"),
            team_b: Team::named("Team B"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    variant: Option<Variant>,
    max_history_size: Option<usize>,
    team_a: Option<String>,
    team_b: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let max_history_size = match value.max_history_size {
            Some(0) => {
                warn!("max_history_size must be at least 1; keeping default");
                defaults.max_history_size
            }
            Some(size) => size,
            None => defaults.max_history_size,
        };

        Self {
            variant: value.variant.unwrap_or(defaults.variant),
            max_history_size,
            team_a: value.team_a.map(Team::named).unwrap_or(defaults.team_a),
            team_b: value.team_b.map(Team::named).unwrap_or(defaults.team_b),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
