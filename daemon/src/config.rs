use crate::recognition::DEFAULT_LANGUAGE;
use crate::trigger::KeyCode;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use shared::CommandSpec;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RecognitionConfig {
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TriggerConfig {
    #[serde(default = "default_key_code")]
    pub key_code: KeyCode,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            key_code: default_key_code(),
        }
    }
}

fn default_key_code() -> KeyCode {
    KeyCode::V
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn socket_path(&self) -> PathBuf {
        self.socket_path
            .clone()
            .unwrap_or_else(shared::default_socket_path)
    }
}

/// Loads the config from `path`, or from the default location when `None`.
///
/// A missing file at the default location yields defaults; a missing file
/// that was asked for explicitly is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => match get_config_path() {
            Some(path) if path.exists() => path,
            Some(path) => {
                tracing::info!("Config file not found at {:?}, using defaults", path);
                return Ok(Config::default());
            }
            None => {
                tracing::info!("No config directory, using defaults");
                return Ok(Config::default());
            }
        },
    };

    tracing::info!("Loading config from {:?}", config_path);
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file {:?}: {}", config_path, e))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

    tracing::info!(
        "Config loaded successfully ({} commands)",
        config.commands.len()
    );
    Ok(config)
}

fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("voix").join("config.toml"))
}
