//! Application Configuration Module
//!
//! Loads the settings for the interview coach. The API key is layered: a
//! hosted secrets file is consulted first and the process environment (after
//! loading a local `.env`) is the fallback.

use interview_core::completion::DEFAULT_CHAT_MODEL;
use secrecy::SecretString;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::Level;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Overrides the location of the secrets file.
pub const SECRETS_FILE_VAR: &str = "INTERVIEW_SECRETS_FILE";
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// Where the API key was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    SecretsFile,
    Environment,
}

/// Holds all configuration loaded at startup.
#[derive(Debug)]
pub struct Config {
    pub openai_api_key: SecretString,
    pub key_source: KeySource,
    pub chat_model: String,
    pub base_url: Option<String>,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
    #[error("Could not read secrets file {}: {reason}", path.display())]
    InvalidSecretsFile { path: PathBuf, reason: String },
}

impl Config {
    /// Loads configuration from the secrets file and environment variables.
    ///
    /// *   `INTERVIEW_SECRETS_FILE`: (Optional) Path of the TOML secrets file. Defaults to `secrets.toml`.
    /// *   `OPENAI_API_KEY`: Your secret key for the OpenAI API. Read from the secrets file first, then the environment.
    /// *   `CHAT_MODEL`: (Optional) The chat model to use. Defaults to "gpt-3.5-turbo".
    /// *   `OPENAI_BASE_URL`: (Optional) Alternative endpoint for an OpenAI-compatible API.
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Useful for local development, ignored if not present.
        dotenvy::dotenv().ok();

        let secrets_path = env::var(SECRETS_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_FILE));

        Self::load(&secrets_path, |name| env::var(name).ok())
    }

    fn load(secrets_path: &Path, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let (api_key, key_source) = match read_secret(secrets_path, API_KEY_VAR)? {
            Some(key) => (key, KeySource::SecretsFile),
            None => match var(API_KEY_VAR).and_then(non_blank) {
                Some(key) => (key, KeySource::Environment),
                None => {
                    return Err(ConfigError::MissingVar(format!(
                        "{API_KEY_VAR} must be set in {} or the environment",
                        secrets_path.display()
                    )));
                }
            },
        };

        let chat_model = var("CHAT_MODEL")
            .and_then(non_blank)
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let base_url = var("OPENAI_BASE_URL").and_then(non_blank);

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            openai_api_key: SecretString::from(api_key),
            key_source,
            chat_model,
            base_url,
            log_level,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reads one string key from a TOML secrets file. A missing file is not an
/// error; an unreadable or malformed one is.
fn read_secret(path: &Path, key: &str) -> Result<Option<String>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::InvalidSecretsFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    let table: toml::Table = content
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::InvalidSecretsFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    Ok(table
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .and_then(non_blank))
}
