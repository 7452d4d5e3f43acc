//! Configuration module
//!
//! Environment-based configuration for the ingestion service: transport
//! credentials, allow-list, storage backend selection, catalog endpoint and
//! submission lifecycle tuning.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::constants::{DEFAULT_SUBMISSION_TTL_SECS, DEFAULT_SWEEP_INTERVAL_SECS};
use crate::models::ConversationId;
use crate::storage_types::StorageBackend;

const DEFAULT_SERVER_PORT: u16 = 10000;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} não definido")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Service configuration loaded from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    // Transport configuration
    pub bot_token: String,
    /// Only events from this conversation are processed. `None` accepts all.
    pub allowed_conversation: Option<ConversationId>,
    pub poll_timeout: Duration,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub firebase_storage_bucket: Option<String>,
    pub firebase_auth_token: Option<String>,
    // Catalog configuration
    pub firebase_db_url: Option<String>,
    // Submission lifecycle
    pub submission_ttl: Duration,
    pub sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let bot_token =
            env::var("TELEGRAM_BOT_TOKEN").map_err(|_| ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let allowed_conversation = match env::var("TELEGRAM_GROUP_ID") {
            Ok(raw) if !raw.trim().is_empty() => {
                let id = raw.trim().parse::<i64>().map_err(|_| ConfigError::Invalid {
                    key: "TELEGRAM_GROUP_ID",
                    value: raw.clone(),
                })?;
                Some(ConversationId(id))
            }
            _ => None,
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "STORAGE_BACKEND",
                value: raw,
            })?,
            Err(_) => StorageBackend::Local,
        };

        Ok(Config {
            server_port: parse_env("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            environment,
            bot_token,
            allowed_conversation,
            poll_timeout: Duration::from_secs(parse_env(
                "POLL_TIMEOUT_SECS",
                DEFAULT_POLL_TIMEOUT_SECS,
            )?),
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            firebase_storage_bucket: env::var("FIREBASE_STORAGE_BUCKET").ok(),
            firebase_auth_token: env::var("FIREBASE_AUTH_TOKEN").ok(),
            firebase_db_url: env::var("FIREBASE_DB_URL").ok(),
            submission_ttl: Duration::from_secs(parse_env(
                "SUBMISSION_TTL_SECS",
                DEFAULT_SUBMISSION_TTL_SECS,
            )?),
            sweep_interval: Duration::from_secs(parse_env(
                "SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL_SECS,
            )?),
        })
    }

    /// Fail fast on misconfiguration: every selected collaborator must have
    /// the variables it needs before anything connects.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.storage_backend {
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(ConfigError::Missing("LOCAL_STORAGE_PATH"));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(ConfigError::Missing("LOCAL_STORAGE_BASE_URL"));
                }
            }
            StorageBackend::Firebase => {
                if self.firebase_storage_bucket.is_none() {
                    return Err(ConfigError::Missing("FIREBASE_STORAGE_BUCKET"));
                }
            }
        }
        if self.firebase_db_url.is_none() {
            return Err(ConfigError::Missing("FIREBASE_DB_URL"));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}
