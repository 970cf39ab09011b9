//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading: required variables must be present and valid or
//! the process exits with a clear error before binding the listener.

use std::env;

use thiserror::Error;

use listgate_store::StoreConfig;
use listgate_sync::FieldKeys;

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote store (SP_URL).
    pub store_url: String,
    /// Store account credentials (SP_USERNAME / SP_PASSWORD).
    pub username: String,
    pub password: String,
    /// Name of the entity field holding the target list title
    /// (SP_LIST_NAME, default "ListName").
    pub list_name_key: String,
    /// Name of the entity field holding the item type discriminator
    /// (SP_LIST_ITEM_NAME, default "ListItemEntityTypeFullName").
    pub item_type_key: String,
    /// Page cap for the read endpoints (SP_LIST_SIZE, default 100).
    pub page_size: u32,
    /// Listen port (PORT, default 5000).
    pub port: u16,
    /// Log filter (LOG_LEVEL, default "info").
    pub log_level: String,
    /// Runtime worker threads (THREADS, default 10).
    pub worker_threads: usize,
    /// Whether entities flagged `_deleted` are processed
    /// (PROCESS_DELETED_ENTITIES, default true).
    pub process_deleted: bool,
}

impl Config {
    /// Load configuration from environment variables (fail-fast).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            store_url: require("SP_URL")?,
            username: require("SP_USERNAME")?,
            password: require("SP_PASSWORD")?,
            list_name_key: var_or("SP_LIST_NAME", "ListName"),
            item_type_key: var_or("SP_LIST_ITEM_NAME", "ListItemEntityTypeFullName"),
            page_size: parse_or("SP_LIST_SIZE", 100)?,
            port: parse_or("PORT", 5000)?,
            log_level: var_or("LOG_LEVEL", "info"),
            worker_threads: parse_nonzero_or("THREADS", 10)?,
            process_deleted: parse_bool_or("PROCESS_DELETED_ENTITIES", true)?,
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.store_url, &self.username, &self.password)
    }

    pub fn field_keys(&self) -> FieldKeys {
        FieldKeys {
            list_name: self.list_name_key.clone(),
            item_type: self.item_type_key.clone(),
        }
    }
}

fn require(var: &str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(var.to_string())),
    }
}

fn var_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("{e}"),
        }),
        Err(_) => Ok(default),
    }
}

// The runtime builder panics on zero worker threads; catch it here so
// the process exits through the normal configuration error path.
fn parse_nonzero_or(var: &str, default: usize) -> Result<usize, ConfigError> {
    let value = parse_or(var, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

fn parse_bool_or(var: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(var) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ConfigError::InvalidValue {
                var: var.to_string(),
                message: format!("expected a boolean, got {other:?}"),
            }),
        },
        Err(_) => Ok(default),
    }
}
