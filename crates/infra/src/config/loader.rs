//! Configuration loader
//!
//! Loads connector configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! Required:
//! - `PINESYNC_VECTOR_BASE_URL`, `PINESYNC_VECTOR_API_KEY`: vector (index host) endpoint
//! - `PINESYNC_INDEX_BASE_URL`, `PINESYNC_INDEX_API_KEY`: index management endpoint
//! - `PINESYNC_EMBED_BASE_URL`, `PINESYNC_EMBED_API_KEY`: embedding endpoint
//!
//! Optional:
//! - `PINESYNC_EMBED_MODEL`: default embedding model
//! - `PINESYNC_EMBED_MAX_BATCH_SIZE`: max inputs per embed call
//! - `PINESYNC_API_VERSION`: value of the API version header
//! - `PINESYNC_HTTP_TIMEOUT_SECS`: per-request timeout
//! - `PINESYNC_MAX_RETRIES`: retry cap for transient failures
//! - `PINESYNC_SYNC_INDEXES`, `PINESYNC_SYNC_VECTORS`, `PINESYNC_SYNC_EMBEDS`:
//!   which kinds the sync run reads (true/false)
//! - `PINESYNC_VECTOR_NAMESPACE`: namespace paged by the vector reader
//! - `PINESYNC_EMBED_INPUTS`: `|`-separated seed texts for the embed reader
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./pinesync.{json,toml}` or `./config.{json,toml}` (current working directory)
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use pinesync_domain::{ConnectorConfig, ConnectorError, EndpointCredentials, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ConnectorError::Config` if configuration cannot be loaded from
/// either source or fails validation.
pub fn load() -> Result<ConnectorConfig> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ConnectorError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<ConnectorConfig> {
    let mut config = ConnectorConfig::default();

    config.action_processor.vector = endpoint_from_env("VECTOR")?;
    config.action_processor.index = endpoint_from_env("INDEX")?;
    config.action_processor.embed.credentials = endpoint_from_env("EMBED")?;

    if let Some(model) = env_opt("PINESYNC_EMBED_MODEL") {
        config.action_processor.embed.default_model = model;
    }
    if let Some(size) = env_parse::<usize>("PINESYNC_EMBED_MAX_BATCH_SIZE")? {
        config.action_processor.embed.max_batch_size = size;
    }
    if let Some(version) = env_opt("PINESYNC_API_VERSION") {
        config.api_version = version;
    }
    if let Some(timeout) = env_parse::<u64>("PINESYNC_HTTP_TIMEOUT_SECS")? {
        config.http.timeout_secs = timeout;
    }
    if let Some(retries) = env_parse::<u32>("PINESYNC_MAX_RETRIES")? {
        config.http.retry.max_retries = retries;
    }

    config.cache_writer.index.upload_object = env_bool("PINESYNC_SYNC_INDEXES", true);
    config.cache_writer.vector.upload_object = env_bool("PINESYNC_SYNC_VECTORS", false);
    config.cache_writer.embed.upload_object = env_bool("PINESYNC_SYNC_EMBEDS", false);
    config.cache_writer.vector.namespace = env_opt("PINESYNC_VECTOR_NAMESPACE");
    if let Some(inputs) = env_opt("PINESYNC_EMBED_INPUTS") {
        config.cache_writer.embed.inputs = inputs
            .split('|')
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
            .collect();
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ConnectorError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ConnectorConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConnectorError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConnectorError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConnectorError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ConnectorConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConnectorError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConnectorError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ConnectorError::Config(format!("Unsupported config format: {extension}"))),
    }
}

const CONFIG_FILE_NAMES: [&str; 4] = ["pinesync.json", "pinesync.toml", "config.json", "config.toml"];
const PARENT_CONFIG_FILE_NAMES: [&str; 4] =
    ["../config.json", "../config.toml", "../../config.json", "../../config.toml"];

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| {
            CONFIG_FILE_NAMES.iter().chain(PARENT_CONFIG_FILE_NAMES.iter()).map(move |name| root.join(name))
        })
        .find(|path| path.exists())
}

fn endpoint_from_env(domain: &str) -> Result<EndpointCredentials> {
    let base_url = env_var(&format!("PINESYNC_{domain}_BASE_URL"))?;
    let api_key = env_var(&format!("PINESYNC_{domain}_API_KEY"))?;
    Ok(EndpointCredentials::new(base_url, api_key))
}

/// Get required environment variable
///
/// # Errors
/// Returns `ConnectorError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        ConnectorError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ConnectorError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
