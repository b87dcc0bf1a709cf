//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment when one exists
//! 2. Attempts to load from environment variables
//! 3. If `TRUSTGATE_TENANT_ID` is unset, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `TRUSTGATE_TENANT_ID`: Tenant owning the cache (required)
//! - `TRUSTGATE_CACHE_TTL_MS`: Cache TTL in milliseconds
//! - `TRUSTGATE_LOG_LEVEL`: Default `EnvFilter` directive
//! - `TRUSTGATE_LOG_FORMAT`: `plain` or `json`
//! - `TRUSTGATE_ENCRYPTION_KEY`: 32-byte AES key
//! - `TRUSTGATE_ENCRYPTION_KEY_ENCODING`: `hex` or `base64`
//! - `TRUSTGATE_MAX_JSON_DEPTH`: JSON nesting limit
//! - `TRUSTGATE_MAX_UPLOAD_BYTES`: Upload size limit
//! - `TRUSTGATE_ALLOW_DATA_URLS`: Accept `data:` URLs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./trustgate.toml` or `./trustgate.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. `../config.toml` or `../config.json` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use trustgate_common::error::CommonError;

use super::settings::{AppConfig, KeyEncoding, LogFormat};
use crate::errors::{InfraError, InfraResult};

const TENANT_VAR: &str = "TRUSTGATE_TENANT_ID";

const CONFIG_FILE_NAMES: &[&str] =
    &["trustgate.toml", "trustgate.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Loads from environment variables when `TRUSTGATE_TENANT_ID` is set and
/// from a config file otherwise. The result is validated.
///
/// # Errors
/// Returns `InfraError::Config` if:
/// - The tenant is set but another environment variable is invalid
/// - The tenant is unset and no readable config file is found
/// - File format is invalid
/// - Any setting fails validation
pub fn load() -> InfraResult<AppConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    // A set tenant means the environment is the chosen source, so its
    // parse errors are reported rather than masked by a file lookup.
    let config = if std::env::var_os(TENANT_VAR).is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else {
        tracing::debug!("{TENANT_VAR} not set, loading configuration from file");
        load_from_file(None)?
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `TRUSTGATE_TENANT_ID` must be present; all other variables are optional
/// and fall back to defaults.
///
/// # Errors
/// Returns `InfraError::Config` if the tenant is missing or a variable has an
/// invalid value.
pub fn load_from_env() -> InfraResult<AppConfig> {
    let mut config = AppConfig::for_tenant(env_var(TENANT_VAR)?);

    if let Some(ttl) = env_parse::<u64>("TRUSTGATE_CACHE_TTL_MS")? {
        config.cache.default_ttl = Duration::from_millis(ttl);
    }

    if let Ok(level) = std::env::var("TRUSTGATE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = env_parse::<LogFormat>("TRUSTGATE_LOG_FORMAT")? {
        config.logging.format = format;
    }

    config.encryption.key = std::env::var("TRUSTGATE_ENCRYPTION_KEY").ok();
    if let Some(encoding) = env_parse::<KeyEncoding>("TRUSTGATE_ENCRYPTION_KEY_ENCODING")? {
        config.encryption.encoding = encoding;
    }

    if let Some(depth) = env_parse::<usize>("TRUSTGATE_MAX_JSON_DEPTH")? {
        config.sanitizer.max_json_depth = depth;
    }
    if let Some(bytes) = env_parse::<u64>("TRUSTGATE_MAX_UPLOAD_BYTES")? {
        config.sanitizer.max_upload_bytes = bytes;
    }
    config.sanitizer.allow_data_urls =
        env_bool("TRUSTGATE_ALLOW_DATA_URLS", config.sanitizer.allow_data_urls);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `InfraError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
///
/// Returns a retryable `CommonError::Persistence` if the file cannot be read.
pub fn load_from_file(path: Option<PathBuf>) -> InfraResult<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(InfraError::config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            InfraError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CommonError::persistence_op("read_config", e.to_string()))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> InfraResult<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| InfraError::config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| InfraError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(InfraError::config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, and the directory of
/// the running executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> InfraResult<String> {
    std::env::var(key)
        .map_err(|_| InfraError::config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional environment variable
///
/// Returns `Ok(None)` when unset and an error when set but unparseable.
fn env_parse<T>(key: &str) -> InfraResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| InfraError::config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
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
