//! Configuration loading and management
//!
//! This module provides the application configuration types and utilities
//! for loading them from environment variables and files.

pub mod loader;
mod settings;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
pub use settings::{AppConfig, EncryptionConfig, KeyEncoding, LogFormat, LoggingConfig};
