//! # Trustgate Infrastructure
//!
//! Infrastructure implementations of core ports and process wiring.
//!
//! This crate contains:
//! - The AES-256-GCM [`EncryptionProvider`](trustgate_core::EncryptionProvider)
//! - Configuration loading from environment variables and files
//! - Tracing subscriber initialisation
//! - The background task that prunes expired cache entries
//!
//! ## Architecture
//! - Implements traits defined in `trustgate-core`
//! - Depends on `trustgate-common` and `trustgate-core`
//! - Contains all "impure" code (environment, files, global subscriber)

pub mod config;
pub mod crypto;
pub mod errors;
pub mod maintenance;
pub mod observability;
pub mod services;

// Re-export commonly used items
pub use config::{AppConfig, EncryptionConfig, KeyEncoding, LogFormat, LoggingConfig};
pub use crypto::AesGcmEncryptionProvider;
pub use errors::{InfraError, InfraResult};
pub use maintenance::spawn_pruner;
pub use observability::init_tracing;
pub use services::Services;
