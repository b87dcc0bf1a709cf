//! Testing utilities and helpers
//!
//! - **[`assertions`]**: assertion macros for errors and validation results
//! - **[`logs`]**: in-memory capture of `tracing` output
//!
//! ## Usage
//!
//! ```rust
//! use trustgate_common::testing::LogCapture;
//!
//! let capture = LogCapture::new();
//! {
//!     let _guard = capture.set_default();
//!     tracing::error!(key = "session", "decryption failed");
//! }
//! assert!(capture.contains("key=\"session\""));
//! ```

pub mod assertions;
pub mod logs;

pub use logs::LogCapture;

pub use crate::time::{Clock, MockClock, SystemClock};
