//! Zeroizing containers for sensitive values
//!
//! Plaintext secrets move between the cache and its callers as
//! [`SecureString`], which wipes its buffer when dropped and never prints its
//! contents.

pub mod secure_string;

pub use secure_string::SecureString;
