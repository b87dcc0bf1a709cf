//! Cryptographic adapters for core ports

mod aes_provider;

pub use aes_provider::{decode_key, AesGcmEncryptionProvider};
