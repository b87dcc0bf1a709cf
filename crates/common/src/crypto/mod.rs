//! Shared cryptographic primitives.

pub mod encryption;

pub use encryption::{EncryptionService, SealedPayload, KEY_LEN, NONCE_LEN, TAG_LEN};
