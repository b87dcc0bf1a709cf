//! Secure cache errors

use thiserror::Error;
use trustgate_common::error::{CommonError, ErrorClassification};

use super::ports::ProviderError;

/// Errors surfaced by [`super::SecureCache`]
///
/// Reads never fail: a missing, expired or undecryptable entry is a miss.
#[derive(Debug, Error)]
pub enum SecureCacheError {
    #[error("failed to encrypt entry '{key}' for tenant '{tenant_id}': {source}")]
    Encryption {
        key: String,
        tenant_id: String,
        #[source]
        source: ProviderError,
    },

    #[error(transparent)]
    Common(#[from] CommonError),
}

trustgate_common::impl_error_classification!(SecureCacheError, Common,
    Self::Encryption { source, .. } => {
        retryable: source.is_retryable(),
        severity: source.severity(),
        critical: source.is_critical(),
        retry_after: source.retry_after(),
    },
);
