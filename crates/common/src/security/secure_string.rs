//! Secure string type with automatic memory zeroization

use std::fmt;
use std::str::FromStr;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CommonError, CommonResult};

/// Secure string that zeroes memory on drop
///
/// Debug and Display never reveal the contents, so a `SecureString` can sit
/// inside structs that are logged.
///
/// # Security Note
/// `PartialEq` is not constant-time. Use [`SecureString::constant_time_eq`]
/// when comparing secrets.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new secure string, taking ownership of the buffer
    pub fn new(s: String) -> Self {
        Self { inner: s }
    }

    /// Take ownership of decrypted bytes without copying them
    ///
    /// Invalid UTF-8 is wiped before the error is returned.
    pub fn from_utf8(bytes: Vec<u8>) -> CommonResult<Self> {
        match String::from_utf8(bytes) {
            Ok(inner) => Ok(Self { inner }),
            Err(err) => {
                let mut bytes = err.into_bytes();
                bytes.zeroize();
                Err(CommonError::crypto("decode", "plaintext is not valid UTF-8"))
            }
        }
    }

    /// Expose the inner value
    ///
    /// # Security Warning
    /// The exposed value should not be stored or logged.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Expose the inner value as bytes, for handing to a cipher
    pub fn expose_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Compare with another secure string in constant time
    pub fn constant_time_eq(&self, other: &SecureString) -> bool {
        constant_time_eq(self.expose_bytes(), other.expose_bytes())
    }
}

// Not constant-time; see constant_time_eq().
impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for SecureString {}

impl FromStr for SecureString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.to_string()))
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString(***)")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
