//! Caller credential value object.

use sha2::{Digest, Sha256};
use std::fmt;

use super::ValidationError;

/// Opaque caller credential, taken verbatim from the `Authorization` header.
///
/// The value is only ever used as an accounting key. It is held as the raw
/// header bytes, so two credentials are the same key only if they are
/// byte-for-byte equal. It is never printed: `Debug` and `Display` render a
/// short SHA-256 fingerprint instead.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(Vec<u8>);

impl ApiKey {
    /// Creates a key from a textual credential.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        Self::from_bytes(raw.into().into_bytes())
    }

    /// Creates a key from raw header bytes, which need not be UTF-8.
    ///
    /// Empty values are rejected, matching a missing header.
    pub fn from_bytes(raw: impl Into<Vec<u8>>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::empty_field("authorization"));
        }
        Ok(Self(raw))
    }

    /// Returns the raw credential. Only storage adapters should need this.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the credential as text, or `None` if it is not UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Returns a stable, non-reversible identifier safe for logs and alerts.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.0);
        let mut out = String::with_capacity(4 + 16);
        out.push_str("key_");
        for byte in &digest[..8] {
            out.push_str(&format!("{:02x}", byte));
        }
        out
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.fingerprint()).finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}
