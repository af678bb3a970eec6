//! Secret payload wrapper that zeroes memory on drop

use secrecy::{ExposeSecret, SecretString};
use std::string::FromUtf8Error;

/// The decoded text of a retrieved secret version.
///
/// Wraps the payload in `secrecy::SecretString` so the value is zeroed from
/// memory on drop and cannot leak through `Debug` or `Display` output, which
/// both render `[REDACTED]`. Reading the text requires an explicit
/// [`expose`](SecretPayload::expose) call. The payload has no lifecycle
/// beyond the retrieval that produced it; ownership transfers entirely to
/// the caller.
#[derive(Clone)]
pub struct SecretPayload {
    text: SecretString,
}

impl SecretPayload {
    /// Wrap already-decoded payload text.
    #[must_use]
    pub fn new(text: String) -> Self {
        Self {
            text: SecretString::from(text),
        }
    }

    /// Decode raw payload bytes from the store as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the decode failure when the store handed back bytes that are
    /// not valid UTF-8 (for example a binary secret version).
    pub fn from_utf8(bytes: Vec<u8>) -> Result<Self, FromUtf8Error> {
        Ok(Self::new(String::from_utf8(bytes)?))
    }

    /// Read the payload text.
    ///
    /// Exposed text must not be logged or persisted; use it for the
    /// immediate operation and let the wrapper drop.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.text.expose_secret()
    }

    /// Payload length in bytes, without exposing the text.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.expose_secret().len()
    }

    /// Check whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for SecretPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}
