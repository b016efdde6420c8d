//! Per-request CSP nonces
//!
//! A nonce is 16 bytes from the thread-local CSPRNG, base64 encoded. It
//! must appear both in the `script-src` directive and on every inline
//! script the page renders for that response.

use crate::{Result, SecurityError};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use std::fmt;

const NONCE_BYTES: usize = 16;

#[derive(Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    /// Generate a fresh nonce
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    /// Wrap an existing value, e.g. one forwarded in a request header
    pub fn parse(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(SecurityError::EmptyNonce);
        }
        let valid = value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'-' | b'_'));
        if !valid {
            return Err(SecurityError::InvalidNonce);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Source expression for a CSP directive: `'nonce-…'`
    pub fn source(&self) -> String {
        format!("'nonce-{}'", self.0)
    }
}

// The nonce is a per-response secret; keep it out of debug logs.
impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nonce(..)")
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
