//! Crash signatures: a digest over the top frames of a normalized trace.
//!
//! Only the innermost frames identify the fault site; deeper frames vary
//! with the harness and call path, so they are left out.

use crate::utils::config::{NO_STACKTRACE, SIGNATURE_FRAMES};
use sha2::{Digest, Sha256};

/// Deduplication fingerprint of one crash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Frames that were hashed, joined by `\n`
    pub text: String,

    /// Lowercase hex SHA-256 of `text`
    pub hash: String,
}

impl Signature {
    /// Build the signature of a normalized trace
    ///
    /// **Public** - main entry point for signature building
    ///
    /// Uses the first 12 frames, or `NO_STACKTRACE` for an empty trace.
    pub fn from_stacktrace(stack: &[String]) -> Self {
        if stack.is_empty() {
            return Self::sentinel();
        }

        let text = stack[..stack.len().min(SIGNATURE_FRAMES)].join("\n");
        let hash = sha256_hex(&text);
        Self { text, hash }
    }

    /// Signature shared by every run that produced no trace
    pub fn sentinel() -> Self {
        Self {
            text: NO_STACKTRACE.to_string(),
            hash: sha256_hex(NO_STACKTRACE),
        }
    }

    /// First 12 hex characters, for headings
    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }
}

/// Lowercase hex SHA-256 of a string's UTF-8 bytes
pub fn sha256_hex(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// First 12 characters of a hash (the whole hash if shorter)
pub fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
