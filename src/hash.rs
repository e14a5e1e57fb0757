// src/hash.rs

//! SHA-256 helpers for descriptor package checksums
//!
//! Package `checksums.txt` files carry one lowercase hex SHA-256 digest per
//! packaged file. The helpers here compute those digests and validate digest
//! strings read back from an archive.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Length of a SHA-256 digest as a hex string
pub const SHA256_HEX_LEN: usize = 64;

/// Buffer size for streaming file hashes (8 KB)
const HASH_BUFFER_SIZE: usize = 8192;

/// Checksum validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Digest string has the wrong length
    InvalidLength { expected: usize, got: usize },
    /// Digest string contains non-hex characters
    InvalidHex(String),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, got } => {
                write!(f, "invalid digest length: expected {}, got {}", expected, got)
            }
            Self::InvalidHex(s) => write!(f, "invalid hex in digest: {}", s),
        }
    }
}

impl std::error::Error for HashError {}

/// A validated SHA-256 digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Parse a hex digest, normalizing to lowercase
    pub fn parse(value: &str) -> Result<Self, HashError> {
        if value.len() != SHA256_HEX_LEN {
            return Err(HashError::InvalidLength {
                expected: SHA256_HEX_LEN,
                got: value.len(),
            });
        }
        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::InvalidHex(value.to_string()));
        }
        Ok(Self(value.to_lowercase()))
    }

    /// Digest of an in-memory buffer
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Digest of everything readable from `reader`
    pub fn of_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; HASH_BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// Digest of a file on disk
    pub fn of_file(path: &Path) -> io::Result<Self> {
        Self::of_reader(File::open(path)?)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
