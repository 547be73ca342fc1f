//! Content fingerprinting with optional partial reads.
//!
//! # Overview
//!
//! [`Fingerprinter`] computes a fixed-length hex [`Digest`] for one file. Which
//! bytes are hashed depends on the file's [`PartialReadPolicy`], looked up by
//! lower-cased extension in a [`PartialSizes`] table:
//!
//! - [`PartialReadPolicy::Full`]: the whole file, streamed in 8 KiB chunks
//! - [`PartialReadPolicy::Chunked`]: the whole file, streamed in `n`-byte chunks
//!   (a zero size reads nothing and yields the digest of empty input)
//! - [`PartialReadPolicy::HeadTail`]: the first `head` bytes followed by the
//!   last `tail` bytes; files shorter than `head + tail` are rejected
//!
//! Digests are independent of chunk size, so `Full` and `Chunked(n > 0)`
//! always agree for the same file.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{Fingerprinter, HashAlgorithm, PartialReadPolicy};
//! use std::path::Path;
//!
//! let fingerprinter = Fingerprinter::new(HashAlgorithm::default());
//! let policy = PartialReadPolicy::HeadTail { head: 4096, tail: 4096 };
//! if let Some(digest) = fingerprinter.fingerprint(Path::new("movie.mp4"), policy) {
//!     println!("{digest}");
//! }
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use super::{parse_size, HashError};

/// Read buffer size for full-file hashing.
pub const CHUNK_SIZE: usize = 8192;

/// Upper bound on the read buffer for [`PartialReadPolicy::Chunked`].
///
/// Configured chunk sizes above this are read in pieces of this size; the
/// digest is unaffected.
const MAX_CHUNK_SIZE: u64 = 1024 * 1024;

/// Lowercase hexadecimal content fingerprint.
pub type Digest = String;

/// Content hash function used for the whole run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum HashAlgorithm {
    /// BLAKE3 extended output truncated to 128 bits (32 hex characters)
    #[default]
    #[serde(rename = "blake3-128")]
    #[value(name = "blake3-128")]
    Blake3_128,
    /// BLAKE3 with its native 256-bit output (64 hex characters)
    #[serde(rename = "blake3")]
    #[value(name = "blake3")]
    Blake3,
    /// SHA-256 (64 hex characters)
    #[serde(rename = "sha256")]
    #[value(name = "sha256")]
    Sha256,
}

impl HashAlgorithm {
    /// Length of the hex digest this algorithm produces.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Blake3_128 => 32,
            Self::Blake3 | Self::Sha256 => 64,
        }
    }

    fn start(self) -> HashState {
        match self {
            Self::Blake3_128 => HashState::Blake3 {
                hasher: blake3::Hasher::new(),
                out_len: 16,
            },
            Self::Blake3 => HashState::Blake3 {
                hasher: blake3::Hasher::new(),
                out_len: blake3::OUT_LEN,
            },
            Self::Sha256 => HashState::Sha256(sha2::Sha256::new()),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blake3_128 => write!(f, "blake3-128"),
            Self::Blake3 => write!(f, "blake3"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

enum HashState {
    Blake3 {
        hasher: blake3::Hasher,
        out_len: usize,
    },
    Sha256(sha2::Sha256),
}

impl HashState {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Blake3 { hasher, .. } => {
                hasher.update(data);
            }
            Self::Sha256(hasher) => hasher.update(data),
        }
    }

    fn finalize_hex(self) -> Digest {
        match self {
            Self::Blake3 { hasher, out_len } => {
                let mut out = vec![0u8; out_len];
                hasher.finalize_xof().fill(&mut out);
                to_hex(&out)
            }
            Self::Sha256(hasher) => to_hex(&hasher.finalize()),
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
            let _ = write!(s, "{b:02x}");
            s
        })
}

/// Which bytes of a file contribute to its digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartialReadPolicy {
    /// Hash the whole file in [`CHUNK_SIZE`] chunks.
    #[default]
    Full,
    /// Hash the whole file in chunks of this many bytes; `0` hashes nothing.
    Chunked(u64),
    /// Hash the first `head` bytes, then the last `tail` bytes.
    HeadTail {
        /// Bytes taken from the start of the file
        head: u64,
        /// Bytes taken from the end of the file
        tail: u64,
    },
}

/// One size inside a partial-read entry.
///
/// TOML and environment values may arrive as bare integers (`100`) or as
/// size strings (`"1mb"`). Integers are taken as bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    /// Raw byte count
    Bytes(u64),
    /// Size string such as `"64kb"`
    Text(String),
}

impl SizeValue {
    /// Resolve to a byte count.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        match self {
            Self::Bytes(n) => *n,
            Self::Text(text) => parse_size(text),
        }
    }
}

impl From<&str> for SizeValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<u64> for SizeValue {
    fn from(n: u64) -> Self {
        Self::Bytes(n)
    }
}

/// A partial-read entry as written in configuration.
///
/// Either a single size (`"1mb"` or `1048576`) or a `[start, end]` pair
/// (`["64kb", 65536]`). Size strings go through [`parse_size`], so malformed
/// values become `0` instead of errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartialSizeSpec {
    /// Single chunk size
    Single(SizeValue),
    /// Head and tail sizes
    Pair(SizeValue, SizeValue),
}

impl PartialSizeSpec {
    /// Resolve this entry into a read policy.
    #[must_use]
    pub fn to_policy(&self) -> PartialReadPolicy {
        match self {
            Self::Single(size) => PartialReadPolicy::Chunked(size.bytes()),
            Self::Pair(head, tail) => PartialReadPolicy::HeadTail {
                head: head.bytes(),
                tail: tail.bytes(),
            },
        }
    }
}

/// Per-extension partial-read policies.
///
/// Keys are lower-cased extensions without the leading dot. Files whose
/// extension has no entry are hashed in full.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialSizes {
    policies: HashMap<String, PartialReadPolicy>,
}

impl PartialSizes {
    /// Build the table from configuration entries.
    #[must_use]
    pub fn from_specs(specs: &HashMap<String, PartialSizeSpec>) -> Self {
        let policies = specs
            .iter()
            .map(|(ext, spec)| (normalize_extension(ext), spec.to_policy()))
            .collect();
        Self { policies }
    }

    /// Add or replace the policy for one extension.
    pub fn insert(&mut self, extension: &str, policy: PartialReadPolicy) {
        self.policies.insert(normalize_extension(extension), policy);
    }

    /// Number of configured extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check if no extension has a policy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Policy for a file, chosen by its extension (case-insensitive).
    #[must_use]
    pub fn policy_for(&self, path: &Path) -> PartialReadPolicy {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .and_then(|ext| self.policies.get(&ext).copied())
            .unwrap_or_default()
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

/// Computes content digests for individual files.
#[derive(Debug, Clone, Default)]
pub struct Fingerprinter {
    algorithm: HashAlgorithm,
    partial_sizes: PartialSizes,
}

impl Fingerprinter {
    /// Create a fingerprinter that hashes every file in full.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            partial_sizes: PartialSizes::default(),
        }
    }

    /// Set the per-extension partial-read table.
    #[must_use]
    pub fn with_partial_sizes(mut self, partial_sizes: PartialSizes) -> Self {
        self.partial_sizes = partial_sizes;
        self
    }

    /// The configured hash algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Policy that applies to `path`.
    #[must_use]
    pub fn policy_for(&self, path: &Path) -> PartialReadPolicy {
        self.partial_sizes.policy_for(path)
    }

    /// Fingerprint a file using the policy for its extension.
    #[must_use]
    pub fn fingerprint_file(&self, path: &Path) -> Option<Digest> {
        self.fingerprint(path, self.policy_for(path))
    }

    /// Fingerprint a file, logging and swallowing any failure.
    ///
    /// Returns `None` when the file cannot be read under `policy`.
    #[must_use]
    pub fn fingerprint(&self, path: &Path, policy: PartialReadPolicy) -> Option<Digest> {
        match self.try_fingerprint(path, policy) {
            Ok(digest) => Some(digest),
            Err(e) => {
                log::warn!("Could not read file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Fingerprint a file, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened, read or seeked, or
    /// if it is shorter than a [`PartialReadPolicy::HeadTail`] span.
    pub fn try_fingerprint(
        &self,
        path: &Path,
        policy: PartialReadPolicy,
    ) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut state = self.algorithm.start();

        match policy {
            PartialReadPolicy::Full => {
                hash_stream(&mut file, &mut state, CHUNK_SIZE)
                    .map_err(|e| HashError::from_io(path, e))?;
            }
            PartialReadPolicy::Chunked(0) => {}
            PartialReadPolicy::Chunked(size) => {
                let chunk = size.min(MAX_CHUNK_SIZE) as usize;
                hash_stream(&mut file, &mut state, chunk)
                    .map_err(|e| HashError::from_io(path, e))?;
            }
            PartialReadPolicy::HeadTail { head, tail } => {
                let len = file
                    .metadata()
                    .map_err(|e| HashError::from_io(path, e))?
                    .len();
                let required = head.saturating_add(tail);
                if len < required {
                    return Err(HashError::TooShort {
                        path: path.to_path_buf(),
                        len,
                        required,
                    });
                }

                hash_exact(&mut file, &mut state, head).map_err(|e| HashError::from_io(path, e))?;
                file.seek(SeekFrom::End(-(tail as i64)))
                    .map_err(|e| HashError::from_io(path, e))?;
                hash_exact(&mut file, &mut state, tail).map_err(|e| HashError::from_io(path, e))?;
            }
        }

        Ok(state.finalize_hex())
    }

    /// Digest of an in-memory buffer, as [`PartialReadPolicy::Full`] would
    /// produce for a file with these contents.
    #[must_use]
    pub fn digest_bytes(&self, data: &[u8]) -> Digest {
        let mut state = self.algorithm.start();
        state.update(data);
        state.finalize_hex()
    }
}

fn hash_stream(reader: &mut impl Read, state: &mut HashState, chunk: usize) -> io::Result<()> {
    let mut buffer = vec![0u8; chunk];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        state.update(&buffer[..n]);
    }
}

/// Hash exactly `len` bytes, failing if the reader ends early.
fn hash_exact(reader: &mut impl Read, state: &mut HashState, len: u64) -> io::Result<()> {
    let mut limited = reader.take(len);
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut remaining = len;
    while remaining > 0 {
        let n = match limited.read(&mut buffer) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "file shrank while hashing",
                ))
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        state.update(&buffer[..n]);
        remaining -= n as u64;
    }
    Ok(())
}
