//! # Digest Module
//!
//! Content digests used both as the dedup key and as the label embedded in
//! sorted file names.
//!
//! Files are streamed in 1 MiB chunks so memory stays flat no matter how
//! large the raw files get.

use crate::error::HashError;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read buffer size used when streaming a file through the hasher
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DigestKind {
    #[default]
    Sha1,
    Sha256,
}

impl DigestKind {
    /// Tag embedded in destination file names (`photo_sha1_<digest>.jpg`)
    pub fn tag(&self) -> &'static str {
        match self {
            DigestKind::Sha1 => "sha1",
            DigestKind::Sha256 => "sha256",
        }
    }

    /// Length of the hex representation
    pub fn hex_len(&self) -> usize {
        match self {
            DigestKind::Sha1 => 40,
            DigestKind::Sha256 => 64,
        }
    }
}

impl fmt::Display for DigestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Lowercase hex digest of a file's full content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Wrap an existing hex string, normalizing it to lowercase
    pub fn from_hex(hex: &str) -> Self {
        Self(hex.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the digest of everything readable from `reader`
pub fn digest_reader<R: Read>(mut reader: R, kind: DigestKind) -> std::io::Result<Digest> {
    let mut buffer = vec![0u8; CHUNK_SIZE];

    macro_rules! stream {
        ($hasher:expr) => {{
            let mut hasher = $hasher;
            loop {
                let read = match reader.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                hasher.update(&buffer[..read]);
            }
            format!("{:x}", hasher.finalize())
        }};
    }

    let hex = match kind {
        DigestKind::Sha1 => stream!(Sha1::new()),
        DigestKind::Sha256 => stream!(Sha256::new()),
    };

    Ok(Digest(hex))
}

/// Compute the digest of a file on disk
pub fn compute_digest(path: &Path, kind: DigestKind) -> Result<Digest, HashError> {
    let io_error = |source| HashError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    digest_reader(file, kind).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn sha1_of_known_input() {
        let digest = digest_reader(&b"abc"[..], DigestKind::Sha1).unwrap();
        assert_eq!(digest.as_str(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn sha256_of_empty_input() {
        let digest = digest_reader(&b""[..], DigestKind::Sha256).unwrap();
        assert_eq!(
            digest.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_length_matches_kind() {
        for kind in [DigestKind::Sha1, DigestKind::Sha256] {
            let digest = digest_reader(&b"picture"[..], kind).unwrap();
            assert_eq!(digest.as_str().len(), kind.hex_len());
        }
    }

    #[test]
    fn files_larger_than_one_chunk_hash_like_in_memory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big.nef");
        let content: Vec<u8> = (0..CHUNK_SIZE * 2 + 17).map(|i| (i % 251) as u8).collect();
        File::create(&path).unwrap().write_all(&content).unwrap();

        let from_file = compute_digest(&path, DigestKind::Sha1).unwrap();
        let from_memory = digest_reader(&content[..], DigestKind::Sha1).unwrap();

        assert_eq!(from_file, from_memory);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = compute_digest(Path::new("/nonexistent/a.jpg"), DigestKind::Sha1).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/a.jpg"));
    }

    #[test]
    fn from_hex_normalizes_case() {
        assert_eq!(Digest::from_hex("ABCD").as_str(), "abcd");
    }
}
