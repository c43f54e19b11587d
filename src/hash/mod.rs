//! # Hash Module
//!
//! This module computes the [`DigestSet`] recorded for every subject and material
//! of a provenance statement. It supports SHA-256, SHA-384 and SHA-512, and can
//! compute several of them in a single pass over the input.
//!
//! ## Algorithm Support
//!
//! - **SHA-256**: 256-bit hash (64 hex characters) - the default
//! - **SHA-384**: 384-bit hash (96 hex characters)
//! - **SHA-512**: 512-bit hash (128 hex characters)
//!
//! Which algorithms are used is explicit configuration ([`DigestConfig`]), passed
//! to whoever computes digests. There is no process-wide default algorithm.
//!
//! ## Examples
//!
//! ### Digesting bytes with the default configuration
//! ```
//! use slsa_provenance::hash::{digest_bytes, DigestConfig};
//!
//! let digests = digest_bytes(b"abc", &DigestConfig::default());
//! assert_eq!(
//!     digests["sha256"],
//!     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
//! );
//! ```
//!
//! ### Digesting a file with several algorithms
//! ```no_run
//! use slsa_provenance::hash::{digest_file, DigestConfig, HashAlgorithm};
//! use std::path::Path;
//!
//! let config = DigestConfig::new(vec![HashAlgorithm::Sha256, HashAlgorithm::Sha512]).unwrap();
//! let digests = digest_file(Path::new("target/release/app"), &config).unwrap();
//! assert_eq!(digests.len(), 2);
//! ```

use crate::error::{Error, Result};
use crate::utils::safe_open_file;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Collection of cryptographic digests for the contents of one artifact.
///
/// Keys are algorithm names (`"sha256"`), values are lowercase hex. A `BTreeMap`
/// keeps the serialized key order stable.
pub type DigestSet = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// The algorithm name used as a [`DigestSet`] key.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Length of the hex digest this algorithm produces.
    ///
    /// ```
    /// use slsa_provenance::hash::HashAlgorithm;
    ///
    /// assert_eq!(HashAlgorithm::Sha256.hex_len(), 64);
    /// assert_eq!(HashAlgorithm::Sha384.hex_len(), 96);
    /// assert_eq!(HashAlgorithm::Sha512.hex_len(), 128);
    /// ```
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha384 => 96,
            HashAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(Error::Validation(format!(
                "Unsupported hash algorithm '{other}'. Valid options are: sha256, sha384, sha512"
            ))),
        }
    }
}

/// Which digests to compute for every artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestConfig {
    algorithms: Vec<HashAlgorithm>,
}

impl DigestConfig {
    /// Builds a configuration from a list of algorithms.
    ///
    /// Duplicates are dropped and the list is sorted. An empty list is rejected,
    /// since a subject must carry at least one digest.
    pub fn new(mut algorithms: Vec<HashAlgorithm>) -> Result<Self> {
        algorithms.sort();
        algorithms.dedup();
        if algorithms.is_empty() {
            return Err(Error::Validation(
                "At least one hash algorithm is required".to_string(),
            ));
        }
        Ok(Self { algorithms })
    }

    pub fn algorithms(&self) -> &[HashAlgorithm] {
        &self.algorithms
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            algorithms: vec![HashAlgorithm::Sha256],
        }
    }
}

/// Hex digest of `data` with a single algorithm.
///
/// ```
/// use slsa_provenance::hash::{calculate_hash_with_algorithm, HashAlgorithm};
///
/// let hash = calculate_hash_with_algorithm(b"", &HashAlgorithm::Sha256);
/// assert_eq!(hash, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
/// ```
pub fn calculate_hash_with_algorithm(data: &[u8], algorithm: &HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        HashAlgorithm::Sha384 => hex::encode(Sha384::digest(data)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
    }
}

/// Computes every configured digest of an in-memory buffer.
pub fn digest_bytes(data: &[u8], config: &DigestConfig) -> DigestSet {
    config
        .algorithms
        .iter()
        .map(|alg| {
            (
                alg.as_str().to_string(),
                calculate_hash_with_algorithm(data, alg),
            )
        })
        .collect()
}

/// Computes every configured digest of a stream in one pass.
///
/// Any read failure is returned as is; a partially consumed stream never
/// produces a digest.
pub fn digest_reader<R: Read>(mut reader: R, config: &DigestConfig) -> io::Result<DigestSet> {
    let mut hashers: Vec<Hasher> = config.algorithms.iter().map(Hasher::new).collect();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        for hasher in hashers.iter_mut() {
            hasher.update(&buffer[..bytes_read]);
        }
    }

    Ok(hashers
        .into_iter()
        .map(|h| (h.algorithm().as_str().to_string(), h.finalize_hex()))
        .collect())
}

/// Computes every configured digest of the file at `path`.
///
/// Symlinks are followed; callers that must not read through symlinks filter
/// them out before calling this.
///
/// # Errors
///
/// Returns [`Error::Digest`] carrying the path if the file cannot be opened or
/// fully read.
pub fn digest_file(path: &Path, config: &DigestConfig) -> Result<DigestSet> {
    let file = safe_open_file(path, true).map_err(|source| Error::Digest {
        path: path.to_path_buf(),
        source,
    })?;

    digest_reader(file, config).map_err(|source| Error::Digest {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks that `value` looks like a digest produced by `algorithm`: the right
/// length and lowercase hex only.
pub fn is_well_formed_digest(algorithm: &HashAlgorithm, value: &str) -> bool {
    value.len() == algorithm.hex_len()
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

enum Hasher {
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    fn new(algorithm: &HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => Hasher::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }

    fn algorithm(&self) -> HashAlgorithm {
        match self {
            Hasher::Sha256(_) => HashAlgorithm::Sha256,
            Hasher::Sha384(_) => HashAlgorithm::Sha384,
            Hasher::Sha512(_) => HashAlgorithm::Sha512,
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha384(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Hasher::Sha256(h) => hex::encode(h.finalize()),
            Hasher::Sha384(h) => hex::encode(h.finalize()),
            Hasher::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::utils::safe_create_file;
    use std::io::Write;
    use tempfile::tempdir;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    const ABC_SHA384: &str = "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7";
    const ABC_SHA512: &str = "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f";

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.served {
                self.served = true;
                buf[..4].copy_from_slice(b"part");
                return Ok(4);
            }
            Err(io::Error::other("disk went away"))
        }
    }

    #[test]
    fn test_hash_known_values() {
        assert_eq!(
            calculate_hash_with_algorithm(b"abc", &HashAlgorithm::Sha256),
            ABC_SHA256
        );
        assert_eq!(
            calculate_hash_with_algorithm(b"abc", &HashAlgorithm::Sha384),
            ABC_SHA384
        );
        assert_eq!(
            calculate_hash_with_algorithm(b"abc", &HashAlgorithm::Sha512),
            ABC_SHA512
        );
    }

    #[test]
    fn test_default_config_is_sha256_only() {
        let digests = digest_bytes(b"abc", &DigestConfig::default());

        assert_eq!(digests.len(), 1);
        assert_eq!(digests["sha256"], ABC_SHA256);
    }

    #[test]
    fn test_digest_config_dedupes_and_rejects_empty() {
        let config = DigestConfig::new(vec![
            HashAlgorithm::Sha512,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha512,
        ])
        .unwrap();
        assert_eq!(
            config.algorithms(),
            &[HashAlgorithm::Sha256, HashAlgorithm::Sha512]
        );

        assert!(matches!(
            DigestConfig::new(vec![]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_digest_reader_matches_digest_bytes() -> Result<()> {
        let config = DigestConfig::new(vec![
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ])?;

        // Larger than the read buffer so the stream is consumed in several chunks
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let streamed = digest_reader(data.as_slice(), &config)?;

        assert_eq!(streamed, digest_bytes(&data, &config));
        for alg in config.algorithms() {
            assert!(is_well_formed_digest(alg, &streamed[alg.as_str()]));
        }
        Ok(())
    }

    #[test]
    fn test_digest_reader_fails_on_read_error() {
        let result = digest_reader(FailingReader { served: false }, &DigestConfig::default());

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "disk went away");
    }

    #[test]
    fn test_digest_file() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("out.bin");

        let mut file = safe_create_file(&file_path, false)?;
        file.write_all(b"abc")?;
        drop(file);

        let digests = digest_file(&file_path, &DigestConfig::default())?;
        assert_eq!(digests["sha256"], ABC_SHA256);

        Ok(())
    }

    #[test]
    fn test_digest_file_missing_is_digest_error() {
        let result = digest_file(
            Path::new("/this/path/should/not/exist/test.txt"),
            &DigestConfig::default(),
        );

        match result {
            Err(Error::Digest { path, source }) => {
                assert!(path.ends_with("test.txt"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            Err(e) => panic!("Expected Digest error, got: {:?}", e),
            Ok(_) => panic!("Expected error for non-existent file"),
        }
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(
            "sha384".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha384
        );
        assert!("sha1".parse::<HashAlgorithm>().is_err());
        assert!("SHA256".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_is_well_formed_digest() {
        assert!(is_well_formed_digest(&HashAlgorithm::Sha256, ABC_SHA256));
        assert!(!is_well_formed_digest(
            &HashAlgorithm::Sha256,
            &ABC_SHA256.to_uppercase()
        ));
        assert!(!is_well_formed_digest(&HashAlgorithm::Sha384, ABC_SHA256));
        assert!(!is_well_formed_digest(&HashAlgorithm::Sha256, &"g".repeat(64)));
    }
}
