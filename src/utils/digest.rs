//! Content digests for bundle file names.
//!
//! A bundle is named after the digest of its final bytes, encoded as
//! URL-safe base64 without padding, so identical content always lands on
//! the same file name.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::digest::{DigestAlgorithm, DigestWriter, checksum_name};
//!
//! let mut writer = DigestWriter::new(file, DigestAlgorithm::Md5);
//! writer.write_all(b"body{}")?;
//! let (file, digest) = writer.finish();
//! let name = format!("{}.aggr.min.css", checksum_name(&digest));
//! ```

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Digest as _;

/// Hash algorithm used to name bundles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    #[default]
    Md5,
    Sha256,
    Sha512,
    Blake3,
}

impl DigestAlgorithm {
    pub const ALL: [Self; 4] = [Self::Md5, Self::Sha256, Self::Sha512, Self::Blake3];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Blake3 => "blake3",
        }
    }

    /// Start a fresh accumulator.
    pub fn hasher(self) -> Hasher {
        match self {
            Self::Md5 => Hasher::Md5(md5::Context::new()),
            Self::Sha256 => Hasher::Sha256(sha2::Sha256::new()),
            Self::Sha512 => Hasher::Sha512(sha2::Sha512::new()),
            Self::Blake3 => Hasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    /// One-shot digest of `data`.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        let mut hasher = self.hasher();
        hasher.update(data);
        hasher.finalize()
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized digest algorithm name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown digest algorithm `{0}` (expected one of: md5, sha256, sha512, blake3)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for DigestAlgorithm {
    type Err = UnknownAlgorithm;

    /// Case-insensitive; `-` and `_` are ignored (`SHA-256`, `sha_512`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == key)
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

impl Serialize for DigestAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for DigestAlgorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Running digest state for one of the supported algorithms.
pub enum Hasher {
    Md5(md5::Context),
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl Hasher {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(ctx) => ctx.consume(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self {
            Self::Md5(ctx) => ctx.compute().0.to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha512(h) => h.finalize().to_vec(),
            Self::Blake3(h) => h.finalize().as_bytes().to_vec(),
        }
    }
}

/// Byte sink that forwards to `W` and digests everything written.
pub struct DigestWriter<W> {
    inner: W,
    hasher: Hasher,
}

impl<W: Write> DigestWriter<W> {
    pub fn new(inner: W, algorithm: DigestAlgorithm) -> Self {
        Self {
            inner,
            hasher: algorithm.hasher(),
        }
    }

    /// Return the inner sink and the digest of every byte written.
    pub fn finish(self) -> (W, Vec<u8>) {
        (self.inner, self.hasher.finalize())
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// File-name-safe encoding of a digest.
#[inline]
pub fn checksum_name(digest: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_of_empty_input() {
        let digest = DigestAlgorithm::Md5.digest(b"");
        assert_eq!(checksum_name(&digest), "1B2M2Y8AsgTpgAmY7PhCfg");
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(DigestAlgorithm::Md5.digest(b"x").len(), 16);
        assert_eq!(DigestAlgorithm::Sha256.digest(b"x").len(), 32);
        assert_eq!(DigestAlgorithm::Sha512.digest(b"x").len(), 64);
        assert_eq!(DigestAlgorithm::Blake3.digest(b"x").len(), 32);
    }

    #[test]
    fn test_checksum_is_file_safe() {
        for alg in DigestAlgorithm::ALL {
            let name = checksum_name(&alg.digest(b"some bundle content"));
            assert!(!name.contains(['/', '+', '=']), "{alg}: {name}");
        }
    }

    #[test]
    fn test_writer_matches_one_shot() {
        let mut writer = DigestWriter::new(Vec::new(), DigestAlgorithm::Sha256);
        writer.write_all(b"hello ").unwrap();
        writer.write_all(b"world").unwrap();
        let (bytes, digest) = writer.finish();

        assert_eq!(bytes, b"hello world");
        assert_eq!(digest, DigestAlgorithm::Sha256.digest(b"hello world"));
    }

    #[test]
    fn test_single_byte_changes_digest() {
        let a = DigestAlgorithm::Md5.digest(b"a{color:red}");
        let b = DigestAlgorithm::Md5.digest(b"a{color:rad}");
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_algorithm_names() {
        assert_eq!("MD5".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Md5));
        assert_eq!("sha-256".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Sha256));
        assert_eq!("SHA_512".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Sha512));
        assert_eq!("blake3".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Blake3));
        assert!("crc32".parse::<DigestAlgorithm>().is_err());
    }

    #[test]
    fn test_algorithm_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            digest: DigestAlgorithm,
        }

        let w: Wrapper = toml::from_str(r#"digest = "Sha-512""#).unwrap();
        assert_eq!(w.digest, DigestAlgorithm::Sha512);
        assert!(toml::from_str::<Wrapper>(r#"digest = "nope""#).is_err());
    }
}
