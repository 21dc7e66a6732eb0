//! Content hashes and the raw byte sample
//!
//! Every inspected object gets the same fixed set of digests over its full
//! body plus a short raw sample of its first bytes. Neither depends on what
//! the object turns out to be, so both are computed before classification.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use blake2::Blake2b512;
use md5::Md5;
use serde::Serialize;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

/// Number of leading bytes captured in the raw sample
pub const BYTE_SAMPLE_LEN: usize = 64;

/// Hex digests of the full object body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashDigestSet {
    pub sha256: String,
    pub sha512: String,
    pub blake2b512: String,
    pub sha1: String,
    pub md5: String,
}

impl HashDigestSet {
    pub fn compute(data: &[u8]) -> Self {
        Self {
            sha256: hex::encode(Sha256::digest(data)),
            sha512: hex::encode(Sha512::digest(data)),
            blake2b512: hex::encode(Blake2b512::digest(data)),
            sha1: hex::encode(Sha1::digest(data)),
            md5: hex::encode(Md5::digest(data)),
        }
    }
}

/// First bytes of the object, hex and base64 encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ByteSample {
    pub hex: String,
    pub base64: String,
    /// Number of bytes actually sampled (≤ 64)
    pub length: usize,
}

impl ByteSample {
    pub fn capture(data: &[u8]) -> Self {
        let sample = &data[..data.len().min(BYTE_SAMPLE_LEN)];
        Self {
            hex: hex::encode(sample),
            base64: STANDARD.encode(sample),
            length: sample.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // DIGEST TESTS
    // ==========================================================================
    //
    // Known-answer vectors for the empty input and "abc". These pin the
    // algorithm selection as much as the encoding: a swapped field would show
    // up immediately.
    // ==========================================================================

    #[test]
    fn test_empty_input_digests() {
        let hashes = HashDigestSet::compute(b"");

        assert_eq!(
            hashes.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hashes.sha1, "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(hashes.md5, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(hashes.sha512.len(), 128);
        assert_eq!(hashes.blake2b512.len(), 128);
    }

    #[test]
    fn test_abc_digests() {
        let hashes = HashDigestSet::compute(b"abc");

        assert_eq!(
            hashes.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hashes.sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(hashes.md5, "900150983cd24fb0d6963f7d28e17f72");
        assert!(hashes.sha512.starts_with("ddaf35a193617aba"));
        assert!(hashes.blake2b512.starts_with("ba80a53f981c4d0d"));
    }

    // ==========================================================================
    // BYTE SAMPLE TESTS
    // ==========================================================================

    #[test]
    fn test_sample_of_short_input() {
        let sample = ByteSample::capture(b"hi!");

        assert_eq!(sample.hex, "686921");
        assert_eq!(sample.base64, "aGkh");
        assert_eq!(sample.length, 3);
    }

    #[test]
    fn test_sample_is_capped_at_64_bytes() {
        let data = vec![0xABu8; 1000];
        let sample = ByteSample::capture(&data);

        assert_eq!(sample.length, 64);
        assert_eq!(sample.hex.len(), 128);
        assert!(sample.hex.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn test_empty_sample() {
        let sample = ByteSample::capture(&[]);

        assert_eq!(sample.length, 0);
        assert!(sample.hex.is_empty());
        assert!(sample.base64.is_empty());
    }
}
