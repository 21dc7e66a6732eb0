//! Compressibility probe
//!
//! Deflates the whole object once (zlib framing, default level) and reports
//! `compressed / original`. Random-looking data that still shrinks is more
//! likely a weakly compressed payload than ciphertext; ciphertext stays at or
//! slightly above 1.0 because of framing overhead.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{self, Write};

/// Compression ratio of the full buffer, or `None` when it can't be measured.
pub fn compression_ratio(data: &[u8]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }

    match deflate_len(data) {
        Ok(0) => None,
        Ok(compressed) => Some(compressed as f64 / data.len() as f64),
        Err(e) => {
            tracing::warn!(error = %e, "compression ratio check failed");
            None
        }
    }
}

fn deflate_len(data: &[u8]) -> io::Result<usize> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    #[test]
    fn test_empty_has_no_ratio() {
        assert_eq!(compression_ratio(&[]), None);
    }

    #[test]
    fn test_zeros_compress_well() {
        let ratio = compression_ratio(&[0u8; 10_000]).unwrap();
        assert!(ratio < 0.1, "all-zero buffer ratio {}", ratio);
    }

    #[test]
    fn test_random_bytes_do_not_compress() {
        let mut data = vec![0u8; 10_000];
        StdRng::seed_from_u64(0x5eed).fill_bytes(&mut data);

        let ratio = compression_ratio(&data).unwrap();
        assert!(ratio > 0.99, "random buffer ratio {}", ratio);
        assert!(ratio < 1.05, "random buffer ratio {}", ratio);
    }

    #[test]
    fn test_tiny_input_ratio_exceeds_one() {
        // Framing overhead dominates a single byte
        let ratio = compression_ratio(b"x").unwrap();
        assert!(ratio > 1.0);
    }
}
