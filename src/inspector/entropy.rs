//! Shannon entropy over a bounded prefix
//!
//! Entropy in bits per byte ranges from 0 (one byte value repeated) to 8
//! (all 256 values equally likely). Ciphertext and well-compressed data both
//! sit close to 8, so a high value is consistent with encryption but never
//! proves it. The compression probe is what separates the two.

/// Entropy of the first `min(len, cap)` bytes, in bits per byte.
///
/// Returns 0 for an empty sample.
pub fn shannon_entropy(data: &[u8], cap: usize) -> f64 {
    let sample = &data[..data.len().min(cap)];
    if sample.is_empty() {
        return 0.0;
    }

    let mut counts = [0usize; 256];
    for &b in sample {
        counts[b as usize] += 1;
    }

    let n = sample.len() as f64;
    let entropy: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum();

    // A single symbol sums to -0.0
    if entropy <= 0.0 {
        0.0
    } else {
        entropy.min(8.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DEFAULT_ENTROPY_SAMPLE_CAP;

    const CAP: usize = DEFAULT_ENTROPY_SAMPLE_CAP;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(shannon_entropy(&[], CAP), 0.0);
    }

    #[test]
    fn test_repeated_byte_is_zero() {
        assert_eq!(shannon_entropy(&[0x42; 5000], CAP), 0.0);
        assert_eq!(shannon_entropy(&[0x00; 1], CAP), 0.0);
    }

    #[test]
    fn test_two_symbols_is_one_bit() {
        let data: Vec<u8> = (0..1000).map(|i| if i % 2 == 0 { b'a' } else { b'b' }).collect();
        assert!((shannon_entropy(&data, CAP) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_bytes_is_eight_bits() {
        // Every byte value exactly once: p = 1/256 for all
        let data: Vec<u8> = (0..=255u8).collect();
        assert!((shannon_entropy(&data, CAP) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_cap_limits_sample() {
        // Uniform prefix followed by a long run of zeros
        let mut data: Vec<u8> = (0..=255u8).collect();
        data.extend(std::iter::repeat(0u8).take(100_000));

        let capped = shannon_entropy(&data, 256);
        let wide = shannon_entropy(&data, data.len());

        assert!((capped - 8.0).abs() < 1e-9);
        assert!(wide < 1.0, "zeros should dominate the full buffer, got {}", wide);
    }

    #[test]
    fn test_zero_cap_is_zero() {
        assert_eq!(shannon_entropy(b"anything", 0), 0.0);
    }
}
