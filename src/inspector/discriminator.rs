//! Cheap binary vs text discrimination
//!
//! A NUL byte anywhere means binary. Otherwise the object is binary when more
//! than 30% of its bytes fall outside printable ASCII and common whitespace
//! (tab, LF, VT, FF, CR). Bytes ≥ 127 count as non-text, so UTF-8 heavy text
//! in non-Latin scripts can land on the binary side; the decompression probe
//! and the declared content type are the other signals.

/// Share of non-text bytes above which an object is treated as binary
pub const NON_TEXT_RATIO_THRESHOLD: f64 = 0.3;

#[inline]
fn is_non_text(b: u8) -> bool {
    b < 9 || (b > 13 && b < 32) || b > 126
}

/// Decide whether `data` looks binary. Scans the whole buffer.
pub fn is_binary(data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }

    let mut non_text = 0usize;
    for &b in data {
        if b == 0 {
            return true;
        }
        if is_non_text(b) {
            non_text += 1;
        }
    }

    non_text as f64 / data.len() as f64 > NON_TEXT_RATIO_THRESHOLD
}
