//! Blob id encoding
//!
//! Stores address blobs by a 32-byte id, shown to users as unpadded base64url.
//! On-chain events carry the same id as a 256-bit unsigned integer built from
//! the bytes in little-endian order, usually printed in decimal. These helpers
//! convert between the two so a blob id can be matched against indexed
//! events.

use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

pub const BLOB_ID_LEN: usize = 32;

/// Base64url blob id (padding optional) to its decimal integer form
pub fn to_decimal(blob_id: &str) -> Result<String> {
    let trimmed = blob_id.trim().trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|e| Error::InvalidBlobId(format!("{}: {}", blob_id, e)))?;

    if bytes.len() != BLOB_ID_LEN {
        return Err(Error::InvalidBlobId(format!(
            "expected {} byte blob id, got {}",
            BLOB_ID_LEN,
            bytes.len()
        )));
    }

    // Little-endian on the wire, most significant byte first for division
    let mut be: Vec<u8> = bytes.into_iter().rev().collect();
    Ok(be_bytes_to_decimal(&mut be))
}

/// Decimal integer form back to the unpadded base64url blob id
pub fn from_decimal(decimal: &str) -> Result<String> {
    let decimal = decimal.trim();
    if decimal.is_empty() || !decimal.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidBlobId(format!("not a decimal integer: {:?}", decimal)));
    }

    let mut le = [0u8; BLOB_ID_LEN];
    for digit in decimal.bytes().map(|b| (b - b'0') as u32) {
        // le = le * 10 + digit
        let mut carry = digit;
        for byte in le.iter_mut() {
            let v = *byte as u32 * 10 + carry;
            *byte = (v & 0xFF) as u8;
            carry = v >> 8;
        }
        if carry != 0 {
            return Err(Error::InvalidBlobId(format!(
                "{} does not fit in {} bytes",
                decimal, BLOB_ID_LEN
            )));
        }
    }

    Ok(URL_SAFE_NO_PAD.encode(le))
}

/// Destructive long division by 10 over a big-endian byte string
fn be_bytes_to_decimal(be: &mut [u8]) -> String {
    let mut digits = Vec::new();
    while be.iter().any(|&b| b != 0) {
        let mut remainder = 0u32;
        for byte in be.iter_mut() {
            let acc = (remainder << 8) | *byte as u32;
            *byte = (acc / 10) as u8;
            remainder = acc % 10;
        }
        digits.push(b'0' + remainder as u8);
    }

    if digits.is_empty() {
        return "0".to_string();
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_from_le(bytes: [u8; 32]) -> String {
        URL_SAFE_NO_PAD.encode(bytes)
    }

    #[test]
    fn test_zero_id() {
        assert_eq!(to_decimal(&id_from_le([0u8; 32])).unwrap(), "0");
    }

    #[test]
    fn test_little_endian_order() {
        let mut le = [0u8; 32];
        le[0] = 1;
        assert_eq!(to_decimal(&id_from_le(le)).unwrap(), "1");

        let mut le = [0u8; 32];
        le[1] = 1;
        assert_eq!(to_decimal(&id_from_le(le)).unwrap(), "256");

        let mut le = [0u8; 32];
        le[0] = 0x39;
        le[1] = 0x30;
        assert_eq!(to_decimal(&id_from_le(le)).unwrap(), "12345");
    }

    #[test]
    fn test_max_id() {
        assert_eq!(
            to_decimal(&id_from_le([0xFF; 32])).unwrap(),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
    }

    #[test]
    fn test_padding_and_whitespace_accepted() {
        let id = id_from_le([7u8; 32]);
        let padded = format!("  {}=\n", id);
        assert_eq!(to_decimal(&padded).unwrap(), to_decimal(&id).unwrap());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let short = URL_SAFE_NO_PAD.encode([1u8; 16]);
        assert!(matches!(to_decimal(&short), Err(Error::InvalidBlobId(_))));
    }

    #[test]
    fn test_bad_alphabet_rejected() {
        assert!(to_decimal("not+base64url/at*all").is_err());
    }

    #[test]
    fn test_reverse_conversion() {
        let mut le = [0u8; 32];
        for (i, b) in le.iter_mut().enumerate() {
            *b = (i * 7 + 3) as u8;
        }
        let id = id_from_le(le);
        let decimal = to_decimal(&id).unwrap();

        assert_eq!(from_decimal(&decimal).unwrap(), id);
        assert_eq!(from_decimal("0").unwrap(), id_from_le([0u8; 32]));
    }

    #[test]
    fn test_reverse_rejects_bad_input() {
        assert!(from_decimal("").is_err());
        assert!(from_decimal("12a3").is_err());
        assert!(from_decimal("-5").is_err());
        // 2^256 overflows
        assert!(from_decimal(
            "115792089237316195423570985008687907853269984665640564039457584007913129639936"
        )
        .is_err());
    }
}
