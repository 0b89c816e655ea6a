// src/tracker/bcd.rs
//! Hex rendering helpers for the BCD fields of tracker frames
//!
//! The tracker packs decimal digits into nibbles, so a byte is read by printing
//! it as two hexadecimal digits and treating those characters as decimal
//! digits: `0x41` is "41", not 65.

use crate::error::DecodeError;

/// Render bytes as one lowercase hex string, e.g. `[0x41, 0x09]` -> "4109"
pub fn hex_string(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Render bytes as a colon separated hex dump, e.g. "24:41:09"
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<_>>()
        .join(":")
}

/// Read a run of hex-rendered characters as a decimal number
pub fn decimal_digits(field: &'static str, text: &str) -> Result<u32, DecodeError> {
    if text.is_empty() || !text.bytes().all(|c| c.is_ascii_digit()) {
        return Err(DecodeError::MalformedDigit {
            field,
            text: text.to_string(),
        });
    }

    text.parse::<u32>().map_err(|_| DecodeError::MalformedDigit {
        field,
        text: text.to_string(),
    })
}

/// Read a single byte as a two digit decimal value, e.g. `0x27` -> 27
pub fn bcd_pair(field: &'static str, byte: u8) -> Result<u32, DecodeError> {
    decimal_digits(field, &format!("{:02x}", byte))
}

/// Encode a decimal value below 100 into one BCD byte, e.g. 27 -> `0x27`
pub fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_string_is_lowercase_and_padded() {
        assert_eq!(hex_string(&[0x41, 0x09, 0xfa]), "4109fa");
        assert_eq!(hex_string(&[]), "");
    }

    #[test]
    fn test_hex_dump() {
        assert_eq!(hex_dump(&[0x24, 0x41, 0x0e]), "24:41:0e");
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn test_bcd_pair_reads_hex_digits_as_decimal() {
        assert_eq!(bcd_pair("hour", 0x41), Ok(41));
        assert_eq!(bcd_pair("hour", 0x09), Ok(9));
        assert_eq!(bcd_pair("hour", 0x00), Ok(0));
    }

    #[test]
    fn test_bcd_pair_rejects_hex_nibbles() {
        let err = bcd_pair("day", 0xfa).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedDigit {
                field: "day",
                text: "fa".to_string()
            }
        );
        assert!(bcd_pair("day", 0x1b).is_err());
    }

    #[test]
    fn test_decimal_digits_rejects_signs_and_empty() {
        assert!(decimal_digits("latitude", "").is_err());
        assert!(decimal_digits("latitude", "+5").is_err());
        assert_eq!(decimal_digits("longitude", "003"), Ok(3));
    }

    #[test]
    fn test_to_bcd() {
        assert_eq!(to_bcd(27), 0x27);
        assert_eq!(to_bcd(9), 0x09);
        assert_eq!(to_bcd(99), 0x99);
    }
}
