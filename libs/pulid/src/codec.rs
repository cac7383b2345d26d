//! Order-preserving base-32 codec for the embedded 16-byte ULID.
//!
//! Uses Crockford's alphabet without the checksum symbols. Twenty-six
//! characters carry 130 bits; the two leading bits are always zero, so a
//! valid encoding never starts with a character above `'7'`. Decoding is
//! case-insensitive, encoding is uppercase.
//!
//! The lenient decoder never fails: bytes outside the alphabet decode to
//! an unspecified but deterministic digit. Use the strict decoder when the
//! input has not been validated.

use crate::PulidError;

/// Encoding alphabet, in digit order.
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Length of the embedded ULID in bytes.
pub const ULID_LEN: usize = 16;

/// Length of the embedded ULID's text encoding.
pub const ULID_ENCODED_LEN: usize = 26;

const INVALID: u8 = 0xFF;

/// Byte to digit, `INVALID` for bytes outside the alphabet.
const DECODE: [u8; 256] = decode_table();

const fn decode_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        let c = ALPHABET[i];
        table[c as usize] = i as u8;
        table[c.to_ascii_lowercase() as usize] = i as u8;
        i += 1;
    }
    table
}

/// Encodes 16 bytes as 26 uppercase characters.
pub fn encode(bytes: &[u8; ULID_LEN]) -> [u8; ULID_ENCODED_LEN] {
    let value = u128::from_be_bytes(*bytes);
    let mut out = [0u8; ULID_ENCODED_LEN];
    for (i, slot) in out.iter_mut().rev().enumerate() {
        *slot = ALPHABET[((value >> (5 * i)) & 0x1F) as usize];
    }
    out
}

/// Decodes 26 characters without validating them.
pub fn decode_lenient(text: &[u8; ULID_ENCODED_LEN]) -> [u8; ULID_LEN] {
    text.iter()
        .fold(0u128, |acc, &c| (acc << 5) | u128::from(DECODE[c as usize] & 0x1F))
        .to_be_bytes()
}

/// Decodes 26 characters, rejecting anything outside the alphabet and any
/// value wider than 128 bits.
///
/// `InvalidCharacter::position` is relative to `text`.
pub fn decode_strict(text: &[u8; ULID_ENCODED_LEN]) -> Result<[u8; ULID_LEN], PulidError> {
    let mut value = 0u128;
    for (position, &byte) in text.iter().enumerate() {
        let digit = DECODE[byte as usize];
        if digit == INVALID {
            return Err(PulidError::InvalidCharacter { position, byte });
        }
        value = (value << 5) | u128::from(digit);
    }

    if DECODE[text[0] as usize] > 7 {
        return Err(PulidError::Overflow);
    }

    Ok(value.to_be_bytes())
}

/// Returns true if `byte` belongs to the alphabet, in either case.
pub fn is_valid_char(byte: u8) -> bool {
    DECODE[byte as usize] != INVALID
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use ulid::Ulid;

    fn text(s: &str) -> [u8; ULID_ENCODED_LEN] {
        s.as_bytes().try_into().unwrap()
    }

    #[rstest]
    #[case("00000000000000000000000000", 0u128)]
    #[case("01AN4Z07BY79KA1307SR9X4MV3", 0x015549f01d7e3a66a08c07ce13d25363)]
    #[case("7ZZZZZZZZZZZZZZZZZZZZZZZZZ", u128::MAX)]
    #[case("00X3AAA4000000000000000000", 1_000_000_000_000u128 << 80)]
    fn test_known_vectors(#[case] encoded: &str, #[case] value: u128) {
        let bytes = value.to_be_bytes();
        assert_eq!(&encode(&bytes), encoded.as_bytes());
        assert_eq!(decode_strict(&text(encoded)).unwrap(), bytes);
        assert_eq!(decode_lenient(&text(encoded)), bytes);
    }

    #[test]
    fn test_matches_ulid_crate() {
        let ulid = Ulid::from_parts(1_469_918_176_385, 0x0102_0304_0506_0708_090a);
        let encoded = encode(&ulid.to_bytes());
        assert_eq!(std::str::from_utf8(&encoded).unwrap(), ulid.to_string());
        assert_eq!(decode_strict(&encoded).unwrap(), ulid.to_bytes());
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        let upper = decode_strict(&text("01AN4Z07BY79KA1307SR9X4MV3")).unwrap();
        let lower = decode_strict(&text("01an4z07by79ka1307sr9x4mv3")).unwrap();
        assert_eq!(upper, lower);
        assert_eq!(decode_lenient(&text("01an4z07by79ka1307sr9x4mv3")), upper);
    }

    #[rstest]
    #[case("I1AN4Z07BY79KA1307SR9X4MV3", 0, b'I')]
    #[case("01AN4Z07BY79KA1307SR9X4MVL", 25, b'L')]
    #[case("01AN4Z07BY79KA13O7SR9X4MV3", 16, b'O')]
    #[case("01AN4Z07BYu9KA1307SR9X4MV3", 10, b'u')]
    #[case("01AN4Z07BY79KA1307SR9X4M-3", 24, b'-')]
    fn test_strict_rejects_invalid(
        #[case] encoded: &str,
        #[case] position: usize,
        #[case] byte: u8,
    ) {
        assert_eq!(
            decode_strict(&text(encoded)),
            Err(PulidError::InvalidCharacter { position, byte })
        );
    }

    #[test]
    fn test_strict_rejects_non_ascii() {
        let mut input = text("01AN4Z07BY79KA1307SR9X4MV3");
        input[3] = 0xC3;
        assert_eq!(
            decode_strict(&input),
            Err(PulidError::InvalidCharacter {
                position: 3,
                byte: 0xC3
            })
        );
    }

    #[rstest]
    #[case("80000000000000000000000000")]
    #[case("ZZZZZZZZZZZZZZZZZZZZZZZZZZ")]
    fn test_strict_rejects_overflow(#[case] encoded: &str) {
        assert_eq!(decode_strict(&text(encoded)), Err(PulidError::Overflow));
    }

    #[test]
    fn test_lenient_accepts_garbage() {
        let a = decode_lenient(&text("!!!!!!!!!!!!!!!!!!!!!!!!!!"));
        let b = decode_lenient(&text("!!!!!!!!!!!!!!!!!!!!!!!!!!"));
        assert_eq!(a, b);
        // Overflowing leading bits are dropped rather than reported.
        assert_eq!(decode_lenient(&text("ZZZZZZZZZZZZZZZZZZZZZZZZZZ")), [0xFF; 16]);
    }

    #[test]
    fn test_encoding_preserves_order() {
        let mut values = [0u128, 1, 31, 32, 1 << 80, u128::MAX >> 1, u128::MAX];
        values.sort();
        let encoded: Vec<_> = values.iter().map(|v| encode(&v.to_be_bytes())).collect();
        assert!(encoded.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_is_valid_char() {
        assert!(is_valid_char(b'0'));
        assert!(is_valid_char(b'z'));
        assert!(!is_valid_char(b'U'));
        assert!(!is_valid_char(b' '));
    }
}
