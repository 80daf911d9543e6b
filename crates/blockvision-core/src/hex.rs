//! Hex-string validation and block-identifier classification.

/// Returns `true` if `value` is `0x` followed by one or more hex digits.
pub fn is_hex_string(value: &str) -> bool {
    let Some(digits) = value.strip_prefix("0x") else {
        return false;
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Returns `true` if `value` is a well-formed hex string of exactly
/// `bytes` bytes (`0x` + `2 * bytes` hex digits).
pub fn is_hex_string_len(value: &str, bytes: usize) -> bool {
    is_hex_string(value) && value.len() == 2 + 2 * bytes
}

/// How a block argument should be keyed on the wire.
///
/// Several RPC methods come in hash-keyed and number/tag-keyed variants
/// (`eth_getUncleCountByBlockHash` vs `eth_getUncleCountByBlockNumber`).
/// A 32-byte well-formed hex string selects the hash variant; anything else
/// (a tag like `latest`, or numeric hex of another length) selects the
/// number variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockIdentifier {
    Hash,
    NumberOrTag,
}

impl BlockIdentifier {
    /// Classify a block hash / number / tag argument.
    pub fn classify(value: &str) -> Self {
        if is_hex_string_len(value, 32) {
            Self::Hash
        } else {
            Self::NumberOrTag
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_string_shapes() {
        assert!(is_hex_string("0x0"));
        assert!(is_hex_string("0xDeadBeef"));
        assert!(!is_hex_string("deadbeef"));
        assert!(!is_hex_string("0x"));
        assert!(!is_hex_string("0xzz"));
        assert!(!is_hex_string("latest"));
    }

    #[test]
    fn fixed_length_hex() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert!(is_hex_string_len(&hash, 32));
        assert!(!is_hex_string_len("0xab", 32));
        assert!(!is_hex_string_len(&format!("0x{}", "ab".repeat(31)), 32));
    }

    #[test]
    fn classify_32_byte_hash() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(BlockIdentifier::classify(&hash), BlockIdentifier::Hash);
    }

    #[test]
    fn classify_tags_and_short_hex() {
        for value in ["latest", "earliest", "pending", "0x10d4f", "0xab"] {
            assert_eq!(
                BlockIdentifier::classify(value),
                BlockIdentifier::NumberOrTag,
                "{value}"
            );
        }
        // 31 and 33 bytes are not hashes either
        assert_eq!(
            BlockIdentifier::classify(&format!("0x{}", "ab".repeat(31))),
            BlockIdentifier::NumberOrTag
        );
        assert_eq!(
            BlockIdentifier::classify(&format!("0x{}", "ab".repeat(33))),
            BlockIdentifier::NumberOrTag
        );
    }
}
