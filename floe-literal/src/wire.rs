//! Byte-level representations shared with the wire format and the partition
//! hasher.
//!
//! Decimals transmit (and hash) as their minimal two's-complement big-endian
//! unscaled bytes plus a scale; UUIDs as 16 big-endian bytes; timestamps and
//! times as microsecond `i64`s; dates as day `i32`s.

use uuid::Uuid;

/// The minimal two's-complement big-endian encoding of an unscaled decimal
/// value: the shortest byte string that still carries the sign bit.
pub fn decimal_unscaled_bytes(unscaled: i128) -> Vec<u8> {
    let bytes = unscaled.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

/// The 16 big-endian bytes of a UUID, high quad first.
pub fn uuid_bytes(uuid: &Uuid) -> [u8; 16] {
    *uuid.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_positive_values() {
        assert_eq!(decimal_unscaled_bytes(0), vec![0x00]);
        assert_eq!(decimal_unscaled_bytes(1), vec![0x01]);
        assert_eq!(decimal_unscaled_bytes(127), vec![0x7F]);
        // 128 needs a leading zero to keep the sign bit clear
        assert_eq!(decimal_unscaled_bytes(128), vec![0x00, 0x80]);
        assert_eq!(decimal_unscaled_bytes(1420), vec![0x05, 0x8C]);
    }

    #[test]
    fn minimal_negative_values() {
        assert_eq!(decimal_unscaled_bytes(-1), vec![0xFF]);
        assert_eq!(decimal_unscaled_bytes(-128), vec![0x80]);
        assert_eq!(decimal_unscaled_bytes(-129), vec![0xFF, 0x7F]);
        assert_eq!(decimal_unscaled_bytes(-1420), vec![0xFA, 0x74]);
    }

    #[test]
    fn wide_values_keep_all_bytes() {
        assert_eq!(decimal_unscaled_bytes(i128::MAX).len(), 16);
        assert_eq!(decimal_unscaled_bytes(i128::MIN).len(), 16);
    }

    #[test]
    fn uuid_bytes_are_big_endian() {
        let uuid = Uuid::parse_str("f79c3e09-677c-4bbd-a479-3f349cb785e7").unwrap();
        let bytes = uuid_bytes(&uuid);
        assert_eq!(bytes[0], 0xF7);
        assert_eq!(bytes[15], 0xE7);
    }
}
