//! Opcode byte values and their canonical names.
//!
//! Only the opcodes the engine can execute are named here. Any other byte
//! still parses as `Command::Opcode` but fails when executed.

/// Push an empty byte vector.
pub const OP_0: u8 = 0x00;
/// Alias of `OP_0`.
pub const OP_FALSE: u8 = OP_0;
/// Smallest direct-push length code.
pub const OP_DATA_1: u8 = 0x01;
/// Direct push of 20 bytes.
pub const OP_DATA_20: u8 = 0x14;
/// Direct push of 32 bytes.
pub const OP_DATA_32: u8 = 0x20;
/// Largest direct-push length code.
pub const OP_DATA_75: u8 = 0x4b;
/// Next byte is the push length.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// Next two bytes (little-endian) are the push length.
pub const OP_PUSHDATA2: u8 = 0x4d;
/// Push the number 1.
pub const OP_1: u8 = 0x51;
/// Alias of `OP_1`.
pub const OP_TRUE: u8 = OP_1;
pub const OP_2: u8 = 0x52;
pub const OP_3: u8 = 0x53;
pub const OP_4: u8 = 0x54;
pub const OP_5: u8 = 0x55;
pub const OP_6: u8 = 0x56;
pub const OP_7: u8 = 0x57;
pub const OP_8: u8 = 0x58;
pub const OP_9: u8 = 0x59;
pub const OP_10: u8 = 0x5a;
pub const OP_11: u8 = 0x5b;
pub const OP_12: u8 = 0x5c;
pub const OP_13: u8 = 0x5d;
pub const OP_14: u8 = 0x5e;
pub const OP_15: u8 = 0x5f;
/// Push the number 16.
pub const OP_16: u8 = 0x60;
/// Fail unless the top item is truthy; the item is consumed.
pub const OP_VERIFY: u8 = 0x69;
pub const OP_2DUP: u8 = 0x6e;
pub const OP_DUP: u8 = 0x76;
pub const OP_SWAP: u8 = 0x7c;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_NOT: u8 = 0x91;
pub const OP_ADD: u8 = 0x93;
pub const OP_MUL: u8 = 0x95;
pub const OP_SHA1: u8 = 0xa7;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_HASH256: u8 = 0xaa;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKMULTISIG: u8 = 0xae;

/// Name table, ordered by opcode value.
const OPCODE_NAMES: &[(u8, &str)] = &[
    (OP_0, "OP_0"),
    (OP_PUSHDATA1, "OP_PUSHDATA1"),
    (OP_PUSHDATA2, "OP_PUSHDATA2"),
    (OP_1, "OP_1"),
    (OP_2, "OP_2"),
    (OP_3, "OP_3"),
    (OP_4, "OP_4"),
    (OP_5, "OP_5"),
    (OP_6, "OP_6"),
    (OP_7, "OP_7"),
    (OP_8, "OP_8"),
    (OP_9, "OP_9"),
    (OP_10, "OP_10"),
    (OP_11, "OP_11"),
    (OP_12, "OP_12"),
    (OP_13, "OP_13"),
    (OP_14, "OP_14"),
    (OP_15, "OP_15"),
    (OP_16, "OP_16"),
    (OP_VERIFY, "OP_VERIFY"),
    (OP_2DUP, "OP_2DUP"),
    (OP_DUP, "OP_DUP"),
    (OP_SWAP, "OP_SWAP"),
    (OP_EQUAL, "OP_EQUAL"),
    (OP_EQUALVERIFY, "OP_EQUALVERIFY"),
    (OP_NOT, "OP_NOT"),
    (OP_ADD, "OP_ADD"),
    (OP_MUL, "OP_MUL"),
    (OP_SHA1, "OP_SHA1"),
    (OP_HASH160, "OP_HASH160"),
    (OP_HASH256, "OP_HASH256"),
    (OP_CHECKSIG, "OP_CHECKSIG"),
    (OP_CHECKMULTISIG, "OP_CHECKMULTISIG"),
];

/// Canonical name of an opcode, if the engine knows it.
pub fn opcode_name(op: u8) -> Option<&'static str> {
    OPCODE_NAMES
        .binary_search_by_key(&op, |&(code, _)| code)
        .ok()
        .map(|i| OPCODE_NAMES[i].1)
}

/// Look up an opcode by name. `OP_FALSE` and `OP_TRUE` are accepted as aliases.
pub fn opcode_from_name(name: &str) -> Option<u8> {
    match name {
        "OP_FALSE" => Some(OP_FALSE),
        "OP_TRUE" => Some(OP_TRUE),
        _ => OPCODE_NAMES
            .iter()
            .find(|&&(_, n)| n == name)
            .map(|&(code, _)| code),
    }
}

/// Value pushed by `OP_0` and `OP_1`..`OP_16`.
pub fn small_int_value(op: u8) -> Option<u8> {
    match op {
        OP_0 => Some(0),
        OP_1..=OP_16 => Some(op - OP_1 + 1),
        _ => None,
    }
}

/// Opcode that pushes `n` for `n` in `0..=16`.
pub fn small_int_opcode(n: u8) -> Option<u8> {
    match n {
        0 => Some(OP_0),
        1..=16 => Some(OP_1 + n - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_table_is_sorted() {
        assert!(OPCODE_NAMES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_name_lookup_roundtrip() {
        for &(code, name) in OPCODE_NAMES {
            assert_eq!(opcode_name(code), Some(name));
            assert_eq!(opcode_from_name(name), Some(code));
        }
        assert_eq!(opcode_name(0xba), None);
        assert_eq!(opcode_from_name("OP_TRUE"), Some(OP_1));
        assert_eq!(opcode_from_name("OP_NOPE"), None);
    }

    #[test]
    fn test_small_ints() {
        assert_eq!(small_int_value(OP_0), Some(0));
        assert_eq!(small_int_value(OP_16), Some(16));
        assert_eq!(small_int_value(OP_DUP), None);
        assert_eq!(small_int_opcode(2), Some(OP_2));
        assert_eq!(small_int_opcode(17), None);
    }
}
