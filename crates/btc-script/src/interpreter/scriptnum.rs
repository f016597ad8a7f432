//! Script number encoding.
//!
//! Numbers on the script stack are little-endian byte arrays with the sign
//! carried in the most significant bit of the last byte. Numeric opcodes
//! accept only minimally encoded operands no longer than the configured
//! maximum (4 bytes by default), but their results may grow past that and
//! stay valid as long as they are not read back as numbers.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use super::error::{ExecutionError, ExecutionErrorCode};

/// A script number using big integer arithmetic for overflow safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptNumber {
    /// The numeric value stored as a big integer.
    pub val: BigInt,
}

impl ScriptNumber {
    /// Create a new ScriptNumber from an i64 value.
    pub fn new(val: i64) -> Self {
        ScriptNumber {
            val: BigInt::from(val),
        }
    }

    /// Parse a stack item as a number.
    ///
    /// # Arguments
    /// * `bb` - The stack item.
    /// * `max_len` - The longest encoding accepted, in bytes.
    ///
    /// # Returns
    /// The number, `NumberTooBig` if the item is longer than `max_len`, or
    /// `MinimalData` if it carries redundant trailing bytes.
    pub fn from_bytes(bb: &[u8], max_len: usize) -> Result<Self, ExecutionError> {
        if bb.len() > max_len {
            return Err(ExecutionError::new(
                ExecutionErrorCode::NumberTooBig,
                format!(
                    "numeric value encoded as {:02x?} is {} bytes which exceeds the max allowed of {}",
                    bb,
                    bb.len(),
                    max_len
                ),
            ));
        }
        check_minimal_data_encoding(bb)?;

        if bb.is_empty() {
            return Ok(ScriptNumber { val: BigInt::zero() });
        }

        let mut v = BigInt::zero();
        for (i, &b) in bb.iter().enumerate() {
            v |= BigInt::from(b) << (8 * i);
        }

        // Sign bit set: clear it and negate.
        if bb[bb.len() - 1] & 0x80 != 0 {
            let mask = !(BigInt::from(0x80_i64) << (8 * (bb.len() - 1)));
            v &= mask;
            v = -v;
        }

        Ok(ScriptNumber { val: v })
    }

    /// Serialize the number to bytes in little-endian with sign bit.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.val.is_zero() {
            return vec![];
        }

        let is_negative = self.val.is_negative();
        let (_, mut result) = self.val.abs().to_bytes_le();

        if result[result.len() - 1] & 0x80 != 0 {
            result.push(if is_negative { 0x80 } else { 0x00 });
        } else if is_negative {
            let last = result.len() - 1;
            result[last] |= 0x80;
        }

        result
    }

    /// Add another script number to this one and return self for chaining.
    pub fn add(&mut self, other: &ScriptNumber) -> &mut Self {
        self.val = &self.val + &other.val;
        self
    }

    /// Multiply this script number by another and return self for chaining.
    pub fn mul(&mut self, other: &ScriptNumber) -> &mut Self {
        self.val = &self.val * &other.val;
        self
    }

    /// Return true if this number is zero.
    pub fn is_zero(&self) -> bool {
        self.val.is_zero()
    }

    /// Convert to i64, clamping on overflow.
    pub fn to_i64(&self) -> i64 {
        match self.val.to_i64() {
            Some(v) => v,
            None if self.val.is_positive() => i64::MAX,
            None => i64::MIN,
        }
    }
}

/// Encode an integer the way it would sit on the stack.
pub fn encode_num(n: i64) -> Vec<u8> {
    ScriptNumber::new(n).to_bytes()
}

/// Check that a byte array uses minimal data encoding.
pub fn check_minimal_data_encoding(v: &[u8]) -> Result<(), ExecutionError> {
    if v.is_empty() {
        return Ok(());
    }

    // The last byte may only be 0x00 or 0x80 when it is needed to hold the
    // sign bit of the byte before it.
    if v[v.len() - 1] & 0x7f == 0 && (v.len() == 1 || v[v.len() - 2] & 0x80 == 0) {
        return Err(ExecutionError::new(
            ExecutionErrorCode::MinimalData,
            format!("numeric value encoded as {:02x?} is not minimally encoded", v),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_to_bytes(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn test_script_num_bytes() {
        let tests: Vec<(i64, &str)> = vec![
            (0, ""),
            (1, "01"),
            (-1, "81"),
            (127, "7f"),
            (-127, "ff"),
            (128, "8000"),
            (-128, "8080"),
            (129, "8100"),
            (-129, "8180"),
            (256, "0001"),
            (-256, "0081"),
            (32767, "ff7f"),
            (-32767, "ffff"),
            (32768, "008000"),
            (-32768, "008080"),
            (2147483647, "ffffff7f"),
            (-2147483647, "ffffffff"),
            // Results may exceed four bytes.
            (2147483648, "0000008000"),
            (-2147483648, "0000008080"),
            (4294967295, "ffffffff00"),
        ];

        for (num, expected) in &tests {
            let got = ScriptNumber::new(*num).to_bytes();
            assert_eq!(got, hex_to_bytes(expected), "num={}", num);
        }
    }

    #[test]
    fn test_from_bytes() {
        let ok: Vec<(&str, i64)> = vec![
            ("", 0),
            ("01", 1),
            ("81", -1),
            ("8000", 128),
            ("8080", -128),
            ("ffffff7f", 2147483647),
            ("ffffffff", -2147483647),
        ];
        for (hex_str, want) in ok {
            let n = ScriptNumber::from_bytes(&hex_to_bytes(hex_str), 4).unwrap();
            assert_eq!(n.to_i64(), want, "from_bytes({})", hex_str);
        }

        for (hex_str, code) in [
            ("80", ExecutionErrorCode::MinimalData),
            ("00", ExecutionErrorCode::MinimalData),
            ("0100", ExecutionErrorCode::MinimalData),
            ("0000008000", ExecutionErrorCode::NumberTooBig),
        ] {
            let err = ScriptNumber::from_bytes(&hex_to_bytes(hex_str), 4).unwrap_err();
            assert_eq!(err.code, code, "from_bytes({})", hex_str);
        }
    }

    #[test]
    fn test_arithmetic() {
        let mut a = ScriptNumber::new(2);
        a.add(&ScriptNumber::new(2));
        assert_eq!(a.to_bytes(), vec![4]);
        a.mul(&ScriptNumber::new(-3));
        assert_eq!(a.to_i64(), -12);
        assert!(!a.is_zero());
    }

    #[test]
    fn test_encode_num() {
        assert_eq!(encode_num(0), Vec::<u8>::new());
        assert_eq!(encode_num(-5), vec![0x85]);
        assert_eq!(encode_num(1000), vec![0xe8, 0x03]);
    }
}
