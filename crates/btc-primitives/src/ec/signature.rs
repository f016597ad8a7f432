//! ECDSA signature values and their DER encoding.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::ec::secp256k1::curve_order;
use crate::PrimitivesError;

/// An ECDSA signature `(r, s)`.
///
/// Both components are validated to lie in `[1, N)` on construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    /// Create a signature from its components.
    ///
    /// # Arguments
    /// * `r` - The x coordinate of the nonce point, reduced mod N.
    /// * `s` - The proof scalar.
    ///
    /// # Returns
    /// The signature, or `InvalidSignature` if either value is zero or not
    /// below the curve order.
    pub fn new(r: BigUint, s: BigUint) -> Result<Self, PrimitivesError> {
        let n = curve_order();
        if r.is_zero() || &r >= n {
            return Err(PrimitivesError::InvalidSignature(
                "signature R is out of range".to_string(),
            ));
        }
        if s.is_zero() || &s >= n {
            return Err(PrimitivesError::InvalidSignature(
                "signature S is out of range".to_string(),
            ));
        }
        Ok(Signature { r, s })
    }

    /// The R component.
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    /// The S component.
    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Serialize in DER format.
    ///
    /// Output format: `0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>`, with
    /// each integer minimal and prefixed by `0x00` when its high bit is set.
    /// The values are written exactly as stored.
    pub fn der(&self) -> Vec<u8> {
        let rb = canonicalize_int(&self.r);
        let sb = canonicalize_int(&self.s);

        let total_len = 6 + rb.len() + sb.len();
        let mut out = Vec::with_capacity(total_len);
        out.push(0x30);
        out.push((total_len - 2) as u8);
        out.push(0x02);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(0x02);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// Parse a DER-encoded signature.
    ///
    /// The input must be exactly one DER sequence; a trailing sighash byte
    /// has to be stripped by the caller.
    ///
    /// # Arguments
    /// * `bytes` - DER-encoded signature bytes.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error naming the malformed field.
    pub fn parse_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let malformed = |what: &str| {
            PrimitivesError::InvalidSignature(format!("malformed signature: {}", what))
        };

        if bytes.len() < 8 {
            return Err(malformed("too short"));
        }
        if bytes[0] != 0x30 {
            return Err(malformed("no header magic"));
        }
        if bytes[1] as usize + 2 != bytes.len() {
            return Err(malformed("bad length"));
        }

        let (r, rest) = read_der_int(&bytes[2..]).map_err(|e| malformed(&format!("{} R", e)))?;
        let (s, rest) = read_der_int(rest).map_err(|e| malformed(&format!("{} S", e)))?;
        if !rest.is_empty() {
            return Err(malformed("trailing bytes after S"));
        }

        Signature::new(BigUint::from_bytes_be(r), BigUint::from_bytes_be(s))
    }
}

/// Read one `0x02 <len> <bytes>` element, returning the integer bytes and
/// whatever follows.
fn read_der_int(data: &[u8]) -> Result<(&[u8], &[u8]), &'static str> {
    match data.first() {
        Some(0x02) => {}
        _ => return Err("missing int marker for"),
    }
    let len = *data.get(1).ok_or("missing length for")? as usize;
    if len == 0 || 2 + len > data.len() {
        return Err("bogus length for");
    }
    Ok((&data[2..2 + len], &data[2 + len..]))
}

/// Minimal big-endian encoding of a positive integer, padded with `0x00`
/// when the high bit would otherwise read as a sign.
fn canonicalize_int(n: &BigUint) -> Vec<u8> {
    let mut b = n.to_bytes_be();
    if b[0] & 0x80 != 0 {
        b.insert(0, 0x00);
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_int(s: &str) -> BigUint {
        BigUint::parse_bytes(s.as_bytes(), 16).unwrap()
    }

    const KNOWN_DER: &str = "3045022100ed81ff192e75a3fd2304004dcadb746fa5e24c5031ccfcf21320b0277457c98f02207a986d955c6e0cb35d446a89d3f56100f4d7f67801c31967743a9c8e10615bed";

    #[test]
    fn test_parse_known_der() {
        let sig = Signature::parse_der(&hex::decode(KNOWN_DER).unwrap()).unwrap();
        assert_eq!(
            sig.r(),
            &hex_int("ed81ff192e75a3fd2304004dcadb746fa5e24c5031ccfcf21320b0277457c98f")
        );
        assert_eq!(
            sig.s(),
            &hex_int("7a986d955c6e0cb35d446a89d3f56100f4d7f67801c31967743a9c8e10615bed")
        );
        assert_eq!(hex::encode(sig.der()), KNOWN_DER);
    }

    #[test]
    fn test_der_pads_high_bit_and_strips_leading_zeros() {
        let sig = Signature::new(BigUint::from(0x80u32), BigUint::from(0x01u32)).unwrap();
        assert_eq!(hex::encode(sig.der()), "300702020080020101");
    }

    #[test]
    fn test_parse_der_errors() {
        let good = hex::decode(KNOWN_DER).unwrap();

        let mut bad = good.clone();
        bad[0] = 0x31;
        let err = Signature::parse_der(&bad).unwrap_err();
        assert!(err.to_string().contains("no header magic"));

        let mut bad = good.clone();
        bad[1] += 1;
        assert!(Signature::parse_der(&bad).unwrap_err().to_string().contains("bad length"));

        let mut bad = good.clone();
        bad.push(0x01);
        assert!(Signature::parse_der(&bad).is_err());

        let mut bad = good.clone();
        bad[2] = 0x03;
        assert!(Signature::parse_der(&bad).unwrap_err().to_string().contains("int marker"));

        assert!(Signature::parse_der(&[0x30, 0x00]).is_err());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Signature::new(BigUint::zero(), BigUint::from(1u32)).is_err());
        assert!(Signature::new(BigUint::from(1u32), curve_order().clone()).is_err());
    }
}
