//! The secp256k1 curve: `y^2 = x^3 + 7` over `p = 2^256 - 2^32 - 977`.
//!
//! `S256Point` specializes the generic `CurvePoint` to these parameters and
//! adds SEC encoding, Hash160/address derivation and ECDSA verification.

use std::fmt;
use std::sync::OnceLock;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use crate::base58;
use crate::ec::field::{FieldArithmetic, FieldElement};
use crate::ec::point::CurvePoint;
use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::network::Network;
use crate::PrimitivesError;

/// The secp256k1 field prime P.
/// P = FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F
const FIELD_PRIME: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFF, 0xFF,
    0xFC, 0x2F,
];

/// The secp256k1 group order N.
/// N = FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

const GENERATOR_X: [u8; 32] = [
    0x79, 0xBE, 0x66, 0x7E, 0xF9, 0xDC, 0xBB, 0xAC, 0x55, 0xA0, 0x62, 0x95, 0xCE, 0x87, 0x0B,
    0x07, 0x02, 0x9B, 0xFC, 0xDB, 0x2D, 0xCE, 0x28, 0xD9, 0x59, 0xF2, 0x81, 0x5B, 0x16, 0xF8,
    0x17, 0x98,
];

const GENERATOR_Y: [u8; 32] = [
    0x48, 0x3A, 0xDA, 0x77, 0x26, 0xA3, 0xC4, 0x65, 0x5D, 0xA4, 0xFB, 0xFC, 0x0E, 0x11, 0x08,
    0xA8, 0xFD, 0x17, 0xB4, 0x48, 0xA6, 0x85, 0x54, 0x19, 0x9C, 0x47, 0xD0, 0x8F, 0xFB, 0x10,
    0xD4, 0xB8,
];

struct CurveParams {
    p: BigUint,
    n: BigUint,
    a: FieldElement,
    b: FieldElement,
    g: CurvePoint<FieldElement>,
}

fn params() -> &'static CurveParams {
    static PARAMS: OnceLock<CurveParams> = OnceLock::new();
    PARAMS.get_or_init(|| {
        let p = BigUint::from_bytes_be(&FIELD_PRIME);
        let n = BigUint::from_bytes_be(&CURVE_ORDER);
        let a = FieldElement::reduced(BigUint::zero(), &p);
        let b = FieldElement::reduced(BigUint::from(7u32), &p);
        let g = CurvePoint::from_trusted(
            FieldElement::reduced(BigUint::from_bytes_be(&GENERATOR_X), &p),
            FieldElement::reduced(BigUint::from_bytes_be(&GENERATOR_Y), &p),
            a.clone(),
            b.clone(),
        );
        CurveParams { p, n, a, b, g }
    })
}

/// The field prime `p`.
pub fn field_prime() -> &'static BigUint {
    &params().p
}

/// The order `N` of the generator.
pub fn curve_order() -> &'static BigUint {
    &params().n
}

/// A point on secp256k1.
#[derive(Clone, PartialEq, Eq)]
pub struct S256Point(CurvePoint<FieldElement>);

impl S256Point {
    /// Create a point from affine coordinates.
    ///
    /// # Returns
    /// The point, or an error if a coordinate is not below `p` or the
    /// point does not satisfy `y^2 = x^3 + 7`.
    pub fn new(x: BigUint, y: BigUint) -> Result<Self, PrimitivesError> {
        let params = params();
        let x = FieldElement::new(x, params.p.clone())?;
        let y = FieldElement::new(y, params.p.clone())?;
        let point = CurvePoint::new(x, y, params.a.clone(), params.b.clone())?;
        Ok(S256Point(point))
    }

    /// The generator `G`.
    pub fn generator() -> Self {
        S256Point(params().g.clone())
    }

    /// The point at infinity.
    pub fn identity() -> Self {
        let params = params();
        S256Point(CurvePoint::identity(params.a.clone(), params.b.clone()))
    }

    /// Whether this is the point at infinity.
    pub fn is_identity(&self) -> bool {
        self.0.is_identity()
    }

    /// Affine x coordinate, `None` at infinity.
    pub fn x(&self) -> Option<&BigUint> {
        self.0.x().map(FieldElement::num)
    }

    /// Affine y coordinate, `None` at infinity.
    pub fn y(&self) -> Option<&BigUint> {
        self.0.y().map(FieldElement::num)
    }

    /// Group addition.
    pub fn add(&self, other: &Self) -> Result<Self, PrimitivesError> {
        Ok(S256Point(self.0.add(&other.0)?))
    }

    /// Scalar multiplication. The scalar is reduced modulo `N` first.
    pub fn mul(&self, k: &BigUint) -> Result<Self, PrimitivesError> {
        let k = k % curve_order();
        Ok(S256Point(self.0.scalar_mul(&k)?))
    }

    /// Scalar multiplication by a signed scalar.
    ///
    /// # Returns
    /// `NegativeScalar` for `k < 0`, otherwise the same as [`S256Point::mul`].
    pub fn mul_signed(&self, k: &BigInt) -> Result<Self, PrimitivesError> {
        if k.sign() == Sign::Minus {
            return Err(PrimitivesError::NegativeScalar);
        }
        self.mul(k.magnitude())
    }

    /// Serialize in SEC format.
    ///
    /// Compressed form is `0x02|0x03 || x` keyed on the parity of `y`,
    /// uncompressed form is `0x04 || x || y`. The point at infinity encodes
    /// as the single byte `0x00`.
    ///
    /// # Arguments
    /// * `compressed` - Select the 33-byte compressed encoding.
    ///
    /// # Returns
    /// 33 or 65 bytes (1 for infinity).
    pub fn sec(&self, compressed: bool) -> Vec<u8> {
        let (x, y) = match (self.x(), self.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => return vec![0x00],
        };
        let mut out = Vec::with_capacity(if compressed { 33 } else { 65 });
        if compressed {
            out.push(if y.bit(0) { 0x03 } else { 0x02 });
            out.extend_from_slice(&to_32_bytes(x));
        } else {
            out.push(0x04);
            out.extend_from_slice(&to_32_bytes(x));
            out.extend_from_slice(&to_32_bytes(y));
        }
        out
    }

    /// Parse a SEC-encoded public key.
    ///
    /// Compressed keys are decompressed with `y = (x^3 + 7)^((p+1)/4)`,
    /// taking `p - y` when the parity does not match the prefix.
    ///
    /// # Arguments
    /// * `bytes` - 33-byte compressed or 65-byte uncompressed SEC encoding.
    ///
    /// # Returns
    /// The decoded point, or an error for a bad prefix, length or x.
    pub fn parse_sec(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        match (bytes.first(), bytes.len()) {
            (Some(0x04), 65) => Self::new(
                BigUint::from_bytes_be(&bytes[1..33]),
                BigUint::from_bytes_be(&bytes[33..65]),
            ),
            (Some(prefix @ (0x02 | 0x03)), 33) => {
                let want_odd = *prefix == 0x03;
                Self::decompress(BigUint::from_bytes_be(&bytes[1..]), want_odd)
            }
            (Some(prefix), len) => Err(PrimitivesError::InvalidPublicKey(format!(
                "unsupported SEC encoding: prefix 0x{:02x}, length {}",
                prefix, len
            ))),
            (None, _) => Err(PrimitivesError::InvalidPublicKey(
                "empty SEC encoding".to_string(),
            )),
        }
    }

    fn decompress(x: BigUint, want_odd: bool) -> Result<Self, PrimitivesError> {
        let params = params();
        let x = FieldElement::new(x, params.p.clone())
            .map_err(|_| PrimitivesError::InvalidPublicKey("x not below field prime".into()))?;
        let alpha = x.pow_u32(3).add(&params.b)?;
        let exponent = (&params.p + BigUint::one()) >> 2;
        let beta = alpha.pow(&BigInt::from_biguint(Sign::Plus, exponent));
        if beta.pow_u32(2) != alpha {
            return Err(PrimitivesError::PointNotOnCurve);
        }
        let y = if beta.num().bit(0) == want_odd {
            beta
        } else {
            beta.negate()
        };
        Ok(S256Point(CurvePoint::from_trusted(
            x,
            y,
            params.a.clone(),
            params.b.clone(),
        )))
    }

    /// Hash160 of the SEC encoding.
    pub fn hash160(&self, compressed: bool) -> [u8; 20] {
        hash160(&self.sec(compressed))
    }

    /// Pay-to-pubkey-hash address for this key.
    pub fn address(&self, compressed: bool, network: Network) -> String {
        base58::check_encode_versioned(network.p2pkh_prefix(), &self.hash160(compressed))
    }

    /// Verify an ECDSA signature over digest `z` against this public key.
    ///
    /// Computes `u = z/s`, `v = r/s` (mod N) and accepts iff the x coordinate
    /// of `u*G + v*P` reduced mod N equals `r`.
    pub fn verify(&self, z: &BigUint, sig: &Signature) -> bool {
        if self.is_identity() {
            return false;
        }
        let n = curve_order();
        let s_inv = sig.s().modpow(&(n - 2u32), n);
        let u = (z * &s_inv) % n;
        let v = (sig.r() * &s_inv) % n;
        let total = Self::generator()
            .mul(&u)
            .and_then(|ug| self.mul(&v).and_then(|vp| ug.add(&vp)));
        match total {
            Ok(point) => point.x().map_or(false, |x| &(x % n) == sig.r()),
            Err(_) => false,
        }
    }
}

impl fmt::Debug for S256Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.x(), self.y()) {
            (Some(x), Some(y)) => write!(f, "S256Point({:064x}, {:064x})", x, y),
            _ => write!(f, "S256Point(infinity)"),
        }
    }
}

/// Left-pad a big-endian integer to 32 bytes.
pub(crate) fn to_32_bytes(n: &BigUint) -> [u8; 32] {
    let bytes = n.to_bytes_be();
    let mut out = [0u8; 32];
    let start = 32usize.saturating_sub(bytes.len());
    out[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(32)..]);
    out
}
