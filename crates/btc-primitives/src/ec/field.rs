//! Arithmetic over a prime field.
//!
//! `FieldElement` carries its own modulus so that elements of different
//! fields can never be combined by accident: every binary operation checks
//! the primes and fails with `FieldMismatch` instead.

use std::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::PrimitivesError;

/// The operations a curve needs from its coordinate field.
///
/// `CurvePoint` is generic over this trait so the group law can be exercised
/// on small textbook fields as well as on secp256k1.
pub trait FieldArithmetic: Clone + PartialEq + fmt::Debug {
    /// `self + other`.
    fn add(&self, other: &Self) -> Result<Self, PrimitivesError>;
    /// `self - other`.
    fn sub(&self, other: &Self) -> Result<Self, PrimitivesError>;
    /// `self * other`.
    fn mul(&self, other: &Self) -> Result<Self, PrimitivesError>;
    /// `self / other`, failing on a zero divisor.
    fn div(&self, other: &Self) -> Result<Self, PrimitivesError>;
    /// `self ^ exponent` for a small non-negative exponent.
    fn pow_u32(&self, exponent: u32) -> Self;
    /// `k * self` for a small integer coefficient.
    fn scale(&self, k: u32) -> Self;
    /// Whether this is the additive identity.
    fn is_zero(&self) -> bool;
}

/// An element of the prime field `F_p`.
///
/// Invariant: `0 <= num < prime`. Every constructor and operation preserves it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldElement {
    num: BigUint,
    prime: BigUint,
}

impl FieldElement {
    /// Create a field element, rejecting values outside `[0, prime)`.
    ///
    /// # Arguments
    /// * `num` - The element's value.
    /// * `prime` - The field modulus.
    ///
    /// # Returns
    /// The element, or `FieldOutOfRange` if `num >= prime`.
    pub fn new(num: BigUint, prime: BigUint) -> Result<Self, PrimitivesError> {
        if prime < BigUint::from(2u32) {
            return Err(PrimitivesError::Other(format!("invalid field modulus {}", prime)));
        }
        if num >= prime {
            return Err(PrimitivesError::FieldOutOfRange {
                num: num.to_string(),
                max: (prime - 1u32).to_string(),
            });
        }
        Ok(FieldElement { num, prime })
    }

    /// Convenience constructor for small fields.
    pub fn from_u64(num: u64, prime: u64) -> Result<Self, PrimitivesError> {
        Self::new(BigUint::from(num), BigUint::from(prime))
    }

    /// Build an element by reducing `num` modulo `prime`.
    pub(crate) fn reduced(num: BigUint, prime: &BigUint) -> Self {
        FieldElement {
            num: num % prime,
            prime: prime.clone(),
        }
    }

    /// The element's value.
    pub fn num(&self) -> &BigUint {
        &self.num
    }

    /// The field modulus.
    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    /// Raise to an integer power.
    ///
    /// The exponent is first reduced modulo `p - 1` (Fermat), so negative
    /// exponents are accepted and `a^-1` is the multiplicative inverse.
    /// Zero to any power other than zero stays zero.
    pub fn pow(&self, exponent: &BigInt) -> Self {
        let order = BigInt::from_biguint(Sign::Plus, &self.prime - 1u32);
        if self.num.is_zero() {
            let num = if exponent.is_zero() {
                BigUint::one()
            } else {
                BigUint::zero()
            };
            return FieldElement::reduced(num, &self.prime);
        }
        let e = exponent.mod_floor(&order).magnitude().clone();
        FieldElement {
            num: self.num.modpow(&e, &self.prime),
            prime: self.prime.clone(),
        }
    }

    /// Additive inverse, `p - a` (zero maps to zero).
    pub fn negate(&self) -> Self {
        FieldElement::reduced(&self.prime - &self.num, &self.prime)
    }

    /// Multiplicative inverse via `a^(p-2)`.
    ///
    /// # Returns
    /// The inverse, or `DivisionByZero` for the zero element.
    pub fn inverse(&self) -> Result<Self, PrimitivesError> {
        if self.num.is_zero() {
            return Err(PrimitivesError::DivisionByZero);
        }
        let e = &self.prime - 2u32;
        Ok(FieldElement {
            num: self.num.modpow(&e, &self.prime),
            prime: self.prime.clone(),
        })
    }

    fn check_same_field(&self, other: &Self) -> Result<(), PrimitivesError> {
        if self.prime != other.prime {
            return Err(PrimitivesError::FieldMismatch);
        }
        Ok(())
    }
}

impl FieldArithmetic for FieldElement {
    fn add(&self, other: &Self) -> Result<Self, PrimitivesError> {
        self.check_same_field(other)?;
        Ok(FieldElement::reduced(&self.num + &other.num, &self.prime))
    }

    fn sub(&self, other: &Self) -> Result<Self, PrimitivesError> {
        self.check_same_field(other)?;
        Ok(FieldElement::reduced(
            &self.num + &self.prime - &other.num,
            &self.prime,
        ))
    }

    fn mul(&self, other: &Self) -> Result<Self, PrimitivesError> {
        self.check_same_field(other)?;
        Ok(FieldElement::reduced(&self.num * &other.num, &self.prime))
    }

    fn div(&self, other: &Self) -> Result<Self, PrimitivesError> {
        self.check_same_field(other)?;
        self.mul(&other.inverse()?)
    }

    fn pow_u32(&self, exponent: u32) -> Self {
        self.pow(&BigInt::from(exponent))
    }

    fn scale(&self, k: u32) -> Self {
        FieldElement::reduced(&self.num * k, &self.prime)
    }

    fn is_zero(&self) -> bool {
        self.num.is_zero()
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement_{}({})", self.prime, self.num)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.num)
    }
}
