//! The elliptic-curve group law over any coordinate field.
//!
//! Points live on a short Weierstrass curve `y^2 = x^3 + a*x + b`. The
//! curve coefficients travel with every point, so two points only compare
//! equal when they share both coordinates and curve.

use std::fmt;

use num_bigint::BigUint;

use crate::ec::field::FieldArithmetic;
use crate::PrimitivesError;

/// A point on `y^2 = x^3 + a*x + b`, or the point at infinity.
#[derive(Clone, PartialEq, Eq)]
pub struct CurvePoint<F> {
    coords: Option<(F, F)>,
    a: F,
    b: F,
}

impl<F: FieldArithmetic> CurvePoint<F> {
    /// Create an affine point, checking that it satisfies the curve equation.
    ///
    /// # Arguments
    /// * `x`, `y` - Affine coordinates.
    /// * `a`, `b` - Curve coefficients.
    ///
    /// # Returns
    /// The point, or `PointNotOnCurve` if `y^2 != x^3 + a*x + b`.
    pub fn new(x: F, y: F, a: F, b: F) -> Result<Self, PrimitivesError> {
        let lhs = y.pow_u32(2);
        let rhs = x.pow_u32(3).add(&a.mul(&x)?)?.add(&b)?;
        if lhs != rhs {
            return Err(PrimitivesError::PointNotOnCurve);
        }
        Ok(CurvePoint {
            coords: Some((x, y)),
            a,
            b,
        })
    }

    /// Build a point whose curve membership is already known.
    pub(crate) fn from_trusted(x: F, y: F, a: F, b: F) -> Self {
        CurvePoint {
            coords: Some((x, y)),
            a,
            b,
        }
    }

    /// The point at infinity on the curve with coefficients `a`, `b`.
    pub fn identity(a: F, b: F) -> Self {
        CurvePoint {
            coords: None,
            a,
            b,
        }
    }

    /// Whether this is the point at infinity.
    pub fn is_identity(&self) -> bool {
        self.coords.is_none()
    }

    /// The x coordinate, `None` at infinity.
    pub fn x(&self) -> Option<&F> {
        self.coords.as_ref().map(|(x, _)| x)
    }

    /// The y coordinate, `None` at infinity.
    pub fn y(&self) -> Option<&F> {
        self.coords.as_ref().map(|(_, y)| y)
    }

    /// Curve coefficient `a`.
    pub fn a(&self) -> &F {
        &self.a
    }

    /// Curve coefficient `b`.
    pub fn b(&self) -> &F {
        &self.b
    }

    /// Add two points on the same curve.
    ///
    /// Handles the identity, `P + (-P)`, the vertical tangent at `y = 0`,
    /// tangent doubling and the general secant case.
    ///
    /// # Returns
    /// The sum, or `CurveMismatch` if the points lie on different curves.
    pub fn add(&self, other: &Self) -> Result<Self, PrimitivesError> {
        if self.a != other.a || self.b != other.b {
            return Err(PrimitivesError::CurveMismatch);
        }
        let ((x1, y1), (x2, y2)) = match (&self.coords, &other.coords) {
            (None, _) => return Ok(other.clone()),
            (_, None) => return Ok(self.clone()),
            (Some(p), Some(q)) => (p, q),
        };

        if x1 == x2 {
            if y1 != y2 || y1.is_zero() {
                return Ok(Self::identity(self.a.clone(), self.b.clone()));
            }
            return self.double();
        }

        // s = (y2 - y1) / (x2 - x1)
        let s = y2.sub(y1)?.div(&x2.sub(x1)?)?;
        let x3 = s.pow_u32(2).sub(x1)?.sub(x2)?;
        let y3 = s.mul(&x1.sub(&x3)?)?.sub(y1)?;
        Ok(self.with_coords(x3, y3))
    }

    /// Double a point using the tangent line.
    pub fn double(&self) -> Result<Self, PrimitivesError> {
        let (x1, y1) = match &self.coords {
            None => return Ok(self.clone()),
            Some(p) => p,
        };
        if y1.is_zero() {
            return Ok(Self::identity(self.a.clone(), self.b.clone()));
        }
        // s = (3x^2 + a) / 2y
        let s = x1.pow_u32(2).scale(3).add(&self.a)?.div(&y1.scale(2))?;
        let x3 = s.pow_u32(2).sub(&x1.scale(2))?;
        let y3 = s.mul(&x1.sub(&x3)?)?.sub(y1)?;
        Ok(self.with_coords(x3, y3))
    }

    /// Multiply by a non-negative scalar using double-and-add.
    pub fn scalar_mul(&self, k: &BigUint) -> Result<Self, PrimitivesError> {
        let mut result = Self::identity(self.a.clone(), self.b.clone());
        let mut addend = self.clone();
        for i in 0..k.bits() {
            if k.bit(i) {
                result = result.add(&addend)?;
            }
            addend = addend.double()?;
        }
        Ok(result)
    }

    fn with_coords(&self, x: F, y: F) -> Self {
        CurvePoint {
            coords: Some((x, y)),
            a: self.a.clone(),
            b: self.b.clone(),
        }
    }
}

impl<F: fmt::Debug> fmt::Debug for CurvePoint<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.coords {
            None => write!(f, "Point(infinity)"),
            Some((x, y)) => write!(f, "Point({:?},{:?})_{:?}_{:?}", x, y, self.a, self.b),
        }
    }
}
