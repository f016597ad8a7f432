/// Elliptic curve cryptography.
///
/// Prime-field arithmetic, the generic curve group law, its secp256k1
/// specialization, and ECDSA keys and signatures built on top.

pub mod field;
pub mod point;
pub mod private_key;
pub mod secp256k1;
pub mod signature;

pub use field::{FieldArithmetic, FieldElement};
pub use point::CurvePoint;
pub use private_key::{NonceSource, PrivateKey, WifKey};
pub use secp256k1::{curve_order, field_prime, S256Point};
pub use signature::Signature;
