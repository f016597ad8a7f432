/// Bitcoin validation core - cryptographic primitives, hashing, and codecs.
///
/// This crate provides the foundational building blocks for script
/// evaluation and transaction verification:
/// - Hash functions (SHA-1, SHA-256, SHA-256d, RIPEMD-160, Hash160, HMAC)
/// - Prime-field and elliptic-curve arithmetic with a secp256k1 specialization
/// - ECDSA signing and verification, DER signatures, SEC public keys
/// - WIF private keys and Base58Check addresses
/// - Variable-length integer encoding and wire readers/writers

pub mod base58;
pub mod ec;
pub mod hash;
pub mod network;
pub mod util;

mod error;
pub use error::PrimitivesError;
pub use network::Network;
