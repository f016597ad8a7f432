//! secp256k1 private keys: ECDSA signing and WIF encoding.
//!
//! Signing nonces come from the OS random number generator by default.
//! An RFC6979-style HMAC-SHA256 derivation is available for reproducible
//! signatures, and callers may also supply `k` directly.

use std::fmt;

use log::trace;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::base58;
use crate::ec::secp256k1::{curve_order, to_32_bytes, S256Point};
use crate::ec::signature::Signature;
use crate::hash::sha256_hmac;
use crate::network::Network;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// Compression flag byte appended to WIF for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// Where the per-signature nonce `k` comes from.
#[derive(Clone, Debug, Default)]
pub enum NonceSource {
    /// Fresh bytes from the OS random number generator.
    #[default]
    Random,
    /// HMAC-SHA256 derivation from the secret and the digest.
    Deterministic,
    /// A caller-chosen nonce. Must lie in `[1, N)`.
    Explicit(BigUint),
}

/// A secp256k1 private key and its public point.
///
/// The public point `e*G` is computed once at construction.
#[derive(Clone)]
pub struct PrivateKey {
    secret: BigUint,
    point: S256Point,
}

/// A private key decoded from WIF, with the flags the encoding carried.
#[derive(Clone, Debug)]
pub struct WifKey {
    /// The decoded key.
    pub key: PrivateKey,
    /// Whether the key is meant to be used with compressed SEC public keys.
    pub compressed: bool,
    /// The network named by the WIF prefix.
    pub network: Network,
}

impl PrivateKey {
    /// Create a private key from its secret scalar.
    ///
    /// # Arguments
    /// * `secret` - The scalar `e`, which must satisfy `1 <= e < N`.
    ///
    /// # Returns
    /// `Ok(PrivateKey)`, or `InvalidPrivateKey` when the scalar is out of range.
    pub fn new(secret: BigUint) -> Result<Self, PrimitivesError> {
        if secret.is_zero() || &secret >= curve_order() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "secret must be in the range [1, N)".to_string(),
            ));
        }
        let point = S256Point::generator().mul(&secret)?;
        Ok(PrivateKey { secret, point })
    }

    /// Create a private key from a raw 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        Self::new(BigUint::from_bytes_be(bytes))
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Generate a new random private key using the OS random number generator.
    pub fn random() -> Self {
        loop {
            let candidate = random_scalar();
            if let Ok(key) = Self::new(candidate) {
                return key;
            }
        }
    }

    /// The secret scalar.
    pub fn secret(&self) -> &BigUint {
        &self.secret
    }

    /// The public point `e*G`.
    pub fn point(&self) -> &S256Point {
        &self.point
    }

    /// The secret as 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        to_32_bytes(&self.secret)
    }

    /// Sign digest `z` with a random nonce.
    pub fn sign(&self, z: &BigUint) -> Result<Signature, PrimitivesError> {
        self.sign_with(z, NonceSource::Random)
    }

    /// Sign digest `z`, taking the nonce from `nonce`.
    ///
    /// Computes `r = (k*G).x mod N` and `s = (z + r*e)/k mod N`, then
    /// replaces `s` with `N - s` when it lies in the upper half of the order.
    ///
    /// # Arguments
    /// * `z` - The message digest as an integer.
    /// * `nonce` - Source of the nonce `k`.
    ///
    /// # Returns
    /// The low-S signature, or an error if an explicit nonce is out of range.
    pub fn sign_with(&self, z: &BigUint, nonce: NonceSource) -> Result<Signature, PrimitivesError> {
        let k = match nonce {
            NonceSource::Random => loop {
                let k = random_scalar();
                if !k.is_zero() && &k < curve_order() {
                    break k;
                }
            },
            NonceSource::Deterministic => self.deterministic_k(z),
            NonceSource::Explicit(k) => k,
        };
        self.sign_with_k(z, &k)
    }

    fn sign_with_k(&self, z: &BigUint, k: &BigUint) -> Result<Signature, PrimitivesError> {
        let n = curve_order();
        if k.is_zero() || k >= n {
            return Err(PrimitivesError::InvalidPrivateKey(
                "nonce must be in the range [1, N)".to_string(),
            ));
        }
        let big_r = S256Point::generator().mul(k)?;
        let r = big_r
            .x()
            .map(|x| x % n)
            .ok_or_else(|| PrimitivesError::InvalidSignature("nonce point at infinity".into()))?;
        let k_inv = k.modpow(&(n - 2u32), n);
        let mut s = ((z + &r * &self.secret) * k_inv) % n;
        if s > n >> 1 {
            s = n - s;
        }
        Signature::new(r, s)
    }

    /// Derive a nonce from the secret and digest with HMAC-SHA256.
    ///
    /// Follows the RFC6979 construction: `K` and `V` are seeded from the
    /// secret and `z` (reduced by `N` once if larger), then `V` is iterated
    /// until it yields a candidate in `[1, N)`.
    pub fn deterministic_k(&self, z: &BigUint) -> BigUint {
        let n = curve_order();
        let mut k = [0u8; 32];
        let mut v = [1u8; 32];
        let z = if z > n { z - n } else { z.clone() };
        let z_bytes = to_32_bytes(&z);
        let mut secret_bytes = self.to_bytes();

        let mut seed = Vec::with_capacity(97);
        for marker in [0x00u8, 0x01] {
            seed.clear();
            seed.extend_from_slice(&v);
            seed.push(marker);
            seed.extend_from_slice(&secret_bytes);
            seed.extend_from_slice(&z_bytes);
            k = sha256_hmac(&k, &seed);
            v = sha256_hmac(&k, &v);
        }
        seed.zeroize();
        secret_bytes.zeroize();

        let candidate = loop {
            v = sha256_hmac(&k, &v);
            let candidate = BigUint::from_bytes_be(&v);
            if candidate >= BigUint::one() && &candidate < n {
                break candidate;
            }
            trace!("deterministic nonce candidate out of range, retrying");
            let mut retry = v.to_vec();
            retry.push(0x00);
            k = sha256_hmac(&k, &retry);
            v = sha256_hmac(&k, &v);
        };
        k.zeroize();
        v.zeroize();
        candidate
    }

    /// Encode as WIF: `prefix || secret || [0x01] || checksum` in Base58.
    ///
    /// # Arguments
    /// * `compressed` - Append the compression flag byte.
    /// * `network` - Selects the `0x80` (mainnet) or `0xef` (testnet) prefix.
    pub fn wif(&self, compressed: bool, network: Network) -> String {
        let mut payload = Vec::with_capacity(PRIVATE_KEY_BYTES_LEN + 1);
        payload.extend_from_slice(&self.to_bytes());
        if compressed {
            payload.push(COMPRESS_MAGIC);
        }
        let encoded = base58::check_encode_versioned(network.wif_prefix(), &payload);
        payload.zeroize();
        encoded
    }

    /// Decode a WIF string.
    ///
    /// # Returns
    /// The key together with its compression flag and network, or an error
    /// for a bad checksum, prefix, length or compression flag.
    pub fn from_wif(wif: &str) -> Result<WifKey, PrimitivesError> {
        let (prefix, mut payload) = base58::check_decode_versioned(wif).map_err(|e| match e {
            PrimitivesError::ChecksumMismatch => e,
            other => PrimitivesError::InvalidWif(other.to_string()),
        })?;
        let network = Network::from_wif_prefix(prefix).ok_or_else(|| {
            PrimitivesError::InvalidWif(format!("unknown network prefix 0x{:02x}", prefix))
        })?;

        let compressed = match payload.len() {
            33 if payload[32] == COMPRESS_MAGIC => true,
            33 => {
                payload.zeroize();
                return Err(PrimitivesError::InvalidWif(
                    "malformed private key: invalid compression flag".to_string(),
                ));
            }
            32 => false,
            len => {
                payload.zeroize();
                return Err(PrimitivesError::InvalidWif(format!(
                    "malformed private key: invalid length {}",
                    len + 1
                )));
            }
        };

        let key = Self::from_bytes(&payload[..PRIVATE_KEY_BYTES_LEN]);
        payload.zeroize();
        Ok(WifKey {
            key: key?,
            compressed,
            network,
        })
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.secret == other.secret
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("point", &self.point)
            .finish_non_exhaustive()
    }
}

fn random_scalar() -> BigUint {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let scalar = BigUint::from_bytes_be(&bytes);
    bytes.zeroize();
    scalar
}
