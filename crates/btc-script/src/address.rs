/// Bitcoin address handling.
///
/// Supports P2PKH and P2SH addresses on mainnet and testnet: generation from
/// public keys, public key hashes and script hashes, and parsing with
/// network and kind detection. Uses Base58Check encoding with SHA-256d
/// checksums.
use std::fmt;

use btc_primitives::base58::{check_decode_versioned, check_encode_versioned};
use btc_primitives::ec::S256Point;
use btc_primitives::{Network, PrimitivesError};

use crate::ScriptError;

/// What an address pays to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressKind {
    /// Pay to the hash160 of a public key.
    P2pkh,
    /// Pay to the hash160 of a redeem script.
    P2sh,
}

/// A Base58Check address.
///
/// Contains the 20-byte hash, what kind of hash it is and the network it
/// belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The human-readable Base58Check address string.
    pub address_string: String,
    /// The 20-byte hash160 of the public key or redeem script.
    pub hash: [u8; 20],
    /// Whether the hash is of a public key or of a script.
    pub kind: AddressKind,
    /// The network this address belongs to.
    pub network: Network,
}

impl Address {
    /// Parse a Base58Check-encoded address string.
    ///
    /// Decodes the string, validates the checksum, and detects network and
    /// kind from the version byte (0x00/0x6f P2PKH, 0x05/0xc4 P2SH).
    ///
    /// # Arguments
    /// * `addr` - The Base58Check address string.
    ///
    /// # Returns
    /// An `Address` or an error if the string is invalid.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let (version, payload) = check_decode_versioned(addr).map_err(|e| match e {
            PrimitivesError::ChecksumMismatch => ScriptError::InvalidAddress(format!(
                "checksum mismatch for '{}'",
                addr
            )),
            _ => ScriptError::InvalidAddress(format!("bad encoding for '{}'", addr)),
        })?;

        if payload.len() != 20 {
            return Err(ScriptError::InvalidAddressLength(addr.to_string()));
        }

        let (kind, network) = [Network::Mainnet, Network::Testnet]
            .into_iter()
            .find_map(|net| {
                if version == net.p2pkh_prefix() {
                    Some((AddressKind::P2pkh, net))
                } else if version == net.p2sh_prefix() {
                    Some((AddressKind::P2sh, net))
                } else {
                    None
                }
            })
            .ok_or_else(|| ScriptError::UnsupportedAddress(addr.to_string()))?;

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload);

        Ok(Address {
            address_string: addr.to_string(),
            hash,
            kind,
            network,
        })
    }

    /// Create a P2PKH address from a 20-byte public key hash.
    ///
    /// # Arguments
    /// * `hash` - The 20-byte hash160 of the public key.
    /// * `network` - The target network (Mainnet or Testnet).
    ///
    /// # Returns
    /// A new `Address` with the encoded Base58Check string.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        Self::build(*hash, AddressKind::P2pkh, network)
    }

    /// Create a P2SH address from the hash160 of a redeem script.
    pub fn from_script_hash(hash: &[u8; 20], network: Network) -> Self {
        Self::build(*hash, AddressKind::P2sh, network)
    }

    /// Create a P2PKH address for a public key in the chosen SEC form.
    pub fn from_public_key(point: &S256Point, compressed: bool, network: Network) -> Self {
        Self::from_public_key_hash(&point.hash160(compressed), network)
    }

    fn build(hash: [u8; 20], kind: AddressKind, network: Network) -> Self {
        let version = match kind {
            AddressKind::P2pkh => network.p2pkh_prefix(),
            AddressKind::P2sh => network.p2sh_prefix(),
        };
        Address {
            address_string: check_encode_versioned(version, &hash),
            hash,
            kind,
            network,
        }
    }
}

impl fmt::Display for Address {
    /// Display the address as its Base58Check string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}
