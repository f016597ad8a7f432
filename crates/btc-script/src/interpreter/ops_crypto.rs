//! Hashing and signature-checking operations.
//!
//! Signatures on the stack carry a trailing sighash-type byte, which is
//! stripped before DER parsing. A key or signature that fails to parse makes
//! the check come out false rather than aborting the script.

use log::debug;

use btc_primitives::ec::{S256Point, Signature};
use btc_primitives::hash::{hash160, sha1, sha256d};

use super::context::ExecutionContext;
use super::error::{ExecutionError, ExecutionErrorCode};

/// Most public keys a single `OP_CHECKMULTISIG` may name.
pub const MAX_PUB_KEYS_PER_MULTISIG: i64 = 20;

pub(crate) enum HashType {
    Sha1,
    Hash160,
    Hash256,
}

impl ExecutionContext {
    fn op_hash(&mut self, hash_type: HashType) -> Result<(), ExecutionError> {
        let buf = self.stack.pop_byte_array()?;
        let result = match hash_type {
            HashType::Sha1 => sha1(&buf).to_vec(),
            HashType::Hash160 => hash160(&buf).to_vec(),
            HashType::Hash256 => sha256d(&buf).to_vec(),
        };
        self.stack.push_byte_array(result);
        Ok(())
    }

    pub(crate) fn op_sha1(&mut self, _op: u8) -> Result<(), ExecutionError> {
        self.op_hash(HashType::Sha1)
    }

    pub(crate) fn op_hash160(&mut self, _op: u8) -> Result<(), ExecutionError> {
        self.op_hash(HashType::Hash160)
    }

    pub(crate) fn op_hash256(&mut self, _op: u8) -> Result<(), ExecutionError> {
        self.op_hash(HashType::Hash256)
    }

    pub(crate) fn op_checksig(&mut self, _op: u8) -> Result<(), ExecutionError> {
        let pk_bytes = self.stack.pop_byte_array()?;
        let full_sig_bytes = self.stack.pop_byte_array()?;

        let valid = match (parse_signature(&full_sig_bytes), S256Point::parse_sec(&pk_bytes)) {
            (Some(sig), Ok(point)) => point.verify(&self.z, &sig),
            (None, _) => {
                debug!("checksig: signature does not parse");
                false
            }
            (_, Err(e)) => {
                debug!("checksig: {}", e);
                false
            }
        };
        self.stack.push_bool(valid);
        Ok(())
    }

    /// Pops `n`, `n` keys, `m`, `m` signatures and one extra item, then
    /// checks that every signature matches a distinct key, in order.
    pub(crate) fn op_checkmultisig(&mut self, _op: u8) -> Result<(), ExecutionError> {
        let num_keys = self.stack.pop_int()?.to_i64();
        if !(0..=MAX_PUB_KEYS_PER_MULTISIG).contains(&num_keys) {
            return Err(ExecutionError::new(
                ExecutionErrorCode::InvalidPubKeyCount,
                format!(
                    "number of pubkeys {} is out of range 0 to {}",
                    num_keys, MAX_PUB_KEYS_PER_MULTISIG
                ),
            ));
        }
        let mut pub_keys = Vec::with_capacity(num_keys as usize);
        for _ in 0..num_keys {
            pub_keys.push(self.stack.pop_byte_array()?);
        }
        pub_keys.reverse();

        let num_sigs = self.stack.pop_int()?.to_i64();
        if num_sigs < 0 || num_sigs > num_keys {
            return Err(ExecutionError::new(
                ExecutionErrorCode::InvalidSignatureCount,
                format!("number of signatures {} is out of range 0 to {}", num_sigs, num_keys),
            ));
        }
        let mut signatures = Vec::with_capacity(num_sigs as usize);
        for _ in 0..num_sigs {
            signatures.push(self.stack.pop_byte_array()?);
        }
        signatures.reverse();

        // Extra item consumed for compatibility with the original opcode.
        self.stack.pop_byte_array()?;

        let valid = self.match_signatures(&signatures, &pub_keys);
        self.stack.push_bool(valid);
        Ok(())
    }

    fn match_signatures(&self, signatures: &[Vec<u8>], pub_keys: &[Vec<u8>]) -> bool {
        let mut keys = pub_keys.iter();
        for (i, raw) in signatures.iter().enumerate() {
            let sig = match parse_signature(raw) {
                Some(sig) => sig,
                None => {
                    debug!("checkmultisig: signature {} does not parse", i);
                    return false;
                }
            };
            let matched = keys.by_ref().any(|pk| match S256Point::parse_sec(pk) {
                Ok(point) => point.verify(&self.z, &sig),
                Err(_) => false,
            });
            if !matched {
                debug!("checkmultisig: no key left for signature {}", i);
                return false;
            }
        }
        true
    }
}

/// DER signature with its sighash-type byte removed.
fn parse_signature(full: &[u8]) -> Option<Signature> {
    let (_, der) = full.split_last()?;
    Signature::parse_der(der).ok()
}
