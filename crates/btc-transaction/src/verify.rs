//! Signature digests, input verification and signing.
//!
//! Each input is verified by classifying the script it spends (P2SH,
//! possibly wrapping a witness program, native P2WPKH/P2WSH, or anything
//! else as legacy), computing the matching digest, and evaluating the
//! scriptSig followed by the scriptPubKey.

use log::debug;
use num_bigint::BigUint;

use btc_primitives::ec::{NonceSource, PrivateKey};
use btc_primitives::hash::sha256d;
use btc_script::{Command, Script};

use crate::fetcher::TxFetcher;
use crate::sighash::{self, SIGHASH_ALL};
use crate::transaction::Transaction;
use crate::TransactionError;

impl Transaction {
    /// Legacy signature digest for one input.
    ///
    /// # Arguments
    /// * `index` - Index of the input being signed.
    /// * `redeem_script` - For P2SH spends, the script that replaces the
    ///   scriptSig. Otherwise the spent scriptPubKey is used.
    /// * `fetcher` - Source of the previous transaction.
    ///
    /// # Returns
    /// The double-SHA256 of the preimage as a big-endian integer.
    pub fn sig_hash<F>(
        &self,
        index: usize,
        redeem_script: Option<&Script>,
        fetcher: &F,
    ) -> Result<BigUint, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        let preimage = match redeem_script {
            Some(redeem) => sighash::legacy_preimage(self, index, redeem)?,
            None => {
                let script_pubkey = self.input(index)?.script_pubkey(fetcher, self.network())?;
                sighash::legacy_preimage(self, index, &script_pubkey)?
            }
        };
        Ok(BigUint::from_bytes_be(&sha256d(&preimage)))
    }

    /// BIP143 signature digest for one input.
    ///
    /// The script code is the witness script when one is given, else the
    /// P2PKH script of the key hash in the redeem script, else the P2PKH
    /// script of the key hash in the spent scriptPubKey.
    ///
    /// # Arguments
    /// * `index` - Index of the input being signed.
    /// * `redeem_script` - The P2SH redeem script wrapping a P2WPKH program.
    /// * `witness_script` - The P2WSH witness script.
    /// * `fetcher` - Source of the previous transaction.
    ///
    /// # Returns
    /// The double-SHA256 of the preimage as a big-endian integer.
    pub fn sig_hash_bip143<F>(
        &self,
        index: usize,
        redeem_script: Option<&Script>,
        witness_script: Option<&Script>,
        fetcher: &F,
    ) -> Result<BigUint, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        let prev = self.input(index)?.prev_output(fetcher, self.network())?;
        let script_code = match (witness_script, redeem_script) {
            (Some(witness_script), _) => witness_script.clone(),
            (None, Some(redeem)) => p2pkh_script_code(redeem)?,
            (None, None) => p2pkh_script_code(&prev.script_pubkey)?,
        };
        let preimage = sighash::bip143_preimage(self, index, &script_code, prev.amount)?;
        Ok(BigUint::from_bytes_be(&sha256d(&preimage)))
    }

    /// Verify that one input's scripts authorize the spend.
    ///
    /// # Arguments
    /// * `index` - Index of the input to verify.
    /// * `fetcher` - Source of the previous transaction.
    ///
    /// # Returns
    /// `Ok(true)` if the scripts evaluate successfully, `Ok(false)` if they
    /// do not, or an error if the digest cannot be computed.
    pub fn verify_input<F>(&self, index: usize, fetcher: &F) -> Result<bool, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        let input = self.input(index)?;
        let script_pubkey = input.script_pubkey(fetcher, self.network())?;
        let script_sig = input.script_sig.clone().unwrap_or_default();
        let witness = input.witness.as_deref();

        let (z, witness) = if script_pubkey.is_p2sh() {
            let Some(redeem) = last_push_as_script(&script_sig) else {
                debug!("input {}: p2sh spend without a parseable redeem script", index);
                return Ok(false);
            };
            if redeem.is_p2wpkh() {
                (self.sig_hash_bip143(index, Some(&redeem), None, fetcher)?, witness)
            } else if redeem.is_p2wsh() {
                let Some(witness_script) = parse_witness_script(witness) else {
                    debug!("input {}: p2sh-p2wsh spend without a witness script", index);
                    return Ok(false);
                };
                (self.sig_hash_bip143(index, None, Some(&witness_script), fetcher)?, witness)
            } else {
                (self.sig_hash(index, Some(&redeem), fetcher)?, None)
            }
        } else if script_pubkey.is_p2wpkh() {
            (self.sig_hash_bip143(index, None, None, fetcher)?, witness)
        } else if script_pubkey.is_p2wsh() {
            let Some(witness_script) = parse_witness_script(witness) else {
                debug!("input {}: p2wsh spend without a witness script", index);
                return Ok(false);
            };
            (self.sig_hash_bip143(index, None, Some(&witness_script), fetcher)?, witness)
        } else {
            (self.sig_hash(index, None, fetcher)?, None)
        };

        let combined = script_sig.concat(&script_pubkey);
        let ok = combined.evaluate(&z, witness);
        if !ok {
            debug!("input {} of {} failed script evaluation", index, self.id());
        }
        Ok(ok)
    }

    /// Verify the whole transaction.
    ///
    /// # Returns
    /// `Ok(true)` if the fee is not negative and every input verifies.
    pub fn verify<F>(&self, fetcher: &F) -> Result<bool, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        if self.fee_wide(fetcher)? < 0 {
            return Ok(false);
        }
        for index in 0..self.inputs().len() {
            if !self.verify_input(index, fetcher)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Sign a P2PKH input with a random nonce.
    ///
    /// See `sign_input_with`.
    pub fn sign_input<F>(
        &mut self,
        index: usize,
        key: &PrivateKey,
        fetcher: &F,
    ) -> Result<bool, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        self.sign_input_with(index, key, fetcher, NonceSource::default())
    }

    /// Sign a P2PKH input and verify the result.
    ///
    /// The scriptSig becomes `<DER signature + SIGHASH_ALL> <compressed SEC key>`.
    ///
    /// # Arguments
    /// * `index` - Index of the input to sign.
    /// * `key` - The private key controlling the spent output.
    /// * `fetcher` - Source of the previous transaction.
    /// * `nonce` - Where the ECDSA nonce comes from.
    ///
    /// # Returns
    /// Whether the signed input verifies.
    pub fn sign_input_with<F>(
        &mut self,
        index: usize,
        key: &PrivateKey,
        fetcher: &F,
        nonce: NonceSource,
    ) -> Result<bool, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        let z = self.sig_hash(index, None, fetcher)?;
        let mut sig = key.sign_with(&z, nonce)?.der();
        sig.push(SIGHASH_ALL as u8);
        let script_sig = Script::new(vec![Command::push(sig), Command::push(key.point().sec(true))])?;
        self.set_script_sig(index, script_sig)?;
        self.verify_input(index, fetcher)
    }
}

/// P2PKH script for the 20-byte push at position 1 of a witness program.
fn p2pkh_script_code(program: &Script) -> Result<Script, TransactionError> {
    program
        .command(1)
        .and_then(Command::as_push)
        .and_then(|push| <[u8; 20]>::try_from(push.bytes().as_ref()).ok())
        .map(|h160| Script::p2pkh(&h160))
        .ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "no 20-byte key hash in script '{}'",
                program
            ))
        })
}

fn last_push_as_script(script_sig: &Script) -> Option<Script> {
    let push = script_sig.commands().last()?.as_push()?;
    Script::from_bytes(&push.bytes()).ok()
}

fn parse_witness_script(witness: Option<&[Vec<u8>]>) -> Option<Script> {
    let last = witness?.last()?;
    Script::from_bytes(last).ok()
}
