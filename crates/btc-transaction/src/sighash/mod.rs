//! Signature hash computation for transaction signing.
//!
//! Builds the preimages that are double-SHA256 hashed into the digest an
//! ECDSA signature commits to: the legacy algorithm, where the spent script
//! replaces the signing input's scriptSig, and the BIP143 algorithm used by
//! segwit spends, which commits to the amount being spent.
//!
//! See <https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki>

use btc_primitives::hash::sha256d;
use btc_primitives::util::ByteWriter;
use btc_script::Script;

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Sign all inputs and all outputs. The only hash type produced here.
pub const SIGHASH_ALL: u32 = 0x01;

/// The three BIP143 aggregate hashes shared by every input of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegwitDigests {
    /// sha256d of every outpoint.
    pub hash_prevouts: [u8; 32],
    /// sha256d of every input sequence number.
    pub hash_sequence: [u8; 32],
    /// sha256d of every serialized output.
    pub hash_outputs: [u8; 32],
}

impl SegwitDigests {
    /// Compute the aggregate hashes for the given inputs and outputs.
    pub fn compute(inputs: &[TransactionInput], outputs: &[TransactionOutput]) -> Self {
        let mut prevouts = ByteWriter::with_capacity(inputs.len() * 36);
        let mut sequences = ByteWriter::with_capacity(inputs.len() * 4);
        for input in inputs {
            input.write_outpoint(&mut prevouts);
            sequences.write_u32_le(input.sequence);
        }

        let mut serialized_outputs = ByteWriter::new();
        for output in outputs {
            output.write_to(&mut serialized_outputs);
        }

        SegwitDigests {
            hash_prevouts: sha256d(prevouts.as_bytes()),
            hash_sequence: sha256d(sequences.as_bytes()),
            hash_outputs: sha256d(serialized_outputs.as_bytes()),
        }
    }
}

/// Compute the legacy preimage for an input.
///
/// The transaction is serialized without witness data, with `script_code`
/// in place of the signing input's scriptSig and every other scriptSig
/// emptied, followed by the 4-byte hash type.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `script_code` - The redeem script, or the scriptPubKey being spent.
///
/// # Returns
/// The raw preimage bytes (not yet hashed).
pub fn legacy_preimage(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
) -> Result<Vec<u8>, TransactionError> {
    tx.input(input_index)?;

    let mut writer = ByteWriter::with_capacity(256);
    writer.write_u32_le(tx.version());
    writer.write_varint(tx.inputs().len().into());
    for (i, input) in tx.inputs().iter().enumerate() {
        let script = (i == input_index).then_some(script_code);
        input.write_with_script(&mut writer, script);
    }
    writer.write_varint(tx.outputs().len().into());
    for output in tx.outputs() {
        output.write_to(&mut writer);
    }
    writer.write_u32_le(tx.locktime());
    writer.write_u32_le(SIGHASH_ALL);
    Ok(writer.into_bytes())
}

/// Compute the BIP143 preimage for an input.
///
/// The preimage consists of:
/// 1. nVersion (4 bytes LE)
/// 2. hashPrevouts (32 bytes)
/// 3. hashSequence (32 bytes)
/// 4. outpoint (32+4 bytes) of the input being signed
/// 5. scriptCode (varint + script)
/// 6. amount (8 bytes LE) of the output being spent
/// 7. nSequence (4 bytes LE) of the input being signed
/// 8. hashOutputs (32 bytes)
/// 9. nLocktime (4 bytes LE)
/// 10. hash type (4 bytes LE)
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `script_code` - The witness script, or the P2PKH script of the key hash.
/// * `amount` - Value of the output being spent.
///
/// # Returns
/// The raw preimage bytes (not yet hashed).
pub fn bip143_preimage(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    amount: u64,
) -> Result<Vec<u8>, TransactionError> {
    let input = tx.input(input_index)?;
    let digests = tx.segwit_digests();

    let mut writer = ByteWriter::with_capacity(256);
    writer.write_u32_le(tx.version());
    writer.write_bytes(&digests.hash_prevouts);
    writer.write_bytes(&digests.hash_sequence);
    input.write_outpoint(&mut writer);
    script_code.write_to(&mut writer);
    writer.write_u64_le(amount);
    writer.write_u32_le(input.sequence);
    writer.write_bytes(&digests.hash_outputs);
    writer.write_u32_le(tx.locktime());
    writer.write_u32_le(SIGHASH_ALL);
    Ok(writer.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIP143_UNSIGNED: &str = "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f0000000000eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a0100000000ffffffff02202cb206000000001976a9148280b37df378db99f66f85c95a783a76ac7a6d5988ac9093510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2f0167faa815988ac11000000";

    #[test]
    fn test_aggregate_hashes() {
        let tx = Transaction::from_hex(BIP143_UNSIGNED).expect("should parse");
        let digests = tx.segwit_digests();
        assert_eq!(
            hex::encode(digests.hash_prevouts),
            "96b827c8483d4e9b96712b6713a7b68d6e8003a781feba36c31143470b4efd37"
        );
        assert_eq!(
            hex::encode(digests.hash_sequence),
            "52b0a642eea2fb7ae638c36f6252b6750293dbe574a806984b8e4d8548339a3b"
        );
        assert_eq!(
            hex::encode(digests.hash_outputs),
            "863ef3e1a92afbfdb97f31ad0fc7683ee943e9abcf2501590ff8f6551f47e5e5"
        );
    }

    #[test]
    fn test_bip143_preimage_digest() {
        let tx = Transaction::from_hex(BIP143_UNSIGNED).expect("should parse");
        let script_code = Script::from_hex("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac")
            .expect("valid script");
        let preimage = bip143_preimage(&tx, 1, &script_code, 600_000_000).expect("preimage");
        assert_eq!(
            hex::encode(sha256d(&preimage)),
            "c37af31116d1b27caf68aae9e3ac82f1477929014d5b917657d0eb49478cb670"
        );
    }

    #[test]
    fn test_legacy_preimage_clears_other_inputs() {
        let tx = Transaction::from_hex(BIP143_UNSIGNED).expect("should parse");
        let script_code = Script::p2pkh(&[0x11; 20]);
        let preimage = legacy_preimage(&tx, 0, &script_code).expect("preimage");

        // 4 version + 1 count + (41 + 25) + 41 + outputs + 4 locktime + 4 hash type
        let outputs_len: usize = tx.outputs().iter().map(|o| o.to_bytes().len()).sum();
        assert_eq!(preimage.len(), 4 + 1 + 66 + 41 + 1 + outputs_len + 4 + 4);
        assert_eq!(&preimage[preimage.len() - 4..], &[1, 0, 0, 0]);
    }

    #[test]
    fn test_preimage_index_out_of_range() {
        let tx = Transaction::from_hex(BIP143_UNSIGNED).expect("should parse");
        let script_code = Script::empty();
        assert!(matches!(
            legacy_preimage(&tx, 2, &script_code),
            Err(TransactionError::InputIndexOutOfRange { index: 2, count: 2 })
        ));
        assert!(bip143_preimage(&tx, 5, &script_code, 0).is_err());
    }
}
