//! Transaction input referencing a previous output.
//!
//! Contains the previous transaction id and output index, the unlocking
//! script, the sequence number and, for segwit spends, the witness items.
//! The output being spent is resolved on demand through a `TxFetcher`.

use num_bigint::BigUint;

use btc_primitives::util::{ByteReader, ByteWriter};
use btc_primitives::Network;
use btc_script::Script;

use crate::fetcher::TxFetcher;
use crate::output::TransactionOutput;
use crate::TransactionError;

/// Default sequence number indicating a finalized input.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single input in a transaction.
///
/// The previous transaction id is held in display order, the byte-reversed
/// form of the 32 bytes on the wire, so `prev_tx_hex` is the familiar txid.
///
/// # Wire format
///
/// | Field         | Size             |
/// |---------------|------------------|
/// | prev_tx       | 32 bytes (LE)    |
/// | prev_index    | 4 bytes (LE)     |
/// | script length | VarInt           |
/// | script_sig    | variable         |
/// | sequence      | 4 bytes (LE)     |
///
/// Witness items are not part of the input record; a segwit transaction
/// writes them after all outputs.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionInput {
    /// Id of the transaction being spent, big-endian (display) byte order.
    pub prev_tx: [u8; 32],

    /// Index of the output within the previous transaction.
    pub prev_index: u32,

    /// The unlocking script. `None` when absent (empty on the wire).
    pub script_sig: Option<Script>,

    /// Sequence number. Defaults to `0xFFFFFFFF`.
    pub sequence: u32,

    /// Witness items, present only on segwit transactions.
    pub witness: Option<Vec<Vec<u8>>>,
}

impl TransactionInput {
    /// Create an unsigned input spending output `prev_index` of `prev_tx`.
    ///
    /// # Arguments
    /// * `prev_tx` - Id of the previous transaction in display byte order.
    /// * `prev_index` - The output index being spent.
    ///
    /// # Returns
    /// An input with no scriptSig, no witness and the default sequence.
    pub fn new(prev_tx: [u8; 32], prev_index: u32) -> Self {
        TransactionInput {
            prev_tx,
            prev_index,
            script_sig: None,
            sequence: DEFAULT_SEQUENCE_NUMBER,
            witness: None,
        }
    }

    /// Create an unsigned input from a hex txid.
    pub fn from_txid(txid: &str, prev_index: u32) -> Result<Self, TransactionError> {
        let bytes = hex::decode(txid).map_err(|e| {
            TransactionError::SerializationError(format!("invalid txid hex: {}", e))
        })?;
        let prev_tx: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            TransactionError::SerializationError(format!("txid must be 32 bytes, got {}", b.len()))
        })?;
        Ok(Self::new(prev_tx, prev_index))
    }

    /// Deserialize a `TransactionInput` from a `ByteReader`.
    ///
    /// Reads the standard wire format: 32-byte txid, 4-byte output index,
    /// varint-prefixed unlocking script, and 4-byte sequence number.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded input.
    ///
    /// # Returns
    /// `Ok(TransactionInput)` on success, or a `TransactionError` if the
    /// data is truncated or malformed.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, TransactionError> {
        let mut prev_tx = reader.read_array::<32>().map_err(|e| {
            TransactionError::SerializationError(format!("reading previous txid: {}", e))
        })?;
        prev_tx.reverse();

        let prev_index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading scriptSig: {}", e))
        })?;

        let sequence = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence number: {}", e))
        })?;

        let script_sig = if script_bytes.is_empty() {
            None
        } else {
            Some(Script::from_bytes(script_bytes).map_err(|e| {
                TransactionError::SerializationError(format!("parsing scriptSig: {}", e))
            })?)
        };

        Ok(TransactionInput {
            prev_tx,
            prev_index,
            script_sig,
            sequence,
            witness: None,
        })
    }

    /// Serialize this input (without its witness) into a `ByteWriter`.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        self.write_with_script(writer, self.script_sig.as_ref());
    }

    /// Serialize this input with `script` standing in for the scriptSig.
    pub(crate) fn write_with_script(&self, writer: &mut ByteWriter, script: Option<&Script>) {
        self.write_outpoint(writer);
        match script {
            Some(script) => script.write_to(writer),
            None => writer.write_var_bytes(&[]),
        }
        writer.write_u32_le(self.sequence);
    }

    /// Previous txid in wire order followed by the output index.
    pub(crate) fn write_outpoint(&self, writer: &mut ByteWriter) {
        let mut wire = self.prev_tx;
        wire.reverse();
        writer.write_bytes(&wire);
        writer.write_u32_le(self.prev_index);
    }

    /// Whether this input spends the null outpoint a coinbase uses.
    pub fn is_null_outpoint(&self) -> bool {
        self.prev_tx == [0u8; 32] && self.prev_index == 0xFFFF_FFFF
    }

    /// The previous transaction id as hex.
    pub fn prev_tx_hex(&self) -> String {
        hex::encode(self.prev_tx)
    }

    /// The previous transaction id as an unsigned integer.
    pub fn prev_tx_int(&self) -> BigUint {
        BigUint::from_bytes_be(&self.prev_tx)
    }

    /// Fetch the output this input spends.
    ///
    /// # Arguments
    /// * `fetcher` - Source of previous transactions.
    /// * `network` - Network the previous transaction lives on.
    ///
    /// # Returns
    /// The referenced output, a fetch error, or `PreviousOutputMissing` if
    /// the previous transaction has too few outputs.
    pub fn prev_output<F>(
        &self,
        fetcher: &F,
        network: Network,
    ) -> Result<TransactionOutput, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        let txid = self.prev_tx_hex();
        let prev = fetcher.fetch(&txid, network)?;
        prev.outputs()
            .get(self.prev_index as usize)
            .cloned()
            .ok_or(TransactionError::PreviousOutputMissing {
                txid,
                index: self.prev_index,
            })
    }

    /// Amount of the output this input spends.
    pub fn value<F>(&self, fetcher: &F, network: Network) -> Result<u64, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        Ok(self.prev_output(fetcher, network)?.amount)
    }

    /// Locking script of the output this input spends.
    pub fn script_pubkey<F>(&self, fetcher: &F, network: Network) -> Result<Script, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        Ok(self.prev_output(fetcher, network)?.script_pubkey)
    }
}
