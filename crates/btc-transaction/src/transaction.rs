//! Core transaction type.
//!
//! Represents a complete transaction with version, inputs, outputs, locktime
//! and, for segwit transactions, per-input witness items. Supports the legacy
//! and segwit wire formats, transaction id computation, coinbase detection
//! and fee calculation. Coinbase status, coinbase height and the BIP143
//! aggregate hashes are derived once when the transaction is built.

use std::fmt;

use log::warn;

use btc_primitives::hash::sha256d;
use btc_primitives::util::{ByteReader, ByteWriter};
use btc_primitives::Network;
use btc_script::Script;

use crate::fetcher::TxFetcher;
use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash::SegwitDigests;
use crate::TransactionError;

/// Marker byte that replaces the input count in a segwit serialization.
const SEGWIT_MARKER: u8 = 0x00;

/// Flag byte that must follow the segwit marker.
const SEGWIT_FLAG: u8 = 0x01;

/// Smallest possible encoded input: outpoint, empty script, sequence.
const MIN_INPUT_SIZE: usize = 41;

/// Smallest possible encoded output: amount and empty script.
const MIN_OUTPUT_SIZE: usize = 9;

/// A transaction consisting of a version, inputs, outputs and a lock time.
///
/// # Wire format
///
/// | Field        | Size                        |
/// |--------------|-----------------------------|
/// | version      | 4 bytes (LE)                |
/// | marker, flag | 2 bytes, segwit only        |
/// | input count  | VarInt                      |
/// | inputs       | variable (per input)        |
/// | output count | VarInt                      |
/// | outputs      | variable (per output)       |
/// | witnesses    | per input, segwit only      |
/// | lock_time    | 4 bytes (LE)                |
///
/// Inputs and outputs are fixed at construction. Only scriptSigs and
/// witnesses may be assigned afterwards (see `set_script_sig`), since
/// neither feeds the derived values.
#[derive(Clone, Debug)]
pub struct Transaction {
    version: u32,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
    locktime: u32,
    segwit: bool,
    network: Network,
    coinbase: bool,
    coinbase_height: Option<u64>,
    digests: SegwitDigests,
}

impl Transaction {
    /// Build a transaction from its parts.
    ///
    /// The transaction is segwit if any input carries witness items. The
    /// network defaults to mainnet; see `with_network`.
    ///
    /// # Arguments
    /// * `version` - Transaction format version.
    /// * `inputs` - The inputs, in order.
    /// * `outputs` - The outputs, in order.
    /// * `locktime` - Lock time.
    ///
    /// # Returns
    /// A `Transaction` with its derived values computed.
    pub fn new(
        version: u32,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        locktime: u32,
    ) -> Self {
        let segwit = inputs.iter().any(|i| i.witness.is_some());
        Self::from_parts(version, inputs, outputs, locktime, segwit)
    }

    fn from_parts(
        version: u32,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        locktime: u32,
        segwit: bool,
    ) -> Self {
        let mut inputs = inputs;
        for input in inputs.iter_mut() {
            normalize_unlocking(input);
        }
        let digests = SegwitDigests::compute(&inputs, &outputs);
        let mut tx = Transaction {
            version,
            inputs,
            outputs,
            locktime,
            segwit,
            network: Network::default(),
            coinbase: false,
            coinbase_height: None,
            digests,
        };
        tx.derive_coinbase();
        tx
    }

    fn derive_coinbase(&mut self) {
        self.coinbase = matches!(self.inputs.as_slice(), [only] if only.is_null_outpoint());
        self.coinbase_height = if self.coinbase {
            self.inputs[0].script_sig.as_ref().and_then(height_from_script_sig)
        } else {
            None
        };
    }

    /// Assign the network the transaction and its inputs live on.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string of the raw transaction bytes.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `TransactionError` if the hex is
    /// invalid or the bytes do not form a valid transaction.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str).map_err(|e| {
            TransactionError::SerializationError(format!("invalid hex: {}", e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction from raw bytes.
    ///
    /// The slice must contain exactly one complete transaction with no
    /// trailing data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Deserialize a transaction from a `ByteReader`.
    ///
    /// A zero byte where the input count belongs is the segwit marker; it
    /// must be followed by the flag `0x01`, and witness stacks for every
    /// input are then read after the outputs. An input with an empty
    /// witness stack gets `None`.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of a serialized transaction.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `TransactionError` on truncated
    /// or malformed data.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading version: {}", e))
        })?;

        let segwit = reader.peek_u8() == Some(SEGWIT_MARKER);
        if segwit {
            reader.read_u8().map_err(|e| {
                TransactionError::SerializationError(format!("reading segwit marker: {}", e))
            })?;
            let flag = reader.read_u8().map_err(|e| {
                TransactionError::SerializationError(format!("reading segwit flag: {}", e))
            })?;
            if flag != SEGWIT_FLAG {
                return Err(TransactionError::SerializationError(format!(
                    "segwit marker followed by flag {:#04x}, expected 0x01",
                    flag
                )));
            }
        }

        let input_count = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading input count: {}", e))
        })?;
        let mut inputs = Vec::with_capacity(capacity_hint(
            input_count.value(),
            reader.remaining() / MIN_INPUT_SIZE,
        ));
        for _ in 0..input_count.value() {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading output count: {}", e))
        })?;
        let mut outputs = Vec::with_capacity(capacity_hint(
            output_count.value(),
            reader.remaining() / MIN_OUTPUT_SIZE,
        ));
        for _ in 0..output_count.value() {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        if segwit {
            for input in inputs.iter_mut() {
                let items = read_witness(reader)?;
                input.witness = (!items.is_empty()).then_some(items);
            }
        }

        let locktime = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading lock time: {}", e))
        })?;

        Ok(Self::from_parts(version, inputs, outputs, locktime, segwit))
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Serialize this transaction, including witness data if it is segwit.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize(self.segwit)
    }

    /// Serialize this transaction without marker, flag or witnesses.
    pub fn to_bytes_legacy(&self) -> Vec<u8> {
        self.serialize(false)
    }

    fn serialize(&self, with_witness: bool) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        writer.write_u32_le(self.version);
        if with_witness {
            writer.write_u8(SEGWIT_MARKER);
            writer.write_u8(SEGWIT_FLAG);
        }

        writer.write_varint(self.inputs.len().into());
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(self.outputs.len().into());
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        if with_witness {
            for input in &self.inputs {
                let items = input.witness.as_deref().unwrap_or_default();
                writer.write_varint(items.len().into());
                for item in items {
                    writer.write_var_bytes(item);
                }
            }
        }

        writer.write_u32_le(self.locktime);
        writer.into_bytes()
    }

    /// Serialize this transaction to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    // -----------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------

    /// Transaction hash in display order: the byte-reversed double SHA-256
    /// of the legacy serialization.
    pub fn hash(&self) -> [u8; 32] {
        let mut hash = sha256d(&self.to_bytes_legacy());
        hash.reverse();
        hash
    }

    /// Transaction id as hex. Witness data never affects it.
    pub fn id(&self) -> String {
        hex::encode(self.hash())
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Transaction format version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The inputs, in order.
    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    /// The outputs, in order.
    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    /// Lock time.
    pub fn locktime(&self) -> u32 {
        self.locktime
    }

    /// Whether the transaction uses the segwit serialization.
    pub fn is_segwit(&self) -> bool {
        self.segwit
    }

    /// Network the transaction lives on.
    pub fn network(&self) -> Network {
        self.network
    }

    /// The BIP143 aggregate hashes, computed at construction.
    pub fn segwit_digests(&self) -> &SegwitDigests {
        &self.digests
    }

    /// The input at `index`, or `InputIndexOutOfRange`.
    pub fn input(&self, index: usize) -> Result<&TransactionInput, TransactionError> {
        self.inputs
            .get(index)
            .ok_or(TransactionError::InputIndexOutOfRange {
                index,
                count: self.inputs.len(),
            })
    }

    pub(crate) fn input_mut(&mut self, index: usize) -> Result<&mut TransactionInput, TransactionError> {
        let count = self.inputs.len();
        self.inputs
            .get_mut(index)
            .ok_or(TransactionError::InputIndexOutOfRange { index, count })
    }

    /// Replace the scriptSig of one input.
    pub fn set_script_sig(&mut self, index: usize, script_sig: Script) -> Result<(), TransactionError> {
        let input = self.input_mut(index)?;
        input.script_sig = Some(script_sig);
        normalize_unlocking(input);
        self.derive_coinbase();
        Ok(())
    }

    /// Replace the witness items of one input. The transaction becomes segwit.
    ///
    /// An empty item list leaves the input without a witness, which is how
    /// a zero-item witness parses back.
    pub fn set_witness(&mut self, index: usize, witness: Vec<Vec<u8>>) -> Result<(), TransactionError> {
        let input = self.input_mut(index)?;
        input.witness = Some(witness);
        normalize_unlocking(input);
        self.segwit = true;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Coinbase
    // -----------------------------------------------------------------

    /// Whether this is a coinbase transaction: exactly one input, spending
    /// the all-zero txid at index `0xFFFFFFFF`.
    pub fn is_coinbase(&self) -> bool {
        self.coinbase
    }

    /// Block height committed to by a coinbase transaction.
    ///
    /// # Returns
    /// The little-endian value of the first scriptSig push, or `None` if
    /// this is not a coinbase or the scriptSig does not start with a push of
    /// one to eight bytes.
    pub fn coinbase_height(&self) -> Option<u64> {
        self.coinbase_height
    }

    // -----------------------------------------------------------------
    // Fee
    // -----------------------------------------------------------------

    /// Total amount of the outputs. Summed as `u128`, so no combination of
    /// wire amounts overflows.
    pub fn total_output_amount(&self) -> u128 {
        self.outputs.iter().map(|o| u128::from(o.amount)).sum()
    }

    /// Input value minus output value, in satoshis.
    ///
    /// # Arguments
    /// * `fetcher` - Source of the previous transactions the inputs spend.
    ///
    /// # Returns
    /// The fee, which is negative for a transaction that spends more than it
    /// has, the first error resolving a previous output, or
    /// `InvalidTransaction` if the fee does not fit in an `i64`.
    pub fn fee<F>(&self, fetcher: &F) -> Result<i64, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        let fee = self.fee_wide(fetcher)?;
        i64::try_from(fee).map_err(|_| {
            TransactionError::InvalidTransaction(format!("fee {} does not fit in 64 bits", fee))
        })
    }

    /// The fee without narrowing. Both totals are sums of `u64` values and
    /// stay far below `i128::MAX`.
    pub(crate) fn fee_wide<F>(&self, fetcher: &F) -> Result<i128, TransactionError>
    where
        F: TxFetcher + ?Sized,
    {
        let mut input_total: u128 = 0;
        for input in &self.inputs {
            input_total += u128::from(input.value(fetcher, self.network)?);
        }
        let output_total = self.total_output_amount();
        let fee = if input_total >= output_total {
            i128::try_from(input_total - output_total)
        } else {
            i128::try_from(output_total - input_total).map(|d| -d)
        }
        .map_err(|_| TransactionError::InvalidTransaction("fee out of range".to_string()))?;
        if fee < 0 {
            warn!("transaction {} has negative fee {}", self.id(), fee);
        }
        Ok(fee)
    }
}

/// Equality covers the serialized content; the network is not compared.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.locktime == other.locktime
            && self.segwit == other.segwit
    }
}

impl fmt::Display for Transaction {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Empty unlocking data serializes the same as none, so it is stored as none.
fn normalize_unlocking(input: &mut TransactionInput) {
    if input.script_sig.as_ref().is_some_and(Script::is_empty) {
        input.script_sig = None;
    }
    if input.witness.as_ref().is_some_and(Vec::is_empty) {
        input.witness = None;
    }
}

fn capacity_hint(count: u64, max_possible: usize) -> usize {
    usize::try_from(count).map_or(max_possible, |c| c.min(max_possible))
}

fn read_witness(reader: &mut ByteReader<'_>) -> Result<Vec<Vec<u8>>, TransactionError> {
    let count = reader.read_varint().map_err(|e| {
        TransactionError::SerializationError(format!("reading witness count: {}", e))
    })?;
    let mut items = Vec::with_capacity(capacity_hint(count.value(), reader.remaining()));
    for _ in 0..count.value() {
        let item = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading witness item: {}", e))
        })?;
        items.push(item.to_vec());
    }
    Ok(items)
}

fn height_from_script_sig(script_sig: &Script) -> Option<u64> {
    let push = script_sig.command(0)?.as_push()?;
    let bytes = push.bytes();
    if bytes.is_empty() || bytes.len() > 8 {
        return None;
    }
    let mut le = [0u8; 8];
    le[..bytes.len()].copy_from_slice(&bytes);
    Some(u64::from_le_bytes(le))
}
