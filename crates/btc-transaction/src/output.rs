//! Transaction output with an amount and a locking script.
//!
//! Provides binary serialization/deserialization following the Bitcoin wire
//! format.

use btc_primitives::util::{ByteReader, ByteWriter};
use btc_script::Script;

use crate::TransactionError;

/// A single output in a transaction.
///
/// # Wire format
///
/// | Field          | Size           |
/// |----------------|----------------|
/// | amount         | 8 bytes (LE)   |
/// | script length  | VarInt         |
/// | script_pubkey  | variable       |
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionOutput {
    /// Value locked by this output, in satoshis.
    pub amount: u64,

    /// The locking script (scriptPubKey) that defines spending conditions.
    pub script_pubkey: Script,
}

impl TransactionOutput {
    /// Create an output paying `amount` satoshis to `script_pubkey`.
    pub fn new(amount: u64, script_pubkey: Script) -> Self {
        TransactionOutput {
            amount,
            script_pubkey,
        }
    }

    /// Deserialize a `TransactionOutput` from a `ByteReader`.
    ///
    /// Reads the 8-byte LE amount and the varint-prefixed script.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded output.
    ///
    /// # Returns
    /// `Ok(TransactionOutput)` on success, or a `TransactionError` if the
    /// data is truncated or the script is malformed.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, TransactionError> {
        let amount = reader.read_u64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading amount: {}", e))
        })?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading scriptPubKey: {}", e))
        })?;

        let script_pubkey = Script::from_bytes(script_bytes).map_err(|e| {
            TransactionError::SerializationError(format!("parsing scriptPubKey: {}", e))
        })?;

        Ok(TransactionOutput {
            amount,
            script_pubkey,
        })
    }

    /// Serialize this output into a `ByteWriter`.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64_le(self.amount);
        self.script_pubkey.write_to(writer);
    }

    /// Serialize this output to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_wire_format() {
        let script = Script::from_hex("76a914bc3b654dca7e56b04dca18f2566cdaf02e8d9ada88ac")
            .expect("valid script");
        let output = TransactionOutput::new(32454049, script);
        assert_eq!(
            hex::encode(output.to_bytes()),
            "a135ef01000000001976a914bc3b654dca7e56b04dca18f2566cdaf02e8d9ada88ac"
        );

        let bytes = output.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        let parsed = TransactionOutput::read_from(&mut reader).expect("should parse");
        assert_eq!(parsed, output);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_truncated_output() {
        let bytes = hex::decode("a135ef01000000001976a914").expect("valid hex");
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            TransactionOutput::read_from(&mut reader),
            Err(TransactionError::SerializationError(_))
        ));
    }
}
