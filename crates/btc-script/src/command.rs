//! Script commands and their wire encoding.
//!
//! A command is either an opcode, which the engine executes, or a data push,
//! which the engine places on the stack verbatim. This module decodes raw
//! script bytes into commands and encodes pushes with the right length prefix.

use std::borrow::Cow;
use std::fmt;

use crate::interpreter::scriptnum::encode_num;
use crate::opcodes::*;
use crate::ScriptError;

/// Largest single push the wire format accepts.
pub const MAX_PUSH_SIZE: usize = 520;

/// Hex text that is known to decode.
///
/// Keeps the original spelling for display while carrying the decoded bytes.
#[derive(Clone, Debug)]
pub struct HexString {
    text: String,
    bytes: Vec<u8>,
}

impl HexString {
    /// Parse a hex string, rejecting odd lengths and non-hex characters.
    pub fn new(text: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(text)?;
        Ok(HexString {
            text: text.to_string(),
            bytes,
        })
    }

    /// The text as given.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The decoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// The payload of a data push.
///
/// Every variant reduces to a byte string; two pushes are equal when those
/// byte strings are equal, whatever their variants.
#[derive(Clone, Debug)]
pub enum PushData {
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Bytes given as hex text.
    Hex(HexString),
    /// An integer, stored the way numeric opcodes read it.
    Int(i64),
    /// UTF-8 text.
    Text(String),
}

impl PushData {
    /// The bytes this push places on the stack.
    pub fn bytes(&self) -> Cow<'_, [u8]> {
        match self {
            PushData::Bytes(b) => Cow::Borrowed(b.as_slice()),
            PushData::Hex(h) => Cow::Borrowed(h.as_bytes()),
            PushData::Int(n) => Cow::Owned(encode_num(*n)),
            PushData::Text(s) => Cow::Borrowed(s.as_bytes()),
        }
    }

    /// Length of the pushed bytes.
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Whether the push is the empty byte string.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the push, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            PushData::Bytes(b) => b,
            PushData::Hex(h) => h.bytes,
            PushData::Text(s) => s.into_bytes(),
            PushData::Int(n) => encode_num(n),
        }
    }
}

impl PartialEq for PushData {
    fn eq(&self, other: &Self) -> bool {
        self.bytes() == other.bytes()
    }
}

impl Eq for PushData {}

/// One element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// An executable opcode.
    Opcode(u8),
    /// A data push.
    PushData(PushData),
}

impl Command {
    /// A push of raw bytes.
    pub fn push(data: impl Into<Vec<u8>>) -> Self {
        Command::PushData(PushData::Bytes(data.into()))
    }

    /// A push of an integer in script-number form.
    pub fn push_int(n: i64) -> Self {
        Command::PushData(PushData::Int(n))
    }

    /// A push of UTF-8 text.
    pub fn push_text(s: impl Into<String>) -> Self {
        Command::PushData(PushData::Text(s.into()))
    }

    /// A push of hex-encoded bytes.
    pub fn push_hex(s: &str) -> Result<Self, ScriptError> {
        Ok(Command::PushData(PushData::Hex(HexString::new(s)?)))
    }

    /// Whether the engine executes this command rather than pushing it.
    pub fn is_executable(&self) -> bool {
        matches!(self, Command::Opcode(_))
    }

    /// The opcode byte, if this is an opcode.
    pub fn opcode(&self) -> Option<u8> {
        match self {
            Command::Opcode(op) => Some(*op),
            Command::PushData(_) => None,
        }
    }

    /// The push payload, if this is a data push.
    pub fn as_push(&self) -> Option<&PushData> {
        match self {
            Command::Opcode(_) => None,
            Command::PushData(data) => Some(data),
        }
    }

    /// Encode the command on its own.
    ///
    /// # Returns
    /// The opcode byte, or the length prefix followed by the data.
    /// `PushTooLarge` if the push exceeds 520 bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ScriptError> {
        self.check_size()?;
        let mut out = Vec::new();
        self.encode_into(&mut out);
        Ok(out)
    }

    pub(crate) fn check_size(&self) -> Result<(), ScriptError> {
        match self {
            Command::PushData(data) if data.len() > MAX_PUSH_SIZE => {
                Err(ScriptError::PushTooLarge(data.len()))
            }
            _ => Ok(()),
        }
    }

    /// Append the encoding to `out`. Push sizes must already be checked.
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Command::Opcode(op) => out.push(*op),
            Command::PushData(data) => {
                let bytes = data.bytes();
                out.extend_from_slice(&push_data_prefix(bytes.len()));
                out.extend_from_slice(&bytes);
            }
        }
    }

    /// Convert this command to its ASM token.
    ///
    /// Pushes are rendered as hex (the empty push as `OP_0`); opcodes use
    /// their canonical name, or `OP_UNKNOWN<n>` for bytes the engine does not
    /// execute.
    pub fn to_asm_string(&self) -> String {
        match self {
            Command::PushData(data) if data.is_empty() => "OP_0".to_string(),
            Command::PushData(data) => hex::encode(data.bytes()),
            Command::Opcode(op) => match opcode_name(*op) {
                Some(name) => name.to_string(),
                None => format!("OP_UNKNOWN{}", op),
            },
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_asm_string())
    }
}

/// Decode raw script bytes into commands.
///
/// Length codes 1-75 push that many bytes, `OP_PUSHDATA1` and `OP_PUSHDATA2`
/// carry a one- or two-byte little-endian length, and every other byte is an
/// opcode.
///
/// # Arguments
/// * `bytes` - The raw script bytes to decode.
///
/// # Returns
/// The commands, `DataTooSmall` if a push runs past the end of the input, or
/// `PushTooLarge` if a push exceeds 520 bytes.
pub fn decode_commands(bytes: &[u8]) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let op = bytes[pos];
        let (length, header) = match op {
            OP_DATA_1..=OP_DATA_75 => (op as usize, 1),
            OP_PUSHDATA1 => {
                let len = *bytes.get(pos + 1).ok_or(ScriptError::DataTooSmall)?;
                (len as usize, 2)
            }
            OP_PUSHDATA2 => {
                if bytes.len() < pos + 3 {
                    return Err(ScriptError::DataTooSmall);
                }
                (u16::from_le_bytes([bytes[pos + 1], bytes[pos + 2]]) as usize, 3)
            }
            _ => {
                commands.push(Command::Opcode(op));
                pos += 1;
                continue;
            }
        };

        if length > MAX_PUSH_SIZE {
            return Err(ScriptError::PushTooLarge(length));
        }
        let start = pos + header;
        if bytes.len() < start + length {
            return Err(ScriptError::DataTooSmall);
        }
        commands.push(Command::push(&bytes[start..start + length]));
        pos = start + length;
    }

    Ok(commands)
}

/// Length prefix for a push of `data_len` bytes (at most 520).
pub fn push_data_prefix(data_len: usize) -> Vec<u8> {
    if data_len <= OP_DATA_75 as usize {
        vec![data_len as u8]
    } else if data_len <= 0xff {
        vec![OP_PUSHDATA1, data_len as u8]
    } else {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        buf
    }
}
