/// Bitcoin Script type - an ordered sequence of commands.
///
/// Scripts are used in transaction inputs (unlocking) and outputs (locking)
/// to define spending conditions. A `Script` holds parsed commands and
/// provides construction, classification, serialization, ASM output and
/// evaluation.
use std::fmt;

use log::debug;
use num_bigint::BigUint;

use btc_primitives::ec::S256Point;
use btc_primitives::util::{ByteReader, ByteWriter};
use btc_primitives::Network;

use crate::address::{Address, AddressKind};
use crate::command::{decode_commands, Command};
use crate::interpreter::{EngineConfig, ExecutionContext};
use crate::opcodes::*;
use crate::ScriptError;

/// A Bitcoin script. Immutable once built.
///
/// Two scripts are equal when they serialize to the same bytes.
#[derive(Clone)]
pub struct Script {
    commands: Vec<Command>,
}

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a script from commands.
    ///
    /// # Arguments
    /// * `commands` - The commands in execution order.
    ///
    /// # Returns
    /// The script, or `PushTooLarge` if any push exceeds 520 bytes.
    pub fn new(commands: Vec<Command>) -> Result<Self, ScriptError> {
        for cmd in &commands {
            cmd.check_size()?;
        }
        Ok(Script { commands })
    }

    /// The script with no commands.
    pub fn empty() -> Self {
        Script {
            commands: Vec::new(),
        }
    }

    /// Parse raw script bytes (no length prefix).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScriptError> {
        Ok(Script {
            commands: decode_commands(bytes)?,
        })
    }

    /// Create a script from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string (e.g. "76a914...88ac").
    ///
    /// # Returns
    /// The parsed `Script`, or an error if the hex or the script is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// Create a script from space-separated ASM.
    ///
    /// Tokens are opcode names (`OP_DUP`, `OP_0`, `OP_UNKNOWN186`, ...) or
    /// hex data to push.
    ///
    /// # Arguments
    /// * `asm` - A space-separated ASM string.
    ///
    /// # Returns
    /// A `Script`, or an error if any token is invalid.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let commands = asm
            .split_whitespace()
            .map(parse_asm_token)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(commands)
    }

    /// Read a varint length-prefixed script, as it appears in a transaction.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, ScriptError> {
        let bytes = reader.read_var_bytes()?;
        Self::from_bytes(bytes)
    }

    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    /// `OP_DUP OP_HASH160 <h160> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn p2pkh(h160: &[u8; 20]) -> Self {
        Script {
            commands: vec![
                Command::Opcode(OP_DUP),
                Command::Opcode(OP_HASH160),
                Command::push(h160.to_vec()),
                Command::Opcode(OP_EQUALVERIFY),
                Command::Opcode(OP_CHECKSIG),
            ],
        }
    }

    /// `OP_HASH160 <h160> OP_EQUAL`
    pub fn p2sh(h160: &[u8; 20]) -> Self {
        Script {
            commands: vec![
                Command::Opcode(OP_HASH160),
                Command::push(h160.to_vec()),
                Command::Opcode(OP_EQUAL),
            ],
        }
    }

    /// `OP_0 <h160>`
    pub fn p2wpkh(h160: &[u8; 20]) -> Self {
        Script {
            commands: vec![Command::Opcode(OP_0), Command::push(h160.to_vec())],
        }
    }

    /// `OP_0 <sha256>`
    pub fn p2wsh(s256: &[u8; 32]) -> Self {
        Script {
            commands: vec![Command::Opcode(OP_0), Command::push(s256.to_vec())],
        }
    }

    /// Bare `m`-of-`n` multisig: `OP_m <key>... OP_n OP_CHECKMULTISIG`.
    ///
    /// # Arguments
    /// * `required` - Number of signatures needed.
    /// * `keys` - Public keys, in the order signatures must follow.
    /// * `compressed` - SEC form used for the keys.
    ///
    /// # Returns
    /// The script, or `InvalidScript` unless `1 <= required <= keys.len() <= 16`.
    pub fn multisig(
        required: usize,
        keys: &[S256Point],
        compressed: bool,
    ) -> Result<Self, ScriptError> {
        let small = |n: usize| u8::try_from(n).ok().and_then(small_int_opcode);
        let (m, n) = match (small(required), small(keys.len())) {
            (Some(m), Some(n)) if required >= 1 && required <= keys.len() => (m, n),
            _ => {
                return Err(ScriptError::InvalidScript(format!(
                    "cannot build {}-of-{} multisig",
                    required,
                    keys.len()
                )))
            }
        };
        let mut commands = Vec::with_capacity(keys.len() + 3);
        commands.push(Command::Opcode(m));
        commands.extend(keys.iter().map(|k| Command::push(k.sec(compressed))));
        commands.push(Command::Opcode(n));
        commands.push(Command::Opcode(OP_CHECKMULTISIG));
        Ok(Script { commands })
    }

    /// The P2PKH locking script for a P2PKH address string.
    pub fn p2pkh_for_address(addr: &str) -> Result<Self, ScriptError> {
        let address = Address::from_string(addr)?;
        match address.kind {
            AddressKind::P2pkh => Ok(Self::p2pkh(&address.hash)),
            AddressKind::P2sh => Err(ScriptError::UnsupportedAddress(format!(
                "{} is a P2SH address",
                addr
            ))),
        }
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Raw script bytes, without a length prefix.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for cmd in &self.commands {
            cmd.encode_into(&mut out);
        }
        out
    }

    /// Script bytes behind a varint length, as written in a transaction.
    pub fn to_prefixed_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Write the varint length-prefixed form.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_var_bytes(&self.to_bytes());
    }

    /// Encode the raw script as a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Space-separated ASM, one token per command.
    pub fn to_asm(&self) -> String {
        self.commands
            .iter()
            .map(Command::to_asm_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn command(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// This script's commands followed by `other`'s.
    ///
    /// Verification combines scripts as `script_sig.concat(&script_pubkey)`
    /// so the unlocking commands run first.
    pub fn concat(&self, other: &Script) -> Script {
        let mut commands = self.commands.clone();
        commands.extend(other.commands.iter().cloned());
        Script { commands }
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// Pattern: OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    pub fn is_p2pkh(&self) -> bool {
        matches!(
            self.commands.as_slice(),
            [
                Command::Opcode(OP_DUP),
                Command::Opcode(OP_HASH160),
                Command::PushData(h),
                Command::Opcode(OP_EQUALVERIFY),
                Command::Opcode(OP_CHECKSIG),
            ] if h.len() == 20
        )
    }

    /// Pattern: OP_HASH160 <20 bytes> OP_EQUAL
    pub fn is_p2sh(&self) -> bool {
        matches!(
            self.commands.as_slice(),
            [
                Command::Opcode(OP_HASH160),
                Command::PushData(h),
                Command::Opcode(OP_EQUAL),
            ] if h.len() == 20
        )
    }

    /// Pattern: OP_0 <20 bytes>
    pub fn is_p2wpkh(&self) -> bool {
        self.witness_program_len() == Some(20)
    }

    /// Pattern: OP_0 <32 bytes>
    pub fn is_p2wsh(&self) -> bool {
        self.witness_program_len() == Some(32)
    }

    fn witness_program_len(&self) -> Option<usize> {
        match self.commands.as_slice() {
            [version, Command::PushData(program)] if is_version_zero(version) => {
                Some(program.len())
            }
            _ => None,
        }
    }

    /// The 20-byte hash a P2PKH, P2SH or P2WPKH script commits to.
    pub fn hash160(&self) -> Option<[u8; 20]> {
        let idx = if self.is_p2pkh() {
            2
        } else if self.is_p2sh() || self.is_p2wpkh() {
            1
        } else {
            return None;
        };
        let push = self.commands[idx].as_push()?;
        <[u8; 20]>::try_from(push.bytes().as_ref()).ok()
    }

    /// Base58Check address of a P2PKH or P2SH script.
    pub fn address(&self, network: Network) -> Option<Address> {
        let hash = self.hash160()?;
        if self.is_p2pkh() {
            Some(Address::from_public_key_hash(&hash, network))
        } else if self.is_p2sh() {
            Some(Address::from_script_hash(&hash, network))
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    /// Run the script with default engine limits.
    ///
    /// # Arguments
    /// * `z` - Digest that `OP_CHECKSIG`/`OP_CHECKMULTISIG` verify against.
    /// * `witness` - Witness items of the input being verified, if any.
    ///
    /// # Returns
    /// `true` if execution completes with a truthy item on top of the stack.
    pub fn evaluate(&self, z: &BigUint, witness: Option<&[Vec<u8>]>) -> bool {
        self.evaluate_with_config(z, witness, &EngineConfig::default())
    }

    /// Run the script with explicit engine limits.
    pub fn evaluate_with_config(
        &self,
        z: &BigUint,
        witness: Option<&[Vec<u8>]>,
        config: &EngineConfig,
    ) -> bool {
        let mut ctx = ExecutionContext::new(
            self.commands.iter().cloned(),
            z.clone(),
            witness.map(<[Vec<u8>]>::to_vec),
            *config,
        );
        match ctx.run() {
            Ok(()) => true,
            Err(e) => {
                debug!("script evaluation failed after {} commands: {}", ctx.executed(), e);
                false
            }
        }
    }
}

fn is_version_zero(cmd: &Command) -> bool {
    match cmd {
        Command::Opcode(op) => *op == OP_0,
        Command::PushData(data) => data.is_empty(),
    }
}

fn parse_asm_token(token: &str) -> Result<Command, ScriptError> {
    if let Some(op) = opcode_from_name(token) {
        return Ok(Command::Opcode(op));
    }
    if let Some(code) = token.strip_prefix("OP_UNKNOWN") {
        return code
            .parse::<u8>()
            .map(Command::Opcode)
            .map_err(|_| ScriptError::InvalidAsmToken(token.to_string()));
    }
    hex::decode(token)
        .map(Command::push)
        .map_err(|_| ScriptError::InvalidAsmToken(token.to_string()))
}

impl Default for Script {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Script {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Script {}

impl fmt::Display for Script {
    /// Display the script as ASM.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_asm())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
