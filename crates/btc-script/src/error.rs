/// Error types for script operations.
///
/// Covers parsing errors, encoding/decoding failures and address validation.
/// Evaluation failures are not errors: `Script::evaluate` returns `false`.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Generic invalid script error.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// An ASM token that is neither a known opcode name nor hex data.
    #[error("invalid ASM token '{0}'")]
    InvalidAsmToken(String),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid address length after Base58 decoding.
    #[error("invalid address length for '{0}'")]
    InvalidAddressLength(String),

    /// Address version byte is not a known P2PKH or P2SH prefix.
    #[error("address not supported {0}")]
    UnsupportedAddress(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// A push longer than the 520-byte element limit.
    #[error("push of {0} bytes exceeds the 520-byte limit")]
    PushTooLarge(usize),

    /// Script index is out of range.
    #[error("script index out of range")]
    IndexOutOfRange,

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
