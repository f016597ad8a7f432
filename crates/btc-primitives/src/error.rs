/// Unified error type for all primitives operations.
///
/// Covers malformed encodings (hex, Base58, SEC, DER, WIF) and invalid
/// field or curve operations. None of these are ever silently corrected.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid WIF format: {0}")]
    InvalidWif(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error("number {num} not in field range 0 to {max}")]
    FieldOutOfRange { num: String, max: String },

    #[error("cannot combine elements of different fields")]
    FieldMismatch,

    #[error("division by zero in field")]
    DivisionByZero,

    #[error("point not on curve")]
    PointNotOnCurve,

    #[error("points are not on the same curve")]
    CurveMismatch,

    #[error("scalar must not be negative")]
    NegativeScalar,

    #[error("{0}")]
    Other(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
