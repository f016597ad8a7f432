/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure cannot support the requested operation.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// Signing an input failed.
    #[error("signing error: {0}")]
    SigningError(String),
    /// The binary or hex encoding of a transaction is malformed.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// The previous-transaction collaborator could not supply a transaction.
    #[error("fetch error: {0}")]
    FetchError(String),
    /// A fetched transaction has no output at the referenced index.
    #[error("transaction {txid} has no output {index}")]
    PreviousOutputMissing {
        /// Id of the fetched transaction.
        txid: String,
        /// The output index the input refers to.
        index: u32,
    },
    /// An input index past the end of the input list.
    #[error("input index {index} out of range (tx has {count} inputs)")]
    InputIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of inputs in the transaction.
        count: usize,
    },
    /// An underlying script error (forwarded from `btc-script`).
    #[error("script error: {0}")]
    Script(#[from] btc_script::ScriptError),
    /// An underlying primitives error (forwarded from `btc-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
