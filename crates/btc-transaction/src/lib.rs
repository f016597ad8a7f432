/// Bitcoin transactions - parsing, signature hashing, signing and verification.
///
/// Provides the Transaction type with legacy and segwit wire formats, the
/// legacy and BIP143 signature digests, per-input verification through the
/// script engine, and the `TxFetcher` collaborator used to resolve the
/// outputs being spent.

pub mod fetcher;
pub mod input;
pub mod output;
pub mod sighash;
pub mod transaction;
pub mod verify;

mod error;
pub use error::TransactionError;
pub use fetcher::{CachingFetcher, FetcherConfig, MemoryFetcher, TxFetcher};
pub use input::TransactionInput;
pub use output::TransactionOutput;
pub use transaction::Transaction;

#[cfg(test)]
mod tests;
