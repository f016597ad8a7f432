#![deny(missing_docs)]

//! Bitcoin validation core.
//!
//! Re-exports the key, script and transaction crates for single-crate usage.

pub use btc_primitives as primitives;
pub use btc_script as script;
pub use btc_transaction as transaction;
