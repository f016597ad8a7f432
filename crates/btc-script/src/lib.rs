/// Bitcoin Script - commands, addresses and evaluation.
///
/// Provides the command model (opcodes and data pushes), the `Script` type
/// with its wire, hex and ASM forms, P2PKH/P2SH addresses, and a stack-based
/// engine that redeems P2SH, P2WPKH and P2WSH spends by splicing.

pub mod address;
pub mod command;
pub mod interpreter;
pub mod opcodes;
pub mod script;

mod error;
pub use address::{Address, AddressKind};
pub use command::{Command, PushData};
pub use error::ScriptError;
pub use script::Script;
