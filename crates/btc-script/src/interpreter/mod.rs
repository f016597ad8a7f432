//! Stack-based script engine.
//!
//! Runs a flat queue of commands against a main stack. Data pushes go onto
//! the stack as-is; opcodes are looked up in a compile-time table. After each
//! push the engine checks whether the stack and the pending commands match a
//! pay-to-script-hash or pay-to-witness pattern, and if so splices the
//! redeem script or witness program into the queue so it runs next.
//!
//! Signature checks do not compute a digest themselves. The caller supplies
//! the digest `z` for the input being verified, which keeps this crate free
//! of any dependency on the transaction model.
//!
//! # Example
//!
//! ```ignore
//! use btc_script::{interpreter::EngineConfig, Script};
//!
//! let script = Script::from_asm("OP_2 OP_2 OP_ADD OP_4 OP_EQUAL")?;
//! assert!(script.evaluate_with_config(&z, None, &EngineConfig::default()));
//! ```

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod ops_arithmetic;
pub mod ops_crypto;
pub mod ops_stack;
pub mod queue;
pub mod scriptnum;
pub mod stack;

pub use config::EngineConfig;
pub use context::ExecutionContext;
pub use error::{ExecutionError, ExecutionErrorCode};
pub use queue::WorkQueue;
pub use scriptnum::ScriptNumber;
pub use stack::Stack;
