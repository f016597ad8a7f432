//! Reasons a script evaluation stops early.
//!
//! These never escape `Script::evaluate`, which reports a plain `false`; they
//! exist so the engine can log why and so tests can assert on the cause.

use std::fmt;

/// Error codes for the script engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionErrorCode {
    EmptyStack,
    EvalFalse,
    InvalidStackOperation,
    Verify,
    EqualVerify,
    NumberTooBig,
    MinimalData,
    UnknownOpcode,
    InvalidPubKeyCount,
    InvalidSignatureCount,
    TooManyOperations,
    QueueOverflow,
    MissingWitness,
    WitnessScriptMismatch,
    MalformedScript,
}

impl fmt::Display for ExecutionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A script engine error with an error code and description.
#[derive(Debug, Clone)]
pub struct ExecutionError {
    pub code: ExecutionErrorCode,
    pub description: String,
}

impl ExecutionError {
    pub fn new(code: ExecutionErrorCode, description: impl Into<String>) -> Self {
        ExecutionError {
            code,
            description: description.into(),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

impl std::error::Error for ExecutionError {}

/// Check if an error has a specific error code.
pub fn is_error_code(err: &ExecutionError, code: ExecutionErrorCode) -> bool {
    err.code == code
}
