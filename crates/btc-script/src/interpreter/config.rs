//! Engine limits.

/// Default cap on the number of commands a single evaluation may execute.
pub const MAX_EXECUTED_COMMANDS: usize = 10_000;
/// Default cap on the number of commands waiting in the work queue.
pub const MAX_PENDING_COMMANDS: usize = 10_000;
/// Default maximum byte length of a numeric operand.
pub const MAX_SCRIPT_NUMBER_LENGTH: usize = 4;

/// Limits applied to one evaluation.
///
/// Splicing (P2SH redeem scripts, witness programs) can grow the work queue
/// while it runs, so both the queue length and the total number of executed
/// commands are bounded. Exceeding either fails the evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_executed_commands: usize,
    pub max_pending_commands: usize,
    pub max_num_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_executed_commands: MAX_EXECUTED_COMMANDS,
            max_pending_commands: MAX_PENDING_COMMANDS,
            max_num_len: MAX_SCRIPT_NUMBER_LENGTH,
        }
    }
}
