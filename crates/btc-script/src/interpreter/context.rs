//! Execution state and the main evaluation loop.

use log::{debug, trace};
use num_bigint::BigUint;

use btc_primitives::hash::sha256;

use super::config::EngineConfig;
use super::dispatch::execute_opcode;
use super::error::{ExecutionError, ExecutionErrorCode};
use super::queue::WorkQueue;
use super::stack::{as_bool, Stack};
use crate::command::{decode_commands, Command};
use crate::opcodes::*;
use crate::Script;

/// State for one evaluation of a script.
///
/// The digest `z` that signatures are checked against and the witness items
/// of the input being verified are supplied up front; everything else starts
/// empty.
pub struct ExecutionContext {
    pub(crate) stack: Stack,
    pub(crate) alt_stack: Stack,
    pub(crate) queue: WorkQueue,
    pub(crate) z: BigUint,
    witness: Option<Vec<Vec<u8>>>,
    config: EngineConfig,
    executed: usize,
}

impl ExecutionContext {
    /// Prepare to run `commands`.
    ///
    /// # Arguments
    /// * `commands` - The commands to run, in order.
    /// * `z` - The signature digest used by `OP_CHECKSIG` and `OP_CHECKMULTISIG`.
    /// * `witness` - Witness items of the input, if it has any.
    /// * `config` - Engine limits.
    pub fn new(
        commands: impl IntoIterator<Item = Command>,
        z: BigUint,
        witness: Option<Vec<Vec<u8>>>,
        config: EngineConfig,
    ) -> Self {
        ExecutionContext {
            stack: Stack::new(config.max_num_len),
            alt_stack: Stack::new(config.max_num_len),
            queue: WorkQueue::new(commands),
            z,
            witness,
            config,
            executed: 0,
        }
    }

    /// Run every pending command, then check the result.
    ///
    /// The alternate stack is cleared before and after the run.
    ///
    /// # Returns
    /// `Ok(())` if the main stack ends non-empty with a truthy top item,
    /// otherwise the first reason evaluation stopped.
    pub fn run(&mut self) -> Result<(), ExecutionError> {
        self.alt_stack.clear();
        let result = self.execute_all().and_then(|()| self.check_final());
        self.alt_stack.clear();
        result
    }

    /// The main stack, bottom first.
    pub fn stack(&self) -> &[Vec<u8>] {
        self.stack.items()
    }

    /// Number of commands executed so far.
    pub fn executed(&self) -> usize {
        self.executed
    }

    fn execute_all(&mut self) -> Result<(), ExecutionError> {
        loop {
            if self.queue.len() > self.config.max_pending_commands {
                return Err(ExecutionError::new(
                    ExecutionErrorCode::QueueOverflow,
                    format!(
                        "{} pending commands exceeds the limit of {}",
                        self.queue.len(),
                        self.config.max_pending_commands
                    ),
                ));
            }
            let Some(cmd) = self.queue.next() else {
                return Ok(());
            };
            self.executed += 1;
            if self.executed > self.config.max_executed_commands {
                return Err(ExecutionError::new(
                    ExecutionErrorCode::TooManyOperations,
                    format!(
                        "exceeded max operation limit of {}",
                        self.config.max_executed_commands
                    ),
                ));
            }

            match cmd {
                Command::Opcode(op) => {
                    trace!(
                        "step {}: {} (stack depth {})",
                        self.queue.cursor(),
                        Command::Opcode(op),
                        self.stack.depth()
                    );
                    execute_opcode(self, op)?;
                }
                Command::PushData(data) => {
                    trace!("step {}: push {} bytes", self.queue.cursor(), data.len());
                    self.stack.push_byte_array(data.into_bytes());
                    self.after_push()?;
                }
            }
        }
    }

    fn check_final(&self) -> Result<(), ExecutionError> {
        let top = self.stack.peek_byte_array(0).map_err(|_| {
            ExecutionError::new(
                ExecutionErrorCode::EmptyStack,
                "stack empty at end of script execution",
            )
        })?;
        if !as_bool(top) {
            return Err(ExecutionError::new(
                ExecutionErrorCode::EvalFalse,
                "false stack entry at end of script execution",
            ));
        }
        Ok(())
    }

    /// Redemption rules checked after every push, in priority order.
    fn after_push(&mut self) -> Result<(), ExecutionError> {
        if self.p2sh_pending() {
            return self.unlock_p2sh();
        }
        match self.witness_program() {
            Some(20) => self.unlock_p2wpkh(),
            Some(32) => self.unlock_p2wsh(),
            _ => Ok(()),
        }
    }

    /// Whether the pending commands are exactly `HASH160 <20 bytes> EQUAL`.
    fn p2sh_pending(&self) -> bool {
        let mut rest = self.queue.upcoming();
        matches!(
            (rest.next(), rest.next(), rest.next(), rest.next()),
            (
                Some(Command::Opcode(OP_HASH160)),
                Some(Command::PushData(h)),
                Some(Command::Opcode(OP_EQUAL)),
                None,
            ) if h.len() == 20
        )
    }

    /// Length of the program if the stack is exactly `<empty> <program>`.
    fn witness_program(&self) -> Option<usize> {
        match self.stack.items() {
            [version, program] if version.is_empty() => Some(program.len()),
            _ => None,
        }
    }

    /// The item just pushed is a redeem script: check it against the hash
    /// that follows, then run it in place of the hash check.
    fn unlock_p2sh(&mut self) -> Result<(), ExecutionError> {
        let redeem = self.stack.peek_byte_array(0)?.to_vec();
        let expected = match self.queue.upcoming().nth(1).and_then(Command::as_push) {
            Some(h) => h.bytes().into_owned(),
            None => return Ok(()),
        };
        self.queue.skip(3);

        execute_opcode(self, OP_HASH160)?;
        self.stack.push_byte_array(expected);
        execute_opcode(self, OP_EQUAL)?;
        execute_opcode(self, OP_VERIFY)?;

        let commands = decode_commands(&redeem).map_err(|e| {
            ExecutionError::new(
                ExecutionErrorCode::MalformedScript,
                format!("redeem script does not parse: {}", e),
            )
        })?;
        debug!("p2sh: splicing {} redeem commands", commands.len());
        self.queue.splice_next(commands);
        Ok(())
    }

    /// `<empty> <20-byte hash>`: run the witness items against a P2PKH
    /// check of the hash.
    fn unlock_p2wpkh(&mut self) -> Result<(), ExecutionError> {
        let h160: [u8; 20] = self.stack.pop_byte_array()?.try_into().map_err(|_| {
            ExecutionError::new(
                ExecutionErrorCode::InvalidStackOperation,
                "witness program is not 20 bytes",
            )
        })?;
        self.stack.pop_byte_array()?;

        let mut spliced: Vec<Command> = self
            .witness
            .iter()
            .flatten()
            .map(|item| Command::push(item.clone()))
            .collect();
        spliced.extend(Script::p2pkh(&h160).commands().iter().cloned());
        debug!("p2wpkh: splicing {} commands", spliced.len());
        self.queue.splice_next(spliced);
        Ok(())
    }

    /// `<empty> <32-byte hash>`: the last witness item is the witness script,
    /// which must hash to the program. The other items are pushed first.
    fn unlock_p2wsh(&mut self) -> Result<(), ExecutionError> {
        let s256 = self.stack.pop_byte_array()?;
        self.stack.pop_byte_array()?;

        let (script_bytes, items) = match self.witness.as_deref().and_then(<[_]>::split_last) {
            Some(split) => split,
            None => {
                return Err(ExecutionError::new(
                    ExecutionErrorCode::MissingWitness,
                    "p2wsh program with no witness script",
                ))
            }
        };
        if sha256(script_bytes)[..] != s256[..] {
            return Err(ExecutionError::new(
                ExecutionErrorCode::WitnessScriptMismatch,
                "witness script does not hash to the program",
            ));
        }
        let witness_script = decode_commands(script_bytes).map_err(|e| {
            ExecutionError::new(
                ExecutionErrorCode::MalformedScript,
                format!("witness script does not parse: {}", e),
            )
        })?;

        let mut spliced: Vec<Command> = items.iter().map(|item| Command::push(item.clone())).collect();
        spliced.extend(witness_script);
        debug!("p2wsh: splicing {} commands", spliced.len());
        self.queue.splice_next(spliced);
        Ok(())
    }
}
