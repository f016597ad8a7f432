//! Constant, stack and equality operations.

use super::context::ExecutionContext;
use super::error::{ExecutionError, ExecutionErrorCode};
use super::scriptnum::encode_num;
use crate::opcodes::small_int_value;

impl ExecutionContext {
    /// `OP_0`, `OP_1`..`OP_16`: push the small integer the opcode names.
    pub(crate) fn op_small_int(&mut self, op: u8) -> Result<(), ExecutionError> {
        let n = small_int_value(op).ok_or_else(|| {
            ExecutionError::new(
                ExecutionErrorCode::UnknownOpcode,
                format!("opcode 0x{:02x} is not a small integer", op),
            )
        })?;
        self.stack.push_byte_array(encode_num(n as i64));
        Ok(())
    }

    pub(crate) fn op_dup(&mut self, _op: u8) -> Result<(), ExecutionError> {
        self.stack.dup_n(1)
    }

    pub(crate) fn op_2dup(&mut self, _op: u8) -> Result<(), ExecutionError> {
        self.stack.dup_n(2)
    }

    pub(crate) fn op_swap(&mut self, _op: u8) -> Result<(), ExecutionError> {
        self.stack.swap()
    }

    pub(crate) fn op_verify(&mut self, _op: u8) -> Result<(), ExecutionError> {
        if !self.stack.pop_bool()? {
            return Err(ExecutionError::new(
                ExecutionErrorCode::Verify,
                "OP_VERIFY failed",
            ));
        }
        Ok(())
    }

    pub(crate) fn op_equal(&mut self, _op: u8) -> Result<(), ExecutionError> {
        let a = self.stack.pop_byte_array()?;
        let b = self.stack.pop_byte_array()?;
        self.stack.push_bool(a == b);
        Ok(())
    }

    pub(crate) fn op_equalverify(&mut self, op: u8) -> Result<(), ExecutionError> {
        self.op_equal(op)?;
        if !self.stack.pop_bool()? {
            return Err(ExecutionError::new(
                ExecutionErrorCode::EqualVerify,
                "OP_EQUALVERIFY failed",
            ));
        }
        Ok(())
    }
}
