//! Arithmetic operations for the script engine.

use super::context::ExecutionContext;
use super::error::ExecutionError;
use super::scriptnum::ScriptNumber;

impl ExecutionContext {
    pub(crate) fn op_add(&mut self, _op: u8) -> Result<(), ExecutionError> {
        let mut v0 = self.stack.pop_int()?;
        let v1 = self.stack.pop_int()?;
        v0.add(&v1);
        self.stack.push_int(&v0);
        Ok(())
    }

    pub(crate) fn op_mul(&mut self, _op: u8) -> Result<(), ExecutionError> {
        let mut n1 = self.stack.pop_int()?;
        let n2 = self.stack.pop_int()?;
        n1.mul(&n2);
        self.stack.push_int(&n1);
        Ok(())
    }

    /// Push 1 if the top item is zero, otherwise 0.
    pub(crate) fn op_not(&mut self, _op: u8) -> Result<(), ExecutionError> {
        let m = self.stack.pop_int()?;
        let n = if m.is_zero() { 1 } else { 0 };
        self.stack.push_int(&ScriptNumber::new(n));
        Ok(())
    }
}
