//! Script execution stack.

use super::error::{ExecutionError, ExecutionErrorCode};
use super::scriptnum::ScriptNumber;

/// Convert byte array to boolean (Bitcoin consensus rules).
pub fn as_bool(t: &[u8]) -> bool {
    for i in 0..t.len() {
        if t[i] != 0 {
            // Negative 0 is also considered false
            if i == t.len() - 1 && t[i] == 0x80 {
                return false;
            }
            return true;
        }
    }
    false
}

/// Convert boolean to byte array.
pub fn from_bool(v: bool) -> Vec<u8> {
    if v {
        vec![1]
    } else {
        vec![]
    }
}

/// The main or alternate stack used by the script engine.
#[derive(Debug, Default, Clone)]
pub struct Stack {
    stk: Vec<Vec<u8>>,
    max_num_length: usize,
}

impl Stack {
    pub fn new(max_num_length: usize) -> Self {
        Stack {
            stk: Vec::new(),
            max_num_length,
        }
    }

    pub fn depth(&self) -> usize {
        self.stk.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stk.is_empty()
    }

    pub fn push_byte_array(&mut self, data: Vec<u8>) {
        self.stk.push(data);
    }

    pub fn push_int(&mut self, n: &ScriptNumber) {
        self.push_byte_array(n.to_bytes());
    }

    pub fn push_bool(&mut self, val: bool) {
        self.push_byte_array(from_bool(val));
    }

    pub fn pop_byte_array(&mut self) -> Result<Vec<u8>, ExecutionError> {
        self.stk.pop().ok_or_else(|| {
            ExecutionError::new(
                ExecutionErrorCode::InvalidStackOperation,
                "attempt to pop from an empty stack",
            )
        })
    }

    pub fn pop_int(&mut self) -> Result<ScriptNumber, ExecutionError> {
        let data = self.pop_byte_array()?;
        ScriptNumber::from_bytes(&data, self.max_num_length)
    }

    pub fn pop_bool(&mut self) -> Result<bool, ExecutionError> {
        let data = self.pop_byte_array()?;
        Ok(as_bool(&data))
    }

    /// Item `idx` positions below the top (0 is the top).
    pub fn peek_byte_array(&self, idx: usize) -> Result<&[u8], ExecutionError> {
        let sz = self.stk.len();
        if idx >= sz {
            return Err(ExecutionError::new(
                ExecutionErrorCode::InvalidStackOperation,
                format!("index {} is invalid for stack size {}", idx, sz),
            ));
        }
        Ok(&self.stk[sz - idx - 1])
    }

    /// Duplicate the top `n` items, preserving their order.
    pub fn dup_n(&mut self, n: usize) -> Result<(), ExecutionError> {
        if n < 1 {
            return Err(ExecutionError::new(
                ExecutionErrorCode::InvalidStackOperation,
                format!("attempt to dup {} stack items", n),
            ));
        }
        for _ in 0..n {
            let so = self.peek_byte_array(n - 1)?.to_vec();
            self.push_byte_array(so);
        }
        Ok(())
    }

    /// Swap the top two items.
    pub fn swap(&mut self) -> Result<(), ExecutionError> {
        let sz = self.stk.len();
        if sz < 2 {
            return Err(ExecutionError::new(
                ExecutionErrorCode::InvalidStackOperation,
                format!("attempt to swap with stack size {}", sz),
            ));
        }
        self.stk.swap(sz - 1, sz - 2);
        Ok(())
    }

    /// Items from bottom to top.
    pub fn items(&self) -> &[Vec<u8>] {
        &self.stk
    }

    /// Clear all items.
    pub fn clear(&mut self) {
        self.stk.clear();
    }
}
