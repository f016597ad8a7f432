//! Opcode lookup table.
//!
//! Built at compile time; an opcode byte with no entry fails when executed.

use super::context::ExecutionContext;
use super::error::{ExecutionError, ExecutionErrorCode};
use crate::opcodes::*;

/// Handler for one opcode. The opcode byte is passed through for handlers
/// shared by several opcodes.
pub(crate) type OpHandler = fn(&mut ExecutionContext, u8) -> Result<(), ExecutionError>;

static DISPATCH: [Option<OpHandler>; 256] = build_table();

const fn build_table() -> [Option<OpHandler>; 256] {
    let mut table: [Option<OpHandler>; 256] = [None; 256];

    table[OP_0 as usize] = Some(ExecutionContext::op_small_int as OpHandler);
    let mut op = OP_1;
    while op <= OP_16 {
        table[op as usize] = Some(ExecutionContext::op_small_int as OpHandler);
        op += 1;
    }

    table[OP_VERIFY as usize] = Some(ExecutionContext::op_verify as OpHandler);
    table[OP_2DUP as usize] = Some(ExecutionContext::op_2dup as OpHandler);
    table[OP_DUP as usize] = Some(ExecutionContext::op_dup as OpHandler);
    table[OP_SWAP as usize] = Some(ExecutionContext::op_swap as OpHandler);
    table[OP_EQUAL as usize] = Some(ExecutionContext::op_equal as OpHandler);
    table[OP_EQUALVERIFY as usize] = Some(ExecutionContext::op_equalverify as OpHandler);
    table[OP_NOT as usize] = Some(ExecutionContext::op_not as OpHandler);
    table[OP_ADD as usize] = Some(ExecutionContext::op_add as OpHandler);
    table[OP_MUL as usize] = Some(ExecutionContext::op_mul as OpHandler);
    table[OP_SHA1 as usize] = Some(ExecutionContext::op_sha1 as OpHandler);
    table[OP_HASH160 as usize] = Some(ExecutionContext::op_hash160 as OpHandler);
    table[OP_HASH256 as usize] = Some(ExecutionContext::op_hash256 as OpHandler);
    table[OP_CHECKSIG as usize] = Some(ExecutionContext::op_checksig as OpHandler);
    table[OP_CHECKMULTISIG as usize] = Some(ExecutionContext::op_checkmultisig as OpHandler);

    table
}

/// Whether the engine has a handler for `op`.
pub fn is_supported(op: u8) -> bool {
    DISPATCH[op as usize].is_some()
}

pub(crate) fn execute_opcode(ctx: &mut ExecutionContext, op: u8) -> Result<(), ExecutionError> {
    match DISPATCH[op as usize] {
        Some(handler) => handler(ctx, op),
        None => Err(ExecutionError::new(
            ExecutionErrorCode::UnknownOpcode,
            format!("attempt to execute unsupported opcode 0x{:02x}", op),
        )),
    }
}
