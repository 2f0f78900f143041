//! Opcode dispatch table
//!
//! Each opcode maps to a pure handler. The table is built once per process
//! and shared read-only by every evaluation.

use crate::vm::interpreter::VmError;
use crate::vm::opcodes::OpCode;
use crate::vm::state::VmState;
use crate::vm::value::Value;
use lazy_static::lazy_static;

/// Opcode handler: operand plus mutable run state
pub type Handler = fn(u8, &mut VmState<'_>) -> Result<(), VmError>;

lazy_static! {
    /// Process-wide opcode table
    pub static ref OPCODE_TABLE: OpcodeTable = OpcodeTable::new();
}

/// Dense id -> handler mapping
pub struct OpcodeTable {
    handlers: [Option<Handler>; 256],
}

impl OpcodeTable {
    fn new() -> Self {
        let mut handlers: [Option<Handler>; 256] = [None; 256];
        for op in OpCode::ALL {
            handlers[op as usize] = Some(op.handler());
        }
        Self { handlers }
    }

    /// Look up the handler for a raw opcode id
    pub fn get(&self, opcode: u8) -> Option<Handler> {
        self.handlers[opcode as usize]
    }

    /// Execute one invocation against the run state
    pub fn execute(&self, opcode: u8, operand: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
        let handler = self.get(opcode).ok_or(VmError::UnknownOpcode(opcode))?;
        handler(operand, state)
    }

    /// Number of defined opcodes
    pub fn len(&self) -> usize {
        self.handlers.iter().filter(|h| h.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OpCode {
    /// Handler for this opcode
    pub fn handler(self) -> Handler {
        match self {
            OpCode::Constant => op_constant,
            OpCode::Stack => op_stack,
            OpCode::Context => op_context,
            OpCode::Add => op_add,
            OpCode::Sub => op_sub,
            OpCode::Mul => op_mul,
            OpCode::Div => op_div,
            OpCode::Mod => op_mod,
            OpCode::Min => op_min,
            OpCode::Max => op_max,
            OpCode::Eq => op_eq,
            OpCode::Lt => op_lt,
            OpCode::Gt => op_gt,
            OpCode::IsZero => op_is_zero,
            OpCode::EagerIf => op_eager_if,
        }
    }
}

fn bool_value(b: bool) -> Value {
    if b {
        Value::one()
    } else {
        Value::zero()
    }
}

/// Pop `b` (top) then `a`, after checking both are present
fn pop_pair(state: &mut VmState<'_>) -> Result<(Value, Value), VmError> {
    state.require(2)?;
    let b = state.pop()?;
    let a = state.pop()?;
    Ok((a, b))
}

fn op_constant(operand: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let value = state
        .constants()
        .get(operand as usize)
        .copied()
        .ok_or(VmError::IndexOutOfRange {
            index: operand,
            len: state.constants().len(),
        })?;
    state.push(value)
}

fn op_stack(operand: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    state.require(operand as usize + 1)?;
    let value = state.stack()[operand as usize];
    state.push(value)
}

fn op_context(operand: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let value = state
        .context()
        .get(operand)
        .ok_or(VmError::ContextIndexOutOfRange(operand))?;
    state.push(value)
}

fn op_add(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let (a, b) = pop_pair(state)?;
    state.push(a.checked_add(b).ok_or(VmError::ArithmeticOverflow("ADD"))?)
}

fn op_sub(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let (a, b) = pop_pair(state)?;
    state.push(a.checked_sub(b).ok_or(VmError::ArithmeticOverflow("SUB"))?)
}

fn op_mul(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let (a, b) = pop_pair(state)?;
    state.push(a.checked_mul(b).ok_or(VmError::ArithmeticOverflow("MUL"))?)
}

fn op_div(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let (a, b) = pop_pair(state)?;
    if b.is_zero() {
        return Err(VmError::DivisionByZero);
    }
    state.push(a / b)
}

fn op_mod(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let (a, b) = pop_pair(state)?;
    if b.is_zero() {
        return Err(VmError::DivisionByZero);
    }
    state.push(a % b)
}

fn op_min(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let (a, b) = pop_pair(state)?;
    state.push(a.min(b))
}

fn op_max(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let (a, b) = pop_pair(state)?;
    state.push(a.max(b))
}

fn op_eq(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let (a, b) = pop_pair(state)?;
    state.push(bool_value(a == b))
}

fn op_lt(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let (a, b) = pop_pair(state)?;
    state.push(bool_value(a < b))
}

fn op_gt(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let (a, b) = pop_pair(state)?;
    state.push(bool_value(a > b))
}

fn op_is_zero(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    let a = state.pop()?;
    state.push(bool_value(a.is_zero()))
}

// Stack layout before: [.., cond, then, else]
fn op_eager_if(_: u8, state: &mut VmState<'_>) -> Result<(), VmError> {
    state.require(3)?;
    let otherwise = state.pop()?;
    let then = state.pop()?;
    let cond = state.pop()?;
    state.push(if cond.is_zero() { otherwise } else { then })
}
