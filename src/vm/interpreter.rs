//! Pricing virtual machine interpreter
//!
//! Runs a script against fresh VM state and returns the final stack.
//! Guarantees:
//! - Single forward pass, one step per invocation, no jumps
//! - Bounded stack (`MAX_STACK_SIZE`)
//! - Checked 256-bit arithmetic
//! - Identical inputs always produce identical output

use crate::vm::script::Script;
use crate::vm::state::{EvalContext, StateConfig, VmState};
use crate::vm::table::{OpcodeTable, OPCODE_TABLE};
use crate::vm::value::Value;
use thiserror::Error;

// =============================================================================
// VM Errors
// =============================================================================

/// VM execution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("Unknown opcode: 0x{0:02x}")]
    UnknownOpcode(u8),
    #[error("Constant index {index} out of range (pool size {len})")]
    IndexOutOfRange { index: u8, len: usize },
    #[error("Stack underflow: need {needed}, have {available}")]
    StackUnderflow { needed: usize, available: usize },
    #[error("Stack overflow (max: {0})")]
    StackOverflow(usize),
    #[error("Context index {0} out of range")]
    ContextIndexOutOfRange(u8),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),
    #[error("Source index {index} out of range ({count} sources)")]
    InvalidSourceIndex { index: usize, count: usize },
    #[error("Truncated script: {0} bytes is not a whole number of invocations")]
    TruncatedScript(usize),
    #[error("Invocation {position}: {opcode} takes no operand, got {operand}")]
    UnexpectedOperand {
        position: usize,
        opcode: &'static str,
        operand: u8,
    },
    #[error("Step {position} failed: {source}")]
    Step {
        position: usize,
        #[source]
        source: Box<VmError>,
    },
}

impl VmError {
    /// The underlying error, without step position
    pub fn root(&self) -> &VmError {
        match self {
            VmError::Step { source, .. } => source.root(),
            other => other,
        }
    }
}

// =============================================================================
// Interpreter
// =============================================================================

/// Stateless script runner over a shared opcode table
#[derive(Clone, Copy)]
pub struct Interpreter {
    table: &'static OpcodeTable,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter backed by the process-wide opcode table
    pub fn new() -> Self {
        Self {
            table: &*OPCODE_TABLE,
        }
    }

    /// Execute `script` against `constants` and `context`
    pub fn run(
        &self,
        script: &Script,
        constants: &[Value],
        context: &EvalContext,
    ) -> Result<Vec<Value>, VmError> {
        let mut state = VmState::new(constants, context);

        for (position, inv) in script.invocations().iter().enumerate() {
            log::trace!(
                "step {}: op=0x{:02x} operand={} depth={}",
                position,
                inv.opcode,
                inv.operand,
                state.stack().len()
            );

            self.table
                .execute(inv.opcode, inv.operand, &mut state)
                .map_err(|e| VmError::Step {
                    position,
                    source: Box::new(e),
                })?;
        }

        let stack = state.into_stack();
        log::debug!(
            "Script finished: {} steps, {} values on stack",
            script.len(),
            stack.len()
        );
        Ok(stack)
    }

    /// Execute source `index` of a state config
    pub fn run_source(
        &self,
        config: &StateConfig,
        index: usize,
        context: &EvalContext,
    ) -> Result<Vec<Value>, VmError> {
        let script = config
            .sources
            .get(index)
            .ok_or(VmError::InvalidSourceIndex {
                index,
                count: config.sources.len(),
            })?;

        self.run(script, &config.constants, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::currency::Address;
    use crate::vm::opcodes::OpCode;
    use crate::vm::script::{concat, op};

    fn ctx() -> EvalContext {
        EvalContext::new(Address::zero(), Value::from(2))
    }

    fn script(parts: &[[u8; 2]]) -> Script {
        Script::from_bytes(&concat(parts)).unwrap()
    }

    fn values(raw: &[u64]) -> Vec<Value> {
        raw.iter().map(|v| Value::from(*v)).collect()
    }

    #[test]
    fn test_constant_pushes_in_order() {
        let s = script(&[op(OpCode::Constant, 0), op(OpCode::Constant, 1)]);
        let stack = Interpreter::new().run(&s, &values(&[10, 20]), &ctx()).unwrap();
        assert_eq!(stack, values(&[10, 20]));
    }

    #[test]
    fn test_empty_script() {
        let stack = Interpreter::new()
            .run(&Script::default(), &values(&[1]), &ctx())
            .unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn test_price_times_units() {
        // unit price 15, scaled by requested units
        let s = script(&[
            op(OpCode::Constant, 0),
            op(OpCode::Constant, 1),
            op(OpCode::Context, 1),
            op(OpCode::Mul, 0),
        ]);
        let stack = Interpreter::new().run(&s, &values(&[10, 15]), &ctx()).unwrap();
        assert_eq!(stack, values(&[10, 30]));
    }

    #[test]
    fn test_error_reports_position() {
        let s = script(&[op(OpCode::Constant, 0), op(OpCode::Add, 0)]);
        let err = Interpreter::new().run(&s, &values(&[1]), &ctx()).unwrap_err();

        match &err {
            VmError::Step { position, .. } => assert_eq!(*position, 1),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(err.root(), VmError::StackUnderflow { .. }));
    }

    #[test]
    fn test_unknown_opcode_aborts() {
        let s = Script::from_bytes(&[0x00, 0x00, 0x7F, 0x00, 0x00, 0x00]).unwrap();
        let err = Interpreter::new().run(&s, &values(&[1]), &ctx()).unwrap_err();
        assert_eq!(err.root(), &VmError::UnknownOpcode(0x7F));
    }

    #[test]
    fn test_deterministic() {
        let s = script(&[
            op(OpCode::Context, 0),
            op(OpCode::Constant, 0),
            op(OpCode::Add, 0),
            op(OpCode::Context, 1),
        ]);
        let constants = values(&[99]);
        let context = EvalContext::new(
            "0x00000000000000000000000000000000000000ff".parse().unwrap(),
            Value::from(4),
        );

        let interpreter = Interpreter::new();
        let first = interpreter.run(&s, &constants, &context).unwrap();
        let second = interpreter.run(&s, &constants, &context).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, values(&[354, 4]));
    }

    #[test]
    fn test_run_source() {
        let config = StateConfig::new(
            vec![
                script(&[op(OpCode::Constant, 0)]),
                script(&[op(OpCode::Constant, 1)]),
            ],
            values(&[5, 6]),
        );
        let interpreter = Interpreter::new();

        assert_eq!(interpreter.run_source(&config, 1, &ctx()).unwrap(), values(&[6]));
        assert_eq!(
            interpreter.run_source(&config, 2, &ctx()),
            Err(VmError::InvalidSourceIndex { index: 2, count: 2 })
        );
    }
}
