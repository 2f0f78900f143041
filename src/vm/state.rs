//! VM state for a single evaluation run

use crate::asset::currency::Address;
use crate::vm::interpreter::VmError;
use crate::vm::script::Script;
use crate::vm::value::{values_serde, Value};
use serde::{Deserialize, Serialize};

/// Maximum stack size
pub const MAX_STACK_SIZE: usize = 1024;

/// Context slot holding the buyer address
pub const CONTEXT_BUYER: u8 = 0;

/// Context slot holding the requested units
pub const CONTEXT_UNITS: u8 = 1;

/// Caller-supplied inputs visible to a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalContext {
    /// Buyer address
    pub buyer: Address,
    /// Requested units
    #[serde(with = "crate::vm::value::value_serde")]
    pub units: Value,
}

impl EvalContext {
    pub fn new(buyer: Address, units: Value) -> Self {
        Self { buyer, units }
    }

    /// Read a context slot
    pub fn get(&self, slot: u8) -> Option<Value> {
        match slot {
            CONTEXT_BUYER => Some(self.buyer.to_value()),
            CONTEXT_UNITS => Some(self.units),
            _ => None,
        }
    }
}

/// Compiled sources plus their constants pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    pub sources: Vec<Script>,
    #[serde(with = "values_serde")]
    pub constants: Vec<Value>,
}

impl StateConfig {
    pub fn new(sources: Vec<Script>, constants: Vec<Value>) -> Self {
        Self { sources, constants }
    }
}

/// Stack, constants and context for one run
///
/// Constants and context are borrowed read-only; only the stack changes.
#[derive(Debug)]
pub struct VmState<'a> {
    stack: Vec<Value>,
    constants: &'a [Value],
    context: &'a EvalContext,
}

impl<'a> VmState<'a> {
    pub fn new(constants: &'a [Value], context: &'a EvalContext) -> Self {
        Self {
            stack: Vec::with_capacity(16),
            constants,
            context,
        }
    }

    pub fn constants(&self) -> &[Value] {
        self.constants
    }

    pub fn context(&self) -> &EvalContext {
        self.context
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Push value onto stack
    pub fn push(&mut self, value: Value) -> Result<(), VmError> {
        if self.stack.len() >= MAX_STACK_SIZE {
            return Err(VmError::StackOverflow(MAX_STACK_SIZE));
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pop value from stack
    pub fn pop(&mut self) -> Result<Value, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow {
            needed: 1,
            available: 0,
        })
    }

    /// Fail with `StackUnderflow` unless at least `needed` values are present
    pub fn require(&self, needed: usize) -> Result<(), VmError> {
        if self.stack.len() < needed {
            return Err(VmError::StackUnderflow {
                needed,
                available: self.stack.len(),
            });
        }
        Ok(())
    }

    /// Consume the state, yielding the final stack
    pub fn into_stack(self) -> Vec<Value> {
        self.stack
    }
}
