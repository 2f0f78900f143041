//! Pricing virtual machine
//!
//! Provides a small stack machine for evaluating asset prices.
//!
//! # Overview
//!
//! This module implements:
//! - A fixed opcode set with pure handlers behind a shared dispatch table
//! - Two-byte `[opcode, operand]` scripts compiled ahead of time
//! - A single-pass interpreter with bounded stack and checked arithmetic
//! - A simple assembly-like compiler and disassembler
//!
//! # Example
//!
//! ```rust
//! use asset_pricing::vm::{Compiler, EvalContext, Interpreter, Value};
//! use asset_pricing::asset::Address;
//!
//! let mut compiler = Compiler::new();
//! let config = compiler.compile("
//!     .constant 10
//!     .constant 20
//!     CONSTANT 0
//!     CONSTANT 1
//! ").unwrap();
//!
//! let context = EvalContext::new(Address::zero(), Value::from(1));
//! let stack = Interpreter::new().run_source(&config, 0, &context).unwrap();
//! assert_eq!(stack, vec![Value::from(10), Value::from(20)]);
//! ```

pub mod compiler;
pub mod interpreter;
pub mod opcodes;
pub mod script;
pub mod state;
pub mod table;
pub mod value;

pub use compiler::{disassemble, Compiler, CompilerError};
pub use interpreter::{Interpreter, VmError};
pub use opcodes::OpCode;
pub use script::{concat, op, Invocation, Script};
pub use state::{EvalContext, StateConfig, VmState, MAX_STACK_SIZE};
pub use table::{Handler, OpcodeTable, OPCODE_TABLE};
pub use value::{parse_value, Value};
