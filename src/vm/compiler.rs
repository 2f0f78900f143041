//! Pricing script assembler
//!
//! Compiles assembly-like text to a [`StateConfig`]:
//!
//! ```text
//! ; max units, then unit price
//! .constant 10
//! .constant 0xde0b6b3a7640000
//! CONSTANT 0
//! CONSTANT 1
//! .source
//! CONTEXT 1
//! ```

use crate::vm::opcodes::OpCode;
use crate::vm::script::{Invocation, Script};
use crate::vm::state::StateConfig;
use crate::vm::value::{parse_value, Value};
use thiserror::Error;

/// Compiler errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompilerError {
    #[error("line {line}: unknown instruction: {name}")]
    UnknownInstruction { line: usize, name: String },
    #[error("line {line}: unknown directive: {name}")]
    UnknownDirective { line: usize, name: String },
    #[error("line {line}: {message}")]
    InvalidArgument { line: usize, message: String },
    #[error("line {line}: invalid number: {text}")]
    InvalidNumber { line: usize, text: String },
    #[error("line {line}: {name} takes no operand")]
    UnexpectedOperand { line: usize, name: String },
}

/// Assembler for pricing scripts
#[derive(Debug, Default)]
pub struct Compiler {
    sources: Vec<Script>,
    constants: Vec<Value>,
}

impl Compiler {
    /// Create a new compiler
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile source text into sources and a constants pool
    pub fn compile(&mut self, text: &str) -> Result<StateConfig, CompilerError> {
        self.sources = vec![Script::default()];
        self.constants.clear();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = strip_comment(line).trim();

            if line.is_empty() {
                continue;
            }

            if let Some(directive) = line.strip_prefix('.') {
                self.compile_directive(line_no, directive)?;
            } else {
                self.compile_instruction(line_no, line)?;
            }
        }

        Ok(StateConfig::new(
            std::mem::take(&mut self.sources),
            std::mem::take(&mut self.constants),
        ))
    }

    fn compile_directive(&mut self, line: usize, directive: &str) -> Result<(), CompilerError> {
        let parts: Vec<&str> = directive.split_whitespace().collect();
        let name = parts.first().copied().unwrap_or("");

        match name.to_lowercase().as_str() {
            "constant" => {
                let text = parts.get(1).ok_or_else(|| CompilerError::InvalidArgument {
                    line,
                    message: ".constant requires a value".to_string(),
                })?;
                let value = parse_value(text).ok_or_else(|| CompilerError::InvalidNumber {
                    line,
                    text: text.to_string(),
                })?;
                if parts.len() > 2 {
                    return Err(CompilerError::InvalidArgument {
                        line,
                        message: "too many arguments for .constant".to_string(),
                    });
                }
                self.constants.push(value);
            }
            "source" => {
                if parts.len() > 1 {
                    return Err(CompilerError::InvalidArgument {
                        line,
                        message: ".source takes no arguments".to_string(),
                    });
                }
                self.sources.push(Script::default());
            }
            _ => {
                return Err(CompilerError::UnknownDirective {
                    line,
                    name: name.to_string(),
                })
            }
        }

        Ok(())
    }

    /// Compile a single instruction
    fn compile_instruction(&mut self, line: usize, text: &str) -> Result<(), CompilerError> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let name = parts[0];

        let opcode = OpCode::from_name(name).ok_or_else(|| CompilerError::UnknownInstruction {
            line,
            name: name.to_uppercase(),
        })?;

        let operand = match (opcode.takes_operand(), parts.get(1)) {
            (true, Some(arg)) => arg.parse::<u8>().map_err(|_| CompilerError::InvalidNumber {
                line,
                text: arg.to_string(),
            })?,
            (true, None) => {
                return Err(CompilerError::InvalidArgument {
                    line,
                    message: format!("{} requires an operand", opcode.name()),
                })
            }
            (false, Some(_)) => {
                return Err(CompilerError::UnexpectedOperand {
                    line,
                    name: opcode.name().to_string(),
                })
            }
            (false, None) => 0,
        };

        if parts.len() > 2 {
            return Err(CompilerError::InvalidArgument {
                line,
                message: format!("too many arguments for {}", opcode.name()),
            });
        }

        // `sources` always holds at least the implicit first source
        if let Some(current) = self.sources.last_mut() {
            current.push(Invocation::new(opcode, operand));
        }
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(|c: char| c == ';' || c == '#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Disassemble a script to readable format
pub fn disassemble(script: &Script) -> String {
    let mut output = String::new();

    for (idx, inv) in script.invocations().iter().enumerate() {
        let offset = idx * crate::vm::script::INVOCATION_SIZE;
        match inv.op() {
            // A stray operand is shown so reassembly fails instead of dropping it
            Some(opcode) if opcode.takes_operand() || inv.operand != 0 => {
                output.push_str(&format!("{:04x}: {} {}\n", offset, opcode.name(), inv.operand));
            }
            Some(opcode) => {
                output.push_str(&format!("{:04x}: {}\n", offset, opcode.name()));
            }
            None => {
                output.push_str(&format!(
                    "{:04x}: UNKNOWN 0x{:02x} {}\n",
                    offset, inv.opcode, inv.operand
                ));
            }
        }
    }

    output
}
