//! Pricing VM opcodes
//!
//! Defines the instruction set for the pricing virtual machine. Every
//! opcode is a pure function of the stack, the constants pool and the
//! evaluation context; there are no jumps, storage or external calls.

use serde::{Deserialize, Serialize};

/// Opcodes for the pricing VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OpCode {
    // Loads (0x00 - 0x0F)
    /// Push `constants[operand]`
    Constant = 0x00,
    /// Push a copy of `stack[operand]`, counted from the bottom
    Stack = 0x01,
    /// Push evaluation context slot `operand` (0 = buyer, 1 = units)
    Context = 0x02,

    // Arithmetic (0x10 - 0x1F)
    /// Checked addition
    Add = 0x10,
    /// Checked subtraction, second minus top
    Sub = 0x11,
    /// Checked multiplication
    Mul = 0x12,
    /// Divide second by top
    Div = 0x13,
    /// Modulo second by top
    Mod = 0x14,
    /// Smaller of the top two values
    Min = 0x15,
    /// Larger of the top two values
    Max = 0x16,

    // Comparison (0x20 - 0x2F)
    /// Equal: push 1 if equal, 0 otherwise
    Eq = 0x20,
    /// Less than
    Lt = 0x21,
    /// Greater than
    Gt = 0x22,
    /// Check if zero
    IsZero = 0x23,

    // Selection (0x30 - 0x3F)
    /// Pop condition, then-value, else-value; push the selected one
    EagerIf = 0x30,
}

impl OpCode {
    /// Every opcode, in id order
    pub const ALL: [OpCode; 15] = [
        OpCode::Constant,
        OpCode::Stack,
        OpCode::Context,
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Div,
        OpCode::Mod,
        OpCode::Min,
        OpCode::Max,
        OpCode::Eq,
        OpCode::Lt,
        OpCode::Gt,
        OpCode::IsZero,
        OpCode::EagerIf,
    ];

    /// Convert byte to opcode
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(OpCode::Constant),
            0x01 => Some(OpCode::Stack),
            0x02 => Some(OpCode::Context),
            0x10 => Some(OpCode::Add),
            0x11 => Some(OpCode::Sub),
            0x12 => Some(OpCode::Mul),
            0x13 => Some(OpCode::Div),
            0x14 => Some(OpCode::Mod),
            0x15 => Some(OpCode::Min),
            0x16 => Some(OpCode::Max),
            0x20 => Some(OpCode::Eq),
            0x21 => Some(OpCode::Lt),
            0x22 => Some(OpCode::Gt),
            0x23 => Some(OpCode::IsZero),
            0x30 => Some(OpCode::EagerIf),
            _ => None,
        }
    }

    /// Look up an opcode by its assembler mnemonic (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_uppercase();
        Self::ALL.iter().copied().find(|op| op.name() == upper)
    }

    /// Whether the operand byte carries meaning for this opcode
    pub fn takes_operand(&self) -> bool {
        matches!(self, OpCode::Constant | OpCode::Stack | OpCode::Context)
    }

    /// Get opcode name for disassembly
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Constant => "CONSTANT",
            OpCode::Stack => "STACK",
            OpCode::Context => "CONTEXT",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Mod => "MOD",
            OpCode::Min => "MIN",
            OpCode::Max => "MAX",
            OpCode::Eq => "EQ",
            OpCode::Lt => "LT",
            OpCode::Gt => "GT",
            OpCode::IsZero => "ISZERO",
            OpCode::EagerIf => "EAGER_IF",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for op in OpCode::ALL {
            let byte = op as u8;
            let decoded = OpCode::from_byte(byte).unwrap();
            assert_eq!(op, decoded);
        }
    }

    #[test]
    fn test_all_is_sorted_and_unique() {
        let ids: Vec<u8> = OpCode::ALL.iter().map(|op| *op as u8).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_unknown_byte() {
        assert_eq!(OpCode::from_byte(0x03), None);
        assert_eq!(OpCode::from_byte(0xFF), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(OpCode::from_name("constant"), Some(OpCode::Constant));
        assert_eq!(OpCode::from_name("EAGER_IF"), Some(OpCode::EagerIf));
        assert_eq!(OpCode::from_name("JUMP"), None);
    }
}
