//! Compiled pricing scripts
//!
//! A script is an ordered list of opcode invocations. Its wire form is the
//! concatenation of two-byte `[opcode, operand]` pairs.

use crate::vm::interpreter::VmError;
use crate::vm::opcodes::OpCode;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// Bytes per encoded invocation
pub const INVOCATION_SIZE: usize = 2;

/// One opcode invocation: raw opcode id plus operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Invocation {
    pub opcode: u8,
    pub operand: u8,
}

impl Invocation {
    pub fn new(opcode: OpCode, operand: u8) -> Self {
        Self {
            opcode: opcode as u8,
            operand,
        }
    }

    /// Decoded opcode, if the id is known
    pub fn op(&self) -> Option<OpCode> {
        OpCode::from_byte(self.opcode)
    }
}

/// An ordered sequence of invocations
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Script {
    invocations: Vec<Invocation>,
}

impl Script {
    pub fn new(invocations: Vec<Invocation>) -> Self {
        Self { invocations }
    }

    /// Decode a script from its wire form
    ///
    /// Unknown opcode ids are kept; they are reported when executed.
    /// Known opcodes without an operand must carry a zero operand byte,
    /// so every script has exactly one encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VmError> {
        if bytes.len() % INVOCATION_SIZE != 0 {
            return Err(VmError::TruncatedScript(bytes.len()));
        }

        let mut invocations = Vec::with_capacity(bytes.len() / INVOCATION_SIZE);
        for (position, pair) in bytes.chunks_exact(INVOCATION_SIZE).enumerate() {
            let inv = Invocation {
                opcode: pair[0],
                operand: pair[1],
            };
            if let Some(opcode) = inv.op() {
                if !opcode.takes_operand() && inv.operand != 0 {
                    return Err(VmError::UnexpectedOperand {
                        position,
                        opcode: opcode.name(),
                        operand: inv.operand,
                    });
                }
            }
            invocations.push(inv);
        }

        Ok(Self { invocations })
    }

    /// Encode to wire form
    pub fn to_bytes(&self) -> Vec<u8> {
        self.invocations
            .iter()
            .flat_map(|inv| [inv.opcode, inv.operand])
            .collect()
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    pub fn push(&mut self, invocation: Invocation) {
        self.invocations.push(invocation);
    }

    /// First CONSTANT invocation whose index falls outside a pool of
    /// `constants_len` entries, as `(position, index)`
    pub fn constant_out_of_bounds(&self, constants_len: usize) -> Option<(usize, u8)> {
        self.invocations
            .iter()
            .enumerate()
            .find(|(_, inv)| {
                inv.op() == Some(OpCode::Constant) && inv.operand as usize >= constants_len
            })
            .map(|(position, inv)| (position, inv.operand))
    }
}

/// Encode a single invocation to wire form
pub fn op(opcode: OpCode, operand: u8) -> [u8; INVOCATION_SIZE] {
    [opcode as u8, operand]
}

/// Concatenate encoded invocations into one script body
pub fn concat<I, B>(parts: I) -> Vec<u8>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(part.as_ref());
    }
    out
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.to_bytes())))
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let body = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(body).map_err(D::Error::custom)?;
        Script::from_bytes(&bytes).map_err(D::Error::custom)
    }
}
