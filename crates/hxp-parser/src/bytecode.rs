//! `.hyb` bytecode format.
//!
//! Only the encoding exists; nothing generates or executes bytecode yet.
//! A future VM consumes exactly this shape: a flat list of instructions,
//! each an opcode plus one `u32` operand.
//!
//! File layout (all integers little-endian):
//!
//! ```text
//! magic    4 bytes  "HYB\0"
//! version  u32      FORMAT_VERSION
//! count    u32      number of instructions
//! count x  { opcode: u8, operand: u32 }
//! ```

use std::fmt;

use thiserror::Error;

/// File signature.
pub const MAGIC: [u8; 4] = *b"HYB\0";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 12;
const INSTRUCTION_LEN: usize = 5;

/// Instruction opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    LoadConst,
    LoadVar,
    StoreVar,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    Jump,
    JumpIfFalse,
    Call,
    Return,
    Halt,
}

impl OpCode {
    const ALL: [OpCode; 22] = [
        OpCode::LoadConst,
        OpCode::LoadVar,
        OpCode::StoreVar,
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Div,
        OpCode::Mod,
        OpCode::Eq,
        OpCode::Ne,
        OpCode::Lt,
        OpCode::Le,
        OpCode::Gt,
        OpCode::Ge,
        OpCode::And,
        OpCode::Or,
        OpCode::Not,
        OpCode::Jump,
        OpCode::JumpIfFalse,
        OpCode::Call,
        OpCode::Return,
        OpCode::Halt,
    ];

    pub fn from_u8(byte: u8) -> Option<OpCode> {
        Self::ALL.get(byte as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            OpCode::LoadConst => "LOAD_CONST",
            OpCode::LoadVar => "LOAD_VAR",
            OpCode::StoreVar => "STORE_VAR",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Mod => "MOD",
            OpCode::Eq => "EQ",
            OpCode::Ne => "NE",
            OpCode::Lt => "LT",
            OpCode::Le => "LE",
            OpCode::Gt => "GT",
            OpCode::Ge => "GE",
            OpCode::And => "AND",
            OpCode::Or => "OR",
            OpCode::Not => "NOT",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfFalse => "JUMP_IF_FALSE",
            OpCode::Call => "CALL",
            OpCode::Return => "RETURN",
            OpCode::Halt => "HALT",
        }
    }
}

/// One instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: OpCode,
    pub operand: u32,
}

impl Instruction {
    pub const fn new(op: OpCode, operand: u32) -> Self {
        Self { op, operand }
    }
}

/// Errors reading a `.hyb` image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BytecodeError {
    #[error("not a Hyper bytecode file (bad magic)")]
    BadMagic,

    #[error("unsupported bytecode version {0} (expected {FORMAT_VERSION})")]
    UnsupportedVersion(u32),

    #[error("bytecode truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("unknown opcode {opcode:#04x} at instruction {index}")]
    UnknownOpcode { opcode: u8, index: usize },
}

/// A flat instruction sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    pub instructions: Vec<Instruction>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, op: OpCode, operand: u32) {
        self.instructions.push(Instruction::new(op, operand));
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Serialize to the `.hyb` byte image.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.instructions.len() * INSTRUCTION_LEN);
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.instructions.len() as u32).to_le_bytes());
        for instruction in &self.instructions {
            out.push(instruction.op as u8);
            out.extend_from_slice(&instruction.operand.to_le_bytes());
        }
        out
    }

    /// Check the header only, returning the declared instruction count.
    pub fn validate_header(bytes: &[u8]) -> Result<usize, BytecodeError> {
        if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
            return Err(BytecodeError::BadMagic);
        }
        if bytes.len() < HEADER_LEN {
            return Err(BytecodeError::Truncated {
                expected: HEADER_LEN,
                found: bytes.len(),
            });
        }
        let version = read_u32(bytes, 4);
        if version != FORMAT_VERSION {
            return Err(BytecodeError::UnsupportedVersion(version));
        }
        Ok(read_u32(bytes, 8) as usize)
    }

    /// Parse and validate a `.hyb` byte image.
    pub fn decode(bytes: &[u8]) -> Result<Chunk, BytecodeError> {
        let count = Self::validate_header(bytes)?;
        let expected = HEADER_LEN + count * INSTRUCTION_LEN;
        if bytes.len() != expected {
            return Err(BytecodeError::Truncated {
                expected,
                found: bytes.len(),
            });
        }

        let mut instructions = Vec::with_capacity(count);
        for (index, raw) in bytes[HEADER_LEN..].chunks_exact(INSTRUCTION_LEN).enumerate() {
            let op = OpCode::from_u8(raw[0]).ok_or(BytecodeError::UnknownOpcode {
                opcode: raw[0],
                index,
            })?;
            instructions.push(Instruction::new(op, read_u32(raw, 1)));
        }

        Ok(Chunk { instructions })
    }
}

/// Disassembly listing, one instruction per line.
impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{i:04} {:<14} {}", instruction.op.name(), instruction.operand)?;
        }
        Ok(())
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}
