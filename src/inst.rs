use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::reg::Reg;

/// Opcodes of the shipped M68000 subset. Each names one concrete encoding
/// form, not a mnemonic; `move.w` register-to-register and immediate forms
/// are distinct opcodes with distinct recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Nop,
    Rts,
    Moveq,
    Move16dd,
    Move32dd,
    Move16di,
    Move32di,
    Add16dd,
    Sub16dd,
    And16dd,
    Or16dd,
    Cmp16dd,
    Addi16,
    Subi16,
    Cmpi16,
    Lea32d,
    Lea32x,
    Bra16,
    Bsr16,
    Beq16,
    Bne16,
    Swap32,
    Clr16,
}

/// Width of an immediate field in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImmWidth {
    W8 = 8,
    W16 = 16,
    W32 = 32,
}

impl ImmWidth {
    pub fn bits(self) -> u32 {
        self as u32
    }
}

/// One entry of an instruction's operand list. Composite slots (memory and
/// PC-relative forms) occupy several consecutive entries; see
/// `instructions::SlotKind` for the sub-entry layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Reg(Reg),
    Imm(i64),
    Sym(Expr),
}

impl Operand {
    pub fn reg(&self) -> Option<Reg> {
        match *self {
            Operand::Reg(r) => Some(r),
            _ => None,
        }
    }
}

/// A decoded instruction handed to the encoder: an opcode plus its flattened
/// operand list. The list length must match the opcode's metadata arity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inst {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl Inst {
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self { opcode, operands }
    }
}
