pub mod bead;
pub mod emit;
pub mod expr;
pub mod fixup;
pub mod inst;
pub mod instructions;
pub mod recipe;
pub mod reg;

pub mod isa {
    pub mod m68000; // M68000 base model: opcode table + shipped recipes
}

pub use emit::{EncodeError, Encoder};
pub use expr::{Expr, SymbolId, SymbolTable};
pub use fixup::{Fixup, FixupKind};
pub use inst::{ImmWidth, Inst, Opcode, Operand};
pub use recipe::{Recipe, RecipeTable, TableError};
pub use reg::{M68kRegInfo, Reg, RegInfo};
