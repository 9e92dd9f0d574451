use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::inst::ImmWidth;

/// Relocation kind: field width crossed with PC-relative or absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixupKind {
    Abs8,
    Abs16,
    Abs32,
    PcRel8,
    PcRel16,
    PcRel32,
}

impl FixupKind {
    pub fn for_width(width: ImmWidth, pc_relative: bool) -> Self {
        match (width, pc_relative) {
            (ImmWidth::W8, false) => FixupKind::Abs8,
            (ImmWidth::W16, false) => FixupKind::Abs16,
            (ImmWidth::W32, false) => FixupKind::Abs32,
            (ImmWidth::W8, true) => FixupKind::PcRel8,
            (ImmWidth::W16, true) => FixupKind::PcRel16,
            (ImmWidth::W32, true) => FixupKind::PcRel32,
        }
    }

    pub fn width(self) -> ImmWidth {
        match self {
            FixupKind::Abs8 | FixupKind::PcRel8 => ImmWidth::W8,
            FixupKind::Abs16 | FixupKind::PcRel16 => ImmWidth::W16,
            FixupKind::Abs32 | FixupKind::PcRel32 => ImmWidth::W32,
        }
    }

    pub fn is_pc_relative(self) -> bool {
        matches!(
            self,
            FixupKind::PcRel8 | FixupKind::PcRel16 | FixupKind::PcRel32
        )
    }
}

/// A deferred field: the encoder wrote zeros and the relocation stage fills in
/// the value later. `offset` is a byte offset from the start of the
/// instruction, not of the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixup {
    pub offset: u32,
    pub expr: Expr,
    pub kind: FixupKind,
}
