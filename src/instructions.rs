//! Operand-descriptor metadata: for each opcode, how its flattened operand
//! list is carved into logical slots. Beads index logical slots; composite
//! slots span several consecutive list entries with fixed sub-entry roles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::inst::Opcode;

/// Sub-entry roles within a memory-style composite slot.
pub const MEM_DISP: u8 = 0;
pub const MEM_BASE: u8 = 1;
pub const MEM_INDEX: u8 = 2;
pub const MEM_OUTER: u8 = 3;

/// Sub-entry roles within a PC-relative composite slot.
pub const PCREL_DISP: u8 = 0;
pub const PCREL_INDEX: u8 = 1;

/// Shape of one logical operand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// One operand-list entry.
    Simple,
    /// Memory form: displacement, base register, index register, outer
    /// displacement — a prefix of length `len` (2..=4).
    Mem { len: u8 },
    /// PC-relative form: displacement, index register — a prefix of length
    /// `len` (1..=2). Immediate beads on this slot always defer to a fixup.
    PcRel { len: u8 },
}

impl SlotKind {
    /// Number of operand-list entries the slot occupies.
    pub fn entries(self) -> usize {
        match self {
            SlotKind::Simple => 1,
            SlotKind::Mem { len } | SlotKind::PcRel { len } => len as usize,
        }
    }

    pub fn is_composite(self) -> bool {
        !matches!(self, SlotKind::Simple)
    }

    pub fn is_pc_relative(self) -> bool {
        matches!(self, SlotKind::PcRel { .. })
    }
}

/// Per-opcode operand metadata. `name` is the unique lookup key for tools;
/// it names the encoding form, so `move.w dX,dY` and `move.w #imm,dY` differ.
#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub opcode: Opcode,
    pub name: &'static str,
    pub slots: &'static [SlotKind],
}

impl InstrDesc {
    /// Total operand-list entries the instruction carries.
    pub fn arity(&self) -> usize {
        self.slots.iter().map(|s| s.entries()).sum()
    }

    /// Slot kind and its base entry index in the flattened operand list.
    pub fn slot(&self, index: usize) -> Option<(SlotKind, usize)> {
        let mut base = 0;
        for (i, s) in self.slots.iter().enumerate() {
            if i == index {
                return Some((*s, base));
            }
            base += s.entries();
        }
        None
    }
}

/// Read-only instruction metadata table; built once, then shared.
#[derive(Debug, Clone)]
pub struct InstrTable {
    descs: Vec<InstrDesc>,
    by_opcode: HashMap<Opcode, usize>,
    by_name: HashMap<&'static str, usize>,
}

impl InstrTable {
    pub fn new(descs: &'static [InstrDesc]) -> Self {
        let mut by_opcode = HashMap::new();
        let mut by_name = HashMap::new();
        for (i, d) in descs.iter().enumerate() {
            for s in d.slots {
                match *s {
                    SlotKind::Simple => {}
                    SlotKind::Mem { len } => {
                        assert!((2..=4).contains(&len), "{}: bad mem slot", d.name)
                    }
                    SlotKind::PcRel { len } => {
                        assert!((1..=2).contains(&len), "{}: bad pcrel slot", d.name)
                    }
                }
            }
            assert!(
                by_opcode.insert(d.opcode, i).is_none(),
                "duplicate opcode {:?}",
                d.opcode
            );
            assert!(
                by_name.insert(d.name, i).is_none(),
                "duplicate name {:?}",
                d.name
            );
        }
        Self {
            descs: descs.to_vec(),
            by_opcode,
            by_name,
        }
    }

    pub fn get(&self, opcode: Opcode) -> Option<&InstrDesc> {
        self.by_opcode.get(&opcode).map(|&i| &self.descs[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&InstrDesc> {
        self.by_name.get(name).map(|&i| &self.descs[i])
    }

    /// Descriptors in table order.
    pub fn iter(&self) -> impl Iterator<Item = &InstrDesc> {
        self.descs.iter()
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }
}
