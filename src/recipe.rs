//! Recipes and the recipe table.
//!
//! A recipe is the validated bead string for one opcode. The table is an
//! opaque, read-only data asset: built offline (here by `isa::m68000`),
//! optionally serialized as a versioned JSON document, and cross-validated
//! against the instruction metadata before the encoder ever sees it.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bead::{Bead, BeadError};
use crate::inst::Opcode;
use crate::instructions::{InstrDesc, InstrTable, SlotKind, MEM_BASE, MEM_INDEX, MEM_OUTER, PCREL_INDEX};

/// Version stamp of the JSON recipe asset. Bump on any wire-format change.
pub const ASSET_VERSION: u32 = 1;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecipeError {
    #[error(transparent)]
    Bead(#[from] BeadError),
    #[error("empty recipe")]
    Empty,
    #[error("missing terminator")]
    Unterminated,
    #[error("{0} bytes after the terminator")]
    TrailingBytes(usize),
    #[error("static bit width {0} is not a multiple of 16")]
    UnalignedWidth(u32),
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("opcode {opcode:?}: {source}")]
    Recipe {
        opcode: Opcode,
        #[source]
        source: RecipeError,
    },
    #[error("opcode {opcode:?} is not in the instruction table")]
    UnknownOpcode { opcode: Opcode },
    #[error("unknown instruction name {name:?} in recipe asset")]
    UnknownName { name: String },
    #[error("opcode {opcode:?}: bead references slot {slot}, instruction has {count} slots")]
    SlotOutOfRange {
        opcode: Opcode,
        slot: u8,
        count: usize,
    },
    #[error("opcode {opcode:?}: alternate flag on simple slot {slot}")]
    AltOnSimple { opcode: Opcode, slot: u8 },
    #[error("opcode {opcode:?}: alternate flag on a PC-relative immediate (slot {slot})")]
    AltOnPcRelImm { opcode: Opcode, slot: u8 },
    #[error("opcode {opcode:?}: register bead on PC-relative slot {slot} requires the alternate flag")]
    PcRelRegNeedsAlt { opcode: Opcode, slot: u8 },
    #[error("opcode {opcode:?}: slot {slot} has {len} sub-entries, bead needs entry {entry}")]
    SubEntryOutOfRange {
        opcode: Opcode,
        slot: u8,
        len: u8,
        entry: u8,
    },
    #[error("recipe asset is version {found}, this build reads version {expected}")]
    Version { found: u32, expected: u32 },
    #[error("malformed recipe asset: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validated, terminator-stripped bead sequence for one opcode.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    beads: Vec<Bead>,
}

impl Recipe {
    /// Parse a null-terminated bead string. The terminator must be present
    /// and last; an empty sequence is rejected here, so the encoder can rely
    /// on every stored recipe producing output.
    pub fn parse(raw: &[u8]) -> Result<Self, RecipeError> {
        let mut beads = Vec::new();
        let mut rest: Option<usize> = None;
        for (i, &b) in raw.iter().enumerate() {
            match Bead::decode(b)? {
                Some(bead) => beads.push(bead),
                None => {
                    rest = Some(raw.len() - i - 1);
                    break;
                }
            }
        }
        match rest {
            None => return Err(RecipeError::Unterminated),
            Some(0) => {}
            Some(n) => return Err(RecipeError::TrailingBytes(n)),
        }
        if beads.is_empty() {
            return Err(RecipeError::Empty);
        }
        let bits = beads.iter().map(Bead::bit_width).sum::<u32>();
        if bits % 16 != 0 {
            return Err(RecipeError::UnalignedWidth(bits));
        }
        Ok(Self { beads })
    }

    pub fn beads(&self) -> &[Bead] {
        &self.beads
    }

    /// Raw byte form, terminator re-appended.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out: Vec<u8> = self.beads.iter().map(Bead::raw).collect();
        out.push(0x00);
        out
    }

    /// Static bit width of the whole sequence.
    pub fn bit_width(&self) -> u32 {
        self.beads.iter().map(Bead::bit_width).sum()
    }
}

/// Serialized form of the table: one versioned document, recipes keyed by
/// instruction name in their raw null-terminated byte form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeAsset {
    pub version: u32,
    pub recipes: BTreeMap<String, Vec<u8>>,
}

/// Opcode → recipe mapping. Read-only once built and validated.
#[derive(Debug, Clone, Default)]
pub struct RecipeTable {
    recipes: HashMap<Opcode, Recipe>,
}

impl RecipeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, opcode: Opcode, raw: &[u8]) -> Result<(), TableError> {
        let recipe = Recipe::parse(raw).map_err(|source| TableError::Recipe { opcode, source })?;
        self.recipes.insert(opcode, recipe);
        Ok(())
    }

    pub fn get(&self, opcode: Opcode) -> Option<&Recipe> {
        self.recipes.get(&opcode)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Cross-validate every recipe against the instruction metadata. This
    /// front-loads the slot and alternate-flag contract so the corresponding
    /// encode-time failures are unreachable for tables that pass.
    pub fn validate(&self, instrs: &InstrTable) -> Result<(), TableError> {
        for (&opcode, recipe) in &self.recipes {
            let desc = instrs
                .get(opcode)
                .ok_or(TableError::UnknownOpcode { opcode })?;
            for bead in recipe.beads() {
                validate_bead(opcode, desc, bead)?;
            }
        }
        Ok(())
    }

    pub fn to_asset(&self, instrs: &InstrTable) -> Result<RecipeAsset, TableError> {
        let mut recipes = BTreeMap::new();
        for (&opcode, recipe) in &self.recipes {
            let desc = instrs
                .get(opcode)
                .ok_or(TableError::UnknownOpcode { opcode })?;
            recipes.insert(desc.name.to_string(), recipe.to_bytes());
        }
        Ok(RecipeAsset {
            version: ASSET_VERSION,
            recipes,
        })
    }

    pub fn from_asset(asset: &RecipeAsset, instrs: &InstrTable) -> Result<Self, TableError> {
        if asset.version != ASSET_VERSION {
            return Err(TableError::Version {
                found: asset.version,
                expected: ASSET_VERSION,
            });
        }
        let mut table = Self::new();
        for (name, raw) in &asset.recipes {
            let desc = instrs
                .by_name(name)
                .ok_or_else(|| TableError::UnknownName { name: name.clone() })?;
            table.insert(desc.opcode, raw)?;
        }
        table.validate(instrs)?;
        Ok(table)
    }

    pub fn to_json(&self, instrs: &InstrTable) -> Result<String, TableError> {
        Ok(serde_json::to_string_pretty(&self.to_asset(instrs)?)?)
    }

    pub fn load_json(json: &str, instrs: &InstrTable) -> Result<Self, TableError> {
        let asset: RecipeAsset = serde_json::from_str(json)?;
        Self::from_asset(&asset, instrs)
    }
}

fn validate_bead(opcode: Opcode, desc: &InstrDesc, bead: &Bead) -> Result<(), TableError> {
    let (slot, alt) = match *bead {
        Bead::Ignore | Bead::Bits { .. } => return Ok(()),
        Bead::Reg { slot, alt, .. } | Bead::Imm { slot, alt, .. } => (slot, alt),
    };
    let (kind, _) = desc
        .slot(slot as usize)
        .ok_or(TableError::SlotOutOfRange {
            opcode,
            slot,
            count: desc.slots.len(),
        })?;

    let need = |entry: u8, len: u8| {
        if entry < len {
            Ok(())
        } else {
            Err(TableError::SubEntryOutOfRange {
                opcode,
                slot,
                len,
                entry,
            })
        }
    };

    match (bead, kind) {
        (_, SlotKind::Simple) if alt => Err(TableError::AltOnSimple { opcode, slot }),
        (_, SlotKind::Simple) => Ok(()),
        (Bead::Reg { .. }, SlotKind::Mem { len }) => need(if alt { MEM_INDEX } else { MEM_BASE }, len),
        (Bead::Imm { .. }, SlotKind::Mem { len }) => {
            if alt {
                need(MEM_OUTER, len)
            } else {
                Ok(())
            }
        }
        (Bead::Reg { .. }, SlotKind::PcRel { len }) => {
            if !alt {
                Err(TableError::PcRelRegNeedsAlt { opcode, slot })
            } else {
                need(PCREL_INDEX, len)
            }
        }
        (Bead::Imm { .. }, SlotKind::PcRel { .. }) => {
            if alt {
                Err(TableError::AltOnPcRelImm { opcode, slot })
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_missing_terminator() {
        assert_eq!(Recipe::parse(&[0x14]), Err(RecipeError::Unterminated));
    }

    #[test]
    fn parse_rejects_empty_recipe() {
        assert_eq!(Recipe::parse(&[0x00]), Err(RecipeError::Empty));
    }

    #[test]
    fn parse_rejects_trailing_bytes() {
        assert_eq!(
            Recipe::parse(&[0x14, 0x24, 0x34, 0x44, 0x00, 0x14]),
            Err(RecipeError::TrailingBytes(1))
        );
    }

    #[test]
    fn parse_rejects_unaligned_width() {
        // Three 4-bit literals: 12 bits.
        assert_eq!(
            Recipe::parse(&[0x14, 0x24, 0x34, 0x00]),
            Err(RecipeError::UnalignedWidth(12))
        );
    }

    #[test]
    fn to_bytes_round_trips() {
        let raw = [0x14, 0x24, 0x10, 0x34, 0x44, 0x00];
        let recipe = Recipe::parse(&raw).unwrap();
        assert_eq!(recipe.to_bytes(), raw);
        assert_eq!(recipe.bit_width(), 16);
    }
}
