//! The encoder core: a small interpreter over a recipe's beads.
//!
//! Fields are absorbed into a 64-bit accumulator in little-endian bit order
//! (the first field of a word lands in its least significant bits); completed
//! 16-bit words are drained high byte first, which is what makes the output
//! big-endian. Immediate fields whose operand is not a compile-time constant
//! write zeros and record a fixup instead.

use thiserror::Error;
use tracing::{debug, trace};

use crate::bead::{Bead, RegPart};
use crate::expr::Expr;
use crate::fixup::{Fixup, FixupKind};
use crate::inst::{ImmWidth, Inst, Opcode, Operand};
use crate::instructions::{
    InstrDesc, InstrTable, SlotKind, MEM_BASE, MEM_DISP, MEM_INDEX, MEM_OUTER, PCREL_DISP,
    PCREL_INDEX,
};
use crate::recipe::RecipeTable;
use crate::reg::RegInfo;

/// Byte offset, within the instruction, of a deferred immediate field.
/// Deferred fields live in the extension words, which start at byte 2.
const FIXUP_BYTE_OFFSET: u32 = 2;

/// Errors here are table-authoring defects, not user input errors: a table
/// that passed `RecipeTable::validate` cannot hit the slot or alternate-flag
/// variants. Callers abort the current translation unit on any of them.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("no recipe for opcode {opcode:?}")]
    MissingRecipe { opcode: Opcode },
    #[error("opcode {opcode:?} is not in the instruction table")]
    UnknownOpcode { opcode: Opcode },
    #[error("{opcode:?}: operand list has {got} entries, metadata expects {want}")]
    ArityMismatch {
        opcode: Opcode,
        got: usize,
        want: usize,
    },
    #[error("{opcode:?}: bead references slot {slot}, instruction has {count} slots")]
    SlotOutOfRange {
        opcode: Opcode,
        slot: u8,
        count: usize,
    },
    #[error("{opcode:?}: alternate flag on simple slot {slot}")]
    AltOnSimple { opcode: Opcode, slot: u8 },
    #[error("{opcode:?}: alternate flag on a PC-relative immediate (slot {slot})")]
    AltOnPcRel { opcode: Opcode, slot: u8 },
    #[error("{opcode:?}: register bead on PC-relative slot {slot} requires the alternate flag")]
    PcRelRegNeedsAlt { opcode: Opcode, slot: u8 },
    #[error("{opcode:?}: slot {slot} has {len} sub-entries, bead needs entry {entry}")]
    SubEntryOutOfRange {
        opcode: Opcode,
        slot: u8,
        len: u8,
        entry: u8,
    },
    #[error("{opcode:?}: slot {slot} entry {entry} is not a register")]
    ExpectedReg {
        opcode: Opcode,
        slot: u8,
        entry: usize,
    },
    #[error("{opcode:?}: slot {slot} entry {entry} is not an immediate or expression")]
    ExpectedImm {
        opcode: Opcode,
        slot: u8,
        entry: usize,
    },
    #[error("{opcode:?}: constant {value:#x} does not fit in {bits} bits")]
    ImmTooWide {
        opcode: Opcode,
        value: i64,
        bits: u32,
    },
    #[error("{opcode:?}: residual bit offset {offset} at end of instruction")]
    ResidualBits { opcode: Opcode, offset: u32 },
    #[error("{opcode:?}: emitted {bytes} bytes, expected an even nonzero count")]
    OddByteCount { opcode: Opcode, bytes: usize },
}

/// Scratch register absorbing sub-word fields in little-endian bit order.
#[derive(Debug, Default)]
struct BitAcc {
    buf: u64,
    offset: u32,
}

impl BitAcc {
    fn write(&mut self, value: u64, bits: u32) {
        debug_assert!(bits > 0 && self.offset + bits <= 64);
        debug_assert!(value >> bits == 0);
        self.buf |= value << self.offset;
        self.offset += bits;
    }

    /// Drain completed 16-bit words, high byte first.
    fn flush(&mut self, out: &mut Vec<u8>) {
        while self.offset >= 16 {
            let word = (self.buf & 0xFFFF) as u16;
            out.push((word >> 8) as u8);
            out.push(word as u8);
            self.buf >>= 16;
            self.offset -= 16;
        }
    }
}

/// Instruction encoder. Holds only shared read-only tables, so one instance
/// can serve any number of threads; all per-call state lives on the stack and
/// in the caller's output and fixup vectors.
pub struct Encoder<'a, R: RegInfo> {
    instrs: &'a InstrTable,
    recipes: &'a RecipeTable,
    reg_info: &'a R,
}

impl<'a, R: RegInfo> Encoder<'a, R> {
    pub fn new(instrs: &'a InstrTable, recipes: &'a RecipeTable, reg_info: &'a R) -> Self {
        Self {
            instrs,
            recipes,
            reg_info,
        }
    }

    /// Encode one instruction, appending bytes to `out` and deferred fields
    /// to `fixups`. Fixup offsets are relative to the instruction start.
    pub fn encode(
        &self,
        inst: &Inst,
        out: &mut Vec<u8>,
        fixups: &mut Vec<Fixup>,
    ) -> Result<(), EncodeError> {
        let opcode = inst.opcode;
        let desc = self
            .instrs
            .get(opcode)
            .ok_or(EncodeError::UnknownOpcode { opcode })?;
        if inst.operands.len() != desc.arity() {
            return Err(EncodeError::ArityMismatch {
                opcode,
                got: inst.operands.len(),
                want: desc.arity(),
            });
        }
        let recipe = self
            .recipes
            .get(opcode)
            .ok_or(EncodeError::MissingRecipe { opcode })?;

        debug!(?opcode, operands = inst.operands.len(), "encode");

        let start = out.len();
        let mut acc = BitAcc::default();
        for bead in recipe.beads() {
            let bits = match *bead {
                Bead::Ignore => 0,
                Bead::Bits { width, value } => {
                    self.encode_bits(width, value, &mut acc);
                    width as u32
                }
                Bead::Reg { slot, alt, part } => {
                    self.encode_reg(inst, desc, slot, alt, part, &mut acc)?
                }
                Bead::Imm { slot, alt, width } => {
                    self.encode_imm(inst, desc, slot, alt, width, &mut acc, fixups)?
                }
            };
            trace!(?bead, bits, offset = acc.offset, "bead");
            acc.flush(out);
        }

        if acc.offset != 0 {
            return Err(EncodeError::ResidualBits {
                opcode,
                offset: acc.offset,
            });
        }
        let bytes = out.len() - start;
        if bytes == 0 || bytes % 2 != 0 {
            return Err(EncodeError::OddByteCount { opcode, bytes });
        }
        Ok(())
    }

    fn encode_bits(&self, width: u8, value: u8, acc: &mut BitAcc) {
        // Bead::decode guarantees width 1..=4 and a fitting value.
        debug_assert!((1..=4).contains(&width));
        acc.write(value as u64, width as u32);
    }

    fn encode_reg(
        &self,
        inst: &Inst,
        desc: &InstrDesc,
        slot: u8,
        alt: bool,
        part: RegPart,
        acc: &mut BitAcc,
    ) -> Result<u32, EncodeError> {
        let opcode = inst.opcode;
        let (kind, base) = desc
            .slot(slot as usize)
            .ok_or(EncodeError::SlotOutOfRange {
                opcode,
                slot,
                count: desc.slots.len(),
            })?;
        let entry = match kind {
            SlotKind::Simple => {
                if alt {
                    return Err(EncodeError::AltOnSimple { opcode, slot });
                }
                base
            }
            SlotKind::Mem { len } => {
                let sub = if alt { MEM_INDEX } else { MEM_BASE };
                if sub >= len {
                    return Err(EncodeError::SubEntryOutOfRange {
                        opcode,
                        slot,
                        len,
                        entry: sub,
                    });
                }
                base + sub as usize
            }
            SlotKind::PcRel { len } => {
                if !alt {
                    return Err(EncodeError::PcRelRegNeedsAlt { opcode, slot });
                }
                if PCREL_INDEX >= len {
                    return Err(EncodeError::SubEntryOutOfRange {
                        opcode,
                        slot,
                        len,
                        entry: PCREL_INDEX,
                    });
                }
                base + PCREL_INDEX as usize
            }
        };
        let reg = inst.operands[entry]
            .reg()
            .ok_or(EncodeError::ExpectedReg {
                opcode,
                slot,
                entry,
            })?;

        let mut written = 0;
        if matches!(part, RegPart::Code | RegPart::CodeAndClass) {
            acc.write((self.reg_info.encoding(reg) & 0x7) as u64, 3);
            written += 3;
        }
        if matches!(part, RegPart::Class | RegPart::CodeAndClass) {
            acc.write(self.reg_info.is_address(reg) as u64, 1);
            written += 1;
        }
        Ok(written)
    }

    #[allow(clippy::too_many_arguments)]
    fn encode_imm(
        &self,
        inst: &Inst,
        desc: &InstrDesc,
        slot: u8,
        alt: bool,
        width: ImmWidth,
        acc: &mut BitAcc,
        fixups: &mut Vec<Fixup>,
    ) -> Result<u32, EncodeError> {
        let opcode = inst.opcode;
        let (kind, base) = desc
            .slot(slot as usize)
            .ok_or(EncodeError::SlotOutOfRange {
                opcode,
                slot,
                count: desc.slots.len(),
            })?;

        // PC-relative displacements are never known at encode time; they
        // always defer, even when the operand is a plain constant.
        if let SlotKind::PcRel { .. } = kind {
            if alt {
                return Err(EncodeError::AltOnPcRel { opcode, slot });
            }
            let entry = base + PCREL_DISP as usize;
            let expr = match inst.operands[entry] {
                Operand::Imm(v) => Expr::constant(v),
                Operand::Sym(e) => e,
                Operand::Reg(_) => {
                    return Err(EncodeError::ExpectedImm {
                        opcode,
                        slot,
                        entry,
                    })
                }
            };
            return Ok(self.defer(expr, width, true, acc, fixups));
        }

        let entry = match kind {
            SlotKind::Simple => {
                if alt {
                    return Err(EncodeError::AltOnSimple { opcode, slot });
                }
                base
            }
            SlotKind::Mem { len } => {
                let sub = if alt { MEM_OUTER } else { MEM_DISP };
                if sub >= len {
                    return Err(EncodeError::SubEntryOutOfRange {
                        opcode,
                        slot,
                        len,
                        entry: sub,
                    });
                }
                base + sub as usize
            }
            SlotKind::PcRel { .. } => unreachable!("handled above"),
        };

        let value = match inst.operands[entry] {
            Operand::Sym(e) => return Ok(self.defer(e, width, false, acc, fixups)),
            Operand::Imm(v) => v,
            Operand::Reg(_) => {
                return Err(EncodeError::ExpectedImm {
                    opcode,
                    slot,
                    entry,
                })
            }
        };

        let bits = width.bits();
        if !fits(value, bits) {
            return Err(EncodeError::ImmTooWide {
                opcode,
                value,
                bits,
            });
        }
        match width {
            // Word-oriented instruction memory: the high half goes out first.
            ImmWidth::W32 => {
                let v = value as u64;
                acc.write((v >> 16) & 0xFFFF, 16);
                acc.write(v & 0xFFFF, 16);
            }
            _ => {
                let mask = (1u64 << bits) - 1;
                acc.write(value as u64 & mask, bits);
            }
        }
        Ok(bits)
    }

    fn defer(
        &self,
        expr: Expr,
        width: ImmWidth,
        pc_relative: bool,
        acc: &mut BitAcc,
        fixups: &mut Vec<Fixup>,
    ) -> u32 {
        let kind = FixupKind::for_width(width, pc_relative);
        trace!(?kind, ?expr, "fixup");
        fixups.push(Fixup {
            offset: FIXUP_BYTE_OFFSET,
            expr,
            kind,
        });
        // Zero placeholder of the declared width.
        let bits = width.bits();
        if bits == 32 {
            acc.write(0, 16);
            acc.write(0, 16);
        } else {
            acc.write(0, bits);
        }
        bits
    }
}

/// A constant fits a field if it is representable either unsigned or as
/// two's-complement signed in that many bits.
fn fits(value: i64, bits: u32) -> bool {
    let umax = (1u64 << bits) - 1;
    let smin = -(1i64 << (bits - 1));
    (value >= 0 && value as u64 <= umax) || (smin..0).contains(&value)
}
