//! The recipe byte ("bead") wire format.
//!
//! A recipe is a null-terminated string of beads. Each bead packs its kind
//! into the low nibble and kind-specific parameters into the high nibble:
//! the literal value for bit-field beads, or a 3-bit operand-slot index plus
//! the alternate-slot flag (bit 7) for register and immediate beads.
//!
//! All nibble masking lives here; the rest of the crate works on the decoded
//! `Bead` enum.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inst::ImmWidth;

const KIND_CTRL: u8 = 0x0;
const KIND_BITS1: u8 = 0x1;
const KIND_BITS2: u8 = 0x2;
const KIND_BITS3: u8 = 0x3;
const KIND_BITS4: u8 = 0x4;
const KIND_REG_CODE_CLASS: u8 = 0x5;
const KIND_REG_CLASS: u8 = 0x6;
const KIND_REG_CODE: u8 = 0x7;
const KIND_IMM8: u8 = 0xA;
const KIND_IMM16: u8 = 0xB;
const KIND_IMM32: u8 = 0xC;

const CTRL_IGNORE: u8 = 0x1;

/// Which parts of a register operand a register bead writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegPart {
    /// 3-bit register code only.
    Code,
    /// Address/data class bit only.
    Class,
    /// Register code followed by the class bit (4 bits).
    CodeAndClass,
}

/// One decoded encoding directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bead {
    /// Control directive contributing zero bits.
    Ignore,
    /// Literal field of `width` bits (1..=4) holding `value`.
    Bits { width: u8, value: u8 },
    /// Register field drawn from operand slot `slot`.
    Reg { slot: u8, alt: bool, part: RegPart },
    /// Immediate or expression field drawn from operand slot `slot`.
    Imm {
        slot: u8,
        alt: bool,
        width: ImmWidth,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BeadError {
    #[error("unknown bead kind {kind:#x} in byte {raw:#04x}")]
    UnknownKind { raw: u8, kind: u8 },
    #[error("unknown control code {code:#x} in byte {raw:#04x}")]
    UnknownControl { raw: u8, code: u8 },
    #[error("literal value {value:#x} does not fit in {width} bits")]
    LiteralTooWide { raw: u8, width: u8, value: u8 },
}

impl Bead {
    /// Decode one recipe byte. `Ok(None)` is the recipe terminator.
    pub fn decode(raw: u8) -> Result<Option<Bead>, BeadError> {
        let kind = raw & 0xF;
        let hi = raw >> 4;
        let slot = hi & 0x7;
        let alt = raw & 0x80 != 0;

        let bead = match kind {
            KIND_CTRL => match hi {
                0x0 => return Ok(None),
                CTRL_IGNORE => Bead::Ignore,
                code => return Err(BeadError::UnknownControl { raw, code }),
            },
            KIND_BITS1 | KIND_BITS2 | KIND_BITS3 | KIND_BITS4 => {
                let width = kind;
                if hi >= 1 << width {
                    return Err(BeadError::LiteralTooWide {
                        raw,
                        width,
                        value: hi,
                    });
                }
                Bead::Bits { width, value: hi }
            }
            KIND_REG_CODE_CLASS => Bead::Reg {
                slot,
                alt,
                part: RegPart::CodeAndClass,
            },
            KIND_REG_CLASS => Bead::Reg {
                slot,
                alt,
                part: RegPart::Class,
            },
            KIND_REG_CODE => Bead::Reg {
                slot,
                alt,
                part: RegPart::Code,
            },
            KIND_IMM8 => Bead::Imm {
                slot,
                alt,
                width: ImmWidth::W8,
            },
            KIND_IMM16 => Bead::Imm {
                slot,
                alt,
                width: ImmWidth::W16,
            },
            KIND_IMM32 => Bead::Imm {
                slot,
                alt,
                width: ImmWidth::W32,
            },
            _ => return Err(BeadError::UnknownKind { raw, kind }),
        };
        Ok(Some(bead))
    }

    /// Re-encode to the raw byte form used by recipe assets.
    pub fn raw(&self) -> u8 {
        fn hi(slot: u8, alt: bool) -> u8 {
            (slot << 4) | if alt { 0x80 } else { 0 }
        }
        match *self {
            Bead::Ignore => CTRL_IGNORE << 4,
            Bead::Bits { width, value } => (value << 4) | width,
            Bead::Reg { slot, alt, part } => {
                let kind = match part {
                    RegPart::CodeAndClass => KIND_REG_CODE_CLASS,
                    RegPart::Class => KIND_REG_CLASS,
                    RegPart::Code => KIND_REG_CODE,
                };
                hi(slot, alt) | kind
            }
            Bead::Imm { slot, alt, width } => {
                let kind = match width {
                    ImmWidth::W8 => KIND_IMM8,
                    ImmWidth::W16 => KIND_IMM16,
                    ImmWidth::W32 => KIND_IMM32,
                };
                hi(slot, alt) | kind
            }
        }
    }

    /// Bits this bead contributes to the output. Known statically for every
    /// bead kind, which is what makes load-time width validation possible.
    pub fn bit_width(&self) -> u32 {
        match *self {
            Bead::Ignore => 0,
            Bead::Bits { width, .. } => width as u32,
            Bead::Reg { part, .. } => match part {
                RegPart::Code => 3,
                RegPart::Class => 1,
                RegPart::CodeAndClass => 4,
            },
            Bead::Imm { width, .. } => width.bits(),
        }
    }
}
