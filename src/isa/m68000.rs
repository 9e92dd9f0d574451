//! Shipped data asset for the M68000 base model: operand metadata and bead
//! recipes for a representative subset of the instruction set. This module
//! plays the role of the offline table generator's output, checked in as
//! code; the encoder consumes it through `InstrTable` and `RecipeTable` only.
//!
//! Recipes list fields from the least significant bit of each 16-bit word
//! upward, ending with the 0x00 terminator.

use crate::inst::Opcode;
use crate::instructions::{InstrDesc, InstrTable, SlotKind};
use crate::recipe::{RecipeTable, TableError};

// Table-authoring helpers for the raw bead byte forms.

fn hi(slot: u8, alt: bool) -> u8 {
    (slot << 4) | if alt { 0x80 } else { 0 }
}

fn bits1(v: u8) -> u8 {
    (v << 4) | 0x1
}

fn bits2(v: u8) -> u8 {
    (v << 4) | 0x2
}

fn bits3(v: u8) -> u8 {
    (v << 4) | 0x3
}

fn bits4(v: u8) -> u8 {
    (v << 4) | 0x4
}

/// Register code and class bit together (4 bits).
fn dareg(slot: u8, alt: bool) -> u8 {
    hi(slot, alt) | 0x5
}

/// Class bit only.
fn da(slot: u8, alt: bool) -> u8 {
    hi(slot, alt) | 0x6
}

/// Register code only.
fn reg(slot: u8, alt: bool) -> u8 {
    hi(slot, alt) | 0x7
}

fn imm8(slot: u8, alt: bool) -> u8 {
    hi(slot, alt) | 0xA
}

fn imm16(slot: u8, alt: bool) -> u8 {
    hi(slot, alt) | 0xB
}

fn imm32(slot: u8, alt: bool) -> u8 {
    hi(slot, alt) | 0xC
}

const NONE: &[SlotKind] = &[];
const REG: &[SlotKind] = &[SlotKind::Simple];
const REG_REG: &[SlotKind] = &[SlotKind::Simple, SlotKind::Simple];
const REG_IMM: &[SlotKind] = &[SlotKind::Simple, SlotKind::Simple];
const REG_MEM2: &[SlotKind] = &[SlotKind::Simple, SlotKind::Mem { len: 2 }];
const REG_MEM3: &[SlotKind] = &[SlotKind::Simple, SlotKind::Mem { len: 3 }];
const PCREL: &[SlotKind] = &[SlotKind::PcRel { len: 1 }];

const DESCS: &[InstrDesc] = &[
    InstrDesc { opcode: Opcode::Nop, name: "nop", slots: NONE },
    InstrDesc { opcode: Opcode::Rts, name: "rts", slots: NONE },
    InstrDesc { opcode: Opcode::Moveq, name: "moveq", slots: REG_IMM },
    InstrDesc { opcode: Opcode::Move16dd, name: "move16dd", slots: REG_REG },
    InstrDesc { opcode: Opcode::Move32dd, name: "move32dd", slots: REG_REG },
    InstrDesc { opcode: Opcode::Move16di, name: "move16di", slots: REG_IMM },
    InstrDesc { opcode: Opcode::Move32di, name: "move32di", slots: REG_IMM },
    InstrDesc { opcode: Opcode::Add16dd, name: "add16dd", slots: REG_REG },
    InstrDesc { opcode: Opcode::Sub16dd, name: "sub16dd", slots: REG_REG },
    InstrDesc { opcode: Opcode::And16dd, name: "and16dd", slots: REG_REG },
    InstrDesc { opcode: Opcode::Or16dd, name: "or16dd", slots: REG_REG },
    InstrDesc { opcode: Opcode::Cmp16dd, name: "cmp16dd", slots: REG_REG },
    InstrDesc { opcode: Opcode::Addi16, name: "addi16", slots: REG_IMM },
    InstrDesc { opcode: Opcode::Subi16, name: "subi16", slots: REG_IMM },
    InstrDesc { opcode: Opcode::Cmpi16, name: "cmpi16", slots: REG_IMM },
    InstrDesc { opcode: Opcode::Lea32d, name: "lea32d", slots: REG_MEM2 },
    InstrDesc { opcode: Opcode::Lea32x, name: "lea32x", slots: REG_MEM3 },
    InstrDesc { opcode: Opcode::Bra16, name: "bra16", slots: PCREL },
    InstrDesc { opcode: Opcode::Bsr16, name: "bsr16", slots: PCREL },
    InstrDesc { opcode: Opcode::Beq16, name: "beq16", slots: PCREL },
    InstrDesc { opcode: Opcode::Bne16, name: "bne16", slots: PCREL },
    InstrDesc { opcode: Opcode::Swap32, name: "swap32", slots: REG },
    InstrDesc { opcode: Opcode::Clr16, name: "clr16", slots: REG },
];

/// Instruction metadata for the shipped subset.
pub fn instr_table() -> InstrTable {
    InstrTable::new(DESCS)
}

fn recipes() -> Vec<(Opcode, Vec<u8>)> {
    // `move` forms: [ea reg | ea mode | dst mode | dst reg | size | 00].
    // Register-direct ea mode is 000 for data, 001 for address registers,
    // which is exactly the class bit above the register code.
    let move_dd = |size: u8| {
        vec![
            reg(1, false),
            da(1, false),
            bits2(0),
            da(0, false),
            bits2(0),
            reg(0, false),
            bits2(size),
            bits2(0),
            0x00,
        ]
    };
    // Immediate source: ea mode/reg = 111/100, extension word(s) follow.
    let move_di = |size: u8, imm: u8| {
        vec![
            bits3(4),
            bits3(7),
            da(0, false),
            bits2(0),
            reg(0, false),
            bits2(size),
            bits2(0),
            imm,
            0x00,
        ]
    };
    // ALU register form: [ea reg+mode | 00 | opmode 001 | dst | top nibble].
    let alu_dd = |top: u8| {
        vec![
            dareg(1, false),
            bits2(0),
            bits3(1),
            reg(0, false),
            bits4(top),
            0x00,
        ]
    };
    // Immediate ALU form: 0000 xxxx 01 mmm rrr + 16-bit extension.
    let alu_i = |op: u8| {
        vec![
            reg(0, false),
            da(0, false),
            bits2(0),
            bits2(1),
            bits4(op),
            bits4(0),
            imm16(1, false),
            0x00,
        ]
    };
    // 0110 cccc + 16-bit displacement extension word.
    let bcc = |cond: u8| {
        vec![
            bits4(0),
            bits4(0),
            bits4(cond),
            bits4(6),
            imm16(0, false),
            0x00,
        ]
    };

    vec![
        // 0x4E71
        (Opcode::Nop, vec![bits4(1), bits4(7), bits4(0xE), bits4(4), 0x00]),
        // 0x4E75
        (Opcode::Rts, vec![bits4(5), bits4(7), bits4(0xE), bits4(4), 0x00]),
        // 0111 rrr 0 dddddddd
        (
            Opcode::Moveq,
            vec![imm8(1, false), bits1(0), reg(0, false), bits4(0x7), 0x00],
        ),
        (Opcode::Move16dd, move_dd(3)),
        (Opcode::Move32dd, move_dd(2)),
        (Opcode::Move16di, move_di(3, imm16(1, false))),
        (Opcode::Move32di, move_di(2, imm32(1, false))),
        (Opcode::Add16dd, alu_dd(0xD)),
        (Opcode::Sub16dd, alu_dd(0x9)),
        (Opcode::And16dd, alu_dd(0xC)),
        (Opcode::Or16dd, alu_dd(0x8)),
        (Opcode::Cmp16dd, alu_dd(0xB)),
        (Opcode::Addi16, alu_i(0x6)),
        (Opcode::Subi16, alu_i(0x4)),
        (Opcode::Cmpi16, alu_i(0xC)),
        // 0100 rrr 111 101 bbb + d16 extension word
        (
            Opcode::Lea32d,
            vec![
                reg(1, false),
                bits3(5),
                bits3(7),
                reg(0, false),
                bits4(4),
                imm16(1, false),
                0x00,
            ],
        ),
        // 0100 rrr 111 110 bbb + brief extension word
        // [d8 | brief/scale 000 | size 1 (long index) | index reg | index class]
        (
            Opcode::Lea32x,
            vec![
                reg(1, false),
                bits3(6),
                bits3(7),
                reg(0, false),
                bits4(4),
                imm8(1, false),
                bits3(0),
                bits1(1),
                reg(1, true),
                da(1, true),
                0x00,
            ],
        ),
        (Opcode::Bra16, bcc(0x0)),
        (Opcode::Bsr16, bcc(0x1)),
        (Opcode::Beq16, bcc(0x7)),
        (Opcode::Bne16, bcc(0x6)),
        // 0100 1000 0100 0rrr
        (
            Opcode::Swap32,
            vec![
                reg(0, false),
                bits3(0),
                bits1(1),
                bits4(0),
                bits1(1),
                bits2(0),
                bits2(1),
                0x00,
            ],
        ),
        // 0100 0010 01 mmm rrr
        (
            Opcode::Clr16,
            vec![
                reg(0, false),
                da(0, false),
                bits2(0),
                bits2(1),
                bits4(2),
                bits4(4),
                0x00,
            ],
        ),
    ]
}

/// Bead recipes for the shipped subset, validated against `instr_table()`.
pub fn recipe_table() -> Result<RecipeTable, TableError> {
    let mut table = RecipeTable::new();
    for (opcode, raw) in recipes() {
        table.insert(opcode, &raw)?;
    }
    table.validate(&instr_table())?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_tables_build_and_cover_each_other() {
        let instrs = instr_table();
        let recipes = recipe_table().unwrap();
        assert_eq!(instrs.len(), recipes.len());
        for desc in instrs.iter() {
            let recipe = recipes.get(desc.opcode).unwrap();
            assert_eq!(recipe.bit_width() % 16, 0, "{}", desc.name);
        }
    }
}
