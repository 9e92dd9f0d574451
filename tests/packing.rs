//! Word packing and flushing behavior of the accumulator-driven interpreter.

use m68k_rs::instructions::{InstrDesc, InstrTable, SlotKind};
use m68k_rs::isa::m68000;
use m68k_rs::{Encoder, Fixup, Inst, M68kRegInfo, Opcode, Operand, RecipeTable, Reg};
use pretty_assertions::assert_eq;

const REG_IMM: &[SlotKind] = &[SlotKind::Simple, SlotKind::Simple];
const DESCS: &[InstrDesc] = &[InstrDesc {
    opcode: Opcode::Nop,
    name: "packdemo",
    slots: REG_IMM,
}];

fn encode_custom(recipe: &[u8], operands: Vec<Operand>) -> (Vec<u8>, Vec<Fixup>) {
    let instrs = InstrTable::new(DESCS);
    let mut recipes = RecipeTable::new();
    recipes.insert(Opcode::Nop, recipe).unwrap();
    recipes.validate(&instrs).unwrap();
    let enc = Encoder::new(&instrs, &recipes, &M68kRegInfo);
    let mut out = Vec::new();
    let mut fixups = Vec::new();
    enc.encode(&Inst::new(Opcode::Nop, operands), &mut out, &mut fixups)
        .unwrap();
    (out, fixups)
}

#[test]
fn fields_pack_from_the_low_bits_and_carry_across_words() {
    // [4-bit literal 0101][3-bit register][class bit][16-bit immediate]
    // [4-bit 0][4-bit 0], operands [d3, #$1234].
    //
    // The first three fields fill the low 8 bits; the immediate then pushes
    // the offset to 24, so one word flushes mid-recipe and 8 bits carry into
    // the second word, which the trailing literals complete.
    let recipe = &[0x54, 0x07, 0x06, 0x1B, 0x04, 0x04, 0x00];
    let (out, fixups) = encode_custom(
        recipe,
        vec![Operand::Reg(Reg::D3), Operand::Imm(0x1234)],
    );
    assert_eq!(out, vec![0x34, 0x35, 0x00, 0x12]);
    assert!(fixups.is_empty());
}

#[test]
fn ignore_beads_contribute_nothing() {
    let plain = &[0x54, 0x07, 0x06, 0x1B, 0x04, 0x04, 0x00];
    let sprinkled = &[0x10, 0x54, 0x07, 0x10, 0x06, 0x1B, 0x04, 0x10, 0x04, 0x00];
    let operands = || vec![Operand::Reg(Reg::D3), Operand::Imm(0x1234)];
    assert_eq!(
        encode_custom(plain, operands()),
        encode_custom(sprinkled, operands())
    );
}

#[test]
fn byte_count_matches_recipe_bit_width() {
    let instrs = m68000::instr_table();
    let recipes = m68000::recipe_table().unwrap();
    let enc = Encoder::new(&instrs, &recipes, &M68kRegInfo);

    let cases: Vec<(Opcode, Vec<Operand>)> = vec![
        (Opcode::Nop, vec![]),
        (Opcode::Swap32, vec![Operand::Reg(Reg::D0)]),
        (
            Opcode::Addi16,
            vec![Operand::Reg(Reg::D2), Operand::Imm(5)],
        ),
        (
            Opcode::Move32di,
            vec![Operand::Reg(Reg::D1), Operand::Imm(7)],
        ),
    ];
    for (opcode, operands) in cases {
        let mut out = Vec::new();
        let mut fixups = Vec::new();
        enc.encode(&Inst::new(opcode, operands), &mut out, &mut fixups)
            .unwrap();
        let bits = recipes.get(opcode).unwrap().bit_width();
        assert_eq!(out.len() as u32, bits / 8, "{opcode:?}");
        assert!(out.len() >= 2 && out.len() % 2 == 0, "{opcode:?}");
    }
}

#[test]
fn encoding_is_deterministic() {
    let instrs = m68000::instr_table();
    let recipes = m68000::recipe_table().unwrap();
    let enc = Encoder::new(&instrs, &recipes, &M68kRegInfo);
    let inst = Inst::new(
        Opcode::Move32di,
        vec![Operand::Reg(Reg::D1), Operand::Imm(0x12345678)],
    );

    let mut first = (Vec::new(), Vec::new());
    let mut second = (Vec::new(), Vec::new());
    enc.encode(&inst, &mut first.0, &mut first.1).unwrap();
    enc.encode(&inst, &mut second.0, &mut second.1).unwrap();
    assert_eq!(first, second);
}

#[test]
fn output_appends_to_caller_stream() {
    let instrs = m68000::instr_table();
    let recipes = m68000::recipe_table().unwrap();
    let enc = Encoder::new(&instrs, &recipes, &M68kRegInfo);

    let mut out = Vec::new();
    let mut fixups = Vec::new();
    enc.encode(&Inst::new(Opcode::Nop, vec![]), &mut out, &mut fixups)
        .unwrap();
    enc.encode(&Inst::new(Opcode::Rts, vec![]), &mut out, &mut fixups)
        .unwrap();
    assert_eq!(out, vec![0x4E, 0x71, 0x4E, 0x75]);
}
