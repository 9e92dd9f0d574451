use m68k_rs::isa::m68000;
use m68k_rs::{
    Encoder, Expr, Fixup, FixupKind, Inst, M68kRegInfo, Opcode, Operand, Reg, SymbolTable,
};
use pretty_assertions::assert_eq;

fn encode(opcode: Opcode, operands: Vec<Operand>) -> (Vec<u8>, Vec<Fixup>) {
    let instrs = m68000::instr_table();
    let recipes = m68000::recipe_table().unwrap();
    let enc = Encoder::new(&instrs, &recipes, &M68kRegInfo);
    let mut out = Vec::new();
    let mut fixups = Vec::new();
    enc.encode(&Inst::new(opcode, operands), &mut out, &mut fixups)
        .unwrap();
    (out, fixups)
}

#[test]
fn addi_w() {
    // addi.w #5, d2
    let (out, fixups) = encode(Opcode::Addi16, vec![Operand::Reg(Reg::D2), Operand::Imm(5)]);
    assert_eq!(out, vec![0x06, 0x42, 0x00, 0x05]);
    assert!(fixups.is_empty());
}

#[test]
fn subi_and_cmpi_w() {
    let ops = || vec![Operand::Reg(Reg::D2), Operand::Imm(5)];
    assert_eq!(encode(Opcode::Subi16, ops()).0, vec![0x04, 0x42, 0x00, 0x05]);
    assert_eq!(encode(Opcode::Cmpi16, ops()).0, vec![0x0C, 0x42, 0x00, 0x05]);
}

#[test]
fn addi_w_negative_constant() {
    let (out, _) = encode(Opcode::Addi16, vec![Operand::Reg(Reg::D2), Operand::Imm(-5)]);
    assert_eq!(out, vec![0x06, 0x42, 0xFF, 0xFB]);
}

#[test]
fn move_w_immediate() {
    // move.w #$1234, d2
    let (out, _) = encode(
        Opcode::Move16di,
        vec![Operand::Reg(Reg::D2), Operand::Imm(0x1234)],
    );
    assert_eq!(out, vec![0x34, 0x3C, 0x12, 0x34]);
}

#[test]
fn move_l_immediate_is_word_swapped() {
    // move.l #$12345678, d1: the high 16-bit half is emitted before the low
    let (out, fixups) = encode(
        Opcode::Move32di,
        vec![Operand::Reg(Reg::D1), Operand::Imm(0x12345678)],
    );
    assert_eq!(out, vec![0x22, 0x3C, 0x12, 0x34, 0x56, 0x78]);
    assert!(fixups.is_empty());

    let v: u32 = 0x12345678;
    let hi = u16::from_be_bytes([out[2], out[3]]);
    let lo = u16::from_be_bytes([out[4], out[5]]);
    assert_eq!(hi as u32, (v >> 16) & 0xFFFF);
    assert_eq!(lo as u32, v & 0xFFFF);
}

#[test]
fn move_l_negative_immediate() {
    let (out, _) = encode(
        Opcode::Move32di,
        vec![Operand::Reg(Reg::D1), Operand::Imm(-1)],
    );
    assert_eq!(out, vec![0x22, 0x3C, 0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn symbolic_immediate_defers_to_absolute_fixup() {
    let mut syms = SymbolTable::new();
    let value = syms.intern("value");
    let (out, fixups) = encode(
        Opcode::Move16di,
        vec![Operand::Reg(Reg::D2), Operand::Sym(Expr::symbol(value))],
    );
    assert_eq!(out, vec![0x34, 0x3C, 0x00, 0x00]);
    assert_eq!(
        fixups,
        vec![Fixup {
            offset: 2,
            expr: Expr::symbol(value),
            kind: FixupKind::Abs16,
        }]
    );
}

#[test]
fn symbolic_long_immediate_keeps_addend() {
    let mut syms = SymbolTable::new();
    let table = syms.intern("table");
    let (out, fixups) = encode(
        Opcode::Move32di,
        vec![
            Operand::Reg(Reg::D1),
            Operand::Sym(Expr::symbol_plus(table, 8)),
        ],
    );
    assert_eq!(out, vec![0x22, 0x3C, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(fixups.len(), 1);
    assert_eq!(fixups[0].kind, FixupKind::Abs32);
    assert_eq!(fixups[0].expr.addend, 8);
}
