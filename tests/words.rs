use m68k_rs::isa::m68000;
use m68k_rs::{Encoder, Inst, M68kRegInfo, Opcode, Operand, Reg};
use pretty_assertions::assert_eq;

fn encode(opcode: Opcode, operands: Vec<Operand>) -> Vec<u8> {
    let instrs = m68000::instr_table();
    let recipes = m68000::recipe_table().unwrap();
    let enc = Encoder::new(&instrs, &recipes, &M68kRegInfo);
    let mut out = Vec::new();
    let mut fixups = Vec::new();
    enc.encode(&Inst::new(opcode, operands), &mut out, &mut fixups)
        .unwrap();
    assert!(fixups.is_empty());
    out
}

#[test]
fn nop() {
    assert_eq!(encode(Opcode::Nop, vec![]), vec![0x4E, 0x71]);
}

#[test]
fn rts() {
    assert_eq!(encode(Opcode::Rts, vec![]), vec![0x4E, 0x75]);
}

#[test]
fn moveq_positive() {
    // moveq #42, d3
    let out = encode(Opcode::Moveq, vec![Operand::Reg(Reg::D3), Operand::Imm(42)]);
    assert_eq!(out, vec![0x76, 0x2A]);
}

#[test]
fn moveq_negative() {
    // moveq #-1, d3: the 8-bit field takes the two's-complement form
    let out = encode(Opcode::Moveq, vec![Operand::Reg(Reg::D3), Operand::Imm(-1)]);
    assert_eq!(out, vec![0x76, 0xFF]);
}

#[test]
fn move_w_data_to_data() {
    // move.w d3, d5
    let out = encode(
        Opcode::Move16dd,
        vec![Operand::Reg(Reg::D5), Operand::Reg(Reg::D3)],
    );
    assert_eq!(out, vec![0x3A, 0x03]);
}

#[test]
fn move_w_address_source_sets_class_bit() {
    // move.w a3, d5: source mode becomes 001
    let out = encode(
        Opcode::Move16dd,
        vec![Operand::Reg(Reg::D5), Operand::Reg(Reg::A3)],
    );
    assert_eq!(out, vec![0x3A, 0x0B]);
}

#[test]
fn move_l_data_to_data() {
    // move.l d3, d5
    let out = encode(
        Opcode::Move32dd,
        vec![Operand::Reg(Reg::D5), Operand::Reg(Reg::D3)],
    );
    assert_eq!(out, vec![0x2A, 0x03]);
}

#[test]
fn alu_register_forms() {
    let dst_src = || vec![Operand::Reg(Reg::D2), Operand::Reg(Reg::D1)];
    assert_eq!(encode(Opcode::Add16dd, dst_src()), vec![0xD4, 0x41]);
    assert_eq!(encode(Opcode::Sub16dd, dst_src()), vec![0x94, 0x41]);
    assert_eq!(encode(Opcode::And16dd, dst_src()), vec![0xC4, 0x41]);
    assert_eq!(encode(Opcode::Or16dd, dst_src()), vec![0x84, 0x41]);
    assert_eq!(encode(Opcode::Cmp16dd, dst_src()), vec![0xB4, 0x41]);
}

#[test]
fn swap() {
    assert_eq!(
        encode(Opcode::Swap32, vec![Operand::Reg(Reg::D3)]),
        vec![0x48, 0x43]
    );
}

#[test]
fn clr_w() {
    assert_eq!(
        encode(Opcode::Clr16, vec![Operand::Reg(Reg::D2)]),
        vec![0x42, 0x42]
    );
}

#[test]
fn register_field_uses_three_bit_encoding() {
    for (reg, byte) in [(Reg::D0, 0x70), (Reg::D5, 0x7A), (Reg::D7, 0x7E)] {
        let out = encode(Opcode::Moveq, vec![Operand::Reg(reg), Operand::Imm(0)]);
        assert_eq!(out, vec![byte, 0x00]);
    }
}
