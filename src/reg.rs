use serde::{Deserialize, Serialize};

/// M68000 general-purpose registers: eight data and eight address registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg {
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
}

impl Reg {
    pub const ALL: [Reg; 16] = [
        Reg::D0,
        Reg::D1,
        Reg::D2,
        Reg::D3,
        Reg::D4,
        Reg::D5,
        Reg::D6,
        Reg::D7,
        Reg::A0,
        Reg::A1,
        Reg::A2,
        Reg::A3,
        Reg::A4,
        Reg::A5,
        Reg::A6,
        Reg::A7,
    ];
}

/// Register-info lookup consumed by the encoder: the machine encoding of a
/// register and its class. Both fields of a register field bead come from here.
pub trait RegInfo {
    /// 3-bit machine encoding of the register.
    fn encoding(&self, reg: Reg) -> u8;
    /// Whether the register belongs to the address class (A0..A7).
    fn is_address(&self, reg: Reg) -> bool;
}

/// Canonical register info for the M68000: D0..D7 and A0..A7 both encode 0..7.
pub struct M68kRegInfo;

impl RegInfo for M68kRegInfo {
    fn encoding(&self, reg: Reg) -> u8 {
        (reg as u8) & 0x7
    }

    fn is_address(&self, reg: Reg) -> bool {
        (reg as u8) >= 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_and_class() {
        let ri = M68kRegInfo;
        assert_eq!(ri.encoding(Reg::D0), 0);
        assert_eq!(ri.encoding(Reg::D7), 7);
        assert_eq!(ri.encoding(Reg::A0), 0);
        assert_eq!(ri.encoding(Reg::A6), 6);
        assert!(!ri.is_address(Reg::D3));
        assert!(ri.is_address(Reg::A3));
    }
}
