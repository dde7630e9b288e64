use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    HLT,
    LDI,
    PRN,
    ADD,
    MUL,
    PUSH,
    POP,
    CALL,
    RET,
}

/// Static description of one opcode.
///
/// The operand count is encoded in the top two bits of `code`. Instructions
/// with `sets_pc` move the program counter themselves, so the engine must not
/// advance it after they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpCode {
    pub code: u8,
    pub inst: Inst,
    pub mnemonic: &'static str,
    pub sets_pc: bool,
}
impl OpCode {
    const fn new(code: u8, inst: Inst, mnemonic: &'static str, sets_pc: bool) -> Self {
        Self {
            code,
            inst,
            mnemonic,
            sets_pc,
        }
    }

    pub fn operand_cnt(&self) -> u8 {
        self.code >> 6
    }

    /// Size of the instruction in bytes, opcode included.
    pub fn len(&self) -> usize {
        self.operand_cnt() as usize + 1
    }
}

pub const OPCODES: [OpCode; 9] = [
    OpCode::new(0b00000001, Inst::HLT, "HLT", false),
    OpCode::new(0b10000010, Inst::LDI, "LDI", false),
    OpCode::new(0b01000111, Inst::PRN, "PRN", false),
    OpCode::new(0b10100000, Inst::ADD, "ADD", false),
    OpCode::new(0b10100010, Inst::MUL, "MUL", false),
    OpCode::new(0b01000101, Inst::PUSH, "PUSH", false),
    OpCode::new(0b01000110, Inst::POP, "POP", false),
    OpCode::new(0b01010000, Inst::CALL, "CALL", true),
    OpCode::new(0b00010001, Inst::RET, "RET", true),
];

const fn build_decode_table() -> [Option<OpCode>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < OPCODES.len() {
        table[OPCODES[i].code as usize] = Some(OPCODES[i]);
        i += 1;
    }
    table
}

static DECODE_TABLE: [Option<OpCode>; 256] = build_decode_table();

pub fn decode_inst(byte: u8) -> Option<OpCode> {
    DECODE_TABLE[byte as usize]
}

pub fn lookup_mnemonic(name: &str) -> Option<OpCode> {
    OPCODES
        .iter()
        .find(|op| op.mnemonic.eq_ignore_ascii_case(name))
        .copied()
}

/// Register-to-register arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Mul,
}
impl AluOp {
    pub fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Mul => a.wrapping_mul(b),
        }
    }
}
impl FromStr for AluOp {
    type Err = UnsupportedOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(AluOp::Add),
            "MUL" => Ok(AluOp::Mul),
            _ => Err(UnsupportedOperation(s.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported ALU operation '{0}'")]
pub struct UnsupportedOperation(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_opcode_decodes_to_itself() {
        for op in OPCODES {
            assert_eq!(decode_inst(op.code), Some(op));
        }
    }

    #[test]
    fn unknown_byte_decodes_to_none() {
        assert_eq!(decode_inst(0), None);
        assert_eq!(decode_inst(0xFF), None);
        assert_eq!(
            (0..=255u8).filter_map(decode_inst).count(),
            OPCODES.len()
        );
    }

    #[test]
    fn operand_count_comes_from_top_bits() {
        let ldi = decode_inst(130).unwrap();
        assert_eq!(ldi.inst, Inst::LDI);
        assert_eq!(ldi.operand_cnt(), 2);
        assert_eq!(ldi.len(), 3);
        assert_eq!(decode_inst(71).unwrap().len(), 2);
        assert_eq!(decode_inst(1).unwrap().len(), 1);
    }

    #[test]
    fn only_call_and_ret_set_pc() {
        let control_flow: Vec<Inst> = OPCODES
            .iter()
            .filter(|op| op.sets_pc)
            .map(|op| op.inst)
            .collect();
        assert_eq!(control_flow, vec![Inst::CALL, Inst::RET]);
    }

    #[test]
    fn mnemonic_lookup_ignores_case() {
        assert_eq!(lookup_mnemonic("mul").map(|op| op.code), Some(162));
        assert_eq!(lookup_mnemonic("PUSH").map(|op| op.inst), Some(Inst::PUSH));
        assert_eq!(lookup_mnemonic("NOP"), None);
    }

    #[test]
    fn alu_wraps_at_256() {
        assert_eq!(AluOp::Add.apply(200, 100), 44);
        assert_eq!(AluOp::Mul.apply(16, 17), 16);
    }

    #[test]
    fn alu_rejects_unknown_operation() {
        assert_eq!("ADD".parse::<AluOp>(), Ok(AluOp::Add));
        assert_eq!(
            "SUB".parse::<AluOp>(),
            Err(UnsupportedOperation("SUB".to_string()))
        );
    }
}
