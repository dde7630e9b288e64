use ls8::{State, CPU};
use proptest::prelude::*;

const HLT: u8 = 0b00000001;
const LDI: u8 = 0b10000010;
const PRN: u8 = 0b01000111;
const ADD: u8 = 0b10100000;
const MUL: u8 = 0b10100010;
const PUSH: u8 = 0b01000101;
const POP: u8 = 0b01000110;

fn run(program: &[u8]) -> CPU<Vec<u8>> {
    let mut cpu = CPU::with_output(Vec::<u8>::new());
    cpu.load_and_run(program).unwrap();
    cpu
}

proptest! {
    #[test]
    fn ldi_then_halt(reg in 0u8..8, value in any::<u8>()) {
        let cpu = run(&[LDI, reg, value, HLT]);
        prop_assert_eq!(cpu.registers().get(reg), Ok(value));
        prop_assert_eq!(cpu.state(), State::Halted);
    }

    #[test]
    fn add_and_mul_wrap(a in any::<u8>(), b in any::<u8>()) {
        let cpu = run(&[LDI, 0, a, LDI, 1, b, LDI, 2, a, ADD, 0, 1, MUL, 2, 1, HLT]);
        prop_assert_eq!(cpu.registers().get(0), Ok(((a as u16 + b as u16) % 256) as u8));
        prop_assert_eq!(cpu.registers().get(2), Ok(((a as u16 * b as u16) % 256) as u8));
    }

    #[test]
    fn push_pop_round_trip(src in 0u8..7, dst in 0u8..7, value in any::<u8>()) {
        let cpu = run(&[LDI, src, value, PUSH, src, POP, dst, HLT]);
        prop_assert_eq!(cpu.registers().get(dst), Ok(value));
        prop_assert_eq!(cpu.registers().sp(), 0xF4);
    }

    #[test]
    fn runs_are_deterministic(values in proptest::collection::vec(any::<u8>(), 1..20)) {
        let mut program = vec![];
        for value in &values {
            program.extend([LDI, 3, *value, PRN, 3]);
        }
        program.push(HLT);

        let first = run(&program).into_output();
        let second = run(&program).into_output();
        prop_assert_eq!(&first, &second);

        let expected: String = values.iter().map(|v| format!("{}\n", v)).collect();
        prop_assert_eq!(String::from_utf8(first).unwrap(), expected);
    }
}
