use crate::gb::cpu::misc::JumpTest::{Always, Carry, NotCarry, NotZero, Zero};
use crate::gb::cpu::misc::{
    ByteRef, ByteSource, ByteTarget, JumpTest, Load, ResetCode, StackTarget, WordSource, WordTarget,
};
use Instruction::*;

#[derive(Copy, Clone, Debug)]
pub enum Instruction {
    ADD(ByteSource),      // Add n to A
    ADDHL(WordSource),    // Add nn to HL
    ADDSP,                // Add signed immediate 8-bit value to SP
    ADC(ByteSource),      // Add n + Carry flag to A
    AND(ByteSource),      // Logically AND n with A, result in A
    BIT(u8, ByteTarget),  // Test bit b in operand slot
    CALL(JumpTest),       // Push address of the next instruction and jump to a16
    CCF,                  // Complement carry flag
    CP(ByteSource),       // Compare A with source, discarding the result
    CPL,                  // Flip all bits in A, set N and H flags
    DAA,                  // Decimal adjust A after BCD arithmetic
    DI,                   // Disable interrupt handling, two steps delayed
    DEC(ByteTarget),      // Decrement single byte operand
    DEC2(WordTarget),     // Decrement register pair
    EI,                   // Enable interrupt handling, two steps delayed
    HALT,                 // Suspend the CPU until an interrupt is pending
    INC(ByteTarget),      // Increment single byte operand
    INC2(WordTarget),     // Increment register pair
    JR(JumpTest),         // Relative jump by a signed offset
    JP(JumpTest),         // Jump to a16
    JPHL,                 // Jump to the address stored in HL
    LD(Load),             // The load family, see `Load`
    NOP,                  // No operation
    OR(ByteSource),       // Logical OR n with A, result in A
    PUSH(StackTarget),    // Push a register pair onto the stack
    POP(StackTarget),     // Pop a register pair from the stack
    RES(u8, ByteTarget),  // Reset bit b in operand slot
    RET(JumpTest),        // Pop two bytes from the stack and jump there
    RETI,                 // Unconditional return which also enables interrupts
    RL(ByteTarget),       // Rotate n left through carry flag
    RLA,                  // Rotate A left through carry
    RLC(ByteTarget),      // Rotate n left, old bit 7 to carry flag
    RLCA,                 // Rotate A left, old bit 7 to carry flag
    RR(ByteTarget),       // Rotate n right through carry flag
    RRA,                  // Rotate A right through carry
    RRC(ByteTarget),      // Rotate n right, old bit 0 to carry flag
    RRCA,                 // Rotate A right, old bit 0 to carry flag
    RST(ResetCode),       // Push the current address and jump to a fixed vector
    SBC(ByteSource),      // Subtract n + Carry flag from A
    SCF,                  // Set carry flag
    SET(u8, ByteTarget),  // Set bit b in operand slot
    SLA(ByteTarget),      // Shift n left into carry, LSB set to 0
    SRA(ByteTarget),      // Shift n right into carry, MSB unchanged
    SRL(ByteTarget),      // Shift n right into carry, MSB set to 0
    STOP,                 // Halt CPU and LCD until a button is pressed
    SUB(ByteSource),      // Subtract n from A
    SWAP(ByteTarget),     // Swap upper and lower nibbles of n
    XOR(ByteSource),      // Logical exclusive OR n with A, result in A
}

impl Instruction {
    /// Decodes an `Instruction` from the given opcode. Returns `None` for
    /// the opcodes the instruction set leaves undefined.
    pub fn from_byte(opcode: u8, prefixed: bool) -> Option<Instruction> {
        match prefixed {
            true => Some(Self::prefixed(opcode)),
            false => Self::not_prefixed(opcode),
        }
    }

    /// Decodes the 0xCB prefix table. The table is fully regular: the lower
    /// three bits select the operand slot, bits 3-5 the bit number (or the
    /// operation within the rotate/shift group).
    fn prefixed(opcode: u8) -> Instruction {
        let target = ByteTarget::from_bits(opcode);
        let bit = (opcode >> 3) & 0b111;
        match opcode {
            0x00..=0x07 => RLC(target),
            0x08..=0x0F => RRC(target),
            0x10..=0x17 => RL(target),
            0x18..=0x1F => RR(target),
            0x20..=0x27 => SLA(target),
            0x28..=0x2F => SRA(target),
            0x30..=0x37 => SWAP(target),
            0x38..=0x3F => SRL(target),
            0x40..=0x7F => BIT(bit, target),
            0x80..=0xBF => RES(bit, target),
            0xC0..=0xFF => SET(bit, target),
        }
    }

    /// Decodes the primary table.
    fn not_prefixed(opcode: u8) -> Option<Instruction> {
        let instruction = match opcode {
            0x00 => NOP,
            0x01 => LD(Load::Word(WordTarget::BC, WordSource::D16)),
            0x02 => LD(Load::IndirectFromA(ByteRef::BCI)),
            0x03 => INC2(WordTarget::BC),
            0x04 => INC(ByteTarget::B),
            0x05 => DEC(ByteTarget::B),
            0x06 => LD(Load::Byte(ByteTarget::B, ByteSource::D8)),
            0x07 => RLCA,
            0x08 => LD(Load::IndirectFromSP),
            0x09 => ADDHL(WordSource::BC),
            0x0A => LD(Load::FromIndirectA(ByteRef::BCI)),
            0x0B => DEC2(WordTarget::BC),
            0x0C => INC(ByteTarget::C),
            0x0D => DEC(ByteTarget::C),
            0x0E => LD(Load::Byte(ByteTarget::C, ByteSource::D8)),
            0x0F => RRCA,

            0x10 => STOP,
            0x11 => LD(Load::Word(WordTarget::DE, WordSource::D16)),
            0x12 => LD(Load::IndirectFromA(ByteRef::DEI)),
            0x13 => INC2(WordTarget::DE),
            0x14 => INC(ByteTarget::D),
            0x15 => DEC(ByteTarget::D),
            0x16 => LD(Load::Byte(ByteTarget::D, ByteSource::D8)),
            0x17 => RLA,
            0x18 => JR(Always),
            0x19 => ADDHL(WordSource::DE),
            0x1A => LD(Load::FromIndirectA(ByteRef::DEI)),
            0x1B => DEC2(WordTarget::DE),
            0x1C => INC(ByteTarget::E),
            0x1D => DEC(ByteTarget::E),
            0x1E => LD(Load::Byte(ByteTarget::E, ByteSource::D8)),
            0x1F => RRA,

            0x20 => JR(NotZero),
            0x21 => LD(Load::Word(WordTarget::HL, WordSource::D16)),
            0x22 => LD(Load::IndirectFromAInc),
            0x23 => INC2(WordTarget::HL),
            0x24 => INC(ByteTarget::H),
            0x25 => DEC(ByteTarget::H),
            0x26 => LD(Load::Byte(ByteTarget::H, ByteSource::D8)),
            0x27 => DAA,
            0x28 => JR(Zero),
            0x29 => ADDHL(WordSource::HL),
            0x2A => LD(Load::FromIndirectAInc),
            0x2B => DEC2(WordTarget::HL),
            0x2C => INC(ByteTarget::L),
            0x2D => DEC(ByteTarget::L),
            0x2E => LD(Load::Byte(ByteTarget::L, ByteSource::D8)),
            0x2F => CPL,

            0x30 => JR(NotCarry),
            0x31 => LD(Load::Word(WordTarget::SP, WordSource::D16)),
            0x32 => LD(Load::IndirectFromADec),
            0x33 => INC2(WordTarget::SP),
            0x34 => INC(ByteTarget::HLI),
            0x35 => DEC(ByteTarget::HLI),
            0x36 => LD(Load::Byte(ByteTarget::HLI, ByteSource::D8)),
            0x37 => SCF,
            0x38 => JR(Carry),
            0x39 => ADDHL(WordSource::SP),
            0x3A => LD(Load::FromIndirectADec),
            0x3B => DEC2(WordTarget::SP),
            0x3C => INC(ByteTarget::A),
            0x3D => DEC(ByteTarget::A),
            0x3E => LD(Load::Byte(ByteTarget::A, ByteSource::D8)),
            0x3F => CCF,

            // The 8-bit load and ALU blocks are regular in the same way as
            // the prefix table, with HALT punched into the (HL), (HL) slot.
            0x76 => HALT,
            0x40..=0x7F => LD(Load::Byte(
                ByteTarget::from_bits(opcode >> 3),
                ByteSource::from_bits(opcode),
            )),
            0x80..=0x87 => ADD(ByteSource::from_bits(opcode)),
            0x88..=0x8F => ADC(ByteSource::from_bits(opcode)),
            0x90..=0x97 => SUB(ByteSource::from_bits(opcode)),
            0x98..=0x9F => SBC(ByteSource::from_bits(opcode)),
            0xA0..=0xA7 => AND(ByteSource::from_bits(opcode)),
            0xA8..=0xAF => XOR(ByteSource::from_bits(opcode)),
            0xB0..=0xB7 => OR(ByteSource::from_bits(opcode)),
            0xB8..=0xBF => CP(ByteSource::from_bits(opcode)),

            0xC0 => RET(NotZero),
            0xC1 => POP(StackTarget::BC),
            0xC2 => JP(NotZero),
            0xC3 => JP(Always),
            0xC4 => CALL(NotZero),
            0xC5 => PUSH(StackTarget::BC),
            0xC6 => ADD(ByteSource::D8),
            0xC7 => RST(ResetCode::RST00),
            0xC8 => RET(Zero),
            0xC9 => RET(Always),
            0xCA => JP(Zero),
            0xCB => unreachable!("the 0xCB prefix is resolved before decoding"),
            0xCC => CALL(Zero),
            0xCD => CALL(Always),
            0xCE => ADC(ByteSource::D8),
            0xCF => RST(ResetCode::RST08),

            0xD0 => RET(NotCarry),
            0xD1 => POP(StackTarget::DE),
            0xD2 => JP(NotCarry),
            0xD4 => CALL(NotCarry),
            0xD5 => PUSH(StackTarget::DE),
            0xD6 => SUB(ByteSource::D8),
            0xD7 => RST(ResetCode::RST10),
            0xD8 => RET(Carry),
            0xD9 => RETI,
            0xDA => JP(Carry),
            0xDC => CALL(Carry),
            0xDE => SBC(ByteSource::D8),
            0xDF => RST(ResetCode::RST18),

            0xE0 => LD(Load::IndirectFromA(ByteRef::D8IFF00)),
            0xE1 => POP(StackTarget::HL),
            0xE2 => LD(Load::IndirectFromA(ByteRef::CIFF00)),
            0xE5 => PUSH(StackTarget::HL),
            0xE6 => AND(ByteSource::D8),
            0xE7 => RST(ResetCode::RST20),
            0xE8 => ADDSP,
            0xE9 => JPHL,
            0xEA => LD(Load::IndirectFromA(ByteRef::D16I)),
            0xEE => XOR(ByteSource::D8),
            0xEF => RST(ResetCode::RST28),

            0xF0 => LD(Load::FromIndirectA(ByteRef::D8IFF00)),
            0xF1 => POP(StackTarget::AF),
            0xF2 => LD(Load::FromIndirectA(ByteRef::CIFF00)),
            0xF3 => DI,
            0xF5 => PUSH(StackTarget::AF),
            0xF6 => OR(ByteSource::D8),
            0xF7 => RST(ResetCode::RST30),
            0xF8 => LD(Load::HLFromSPi8),
            0xF9 => LD(Load::Word(WordTarget::SP, WordSource::HL)),
            0xFA => LD(Load::FromIndirectA(ByteRef::D16I)),
            0xFB => EI,
            0xFE => CP(ByteSource::D8),
            0xFF => RST(ResetCode::RST38),

            // 0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED,
            // 0xF4, 0xFC and 0xFD are not part of the instruction set.
            _ => return None,
        };
        Some(instruction)
    }
}
