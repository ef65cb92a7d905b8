use crate::gb::cpu::registers::FlagsRegister;
use crate::gb::cpu::CPU;
use crate::gb::AddressSpace;
use std::fmt;

/// The eight operand slots shared by most of the instruction set:
/// the seven 8-bit registers plus the byte addressed by HL.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ByteTarget {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    HLI, // the byte at the address stored in HL
}

impl ByteTarget {
    /// Decodes an operand slot from the lower three bits of an opcode.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => ByteTarget::B,
            1 => ByteTarget::C,
            2 => ByteTarget::D,
            3 => ByteTarget::E,
            4 => ByteTarget::H,
            5 => ByteTarget::L,
            6 => ByteTarget::HLI,
            7 => ByteTarget::A,
            _ => unreachable!(),
        }
    }

    /// Resolves the referred value.
    pub fn read<T: AddressSpace>(&self, cpu: &mut CPU, bus: &mut T) -> u8 {
        match *self {
            ByteTarget::A => cpu.r.a,
            ByteTarget::B => cpu.r.b,
            ByteTarget::C => cpu.r.c,
            ByteTarget::D => cpu.r.d,
            ByteTarget::E => cpu.r.e,
            ByteTarget::H => cpu.r.h,
            ByteTarget::L => cpu.r.l,
            ByteTarget::HLI => cpu.read_cycle(bus, cpu.r.get_hl()),
        }
    }

    /// Writes to the referred register or memory location.
    pub fn write<T: AddressSpace>(&self, cpu: &mut CPU, bus: &mut T, value: u8) {
        match *self {
            ByteTarget::A => cpu.r.a = value,
            ByteTarget::B => cpu.r.b = value,
            ByteTarget::C => cpu.r.c = value,
            ByteTarget::D => cpu.r.d = value,
            ByteTarget::E => cpu.r.e = value,
            ByteTarget::H => cpu.r.h = value,
            ByteTarget::L => cpu.r.l = value,
            ByteTarget::HLI => cpu.write_cycle(bus, cpu.r.get_hl(), value),
        }
    }
}

/// Sources for the 8-bit ALU and load instructions.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ByteSource {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    HLI, // the byte at the address stored in HL
    D8,  // direct 8-bit value following the opcode
}

impl ByteSource {
    /// Decodes a source slot from the lower three bits of an opcode.
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        ByteTarget::from_bits(bits).into()
    }

    /// Resolves the referred value.
    pub fn read<T: AddressSpace>(&self, cpu: &mut CPU, bus: &mut T) -> u8 {
        match *self {
            ByteSource::A => cpu.r.a,
            ByteSource::B => cpu.r.b,
            ByteSource::C => cpu.r.c,
            ByteSource::D => cpu.r.d,
            ByteSource::E => cpu.r.e,
            ByteSource::H => cpu.r.h,
            ByteSource::L => cpu.r.l,
            ByteSource::HLI => cpu.read_cycle(bus, cpu.r.get_hl()),
            ByteSource::D8 => cpu.consume_byte(bus),
        }
    }
}

impl From<ByteTarget> for ByteSource {
    fn from(target: ByteTarget) -> Self {
        match target {
            ByteTarget::A => ByteSource::A,
            ByteTarget::B => ByteSource::B,
            ByteTarget::C => ByteSource::C,
            ByteTarget::D => ByteSource::D,
            ByteTarget::E => ByteSource::E,
            ByteTarget::H => ByteSource::H,
            ByteTarget::L => ByteSource::L,
            ByteTarget::HLI => ByteSource::HLI,
        }
    }
}

/// Memory references used by the loads between A and memory.
/// Each resolves to the effective 16-bit address.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ByteRef {
    BCI,     // the address stored in BC
    DEI,     // the address stored in DE
    HLI,     // the address stored in HL
    D16I,    // the address stored in the next 16 bits
    CIFF00,  // 0xFF00 | C
    D8IFF00, // 0xFF00 | the next 8 bits
}

impl ByteRef {
    /// Resolves the effective address, consuming operand bytes if needed.
    pub fn resolve<T: AddressSpace>(&self, cpu: &mut CPU, bus: &mut T) -> u16 {
        match *self {
            ByteRef::BCI => cpu.r.get_bc(),
            ByteRef::DEI => cpu.r.get_de(),
            ByteRef::HLI => cpu.r.get_hl(),
            ByteRef::D16I => cpu.consume_word(bus),
            ByteRef::CIFF00 => u16::from(cpu.r.c) | 0xFF00,
            ByteRef::D8IFF00 => u16::from(cpu.consume_byte(bus)) | 0xFF00,
        }
    }
}

/// The four 16-bit register pairs writable by loads and INC/DEC.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum WordTarget {
    BC,
    DE,
    HL,
    SP,
}

impl WordTarget {
    /// Resolves the referred value.
    #[inline]
    pub fn read(&self, cpu: &CPU) -> u16 {
        match *self {
            WordTarget::BC => cpu.r.get_bc(),
            WordTarget::DE => cpu.r.get_de(),
            WordTarget::HL => cpu.r.get_hl(),
            WordTarget::SP => cpu.sp,
        }
    }

    /// Writes to the referred register pair.
    #[inline]
    pub fn write(&self, cpu: &mut CPU, value: u16) {
        match *self {
            WordTarget::BC => cpu.r.set_bc(value),
            WordTarget::DE => cpu.r.set_de(value),
            WordTarget::HL => cpu.r.set_hl(value),
            WordTarget::SP => cpu.sp = value,
        }
    }
}

/// Sources for the 16-bit loads and ADD HL.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum WordSource {
    BC,
    DE,
    HL,
    SP,
    D16, // direct 16-bit value following the opcode
}

impl WordSource {
    /// Resolves the referred value.
    pub fn read<T: AddressSpace>(&self, cpu: &mut CPU, bus: &mut T) -> u16 {
        match *self {
            WordSource::BC => cpu.r.get_bc(),
            WordSource::DE => cpu.r.get_de(),
            WordSource::HL => cpu.r.get_hl(),
            WordSource::SP => cpu.sp,
            WordSource::D16 => cpu.consume_word(bus),
        }
    }
}

/// The register pairs that can be pushed and popped.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum StackTarget {
    AF,
    BC,
    DE,
    HL,
}

/// Target addresses of the RST instructions.
#[derive(Copy, Clone, PartialEq, Debug)]
#[repr(u16)]
pub enum ResetCode {
    RST00 = 0x00,
    RST08 = 0x08,
    RST10 = 0x10,
    RST18 = 0x18,
    RST20 = 0x20,
    RST28 = 0x28,
    RST30 = 0x30,
    RST38 = 0x38,
}

/// Branch condition of the conditional jumps, calls and returns.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum JumpTest {
    NotZero,
    Zero,
    NotCarry,
    Carry,
    Always,
}

impl JumpTest {
    /// Evaluates the condition against the current flags.
    #[inline]
    pub fn resolve(&self, cpu: &CPU) -> bool {
        match *self {
            JumpTest::NotZero => !cpu.r.f.contains(FlagsRegister::ZERO),
            JumpTest::Zero => cpu.r.f.contains(FlagsRegister::ZERO),
            JumpTest::NotCarry => !cpu.r.f.contains(FlagsRegister::CARRY),
            JumpTest::Carry => cpu.r.f.contains(FlagsRegister::CARRY),
            JumpTest::Always => true,
        }
    }
}

impl fmt::Display for JumpTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JumpTest::NotZero => "NZ",
            JumpTest::Zero => "Z",
            JumpTest::NotCarry => "NC",
            JumpTest::Carry => "C",
            JumpTest::Always => "",
        };
        write!(f, "{name}")
    }
}

/// The addressing shapes of the LD family.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Load {
    /// Load between the eight operand slots, or from an immediate.
    Byte(ByteTarget, ByteSource),
    /// Load a 16-bit register pair from a pair or an immediate.
    Word(WordTarget, WordSource),
    /// LD (ref), A
    IndirectFromA(ByteRef),
    /// LD A, (ref)
    FromIndirectA(ByteRef),
    /// LD (HL+), A and LD (HL-), A
    IndirectFromAInc,
    IndirectFromADec,
    /// LD A, (HL+) and LD A, (HL-)
    FromIndirectAInc,
    FromIndirectADec,
    /// LD (a16), SP
    IndirectFromSP,
    /// LD HL, SP + i8
    HLFromSPi8,
}
