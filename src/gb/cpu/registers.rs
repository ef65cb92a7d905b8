use std::fmt;

bitflags! {
    /// Represents the special purpose flags register F.
    /// Only the upper 4 bits are used, the lower nibble always reads as 0.
    ///
    ///    ┌-> Carry
    ///  ┌-+> Subtraction
    ///  | |
    /// 1111 0000
    /// | |
    /// └-+> Zero
    ///   └-> Half Carry
    #[derive(Copy, Clone, PartialEq, Debug, Default)]
    pub struct FlagsRegister: u8 {
        const ZERO        = 0b1000_0000;
        const SUBTRACTION = 0b0100_0000;
        const HALF_CARRY  = 0b0010_0000;
        const CARRY       = 0b0001_0000;
    }
}

impl FlagsRegister {
    /// Updates all four flags at once.
    #[inline]
    pub fn update(&mut self, zero: bool, subtraction: bool, half_carry: bool, carry: bool) {
        self.set(FlagsRegister::ZERO, zero);
        self.set(FlagsRegister::SUBTRACTION, subtraction);
        self.set(FlagsRegister::HALF_CARRY, half_carry);
        self.set(FlagsRegister::CARRY, carry);
    }
}

impl fmt::Display for FlagsRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "z: {}, n: {}, h: {}, c: {}",
            self.contains(FlagsRegister::ZERO) as u8,
            self.contains(FlagsRegister::SUBTRACTION) as u8,
            self.contains(FlagsRegister::HALF_CARRY) as u8,
            self.contains(FlagsRegister::CARRY) as u8,
        )
    }
}

/// Holds all 8-bit CPU registers. The pairs AF, BC, DE and HL are also
/// addressable as 16-bit registers with the first register as high byte.
#[derive(Copy, Clone, Default)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub f: FlagsRegister,
    pub h: u8,
    pub l: u8,
}

impl Registers {
    pub fn get_af(&self) -> u16 {
        (self.a as u16) << 8 | self.f.bits() as u16
    }

    /// The lower nibble of F is discarded, it is not backed by real bits.
    pub fn set_af(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.f = FlagsRegister::from_bits_truncate(value as u8);
    }

    pub fn get_bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    pub fn get_de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    pub fn get_hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a: {:#04x}, b: {:#04x}, c: {:#04x}, d: {:#04x}, e: {:#04x}, h: {:#04x}, l: {:#04x} | f: {}",
            self.a, self.b, self.c, self.d, self.e, self.h, self.l, self.f
        )
    }
}
