use crate::gb::cpu::instruction::Instruction;
use crate::gb::cpu::instruction::Instruction::*;
use crate::gb::cpu::misc::{
    ByteSource, ByteTarget, JumpTest, Load, ResetCode, StackTarget, WordSource, WordTarget,
};
use crate::gb::cpu::registers::{FlagsRegister, Registers};
use crate::gb::timer::Cycles::M;
use crate::gb::timer::{Clock, Cycles};
use crate::gb::utils::{bit_at, half_carry_u8, set_bit};
use crate::gb::AddressSpace;

mod instruction;
mod misc;
mod registers;
#[cfg(test)]
mod tests;

const OPCODE_PREFIX: u8 = 0xCB;

/// Implements the CPU for the DMG-01, an LR35902
/// which is a close relative of the i8080 and the Z80.
#[derive(Default)]
pub struct CPU {
    pub r: Registers, // CPU registers
    pub pc: u16,      // Program counter
    pub sp: u16,      // Stack pointer
    pub ime: bool,    // Interrupt master enable
    pub is_halted: bool,
    pub is_stopped: bool,
    /// Deferred EI/DI: armed at 2 by the opcode, ticked once at the end of
    /// every step, the effect lands when a counter reaches 0.
    pending_ei: u8,
    pending_di: u8,
    clock: Clock,
}

impl CPU {
    /// Puts the CPU into the documented post boot state.
    pub fn reset(&mut self) {
        self.r.set_af(0x01B0);
        self.r.set_bc(0x0013);
        self.r.set_de(0x00D8);
        self.r.set_hl(0x014D);
        self.sp = 0xFFFE;
        self.pc = 0x0100;
        self.ime = false;
        self.is_halted = false;
        self.is_stopped = false;
        self.pending_ei = 0;
        self.pending_di = 0;
    }

    /// Executes one instruction and returns the consumed T-cycles.
    /// A halted CPU burns four T-cycles per step without fetching.
    pub fn step<T: AddressSpace>(&mut self, bus: &mut T) -> u16 {
        self.clock.reset();
        if self.is_halted {
            self.clock.advance(Cycles::T(4));
            return self.clock.ticks();
        }

        // Read the next opcode from memory and check whether it is prefixed
        let opcode = self.read_cycle(bus, self.pc);
        let (opcode, prefixed) = match opcode == OPCODE_PREFIX {
            true => (self.read_cycle(bus, self.pc.wrapping_add(1)), true),
            false => (opcode, false),
        };

        match Instruction::from_byte(opcode, prefixed) {
            Some(instruction) => self.pc = self.execute(instruction, bus),
            None => {
                log::error!("Unrecognized opcode: {opcode:#04x} at {:#06x}", self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.clock.reset();
            }
        }
        self.update_ime();
        self.clock.ticks()
    }

    /// Executes the given instruction and returns the updated program counter.
    fn execute<T: AddressSpace>(&mut self, instruction: Instruction, bus: &mut T) -> u16 {
        match instruction {
            ADD(source) => self.handle_add(source, bus),
            ADDHL(source) => self.handle_add_hl(source, bus),
            ADDSP => self.handle_add_sp(bus),
            ADC(source) => self.handle_adc(source, bus),
            AND(source) => self.handle_and(source, bus),
            BIT(bit, target) => self.handle_bit(bit, target, bus),
            CALL(test) => self.handle_call(test, bus),
            CCF => self.handle_ccf(),
            CP(source) => self.handle_cp(source, bus),
            CPL => self.handle_cpl(),
            DAA => self.handle_daa(),
            DI => self.handle_di(),
            DEC(target) => self.handle_dec_byte(target, bus),
            DEC2(target) => self.handle_dec_word(target),
            EI => self.handle_ei(),
            HALT => self.handle_halt(),
            INC(target) => self.handle_inc_byte(target, bus),
            INC2(target) => self.handle_inc_word(target),
            JR(test) => self.handle_jr(test, bus),
            JP(test) => self.handle_jp(test, bus),
            JPHL => self.r.get_hl(),
            LD(load) => self.handle_ld(load, bus),
            NOP => self.pc.wrapping_add(1),
            OR(source) => self.handle_or(source, bus),
            RES(bit, target) => self.handle_res(bit, target, bus),
            RET(test) => self.handle_ret(test, bus),
            RETI => self.handle_reti(bus),
            RL(target) => self.handle_rl(target, bus),
            RLA => self.handle_rla(),
            RLC(target) => self.handle_rlc(target, bus),
            RLCA => self.handle_rlca(),
            RR(target) => self.handle_rr(target, bus),
            RRA => self.handle_rra(),
            RRC(target) => self.handle_rrc(target, bus),
            RRCA => self.handle_rrca(),
            RST(code) => self.handle_rst(code, bus),
            SBC(source) => self.handle_sbc(source, bus),
            SCF => self.handle_scf(),
            SET(bit, target) => self.handle_set(bit, target, bus),
            SLA(target) => self.handle_sla(target, bus),
            SRA(target) => self.handle_sra(target, bus),
            SRL(target) => self.handle_srl(target, bus),
            STOP => self.handle_stop(),
            SUB(source) => self.handle_sub(source, bus),
            SWAP(target) => self.handle_swap(target, bus),
            PUSH(target) => self.handle_push(target, bus),
            POP(target) => self.handle_pop(target, bus),
            XOR(source) => self.handle_xor(source, bus),
        }
    }

    /// Ticks the deferred EI/DI counters.
    fn update_ime(&mut self) {
        if self.pending_ei > 0 {
            self.pending_ei -= 1;
            if self.pending_ei == 0 {
                self.ime = true;
            }
        }
        if self.pending_di > 0 {
            self.pending_di -= 1;
            if self.pending_di == 0 {
                self.ime = false;
            }
        }
    }

    /// Reads a byte from the bus, accounting one machine cycle.
    #[inline]
    pub(crate) fn read_cycle<T: AddressSpace>(&mut self, bus: &mut T, address: u16) -> u8 {
        self.clock.advance(M(1));
        bus.read(address)
    }

    /// Writes a byte to the bus, accounting one machine cycle.
    #[inline]
    pub(crate) fn write_cycle<T: AddressSpace>(&mut self, bus: &mut T, address: u16, value: u8) {
        self.clock.advance(M(1));
        bus.write(address, value);
    }

    /// Reads the next operand byte and advances pc onto it.
    #[inline]
    pub(crate) fn consume_byte<T: AddressSpace>(&mut self, bus: &mut T) -> u8 {
        self.pc = self.pc.wrapping_add(1);
        self.read_cycle(bus, self.pc)
    }

    /// Reads the next operand word and advances pc onto its second byte.
    #[inline]
    pub(crate) fn consume_word<T: AddressSpace>(&mut self, bus: &mut T) -> u16 {
        u16::from(self.consume_byte(bus)) | (u16::from(self.consume_byte(bus)) << 8)
    }

    /// Pushes a u16 value onto the stack, most significant byte first.
    #[inline]
    pub fn push<T: AddressSpace>(&mut self, value: u16, bus: &mut T) {
        self.clock.advance(M(1));
        self.sp = self.sp.wrapping_sub(1);
        self.write_cycle(bus, self.sp, (value >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.write_cycle(bus, self.sp, value as u8);
    }

    /// Pops a u16 value from the stack.
    #[inline]
    fn pop<T: AddressSpace>(&mut self, bus: &mut T) -> u16 {
        let lsb = self.read_cycle(bus, self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        let msb = self.read_cycle(bus, self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        (msb << 8) | lsb
    }

    /// Handles ADD instructions
    fn handle_add<T: AddressSpace>(&mut self, source: ByteSource, bus: &mut T) -> u16 {
        let value = source.read(self, bus);
        let (result, overflow) = self.r.a.overflowing_add(value);
        // Half carry is set if adding the lower nibbles of the value and
        // register A overflows into the upper nibble.
        self.r
            .f
            .update(result == 0, false, half_carry_u8(self.r.a, value), overflow);
        self.r.a = result;
        self.pc.wrapping_add(1)
    }

    /// Handles ADD HL, nn instructions
    fn handle_add_hl<T: AddressSpace>(&mut self, source: WordSource, bus: &mut T) -> u16 {
        let value = source.read(self, bus);
        let hl = self.r.get_hl();
        let (result, overflow) = hl.overflowing_add(value);

        // Half carry is computed on bit 11 for the 16-bit addition
        let half_carry = (hl ^ value ^ result) & 0x1000 != 0;
        self.r.f.remove(FlagsRegister::SUBTRACTION);
        self.r.f.set(FlagsRegister::HALF_CARRY, half_carry);
        self.r.f.set(FlagsRegister::CARRY, overflow);
        self.r.set_hl(result);
        self.clock.advance(M(1));
        self.pc.wrapping_add(1)
    }

    /// Handles the ADD SP, i8 instruction
    fn handle_add_sp<T: AddressSpace>(&mut self, bus: &mut T) -> u16 {
        let sp = self.sp as i32;
        let byte = self.consume_byte(bus) as i8 as i32;
        let result = sp.wrapping_add(byte);
        self.sp = result as u16;

        // Carry and half carry are computed on the low byte
        let half_carry = (sp ^ byte ^ result) & 0b0001_0000 != 0;
        let carry = (sp ^ byte ^ result) & 0b1_0000_0000 != 0;
        self.r.f.update(false, false, half_carry, carry);
        self.clock.advance(M(2));
        self.pc.wrapping_add(1)
    }

    /// Handles ADC instructions
    fn handle_adc<T: AddressSpace>(&mut self, source: ByteSource, bus: &mut T) -> u16 {
        let value = source.read(self, bus);
        let carry_in = self.r.f.contains(FlagsRegister::CARRY) as u8;
        let half_carry = (self.r.a & 0b1111) + (value & 0b1111) + carry_in > 0b1111;

        let (result, overflow) = self.r.a.overflowing_add(value);
        let mut carry = overflow;
        let (result, overflow) = result.overflowing_add(carry_in);
        carry |= overflow;
        self.r.f.update(result == 0, false, half_carry, carry);
        self.r.a = result;
        self.pc.wrapping_add(1)
    }

    /// Handles AND instructions
    #[inline]
    fn handle_and<T: AddressSpace>(&mut self, source: ByteSource, bus: &mut T) -> u16 {
        let value = source.read(self, bus);
        self.r.a &= value;
        self.r.f.update(self.r.a == 0, false, true, false);
        self.pc.wrapping_add(1)
    }

    /// Handles BIT instructions
    fn handle_bit<T: AddressSpace>(&mut self, bit: u8, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        self.r.f.set(FlagsRegister::ZERO, !bit_at(value, bit));
        self.r.f.remove(FlagsRegister::SUBTRACTION);
        self.r.f.insert(FlagsRegister::HALF_CARRY);
        self.pc.wrapping_add(2)
    }

    /// Handles CALL instructions
    fn handle_call<T: AddressSpace>(&mut self, test: JumpTest, bus: &mut T) -> u16 {
        let target = self.consume_word(bus);
        match test.resolve(self) {
            true => {
                self.push(self.pc.wrapping_add(1), bus);
                target
            }
            false => self.pc.wrapping_add(1),
        }
    }

    /// Handles the CCF instruction
    #[inline]
    fn handle_ccf(&mut self) -> u16 {
        self.r.f.remove(FlagsRegister::SUBTRACTION);
        self.r.f.remove(FlagsRegister::HALF_CARRY);
        self.r.f.toggle(FlagsRegister::CARRY);
        self.pc.wrapping_add(1)
    }

    /// Handles CP instructions
    fn handle_cp<T: AddressSpace>(&mut self, source: ByteSource, bus: &mut T) -> u16 {
        let value = source.read(self, bus);
        let result = u32::from(self.r.a).wrapping_sub(u32::from(value));

        self.r.f.set(FlagsRegister::ZERO, result as u8 == 0);
        self.r.f.set(
            FlagsRegister::HALF_CARRY,
            (self.r.a ^ value ^ result as u8) & 0b0001_0000 != 0,
        );
        self.r
            .f
            .set(FlagsRegister::CARRY, result & 0b1_0000_0000 != 0);
        self.r.f.insert(FlagsRegister::SUBTRACTION);
        self.pc.wrapping_add(1)
    }

    /// Handles the CPL instruction
    #[inline]
    fn handle_cpl(&mut self) -> u16 {
        self.r.a = !self.r.a;
        self.r.f.insert(FlagsRegister::SUBTRACTION);
        self.r.f.insert(FlagsRegister::HALF_CARRY);
        self.pc.wrapping_add(1)
    }

    /// Handles the DAA instruction
    fn handle_daa(&mut self) -> u16 {
        if self.r.f.contains(FlagsRegister::SUBTRACTION) {
            if self.r.f.contains(FlagsRegister::CARRY) {
                self.r.a = self.r.a.wrapping_sub(0x60);
            }
            if self.r.f.contains(FlagsRegister::HALF_CARRY) {
                self.r.a = self.r.a.wrapping_sub(0x06);
            }
        } else {
            if self.r.f.contains(FlagsRegister::CARRY) || self.r.a > 0x99 {
                self.r.a = self.r.a.wrapping_add(0x60);
                self.r.f.insert(FlagsRegister::CARRY);
            }
            if self.r.f.contains(FlagsRegister::HALF_CARRY) || (self.r.a & 0b0000_1111) > 0x09 {
                self.r.a = self.r.a.wrapping_add(0x06);
            }
        }
        self.r.f.set(FlagsRegister::ZERO, self.r.a == 0);
        self.r.f.remove(FlagsRegister::HALF_CARRY);
        self.pc.wrapping_add(1)
    }

    /// Handles DEC instructions for bytes
    fn handle_dec_byte<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        let result = value.wrapping_sub(1);
        target.write(self, bus, result);
        self.r
            .f
            .set(FlagsRegister::HALF_CARRY, value.trailing_zeros() >= 4);
        self.r.f.set(FlagsRegister::ZERO, result == 0);
        self.r.f.insert(FlagsRegister::SUBTRACTION);
        self.pc.wrapping_add(1)
    }

    /// Handles DEC instructions for register pairs
    fn handle_dec_word(&mut self, target: WordTarget) -> u16 {
        let value = target.read(self);
        target.write(self, value.wrapping_sub(1));
        self.clock.advance(M(1));
        self.pc.wrapping_add(1)
    }

    /// Handles the DI instruction
    #[inline]
    fn handle_di(&mut self) -> u16 {
        self.pending_di = 2;
        self.pc.wrapping_add(1)
    }

    /// Handles the EI instruction
    #[inline]
    fn handle_ei(&mut self) -> u16 {
        self.pending_ei = 2;
        self.pc.wrapping_add(1)
    }

    /// Handles the HALT instruction
    #[inline]
    fn handle_halt(&mut self) -> u16 {
        self.is_halted = true;
        self.pc.wrapping_add(1)
    }

    /// Handles INC instructions for bytes
    fn handle_inc_byte<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        let result = value.wrapping_add(1);
        target.write(self, bus, result);
        self.r
            .f
            .set(FlagsRegister::HALF_CARRY, value & 0b1111 == 0b1111);
        self.r.f.set(FlagsRegister::ZERO, result == 0);
        self.r.f.remove(FlagsRegister::SUBTRACTION);
        self.pc.wrapping_add(1)
    }

    /// Handles INC instructions for register pairs
    fn handle_inc_word(&mut self, target: WordTarget) -> u16 {
        let value = target.read(self);
        target.write(self, value.wrapping_add(1));
        self.clock.advance(M(1));
        self.pc.wrapping_add(1)
    }

    /// Handles JR instructions
    fn handle_jr<T: AddressSpace>(&mut self, test: JumpTest, bus: &mut T) -> u16 {
        let offset = self.consume_byte(bus) as i8;
        match test.resolve(self) {
            true => {
                self.clock.advance(M(1));
                (i32::from(self.pc) + 1 + i32::from(offset)) as u16
            }
            false => self.pc.wrapping_add(1),
        }
    }

    /// Handles JP instructions
    fn handle_jp<T: AddressSpace>(&mut self, test: JumpTest, bus: &mut T) -> u16 {
        let target = self.consume_word(bus);
        match test.resolve(self) {
            true => {
                self.clock.advance(M(1));
                target
            }
            false => self.pc.wrapping_add(1),
        }
    }

    /// Handles LD instructions
    fn handle_ld<T: AddressSpace>(&mut self, load: Load, bus: &mut T) -> u16 {
        match load {
            Load::Byte(target, source) => {
                let value = source.read(self, bus);
                target.write(self, bus, value);
            }
            Load::Word(target, source) => {
                let value = source.read(self, bus);
                // LD SP, HL takes an extra internal cycle
                if let WordSource::HL = source {
                    self.clock.advance(M(1));
                }
                target.write(self, value);
            }
            Load::IndirectFromA(reference) => {
                let address = reference.resolve(self, bus);
                self.write_cycle(bus, address, self.r.a);
            }
            Load::FromIndirectA(reference) => {
                let address = reference.resolve(self, bus);
                self.r.a = self.read_cycle(bus, address);
            }
            Load::IndirectFromAInc => {
                let address = self.r.get_hl();
                self.write_cycle(bus, address, self.r.a);
                self.r.set_hl(address.wrapping_add(1));
            }
            Load::IndirectFromADec => {
                let address = self.r.get_hl();
                self.write_cycle(bus, address, self.r.a);
                self.r.set_hl(address.wrapping_sub(1));
            }
            Load::FromIndirectAInc => {
                let address = self.r.get_hl();
                self.r.a = self.read_cycle(bus, address);
                self.r.set_hl(address.wrapping_add(1));
            }
            Load::FromIndirectADec => {
                let address = self.r.get_hl();
                self.r.a = self.read_cycle(bus, address);
                self.r.set_hl(address.wrapping_sub(1));
            }
            Load::IndirectFromSP => {
                let address = self.consume_word(bus);
                self.write_cycle(bus, address, self.sp as u8);
                self.write_cycle(bus, address.wrapping_add(1), (self.sp >> 8) as u8);
            }
            Load::HLFromSPi8 => {
                let sp = self.sp as i32;
                let byte = self.consume_byte(bus) as i8 as i32;
                let result = sp.wrapping_add(byte);

                // Carry and half carry are computed on the low byte
                let half_carry = (sp ^ byte ^ result) & 0b0001_0000 != 0;
                let carry = (sp ^ byte ^ result) & 0b1_0000_0000 != 0;
                self.r.f.update(false, false, half_carry, carry);
                self.r.set_hl(result as u16);
                self.clock.advance(M(1));
            }
        }
        self.pc.wrapping_add(1)
    }

    /// Handles OR instructions
    #[inline]
    fn handle_or<T: AddressSpace>(&mut self, source: ByteSource, bus: &mut T) -> u16 {
        let value = source.read(self, bus);
        self.r.a |= value;
        self.r.f.update(self.r.a == 0, false, false, false);
        self.pc.wrapping_add(1)
    }

    /// Handles the POP instruction
    #[inline]
    fn handle_pop<T: AddressSpace>(&mut self, target: StackTarget, bus: &mut T) -> u16 {
        let result = self.pop(bus);
        match target {
            StackTarget::AF => self.r.set_af(result),
            StackTarget::BC => self.r.set_bc(result),
            StackTarget::DE => self.r.set_de(result),
            StackTarget::HL => self.r.set_hl(result),
        };
        self.pc.wrapping_add(1)
    }

    /// Handles the PUSH instruction
    #[inline]
    fn handle_push<T: AddressSpace>(&mut self, target: StackTarget, bus: &mut T) -> u16 {
        let value = match target {
            StackTarget::AF => self.r.get_af(),
            StackTarget::BC => self.r.get_bc(),
            StackTarget::DE => self.r.get_de(),
            StackTarget::HL => self.r.get_hl(),
        };
        self.push(value, bus);
        self.pc.wrapping_add(1)
    }

    /// Handles RES instructions
    #[inline]
    fn handle_res<T: AddressSpace>(&mut self, bit: u8, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        target.write(self, bus, set_bit(value, bit, false));
        self.pc.wrapping_add(2)
    }

    /// Handles RET instructions
    fn handle_ret<T: AddressSpace>(&mut self, test: JumpTest, bus: &mut T) -> u16 {
        // The conditional variants take an extra cycle to evaluate the test
        if test != JumpTest::Always {
            self.clock.advance(M(1));
        }
        match test.resolve(self) {
            true => {
                let target = self.pop(bus);
                self.clock.advance(M(1));
                target
            }
            false => self.pc.wrapping_add(1),
        }
    }

    /// Handles the RETI instruction
    #[inline]
    fn handle_reti<T: AddressSpace>(&mut self, bus: &mut T) -> u16 {
        let target = self.pop(bus);
        self.clock.advance(M(1));
        self.ime = true;
        target
    }

    /// Handles RL instructions
    /// Rotate n left through the carry flag.
    fn handle_rl<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        let carry = value & 0b1000_0000 != 0;
        let result = (value << 1) | self.r.f.contains(FlagsRegister::CARRY) as u8;
        self.r.f.update(result == 0, false, false, carry);
        target.write(self, bus, result);
        self.pc.wrapping_add(2)
    }

    /// Handles the RLA instruction
    /// Rotate A left through carry.
    #[inline]
    fn handle_rla(&mut self) -> u16 {
        let carry = (self.r.a >> 7) != 0;
        self.r.a = (self.r.a << 1) | self.r.f.contains(FlagsRegister::CARRY) as u8;
        self.r.f.update(false, false, false, carry);
        self.pc.wrapping_add(1)
    }

    /// Handles RLC instructions
    /// Rotates the operand to the left, old bit 7 goes to the carry flag.
    fn handle_rlc<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        let carry = value & 0b1000_0000 != 0;
        let result = value.rotate_left(1);
        self.r.f.update(result == 0, false, false, carry);
        target.write(self, bus, result);
        self.pc.wrapping_add(2)
    }

    /// Handles the RLCA instruction
    #[inline]
    fn handle_rlca(&mut self) -> u16 {
        let carry = self.r.a & 0b1000_0000 != 0;
        self.r.a = (self.r.a << 1) | carry as u8;
        self.r.f.update(false, false, false, carry);
        self.pc.wrapping_add(1)
    }

    /// Handles RR instructions
    fn handle_rr<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        let carry = value & 0x01 != 0;
        let result = (value >> 1) | (u8::from(self.r.f.contains(FlagsRegister::CARRY)) << 7);
        target.write(self, bus, result);
        self.r.f.update(result == 0, false, false, carry);
        self.pc.wrapping_add(2)
    }

    /// Handles the RRA instruction
    #[inline]
    fn handle_rra(&mut self) -> u16 {
        let carry = self.r.a & 0x01 != 0;
        self.r.a = (self.r.a >> 1) | (u8::from(self.r.f.contains(FlagsRegister::CARRY)) << 7);
        self.r.f.update(false, false, false, carry);
        self.pc.wrapping_add(1)
    }

    /// Handles RRC instructions
    fn handle_rrc<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        let carry = value & 0x01 != 0;
        let result = value.rotate_right(1);
        self.r.f.update(result == 0, false, false, carry);
        target.write(self, bus, result);
        self.pc.wrapping_add(2)
    }

    /// Handles the RRCA instruction
    #[inline]
    fn handle_rrca(&mut self) -> u16 {
        let carry = self.r.a & 0x01;
        self.r.a = (self.r.a >> 1) | (carry << 7);
        self.r.f.update(false, false, false, carry != 0);
        self.pc.wrapping_add(1)
    }

    /// Handles RST instructions
    #[inline]
    fn handle_rst<T: AddressSpace>(&mut self, code: ResetCode, bus: &mut T) -> u16 {
        self.push(self.pc.wrapping_add(1), bus);
        code as u16
    }

    /// Handles SBC instructions
    fn handle_sbc<T: AddressSpace>(&mut self, source: ByteSource, bus: &mut T) -> u16 {
        let a = self.r.a as u32;
        let value = source.read(self, bus) as u32;
        let result = a
            .wrapping_sub(value)
            .wrapping_sub(self.r.f.contains(FlagsRegister::CARRY) as u32);
        self.r.a = result as u8;
        self.r.f.update(
            result as u8 == 0,
            true,
            (a ^ value ^ result) & 0b0001_0000 != 0,
            result & 0b1_0000_0000 != 0,
        );
        self.pc.wrapping_add(1)
    }

    /// Handles the SCF instruction
    #[inline]
    fn handle_scf(&mut self) -> u16 {
        self.r.f.remove(FlagsRegister::SUBTRACTION);
        self.r.f.remove(FlagsRegister::HALF_CARRY);
        self.r.f.insert(FlagsRegister::CARRY);
        self.pc.wrapping_add(1)
    }

    /// Handles SET instructions
    #[inline]
    fn handle_set<T: AddressSpace>(&mut self, bit: u8, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        target.write(self, bus, set_bit(value, bit, true));
        self.pc.wrapping_add(2)
    }

    /// Handles SLA instructions
    fn handle_sla<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        let carry = value & 0b1000_0000 != 0;
        let result = value << 1;
        self.r.f.update(result == 0, false, false, carry);
        target.write(self, bus, result);
        self.pc.wrapping_add(2)
    }

    /// Handles SRA instructions
    fn handle_sra<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        let carry = value & 0x01 != 0;
        let result = (value >> 1) | (value & 0b1000_0000);
        self.r.f.update(result == 0, false, false, carry);
        target.write(self, bus, result);
        self.pc.wrapping_add(2)
    }

    /// Handles SRL instructions
    fn handle_srl<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        let carry = value & 0x01 != 0;
        let result = value >> 1;
        target.write(self, bus, result);
        self.r.f.update(result == 0, false, false, carry);
        self.pc.wrapping_add(2)
    }

    /// Handles the STOP instruction. The CPU and the LCD are suspended
    /// until a button press clears the flag; the padding byte is skipped.
    fn handle_stop(&mut self) -> u16 {
        self.is_stopped = true;
        self.pc.wrapping_add(2)
    }

    /// Handles SUB instructions
    fn handle_sub<T: AddressSpace>(&mut self, source: ByteSource, bus: &mut T) -> u16 {
        let a = u16::from(self.r.a);
        let value = u16::from(source.read(self, bus));
        let result = a.wrapping_sub(value);

        let carry_bits = a ^ value ^ result;
        let half_carry = carry_bits & 0b0001_0000 != 0;
        let carry = carry_bits & 0b1_0000_0000 != 0;
        self.r.f.update(result == 0, true, half_carry, carry);
        self.r.a = result as u8;
        self.pc.wrapping_add(1)
    }

    /// Handles SWAP instructions
    #[inline]
    fn handle_swap<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) -> u16 {
        let value = target.read(self, bus);
        self.r.f.update(value == 0, false, false, false);
        target.write(self, bus, value.rotate_right(4));
        self.pc.wrapping_add(2)
    }

    /// Handles XOR instructions
    #[inline]
    fn handle_xor<T: AddressSpace>(&mut self, source: ByteSource, bus: &mut T) -> u16 {
        let value = source.read(self, bus);
        self.r.a ^= value;
        self.r.f.update(self.r.a == 0, false, false, false);
        self.pc.wrapping_add(1)
    }
}
