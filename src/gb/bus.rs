use crate::gb::cartridge::Cartridge;
use crate::gb::constants::*;
use crate::gb::joypad::{Joypad, JoypadInput};
use crate::gb::ppu::PPU;
use crate::gb::timer::Timer;
use crate::gb::{AddressSpace, Bus};

bitflags! {
    /// Represents the interrupt registers IE at 0xFFFF and IF at 0xFF0F.
    /// Lower bit positions take priority when multiple requests are pending.
    #[derive(Copy, Clone, PartialEq, Debug, Default)]
    pub struct InterruptRegister: u8 {
        const VBLANK = 0b00000001; // V-Blank Interrupt
        const STAT   = 0b00000010; // LCD STAT Interrupt
        const TIMER  = 0b00000100; // Timer Overflow Interrupt
        const SERIAL = 0b00001000; // Serial Transfer Interrupt (never requested)
        const JOYPAD = 0b00010000; // Joypad Input Interrupt
    }
}

/// Defines the global bus; all processing units access memory through it.
pub struct MainBus {
    pub cartridge: Cartridge,
    pub timer: Timer,
    pub ppu: PPU,
    pub joypad: Joypad,
    pub interrupt_enable: InterruptRegister,
    pub interrupt_flag: InterruptRegister,
    wram: [u8; WRAM_SIZE],
    hram: [u8; HRAM_SIZE],
    io: [u8; IO_SIZE],
}

impl MainBus {
    pub fn with_cartridge(cartridge: Cartridge) -> Self {
        Self {
            cartridge,
            timer: Timer::default(),
            ppu: PPU::default(),
            joypad: Joypad::default(),
            interrupt_enable: InterruptRegister::default(),
            interrupt_flag: InterruptRegister::default(),
            wram: [0u8; WRAM_SIZE],
            hram: [0u8; HRAM_SIZE],
            io: [0u8; IO_SIZE],
        }
    }

    /// Advances the timer and the PPU by the given T-cycles. Both may
    /// request interrupts that become visible to the CPU afterwards.
    pub fn advance(&mut self, cycles: u16) {
        self.timer.step(cycles, &mut self.interrupt_flag);
        self.ppu.step(cycles, &mut self.interrupt_flag);
    }

    /// Applies a frontend input event to the joypad.
    #[inline]
    pub fn handle_input(&mut self, input: JoypadInput) {
        self.joypad.handle_input(input, &mut self.interrupt_flag);
    }

    /// Handles all writes to the I/O registers (0xFF00-0xFF7F)
    fn write_io(&mut self, address: u16, value: u8) {
        match address {
            JOYPAD => self.joypad.write(value),
            TIMER_DIVIDER..=TIMER_CTRL => self.timer.write(address, value),
            INTERRUPT_FLAG => self.interrupt_flag = InterruptRegister::from_bits_truncate(value),
            PPU_DMA => {
                self.dma_transfer(value);
                self.io[usize::from(address - IO_BEGIN)] = value;
            }
            PPU_REGISTER_START..=PPU_REGISTER_END => self.ppu.write(address, value),
            // The remaining registers have no side effects here
            _ => self.io[usize::from(address - IO_BEGIN)] = value,
        }
    }

    /// Handles all reads from the I/O registers (0xFF00-0xFF7F)
    fn read_io(&mut self, address: u16) -> u8 {
        match address {
            JOYPAD => self.joypad.read(),
            TIMER_DIVIDER..=TIMER_CTRL => self.timer.read(address),
            // Undocumented bits should be 1
            INTERRUPT_FLAG => self.interrupt_flag.bits() | 0b1110_0000,
            PPU_DMA => self.io[usize::from(address - IO_BEGIN)],
            PPU_REGISTER_START..=PPU_REGISTER_END => self.ppu.read(address),
            _ => self.io[usize::from(address - IO_BEGIN)],
        }
    }

    /// OAM DMA: synchronously copies 0xA0 bytes starting at `value << 8`
    /// into the sprite attribute table, through the bus's own read and
    /// write paths.
    fn dma_transfer(&mut self, value: u8) {
        let source = u16::from(value) << 8;
        for offset in 0..OAM_SIZE as u16 {
            let byte = self.read(source.wrapping_add(offset));
            self.write(OAM_BEGIN + offset, byte);
        }
    }
}

impl AddressSpace for MainBus {
    fn write(&mut self, address: u16, value: u8) {
        match address {
            // Writes to the ROM area are bank controller commands
            ROM_LOW_BANK_BEGIN..=ROM_HIGH_BANK_END => self.cartridge.write(address, value),
            VRAM_BEGIN..=VRAM_END => self.ppu.write(address, value),
            CRAM_BANK_BEGIN..=CRAM_BANK_END => self.cartridge.write(address, value),
            WRAM_BEGIN..=WRAM_END => self.wram[usize::from(address & 0x1FFF)] = value,
            // Writes to Echo RAM effectively mirror to Working RAM
            ERAM_BEGIN..=ERAM_END => self.wram[usize::from(address & 0x1FFF)] = value,
            OAM_BEGIN..=OAM_END => self.ppu.write(address, value),
            UNUSED_BEGIN..=UNUSED_END => {}
            IO_BEGIN..=IO_END => self.write_io(address, value),
            HRAM_BEGIN..=HRAM_END => self.hram[usize::from(address - HRAM_BEGIN)] = value,
            INTERRUPT_ENABLE => {
                self.interrupt_enable = InterruptRegister::from_bits_truncate(value)
            }
        }
    }

    fn read(&mut self, address: u16) -> u8 {
        match address {
            ROM_LOW_BANK_BEGIN..=ROM_HIGH_BANK_END => self.cartridge.read(address),
            VRAM_BEGIN..=VRAM_END => self.ppu.read(address),
            CRAM_BANK_BEGIN..=CRAM_BANK_END => self.cartridge.read(address),
            WRAM_BEGIN..=WRAM_END => self.wram[usize::from(address & 0x1FFF)],
            // Reads from Echo RAM effectively mirror from Working RAM
            ERAM_BEGIN..=ERAM_END => self.wram[usize::from(address & 0x1FFF)],
            OAM_BEGIN..=OAM_END => self.ppu.read(address),
            UNUSED_BEGIN..=UNUSED_END => UNDEFINED_READ,
            IO_BEGIN..=IO_END => self.read_io(address),
            HRAM_BEGIN..=HRAM_END => self.hram[usize::from(address - HRAM_BEGIN)],
            INTERRUPT_ENABLE => self.interrupt_enable.bits(),
        }
    }
}

impl Bus for MainBus {
    #[inline(always)]
    fn has_irq(&self) -> bool {
        let enabled = self.interrupt_enable.bits() & 0b0001_1111;
        let flag = self.interrupt_flag.bits() & 0b0001_1111;
        enabled & flag != 0
    }

    #[inline(always)]
    fn set_ie(&mut self, r: InterruptRegister) {
        self.interrupt_enable = r;
    }

    #[inline(always)]
    fn get_ie(&self) -> InterruptRegister {
        self.interrupt_enable
    }

    #[inline(always)]
    fn set_if(&mut self, r: InterruptRegister) {
        self.interrupt_flag = r;
    }

    #[inline(always)]
    fn get_if(&self) -> InterruptRegister {
        self.interrupt_flag
    }
}
