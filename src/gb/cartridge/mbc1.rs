use crate::gb::cartridge::controller::{
    BankController, BANKING_MODE_SELECT_BEGIN, BANKING_MODE_SELECT_END, RAM_BANK_NUMBER_BEGIN,
    RAM_BANK_NUMBER_END, RAM_ENABLE_BEGIN, RAM_ENABLE_END, ROM_BANK_NUMBER_BEGIN,
    ROM_BANK_NUMBER_END,
};
use crate::gb::cartridge::{rom_bank_mask, CartridgeConfig, RAM_BANK_SIZE, ROM_BANK_SIZE};
use crate::gb::constants::*;
use std::sync::Arc;

/// MBC1 supports up to 2 MiB of ROM in 16 KiB banks and up to 32 KiB of
/// banked RAM. The ROM bank number is split over two registers: the lower
/// five bits are set through 0x2000-0x3FFF, the upper two bits share the
/// 0x4000-0x5FFF register with the RAM bank number, arbitrated by the
/// banking mode select.
#[derive(Clone)]
pub struct MBC1 {
    config: CartridgeConfig,
    rom: Arc<[u8]>,
    ram: Vec<u8>,
    rom_bank: u8, // currently selected ROM bank, 1..=127, never 0
    ram_bank: u8, // currently selected RAM bank, 0..=3
    ram_enabled: bool,
    rom_banking_mode: bool, // true = ROM banking mode, false = RAM banking mode
}

impl MBC1 {
    pub fn new(config: CartridgeConfig, rom: Arc<[u8]>) -> Self {
        Self {
            ram: vec![0; config.ram_size()],
            rom_bank: 1,
            ram_bank: 0,
            ram_enabled: false,
            rom_banking_mode: true,
            rom,
            config,
        }
    }

    /// Replaces the lower five bits of the ROM bank number.
    fn select_rom_bank_low(&mut self, value: u8) {
        let bank = (self.rom_bank & 0b0110_0000) | (value & 0b0001_1111);
        self.rom_bank = match bank {
            0 => 1,
            n => n,
        };
    }

    /// Replaces bits 5-6 of the ROM bank number, or selects the RAM bank,
    /// depending on the current banking mode.
    fn select_bank_high(&mut self, value: u8) {
        match self.rom_banking_mode {
            true => self.rom_bank = (self.rom_bank & 0b0001_1111) | (value & 0b0110_0000),
            false => self.ram_bank = value & 0b11,
        }
    }

    /// Switches between ROM and RAM banking mode. Entering ROM banking
    /// mode resets the selected RAM bank to 0.
    fn select_banking_mode(&mut self, value: u8) {
        self.rom_banking_mode = value & 0b1 == 0;
        if self.rom_banking_mode {
            self.ram_bank = 0;
        }
    }

    #[inline]
    fn ram_offset(&self, address: u16) -> usize {
        usize::from(self.ram_bank) * RAM_BANK_SIZE + usize::from(address - CRAM_BANK_BEGIN)
    }
}

impl BankController for MBC1 {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            ROM_LOW_BANK_BEGIN..=ROM_LOW_BANK_END => self.rom[usize::from(address)],
            ROM_HIGH_BANK_BEGIN..=ROM_HIGH_BANK_END => {
                let bank = usize::from(self.rom_bank & rom_bank_mask(self.config.rom_banks));
                self.rom[bank * ROM_BANK_SIZE + usize::from(address - ROM_HIGH_BANK_BEGIN)]
            }
            CRAM_BANK_BEGIN..=CRAM_BANK_END => match self.ram_enabled {
                true => self
                    .ram
                    .get(self.ram_offset(address))
                    .copied()
                    .unwrap_or(UNDEFINED_READ),
                false => UNDEFINED_READ,
            },
            _ => panic!("MBC1: Invalid address for read: {address:#06x}"),
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            RAM_ENABLE_BEGIN..=RAM_ENABLE_END => {
                self.ram_enabled = value & 0b1111 == 0b1010;
            }
            ROM_BANK_NUMBER_BEGIN..=ROM_BANK_NUMBER_END => self.select_rom_bank_low(value),
            RAM_BANK_NUMBER_BEGIN..=RAM_BANK_NUMBER_END => self.select_bank_high(value),
            BANKING_MODE_SELECT_BEGIN..=BANKING_MODE_SELECT_END => self.select_banking_mode(value),
            CRAM_BANK_BEGIN..=CRAM_BANK_END => {
                if self.ram_enabled {
                    let offset = self.ram_offset(address);
                    if let Some(byte) = self.ram.get_mut(offset) {
                        *byte = value;
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gb::cartridge::ControllerType;

    fn make_controller(rom_size: u8, ram_size: u8) -> MBC1 {
        let config = CartridgeConfig::new(ControllerType::MBC1, rom_size, ram_size).unwrap();
        // Initialize each bank with a unique value
        let rom = (0u8..config.rom_banks as u8)
            .flat_map(|i| vec![i; ROM_BANK_SIZE])
            .collect();
        MBC1::new(config, rom)
    }

    #[test]
    fn test_ram_state() {
        let mut ctrl = make_controller(0x03, 0x02);

        let addr = CRAM_BANK_BEGIN + 0x10;
        ctrl.write(addr, 0x42);
        assert_eq!(ctrl.read(addr), 0xFF, "RAM should be disabled");

        ctrl.write(RAM_ENABLE_BEGIN, 0x0A);
        assert_eq!(ctrl.read(addr), 0x00, "First write should have been ignored");

        ctrl.write(addr, 0x42);
        assert_eq!(ctrl.read(addr), 0x42, "RAM should be enabled");

        ctrl.write(RAM_ENABLE_BEGIN, 0xFF);
        assert_eq!(ctrl.read(addr), 0xFF, "RAM should be disabled");
    }

    #[test]
    fn test_rom_bank_never_zero() {
        let mut ctrl = make_controller(0x05, 0x02);

        ctrl.write(ROM_BANK_NUMBER_BEGIN, 0x00);
        assert_eq!(ctrl.rom_bank, 1, "Bank 0 should be treated as bank 1");

        ctrl.write(ROM_BANK_NUMBER_BEGIN + 0x100, 0x05);
        assert_eq!(ctrl.rom_bank, 5);
        assert_eq!(
            ctrl.read(ROM_HIGH_BANK_BEGIN),
            5,
            "High bank area should read from bank 5"
        );

        ctrl.write(ROM_BANK_NUMBER_BEGIN, 0x00);
        assert_eq!(ctrl.rom_bank, 1, "Bank select 0 should fall back to 1");
        assert_eq!(ctrl.read(ROM_HIGH_BANK_BEGIN), 1);
    }

    #[test]
    fn test_rom_bank_lower_bits_masked() {
        let mut ctrl = make_controller(0x03, 0x02);

        ctrl.write(ROM_BANK_NUMBER_BEGIN, 0b1110_1001);
        assert_eq!(ctrl.rom_bank, 0b0000_1001, "Only bits 0-4 should be used");
        assert_eq!(ctrl.read(ROM_HIGH_BANK_BEGIN), 9);
    }

    #[test]
    fn test_rom_bank_upper_bits() {
        let mut ctrl = make_controller(0x06, 0x02);

        ctrl.write(ROM_BANK_NUMBER_BEGIN, 0x01);
        ctrl.write(RAM_BANK_NUMBER_BEGIN, 0b0010_0000);
        assert_eq!(ctrl.rom_bank, 33, "Bits 5-6 should extend the bank number");
        assert_eq!(ctrl.read(ROM_HIGH_BANK_BEGIN), 33);
    }

    #[test]
    fn test_rom_banking_simple() {
        let mut ctrl = make_controller(0x04, 0x02);

        assert_eq!(ctrl.read(ROM_LOW_BANK_BEGIN), 0);
        assert_eq!(ctrl.read(ROM_HIGH_BANK_BEGIN), 1);

        for i in 2..32 {
            ctrl.write(ROM_BANK_NUMBER_BEGIN, i);
            assert_eq!(
                ctrl.read(ROM_HIGH_BANK_BEGIN),
                i,
                "ROM bank {i} should be selected"
            );
        }
    }

    #[test]
    fn test_ram_banking() {
        let mut ctrl = make_controller(0x00, 0x03);

        // Switch to RAM banking mode and enable RAM
        ctrl.write(BANKING_MODE_SELECT_BEGIN, 1);
        ctrl.write(RAM_ENABLE_BEGIN, 0x0A);

        for i in 0u8..4 {
            ctrl.write(RAM_BANK_NUMBER_BEGIN, i);
            assert_eq!(ctrl.ram_bank, i);
            assert_eq!(ctrl.read(CRAM_BANK_BEGIN), 0, "RAM should be initialized to 0");
            ctrl.write(CRAM_BANK_BEGIN, i + 1);
            assert_eq!(ctrl.read(CRAM_BANK_BEGIN), i + 1);
        }

        // Assert the written values are still there when switching banks again
        for i in 0u8..4 {
            ctrl.write(RAM_BANK_NUMBER_BEGIN, i);
            assert_eq!(ctrl.read(CRAM_BANK_BEGIN), i + 1);
        }

        // Switching back to ROM banking mode resets the RAM bank to 0
        ctrl.write(RAM_BANK_NUMBER_BEGIN, 3);
        ctrl.write(BANKING_MODE_SELECT_BEGIN, 0);
        assert_eq!(ctrl.ram_bank, 0);
        assert_eq!(ctrl.read(CRAM_BANK_BEGIN), 1);
    }

    #[test]
    fn test_rom_writes_do_not_modify_rom() {
        let mut ctrl = make_controller(0x01, 0x02);
        ctrl.write(0x1234, 0xAA);
        ctrl.write(0x7FFF, 0xBB);
        assert_eq!(ctrl.read(0x1234), 0, "ROM should be unchanged");
        assert_eq!(ctrl.read(0x7FFF), 1, "ROM should be unchanged");
    }
}
