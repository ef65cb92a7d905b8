use crate::gb::cartridge::controller::{
    BankController, RAM_ENABLE_BEGIN, RAM_ENABLE_END, ROM_BANK_NUMBER_BEGIN, ROM_BANK_NUMBER_END,
};
use crate::gb::cartridge::{rom_bank_mask, CartridgeConfig, ROM_BANK_SIZE};
use crate::gb::constants::*;
use crate::gb::utils::bit_at;
use std::sync::Arc;

/// MBC2 has a built-in RAM of 512 half-bytes, so only the
/// lower nibble of each stored value is significant.
const MBC2_RAM_SIZE: usize = 512;

/// MBC2 supports up to 16 ROM banks selected through a single 4-bit
/// register and carries its own 512x4 bit RAM. The RAM enable command is
/// only accepted when bit 4 of the written address is clear.
#[derive(Clone)]
pub struct MBC2 {
    config: CartridgeConfig,
    rom: Arc<[u8]>,
    ram: Vec<u8>,
    rom_bank: u8, // currently selected ROM bank, 1..=15, never 0
    ram_enabled: bool,
}

impl MBC2 {
    pub fn new(config: CartridgeConfig, rom: Arc<[u8]>) -> Self {
        Self {
            ram: vec![0; MBC2_RAM_SIZE],
            rom_bank: 1,
            ram_enabled: false,
            rom,
            config,
        }
    }
}

impl BankController for MBC2 {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            ROM_LOW_BANK_BEGIN..=ROM_LOW_BANK_END => self.rom[usize::from(address)],
            ROM_HIGH_BANK_BEGIN..=ROM_HIGH_BANK_END => {
                let bank = usize::from(self.rom_bank & rom_bank_mask(self.config.rom_banks));
                self.rom[bank * ROM_BANK_SIZE + usize::from(address - ROM_HIGH_BANK_BEGIN)]
            }
            CRAM_BANK_BEGIN..=CRAM_BANK_END => match self.ram_enabled {
                // Only the lower nibble of each RAM cell is backed by memory
                true => self
                    .ram
                    .get(usize::from(address - CRAM_BANK_BEGIN))
                    .map(|nibble| nibble | 0xF0)
                    .unwrap_or(UNDEFINED_READ),
                false => UNDEFINED_READ,
            },
            _ => panic!("MBC2: Invalid address for read: {address:#06x}"),
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            RAM_ENABLE_BEGIN..=RAM_ENABLE_END => {
                // The enable command requires bit 4 of the address to be clear
                if !bit_at((address >> 4) as u8, 0) {
                    self.ram_enabled = value & 0b1111 == 0b1010;
                }
            }
            ROM_BANK_NUMBER_BEGIN..=ROM_BANK_NUMBER_END => {
                self.rom_bank = match value & 0b1111 {
                    0 => 1,
                    n => n,
                };
            }
            CRAM_BANK_BEGIN..=CRAM_BANK_END => {
                if self.ram_enabled {
                    let offset = usize::from(address - CRAM_BANK_BEGIN);
                    if let Some(nibble) = self.ram.get_mut(offset) {
                        *nibble = value & 0b1111;
                    }
                }
            }
            _ => {}
        }
    }
}
