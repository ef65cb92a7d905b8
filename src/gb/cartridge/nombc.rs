use crate::gb::cartridge::controller::BankController;
use crate::gb::cartridge::CartridgeConfig;
use crate::gb::constants::*;
use std::sync::Arc;

/// Cartridges without a bank controller map their ROM directly into
/// 0x0000-0x7FFF. A few of them still carry a single external RAM bank.
#[derive(Clone)]
pub struct NoMBC {
    rom: Arc<[u8]>,
    ram: Vec<u8>,
}

impl NoMBC {
    pub fn new(config: CartridgeConfig, rom: Arc<[u8]>) -> Self {
        Self {
            ram: vec![0; config.ram_size()],
            rom,
        }
    }
}

impl BankController for NoMBC {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            ROM_LOW_BANK_BEGIN..=ROM_HIGH_BANK_END => self
                .rom
                .get(usize::from(address))
                .copied()
                .unwrap_or(UNDEFINED_READ),
            CRAM_BANK_BEGIN..=CRAM_BANK_END => self
                .ram
                .get(usize::from(address - CRAM_BANK_BEGIN))
                .copied()
                .unwrap_or(UNDEFINED_READ),
            _ => panic!("NoMBC: Invalid address for read: {address:#06x}"),
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            // There is no bank controller to talk to, ROM stays read-only
            ROM_LOW_BANK_BEGIN..=ROM_HIGH_BANK_END => {}
            CRAM_BANK_BEGIN..=CRAM_BANK_END => {
                let offset = usize::from(address - CRAM_BANK_BEGIN);
                if let Some(byte) = self.ram.get_mut(offset) {
                    *byte = value;
                }
            }
            _ => {}
        }
    }
}
