use crate::gb::cartridge::mbc1::MBC1;
use crate::gb::cartridge::mbc2::MBC2;
use crate::gb::cartridge::nombc::NoMBC;
use crate::gb::cartridge::{CartridgeConfig, ControllerType};
use dyn_clone::DynClone;
use std::sync::Arc;

/// Before external RAM can be read or written, it must be enabled by
/// writing a value with 0x0A in the lower 4 bits to this address space.
/// Any other value disables the RAM attached to the MBC.
pub const RAM_ENABLE_BEGIN: u16 = 0x0000;
pub const RAM_ENABLE_END: u16 = 0x1FFF;

/// Writing here selects the ROM bank number for the 0x4000-0x7FFF region.
/// A resulting bank number of 0 always behaves as if it were 1.
pub const ROM_BANK_NUMBER_BEGIN: u16 = 0x2000;
pub const ROM_BANK_NUMBER_END: u16 = 0x3FFF;

/// On MBC1 this 2-bit register selects a RAM bank in range 0x00-0x03,
/// or the upper two bits (5-6) of the ROM bank number, depending on the
/// current banking mode.
pub const RAM_BANK_NUMBER_BEGIN: u16 = 0x4000;
pub const RAM_BANK_NUMBER_END: u16 = 0x5FFF;

/// On MBC1 this 1-bit register switches between ROM and RAM banking mode,
/// controlling the behaviour of the secondary 2-bit register above.
pub const BANKING_MODE_SELECT_BEGIN: u16 = 0x6000;
pub const BANKING_MODE_SELECT_END: u16 = 0x7FFF;

/// This trait defines the interface for a bank controller.
/// It allows reading and writing to different banks of the cartridge.
pub trait BankController: DynClone + Send {
    fn read(&mut self, address: u16) -> u8;

    fn write(&mut self, address: u16, value: u8);
}

dyn_clone::clone_trait_object!(BankController);

/// Creates a new `BankController` with the given ROM and `CartridgeConfig`.
pub fn new(config: CartridgeConfig, rom: Arc<[u8]>) -> Box<dyn BankController> {
    match config.controller {
        ControllerType::NoMBC => Box::new(NoMBC::new(config, rom)),
        ControllerType::MBC1 => Box::new(MBC1::new(config, rom)),
        ControllerType::MBC2 => Box::new(MBC2::new(config, rom)),
    }
}
