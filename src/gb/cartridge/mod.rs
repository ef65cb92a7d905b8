use crate::gb::cartridge::controller::BankController;
use crate::gb::{AddressSpace, GBError, GBResult};
use std::path::Path;
use std::sync::Arc;
use std::{fmt, fs};

pub mod controller;
mod mbc1;
mod mbc2;
mod nombc;

/// This area of memory contains the cartridge title
const CARTRIDGE_TITLE_BEGIN: u16 = 0x0134;
const CARTRIDGE_TITLE_END: u16 = 0x0142;

/// This address contains the cartridge type and what kind of hardware is present
/// 0x00 => ROM Only
/// 0x01 => MBC1
/// 0x02 => MBC1 + RAM
/// 0x03 => MBC1 + RAM + Battery
/// 0x05 => MBC2
/// 0x06 => MBC2 + Battery
/// See https://gbdev.io/pandocs/The_Cartridge_Header.html#0147--cartridge-type
const CARTRIDGE_TYPE: u16 = 0x0147;

/// This byte indicates how much ROM is present on the cartridge.
/// In most cases, the ROM size is given by 32KiB * (1 << value).
const CARTRIDGE_ROM_SIZE: u16 = 0x0148;

/// This byte indicates how much RAM is present on the cartridge.
const CARTRIDGE_RAM_SIZE: u16 = 0x0149;

/// These bytes contain a 16-bit (big-endian) checksum simply computed as the
/// sum of all the bytes of the cartridge ROM (except these two checksum bytes).
const CARTRIDGE_GLOBAL_CHECKSUM1: u16 = 0x014E;
const CARTRIDGE_GLOBAL_CHECKSUM2: u16 = 0x014F;

pub const ROM_BANK_SIZE: usize = 16384;
pub const RAM_BANK_SIZE: usize = 8192;

/// The smallest valid cartridge image holds the two fixed ROM banks.
const MIN_CARTRIDGE_SIZE: usize = ROM_BANK_SIZE * 2;

/// The bank controller type of the cartridge.
/// See https://gbdev.io/pandocs/The_Cartridge_Header.html#0147--cartridge-type
#[derive(PartialEq, Copy, Clone, Debug)]
pub enum ControllerType {
    NoMBC,
    MBC1,
    MBC2,
}

impl TryFrom<u8> for ControllerType {
    type Error = GBError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let mode = match value {
            0x00 | 0x08 | 0x09 => ControllerType::NoMBC,
            0x01..=0x03 => ControllerType::MBC1,
            0x05 | 0x06 => ControllerType::MBC2,
            _ => return Err(format!("Cartridge type {value:#04x} is not supported").into()),
        };
        Ok(mode)
    }
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerType::NoMBC => "NoMBC",
            ControllerType::MBC1 => "MBC1",
            ControllerType::MBC2 => "MBC2",
        };
        write!(f, "{name}")
    }
}

/// Contains the configuration of the cartridge: the controller type
/// and the number of ROM and RAM banks.
#[derive(Copy, Clone, Debug)]
pub struct CartridgeConfig {
    pub controller: ControllerType,
    pub rom_banks: u16,
    pub ram_banks: u16,
}

impl CartridgeConfig {
    pub fn new(controller: ControllerType, rom_size: u8, ram_size: u8) -> GBResult<Self> {
        let ram_banks = match ram_size {
            0x00 | 0x01 => 0,
            0x02 => 1,
            0x03 => 4,
            value => return Err(format!("Unsupported RAM size: {value:#04x}").into()),
        };

        // This can be expressed as 2^(value + 1)
        let rom_banks = match rom_size {
            0x00 => 2,
            0x01 => 4,
            0x02 => 8,
            0x03 => 16,
            0x04 => 32,
            0x05 => 64,
            0x06 => 128,
            value => return Err(format!("Unsupported ROM size: {value:#04x}").into()),
        };

        Ok(Self {
            controller,
            rom_banks,
            ram_banks,
        })
    }

    #[inline(always)]
    pub const fn ram_size(&self) -> usize {
        self.ram_banks as usize * RAM_BANK_SIZE
    }
}

/// Contains the cartridge header information.
/// See https://gbdev.io/pandocs/The_Cartridge_Header.html
#[derive(Clone)]
pub struct CartridgeHeader {
    pub title: String,
    pub config: CartridgeConfig,
}

impl TryFrom<&[u8]> for CartridgeHeader {
    type Error = GBError;
    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        let controller = ControllerType::try_from(buf[CARTRIDGE_TYPE as usize])?;
        let config = CartridgeConfig::new(
            controller,
            buf[CARTRIDGE_ROM_SIZE as usize],
            buf[CARTRIDGE_RAM_SIZE as usize],
        )?;
        let title = CartridgeHeader::parse_title(buf);
        Ok(Self { title, config })
    }
}

impl CartridgeHeader {
    /// Returns the cartridge title from the cartridge header.
    fn parse_title(buf: &[u8]) -> String {
        let title = buf[CARTRIDGE_TITLE_BEGIN as usize..=CARTRIDGE_TITLE_END as usize]
            .iter()
            .filter_map(|b| b.is_ascii_alphanumeric().then_some(char::from(*b)))
            .collect::<String>();
        match title.is_empty() {
            true => "Unnamed".to_string(),
            false => title,
        }
    }
}

impl fmt::Display for CartridgeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.config.controller)
    }
}

/// Holds all relevant cartridge data.
#[derive(Clone)]
pub struct Cartridge {
    pub header: CartridgeHeader,
    controller: Box<dyn BankController>,
}

impl TryFrom<Arc<[u8]>> for Cartridge {
    type Error = GBError;

    fn try_from(rom: Arc<[u8]>) -> Result<Self, Self::Error> {
        if rom.len() < MIN_CARTRIDGE_SIZE {
            return Err(format!(
                "Cartridge image is too small: {} bytes, expected at least {MIN_CARTRIDGE_SIZE}",
                rom.len()
            )
            .into());
        }
        if rom.len() % ROM_BANK_SIZE != 0 {
            return Err("Cartridge image size is not a multiple of 16 KiB".into());
        }
        if let Err(msg) = verify_checksum(rom.as_ref()) {
            log::warn!("{msg}");
        }
        let header = CartridgeHeader::try_from(rom.as_ref())?;
        let controller = controller::new(header.config, rom);
        Ok(Self { controller, header })
    }
}

impl TryFrom<&Path> for Cartridge {
    type Error = GBError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let rom = fs::read(path)?;
        Cartridge::try_from(Arc::from(rom.into_boxed_slice()))
    }
}

impl fmt::Display for Cartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)
    }
}

impl AddressSpace for Cartridge {
    #[inline]
    fn write(&mut self, address: u16, value: u8) {
        self.controller.write(address, value);
    }

    #[inline]
    fn read(&mut self, address: u16) -> u8 {
        self.controller.read(address)
    }
}

/// Validates the global checksum of the given buffer containing the whole cartridge.
fn verify_checksum(buf: &[u8]) -> GBResult<()> {
    let byte1 = buf[CARTRIDGE_GLOBAL_CHECKSUM1 as usize];
    let byte2 = buf[CARTRIDGE_GLOBAL_CHECKSUM2 as usize];
    let checksum = u16::from(byte1) << 8 | u16::from(byte2);
    let calculated_checksum = calculate_global_checksum(buf);

    if checksum == calculated_checksum {
        return Ok(());
    }

    let msg = format!(
        "Global checksum mismatch! Expected: {calculated_checksum:#06x} Got: {checksum:#06x}"
    );
    Err(msg.into())
}

/// Calculates the global checksum by adding all bytes from the given cartridge
/// buffer except the two checksum bytes.
fn calculate_global_checksum(buf: &[u8]) -> u16 {
    buf.iter()
        .enumerate()
        .fold(0, |sum, (address, &byte)| match address as u16 {
            CARTRIDGE_GLOBAL_CHECKSUM1 => sum,
            CARTRIDGE_GLOBAL_CHECKSUM2 => sum,
            _ => sum.wrapping_add(byte as u16),
        })
}

/// Masks a selected ROM bank number to the number of banks in the cartridge,
/// so out of range bank selects mirror instead of reading past the image.
/// The header only encodes power of two bank counts.
#[inline]
const fn rom_bank_mask(rom_banks: u16) -> u8 {
    (rom_banks - 1) as u8
}
