
use crate::gb::bus::{InterruptRegister, MainBus};
use crate::gb::cartridge::Cartridge;
use crate::gb::constants::*;
use crate::gb::cpu::CPU;
use crate::gb::utils::{bit_at, half_carry_u8, set_bit};
use crate::gb::{interrupt, AddressSpace, Bus};
use std::sync::Arc;

/// Represents a mock bus backed by one flat array, with just enough
/// interrupt plumbing for the CPU and the dispatcher.
pub struct MockBus {
    pub data: Vec<u8>,
    interrupt_enable: InterruptRegister,
    interrupt_flag: InterruptRegister,
}

impl MockBus {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            interrupt_enable: InterruptRegister::empty(),
            interrupt_flag: InterruptRegister::empty(),
            data,
        }
    }
}

impl AddressSpace for MockBus {
    fn write(&mut self, address: u16, value: u8) {
        self.data[address as usize] = value;
    }

    fn read(&mut self, address: u16) -> u8 {
        self.data[address as usize]
    }
}

impl Bus for MockBus {
    fn has_irq(&self) -> bool {
        let enabled = self.interrupt_enable.bits() & 0b0001_1111;
        let flag = self.interrupt_flag.bits() & 0b0001_1111;
        enabled & flag != 0
    }

    fn set_ie(&mut self, r: InterruptRegister) {
        self.interrupt_enable = r;
    }

    fn get_ie(&self) -> InterruptRegister {
        self.interrupt_enable
    }

    fn set_if(&mut self, r: InterruptRegister) {
        self.interrupt_flag = r;
    }

    fn get_if(&self) -> InterruptRegister {
        self.interrupt_flag
    }
}

/// Returns an empty 32 KiB cartridge image without a bank controller.
pub fn make_rom() -> Vec<u8> {
    vec![0u8; 0x8000]
}

pub fn make_cartridge(rom: Vec<u8>) -> Cartridge {
    Cartridge::try_from(Arc::from(rom.into_boxed_slice())).unwrap()
}

/// One machine step in driver order: the CPU commits one instruction,
/// the timer and the PPU advance by the reported cycles, interrupt
/// dispatch runs last.
pub fn machine_step(cpu: &mut CPU, bus: &mut MainBus) -> u16 {
    let cycles = cpu.step(bus);
    bus.advance(cycles);
    cycles + interrupt::handle(cpu, bus)
}

#[test]
fn test_cold_reset() {
    // An empty cartridge executes NOPs from the entry point
    let mut bus = MainBus::with_cartridge(make_cartridge(make_rom()));
    let mut cpu = CPU::default();
    cpu.reset();

    let cycles = machine_step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0101);
    assert_eq!(cycles, 4);
    assert_eq!(cpu.r.get_af(), 0x01B0);
    assert_eq!(cpu.r.get_bc(), 0x0013);
    assert_eq!(cpu.r.get_de(), 0x00D8);
    assert_eq!(cpu.r.get_hl(), 0x014D);
    assert_eq!(cpu.sp, 0xFFFE);
}

#[test]
fn test_jp_from_entry_point() {
    let mut rom = make_rom();
    rom[0x0100] = 0xC3;
    rom[0x0101] = 0x50;
    rom[0x0102] = 0x01;
    let mut bus = MainBus::with_cartridge(make_cartridge(rom));
    let mut cpu = CPU::default();
    cpu.reset();

    machine_step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0150);
}

#[test]
fn test_call_and_ret() {
    let mut rom = make_rom();
    rom[0x0100] = 0xCD; // CALL 0x1234
    rom[0x0101] = 0x34;
    rom[0x0102] = 0x12;
    rom[0x1234] = 0xC9; // RET
    let mut bus = MainBus::with_cartridge(make_cartridge(rom));
    let mut cpu = CPU::default();
    cpu.reset();

    machine_step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x1234);
    assert_eq!(cpu.sp, 0xFFFC);
    assert_eq!(
        bus.read(0xFFFC),
        0x03,
        "The return address is stored little-endian"
    );
    assert_eq!(bus.read(0xFFFD), 0x01);

    machine_step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0103);
    assert_eq!(cpu.sp, 0xFFFE);
}

#[test]
fn test_div_write_resets() {
    let mut bus = MainBus::with_cartridge(make_cartridge(make_rom()));
    bus.advance(512);
    assert_eq!(bus.read(TIMER_DIVIDER), 2);

    bus.write(TIMER_DIVIDER, 0x55);
    assert_eq!(bus.read(TIMER_DIVIDER), 0, "Any write resets DIV");
}

#[test]
fn test_ly_write_resets() {
    let mut bus = MainBus::with_cartridge(make_cartridge(make_rom()));
    bus.advance(456);
    assert_eq!(bus.read(PPU_LY), 1);

    bus.write(PPU_LY, 0x55);
    assert_eq!(bus.read(PPU_LY), 0, "Any write resets LY");
}

#[test]
fn test_echo_ram_mirrors_wram() {
    let mut bus = MainBus::with_cartridge(make_cartridge(make_rom()));
    bus.write(0xC123, 0x42);
    assert_eq!(bus.read(0xE123), 0x42);

    bus.write(0xE456, 0x99);
    assert_eq!(bus.read(0xC456), 0x99);
}

#[test]
fn test_unusable_region() {
    let mut bus = MainBus::with_cartridge(make_cartridge(make_rom()));
    bus.write(0xFEA0, 0x42);
    assert_eq!(bus.read(0xFEA0), UNDEFINED_READ, "Writes should be dropped");
    assert_eq!(bus.read(0xFEFF), UNDEFINED_READ);
}

#[test]
fn test_rom_region_writes_do_not_modify_memory() {
    let mut rom = make_rom();
    rom[0x0123] = 0x42;
    let mut bus = MainBus::with_cartridge(make_cartridge(rom));

    bus.write(0x0123, 0x99);
    assert_eq!(bus.read(0x0123), 0x42, "The cartridge byte is unchanged");
}

#[test]
fn test_oam_dma_transfer() {
    let mut bus = MainBus::with_cartridge(make_cartridge(make_rom()));
    for offset in 0..0xA0u16 {
        bus.write(0xC100 + offset, offset as u8);
    }

    bus.write(PPU_DMA, 0xC1);
    for offset in 0..0xA0u16 {
        assert_eq!(bus.read(OAM_BEGIN + offset), offset as u8);
    }
    assert_eq!(bus.read(PPU_DMA), 0xC1, "The source page is readable back");
}

#[test]
fn test_mbc1_bank_switch_through_bus() {
    // 16 banks, each filled with its own index
    let mut rom: Vec<u8> = (0u8..16).flat_map(|i| vec![i; 0x4000]).collect();
    rom[0x0147] = 0x01; // MBC1
    rom[0x0148] = 0x03;
    let mut bus = MainBus::with_cartridge(make_cartridge(rom));

    bus.write(0x2100, 0x05);
    assert_eq!(bus.read(0x4000), 5, "Bank 5 should be mapped");

    bus.write(0x2100, 0x00);
    assert_eq!(bus.read(0x4000), 1, "Bank 0 selects are forced to bank 1");
}

#[test]
fn test_interrupt_flag_read_undocumented_bits() {
    let mut bus = MainBus::with_cartridge(make_cartridge(make_rom()));
    bus.set_if(InterruptRegister::VBLANK);
    assert_eq!(bus.read(INTERRUPT_FLAG), 0b1110_0001);

    bus.write(INTERRUPT_FLAG, 0xFF);
    assert_eq!(bus.get_if(), InterruptRegister::all());
}

#[test]
fn test_bit_at() {
    let x = 0b11110000u8;
    assert!(!bit_at(x, 3));
    assert!(bit_at(x, 4));
}

#[test]
fn test_set_bit() {
    let x = 0b11110000u8;
    assert_eq!(set_bit(x, 0, true), 0b11110001u8);
    assert_eq!(set_bit(x, 1, true), 0b11110010u8);
    assert_eq!(set_bit(x, 0, false), 0b11110000u8);
    assert_eq!(set_bit(x, 7, false), 0b01110000u8);
}

#[test]
fn test_half_carry_u8_true() {
    assert!(half_carry_u8(62, 34));
}

#[test]
fn test_half_carry_u8_false() {
    assert!(!half_carry_u8(34, 34));
}
