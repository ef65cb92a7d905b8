use crate::gb::bus::{InterruptRegister, MainBus};
use crate::gb::cartridge::Cartridge;
use crate::gb::cpu::CPU;
use crate::gb::joypad::JoypadInput;
use crate::gb::ppu::buffer::FrameBuffer;
use crate::gb::ppu::display::Display;
use std::error;
use std::sync::mpsc::{Receiver, Sender};

pub mod bus;
pub mod cartridge;
pub mod constants;
pub mod cpu;
pub mod interrupt;
pub mod joypad;
pub mod ppu;
#[cfg(test)]
pub mod tests;
pub mod timer;
mod utils;

pub const SCREEN_WIDTH: u8 = 160;
pub const SCREEN_HEIGHT: u8 = 144;

// TODO: the exact refresh rate is 59.7
pub const DISPLAY_REFRESH_RATE: f64 = 60.0;

/// T-cycles per frame, the master clock rate divided by the refresh rate.
pub const CYCLES_PER_FRAME: u32 = 70_224;

pub type GBResult<T> = Result<T, GBError>;
pub type GBError = Box<dyn error::Error>;

/// This trait defines a common memory interface for all
/// subsystems of the emulator.
pub trait AddressSpace {
    /// Writes a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Reads a byte from the given address.
    fn read(&mut self, address: u16) -> u8;
}

/// This trait defines the interrupt plumbing the CPU needs
/// on top of plain memory access.
pub trait Bus: AddressSpace {
    /// Indicates whether an interrupt is pending.
    fn has_irq(&self) -> bool;

    fn set_ie(&mut self, r: InterruptRegister);
    fn get_ie(&self) -> InterruptRegister;
    fn set_if(&mut self, r: InterruptRegister);
    fn get_if(&self) -> InterruptRegister;
}

/// The messages sent from the emulator to the frontend.
pub enum EmulatorMessage {
    Frame(FrameBuffer),
}

/// The messages sent from the frontend to the emulator.
pub enum FrontendMessage {
    Stop,
    Input(JoypadInput),
}

/// Holds and manages the state of the whole emulator backend.
pub struct Emulator {
    cpu: CPU,
    bus: MainBus,
    display: Display,
    receiver: Receiver<FrontendMessage>,
    is_running: bool,
}

impl Emulator {
    /// Creates a new `Emulator` instance with the CPU in its
    /// post boot state.
    pub fn new(
        sender: Sender<EmulatorMessage>,
        receiver: Receiver<FrontendMessage>,
        cartridge: Cartridge,
    ) -> Self {
        let mut cpu = CPU::default();
        cpu.reset();
        Self {
            cpu,
            bus: MainBus::with_cartridge(cartridge),
            display: Display::new(sender),
            receiver,
            is_running: true,
        }
    }

    /// Runs the emulator loop until the frontend asks it to stop.
    pub fn run(&mut self) {
        log::info!("Starting emulation of '{}'", self.bus.cartridge);
        while self.is_running {
            self.run_frame();
        }
    }

    /// Emulates one frame worth of machine steps and hands the finished
    /// framebuffer to the sink. Pending frontend messages are drained
    /// before every step, so input lands between two instructions. A set
    /// stop flag aborts the frame until a button press clears it again.
    fn run_frame(&mut self) {
        let mut cycles = 0u32;
        while cycles < CYCLES_PER_FRAME {
            self.handle_messages();
            if !self.is_running || self.cpu.is_stopped {
                break;
            }
            cycles += u32::from(self.step());
        }
        self.display.send_frame(self.bus.ppu.frame());
    }

    /// Executes one machine step and returns its length in T-cycles:
    /// the CPU commits one instruction, the timer and the PPU advance by
    /// the reported cycles, interrupt dispatch runs last. Interrupts
    /// raised during this step are serviced on the next one.
    fn step(&mut self) -> u16 {
        let mut cycles = self.cpu.step(&mut self.bus);
        self.bus.advance(cycles);
        let irq_cycles = interrupt::handle(&mut self.cpu, &mut self.bus);
        if irq_cycles > 0 {
            self.bus.advance(irq_cycles);
            cycles += irq_cycles;
        }
        cycles
    }

    /// Drains pending frontend messages. Input events are only ever applied
    /// here, before the next CPU step, to keep the step ordering intact.
    fn handle_messages(&mut self) {
        while let Ok(message) = self.receiver.try_recv() {
            match message {
                FrontendMessage::Stop => self.is_running = false,
                FrontendMessage::Input(input) => {
                    // Any press wakes the machine from STOP
                    if input.pressed {
                        self.cpu.is_stopped = false;
                    }
                    self.bus.handle_input(input);
                }
            }
        }
    }
}
