use crate::gb::bus::InterruptRegister;
use crate::gb::constants::*;
use crate::gb::AddressSpace;

/// DIV ticks at a fixed 16384 Hz, independent of the TAC enable bit.
const DIVIDER_PERIOD: u16 = 256;

bitflags! {
    /// Represents the Timer Controller (TAC) at 0xFF07.
    /// The lower two bits select the TIMA frequency, bit 2 enables TIMA.
    #[derive(Copy, Clone, PartialEq, Debug, Default)]
    pub struct TimerControl: u8 {
        const FREQ1  = 0b00000001;
        const FREQ2  = 0b00000010;
        const ENABLE = 0b00000100;
    }
}

impl TimerControl {
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.contains(TimerControl::ENABLE)
    }

    /// Returns the selected input frequency from the lower two bits.
    #[inline]
    pub fn frequency(&self) -> Frequency {
        Frequency::from(self.bits() & 0b11)
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Frequency {
    Hz4096,
    Hz262144,
    Hz65536,
    Hz16384,
}

impl Frequency {
    /// Returns the number of T-cycles between two timer ticks.
    /// This is equal to the master clock rate (4194304 Hz)
    /// divided by the timer frequency.
    pub fn as_cycles(&self) -> u16 {
        match self {
            Frequency::Hz4096 => 1024,
            Frequency::Hz262144 => 16,
            Frequency::Hz65536 => 64,
            Frequency::Hz16384 => 256,
        }
    }
}

impl From<u8> for Frequency {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0b00 => Frequency::Hz4096,
            0b01 => Frequency::Hz262144,
            0b10 => Frequency::Hz65536,
            0b11 => Frequency::Hz16384,
            _ => unreachable!(),
        }
    }
}

/// The timer unit, holding the divider (DIV), the configurable
/// counter (TIMA), its reload value (TMA) and the controller (TAC).
#[derive(Clone)]
pub struct Timer {
    pub divider: u8,
    pub counter: u8,
    pub modulo: u8,
    pub control: TimerControl,
    divider_cycles: u16,
    counter_cycles: i32,
}

impl Default for Timer {
    fn default() -> Self {
        let control = TimerControl::default();
        Self {
            divider: 0,
            counter: 0,
            modulo: 0,
            divider_cycles: 0,
            counter_cycles: i32::from(control.frequency().as_cycles()),
            control,
        }
    }
}

impl Timer {
    /// Advances the timer unit by the given number of T-cycles and requests
    /// the timer interrupt whenever TIMA overflows.
    pub fn step(&mut self, cycles: u16, int_reg: &mut InterruptRegister) {
        self.divider_cycles += cycles;
        while self.divider_cycles >= DIVIDER_PERIOD {
            self.divider_cycles -= DIVIDER_PERIOD;
            self.divider = self.divider.wrapping_add(1);
        }

        if !self.control.is_enabled() {
            return;
        }

        // The period is re-read on every step so that a TAC write
        // takes effect immediately.
        let period = i32::from(self.control.frequency().as_cycles());
        self.counter_cycles -= i32::from(cycles);
        while self.counter_cycles <= 0 {
            self.counter_cycles += period;
            match self.counter.checked_add(1) {
                Some(counter) => self.counter = counter,
                None => {
                    self.counter = self.modulo;
                    int_reg.insert(InterruptRegister::TIMER);
                }
            }
        }
    }
}

impl AddressSpace for Timer {
    fn write(&mut self, address: u16, value: u8) {
        match address {
            // Whenever a ROM tries to write to it, DIV resets to 0
            TIMER_DIVIDER => {
                self.divider = 0;
                self.divider_cycles = 0;
            }
            TIMER_COUNTER => self.counter = value,
            TIMER_MODULO => self.modulo = value,
            // Only the lower 3 bits are R/W
            TIMER_CTRL => {
                let control = TimerControl::from_bits_truncate(value);
                if control.frequency() != self.control.frequency() {
                    self.counter_cycles = i32::from(control.frequency().as_cycles());
                }
                self.control = control;
            }
            _ => panic!("Attempt to write to unmapped timer register: {address:#06x}"),
        }
    }

    fn read(&mut self, address: u16) -> u8 {
        match address {
            TIMER_DIVIDER => self.divider,
            TIMER_COUNTER => self.counter,
            TIMER_MODULO => self.modulo,
            // Undocumented bits should be 1
            TIMER_CTRL => self.control.bits() | 0b1111_1000,
            _ => panic!("Attempt to read from unmapped timer register: {address:#06x}"),
        }
    }
}

/// Cycle units as seen by the instruction interpreter:
/// one machine cycle (M) equals four T-cycles of the master clock.
#[derive(Copy, Clone)]
pub enum Cycles {
    M(u16),
    T(u16),
}

impl Cycles {
    #[inline]
    pub fn ticks(self) -> u16 {
        match self {
            Cycles::M(cycles) => cycles * 4,
            Cycles::T(cycles) => cycles,
        }
    }
}

/// Represents the internal clock of a processing unit, counted in T-cycles.
#[derive(Clone, Default)]
pub struct Clock {
    t_cycles: u16,
}

impl Clock {
    #[inline]
    pub fn advance(&mut self, cycles: Cycles) {
        self.t_cycles = self.t_cycles.wrapping_add(cycles.ticks());
    }

    #[inline]
    pub fn ticks(&self) -> u16 {
        self.t_cycles
    }

    #[inline]
    pub fn reset(&mut self) {
        self.t_cycles = 0;
    }
}
