use crate::gb::bus::InterruptRegister;
use crate::gb::utils::{bit_at, set_bit};

/// The eight physical buttons with their bit position in the
/// internal button state. The lower four bits are the directional
/// pad, the upper four bits are the action buttons.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Button {
    Right = 0,
    Left = 1,
    Up = 2,
    Down = 3,
    A = 4,
    B = 5,
    Select = 6,
    Start = 7,
}

impl Button {
    /// Returns true for A, B, SELECT and START.
    #[inline]
    pub const fn is_action(self) -> bool {
        self as u8 >= 4
    }
}

/// A single input event as sent from the frontend.
#[derive(Copy, Clone, Debug)]
pub struct JoypadInput {
    pub button: Button,
    pub pressed: bool,
}

/// Represents the Joypad at register 0xFF00.
/// The eight buttons are arranged as a 2x4 matrix: the program selects
/// either the action or the direction row by writing to bits 4-5, then
/// reads the selected row from bits 0-3. Rather unconventionally for
/// the Game Boy, a pressed button reads as 0, not 1.
#[derive(Copy, Clone, Debug)]
pub struct Joypad {
    /// Live button matrix, one bit per `Button`, 1 = released.
    state: u8,
    /// The stored row selector, only bits 4-5 of 0xFF00 are writable.
    select: u8,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            state: 0xFF,
            select: 0b0011_0000,
        }
    }
}

impl Joypad {
    /// Applies an input event and requests the joypad interrupt when a
    /// button of the currently selected row goes from released to pressed.
    pub fn handle_input(&mut self, input: JoypadInput, int_reg: &mut InterruptRegister) {
        match input.pressed {
            true => self.press(input.button, int_reg),
            false => self.release(input.button),
        }
    }

    fn press(&mut self, button: Button, int_reg: &mut InterruptRegister) {
        let bit = button as u8;
        let was_released = bit_at(self.state, bit);
        self.state = set_bit(self.state, bit, false);

        // The selector bits are active low.
        let selected = match button.is_action() {
            true => !bit_at(self.select, 5),
            false => !bit_at(self.select, 4),
        };
        if was_released && selected {
            int_reg.insert(InterruptRegister::JOYPAD);
        }
    }

    #[inline]
    fn release(&mut self, button: Button) {
        self.state = set_bit(self.state, button as u8, true);
    }

    /// Writes the row selector, the rest of the register is read-only.
    #[inline]
    pub fn write(&mut self, value: u8) {
        self.select = value & 0b0011_0000;
    }

    /// Synthesizes the register value from the stored selector and the
    /// button matrix. Unused bits 6-7 always read as 1.
    pub fn read(&self) -> u8 {
        let mut value = 0b1100_1111 | self.select;
        if !bit_at(self.select, 4) {
            value &= 0b1111_0000 | (self.state & 0b0000_1111);
        }
        if !bit_at(self.select, 5) {
            value &= 0b1111_0000 | (self.state >> 4);
        }
        value
    }
}
