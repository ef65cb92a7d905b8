pub mod buffer;
pub mod display;
pub mod misc;
pub mod registers;
#[cfg(test)]
mod tests;

use crate::gb::bus::InterruptRegister;
use crate::gb::constants::*;
use crate::gb::ppu::buffer::FrameBuffer;
use crate::gb::ppu::misc::{Pixel, SpriteAttributes};
use crate::gb::ppu::registers::{LCDControl, LCDMode, LCDState, Registers};
use crate::gb::utils::bit_at;
use crate::gb::{AddressSpace, SCREEN_HEIGHT, SCREEN_WIDTH};

/// A full scanline takes 456 T-cycles.
const SCANLINE_CYCLES: i32 = 456;

/// The OAM scan occupies the first 80 cycles of a scanline,
/// the pixel transfer the following 172.
const OAM_SEARCH_BOUND: i32 = SCANLINE_CYCLES - 80;
const PIXEL_TRANSFER_BOUND: i32 = OAM_SEARCH_BOUND - 172;

/// The last V-Blank scanline.
const SCANLINE_MAX: u8 = 153;

/// Pixel Processing Unit: owns the video RAM, the sprite attribute table
/// and the framebuffer, and rasterises one scanline at a time.
pub struct PPU {
    pub r: Registers,
    vram: [u8; VRAM_SIZE],
    oam: [u8; OAM_SIZE],
    scanline_counter: i32,
    buffer: FrameBuffer,
}

impl Default for PPU {
    fn default() -> Self {
        Self {
            r: Registers::default(),
            vram: [0u8; VRAM_SIZE],
            oam: [0u8; OAM_SIZE],
            scanline_counter: SCANLINE_CYCLES,
            buffer: FrameBuffer::default(),
        }
    }
}

impl PPU {
    /// Advances the PPU by the given number of T-cycles. The mode bits,
    /// their interrupts and the coincidence flag are derived from the
    /// advanced position, within the same step.
    pub fn step(&mut self, cycles: u16, int_reg: &mut InterruptRegister) {
        if !self.r.lcd_control.contains(LCDControl::LCD_EN) {
            // Screen is off: hold the counters in their reset state
            self.scanline_counter = SCANLINE_CYCLES;
            self.r.ly = 0;
            self.r.lcd_stat.set_lcd_mode(LCDMode::VBlank);
            return;
        }

        self.scanline_counter -= i32::from(cycles);
        if self.scanline_counter <= 0 {
            self.scanline_counter = SCANLINE_CYCLES;
            self.advance_scanline(int_reg);
        }
        self.update_lcd_status(int_reg);
    }

    /// Returns the current screen contents.
    #[inline]
    pub fn frame(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Updates the mode bits in STAT from the position within the current
    /// scanline, requesting the STAT interrupt on a mode entry that has its
    /// enable bit set, and maintains the LY == LYC coincidence flag.
    fn update_lcd_status(&mut self, int_reg: &mut InterruptRegister) {
        let current_mode = self.r.lcd_stat.get_lcd_mode();
        let (mode, irq_enabled) = if self.r.ly >= SCREEN_HEIGHT {
            (
                LCDMode::VBlank,
                self.r.lcd_stat.contains(LCDState::V_BLANK_INT),
            )
        } else if self.scanline_counter >= OAM_SEARCH_BOUND {
            (
                LCDMode::OAMSearch,
                self.r.lcd_stat.contains(LCDState::OAM_INT),
            )
        } else if self.scanline_counter >= PIXEL_TRANSFER_BOUND {
            // Mode 3 never raises the STAT interrupt
            (LCDMode::PixelTransfer, false)
        } else {
            (
                LCDMode::HBlank,
                self.r.lcd_stat.contains(LCDState::H_BLANK_INT),
            )
        };

        self.r.lcd_stat.set_lcd_mode(mode);
        if mode != current_mode && irq_enabled {
            int_reg.insert(InterruptRegister::STAT);
        }
        self.handle_coincidence_flag(int_reg);
    }

    /// Handles the coincidence flag, set whenever LY matches LYC.
    fn handle_coincidence_flag(&mut self, int_reg: &mut InterruptRegister) {
        if self.r.ly != self.r.lyc {
            self.r.lcd_stat.remove(LCDState::LYC_STAT);
            return;
        }
        self.r.lcd_stat.insert(LCDState::LYC_STAT);
        if self.r.lcd_stat.contains(LCDState::LY_INT) {
            int_reg.insert(InterruptRegister::STAT);
        }
    }

    /// Moves on to the next scanline: visible lines are rendered,
    /// entering line 144 requests the V-Blank interrupt and the counter
    /// wraps back to line 0 after the last V-Blank line.
    fn advance_scanline(&mut self, int_reg: &mut InterruptRegister) {
        self.r.ly += 1;
        if self.r.ly < SCREEN_HEIGHT {
            self.draw_line();
        } else if self.r.ly == SCREEN_HEIGHT {
            int_reg.insert(InterruptRegister::VBLANK);
        } else if self.r.ly > SCANLINE_MAX {
            self.r.ly = 0;
        }
    }

    /// Draws the current scanline into the framebuffer.
    fn draw_line(&mut self) {
        if self.r.lcd_control.contains(LCDControl::BG_EN) {
            self.draw_tiles();
        }
        if self.r.lcd_control.contains(LCDControl::OBJ_EN) {
            self.draw_sprites();
        }
    }

    #[inline]
    fn read_vram(&self, address: u16) -> u8 {
        self.vram[usize::from(address - VRAM_BEGIN)]
    }

    /// Draws the background and window layer of the current scanline.
    fn draw_tiles(&mut self) {
        let ly = self.r.ly;
        let window_x = self.r.wx.wrapping_sub(7);
        let unsigned_tiles = self.r.lcd_control.contains(LCDControl::TILE_SEL);

        // The window is active on this scanline once its top row is reached
        let window_active = self.r.lcd_control.contains(LCDControl::WIN_EN) && self.r.wy <= ly;

        for x in 0..SCREEN_WIDTH {
            let in_window = window_active && x >= window_x;

            // Source coordinates in the 256x256 background space
            let (bx, by) = match in_window {
                true => (x.wrapping_sub(window_x), ly - self.r.wy),
                false => (
                    self.r.scx.wrapping_add(x),
                    self.r.scy.wrapping_add(ly),
                ),
            };

            let map_select = match in_window {
                true => LCDControl::WIN_MAP,
                false => LCDControl::BG_MAP,
            };
            let map_base: u16 = match self.r.lcd_control.contains(map_select) {
                true => 0x9C00,
                false => 0x9800,
            };

            let tile_id = self.read_vram(map_base + u16::from(by / 8) * 32 + u16::from(bx / 8));
            // With TILE_SEL clear the tile data is addressed with signed
            // indices so that tile 0 lives at 0x9000.
            let tile_location = match unsigned_tiles {
                true => 0x8000 + u16::from(tile_id) * 16,
                false => (0x9000 + i32::from(tile_id as i8) * 16) as u16,
            };

            let line = u16::from(by % 8) * 2;
            let data1 = self.read_vram(tile_location + line);
            let data2 = self.read_vram(tile_location + line + 1);

            let colour_bit = 7 - (bx % 8);
            let pixel = Pixel::from(
                (bit_at(data2, colour_bit) as u8) << 1 | bit_at(data1, colour_bit) as u8,
            );
            let shade = self.r.bg_palette.colorize(pixel);
            self.buffer.write_pixel(x, ly, shade.rgb());
        }
    }

    /// Draws the sprite layer of the current scanline. All 40 OAM entries
    /// are scanned; colour 0 is transparent.
    fn draw_sprites(&mut self) {
        let ly = self.r.ly;
        let height: u8 = match self.r.lcd_control.contains(LCDControl::OBJ_SIZE) {
            true => 16,
            false => 8,
        };

        for sprite in 0..OAM_SIZE / 4 {
            let entry = sprite * 4;
            let y_pos = self.oam[entry].wrapping_sub(16);
            let x_pos = self.oam[entry + 1].wrapping_sub(8);
            let tile_index = self.oam[entry + 2];
            let attributes = SpriteAttributes::from_bits_truncate(self.oam[entry + 3]);

            if ly.wrapping_sub(y_pos) >= height {
                continue;
            }

            let mut line = ly.wrapping_sub(y_pos);
            if attributes.contains(SpriteAttributes::Y_FLIP) {
                line = height - 1 - line;
            }
            let data_address = VRAM_BEGIN + u16::from(tile_index) * 16 + u16::from(line) * 2;
            let data1 = self.read_vram(data_address);
            let data2 = self.read_vram(data_address + 1);

            let palette = match attributes.contains(SpriteAttributes::PALETTE) {
                true => self.r.obj_palette1,
                false => self.r.obj_palette0,
            };

            for tile_pixel in (0u8..8).rev() {
                let colour_bit = match attributes.contains(SpriteAttributes::X_FLIP) {
                    true => 7 - tile_pixel,
                    false => tile_pixel,
                };
                let pixel = Pixel::from(
                    (bit_at(data2, colour_bit) as u8) << 1 | bit_at(data1, colour_bit) as u8,
                );
                if pixel == Pixel::Zero {
                    continue;
                }

                let x = x_pos.wrapping_add(7 - tile_pixel);
                if x < SCREEN_WIDTH {
                    self.buffer.write_pixel(x, ly, palette.colorize(pixel).rgb());
                }
            }
        }
    }
}

impl AddressSpace for PPU {
    fn write(&mut self, address: u16, value: u8) {
        match address {
            VRAM_BEGIN..=VRAM_END => self.vram[usize::from(address - VRAM_BEGIN)] = value,
            OAM_BEGIN..=OAM_END => self.oam[usize::from(address - OAM_BEGIN)] = value,
            PPU_LCDC => self.r.lcd_control = LCDControl::from_bits_truncate(value),
            PPU_STAT => self.r.lcd_stat = LCDState::from_bits_truncate(value),
            PPU_SCY => self.r.scy = value,
            PPU_SCX => self.r.scx = value,
            // Any write resets the scanline counter
            PPU_LY => self.r.ly = 0,
            PPU_LYC => self.r.lyc = value,
            PPU_BGP => self.r.bg_palette = value.into(),
            PPU_OBP0 => self.r.obj_palette0 = value.into(),
            PPU_OBP1 => self.r.obj_palette1 = value.into(),
            PPU_WY => self.r.wy = value,
            PPU_WX => self.r.wx = value,
            _ => panic!("Attempt to write to unmapped PPU register: {address:#06x}"),
        }
    }

    fn read(&mut self, address: u16) -> u8 {
        match address {
            VRAM_BEGIN..=VRAM_END => self.vram[usize::from(address - VRAM_BEGIN)],
            OAM_BEGIN..=OAM_END => self.oam[usize::from(address - OAM_BEGIN)],
            PPU_LCDC => self.r.lcd_control.bits(),
            // Undocumented bit should be 1
            PPU_STAT => self.r.lcd_stat.bits() | 0b1000_0000,
            PPU_SCY => self.r.scy,
            PPU_SCX => self.r.scx,
            PPU_LY => self.r.ly,
            PPU_LYC => self.r.lyc,
            PPU_BGP => self.r.bg_palette.into(),
            PPU_OBP0 => self.r.obj_palette0.into(),
            PPU_OBP1 => self.r.obj_palette1.into(),
            PPU_WY => self.r.wy,
            PPU_WX => self.r.wx,
            _ => panic!("Attempt to read from unmapped PPU register: {address:#06x}"),
        }
    }
}
