use crate::gb::bus::InterruptRegister;
use crate::gb::constants::*;
use crate::gb::ppu::registers::{LCDMode, LCDState};
use crate::gb::ppu::PPU;
use crate::gb::AddressSpace;

const WHITE: (u8, u8, u8) = (0xFF, 0xFF, 0xFF);
const LIGHT_GREY: (u8, u8, u8) = (0xCC, 0xCC, 0xCC);
const BLACK: (u8, u8, u8) = (0x00, 0x00, 0x00);

#[test]
fn test_mode_sequence_within_a_scanline() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();

    // The OAM scan occupies the first 80 cycles of a scanline
    ppu.step(80, &mut int_reg);
    assert_eq!(ppu.r.lcd_stat.get_lcd_mode(), LCDMode::OAMSearch);

    ppu.step(1, &mut int_reg);
    assert_eq!(ppu.r.lcd_stat.get_lcd_mode(), LCDMode::PixelTransfer);

    // 172 cycles of transfer, then H-Blank for the rest of the line
    ppu.step(172, &mut int_reg);
    assert_eq!(ppu.r.lcd_stat.get_lcd_mode(), LCDMode::HBlank);

    // The remaining 203 cycles finish the 456 cycle scanline
    ppu.step(203, &mut int_reg);
    assert_eq!(ppu.r.ly, 1);
    assert_eq!(ppu.r.lcd_stat.get_lcd_mode(), LCDMode::OAMSearch);
}

#[test]
fn test_mode_entry_requests_stat_interrupt() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();
    ppu.write(PPU_STAT, LCDState::H_BLANK_INT.bits());

    ppu.step(80, &mut int_reg);
    assert!(!int_reg.contains(InterruptRegister::STAT));

    // Entering H-Blank with the mode 0 enable bit set raises STAT
    // within the same step
    ppu.step(173, &mut int_reg);
    assert_eq!(ppu.r.lcd_stat.get_lcd_mode(), LCDMode::HBlank);
    assert!(int_reg.contains(InterruptRegister::STAT));
}

#[test]
fn test_vblank_after_all_visible_scanlines() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();
    ppu.write(PPU_STAT, LCDState::V_BLANK_INT.bits());

    for _ in 0..143 {
        ppu.step(456, &mut int_reg);
    }
    assert!(!int_reg.contains(InterruptRegister::VBLANK));

    // The step that enters line 144 requests V-Blank and the mode 1
    // STAT interrupt at once
    ppu.step(456, &mut int_reg);
    assert_eq!(ppu.r.ly, 144);
    assert!(int_reg.contains(InterruptRegister::VBLANK));
    assert_eq!(ppu.r.lcd_stat.get_lcd_mode(), LCDMode::VBlank);
    assert!(int_reg.contains(InterruptRegister::STAT));
}

#[test]
fn test_ly_wraps_after_last_vblank_line() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();

    for _ in 0..154 {
        ppu.step(456, &mut int_reg);
    }
    assert_eq!(ppu.r.ly, 0);
}

#[test]
fn test_ly_write_resets() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();
    ppu.step(456, &mut int_reg);
    assert_eq!(ppu.read(PPU_LY), 1);

    ppu.write(PPU_LY, 0x55);
    assert_eq!(ppu.read(PPU_LY), 0);
}

#[test]
fn test_lyc_coincidence() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();
    ppu.write(PPU_LYC, 1);
    ppu.write(PPU_STAT, LCDState::LY_INT.bits());

    // The step that moves LY onto LYC sets the flag and raises STAT
    ppu.step(456, &mut int_reg);
    assert!(ppu.r.lcd_stat.contains(LCDState::LYC_STAT));
    assert!(int_reg.contains(InterruptRegister::STAT));

    ppu.step(456, &mut int_reg);
    assert!(
        !ppu.r.lcd_stat.contains(LCDState::LYC_STAT),
        "The flag clears when LY moves past LYC"
    );
}

#[test]
fn test_disabled_lcd_holds_reset_state() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();
    ppu.write(PPU_LCDC, 0x11); // LCD off

    for _ in 0..10 {
        ppu.step(456, &mut int_reg);
    }
    assert_eq!(ppu.r.ly, 0);
    assert_eq!(ppu.r.lcd_stat.get_lcd_mode(), LCDMode::VBlank);
    assert!(!int_reg.contains(InterruptRegister::VBLANK));
}

#[test]
fn test_background_rendering() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();

    // Tile 0 fully set: every pixel uses colour id 3
    for offset in 0..16 {
        ppu.write(VRAM_BEGIN + offset, 0xFF);
    }
    ppu.write(PPU_BGP, 0b1110_0100); // identity palette

    ppu.step(456, &mut int_reg);
    assert_eq!(ppu.frame().pixel(0, 1), BLACK);
    assert_eq!(ppu.frame().pixel(159, 1), BLACK);
    assert_eq!(ppu.frame().pixel(0, 0), WHITE, "Line 0 is not redrawn");
}

#[test]
fn test_background_scrolling() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();

    // Tile 1 fully set, placed at the second tile column of the map
    for offset in 16..32 {
        ppu.write(VRAM_BEGIN + offset, 0xFF);
    }
    ppu.write(0x9801, 1);
    ppu.write(PPU_BGP, 0b1110_0100);

    ppu.step(456, &mut int_reg);
    assert_eq!(ppu.frame().pixel(0, 1), WHITE);
    assert_eq!(ppu.frame().pixel(8, 1), BLACK, "Tile 1 starts at x = 8");

    // Scrolling 8 pixels to the right moves tile 1 to the left edge
    ppu.write(PPU_SCX, 8);
    ppu.step(456, &mut int_reg);
    assert_eq!(ppu.frame().pixel(0, 2), BLACK);
    assert_eq!(ppu.frame().pixel(8, 2), WHITE);
}

#[test]
fn test_sprite_rendering_and_transparency() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();
    ppu.write(PPU_LCDC, 0x93); // enable sprites on top of the background
    ppu.write(PPU_BGP, 0b1110_0100);
    ppu.write(PPU_OBP0, 0b1110_0100);

    // Sprite tile 1, first row: the left four pixels are colour id 1,
    // the right four are transparent colour id 0
    ppu.write(VRAM_BEGIN + 16, 0xF0);
    ppu.write(VRAM_BEGIN + 17, 0x00);

    // One sprite at the top left corner of the screen
    ppu.write(OAM_BEGIN, 17); // Y + 16
    ppu.write(OAM_BEGIN + 1, 8); // X + 8
    ppu.write(OAM_BEGIN + 2, 1); // pattern
    ppu.write(OAM_BEGIN + 3, 0); // attributes

    ppu.step(456, &mut int_reg);
    assert_eq!(ppu.frame().pixel(0, 1), LIGHT_GREY);
    assert_eq!(ppu.frame().pixel(3, 1), LIGHT_GREY);
    assert_eq!(
        ppu.frame().pixel(4, 1),
        WHITE,
        "Colour 0 sprite pixels are transparent"
    );
}

#[test]
fn test_sprite_x_flip() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();
    ppu.write(PPU_LCDC, 0x93);
    ppu.write(PPU_BGP, 0b1110_0100);
    ppu.write(PPU_OBP0, 0b1110_0100);

    ppu.write(VRAM_BEGIN + 16, 0xF0);
    ppu.write(VRAM_BEGIN + 17, 0x00);

    ppu.write(OAM_BEGIN, 17);
    ppu.write(OAM_BEGIN + 1, 8);
    ppu.write(OAM_BEGIN + 2, 1);
    ppu.write(OAM_BEGIN + 3, 0b0010_0000); // X flip

    ppu.step(456, &mut int_reg);
    assert_eq!(ppu.frame().pixel(0, 1), WHITE);
    assert_eq!(ppu.frame().pixel(4, 1), LIGHT_GREY);
    assert_eq!(ppu.frame().pixel(7, 1), LIGHT_GREY);
}

#[test]
fn test_window_rendering() {
    let mut int_reg = InterruptRegister::empty();
    let mut ppu = PPU::default();
    // Window enabled with its map at 0x9C00
    ppu.write(PPU_LCDC, 0xF1);
    ppu.write(PPU_BGP, 0b1110_0100);
    ppu.write(PPU_WY, 0);
    ppu.write(PPU_WX, 7 + 80); // the window covers the right half

    // Window map points at tile 1, which is fully set
    for offset in 16..32 {
        ppu.write(VRAM_BEGIN + offset, 0xFF);
    }
    for offset in 0..32 {
        ppu.write(0x9C00 + offset, 1);
    }

    ppu.step(456, &mut int_reg);
    assert_eq!(ppu.frame().pixel(79, 1), WHITE, "Background on the left");
    assert_eq!(ppu.frame().pixel(80, 1), BLACK, "Window on the right");
    assert_eq!(ppu.frame().pixel(159, 1), BLACK);
}
