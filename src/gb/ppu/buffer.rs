use crate::gb::ppu::misc::Rgb;
use crate::gb::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Frame buffer storing the current 160x144 screen contents,
/// with the origin at the top left corner.
#[derive(Clone)]
pub struct FrameBuffer {
    pixels: Vec<Rgb>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: vec![(0xFF, 0xFF, 0xFF); SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize],
        }
    }
}

impl FrameBuffer {
    #[inline]
    pub fn write_pixel(&mut self, x: u8, y: u8, color: Rgb) {
        self.pixels[y as usize * SCREEN_WIDTH as usize + x as usize] = color;
    }

    #[inline]
    pub fn pixel(&self, x: u8, y: u8) -> Rgb {
        self.pixels[y as usize * SCREEN_WIDTH as usize + x as usize]
    }

    /// Returns all pixels in row major order.
    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }
}
