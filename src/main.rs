#[macro_use]
extern crate bitflags;

mod gb;
mod gui;

use crate::gb::cartridge::Cartridge;
use crate::gb::{GBResult, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::gui::DotMatrix;
use clap::Parser;
use std::path::PathBuf;

/// A DMG Game Boy emulator.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path of the ROM to load
    rom: PathBuf,

    /// Integer scale factor for the window
    #[arg(long, default_value_t = 3)]
    upscale: usize,
}

fn main() -> GBResult<()> {
    env_logger::init();
    let args = Args::parse();

    let cartridge = Cartridge::try_from(args.rom.as_path())?;
    log::info!("Loaded ROM: {cartridge}");

    let size = [
        (SCREEN_WIDTH as usize * args.upscale) as f32,
        (SCREEN_HEIGHT as usize * args.upscale) as f32,
    ];
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size(size)
            .with_resizable(false),
        ..Default::default()
    };
    let app = DotMatrix::new(cartridge, args.upscale);
    eframe::run_native("dotmatrix", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| format!("Failed to start the frontend: {e}").into())
}
