pub mod emulator;

use crate::gb::cartridge::Cartridge;
use crate::gb::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::gui::emulator::EmulatorFrontend;
use eframe::egui;
use egui::{CentralPanel, Color32, ColorImage, TextureOptions, Ui, Vec2};

/// The main application window: one borderless panel
/// showing the upscaled emulator screen.
pub struct DotMatrix {
    frontend: Option<EmulatorFrontend>,
    upscale: usize,
}

impl DotMatrix {
    pub fn new(cartridge: Cartridge, upscale: usize) -> Self {
        Self {
            frontend: Some(EmulatorFrontend::start(cartridge)),
            upscale,
        }
    }

    /// Uploads the latest frame as a texture and draws it upscaled.
    fn update_screen(&self, ctx: &egui::Context, ui: &mut Ui) {
        let Some(frontend) = &self.frontend else {
            return;
        };
        let pixels = frontend
            .frame()
            .pixels()
            .iter()
            .map(|&(r, g, b)| Color32::from_rgb(r, g, b))
            .collect();
        let image = ColorImage {
            size: [SCREEN_WIDTH as usize, SCREEN_HEIGHT as usize],
            pixels,
        };
        let texture = ctx.load_texture("frame", image, TextureOptions::NEAREST);
        let size = Vec2::new(
            (SCREEN_WIDTH as usize * self.upscale) as f32,
            (SCREEN_HEIGHT as usize * self.upscale) as f32,
        );
        ui.image((texture.id(), size));
        ctx.request_repaint();
    }
}

impl eframe::App for DotMatrix {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(frontend) = &mut self.frontend {
            frontend.update();
        }
        CentralPanel::default().show(ctx, |ui| {
            if let Some(frontend) = &mut self.frontend {
                frontend.handle_user_input(ui);
            }
            self.update_screen(ctx, ui);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(frontend) = self.frontend.take() {
            frontend.shutdown();
        }
    }
}
