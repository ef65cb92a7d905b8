use crate::gb::cartridge::Cartridge;
use crate::gb::joypad::{Button, JoypadInput};
use crate::gb::ppu::buffer::FrameBuffer;
use crate::gb::{Emulator, EmulatorMessage, FrontendMessage};
use egui::{Key, Ui};
use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::thread::JoinHandle;

/// Holds the frontend side of the emulation: the worker thread,
/// the channels to talk to it and the most recent frame.
pub struct EmulatorFrontend {
    thread: JoinHandle<()>,
    sender: Sender<FrontendMessage>,
    receiver: Receiver<EmulatorMessage>,
    latest_frame: FrameBuffer,
    held_keys: HashSet<Key>,
}

impl EmulatorFrontend {
    /// Starts the emulator with the given cartridge on a worker thread.
    pub fn start(cartridge: Cartridge) -> Self {
        let (emulator_sender, emulator_receiver) = mpsc::channel();
        let (frontend_sender, frontend_receiver) = mpsc::channel();
        let thread = thread::spawn(move || {
            Emulator::new(emulator_sender, frontend_receiver, cartridge).run();
        });
        Self {
            thread,
            sender: frontend_sender,
            receiver: emulator_receiver,
            latest_frame: FrameBuffer::default(),
            held_keys: HashSet::new(),
        }
    }

    /// Shuts the emulator down and waits for the worker thread to finish.
    pub fn shutdown(self) {
        if self.sender.send(FrontendMessage::Stop).is_err() {
            log::warn!("Emulator is not running");
        }
        self.thread.join().ok();
    }

    /// Diffs the currently held keys against the previous frame and sends
    /// the resulting press and release events to the emulator.
    pub fn handle_user_input(&mut self, ui: &Ui) {
        let keys_down = ui.input(|i| i.keys_down.clone());
        for key in keys_down.difference(&self.held_keys) {
            self.send_user_input(*key, true);
        }
        for key in self.held_keys.difference(&keys_down) {
            self.send_user_input(*key, false);
        }
        self.held_keys = keys_down;
    }

    /// Translates the passed key and sends it as input to the emulator.
    fn send_user_input(&self, key: Key, pressed: bool) {
        let button = match key {
            Key::A => Button::Left,
            Key::D => Button::Right,
            Key::W => Button::Up,
            Key::S => Button::Down,
            Key::ArrowRight => Button::A,
            Key::ArrowLeft => Button::B,
            Key::Enter => Button::Start,
            Key::Backspace => Button::Select,
            _ => return,
        };
        self.sender
            .send(FrontendMessage::Input(JoypadInput { button, pressed }))
            .ok();
    }

    /// Pulls the most recent frame out of the channel, if one is ready.
    pub fn update(&mut self) {
        while let Ok(EmulatorMessage::Frame(frame)) = self.receiver.try_recv() {
            self.latest_frame = frame;
        }
    }

    #[inline]
    pub fn frame(&self) -> &FrameBuffer {
        &self.latest_frame
    }
}
