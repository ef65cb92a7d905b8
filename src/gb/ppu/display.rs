use crate::gb::ppu::buffer::FrameBuffer;
use crate::gb::{EmulatorMessage, DISPLAY_REFRESH_RATE};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

/// The display hands finished frames to the frontend and
/// takes care of syncing the frame rate.
pub struct Display {
    sender: Sender<EmulatorMessage>,
    frame_limiter: FrameLimiter,
}

impl Display {
    pub fn new(sender: Sender<EmulatorMessage>) -> Self {
        Self {
            sender,
            frame_limiter: FrameLimiter::new(DISPLAY_REFRESH_RATE),
        }
    }

    /// Sends the given frame to the frontend and syncs the frame rate.
    pub fn send_frame(&mut self, buffer: &FrameBuffer) {
        self.sender.send(EmulatorMessage::Frame(buffer.clone())).ok();
        self.frame_limiter.wait();
    }
}

/// Limits FPS to the configured refresh rate.
struct FrameLimiter {
    frame_duration: Duration,
    last_call: Instant,
}

impl FrameLimiter {
    /// Creates a new frame limiter with the given refresh rate.
    #[inline]
    fn new(refresh_rate: f64) -> Self {
        Self {
            frame_duration: Duration::from_secs_f64(1.0 / refresh_rate),
            last_call: Instant::now(),
        }
    }

    /// Blocks the current thread until the allotted frame time has passed.
    fn wait(&mut self) {
        let elapsed = self.last_call.elapsed();
        if elapsed < self.frame_duration {
            spin_sleep::sleep(self.frame_duration - elapsed);
        }
        self.last_call = Instant::now();
    }
}
