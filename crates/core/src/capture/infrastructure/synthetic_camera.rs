use crate::capture::domain::camera_source::CameraSource;
use crate::shared::error::SessionError;
use crate::shared::frame::Frame;

const DEFAULT_WIDTH: u32 = 64;
const DEFAULT_HEIGHT: u32 = 64;

/// Procedural camera for demos and tests: each frame is a deterministic
/// gradient that drifts with the capture index, so consecutive frames differ
/// but the stream never blocks or fails.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    next_index: u64,
    acquired: bool,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_index: 0,
            acquired: false,
        }
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl CameraSource for SyntheticCamera {
    fn acquire(&mut self) -> Result<(), SessionError> {
        self.acquired = true;
        self.next_index = 0;
        Ok(())
    }

    fn frame(&mut self) -> Result<Frame, SessionError> {
        if !self.acquired {
            return Err(SessionError::NoFrame("camera not acquired".into()));
        }
        let w = self.width as usize;
        let h = self.height as usize;
        let phase = (self.next_index % 251) as usize;
        let mut data = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                data.push(((x + phase) % 256) as u8);
                data.push(((y + phase) % 256) as u8);
                data.push(((x + y) % 256) as u8);
            }
        }
        let frame = Frame::new(data, self.width, self.height, self.next_index);
        self.next_index += 1;
        Ok(frame)
    }

    fn release(&mut self) {
        self.acquired = false;
    }
}
