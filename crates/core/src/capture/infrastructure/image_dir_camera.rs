use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::domain::camera_source::CameraSource;
use crate::shared::error::SessionError;
use crate::shared::frame::Frame;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Adapts a directory of still images to the [`CameraSource`] interface.
///
/// Files are played back in lexicographic order and the stream wraps around,
/// so a handful of photos stands in for a live feed during development and
/// in tests.
pub struct ImageDirCamera {
    dir: PathBuf,
    files: Vec<PathBuf>,
    cursor: usize,
    next_index: u64,
}

impl ImageDirCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
            cursor: 0,
            next_index: 0,
        }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl CameraSource for ImageDirCamera {
    fn acquire(&mut self) -> Result<(), SessionError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| SessionError::CameraUnavailable(format!("{}: {e}", self.dir.display())))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image(path))
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(SessionError::CameraUnavailable(format!(
                "no image files in {}",
                self.dir.display()
            )));
        }
        self.files = files;
        self.cursor = 0;
        self.next_index = 0;
        Ok(())
    }

    fn frame(&mut self) -> Result<Frame, SessionError> {
        if self.files.is_empty() {
            return Err(SessionError::NoFrame("camera not acquired".into()));
        }
        let path = &self.files[self.cursor];
        self.cursor = (self.cursor + 1) % self.files.len();

        let img = image::open(path)
            .map_err(|e| SessionError::NoFrame(format!("{}: {e}", path.display())))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        let frame = Frame::new(img.into_raw(), width, height, self.next_index);
        self.next_index += 1;
        Ok(frame)
    }

    fn release(&mut self) {
        self.files.clear();
        self.cursor = 0;
    }
}
