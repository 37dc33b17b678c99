use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::domain::frame_capturer::FrameCapturer;
use crate::capture::domain::still_image::StillImage;

/// Adapts an image file on disk to the [`FrameCapturer`] interface.
///
/// The "stream" is active while the file exists; every still is the file's
/// current bytes, so replacing the file between captures simulates a
/// changing camera view.
pub struct ImageFileCapturer {
    path: PathBuf,
}

impl ImageFileCapturer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameCapturer for ImageFileCapturer {
    fn has_active_stream(&self) -> bool {
        self.path.is_file()
    }

    fn still_frame(&mut self) -> Option<StillImage> {
        match fs::read(&self.path) {
            Ok(bytes) => Some(StillImage::new(bytes)),
            Err(e) => {
                log::warn!("Failed to read still from {}: {e}", self.path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_has_no_stream() {
        let tmp = TempDir::new().unwrap();
        let capturer = ImageFileCapturer::new(tmp.path().join("absent.jpg"));
        assert!(!capturer.has_active_stream());
    }

    #[test]
    fn test_directory_is_not_a_stream() {
        let tmp = TempDir::new().unwrap();
        let capturer = ImageFileCapturer::new(tmp.path());
        assert!(!capturer.has_active_stream());
    }

    #[test]
    fn test_still_is_file_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("face.jpg");
        fs::write(&path, b"not really a jpeg").unwrap();

        let mut capturer = ImageFileCapturer::new(&path);

        assert!(capturer.has_active_stream());
        let still = capturer.still_frame().unwrap();
        assert_eq!(still.bytes(), b"not really a jpeg");
    }

    #[test]
    fn test_still_after_file_removed_is_none() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("face.jpg");
        fs::write(&path, b"x").unwrap();
        let mut capturer = ImageFileCapturer::new(&path);
        fs::remove_file(&path).unwrap();

        assert!(capturer.still_frame().is_none());
    }

    #[test]
    fn test_preview_of_undecodable_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("face.jpg");
        fs::write(&path, b"garbage").unwrap();
        let mut capturer = ImageFileCapturer::new(&path);

        assert!(capturer.preview_frame().is_none());
    }
}
