use crate::shared::constants::STILL_JPEG_QUALITY;
use crate::shared::frame::Frame;

/// Lossy-compressed bytes of one camera still (normally JPEG).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StillImage {
    bytes: Vec<u8>,
}

impl StillImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// JPEG-encodes an RGB frame.
    pub fn encode_jpeg(frame: &Frame) -> Result<Self, image::ImageError> {
        let mut bytes = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, STILL_JPEG_QUALITY);
        image::ImageEncoder::write_image(
            encoder,
            frame.data(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decodes a still into the RGB [`Frame`] the scorer accepts.
///
/// Empty or corrupt data is an error.
pub fn decode_still(still: &StillImage) -> Result<Frame, image::ImageError> {
    let rgb = image::load_from_memory(still.bytes())?.into_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::new(rgb.into_raw(), width, height))
}
