use ndarray::ArrayView3;

/// A decoded still: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the scorer receives
/// frames in this layout and never sees compressed camera bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

/// Bytes per pixel for the RGB layout every frame uses.
pub const CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, CHANNELS),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    /// Luma of the pixel at `(x, y)` using ITU-R BT.601 weights.
    pub fn luma(&self, x: u32, y: u32) -> f32 {
        let i = ((y as usize) * (self.width as usize) + x as usize) * CHANNELS;
        let (r, g, b) = (self.data[i], self.data[i + 1], self.data[i + 2]);
        0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
    }

    /// Expands to RGBA with an opaque alpha channel, for display surfaces.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() / CHANNELS * 4);
        for px in self.data.chunks_exact(CHANNELS) {
            out.extend_from_slice(px);
            out.push(u8::MAX);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.data(), &data[..]);
        assert!(!frame.is_empty());
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_luma_of_white_and_black() {
        let frame = Frame::new(vec![255, 255, 255, 0, 0, 0], 2, 1);
        assert!((frame.luma(0, 0) - 255.0).abs() < 0.01);
        assert_eq!(frame.luma(1, 0), 0.0);
    }

    #[test]
    fn test_to_rgba_adds_opaque_alpha() {
        let frame = Frame::new(vec![1, 2, 3, 4, 5, 6], 2, 1);
        assert_eq!(frame.to_rgba(), vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
