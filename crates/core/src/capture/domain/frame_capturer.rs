use super::still_image::{decode_still, StillImage};
use crate::shared::frame::Frame;

/// Source of still frames from a live camera stream.
///
/// The capturer owns the stream; callers only read stills from it.
pub trait FrameCapturer: Send {
    /// Whether a stream is currently open and delivering frames.
    fn has_active_stream(&self) -> bool;

    /// Grabs one still. `None` when the stream produced nothing.
    fn still_frame(&mut self) -> Option<StillImage>;

    /// A decoded frame for live preview. Defaults to decoding a still.
    fn preview_frame(&mut self) -> Option<Frame> {
        let still = self.still_frame()?;
        decode_still(&still).ok()
    }
}
