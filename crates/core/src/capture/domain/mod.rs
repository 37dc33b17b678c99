pub mod frame_capturer;
pub mod still_image;
