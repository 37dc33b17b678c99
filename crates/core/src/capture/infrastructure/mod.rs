pub mod ffmpeg_camera_capturer;
pub mod image_file_capturer;
