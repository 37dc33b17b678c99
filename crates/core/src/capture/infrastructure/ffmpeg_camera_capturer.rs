use std::ffi::CString;
use std::thread;
use std::time::{Duration, Instant};

use crate::capture::domain::frame_capturer::FrameCapturer;
use crate::capture::domain::still_image::StillImage;
use crate::shared::constants::{CAMERA_HEIGHT, CAMERA_WIDTH};
use crate::shared::frame::Frame;

/// Packets read per still, including those drained from the device queue.
const MAX_PACKETS_PER_STILL: usize = 64;
/// How long to wait for the first frame once the queue is empty.
const FRAME_WAIT_TIMEOUT: Duration = Duration::from_secs(2);
const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Reads stills from the platform camera via libavdevice
/// (v4l2 on Linux, avfoundation on macOS, dshow on Windows).
///
/// Each decoded frame is converted to RGB24; stills are re-encoded as JPEG
/// so callers see the same compressed bytes a browser camera would hand out.
/// A camera that failed to open reports no active stream.
pub struct FfmpegCameraCapturer {
    stream: Option<CameraStream>,
}

impl FfmpegCameraCapturer {
    /// Opens `device`, or the platform default camera when `None`.
    pub fn open(device: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            stream: Some(CameraStream::open(device)?),
        })
    }

    /// Like [`open`](Self::open), but a camera that cannot be opened yields
    /// an inactive capturer instead of an error.
    pub fn open_or_inactive(device: Option<&str>) -> Self {
        match Self::open(device) {
            Ok(capturer) => capturer,
            Err(e) => {
                log::warn!("Camera unavailable: {e}");
                Self { stream: None }
            }
        }
    }

    fn grab_logged(&mut self) -> Option<Frame> {
        match self.stream.as_mut()?.grab() {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::warn!("Camera read failed: {e}");
                None
            }
        }
    }
}

impl FrameCapturer for FfmpegCameraCapturer {
    fn has_active_stream(&self) -> bool {
        self.stream.is_some()
    }

    fn still_frame(&mut self) -> Option<StillImage> {
        let frame = self.grab_logged()?;
        match StillImage::encode_jpeg(&frame) {
            Ok(still) => Some(still),
            Err(e) => {
                log::warn!("Failed to encode camera still: {e}");
                None
            }
        }
    }

    fn preview_frame(&mut self) -> Option<Frame> {
        self.grab_logged()
    }
}

struct CameraStream {
    input_ctx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: the stream is only used from one thread at a time (behind the
// session's mutex). The raw pointers inside ffmpeg types are not shared.
unsafe impl Send for CameraStream {}

impl CameraStream {
    fn open(device: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();

        let (format_name, default_device) = platform_input();
        let device = device.unwrap_or(default_device);
        let format = find_input_format(format_name)?;

        let mut options = ffmpeg_next::Dictionary::new();
        options.set("video_size", &format!("{CAMERA_WIDTH}x{CAMERA_HEIGHT}"));
        options.set("framerate", "30");

        let mut input_ctx = ffmpeg_next::format::open_with(device, &format, options)?.input();
        // Safety: the context was just opened and is exclusively owned here.
        // Non-blocking reads let `grab` tell a drained queue from a slow camera.
        unsafe {
            (*input_ctx.as_mut_ptr()).flags |= ffmpeg_next::ffi::AVFMT_FLAG_NONBLOCK as i32;
        }

        let stream = input_ctx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("Camera exposes no video stream")?;
        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::info!("Opened camera {device} via {format_name} at {width}x{height}");

        Ok(Self {
            input_ctx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        })
    }

    /// Decodes everything the device has queued and keeps the newest frame,
    /// so a still taken after sitting idle is not seconds old.
    fn grab(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        let input_ctx = &mut self.input_ctx;
        let decoder = &mut self.decoder;
        let stream_index = self.stream_index;
        let deadline = Instant::now() + FRAME_WAIT_TIMEOUT;

        let latest = drain_latest(
            || {
                let mut packet = ffmpeg_next::Packet::empty();
                match packet.read(input_ctx) {
                    Ok(()) => {}
                    Err(ffmpeg_next::Error::Other {
                        errno: ffmpeg_next::error::EAGAIN,
                    }) => return Ok(DeviceRead::Empty),
                    Err(ffmpeg_next::Error::Eof) => return Ok(DeviceRead::Ended),
                    Err(e) => return Err(e),
                }
                if packet.stream() != stream_index || decoder.send_packet(&packet).is_err() {
                    return Ok(DeviceRead::Skipped);
                }
                let mut newest = None;
                loop {
                    let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
                    if decoder.receive_frame(&mut decoded).is_err() {
                        break;
                    }
                    newest = Some(decoded);
                }
                Ok(newest.map_or(DeviceRead::Skipped, DeviceRead::Frame))
            },
            MAX_PACKETS_PER_STILL,
            || {
                if Instant::now() >= deadline {
                    return false;
                }
                thread::sleep(FRAME_POLL_INTERVAL);
                true
            },
        )?;

        let decoded = latest.ok_or("Camera delivered no decodable frame")?;
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb_frame)?;
        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        Ok(Frame::new(pixels, self.width, self.height))
    }
}

/// Outcome of one non-blocking read from the device.
enum DeviceRead<T> {
    Frame(T),
    /// A packet that produced no frame (other stream, decoder still priming).
    Skipped,
    /// Nothing queued right now.
    Empty,
    Ended,
}

/// Reads until the queue is empty and returns the last frame seen.
///
/// With nothing decoded yet, an empty queue calls `wait`, which returns
/// `false` to give up. At most `max_reads` packets are consumed.
fn drain_latest<T, E>(
    mut read: impl FnMut() -> Result<DeviceRead<T>, E>,
    max_reads: usize,
    mut wait: impl FnMut() -> bool,
) -> Result<Option<T>, E> {
    let mut latest = None;
    let mut reads = 0;
    while reads < max_reads {
        match read()? {
            DeviceRead::Frame(frame) => {
                latest = Some(frame);
                reads += 1;
            }
            DeviceRead::Skipped => reads += 1,
            DeviceRead::Empty if latest.is_some() => break,
            DeviceRead::Empty => {
                if !wait() {
                    break;
                }
            }
            DeviceRead::Ended => break,
        }
    }
    Ok(latest)
}

/// `(libavdevice input format, default device)` for the current platform.
fn platform_input() -> (&'static str, &'static str) {
    #[cfg(target_os = "macos")]
    {
        ("avfoundation", "0")
    }
    #[cfg(target_os = "windows")]
    {
        ("dshow", "video=Integrated Camera")
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        ("v4l2", "/dev/video0")
    }
}

fn find_input_format(
    name: &str,
) -> Result<ffmpeg_next::format::format::Format, Box<dyn std::error::Error>> {
    let c_name = CString::new(name)?;
    // Safety: av_find_input_format returns a pointer to a static format
    // descriptor (or null) and does not retain `c_name`.
    let ptr = unsafe { ffmpeg_next::ffi::av_find_input_format(c_name.as_ptr()) };
    if ptr.is_null() {
        return Err(format!("Camera input format '{name}' is not available").into());
    }
    let input = unsafe { ffmpeg_next::format::format::Input::wrap(ptr as *mut _) };
    Ok(ffmpeg_next::format::format::Format::Input(input))
}

fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_input_names_a_device() {
        let (format, device) = platform_input();
        assert!(!format.is_empty());
        assert!(!device.is_empty());
    }

    #[test]
    fn test_unopened_camera_has_no_stream() {
        let mut capturer = FfmpegCameraCapturer { stream: None };
        assert!(!capturer.has_active_stream());
        assert!(capturer.still_frame().is_none());
        assert!(capturer.preview_frame().is_none());
    }

    fn script(reads: Vec<DeviceRead<u32>>) -> impl FnMut() -> Result<DeviceRead<u32>, ()> {
        let mut reads = reads.into_iter();
        move || Ok(reads.next().unwrap_or(DeviceRead::Ended))
    }

    #[test]
    fn test_drain_keeps_newest_queued_frame() {
        let reads = vec![
            DeviceRead::Frame(1),
            DeviceRead::Skipped,
            DeviceRead::Frame(2),
            DeviceRead::Frame(3),
            DeviceRead::Empty,
            DeviceRead::Frame(4),
        ];
        let mut waits = 0;

        let latest = drain_latest(script(reads), 64, || {
            waits += 1;
            true
        });

        assert_eq!(latest, Ok(Some(3)));
        assert_eq!(waits, 0);
    }

    #[test]
    fn test_drain_waits_for_first_frame() {
        let reads = vec![
            DeviceRead::Empty,
            DeviceRead::Empty,
            DeviceRead::Frame(7),
            DeviceRead::Empty,
        ];
        let mut waits = 0;

        let latest = drain_latest(script(reads), 64, || {
            waits += 1;
            true
        });

        assert_eq!(latest, Ok(Some(7)));
        assert_eq!(waits, 2);
    }

    #[test]
    fn test_drain_gives_up_when_wait_expires() {
        let mut read = || Ok::<_, ()>(DeviceRead::<u32>::Empty);
        let latest = drain_latest(&mut read, 64, || false);
        assert_eq!(latest, Ok(None));
    }

    #[test]
    fn test_drain_stops_at_read_budget() {
        let reads = (1..=10).map(DeviceRead::Frame).collect();
        let latest = drain_latest(script(reads), 4, || true);
        assert_eq!(latest, Ok(Some(4)));
    }

    #[test]
    fn test_drain_propagates_read_error() {
        let mut calls = 0;
        let latest = drain_latest(
            || {
                calls += 1;
                if calls == 1 {
                    Ok(DeviceRead::Frame(1u32))
                } else {
                    Err("device unplugged")
                }
            },
            64,
            || true,
        );
        assert_eq!(latest, Err("device unplugged"));
    }

    #[test]
    fn test_unknown_input_format_is_error() {
        ffmpeg_next::init().unwrap();
        assert!(find_input_format("definitely-not-a-device").is_err());
    }
}
