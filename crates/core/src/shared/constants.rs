pub const APP_DIR_NAME: &str = "MoodSnap";

pub const FACE_DETECTOR_MODEL_NAME: &str = "blazeface_128.onnx";
pub const EXPRESSION_MODEL_NAME: &str = "emotion-ferplus-8.onnx";

/// FER+ as published in the ONNX model zoo. The face detector has no
/// public ONNX release and must come from the cache, a bundled `models/`
/// directory or a configured model source.
pub const EXPRESSION_MODEL_URL: &str = "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/emotion_ferplus/model/emotion-ferplus-8.onnx";

/// Overrides the configured model source.
pub const MODEL_SOURCE_ENV: &str = "MOODSNAP_MODEL_SOURCE";

/// Fixed input resolution of the BlazeFace short-range artifact.
pub const FACE_DETECTOR_INPUT_SIZE: u32 = 128;
pub const DEFAULT_INPUT_SIZE: u32 = FACE_DETECTOR_INPUT_SIZE;
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;

/// Side length of the grayscale face crop the FER+ classifier expects.
pub const EXPRESSION_INPUT_SIZE: u32 = 64;

/// Requested camera resolution.
pub const CAMERA_WIDTH: u32 = 640;
pub const CAMERA_HEIGHT: u32 = 480;

pub const STILL_JPEG_QUALITY: u8 = 90;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];
