pub const EMBEDDING_MODEL_NAME: &str = "mobilenetv2-7.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/classification/mobilenet/model/mobilenetv2-7.onnx";

/// Side length of the square input the embedding model expects.
pub const EMBEDDING_INPUT_SIZE: usize = 224;

pub const DEFAULT_TRAINING_SAMPLE_COUNT: usize = 50;
pub const DEFAULT_SAMPLING_INTERVAL_MS: u64 = 50;
pub const DEFAULT_TOUCH_CONFIDENCE_THRESHOLD: f32 = 0.8;
pub const DEFAULT_NOTIFICATION_COOLDOWN_MS: u64 = 3000;

/// Inference cadence when no display refresh signal is available (~60 Hz).
pub const DEFAULT_INFERENCE_INTERVAL_MS: u64 = 16;

/// Consecutive failed inference cycles before the loop gives up.
pub const MAX_CONSECUTIVE_CYCLE_FAILURES: usize = 3;

/// Neighbors consulted by the KNN classifier for one prediction.
pub const DEFAULT_KNN_K: usize = 3;
