use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    DEFAULT_INFERENCE_INTERVAL_MS, DEFAULT_NOTIFICATION_COOLDOWN_MS,
    DEFAULT_SAMPLING_INTERVAL_MS, DEFAULT_TOUCH_CONFIDENCE_THRESHOLD,
    DEFAULT_TRAINING_SAMPLE_COUNT,
};

/// Session tuning knobs, all defaulted and overridable at initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Labeled samples collected per training run.
    #[serde(default = "default_training_sample_count")]
    pub training_sample_count: usize,

    /// Delay between two training samples.
    #[serde(default = "default_sampling_interval_ms")]
    pub sampling_interval_ms: u64,

    /// Touch confidence must strictly exceed this for an alert.
    #[serde(default = "default_touch_confidence_threshold")]
    pub touch_confidence_threshold: f32,

    /// Minimum gap between two user notifications.
    #[serde(default = "default_notification_cooldown_ms")]
    pub notification_cooldown_ms: u64,

    /// Inference cycle cadence (display-refresh fallback).
    #[serde(default = "default_inference_interval_ms")]
    pub inference_interval_ms: u64,
}

fn default_training_sample_count() -> usize {
    DEFAULT_TRAINING_SAMPLE_COUNT
}

fn default_sampling_interval_ms() -> u64 {
    DEFAULT_SAMPLING_INTERVAL_MS
}

fn default_touch_confidence_threshold() -> f32 {
    DEFAULT_TOUCH_CONFIDENCE_THRESHOLD
}

fn default_notification_cooldown_ms() -> u64 {
    DEFAULT_NOTIFICATION_COOLDOWN_MS
}

fn default_inference_interval_ms() -> u64 {
    DEFAULT_INFERENCE_INTERVAL_MS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            training_sample_count: DEFAULT_TRAINING_SAMPLE_COUNT,
            sampling_interval_ms: DEFAULT_SAMPLING_INTERVAL_MS,
            touch_confidence_threshold: DEFAULT_TOUCH_CONFIDENCE_THRESHOLD,
            notification_cooldown_ms: DEFAULT_NOTIFICATION_COOLDOWN_MS,
            inference_interval_ms: DEFAULT_INFERENCE_INTERVAL_MS,
        }
    }
}
