pub mod beep_sound_sink;
pub mod cooldown_notifier;
pub mod log_notifier;
pub mod null_sinks;
