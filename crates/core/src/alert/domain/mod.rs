pub mod notification_sink;
pub mod sound_sink;
