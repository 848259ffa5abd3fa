use crate::alert::domain::notification_sink::NotificationSink;
use crate::alert::domain::sound_sink::{CompletionFn, SoundSink};

/// Sound sink that plays nothing and completes immediately. Used for silent
/// operation and in tests where audio hardware is irrelevant.
pub struct NullSoundSink;

impl SoundSink for NullSoundSink {
    fn play(&mut self, on_complete: CompletionFn) -> Result<(), Box<dyn std::error::Error>> {
        on_complete();
        Ok(())
    }

    fn stop(&mut self) {}
}

/// Notification sink that discards everything.
pub struct NullNotificationSink;

impl NotificationSink for NullNotificationSink {
    fn notify(&mut self, _title: &str, _body: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_null_sound_completes_synchronously() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let mut sink = NullSoundSink;
        sink.play(Box::new(move || flag.store(true, Ordering::Relaxed)))
            .unwrap();
        assert!(fired.load(Ordering::Relaxed));
    }
}
