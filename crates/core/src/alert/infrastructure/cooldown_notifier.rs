use std::time::{Duration, Instant};

use crate::alert::domain::notification_sink::NotificationSink;

/// Decorator that rate-limits an inner notification sink.
///
/// Calls inside the cooldown window are silently dropped; the alert gate
/// stays oblivious to notification timing.
pub struct CooldownNotifier {
    inner: Box<dyn NotificationSink>,
    cooldown: Duration,
    last_sent: Option<Instant>,
}

impl CooldownNotifier {
    pub fn new(inner: Box<dyn NotificationSink>, cooldown: Duration) -> Self {
        Self {
            inner,
            cooldown,
            last_sent: None,
        }
    }
}

impl NotificationSink for CooldownNotifier {
    fn notify(&mut self, title: &str, body: &str) {
        let now = Instant::now();
        if let Some(last) = self.last_sent {
            if now.duration_since(last) < self.cooldown {
                return;
            }
        }
        self.last_sent = Some(now);
        self.inner.notify(title, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    struct CountingSink {
        calls: Arc<Mutex<usize>>,
    }

    impl NotificationSink for CountingSink {
        fn notify(&mut self, _title: &str, _body: &str) {
            *self.calls.lock().unwrap() += 1;
        }
    }

    fn counting() -> (Box<dyn NotificationSink>, Arc<Mutex<usize>>) {
        let calls = Arc::new(Mutex::new(0));
        (
            Box::new(CountingSink {
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[test]
    fn test_first_call_passes_through() {
        let (inner, calls) = counting();
        let mut notifier = CooldownNotifier::new(inner, Duration::from_secs(60));
        notifier.notify("t", "b");
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_calls_inside_window_are_dropped() {
        let (inner, calls) = counting();
        let mut notifier = CooldownNotifier::new(inner, Duration::from_secs(60));
        for _ in 0..10 {
            notifier.notify("t", "b");
        }
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_window_expiry_lets_next_call_through() {
        let (inner, calls) = counting();
        let mut notifier = CooldownNotifier::new(inner, Duration::from_millis(20));
        notifier.notify("t", "b");
        thread::sleep(Duration::from_millis(30));
        notifier.notify("t", "b");
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[test]
    fn test_zero_cooldown_never_drops() {
        let (inner, calls) = counting();
        let mut notifier = CooldownNotifier::new(inner, Duration::ZERO);
        for _ in 0..5 {
            notifier.notify("t", "b");
        }
        assert_eq!(*calls.lock().unwrap(), 5);
    }
}
