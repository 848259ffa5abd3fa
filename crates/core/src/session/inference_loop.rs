use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;

use crate::alert::alert_gate::AlertGate;
use crate::capture::domain::camera_source::CameraSource;
use crate::model::domain::embedding_extractor::EmbeddingExtractor;
use crate::model::domain::incremental_classifier::IncrementalClassifier;
use crate::session::event::SessionEvent;
use crate::shared::label::Label;

/// Why the loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceOutcome {
    /// Exited at a cancellation checkpoint.
    Cancelled,
    /// Gave up after consecutive cycle failures.
    Degraded { consecutive: usize },
}

/// Continuous predict-and-react cycle at a bounded rate.
///
/// Cycles are strictly sequential: the next cycle is scheduled only after the
/// current one's alert-gate call has returned, so predictions can never queue
/// up behind a slow classifier. Cancellation is checked at the top of each
/// cycle, never mid-capture or mid-predict.
///
/// Failure policy is fail-open: one bad cycle logs and counts as "not
/// touching"; a run of consecutive failures stops the loop instead of
/// spinning on a dead camera.
pub struct InferenceLoop {
    interval: Duration,
    threshold: f32,
    max_consecutive_failures: usize,
}

impl InferenceLoop {
    pub fn new(interval: Duration, threshold: f32, max_consecutive_failures: usize) -> Self {
        Self {
            interval,
            threshold,
            max_consecutive_failures: max_consecutive_failures.max(1),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &self,
        camera: &mut dyn CameraSource,
        extractor: &mut dyn EmbeddingExtractor,
        classifier: &dyn IncrementalClassifier,
        gate: &mut AlertGate,
        cancelled: &AtomicBool,
        touched: &AtomicBool,
        events: &Sender<SessionEvent>,
    ) -> InferenceOutcome {
        let mut consecutive_failures = 0;

        loop {
            if cancelled.load(Ordering::Relaxed) {
                touched.store(false, Ordering::Relaxed);
                let _ = events.send(SessionEvent::InferenceStopped);
                return InferenceOutcome::Cancelled;
            }

            let cycle_start = Instant::now();
            let verdict = camera
                .frame()
                .and_then(|frame| extractor.embed(&frame))
                .and_then(|embedding| classifier.predict(&embedding));

            let (is_touch, confidence) = match verdict {
                Ok(result) => {
                    consecutive_failures = 0;
                    let confidence = result.confidence(Label::Touching);
                    // Strict '>' so a result sitting exactly on the
                    // threshold does not alert.
                    let is_touch =
                        result.label() == Label::Touching && confidence > self.threshold;
                    (is_touch, confidence)
                }
                Err(e) => {
                    consecutive_failures += 1;
                    log::warn!(
                        "inference cycle failed ({consecutive_failures} consecutive): {e}"
                    );
                    if consecutive_failures >= self.max_consecutive_failures {
                        touched.store(false, Ordering::Relaxed);
                        let _ = events.send(SessionEvent::InferenceDegraded {
                            consecutive: consecutive_failures,
                        });
                        return InferenceOutcome::Degraded {
                            consecutive: consecutive_failures,
                        };
                    }
                    (false, 0.0)
                }
            };

            let touching = gate.handle(is_touch);
            touched.store(touching, Ordering::Relaxed);
            let _ = events.send(SessionEvent::Touched {
                touching,
                confidence,
            });

            // The gate call above has returned; only now is the next cycle
            // scheduled.
            let elapsed = cycle_start.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::domain::notification_sink::NotificationSink;
    use crate::alert::domain::sound_sink::{CompletionFn, SoundSink};
    use crate::shared::embedding::Embedding;
    use crate::shared::error::SessionError;
    use crate::shared::frame::Frame;
    use crate::shared::prediction::PredictionResult;
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<String>>>;

    // --- Stubs ---

    struct StubCamera {
        served: u64,
        fail_from: Option<u64>,
        log: Option<CallLog>,
    }

    impl StubCamera {
        fn ok() -> Self {
            Self {
                served: 0,
                fail_from: None,
                log: None,
            }
        }
    }

    impl CameraSource for StubCamera {
        fn acquire(&mut self) -> Result<(), SessionError> {
            Ok(())
        }

        fn frame(&mut self) -> Result<Frame, SessionError> {
            if let Some(at) = self.fail_from {
                if self.served >= at {
                    return Err(SessionError::NoFrame("stub dropout".into()));
                }
            }
            if let Some(log) = &self.log {
                log.lock().unwrap().push(format!("capture {}", self.served));
            }
            let frame = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, self.served);
            self.served += 1;
            Ok(frame)
        }

        fn release(&mut self) {}
    }

    struct StubExtractor;

    impl EmbeddingExtractor for StubExtractor {
        fn embed(&mut self, frame: &Frame) -> Result<Embedding, SessionError> {
            Ok(Embedding::new(vec![frame.index() as f32]))
        }
    }

    /// Returns a scripted confidence per cycle, repeating the last entry.
    struct ScriptedClassifier {
        confidences: Vec<f32>,
        calls: Mutex<usize>,
        log: Option<CallLog>,
    }

    impl ScriptedClassifier {
        fn constant(confidence: f32) -> Self {
            Self {
                confidences: vec![confidence],
                calls: Mutex::new(0),
                log: None,
            }
        }
    }

    impl IncrementalClassifier for ScriptedClassifier {
        fn add_example(&mut self, _embedding: Embedding, _label: Label) {}

        fn predict(&self, _embedding: &Embedding) -> Result<PredictionResult, SessionError> {
            let mut calls = self.calls.lock().unwrap();
            let idx = (*calls).min(self.confidences.len() - 1);
            if let Some(log) = &self.log {
                log.lock().unwrap().push(format!("predict {}", *calls));
            }
            *calls += 1;
            let touch_confidence = self.confidences[idx];
            let label = if touch_confidence >= 0.5 {
                Label::Touching
            } else {
                Label::NotTouching
            };
            Ok(PredictionResult::new(
                label,
                [1.0 - touch_confidence, touch_confidence],
            ))
        }

        fn example_count(&self) -> usize {
            1
        }
    }

    struct NullSound;

    impl SoundSink for NullSound {
        fn play(&mut self, on_complete: CompletionFn) -> Result<(), Box<dyn std::error::Error>> {
            on_complete();
            Ok(())
        }

        fn stop(&mut self) {}
    }

    struct LoggingNotifier {
        log: CallLog,
    }

    impl NotificationSink for LoggingNotifier {
        fn notify(&mut self, _title: &str, _body: &str) {
            self.log.lock().unwrap().push("notify".into());
        }
    }

    struct NullNotifier;

    impl NotificationSink for NullNotifier {
        fn notify(&mut self, _title: &str, _body: &str) {}
    }

    /// Cancels the loop after the channel sees `n` Touched events.
    fn run_cycles(
        loop_: &InferenceLoop,
        camera: &mut dyn CameraSource,
        classifier: &dyn IncrementalClassifier,
        gate: &mut AlertGate,
        n: usize,
    ) -> (InferenceOutcome, Vec<SessionEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));
        let touched = AtomicBool::new(false);

        // Side-channel cancellation: a watcher thread flips the flag after
        // the requested number of cycles. It hands back what it drained so
        // the caller still sees every event in order.
        let watcher_rx = rx.clone();
        let watcher_flag = cancelled.clone();
        let watcher = std::thread::spawn(move || {
            let mut drained = Vec::new();
            let mut seen = 0;
            for event in watcher_rx.iter() {
                let terminal = matches!(
                    event,
                    SessionEvent::InferenceStopped | SessionEvent::InferenceDegraded { .. }
                );
                if matches!(event, SessionEvent::Touched { .. }) {
                    seen += 1;
                }
                drained.push(event);
                if terminal {
                    break;
                }
                if seen >= n {
                    watcher_flag.store(true, Ordering::Relaxed);
                    break;
                }
            }
            drained
        });

        let mut extractor = StubExtractor;
        let outcome = loop_.run(
            camera,
            &mut extractor,
            classifier,
            gate,
            &cancelled,
            &touched,
            &tx,
        );
        drop(tx);
        let mut events = watcher.join().unwrap();
        events.extend(rx.try_iter());
        (outcome, events)
    }

    fn quiet_gate() -> AlertGate {
        AlertGate::new(Box::new(NullSound), Box::new(NullNotifier))
    }

    // --- Tests ---

    #[test]
    fn test_cancellation_stops_the_loop() {
        let loop_ = InferenceLoop::new(Duration::ZERO, 0.8, 3);
        let mut camera = StubCamera::ok();
        let classifier = ScriptedClassifier::constant(0.0);
        let (outcome, _) = run_cycles(&loop_, &mut camera, &classifier, &mut quiet_gate(), 5);
        assert_eq!(outcome, InferenceOutcome::Cancelled);
    }

    #[test]
    fn test_pre_cancelled_loop_runs_zero_cycles() {
        let loop_ = InferenceLoop::new(Duration::ZERO, 0.8, 3);
        let mut camera = StubCamera::ok();
        let classifier = ScriptedClassifier::constant(0.9);
        let mut gate = quiet_gate();
        let (tx, rx) = crossbeam_channel::unbounded();
        let outcome = loop_.run(
            &mut camera,
            &mut StubExtractor,
            &classifier,
            &mut gate,
            &AtomicBool::new(true),
            &AtomicBool::new(false),
            &tx,
        );
        drop(tx);
        assert_eq!(outcome, InferenceOutcome::Cancelled);
        let events: Vec<SessionEvent> = rx.iter().collect();
        assert_eq!(events, vec![SessionEvent::InferenceStopped]);
        assert_eq!(camera.served, 0);
    }

    #[test]
    fn test_confidence_exactly_at_threshold_is_not_a_touch() {
        let loop_ = InferenceLoop::new(Duration::ZERO, 0.8, 3);
        let mut camera = StubCamera::ok();
        let classifier = ScriptedClassifier::constant(0.8);
        let (_, events) = run_cycles(&loop_, &mut camera, &classifier, &mut quiet_gate(), 3);

        for event in &events {
            if let SessionEvent::Touched { touching, .. } = event {
                assert!(!touching, "0.8 must not exceed a 0.8 threshold");
            }
        }
    }

    #[test]
    fn test_confidence_above_threshold_is_a_touch() {
        let loop_ = InferenceLoop::new(Duration::ZERO, 0.8, 3);
        let mut camera = StubCamera::ok();
        let classifier = ScriptedClassifier::constant(0.81);
        let (_, events) = run_cycles(&loop_, &mut camera, &classifier, &mut quiet_gate(), 3);

        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::Touched { touching: true, .. })));
    }

    #[test]
    fn test_winning_not_touching_label_never_alerts() {
        // Even a high touch confidence does not alert when the predicted
        // label is NotTouching.
        let loop_ = InferenceLoop::new(Duration::ZERO, 0.3, 3);
        let mut camera = StubCamera::ok();
        let classifier = ScriptedClassifier::constant(0.4); // label NotTouching
        let (_, events) = run_cycles(&loop_, &mut camera, &classifier, &mut quiet_gate(), 3);
        for event in &events {
            if let SessionEvent::Touched { touching, .. } = event {
                assert!(!touching);
            }
        }
    }

    #[test]
    fn test_cycles_are_strictly_sequential() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let loop_ = InferenceLoop::new(Duration::ZERO, 0.5, 3);
        let mut camera = StubCamera {
            served: 0,
            fail_from: None,
            log: Some(log.clone()),
        };
        let classifier = ScriptedClassifier {
            confidences: vec![0.9],
            calls: Mutex::new(0),
            log: Some(log.clone()),
        };
        let mut gate = AlertGate::new(
            Box::new(NullSound),
            Box::new(LoggingNotifier { log: log.clone() }),
        );

        run_cycles(&loop_, &mut camera, &classifier, &mut gate, 4);

        // Every cycle is capture -> predict -> notify before the next
        // capture begins; interleaving would break the triplet pattern.
        let log = log.lock().unwrap();
        for (i, chunk) in log.chunks(3).enumerate() {
            if chunk.len() < 3 {
                break;
            }
            assert_eq!(chunk[0], format!("capture {i}"));
            assert_eq!(chunk[1], format!("predict {i}"));
            assert_eq!(chunk[2], "notify");
        }
    }

    #[test]
    fn test_single_failure_is_absorbed_as_not_touching() {
        let loop_ = InferenceLoop::new(Duration::ZERO, 0.8, 3);
        // Fails on the first capture only.
        struct OneDropCamera {
            served: u64,
        }
        impl CameraSource for OneDropCamera {
            fn acquire(&mut self) -> Result<(), SessionError> {
                Ok(())
            }
            fn frame(&mut self) -> Result<Frame, SessionError> {
                let index = self.served;
                self.served += 1;
                if index == 0 {
                    Err(SessionError::NoFrame("dropout".into()))
                } else {
                    Ok(Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, index))
                }
            }
            fn release(&mut self) {}
        }

        let mut camera = OneDropCamera { served: 0 };
        let classifier = ScriptedClassifier::constant(0.95);
        let (outcome, events) = run_cycles(&loop_, &mut camera, &classifier, &mut quiet_gate(), 3);

        assert_eq!(outcome, InferenceOutcome::Cancelled);
        // First cycle fail-open: touched=false. Later cycles report touch.
        let touches: Vec<bool> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Touched { touching, .. } => Some(*touching),
                _ => None,
            })
            .collect();
        assert_eq!(touches[0], false);
        assert!(touches[1..].iter().all(|t| *t));
    }

    #[test]
    fn test_three_consecutive_failures_degrade() {
        let loop_ = InferenceLoop::new(Duration::ZERO, 0.8, 3);
        let mut camera = StubCamera {
            served: 0,
            fail_from: Some(0),
            log: None,
        };
        let classifier = ScriptedClassifier::constant(0.9);
        let mut gate = quiet_gate();
        let (tx, rx) = crossbeam_channel::unbounded();
        let outcome = loop_.run(
            &mut camera,
            &mut StubExtractor,
            &classifier,
            &mut gate,
            &AtomicBool::new(false),
            &AtomicBool::new(false),
            &tx,
        );
        drop(tx);

        assert_eq!(outcome, InferenceOutcome::Degraded { consecutive: 3 });
        let events: Vec<SessionEvent> = rx.iter().collect();
        assert!(events.contains(&SessionEvent::InferenceDegraded { consecutive: 3 }));
        // Two absorbed cycles before the third failure stopped the loop.
        let touched_events = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Touched { .. }))
            .count();
        assert_eq!(touched_events, 2);
    }

    #[test]
    fn test_failure_counter_resets_on_success() {
        // fail, fail, ok, fail, fail, ok, ... never reaches three in a row.
        struct AlternatingCamera {
            served: u64,
        }
        impl CameraSource for AlternatingCamera {
            fn acquire(&mut self) -> Result<(), SessionError> {
                Ok(())
            }
            fn frame(&mut self) -> Result<Frame, SessionError> {
                let index = self.served;
                self.served += 1;
                if index % 3 == 2 {
                    Ok(Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, index))
                } else {
                    Err(SessionError::NoFrame("dropout".into()))
                }
            }
            fn release(&mut self) {}
        }

        let loop_ = InferenceLoop::new(Duration::ZERO, 0.8, 3);
        let mut camera = AlternatingCamera { served: 0 };
        let classifier = ScriptedClassifier::constant(0.1);
        let (outcome, _) = run_cycles(&loop_, &mut camera, &classifier, &mut quiet_gate(), 9);
        assert_eq!(outcome, InferenceOutcome::Cancelled);
    }
}
