use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::capture::domain::camera_source::CameraSource;
use crate::model::domain::embedding_extractor::EmbeddingExtractor;
use crate::model::domain::incremental_classifier::IncrementalClassifier;
use crate::session::event::SessionEvent;
use crate::shared::label::Label;

/// How one training run ended. `submitted` counts examples the classifier
/// accepted; they are never rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingOutcome {
    Completed { submitted: usize },
    Cancelled { submitted: usize },
    Failed { submitted: usize, reason: String },
}

/// Collects a fixed number of labeled examples for one label at a fixed
/// sampling cadence, reporting integer percent progress after each sample.
///
/// Samples are captured and submitted strictly in order, one at a time.
/// Cancellation is checked at the top of each sample, so a cancelled run
/// finishes its in-flight sample and submits nothing twice. The inter-sample
/// wait is a scheduling delay on the worker thread; the controller thread
/// stays free.
pub struct TrainingSession {
    sample_count: usize,
    sampling_interval: Duration,
}

impl TrainingSession {
    pub fn new(sample_count: usize, sampling_interval: Duration) -> Self {
        Self {
            sample_count: sample_count.max(1),
            sampling_interval,
        }
    }

    pub fn run(
        &self,
        label: Label,
        camera: &mut dyn CameraSource,
        extractor: &mut dyn EmbeddingExtractor,
        classifier: &mut dyn IncrementalClassifier,
        cancelled: &AtomicBool,
        progress: &AtomicU8,
        events: &Sender<SessionEvent>,
    ) -> TrainingOutcome {
        let n = self.sample_count;
        let mut submitted = 0;

        for i in 0..n {
            if cancelled.load(Ordering::Relaxed) {
                log::info!("training '{label}' cancelled after {submitted} samples");
                let _ = events.send(SessionEvent::TrainingCancelled { label, submitted });
                return TrainingOutcome::Cancelled { submitted };
            }

            let sample = camera.frame().and_then(|frame| extractor.embed(&frame));
            let embedding = match sample {
                Ok(embedding) => embedding,
                // No retry: a single failed capture aborts the run.
                Err(e) => {
                    let reason = e.to_string();
                    log::warn!("training '{label}' aborted at sample {}: {reason}", i + 1);
                    let _ = events.send(SessionEvent::TrainingFailed {
                        label,
                        submitted,
                        reason: reason.clone(),
                    });
                    return TrainingOutcome::Failed { submitted, reason };
                }
            };

            classifier.add_example(embedding, label);
            submitted = i + 1;

            let percent = ((submitted as f64 / n as f64) * 100.0).round() as u8;
            progress.store(percent, Ordering::Relaxed);
            let _ = events.send(SessionEvent::TrainingProgress { label, percent });

            if submitted < n {
                thread::sleep(self.sampling_interval);
            }
        }

        log::info!("training '{label}' completed: {submitted} samples");
        let _ = events.send(SessionEvent::TrainingCompleted { label, submitted });
        TrainingOutcome::Completed { submitted }
    }
}
