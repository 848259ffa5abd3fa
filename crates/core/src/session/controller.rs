use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::alert::alert_gate::{AlertGate, VisibilityHandle};
use crate::capture::domain::camera_source::CameraSource;
use crate::model::domain::embedding_extractor::EmbeddingExtractor;
use crate::model::domain::incremental_classifier::IncrementalClassifier;
use crate::session::event::SessionEvent;
use crate::session::inference_loop::InferenceLoop;
use crate::session::state::SessionState;
use crate::session::training_session::TrainingSession;
use crate::shared::config::SessionConfig;
use crate::shared::constants::MAX_CONSECUTIVE_CYCLE_FAILURES;
use crate::shared::error::SessionError;
use crate::shared::label::Label;

/// Everything a sub-mode needs, bundled so ownership can move to a worker
/// thread and back. Exactly one of {controller, worker} holds the rig at any
/// moment, which is what makes train-during-predict races unrepresentable.
struct SessionRig {
    camera: Box<dyn CameraSource>,
    extractor: Box<dyn EmbeddingExtractor>,
    classifier: Box<dyn IncrementalClassifier>,
    gate: AlertGate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModeKind {
    Training(Label),
    Inferring,
}

struct ActiveWorker {
    kind: ModeKind,
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<SessionRig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Initializing,
    Ready,
    ShuttingDown,
    Terminated,
}

/// Owns the session lifecycle: initialization, the two sub-modes, and
/// teardown.
///
/// Every entry point returns promptly. Training and inference run on a
/// spawned worker thread that takes the rig with it and hands it back when it
/// exits; while a worker holds the rig, requests for the other sub-mode are
/// rejected (or, for inference interrupted by training, cancelled and joined
/// first). Progress and the touched signal are published through shared
/// atomics, larger happenings through the event channel.
pub struct SessionController {
    config: SessionConfig,
    phase: Phase,
    rig: Option<SessionRig>,
    active: Option<ActiveWorker>,
    visibility: VisibilityHandle,
    progress: Arc<AtomicU8>,
    touched: Arc<AtomicBool>,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    observed: bool,
}

impl SessionController {
    pub fn new(
        camera: Box<dyn CameraSource>,
        extractor: Box<dyn EmbeddingExtractor>,
        classifier: Box<dyn IncrementalClassifier>,
        gate: AlertGate,
        config: SessionConfig,
    ) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let visibility = gate.visibility_handle();
        Self {
            config,
            phase: Phase::Uninitialized,
            rig: Some(SessionRig {
                camera,
                extractor,
                classifier,
                gate,
            }),
            active: None,
            visibility,
            progress: Arc::new(AtomicU8::new(0)),
            touched: Arc::new(AtomicBool::new(false)),
            events_tx,
            events_rx,
            observed: false,
        }
    }

    /// Stream of session events. The channel is unbounded; whoever takes a
    /// receiver must drain it. Until the first call here, the controller
    /// discards buffered events whenever it is invoked, so an embedder that
    /// only polls `state()`/`touched()` does not accumulate a backlog.
    pub fn events(&mut self) -> Receiver<SessionEvent> {
        self.observed = true;
        self.events_rx.clone()
    }

    /// Switch for suppressing audible output while the hosting surface is in
    /// the background.
    pub fn visibility_handle(&self) -> VisibilityHandle {
        self.visibility.clone()
    }

    /// Latest inference verdict, false whenever inference is not running.
    pub fn touched(&self) -> bool {
        self.touched.load(Ordering::Relaxed)
    }

    /// Acquire the camera, verify it delivers frames, and warm up the
    /// embedding model. Idempotent once ready; a failure rolls everything
    /// back to uninitialized so the call can be retried.
    pub fn initialize(&mut self) -> Result<(), SessionError> {
        self.reap_finished();
        match self.phase {
            Phase::Terminated | Phase::ShuttingDown => return Err(SessionError::SessionClosed),
            Phase::Ready => return Ok(()),
            Phase::Uninitialized | Phase::Initializing => {}
        }

        // Initializing spans the acquire/probe/load sequence; any failure
        // reverts to Uninitialized so the call can be retried.
        self.phase = Phase::Initializing;
        if let Err(e) = self.acquire_and_prepare() {
            self.phase = Phase::Uninitialized;
            return Err(e);
        }
        self.phase = Phase::Ready;
        log::info!("session initialized");
        Ok(())
    }

    fn acquire_and_prepare(&mut self) -> Result<(), SessionError> {
        let rig = self.rig.as_mut().ok_or(SessionError::SessionClosed)?;

        rig.camera.acquire()?;

        // Probe frame: an acquired camera that cannot deliver is as useless
        // as one that failed to open.
        if let Err(e) = rig.camera.frame() {
            rig.camera.release();
            return Err(SessionError::CameraUnavailable(e.to_string()));
        }

        if let Err(e) = rig.extractor.prepare() {
            rig.camera.release();
            return Err(e);
        }
        Ok(())
    }

    /// Replace the tuning knobs, then initialize. Rejected while a sub-mode
    /// is active so in-flight runs keep the parameters they started with.
    pub fn initialize_with(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        self.reap_finished();
        if self.active.is_some() {
            return Err(SessionError::SessionBusy("session is busy"));
        }
        self.config = config;
        self.initialize()
    }

    /// Collect a batch of labeled examples for `label` on a worker thread.
    ///
    /// Interrupts a running inference loop first; a concurrent training run
    /// is rejected instead.
    pub fn start_training(&mut self, label: Label) -> Result<(), SessionError> {
        self.reap_finished();
        if self.phase == Phase::Terminated {
            return Err(SessionError::SessionClosed);
        }
        match self.active.as_ref().map(|a| a.kind) {
            Some(ModeKind::Training(_)) => {
                return Err(SessionError::SessionBusy("training already in progress"));
            }
            Some(ModeKind::Inferring) => self.cancel_and_join(),
            None => {}
        }
        if self.phase != Phase::Ready {
            return Err(SessionError::SessionBusy("session not initialized"));
        }
        let mut rig = self.rig.take().ok_or(SessionError::SessionClosed)?;

        let session = TrainingSession::new(
            self.config.training_sample_count,
            Duration::from_millis(self.config.sampling_interval_ms),
        );
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = cancelled.clone();
        let progress = self.progress.clone();
        progress.store(0, Ordering::Relaxed);
        let events = self.events_tx.clone();

        log::info!("training started for label '{label}'");
        let handle = thread::spawn(move || {
            session.run(
                label,
                &mut *rig.camera,
                &mut *rig.extractor,
                &mut *rig.classifier,
                &worker_cancelled,
                &progress,
                &events,
            );
            rig
        });
        self.active = Some(ActiveWorker {
            kind: ModeKind::Training(label),
            cancelled,
            handle,
        });
        Ok(())
    }

    /// Start the continuous predict-and-react loop on a worker thread.
    ///
    /// A no-op when the loop is already running. Rejected synchronously when
    /// the classifier holds no examples yet, leaving the session ready.
    pub fn start_inference(&mut self) -> Result<(), SessionError> {
        self.reap_finished();
        if self.phase == Phase::Terminated {
            return Err(SessionError::SessionClosed);
        }
        match self.active.as_ref().map(|a| a.kind) {
            Some(ModeKind::Training(_)) => {
                return Err(SessionError::SessionBusy("training in progress"));
            }
            Some(ModeKind::Inferring) => return Ok(()),
            None => {}
        }
        if self.phase != Phase::Ready {
            return Err(SessionError::SessionBusy("session not initialized"));
        }
        let mut rig = self.rig.take().ok_or(SessionError::SessionClosed)?;

        if rig.classifier.example_count() == 0 {
            self.rig = Some(rig);
            return Err(SessionError::NotTrained);
        }

        let inference = InferenceLoop::new(
            Duration::from_millis(self.config.inference_interval_ms),
            self.config.touch_confidence_threshold,
            MAX_CONSECUTIVE_CYCLE_FAILURES,
        );
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = cancelled.clone();
        let touched = self.touched.clone();
        let events = self.events_tx.clone();

        log::info!("inference started");
        let handle = thread::spawn(move || {
            inference.run(
                &mut *rig.camera,
                &mut *rig.extractor,
                &*rig.classifier,
                &mut rig.gate,
                &worker_cancelled,
                &touched,
                &events,
            );
            rig
        });
        self.active = Some(ActiveWorker {
            kind: ModeKind::Inferring,
            cancelled,
            handle,
        });
        Ok(())
    }

    /// Cancel whichever sub-mode is running and wait for it to hand the rig
    /// back. A no-op when nothing runs.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.reap_finished();
        if self.phase == Phase::Terminated {
            return Err(SessionError::SessionClosed);
        }
        self.cancel_and_join();
        self.touched.store(false, Ordering::Relaxed);
        Ok(())
    }

    /// Tear the session down: cancel any sub-mode, silence the alert gate,
    /// release the camera. Idempotent; the camera is released exactly once.
    pub fn shutdown(&mut self) {
        if self.phase == Phase::Terminated {
            return;
        }
        self.cancel_and_join();
        self.touched.store(false, Ordering::Relaxed);
        let camera_acquired = self.phase == Phase::Ready;
        self.phase = Phase::ShuttingDown;
        if let Some(mut rig) = self.rig.take() {
            rig.gate.release();
            if camera_acquired {
                rig.camera.release();
            }
        }
        self.phase = Phase::Terminated;
        log::info!("session terminated");
    }

    pub fn state(&mut self) -> SessionState {
        self.reap_finished();
        if let Some(active) = &self.active {
            return match active.kind {
                ModeKind::Training(label) => SessionState::Training {
                    label,
                    progress: self.progress.load(Ordering::Relaxed),
                },
                ModeKind::Inferring => SessionState::Inferring,
            };
        }
        match self.phase {
            Phase::Uninitialized => SessionState::Uninitialized,
            Phase::Initializing => SessionState::Initializing,
            Phase::Ready => SessionState::Ready,
            Phase::ShuttingDown => SessionState::ShuttingDown,
            Phase::Terminated => SessionState::Terminated,
        }
    }

    /// Reclaim the rig from a worker that exited on its own (training ran to
    /// completion, or the inference loop degraded).
    fn reap_finished(&mut self) {
        if !self.observed {
            while self.events_rx.try_recv().is_ok() {}
        }
        let finished = self
            .active
            .as_ref()
            .map(|a| a.handle.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }
        if let Some(active) = self.active.take() {
            self.join_worker(active);
        }
    }

    fn cancel_and_join(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancelled.store(true, Ordering::Relaxed);
            self.join_worker(active);
        }
    }

    fn join_worker(&mut self, active: ActiveWorker) {
        match active.handle.join() {
            Ok(rig) => self.rig = Some(rig),
            Err(_) => {
                // The rig died with the panicking worker; nothing left to
                // run a session with.
                log::error!("session worker panicked; terminating session");
                self.phase = Phase::Terminated;
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
