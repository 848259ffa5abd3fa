use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::alert::domain::notification_sink::NotificationSink;
use crate::alert::domain::sound_sink::SoundSink;

const NOTIFICATION_TITLE: &str = "Touch alert";
const NOTIFICATION_BODY: &str = "Your hand is on your face";

/// Externally-held switch for the gate's suppressed-output mode (e.g. the
/// browser tab went to the background). Cheap to clone and thread-safe.
#[derive(Clone)]
pub struct VisibilityHandle {
    active: Arc<AtomicBool>,
}

impl VisibilityHandle {
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

/// Converts the per-cycle touch signal into side effects without spamming
/// the user.
///
/// Level-triggered: every qualifying cycle attempts a notification (the sink
/// owns its own cooldown) and the touched signal is emitted unconditionally.
/// Sound is edge-gated by `can_play_sound`, which clears when playback starts
/// and sets again only when that playback instance reports completion, so a
/// held touch produces one beep per playback, not one per frame.
///
/// While output is suppressed (inactive visibility) no playback starts and
/// `can_play_sound` is left untouched; the next qualifying cycle after
/// reactivation plays normally.
pub struct AlertGate {
    sound: Box<dyn SoundSink>,
    notifier: Box<dyn NotificationSink>,
    can_play_sound: Arc<AtomicBool>,
    tab_active: Arc<AtomicBool>,
}

impl AlertGate {
    pub fn new(sound: Box<dyn SoundSink>, notifier: Box<dyn NotificationSink>) -> Self {
        Self {
            sound,
            notifier,
            can_play_sound: Arc::new(AtomicBool::new(true)),
            tab_active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle over the suppressed-output switch, for the embedding UI.
    pub fn visibility_handle(&self) -> VisibilityHandle {
        VisibilityHandle {
            active: self.tab_active.clone(),
        }
    }

    /// Process one inference cycle's verdict. Returns the UI-facing touched
    /// signal, which is never gated.
    pub fn handle(&mut self, is_touch: bool) -> bool {
        if !is_touch {
            return false;
        }

        self.notifier.notify(NOTIFICATION_TITLE, NOTIFICATION_BODY);

        if self.can_play_sound.load(Ordering::Acquire) && self.tab_active.load(Ordering::Relaxed) {
            self.can_play_sound.store(false, Ordering::Release);
            let flag = self.can_play_sound.clone();
            if let Err(e) = self.sound.play(Box::new(move || {
                flag.store(true, Ordering::Release);
            })) {
                log::warn!("alert sound failed to start: {e}");
                self.can_play_sound.store(true, Ordering::Release);
            }
        }

        true
    }

    /// Stop any in-flight sound. Used during session shutdown.
    pub fn release(&mut self) {
        self.sound.stop();
    }
}
