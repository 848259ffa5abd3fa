/// Completion callback, invoked exactly once per successful `play`.
pub type CompletionFn = Box<dyn FnOnce() + Send>;

/// Domain interface for alert sound playback.
///
/// Playback is asynchronous: `play` returns once the sound has started and
/// `on_complete` fires from the playback side when it ends (or is stopped).
/// A failed start is absorbed by the caller, never propagated.
pub trait SoundSink: Send {
    fn play(&mut self, on_complete: CompletionFn) -> Result<(), Box<dyn std::error::Error>>;

    /// Cut any in-flight playback short. The pending completion callback
    /// still fires.
    fn stop(&mut self);
}
