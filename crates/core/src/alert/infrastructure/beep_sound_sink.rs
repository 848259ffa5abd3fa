use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rodio::source::SineWave;
use rodio::{OutputStream, Sink, Source};

use crate::alert::domain::sound_sink::{CompletionFn, SoundSink};

const BEEP_FREQUENCY_HZ: f32 = 880.0;
const BEEP_DURATION_MS: u64 = 600;

/// Alert tone through the default audio output.
///
/// The tone is a synthesized sine burst, so no sound asset ships with the
/// binary. The output stream opens lazily on first play; a machine without
/// an audio device surfaces the error to the gate, which logs and moves on.
pub struct BeepSoundSink {
    stream: Option<OutputStream>,
    current: Option<Arc<Sink>>,
}

impl BeepSoundSink {
    pub fn new() -> Self {
        Self {
            stream: None,
            current: None,
        }
    }

}

impl Default for BeepSoundSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundSink for BeepSoundSink {
    fn play(&mut self, on_complete: CompletionFn) -> Result<(), Box<dyn std::error::Error>> {
        if self.stream.is_none() {
            self.stream = Some(rodio::OutputStreamBuilder::open_default_stream()?);
        }
        let stream = self
            .stream
            .as_ref()
            .ok_or("audio output stream unavailable")?;
        let sink = Arc::new(Sink::connect_new(stream.mixer()));
        sink.append(
            SineWave::new(BEEP_FREQUENCY_HZ)
                .take_duration(Duration::from_millis(BEEP_DURATION_MS))
                .amplify(0.8),
        );

        // Completion fires from a watcher thread once the sink drains;
        // stop() empties the sink, so the callback also fires on stop.
        let watched = sink.clone();
        thread::spawn(move || {
            watched.sleep_until_end();
            on_complete();
        });

        self.current = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.current.take() {
            sink.stop();
        }
    }
}
