use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{Receiver, RecvTimeoutError};

use touchguard_core::alert::alert_gate::AlertGate;
use touchguard_core::alert::domain::sound_sink::SoundSink;
use touchguard_core::alert::infrastructure::beep_sound_sink::BeepSoundSink;
use touchguard_core::alert::infrastructure::cooldown_notifier::CooldownNotifier;
use touchguard_core::alert::infrastructure::log_notifier::LogNotifier;
use touchguard_core::alert::infrastructure::null_sinks::NullSoundSink;
use touchguard_core::capture::domain::camera_source::CameraSource;
use touchguard_core::capture::infrastructure::image_dir_camera::ImageDirCamera;
use touchguard_core::capture::infrastructure::synthetic_camera::SyntheticCamera;
use touchguard_core::model::infrastructure::knn_classifier::KnnClassifier;
use touchguard_core::model::infrastructure::onnx_embedding_extractor::OnnxEmbeddingExtractor;
use touchguard_core::session::controller::SessionController;
use touchguard_core::session::event::SessionEvent;
use touchguard_core::shared::config::SessionConfig;
use touchguard_core::shared::label::Label;

/// Webcam face-touch monitoring: train on your own posture, then get alerted
/// whenever your hand drifts to your face.
#[derive(Parser)]
#[command(name = "touchguard")]
struct Cli {
    /// Directory of frames to use instead of a live camera (played on loop).
    #[arg(long)]
    images: Option<PathBuf>,

    /// Directory holding a bundled embedding model, checked before the
    /// download cache.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Session configuration file (JSON); missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to pose before each training pass starts.
    #[arg(long, default_value = "3")]
    prep_seconds: u64,

    /// How long to monitor before exiting (0 = run until killed).
    #[arg(long, default_value = "60")]
    monitor_seconds: u64,

    /// Disable the alert beep.
    #[arg(long)]
    silent: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let cooldown = Duration::from_millis(config.notification_cooldown_ms);

    let camera: Box<dyn CameraSource> = match &cli.images {
        Some(dir) => Box::new(ImageDirCamera::new(dir)),
        None => Box::new(SyntheticCamera::default()),
    };
    let sound: Box<dyn SoundSink> = if cli.silent {
        Box::new(NullSoundSink)
    } else {
        Box::new(BeepSoundSink::new())
    };
    let notifier = CooldownNotifier::new(Box::new(LogNotifier), cooldown);

    let mut controller = SessionController::new(
        camera,
        Box::new(OnnxEmbeddingExtractor::new(cli.model_dir.clone())),
        Box::new(KnnClassifier::default()),
        AlertGate::new(sound, Box::new(notifier)),
        config,
    );
    let events = controller.events();

    eprintln!("Initializing camera and embedding model...");
    controller.initialize()?;

    train(&mut controller, &events, Label::NotTouching, cli.prep_seconds)?;
    train(&mut controller, &events, Label::Touching, cli.prep_seconds)?;

    monitor(&mut controller, &events, cli.monitor_seconds)?;

    controller.shutdown();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(SessionConfig::default()),
    }
}

fn train(
    controller: &mut SessionController,
    events: &Receiver<SessionEvent>,
    label: Label,
    prep_seconds: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    match label {
        Label::NotTouching => eprintln!("\nKeep your hands AWAY from your face."),
        Label::Touching => eprintln!("\nNow TOUCH your face and hold it."),
    }
    for remaining in (1..=prep_seconds).rev() {
        eprint!("\rStarting in {remaining}... ");
        thread::sleep(Duration::from_secs(1));
    }
    eprintln!();

    controller.start_training(label)?;
    loop {
        match events.recv_timeout(Duration::from_secs(10))? {
            SessionEvent::TrainingProgress { percent, .. } => {
                eprint!("\rCapturing '{label}' samples: {percent}%");
            }
            SessionEvent::TrainingCompleted { submitted, .. } => {
                eprintln!("\rCaptured {submitted} '{label}' samples.    ");
                log::info!("training for '{label}' completed with {submitted} samples");
                return Ok(());
            }
            SessionEvent::TrainingFailed { reason, .. } => {
                return Err(format!("training for '{label}' failed: {reason}").into());
            }
            SessionEvent::TrainingCancelled { .. } => {
                return Err(format!("training for '{label}' was cancelled").into());
            }
            _ => {}
        }
    }
}

fn monitor(
    controller: &mut SessionController,
    events: &Receiver<SessionEvent>,
    monitor_seconds: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("\nMonitoring. Touch your face to trigger an alert.");
    controller.start_inference()?;
    log::info!("monitoring started ({monitor_seconds}s window)");

    let deadline =
        (monitor_seconds > 0).then(|| Instant::now() + Duration::from_secs(monitor_seconds));
    let mut last_touching = false;

    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                break;
            }
        }
        match events.recv_timeout(Duration::from_millis(200)) {
            Ok(SessionEvent::Touched {
                touching,
                confidence,
            }) => {
                if touching != last_touching {
                    if touching {
                        eprintln!("TOUCH detected (confidence {confidence:.2})");
                    } else {
                        eprintln!("clear");
                    }
                    last_touching = touching;
                }
            }
            Ok(SessionEvent::InferenceDegraded { consecutive }) => {
                return Err(format!(
                    "camera stopped delivering frames ({consecutive} failed cycles)"
                )
                .into());
            }
            Ok(_) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    controller.stop()?;
    log::info!("monitoring finished");
    Ok(())
}
