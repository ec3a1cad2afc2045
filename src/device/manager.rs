use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::backend::{
    CameraBackend, MediaStream, RecognitionBackend, RecognitionOptions, RenderTarget,
    VideoConstraints,
};
use super::camera::{AttachOutcome, CameraController, CameraState};
use super::transcription::TranscriptionController;
use crate::config::DeviceConfig;
use crate::session::EventSender;

/// Device settings for one session
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    pub video: VideoConstraints,
    pub recognition: RecognitionOptions,
    pub attach_poll_interval: Duration,
    pub max_attach_attempts: u32,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self::from(&DeviceConfig::default())
    }
}

impl From<&DeviceConfig> for DeviceSettings {
    fn from(config: &DeviceConfig) -> Self {
        Self {
            video: VideoConstraints {
                width: config.video_width,
                height: config.video_height,
                facing_mode: config.facing_mode.clone(),
            },
            recognition: RecognitionOptions {
                continuous: true,
                interim_results: true,
                language: config.language.clone(),
            },
            attach_poll_interval: Duration::from_millis(config.attach_poll_interval_ms),
            max_attach_attempts: config.max_attach_attempts,
        }
    }
}

/// Platform backends handed to a session
pub struct DeviceBackends {
    pub camera: Arc<dyn CameraBackend>,
    pub render_target: Arc<dyn RenderTarget>,
    pub recognition: Box<dyn RecognitionBackend>,
}

/// Holds the camera and transcription handles for a session
///
/// The two lifecycles are independent; only `release_all` touches both.
pub struct DeviceManager {
    camera: CameraController,
    transcription: TranscriptionController,
    released: bool,
}

impl DeviceManager {
    pub fn new(backends: DeviceBackends, settings: DeviceSettings, events: EventSender) -> Self {
        let camera = CameraController::new(
            backends.camera,
            backends.render_target,
            settings.video,
            settings.attach_poll_interval,
            settings.max_attach_attempts,
            events.clone(),
        );
        let transcription =
            TranscriptionController::new(backends.recognition, settings.recognition, events);

        Self {
            camera,
            transcription,
            released: false,
        }
    }

    pub fn camera_state(&self) -> CameraState {
        self.camera.state()
    }

    pub fn is_transcribing(&self) -> bool {
        self.transcription.is_active()
    }

    pub fn start_camera(&mut self) -> bool {
        !self.released && self.camera.start()
    }

    pub fn stop_camera(&mut self) -> bool {
        self.camera.stop()
    }

    pub fn camera_granted(&mut self, attempt: u64, stream: Box<dyn MediaStream>) -> bool {
        self.camera.on_granted(attempt, stream)
    }

    pub fn camera_denied(&mut self, attempt: u64, reason: &str) -> bool {
        self.camera.on_denied(attempt, reason)
    }

    pub fn camera_attach_finished(&mut self, attempt: u64, attached: bool) -> AttachOutcome {
        self.camera.on_attach_finished(attempt, attached)
    }

    pub async fn start_transcription(&mut self, span: u64) -> Result<bool> {
        if self.released {
            return Ok(false);
        }
        self.transcription.start(span).await
    }

    pub fn stop_transcription(&mut self) -> bool {
        self.transcription.stop()
    }

    /// Release both devices
    ///
    /// Runs its body once; later calls return false.
    pub fn release_all(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;

        let camera = self.camera.stop();
        let transcription = self.transcription.stop();
        info!(
            "Device session released (camera held: {}, recognition active: {})",
            camera, transcription
        );
        true
    }
}
