use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::backend::{CameraBackend, MediaStream, RenderTarget, VideoConstraints};
use crate::session::{EventSender, SessionEvent};

/// Camera lifecycle as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraState {
    /// No stream held or requested
    Idle,
    /// Waiting for the permission request to resolve
    Acquiring,
    /// Stream held; `attached` once the render target shows it
    Active { attached: bool },
}

/// Result of a finished readiness poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    /// Retry budget exhausted; the stream was released
    TimedOut,
    /// The poll belonged to a stream that is already gone
    Stale,
}

/// Owns the camera stream and its acquisition/attach helper tasks
pub struct CameraController {
    backend: Arc<dyn CameraBackend>,
    render_target: Arc<dyn RenderTarget>,
    constraints: VideoConstraints,
    poll_interval: Duration,
    max_attach_attempts: u32,
    events: EventSender,

    state: CameraState,
    /// Incremented on every start so late grants can be recognised
    attempt: u64,
    stream: Option<Box<dyn MediaStream>>,
    acquire_task: Option<JoinHandle<()>>,
    attach_task: Option<JoinHandle<()>>,
}

impl CameraController {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        render_target: Arc<dyn RenderTarget>,
        constraints: VideoConstraints,
        poll_interval: Duration,
        max_attach_attempts: u32,
        events: EventSender,
    ) -> Self {
        Self {
            backend,
            render_target,
            constraints,
            poll_interval,
            max_attach_attempts: max_attach_attempts.max(1),
            events,
            state: CameraState::Idle,
            attempt: 0,
            stream: None,
            acquire_task: None,
            attach_task: None,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, CameraState::Active { .. })
    }

    /// Request the camera
    ///
    /// Returns false when a request is already pending or a stream is held.
    pub fn start(&mut self) -> bool {
        if self.state != CameraState::Idle {
            warn!("Camera already {:?}, ignoring start", self.state);
            return false;
        }

        self.attempt += 1;
        let attempt = self.attempt;
        info!(
            "Requesting camera stream from {} (attempt {})",
            self.backend.name(),
            attempt
        );

        let backend = Arc::clone(&self.backend);
        let constraints = self.constraints.clone();
        let events = self.events.clone();

        self.acquire_task = Some(tokio::spawn(async move {
            let event = match backend.request_stream(&constraints).await {
                Ok(stream) => SessionEvent::CameraGranted { attempt, stream },
                Err(e) => SessionEvent::CameraDenied {
                    attempt,
                    reason: format!("{:#}", e),
                },
            };

            // A closed channel means the session is gone; dropping the event
            // drops the stream with it.
            if let Err(e) = events.send(event) {
                if let SessionEvent::CameraGranted { mut stream, .. } = e.0 {
                    stream.stop_tracks();
                }
            }
        }));

        self.state = CameraState::Acquiring;
        true
    }

    /// Take ownership of a granted stream and start attaching it
    ///
    /// Returns false when the grant belongs to a cancelled request, in which
    /// case its tracks are stopped right away.
    pub fn on_granted(&mut self, attempt: u64, mut stream: Box<dyn MediaStream>) -> bool {
        if attempt != self.attempt || self.state != CameraState::Acquiring {
            warn!(
                "Releasing late camera stream {} (attempt {}, current {})",
                stream.id(),
                attempt,
                self.attempt
            );
            stream.stop_tracks();
            return false;
        }

        self.acquire_task = None;
        info!("Camera stream {} granted", stream.id());

        let stream_id = stream.id().to_string();
        self.stream = Some(stream);
        self.state = CameraState::Active { attached: false };

        let target = Arc::clone(&self.render_target);
        let events = self.events.clone();
        let interval = self.poll_interval;
        let max_attempts = self.max_attach_attempts;

        self.attach_task = Some(tokio::spawn(async move {
            let attached = attach_when_ready(target, &stream_id, interval, max_attempts).await;
            let _ = events.send(SessionEvent::CameraAttachFinished { attempt, attached });
        }));

        true
    }

    /// Returns true when the denial concerns the pending request
    pub fn on_denied(&mut self, attempt: u64, reason: &str) -> bool {
        if attempt != self.attempt || self.state != CameraState::Acquiring {
            debug!("Ignoring stale camera denial (attempt {})", attempt);
            return false;
        }

        error!("Error accessing camera: {}", reason);
        self.acquire_task = None;
        self.state = CameraState::Idle;
        true
    }

    pub fn on_attach_finished(&mut self, attempt: u64, attached: bool) -> AttachOutcome {
        if attempt != self.attempt || !self.is_active() {
            return AttachOutcome::Stale;
        }

        self.attach_task = None;

        if attached {
            info!("Camera stream attached to render target");
            self.state = CameraState::Active { attached: true };
            AttachOutcome::Attached
        } else {
            warn!(
                "Render target never became ready after {} checks, releasing camera",
                self.max_attach_attempts
            );
            self.stop();
            AttachOutcome::TimedOut
        }
    }

    /// Release the camera
    ///
    /// Idempotent: returns false if nothing was held or pending.
    pub fn stop(&mut self) -> bool {
        if let Some(task) = self.acquire_task.take() {
            task.abort();
        }
        if let Some(task) = self.attach_task.take() {
            task.abort();
        }

        let was_idle = self.state == CameraState::Idle;
        self.state = CameraState::Idle;

        match self.stream.take() {
            Some(mut stream) => {
                self.render_target.detach();
                stream.stop_tracks();
                info!("Camera stream {} stopped", stream.id());
                true
            }
            None => {
                if !was_idle {
                    info!("Camera request cancelled");
                }
                !was_idle
            }
        }
    }
}

/// Poll the render target until it accepts the stream
///
/// Gives up after `max_attempts` checks, `interval` apart.
pub async fn attach_when_ready(
    target: Arc<dyn RenderTarget>,
    stream_id: &str,
    interval: Duration,
    max_attempts: u32,
) -> bool {
    for check in 1..=max_attempts {
        match target.try_attach(stream_id) {
            Ok(true) => {
                debug!("Render target ready after {} checks", check);
                return true;
            }
            Ok(false) => {}
            Err(e) => warn!("Failed to attach camera stream: {:#}", e),
        }

        if check < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }

    false
}
