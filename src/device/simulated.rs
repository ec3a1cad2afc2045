//! In-process device backends
//!
//! Stand-ins for the platform camera, video surface and speech recognizer,
//! used for headless runs and tests. Each comes with a cloneable probe that
//! exposes what the session did to it.

use anyhow::{bail, Result};
use futures::channel::mpsc;
use futures::stream::{BoxStream, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::backend::{
    CameraBackend, MediaStream, RecognitionBackend, RecognitionOptions, RecognitionSignal,
    RenderTarget, VideoConstraints,
};
use crate::transcript::{RecognitionEvent, RecognitionResult};

/// Counters shared between a `SimulatedCamera` and the test observing it
#[derive(Debug, Clone, Default)]
pub struct CameraProbe {
    requests: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
    track_stops: Arc<AtomicUsize>,
}

impl CameraProbe {
    /// Permission requests made
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Streams granted and not yet stopped
    pub fn live_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Calls to `stop_tracks`, including repeated ones
    pub fn track_stops(&self) -> usize {
        self.track_stops.load(Ordering::SeqCst)
    }
}

pub struct SimulatedCamera {
    probe: CameraProbe,
    deny_with: Option<String>,
    grant_delay: Duration,
}

impl SimulatedCamera {
    pub fn new() -> Self {
        Self {
            probe: CameraProbe::default(),
            deny_with: None,
            grant_delay: Duration::ZERO,
        }
    }

    /// Reject every permission request with `reason`
    pub fn denying(mut self, reason: impl Into<String>) -> Self {
        self.deny_with = Some(reason.into());
        self
    }

    /// Resolve permission requests only after `delay`
    pub fn with_grant_delay(mut self, delay: Duration) -> Self {
        self.grant_delay = delay;
        self
    }

    pub fn probe(&self) -> CameraProbe {
        self.probe.clone()
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CameraBackend for SimulatedCamera {
    async fn request_stream(&self, constraints: &VideoConstraints) -> Result<Box<dyn MediaStream>> {
        let request = self.probe.requests.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.grant_delay.is_zero() {
            tokio::time::sleep(self.grant_delay).await;
        }

        if let Some(reason) = &self.deny_with {
            bail!("{}", reason);
        }

        self.probe.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimulatedStream {
            id: format!(
                "sim-camera-{}-{}x{}",
                request, constraints.width, constraints.height
            ),
            probe: self.probe.clone(),
            stopped: false,
        }))
    }

    fn name(&self) -> &str {
        "simulated-camera"
    }
}

struct SimulatedStream {
    id: String,
    probe: CameraProbe,
    stopped: bool,
}

impl MediaStream for SimulatedStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop_tracks(&mut self) {
        self.probe.track_stops.fetch_add(1, Ordering::SeqCst);
        if !self.stopped {
            self.stopped = true;
            self.probe.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Video surface that can be mounted after the stream is granted
#[derive(Debug, Default)]
pub struct SimulatedRenderTarget {
    mounted: AtomicBool,
    checks: AtomicUsize,
    attaches: AtomicUsize,
    detaches: AtomicUsize,
}

impl SimulatedRenderTarget {
    pub fn mounted() -> Self {
        let target = Self::default();
        target.mount();
        target
    }

    pub fn unmounted() -> Self {
        Self::default()
    }

    pub fn mount(&self) {
        self.mounted.store(true, Ordering::SeqCst);
    }

    /// Readiness checks received
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn attaches(&self) -> usize {
        self.attaches.load(Ordering::SeqCst)
    }

    pub fn detaches(&self) -> usize {
        self.detaches.load(Ordering::SeqCst)
    }
}

impl RenderTarget for SimulatedRenderTarget {
    fn try_attach(&self, _stream_id: &str) -> Result<bool> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if !self.mounted.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.attaches.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn detach(&self) {
        self.detaches.fetch_add(1, Ordering::SeqCst);
    }
}

/// Handle for driving a `SimulatedRecognizer` from outside
#[derive(Debug, Clone, Default)]
pub struct RecognizerFeed {
    sender: Arc<Mutex<Option<mpsc::UnboundedSender<RecognitionSignal>>>>,
    refusal: Arc<Mutex<Option<String>>>,
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl RecognizerFeed {
    /// Deliver a recognition event; false if the recognizer is not listening
    pub fn emit(&self, event: RecognitionEvent) -> bool {
        self.send(RecognitionSignal::Result(event))
    }

    /// Deliver a single final segment containing `text`
    pub fn say(&self, text: &str) -> bool {
        self.emit(RecognitionEvent::new(vec![RecognitionResult::finalized(
            text, 0.9,
        )]))
    }

    /// Report a runtime failure and stop listening
    pub fn fail(&self, reason: &str) -> bool {
        let sent = self.send(RecognitionSignal::Error(reason.to_string()));
        if let Ok(mut slot) = self.sender.lock() {
            slot.take();
        }
        sent
    }

    /// End the result stream without an error, as a recognizer timing out on silence does
    pub fn end(&self) -> bool {
        match self.sender.lock() {
            Ok(mut slot) => slot.take().is_some(),
            Err(_) => false,
        }
    }

    /// Let later starts succeed, as when the user grants microphone access
    pub fn allow_start(&self) {
        if let Ok(mut refusal) = self.refusal.lock() {
            refusal.take();
        }
    }

    pub fn is_listening(&self) -> bool {
        self.sender
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Calls to `stop`, including repeated ones
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    fn send(&self, signal: RecognitionSignal) -> bool {
        match self.sender.lock() {
            Ok(slot) => slot
                .as_ref()
                .map(|sender| sender.unbounded_send(signal).is_ok())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    fn open(&self) -> mpsc::UnboundedReceiver<RecognitionSignal> {
        let (tx, rx) = mpsc::unbounded();
        if let Ok(mut slot) = self.sender.lock() {
            *slot = Some(tx);
        }
        rx
    }

    fn close(&self) {
        if let Ok(mut slot) = self.sender.lock() {
            slot.take();
        }
    }
}

pub struct SimulatedRecognizer {
    feed: RecognizerFeed,
}

impl SimulatedRecognizer {
    pub fn new() -> Self {
        Self {
            feed: RecognizerFeed::default(),
        }
    }

    /// Refuse to start, as when microphone access is denied
    pub fn refusing(self, reason: impl Into<String>) -> Self {
        if let Ok(mut refusal) = self.feed.refusal.lock() {
            *refusal = Some(reason.into());
        }
        self
    }

    pub fn feed(&self) -> RecognizerFeed {
        self.feed.clone()
    }
}

impl Default for SimulatedRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RecognitionBackend for SimulatedRecognizer {
    async fn start(
        &mut self,
        _options: &RecognitionOptions,
    ) -> Result<BoxStream<'static, RecognitionSignal>> {
        let refusal = self.feed.refusal.lock().ok().and_then(|r| r.clone());
        if let Some(reason) = refusal {
            bail!("{}", reason);
        }

        self.feed.starts.fetch_add(1, Ordering::SeqCst);
        Ok(self.feed.open().boxed())
    }

    fn stop(&mut self) {
        self.feed.stops.fetch_add(1, Ordering::SeqCst);
        self.feed.close();
    }

    fn name(&self) -> &str {
        "simulated-recognizer"
    }
}
