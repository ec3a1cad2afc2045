use anyhow::Result;
use futures::stream::BoxStream;

use crate::transcript::RecognitionEvent;

/// Requested camera format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    /// "user" for the front camera, "environment" for the rear one
    pub facing_mode: String,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            facing_mode: "user".to_string(),
        }
    }
}

/// Speech recognition session options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// Keep listening across pauses instead of stopping after one utterance
    pub continuous: bool,
    /// Deliver hypotheses before a segment is final
    pub interim_results: bool,
    pub language: String,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            language: "en-US".to_string(),
        }
    }
}

/// What a running recognizer reports
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionSignal {
    /// Cumulative results for the session so far
    Result(RecognitionEvent),
    /// The recognizer failed and has stopped listening
    Error(String),
    /// The result stream ended without an error
    Ended,
}

/// A granted camera stream
///
/// Holding one keeps the device busy for other applications until
/// `stop_tracks` is called.
pub trait MediaStream: Send + Sync {
    fn id(&self) -> &str;

    /// Halt every underlying media track
    fn stop_tracks(&mut self);
}

/// Camera capture backend trait
#[async_trait::async_trait]
pub trait CameraBackend: Send + Sync {
    /// Ask the platform for a video stream
    ///
    /// Resolves once the user or platform grants or rejects the request.
    async fn request_stream(&self, constraints: &VideoConstraints) -> Result<Box<dyn MediaStream>>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Surface that displays the camera stream
///
/// It is mounted independently of the stream being granted, so attaching
/// may have to wait for it.
pub trait RenderTarget: Send + Sync {
    /// Attach the stream if the surface exists
    ///
    /// Returns `Ok(false)` while the surface is not mounted yet.
    fn try_attach(&self, stream_id: &str) -> Result<bool>;

    /// Remove whatever stream is attached
    fn detach(&self);
}

/// Speech recognition backend trait
#[async_trait::async_trait]
pub trait RecognitionBackend: Send + Sync {
    /// Start listening
    ///
    /// Returns a stream of recognition signals that ends when the recognizer stops.
    async fn start(
        &mut self,
        options: &RecognitionOptions,
    ) -> Result<BoxStream<'static, RecognitionSignal>>;

    /// Stop listening
    fn stop(&mut self);

    /// Get backend name for logging
    fn name(&self) -> &str;
}
