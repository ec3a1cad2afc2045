//! Device resource management
//!
//! Camera and speech recognition each have their own start/stop lifecycle,
//! independent of the interview phase:
//! - `backend`: platform traits for camera, video surface and recognizer
//! - `camera`: permission request, readiness poll, idempotent release
//! - `transcription`: recognizer start/stop and event forwarding
//! - `manager`: both handles behind one release-once teardown
//! - `simulated`: in-process backends for headless runs and tests

pub mod backend;
pub mod camera;
pub mod manager;
pub mod simulated;
pub mod transcription;

pub use backend::{
    CameraBackend, MediaStream, RecognitionBackend, RecognitionOptions, RecognitionSignal,
    RenderTarget, VideoConstraints,
};
pub use camera::{attach_when_ready, AttachOutcome, CameraController, CameraState};
pub use manager::{DeviceBackends, DeviceManager, DeviceSettings};
pub use simulated::{
    CameraProbe, RecognizerFeed, SimulatedCamera, SimulatedRecognizer, SimulatedRenderTarget,
};
pub use transcription::TranscriptionController;
