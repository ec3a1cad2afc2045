pub mod config;
pub mod device;
pub mod service;
pub mod session;
pub mod transcript;

pub use config::Config;
pub use device::{
    CameraBackend, CameraState, DeviceBackends, DeviceManager, DeviceSettings, MediaStream,
    RecognitionBackend, RecognitionSignal, RenderTarget,
};
pub use service::{
    GeminiClient, GenerativeService, ProvisionedQuestions, QuestionProvisioner, ScoringClient,
    ServiceError, FALLBACK_QUESTIONS,
};
pub use session::{
    AnswerRecord, FaultKind, InterviewSession, Question, ScoreResult, SessionConfig, SessionFault,
    SessionPhase, SessionSnapshot,
};
pub use transcript::{RecognitionEvent, RecognitionResult, TranscriptAccumulator};
