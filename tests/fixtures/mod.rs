// Shared helpers for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use mock_interview::device::{
    CameraProbe, DeviceBackends, DeviceSettings, RecognizerFeed, SimulatedCamera,
    SimulatedRecognizer, SimulatedRenderTarget,
};
use mock_interview::service::{
    GenerativeService, QuestionProvisioner, ScoringClient, ServiceError,
};
use mock_interview::session::{InterviewSession, SessionConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Generative service that replays queued responses and records prompts
#[derive(Default)]
pub struct ScriptedService {
    responses: Mutex<VecDeque<Result<String, ServiceError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, text: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, error: ServiceError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeService for ScriptedService {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::MalformedResponse("no scripted response".into())))
    }
}

pub const THREE_QUESTIONS: &str =
    "What is a closure?\n\nExplain TCP vs UDP.\nWhat is Big-O notation?\n";

pub struct Harness {
    pub session: InterviewSession,
    pub camera: CameraProbe,
    pub target: Arc<SimulatedRenderTarget>,
    pub recognizer: RecognizerFeed,
}

/// Session config with ticks far enough apart not to interfere
pub fn session_config() -> SessionConfig {
    SessionConfig {
        session_id: "test-session".to_string(),
        tick_interval: Duration::from_secs(3600),
        devices: DeviceSettings::default(),
    }
}

pub fn build(
    service: Arc<dyn GenerativeService>,
    camera: SimulatedCamera,
    target: Arc<SimulatedRenderTarget>,
    recognizer: SimulatedRecognizer,
    config: SessionConfig,
) -> Harness {
    let camera_probe = camera.probe();
    let feed = recognizer.feed();

    let backends = DeviceBackends {
        camera: Arc::new(camera),
        render_target: target.clone(),
        recognition: Box::new(recognizer),
    };

    let session = InterviewSession::new(
        config,
        backends,
        QuestionProvisioner::new(service.clone(), 5),
        ScoringClient::new(service),
    );

    Harness {
        session,
        camera: camera_probe,
        target,
        recognizer: feed,
    }
}

/// Harness with working devices and a mounted video surface
pub fn harness(service: Arc<dyn GenerativeService>) -> Harness {
    build(
        service,
        SimulatedCamera::new(),
        Arc::new(SimulatedRenderTarget::mounted()),
        SimulatedRecognizer::new(),
        session_config(),
    )
}

/// Handle session events until `done` holds
pub async fn pump_until<F>(session: &mut InterviewSession, what: &str, done: F)
where
    F: Fn(&InterviewSession) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !done(session) {
        match tokio::time::timeout_at(deadline, session.next_event()).await {
            Ok(Some(_)) => {}
            Ok(None) => panic!("event channel closed while waiting for {}", what),
            Err(_) => panic!("timed out waiting for {}", what),
        }
    }
}

/// Record `text` as the answer to the current question
pub async fn record_answer(harness: &mut Harness, text: &str) {
    assert!(harness.session.start_recording().await, "recording should start");
    assert!(harness.recognizer.say(text));
    pump_until(&mut harness.session, "transcript", |s| s.transcript() == text).await;
    assert!(harness.session.commit_answer(), "answer should commit");
}
