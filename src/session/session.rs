use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::events::{EventReceiver, EventSender, SessionEvent};
use super::phase::{FaultKind, SessionFault, SessionPhase};
use super::records::{AnswerRecord, Question, ScoreResult};
use super::snapshot::SessionSnapshot;
use crate::device::{AttachOutcome, CameraState, DeviceBackends, DeviceManager, RecognitionSignal};
use crate::service::{QuestionProvisioner, ScoringClient};
use crate::transcript::TranscriptAccumulator;

const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

pub const CAMERA_PERMISSION_MESSAGE: &str =
    "Error accessing camera. Please ensure you have granted camera permissions.";

const RECOGNITION_ENDED_MESSAGE: &str =
    "Speech recognition stopped unexpectedly. Please record your answer again.";

/// Faults left by an earlier recording attempt; camera faults are not among them
fn is_recording_fault(fault: &SessionFault) -> bool {
    match fault.kind {
        FaultKind::Recognition => true,
        FaultKind::DevicePermission => fault.message != CAMERA_PERMISSION_MESSAGE,
        _ => false,
    }
}

/// One mock interview: question progression, recording, and scoring
///
/// All state is owned here and changed only through `&mut self`. Helper
/// tasks (camera request, readiness poll, tick source, recognition pump)
/// report back through `SessionEvent`s, which the owner feeds in with
/// `next_event` or `drain_events`. Every operation returns whether it was
/// applied; calls that are invalid for the current phase change nothing.
pub struct InterviewSession {
    config: SessionConfig,
    devices: DeviceManager,
    provisioner: QuestionProvisioner,
    scorer: ScoringClient,

    events_tx: EventSender,
    events_rx: EventReceiver,
    snapshot_tx: watch::Sender<SessionSnapshot>,

    phase: SessionPhase,
    questions: Vec<Question>,
    current_index: usize,
    answers: BTreeMap<usize, AnswerRecord>,
    transcript: String,
    elapsed_secs: u64,
    score: Option<ScoreResult>,
    fault: Option<SessionFault>,

    /// Id of the latest recording span; events from older spans are dropped
    recording_span: u64,
    ticker: Option<JoinHandle<()>>,
    closed: bool,
}

impl InterviewSession {
    pub fn new(
        config: SessionConfig,
        backends: DeviceBackends,
        provisioner: QuestionProvisioner,
        scorer: ScoringClient,
    ) -> Self {
        info!("Creating interview session: {}", config.session_id);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let devices = DeviceManager::new(backends, config.devices.clone(), events_tx.clone());
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::loading(&config.session_id));

        Self {
            config,
            devices,
            provisioner,
            scorer,
            events_tx,
            events_rx,
            snapshot_tx,
            phase: SessionPhase::Loading,
            questions: Vec::new(),
            current_index: 0,
            answers: BTreeMap::new(),
            transcript: String::new(),
            elapsed_secs: 0,
            score: None,
            fault: None,
            recording_span: 0,
            ticker: None,
            closed: false,
        }
    }

    // ------------------------------------------------------------------
    // Read-only state
    // ------------------------------------------------------------------

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Committed answers, ordered by question index
    pub fn answers(&self) -> Vec<&AnswerRecord> {
        self.answers.values().collect()
    }

    pub fn answer(&self, index: usize) -> Option<&AnswerRecord> {
        self.answers.get(&index)
    }

    pub fn score(&self) -> Option<&ScoreResult> {
        self.score.as_ref()
    }

    pub fn fault(&self) -> Option<&SessionFault> {
        self.fault.as_ref()
    }

    pub fn camera_state(&self) -> CameraState {
        self.devices.camera_state()
    }

    pub fn is_transcribing(&self) -> bool {
        self.devices.is_transcribing()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn can_advance(&self) -> bool {
        self.phase == SessionPhase::Ready
            && self.current_index + 1 < self.questions.len()
            && self.answers.contains_key(&self.current_index)
    }

    pub fn can_submit(&self) -> bool {
        match self.phase {
            SessionPhase::Ready => self.all_answered(),
            // Submitting from the last question commits it first
            SessionPhase::Recording => {
                self.is_last_question()
                    && (0..self.current_index).all(|index| self.answers.contains_key(&index))
            }
            _ => false,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.config.session_id.clone(),
            phase: self.phase,
            questions: self.questions.clone(),
            current_index: self.current_index,
            transcript: self.transcript.clone(),
            elapsed_secs: self.elapsed_secs,
            answers: self.answers.values().cloned().collect(),
            score: self.score.clone(),
            camera: self.devices.camera_state(),
            transcribing: self.devices.is_transcribing(),
            fault: self.fault.clone(),
            can_advance: self.can_advance(),
            can_submit: self.can_submit(),
        }
    }

    /// Receive a fresh snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    // ------------------------------------------------------------------
    // Question flow
    // ------------------------------------------------------------------

    /// Fetch the question list and show the first question
    pub async fn load_questions(&mut self) -> bool {
        if self.phase != SessionPhase::Loading || self.closed {
            warn!("Questions already loaded ({:?})", self.phase);
            return false;
        }

        let provisioned = self.provisioner.provision().await;
        if let Some(reason) = provisioned.fallback_reason {
            self.fault = Some(SessionFault::new(FaultKind::Provisioning, reason));
        }

        self.questions = provisioned
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, text)| Question { index, text })
            .collect();
        self.current_index = 0;
        self.transcript.clear();
        self.elapsed_secs = 0;
        self.phase = SessionPhase::Ready;

        info!(
            "Session {} ready with {} questions",
            self.config.session_id,
            self.questions.len()
        );
        self.publish();
        true
    }

    /// Start answering the current question
    pub async fn start_recording(&mut self) -> bool {
        if self.phase != SessionPhase::Ready || self.closed {
            warn!("Cannot start recording while {:?}", self.phase);
            return false;
        }

        let span = self.recording_span + 1;
        match self.devices.start_transcription(span).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("Speech recognition unavailable, recording not started");
                return false;
            }
            Err(e) => {
                error!("Failed to start recording: {:#}", e);
                self.fault = Some(SessionFault::new(
                    FaultKind::DevicePermission,
                    format!("{:#}", e),
                ));
                self.publish();
                return false;
            }
        }

        self.recording_span = span;
        self.transcript.clear();
        self.elapsed_secs = 0;
        if self.fault.as_ref().is_some_and(is_recording_fault) {
            self.fault = None;
        }
        self.start_ticker(span);
        self.phase = SessionPhase::Recording;

        info!(
            "Recording answer to question {} (span {})",
            self.current_index + 1,
            span
        );
        self.publish();
        true
    }

    /// Stop recording and store the transcript as the current question's answer
    ///
    /// Re-recording a question replaces its earlier answer.
    pub fn commit_answer(&mut self) -> bool {
        if self.phase != SessionPhase::Recording {
            warn!("Cannot commit answer while {:?}", self.phase);
            return false;
        }

        self.end_recording_span();

        let Some(question) = self.questions.get(self.current_index) else {
            error!("No question at index {}", self.current_index);
            self.phase = SessionPhase::Ready;
            self.publish();
            return false;
        };

        let record = AnswerRecord {
            question_index: question.index,
            question_text: question.text.clone(),
            transcript_text: std::mem::take(&mut self.transcript),
            elapsed_secs: self.elapsed_secs,
            committed_at: Utc::now(),
        };

        info!(
            "Committed answer to question {} ({} chars, {}s)",
            record.question_index + 1,
            record.transcript_text.len(),
            record.elapsed_secs
        );
        if self.answers.insert(record.question_index, record).is_some() {
            info!("Replaced earlier answer to question {}", self.current_index + 1);
        }

        self.phase = SessionPhase::Ready;
        self.publish();
        true
    }

    /// Move to the next question once the current one is answered
    pub fn advance_to_next_question(&mut self) -> bool {
        if !self.can_advance() {
            warn!(
                "Cannot advance from question {} ({:?}, answered: {})",
                self.current_index + 1,
                self.phase,
                self.answers.contains_key(&self.current_index)
            );
            return false;
        }

        self.current_index += 1;
        self.transcript.clear();
        self.elapsed_secs = 0;

        info!(
            "Advanced to question {} of {}",
            self.current_index + 1,
            self.questions.len()
        );
        self.publish();
        true
    }

    /// Send every answer for scoring and show the results
    ///
    /// Submitting while recording the last question commits it first. Scoring
    /// failures still end in `Results`, with a zero score.
    pub async fn submit(&mut self) -> bool {
        if self.phase == SessionPhase::Recording && self.is_last_question() {
            self.commit_answer();
        }

        if self.phase != SessionPhase::Ready {
            warn!("Cannot submit while {:?}", self.phase);
            return false;
        }
        if !self.all_answered() {
            warn!(
                "Cannot submit: {} of {} questions answered",
                self.answers.len(),
                self.questions.len()
            );
            return false;
        }

        self.phase = SessionPhase::Submitting;
        self.publish();

        let answers: Vec<AnswerRecord> = self.answers.values().cloned().collect();
        let evaluation = self.scorer.evaluate(&answers).await;

        if evaluation.error.is_some() {
            self.fault = Some(SessionFault::new(
                FaultKind::Scoring,
                evaluation.result.feedback.clone(),
            ));
        }
        self.score = Some(evaluation.result);
        self.phase = SessionPhase::Results;

        info!("Session {} reached results", self.config.session_id);
        self.publish();
        true
    }

    /// Start over from the first question with no answers
    pub fn restart(&mut self) -> bool {
        if self.phase != SessionPhase::Results {
            warn!("Cannot restart while {:?}", self.phase);
            return false;
        }

        self.answers.clear();
        self.score = None;
        self.fault = None;
        self.transcript.clear();
        self.elapsed_secs = 0;
        self.current_index = 0;
        self.phase = SessionPhase::Ready;

        info!("Session {} restarted", self.config.session_id);
        self.publish();
        true
    }

    /// Clear the current fault once the user has seen it
    pub fn dismiss_fault(&mut self) -> bool {
        if self.fault.take().is_none() {
            return false;
        }
        self.publish();
        true
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    /// Request the camera; a pending or held stream makes this a no-op
    pub fn start_camera(&mut self) -> bool {
        if self.closed {
            return false;
        }
        let started = self.devices.start_camera();
        if started {
            self.publish();
        }
        started
    }

    /// Release the camera; idempotent
    pub fn stop_camera(&mut self) -> bool {
        let stopped = self.devices.stop_camera();
        if stopped {
            self.publish();
        }
        stopped
    }

    // ------------------------------------------------------------------
    // Event loop
    // ------------------------------------------------------------------

    /// Wait for the next asynchronous completion and apply it
    pub async fn next_event(&mut self) -> Option<SessionPhase> {
        let event = self.events_rx.recv().await?;
        self.handle_event(event);
        Some(self.phase)
    }

    /// Apply every completion already queued; returns how many there were
    pub fn drain_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Tick { span } => {
                if self.phase != SessionPhase::Recording || span != self.recording_span {
                    debug!("Ignoring stale tick from span {}", span);
                    return;
                }
                self.elapsed_secs += 1;
            }

            SessionEvent::Recognition { span, signal } => {
                if self.phase != SessionPhase::Recording || span != self.recording_span {
                    debug!("Ignoring recognition output from span {}", span);
                    return;
                }
                match signal {
                    RecognitionSignal::Result(event) => {
                        let merged = TranscriptAccumulator::merge(&event);
                        debug!(
                            "Transcript updated: {} chars ({} final segments, interim: {})",
                            merged.text.len(),
                            merged.final_segments,
                            merged.has_interim
                        );
                        self.transcript = merged.text;
                    }
                    RecognitionSignal::Error(reason) => {
                        error!("Speech recognition error: {}", reason);
                        self.interrupt_recording(reason);
                    }
                    RecognitionSignal::Ended => {
                        warn!("Speech recognition stopped on its own");
                        self.interrupt_recording(RECOGNITION_ENDED_MESSAGE);
                    }
                }
            }

            SessionEvent::CameraGranted { attempt, stream } => {
                self.devices.camera_granted(attempt, stream);
            }

            SessionEvent::CameraDenied { attempt, reason } => {
                if self.devices.camera_denied(attempt, &reason) {
                    self.fault = Some(SessionFault::new(
                        FaultKind::DevicePermission,
                        CAMERA_PERMISSION_MESSAGE,
                    ));
                }
            }

            SessionEvent::CameraAttachFinished { attempt, attached } => {
                if self.devices.camera_attach_finished(attempt, attached)
                    == AttachOutcome::TimedOut
                {
                    self.fault = Some(SessionFault::new(
                        FaultKind::DeviceUnavailable,
                        "Camera preview could not be displayed. Please try starting the camera again.",
                    ));
                }
            }
        }

        self.publish();
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Release all devices and stop background work
    ///
    /// Safe to call from any phase and any number of times; the release
    /// itself happens once. Also runs on drop.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.stop_ticker();
        self.devices.release_all();

        info!(
            "Session {} closed in {:?} ({} of {} answered)",
            self.config.session_id,
            self.phase,
            self.answers.len(),
            self.questions.len()
        );
        self.publish();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn is_last_question(&self) -> bool {
        !self.questions.is_empty() && self.current_index + 1 == self.questions.len()
    }

    fn all_answered(&self) -> bool {
        !self.questions.is_empty()
            && (0..self.questions.len()).all(|index| self.answers.contains_key(&index))
    }

    fn start_ticker(&mut self, span: u64) {
        self.stop_ticker();

        let period = self.config.tick_interval.max(MIN_TICK_INTERVAL);
        let events = self.events_tx.clone();

        self.ticker = Some(tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if events.send(SessionEvent::Tick { span }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    /// Drop back to `Ready` keeping the uncommitted transcript
    fn interrupt_recording(&mut self, reason: impl Into<String>) {
        self.end_recording_span();
        self.phase = SessionPhase::Ready;
        self.fault = Some(SessionFault::new(FaultKind::Recognition, reason));
    }

    /// Leave the current recording span: no more ticks or recognition output
    fn end_recording_span(&mut self) {
        self.stop_ticker();
        self.devices.stop_transcription();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

impl Drop for InterviewSession {
    fn drop(&mut self) {
        self.close();
    }
}
