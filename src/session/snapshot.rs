use serde::Serialize;

use super::phase::{SessionFault, SessionPhase};
use super::records::{AnswerRecord, Question, ScoreResult};
use crate::device::CameraState;

/// Read-only view of a session for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: SessionPhase,
    pub questions: Vec<Question>,
    pub current_index: usize,

    /// Live transcript of the current recording
    pub transcript: String,

    pub elapsed_secs: u64,

    /// Committed answers, ordered by question
    pub answers: Vec<AnswerRecord>,

    pub score: Option<ScoreResult>,
    pub camera: CameraState,
    pub transcribing: bool,
    pub fault: Option<SessionFault>,

    /// Whether "next question" would be accepted
    pub can_advance: bool,
    /// Whether "submit" would be accepted
    pub can_submit: bool,
}

impl SessionSnapshot {
    /// State of a session whose questions are still loading
    pub fn loading(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            phase: SessionPhase::Loading,
            questions: Vec::new(),
            current_index: 0,
            transcript: String::new(),
            elapsed_secs: 0,
            answers: Vec::new(),
            score: None,
            camera: CameraState::Idle,
            transcribing: false,
            fault: None,
            can_advance: false,
            can_submit: false,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_secs)
    }
}

/// Render seconds as `m:ss`
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
