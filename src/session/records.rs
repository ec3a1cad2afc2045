use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::service::{extract_score, ServiceError};

/// An interview question and its position in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 0-based position
    pub index: usize,
    pub text: String,
}

/// A committed answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub question_text: String,
    pub transcript_text: String,

    /// Recording length when the answer was committed
    pub elapsed_secs: u64,

    pub committed_at: DateTime<Utc>,
}

/// Verdict from the scoring service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// 0 to 100; `None` when the feedback carried no score, which is not the same as 0
    pub score: Option<u8>,
    pub feedback: String,
}

impl ScoreResult {
    /// Interpret a scoring response
    pub fn from_feedback(feedback: impl Into<String>) -> Self {
        let feedback = feedback.into();
        Self {
            score: extract_score(&feedback),
            feedback,
        }
    }

    /// Stand-in result for a failed scoring request
    pub fn failure(error: &ServiceError) -> Self {
        Self {
            score: Some(0),
            feedback: format!("Error: {}", error),
        }
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }
}
