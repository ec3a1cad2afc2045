use std::sync::Arc;
use tracing::{info, warn};

use super::client::GenerativeService;

/// Questions used whenever generation fails, in this order
pub const FALLBACK_QUESTIONS: [&str; 5] = [
    "Tell me about your experience with React and its core concepts.",
    "How do you handle state management in large applications?",
    "Explain the difference between class components and functional components.",
    "What are React hooks and how do you use them?",
    "How do you optimize React application performance?",
];

/// Outcome of provisioning; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedQuestions {
    pub questions: Vec<String>,
    /// Why the built-in list was used, if it was
    pub fallback_reason: Option<String>,
}

impl ProvisionedQuestions {
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            questions: FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            fallback_reason: Some(reason.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Fetches the question list for a session
pub struct QuestionProvisioner {
    service: Arc<dyn GenerativeService>,
    question_count: usize,
}

impl QuestionProvisioner {
    pub fn new(service: Arc<dyn GenerativeService>, question_count: usize) -> Self {
        Self {
            service,
            question_count,
        }
    }

    /// Generate questions, falling back to the built-in list on any failure
    pub async fn provision(&self) -> ProvisionedQuestions {
        info!("Requesting {} interview questions", self.question_count);

        let text = match self
            .service
            .generate(&generation_prompt(self.question_count))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Error fetching questions, using built-in set: {}", e);
                return ProvisionedQuestions::fallback(e.to_string());
            }
        };

        let questions = split_questions(&text);
        if questions.is_empty() {
            warn!("Generated text contained no questions, using built-in set");
            return ProvisionedQuestions::fallback("generated text contained no questions");
        }

        info!("Received {} questions", questions.len());
        ProvisionedQuestions {
            questions,
            fallback_reason: None,
        }
    }
}

pub fn generation_prompt(count: usize) -> String {
    format!(
        "Generate {} easy technical oral interview questions for a college student. \
         Format each question on a new line.",
        count
    )
}

/// One question per non-blank line, trimmed
pub fn split_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
