use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{error, info, warn};

use super::client::GenerativeService;
use super::error::ServiceError;
use crate::session::{AnswerRecord, ScoreResult};

#[derive(Debug, Serialize)]
struct AnswerPair<'a> {
    question: &'a str,
    answer: &'a str,
}

/// Result of a scoring attempt
#[derive(Debug)]
pub struct Evaluation {
    pub result: ScoreResult,
    /// Set when the request itself failed and `result` is the zero-score stand-in
    pub error: Option<ServiceError>,
}

/// Submits answers to the generative service and interprets its verdict
pub struct ScoringClient {
    service: Arc<dyn GenerativeService>,
}

impl ScoringClient {
    pub fn new(service: Arc<dyn GenerativeService>) -> Self {
        Self { service }
    }

    /// Score the answers; never fails
    ///
    /// Request failures yield a zero score with an error message as feedback.
    pub async fn evaluate(&self, answers: &[AnswerRecord]) -> Evaluation {
        info!("Submitting {} answers for evaluation", answers.len());

        let prompt = match evaluation_prompt(answers) {
            Ok(prompt) => prompt,
            Err(e) => {
                let e = ServiceError::MalformedResponse(format!("could not encode answers: {}", e));
                error!("Error getting feedback: {}", e);
                return Evaluation {
                    result: ScoreResult::failure(&e),
                    error: Some(e),
                };
            }
        };

        match self.service.generate(&prompt).await {
            Ok(text) => {
                let result = ScoreResult::from_feedback(text);
                match result.score {
                    Some(score) => info!("Interview scored {}/100", score),
                    None => warn!("Evaluation contained no score out of 100"),
                }
                Evaluation {
                    result,
                    error: None,
                }
            }
            Err(e) => {
                error!("Error getting feedback: {}", e);
                Evaluation {
                    result: ScoreResult::failure(&e),
                    error: Some(e),
                }
            }
        }
    }
}

/// Prompt carrying the answers as a JSON list of `{question, answer}`
pub fn evaluation_prompt(answers: &[AnswerRecord]) -> Result<String, serde_json::Error> {
    let pairs: Vec<AnswerPair<'_>> = answers
        .iter()
        .map(|record| AnswerPair {
            question: &record.question_text,
            answer: &record.transcript_text,
        })
        .collect();

    Ok(format!(
        "Evaluate this technical interview. Questions and answers: {}. \
         Provide a score out of 100 and specific feedback on areas for improvement.",
        serde_json::to_string(&pairs)?
    ))
}

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)/100").expect("score pattern is valid"))
}

/// First `<digits>/100` in the text
///
/// Values above 100 count as no score.
pub fn extract_score(text: &str) -> Option<u8> {
    let digits = score_pattern().captures(text)?.get(1)?.as_str();
    digits.parse::<u8>().ok().filter(|score| *score <= 100)
}
