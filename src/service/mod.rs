//! External generation and scoring service
//!
//! Both question provisioning and answer scoring go through the same
//! `generateContent` style API:
//! - `client`: the `GenerativeService` trait and its HTTP implementation
//! - `messages`: request/response bodies
//! - `provisioning`: question list with built-in fallback
//! - `scoring`: answer evaluation and score extraction

pub mod client;
pub mod error;
pub mod messages;
pub mod provisioning;
pub mod scoring;

pub use client::{GeminiClient, GenerativeService};
pub use error::ServiceError;
pub use messages::{GenerateContentRequest, GenerateContentResponse};
pub use provisioning::{
    split_questions, ProvisionedQuestions, QuestionProvisioner, FALLBACK_QUESTIONS,
};
pub use scoring::{evaluation_prompt, extract_score, Evaluation, ScoringClient};
