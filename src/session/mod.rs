//! Interview session management
//!
//! This module provides the `InterviewSession` state machine that manages:
//! - Question loading and progression
//! - Recording spans, elapsed time and answer commits
//! - Submission to the scoring service
//! - Device lifecycle and teardown
//! - Read-only snapshots for the presentation layer

mod config;
mod events;
mod phase;
mod records;
mod session;
mod snapshot;

pub use config::SessionConfig;
pub use events::{EventReceiver, EventSender, SessionEvent};
pub use phase::{FaultKind, SessionFault, SessionPhase};
pub use records::{AnswerRecord, Question, ScoreResult};
pub use session::{InterviewSession, CAMERA_PERMISSION_MESSAGE};
pub use snapshot::{format_elapsed, SessionSnapshot};
