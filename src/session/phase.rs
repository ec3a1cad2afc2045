use serde::{Deserialize, Serialize};

/// Where the interview currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Questions not yet available
    Loading,
    /// A question is shown and nothing is being recorded
    Ready,
    /// An answer to the current question is being recorded
    Recording,
    /// Answers are with the scoring service
    Submitting,
    /// A score result is available
    Results,
}

/// Category of a recorded failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Question generation failed and the built-in set is in use
    Provisioning,
    /// Camera or microphone access was refused
    DevicePermission,
    /// The camera stream could not be shown
    DeviceUnavailable,
    /// Speech recognition stopped mid-recording
    Recognition,
    /// The scoring request failed
    Scoring,
}

/// The session's error sub-state
///
/// Faults never block progress; they only describe what degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFault {
    pub kind: FaultKind,
    pub message: String,
}

impl SessionFault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Provisioning falls back silently; everything else is shown to the user
    pub fn is_user_visible(&self) -> bool {
        self.kind != FaultKind::Provisioning
    }
}
