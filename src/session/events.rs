use std::fmt;
use tokio::sync::mpsc;

use crate::device::{MediaStream, RecognitionSignal};

/// Asynchronous completions fed back into the session
///
/// Helper tasks never touch session state; they only send these. Each event
/// carries the id of the recording span or camera acquisition that produced
/// it so late arrivals can be told apart from current ones.
pub enum SessionEvent {
    /// One elapsed-time period passed
    Tick { span: u64 },

    /// Output of the recognizer started for `span`
    Recognition { span: u64, signal: RecognitionSignal },

    /// The camera permission request resolved with a stream
    CameraGranted {
        attempt: u64,
        stream: Box<dyn MediaStream>,
    },

    /// The camera permission request was rejected
    CameraDenied { attempt: u64, reason: String },

    /// The readiness poll finished
    CameraAttachFinished { attempt: u64, attached: bool },
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Tick { span } => f.debug_struct("Tick").field("span", span).finish(),
            SessionEvent::Recognition { span, signal } => f
                .debug_struct("Recognition")
                .field("span", span)
                .field("signal", signal)
                .finish(),
            SessionEvent::CameraGranted { attempt, stream } => f
                .debug_struct("CameraGranted")
                .field("attempt", attempt)
                .field("stream", &stream.id())
                .finish(),
            SessionEvent::CameraDenied { attempt, reason } => f
                .debug_struct("CameraDenied")
                .field("attempt", attempt)
                .field("reason", reason)
                .finish(),
            SessionEvent::CameraAttachFinished { attempt, attached } => f
                .debug_struct("CameraAttachFinished")
                .field("attempt", attempt)
                .field("attached", attached)
                .finish(),
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;
