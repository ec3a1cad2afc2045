use serde::{Deserialize, Serialize};

/// One hypothesis for a recognised segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionAlternative {
    pub text: String,

    /// Confidence score (0.0 to 1.0), if the recognizer reports one
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// A recognised segment and its ranked hypotheses
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Whether the recognizer will no longer revise this segment
    pub is_final: bool,

    /// Hypotheses, best first
    pub alternatives: Vec<RecognitionAlternative>,
}

impl RecognitionResult {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            is_final: false,
            alternatives: vec![RecognitionAlternative {
                text: text.into(),
                confidence: None,
            }],
        }
    }

    pub fn finalized(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            is_final: true,
            alternatives: vec![RecognitionAlternative {
                text: text.into(),
                confidence: Some(confidence),
            }],
        }
    }

    fn top_text(&self) -> Option<&str> {
        self.alternatives.first().map(|alt| alt.text.as_str())
    }
}

/// A recognition callback payload.
///
/// Continuous recognizers resend every segment of the session on each event,
/// so one event is enough to rebuild the whole transcript.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognitionEvent {
    pub results: Vec<RecognitionResult>,
}

impl RecognitionEvent {
    pub fn new(results: Vec<RecognitionResult>) -> Self {
        Self { results }
    }
}

/// Output of merging one event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccumulatedTranscript {
    pub text: String,
    pub final_segments: usize,
    pub has_interim: bool,
}

/// Builds the running transcript from recognition events
#[derive(Debug, Default)]
pub struct TranscriptAccumulator;

impl TranscriptAccumulator {
    /// Concatenate the top hypothesis of every segment, in arrival order.
    ///
    /// Interim and final segments are treated alike; segments without
    /// alternatives contribute nothing.
    pub fn merge(event: &RecognitionEvent) -> AccumulatedTranscript {
        let mut merged = AccumulatedTranscript::default();

        for result in &event.results {
            if let Some(text) = result.top_text() {
                merged.text.push_str(text);
            }

            if result.is_final {
                merged.final_segments += 1;
            } else {
                merged.has_interim = true;
            }
        }

        merged
    }
}
