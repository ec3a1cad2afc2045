//! Live transcript handling
//!
//! Speech recognition delivers cumulative result events; this module turns
//! each event into the full running transcript for the active recording.

mod accumulator;

pub use accumulator::{
    AccumulatedTranscript, RecognitionAlternative, RecognitionEvent, RecognitionResult,
    TranscriptAccumulator,
};
