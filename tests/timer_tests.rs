// Integration tests for the elapsed-time tick source
//
// These run on paused time so every tick is deterministic.

mod fixtures;

use fixtures::{build, session_config, ScriptedService, THREE_QUESTIONS};
use mock_interview::device::{SimulatedCamera, SimulatedRecognizer, SimulatedRenderTarget};
use mock_interview::session::{format_elapsed, SessionPhase};
use std::sync::Arc;
use std::time::Duration;

fn ticking_harness() -> fixtures::Harness {
    let mut config = session_config();
    config.tick_interval = Duration::from_secs(1);
    build(
        Arc::new(ScriptedService::new().respond(THREE_QUESTIONS)),
        SimulatedCamera::new(),
        Arc::new(SimulatedRenderTarget::mounted()),
        SimulatedRecognizer::new(),
        config,
    )
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_counts_while_recording() {
    let mut h = ticking_harness();
    h.session.load_questions().await;
    assert!(h.session.start_recording().await);

    for expected in 1..=3 {
        assert_eq!(h.session.next_event().await, Some(SessionPhase::Recording));
        assert_eq!(h.session.elapsed_secs(), expected);
    }

    assert!(h.session.commit_answer());
    let answer = h.session.answer(0).unwrap();
    assert_eq!(answer.elapsed_secs, 3);
    assert_eq!(format_elapsed(answer.elapsed_secs), "0:03");
}

#[tokio::test(start_paused = true)]
async fn test_no_ticks_outside_recording() {
    let mut h = ticking_harness();
    h.session.load_questions().await;

    let idle = tokio::time::timeout(Duration::from_secs(10), h.session.next_event()).await;
    assert!(idle.is_err());
    assert_eq!(h.session.elapsed_secs(), 0);

    assert!(h.session.start_recording().await);
    h.session.next_event().await;
    h.session.next_event().await;
    assert!(h.session.commit_answer());

    // Ticker is gone once the answer is committed
    let after = tokio::time::timeout(Duration::from_secs(10), h.session.next_event()).await;
    assert!(after.is_err());
    assert_eq!(h.session.answer(0).unwrap().elapsed_secs, 2);
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_resets_per_recording() {
    let mut h = ticking_harness();
    h.session.load_questions().await;

    assert!(h.session.start_recording().await);
    for _ in 0..4 {
        h.session.next_event().await;
    }
    assert!(h.session.commit_answer());
    assert_eq!(h.session.elapsed_secs(), 4);

    assert!(h.session.advance_to_next_question());
    assert_eq!(h.session.elapsed_secs(), 0);

    assert!(h.session.start_recording().await);
    h.session.next_event().await;
    assert_eq!(h.session.elapsed_secs(), 1);
    assert!(h.session.commit_answer());

    assert_eq!(h.session.answer(0).unwrap().elapsed_secs, 4);
    assert_eq!(h.session.answer(1).unwrap().elapsed_secs, 1);
}

#[tokio::test(start_paused = true)]
async fn test_recognition_error_stops_ticks() {
    let mut h = ticking_harness();
    h.session.load_questions().await;

    assert!(h.session.start_recording().await);
    h.session.next_event().await;
    assert_eq!(h.session.elapsed_secs(), 1);

    h.recognizer.fail("audio-capture");
    assert_eq!(h.session.next_event().await, Some(SessionPhase::Ready));

    let after = tokio::time::timeout(Duration::from_secs(10), h.session.next_event()).await;
    assert!(after.is_err());
    assert_eq!(h.session.elapsed_secs(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_shows_elapsed() {
    let mut h = ticking_harness();
    h.session.load_questions().await;
    let updates = h.session.subscribe();

    assert!(h.session.start_recording().await);
    h.session.next_event().await;
    h.session.next_event().await;

    let snapshot = updates.borrow().clone();
    assert_eq!(snapshot.elapsed_secs, 2);
    assert_eq!(snapshot.elapsed_display(), "0:02");
    assert!(snapshot.transcribing);
}

#[tokio::test(start_paused = true)]
async fn test_zero_tick_interval_still_ticks() {
    let mut config = session_config();
    config.tick_interval = Duration::ZERO;
    let mut h = build(
        Arc::new(ScriptedService::new().respond(THREE_QUESTIONS)),
        SimulatedCamera::new(),
        Arc::new(SimulatedRenderTarget::mounted()),
        SimulatedRecognizer::new(),
        config,
    );
    h.session.load_questions().await;
    assert!(h.session.start_recording().await);

    for expected in 1..=3 {
        assert_eq!(h.session.next_event().await, Some(SessionPhase::Recording));
        assert_eq!(h.session.elapsed_secs(), expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_recognizer_ending_stops_ticks() {
    let mut h = ticking_harness();
    h.session.load_questions().await;

    assert!(h.session.start_recording().await);
    h.session.next_event().await;

    h.recognizer.end();
    assert_eq!(h.session.next_event().await, Some(SessionPhase::Ready));

    let after = tokio::time::timeout(Duration::from_secs(10), h.session.next_event()).await;
    assert!(after.is_err());
    assert_eq!(h.session.elapsed_secs(), 1);
}
