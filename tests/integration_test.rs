//! Integration tests for the cadence engine
//!
//! These tests validate the full cue lifecycle across the public surface,
//! including:
//! - Cue offsets derived from preset frame counts at the fixed frame rate
//! - Cancellation: stop() leaves no stray tones or phase transitions
//! - Single-session guarantee under redundant start() calls
//! - Mode switching applying the new mode's default preset
//!
//! Timing assertions run on Tokio's paused virtual clock, so deadlines are
//! observed exactly rather than within scheduler jitter.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;

use tempo_trainer::audio::{ToneSink, ToneSpec, Waveform};
use tempo_trainer::catalog::CadencePreset;
use tempo_trainer::config::{TimingConfig, ToneConfig, TrainerConfig};
use tempo_trainer::error::{AudioError, CadenceError};
use tempo_trainer::phase::Phase;
use tempo_trainer::scheduler::CadenceScheduler;
use tempo_trainer::trainer::TrainerHandle;
use tempo_trainer::GameMode;

/// Test sink that records every tone with its (virtual) fire instant.
#[derive(Default)]
struct RecordingSink {
    tones: Mutex<Vec<(ToneSpec, Instant)>>,
}

impl RecordingSink {
    fn recorded(&self) -> Vec<(ToneSpec, Instant)> {
        self.tones.lock().unwrap().clone()
    }

    fn tone_count(&self) -> usize {
        self.tones.lock().unwrap().len()
    }
}

impl ToneSink for RecordingSink {
    fn play_tone(&self, spec: ToneSpec) -> Result<(), AudioError> {
        self.tones.lock().unwrap().push((spec, Instant::now()));
        Ok(())
    }
}

fn scheduler_with(sink: Arc<RecordingSink>) -> CadenceScheduler {
    CadenceScheduler::new(
        TimingConfig::default(),
        ToneConfig::default(),
        sink,
        Handle::current(),
    )
}

fn preset(backswing: u32, downswing: u32, label: &'static str) -> CadencePreset {
    CadencePreset {
        backswing_frames: backswing,
        downswing_frames: downswing,
        ratio_label: label,
    }
}

/// Assert an observed offset against its expected value in milliseconds.
/// The virtual clock is exact; the tolerance only absorbs float-to-nanos
/// rounding in the frame conversion.
fn assert_offset_ms(actual: Duration, expected_ms: f64) {
    let actual_ms = actual.as_secs_f64() * 1000.0;
    assert!(
        (actual_ms - expected_ms).abs() < 2.0,
        "expected offset {} ms, got {:.3} ms",
        expected_ms,
        actual_ms
    );
}

#[tokio::test(start_paused = true)]
async fn cue_offsets_match_long_game_reference() {
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(Arc::clone(&sink));
    let mut rx = scheduler.subscribe_phase();

    let t0 = Instant::now();
    scheduler.start(&preset(24, 8, "3:1")).unwrap();

    // One full cycle plus the start of the next.
    let mut events = Vec::new();
    for _ in 0..5 {
        let phase = rx.recv().await.unwrap();
        events.push((phase, t0.elapsed()));
    }
    scheduler.stop();

    assert_eq!(events[0].0, Phase::Start);
    assert_offset_ms(events[0].1, 0.0);
    assert_eq!(events[1].0, Phase::Top);
    assert_offset_ms(events[1].1, 800.0);
    assert_eq!(events[2].0, Phase::Impact);
    assert_offset_ms(events[2].1, 1066.7);
    assert_eq!(events[3].0, Phase::Idle);
    assert_offset_ms(events[3].1, 1566.7);
    assert_eq!(events[4].0, Phase::Start);
    assert_offset_ms(events[4].1, 3066.7);

    // Three tones in the first cycle, plus the second cycle's start cue.
    let tones = sink.recorded();
    assert_eq!(tones.len(), 4);
    assert_eq!(tones[0].0.waveform, Waveform::Sine);
    assert_eq!(tones[0].0.frequency_hz, 660.0);
    assert_eq!(tones[1].0.waveform, Waveform::Sine);
    assert_eq!(tones[1].0.frequency_hz, 880.0);
    assert_eq!(tones[2].0.waveform, Waveform::Square);
    assert_eq!(tones[2].0.frequency_hz, 1100.0);
}

#[tokio::test(start_paused = true)]
async fn cue_offsets_match_short_game_reference() {
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(Arc::clone(&sink));
    let mut rx = scheduler.subscribe_phase();

    let t0 = Instant::now();
    scheduler.start(&preset(16, 8, "2:1")).unwrap();

    let mut events = Vec::new();
    for _ in 0..3 {
        let phase = rx.recv().await.unwrap();
        events.push((phase, t0.elapsed()));
    }
    scheduler.stop();

    assert_eq!(events[1].0, Phase::Top);
    assert_offset_ms(events[1].1, 533.3);
    assert_eq!(events[2].0, Phase::Impact);
    assert_offset_ms(events[2].1, 800.0);
}

#[tokio::test(start_paused = true)]
async fn loop_repeats_with_stable_offsets() {
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(Arc::clone(&sink));
    let mut rx = scheduler.subscribe_phase();

    let t0 = Instant::now();
    scheduler.start(&preset(24, 8, "3:1")).unwrap();

    // Two full cycles plus the start of a third: offsets in the second
    // cycle must be exact multiples of the cycle length, with no drift.
    let mut events = Vec::new();
    for _ in 0..9 {
        let phase = rx.recv().await.unwrap();
        events.push((phase, t0.elapsed()));
    }
    scheduler.stop();

    let expected = [
        (Phase::Start, 0.0),
        (Phase::Top, 800.0),
        (Phase::Impact, 1066.7),
        (Phase::Idle, 1566.7),
        (Phase::Start, 3066.7),
        (Phase::Top, 3866.7),
        (Phase::Impact, 4133.3),
        (Phase::Idle, 4633.3),
        (Phase::Start, 6133.3),
    ];
    for ((phase, offset), (expected_phase, expected_ms)) in events.iter().zip(expected.iter()) {
        assert_eq!(phase, expected_phase);
        assert_offset_ms(*offset, *expected_ms);
    }
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_all_pending_callbacks() {
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(Arc::clone(&sink));
    let mut rx = scheduler.subscribe_phase();

    scheduler.start(&preset(24, 8, "3:1")).unwrap();
    assert_eq!(rx.recv().await.unwrap(), Phase::Start);

    scheduler.stop();
    assert_eq!(rx.recv().await.unwrap(), Phase::Idle);

    // Wait far past every deadline the cancelled session had scheduled.
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(
        rx.try_recv().is_err(),
        "No phase transition may fire after stop"
    );
    assert_eq!(sink.tone_count(), 1, "No tone may fire after stop");
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.current_phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn stop_between_fires_suppresses_later_cues() {
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(Arc::clone(&sink));
    let mut rx = scheduler.subscribe_phase();

    scheduler.start(&preset(24, 8, "3:1")).unwrap();
    assert_eq!(rx.recv().await.unwrap(), Phase::Start);
    assert_eq!(rx.recv().await.unwrap(), Phase::Top);

    // Stop between the TOP and IMPACT deadlines.
    scheduler.stop();
    assert_eq!(rx.recv().await.unwrap(), Phase::Idle);

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(rx.try_recv().is_err());
    assert_eq!(
        sink.tone_count(),
        2,
        "The impact cue must not fire after stop"
    );
}

#[tokio::test(start_paused = true)]
async fn redundant_start_never_overlaps_sequences() {
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(Arc::clone(&sink));
    let mut rx = scheduler.subscribe_phase();

    scheduler.start(&preset(24, 8, "3:1")).unwrap();
    scheduler.start(&preset(24, 8, "3:1")).unwrap();
    scheduler.start(&preset(18, 6, "3:1")).unwrap();

    // A doubled session would interleave extra transitions and tones.
    let mut events = Vec::new();
    for _ in 0..5 {
        events.push(rx.recv().await.unwrap());
    }
    scheduler.stop();

    assert_eq!(
        events,
        vec![
            Phase::Start,
            Phase::Top,
            Phase::Impact,
            Phase::Idle,
            Phase::Start
        ]
    );
    assert_eq!(sink.tone_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn mode_switch_uses_short_game_default_timing() {
    let sink = Arc::new(RecordingSink::default());
    let handle = TrainerHandle::with_parts(
        TrainerConfig::default(),
        Arc::clone(&sink) as Arc<dyn ToneSink>,
        Handle::current(),
    );

    handle.select_mode(GameMode::ShortGame).unwrap();
    let mut rx = handle.subscribe_phase();

    let t0 = Instant::now();
    handle.start().unwrap();

    for _ in 0..3 {
        rx.recv().await.unwrap();
    }
    handle.stop();

    // Short Game default is 16/8, not the Long Game 24/8 active before the
    // switch: TOP at 533.3 ms, IMPACT at 800 ms.
    let tones = sink.recorded();
    assert_eq!(tones.len(), 3);
    assert_offset_ms(tones[1].1 - t0, 533.3);
    assert_offset_ms(tones[2].1 - t0, 800.0);
}

#[tokio::test]
async fn invalid_preset_is_rejected_synchronously() {
    let sink = Arc::new(RecordingSink::default());
    let handle = TrainerHandle::with_parts(
        TrainerConfig::default(),
        Arc::clone(&sink) as Arc<dyn ToneSink>,
        Handle::current(),
    );

    let result = handle.select_preset(preset(0, 8, "3:1"));
    assert!(matches!(
        result,
        Err(CadenceError::FrameCountInvalid { .. })
    ));
    assert!(!handle.is_running());

    // The previously active preset is untouched and still starts cleanly.
    handle.start().unwrap();
    assert!(handle.is_running());
    handle.stop();
}

#[tokio::test]
async fn stop_is_idempotent_across_the_lifecycle() {
    let sink = Arc::new(RecordingSink::default());
    let handle = TrainerHandle::with_parts(
        TrainerConfig::default(),
        Arc::clone(&sink) as Arc<dyn ToneSink>,
        Handle::current(),
    );

    handle.stop();
    handle.stop();
    assert_eq!(handle.current_phase(), Phase::Idle);

    handle.start().unwrap();
    handle.stop();
    handle.stop();
    assert_eq!(handle.current_phase(), Phase::Idle);
    assert!(!handle.is_running());
}
