//! Cadence scheduler - the cue-firing state machine
//!
//! Drives one repeating cycle of three cue tones (backswing start, top of
//! swing, impact) plus a visual phase reset, looping until stopped. All
//! deadlines within a cycle are monotonically increasing offsets from a
//! single origin instant captured when the cycle starts; cycles never chain
//! relative timers, so timing cannot drift across repetitions.
//!
//! Cancellation uses a generation token: `start()` stamps the session with
//! the current value of a shared atomic counter, and every scheduled
//! wake-up re-reads that counter before acting. `stop()` bumps the counter
//! first, so a stop issued between two fires guarantees zero further tones
//! or phase transitions from the cancelled session, even if the task abort
//! races the next deadline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::audio::{ToneSink, ToneSpec, Waveform};
use crate::catalog::CadencePreset;
use crate::config::{TimingConfig, ToneConfig};
use crate::error::{log_audio_error, CadenceError};
use crate::phase::{Phase, PhaseState};

/// Pending work for one scheduling session. Owned exclusively by the
/// scheduler; fully invalidated on stop so no handle outlives its session.
struct ScheduleHandle {
    generation: u64,
    driver: JoinHandle<()>,
}

/// Absolute delay offsets for the four deadlines of one cycle, measured
/// from the cycle origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CycleOffsets {
    /// Top-of-swing cue: backswing frames elapsed
    top: Duration,
    /// Impact cue: backswing plus downswing frames elapsed
    impact: Duration,
    /// Visual phase reset, shortly after impact
    reset: Duration,
    /// Next cycle origin; also the full cycle length
    cycle: Duration,
}

impl CycleOffsets {
    fn for_preset(preset: &CadencePreset, timing: &TimingConfig) -> Self {
        let top = timing.frames_to_duration(preset.backswing_frames);
        let impact =
            timing.frames_to_duration(preset.backswing_frames + preset.downswing_frames);
        let reset = impact + Duration::from_millis(timing.phase_reset_ms);
        let cycle = reset + Duration::from_millis(timing.repeat_gap_ms);
        Self {
            top,
            impact,
            reset,
            cycle,
        }
    }
}

/// One cue: the phase it announces and the tone that sounds it.
#[derive(Debug, Clone, Copy)]
struct ToneCue {
    phase: Phase,
    spec: ToneSpec,
}

/// The three cues of a cycle, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy)]
struct CuePlan {
    start: ToneCue,
    top: ToneCue,
    impact: ToneCue,
}

impl CuePlan {
    fn from_config(tones: &ToneConfig) -> Self {
        Self {
            start: ToneCue {
                phase: Phase::Start,
                spec: ToneSpec {
                    frequency_hz: tones.start_frequency_hz,
                    duration_secs: tones.duration_secs,
                    waveform: Waveform::Sine,
                },
            },
            top: ToneCue {
                phase: Phase::Top,
                spec: ToneSpec {
                    frequency_hz: tones.top_frequency_hz,
                    duration_secs: tones.duration_secs,
                    waveform: Waveform::Sine,
                },
            },
            impact: ToneCue {
                phase: Phase::Impact,
                spec: ToneSpec {
                    frequency_hz: tones.impact_frequency_hz,
                    duration_secs: tones.duration_secs,
                    waveform: Waveform::Square,
                },
            },
        }
    }
}

/// Cadence scheduler state machine.
///
/// Two states: Idle (no session, phase Idle) and Running (exactly one live
/// session). At most one scheduling loop exists at any time; a `start`
/// while running is a no-op.
pub struct CadenceScheduler {
    timing: TimingConfig,
    cues: CuePlan,
    sink: Arc<dyn ToneSink>,
    phase: Arc<PhaseState>,
    /// Current session token; bumped by stop() to invalidate in-flight work.
    generation: Arc<AtomicU64>,
    session: Mutex<Option<ScheduleHandle>>,
    runtime: Handle,
}

impl CadenceScheduler {
    /// Create a scheduler that spawns its driver task on `runtime`.
    pub fn new(
        timing: TimingConfig,
        tones: ToneConfig,
        sink: Arc<dyn ToneSink>,
        runtime: Handle,
    ) -> Self {
        Self {
            timing,
            cues: CuePlan::from_config(&tones),
            sink,
            phase: Arc::new(PhaseState::new()),
            generation: Arc::new(AtomicU64::new(0)),
            session: Mutex::new(None),
            runtime,
        }
    }

    /// Begin looping the cadence cycle for `preset`.
    ///
    /// # Returns
    /// * `Ok(())` - Loop started, or already running (no-op; never a second loop)
    /// * `Err(CadenceError)` - Invalid preset or timing configuration
    pub fn start(&self, preset: &CadencePreset) -> Result<(), CadenceError> {
        preset.validate()?;
        if self.timing.frame_rate == 0 {
            return Err(CadenceError::FrameRateInvalid {
                frame_rate: self.timing.frame_rate,
            });
        }

        let mut session = self.lock_session()?;
        if session.is_some() {
            log::debug!("[CadenceScheduler] start ignored: already running");
            return Ok(());
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let offsets = CycleOffsets::for_preset(preset, &self.timing);
        let driver = self.runtime.spawn(run_cycles(
            generation,
            Arc::clone(&self.generation),
            Arc::clone(&self.phase),
            Arc::clone(&self.sink),
            self.cues,
            offsets,
        ));
        *session = Some(ScheduleHandle { generation, driver });

        log::info!(
            "[CadenceScheduler] started session {} (backswing {} frames, downswing {} frames)",
            generation,
            preset.backswing_frames,
            preset.downswing_frames
        );
        Ok(())
    }

    /// Cancel the current session, if any, and reset the phase to Idle.
    ///
    /// Safe to call from Idle and idempotent: redundant stops do nothing.
    pub fn stop(&self) {
        // Invalidate the token before touching the task, so no pending
        // callback can act past this point even if the abort races it.
        self.generation.fetch_add(1, Ordering::SeqCst);

        let taken = match self.session.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(handle) = taken {
            handle.driver.abort();
            self.phase.set(Phase::Idle);
            log::info!("[CadenceScheduler] stopped session {}", handle.generation);
        }
    }

    /// Whether a scheduling session is currently live.
    pub fn is_running(&self) -> bool {
        match self.session.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// The cue that fired most recently.
    pub fn current_phase(&self) -> Phase {
        self.phase.get()
    }

    /// Subscribe to phase transitions.
    pub fn subscribe_phase(&self) -> broadcast::Receiver<Phase> {
        self.phase.subscribe()
    }

    fn lock_session(&self) -> Result<std::sync::MutexGuard<'_, Option<ScheduleHandle>>, CadenceError> {
        self.session.lock().map_err(|_| CadenceError::LockPoisoned {
            component: "scheduler_session".to_string(),
        })
    }
}

/// Driver task: fire the cue sequence against absolute deadlines, then loop.
///
/// `session` is the token stamped at start; `current` is the shared counter
/// that stop() bumps. Reading `current` at every wake-up (rather than a
/// value captured at schedule time) is what makes cancellation immune to
/// the stale-closure race.
async fn run_cycles(
    session: u64,
    current: Arc<AtomicU64>,
    phase: Arc<PhaseState>,
    sink: Arc<dyn ToneSink>,
    cues: CuePlan,
    offsets: CycleOffsets,
) {
    let mut origin = Instant::now();
    loop {
        if current.load(Ordering::SeqCst) != session {
            return;
        }
        fire_cue(&phase, sink.as_ref(), &cues.start);

        sleep_until(origin + offsets.top).await;
        if current.load(Ordering::SeqCst) != session {
            return;
        }
        fire_cue(&phase, sink.as_ref(), &cues.top);

        sleep_until(origin + offsets.impact).await;
        if current.load(Ordering::SeqCst) != session {
            return;
        }
        fire_cue(&phase, sink.as_ref(), &cues.impact);

        sleep_until(origin + offsets.reset).await;
        if current.load(Ordering::SeqCst) != session {
            return;
        }
        phase.set(Phase::Idle);

        sleep_until(origin + offsets.cycle).await;
        origin += offsets.cycle;
    }
}

/// Announce the phase, then sound the tone. The phase transition comes
/// first so the visual cue proceeds on schedule even when audio is
/// unavailable; tone failures are logged and swallowed.
fn fire_cue(phase: &PhaseState, sink: &dyn ToneSink, cue: &ToneCue) {
    phase.set(cue.phase);
    if let Err(err) = sink.play_tone(cue.spec) {
        log_audio_error(&err, "cadence_cue");
    }
}
