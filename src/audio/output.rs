//! Shared tone output bus backed by cpal
//!
//! One output stream serves every cue tone for the lifetime of the process.
//! The stream lives on a dedicated audio thread (cpal streams are not
//! portable across threads) and is acquired lazily on the first tone, then
//! reused across tones and start/stop cycles; it is only re-`play()`ed when
//! it was suspended, never recreated per tone.
//!
//! Tone commands travel to the audio callback over a lock-free rtrb SPSC
//! queue. The callback mixes every active voice onto the bus, so
//! overlapping tones keep independent decay envelopes.

use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::{render_tone, ToneSink, ToneSpec};
use crate::error::AudioError;

/// Pending-voice queue depth. Cue tones arrive a few per second; the queue
/// only needs to absorb a short scheduling burst.
const VOICE_QUEUE_CAPACITY: usize = 16;

/// One in-flight tone: pre-rendered samples plus a playback cursor.
struct Voice {
    samples: Vec<f32>,
    position: usize,
}

impl Voice {
    fn is_finished(&self) -> bool {
        self.position >= self.samples.len()
    }
}

/// Handle to the lazily-created output stream thread.
struct OutputBus {
    producer: rtrb::Producer<Voice>,
    /// Audio thread handle, unparked to resume a suspended stream.
    audio_thread: thread::Thread,
    sample_rate: u32,
}

/// Tone sink that mixes cue tones onto a shared cpal output stream.
pub struct CpalToneSink {
    master_gain: f32,
    bus: Mutex<Option<OutputBus>>,
}

impl CpalToneSink {
    /// Create a sink. No audio resources are acquired until the first
    /// `play_tone` call.
    pub fn new(master_gain: f32) -> Self {
        Self {
            master_gain,
            bus: Mutex::new(None),
        }
    }

    fn lock_bus(&self) -> Result<std::sync::MutexGuard<'_, Option<OutputBus>>, AudioError> {
        self.bus.lock().map_err(|_| AudioError::LockPoisoned {
            component: "tone_output_bus".to_string(),
        })
    }
}

impl ToneSink for CpalToneSink {
    fn play_tone(&self, spec: ToneSpec) -> Result<(), AudioError> {
        spec.validate()?;

        let mut bus_guard = self.lock_bus()?;
        if bus_guard.is_none() {
            *bus_guard = Some(OutputBus::open()?);
        }
        let bus = bus_guard.as_mut().ok_or_else(|| AudioError::DeviceUnavailable {
            details: "output bus missing after initialization".to_string(),
        })?;

        let mut samples = render_tone(
            spec.frequency_hz,
            spec.duration_secs,
            spec.waveform,
            bus.sample_rate,
        );
        if self.master_gain != 1.0 {
            for sample in &mut samples {
                *sample *= self.master_gain;
            }
        }

        bus.producer
            .push(Voice {
                samples,
                position: 0,
            })
            .map_err(|_| AudioError::VoiceQueueFull)?;

        // Wake the audio thread so it can resume the stream if suspended.
        bus.audio_thread.unpark();
        Ok(())
    }
}

impl OutputBus {
    /// Spawn the audio thread and wait for it to open the output stream.
    fn open() -> Result<Self, AudioError> {
        let (producer, consumer) = rtrb::RingBuffer::<Voice>::new(VOICE_QUEUE_CAPACITY);
        let (init_tx, init_rx) = mpsc::channel();

        let join_handle = thread::Builder::new()
            .name("tone-output".to_string())
            .spawn(move || run_output_thread(consumer, init_tx))?;
        let audio_thread = join_handle.thread().clone();

        match init_rx.recv() {
            Ok(Ok(sample_rate)) => {
                log::info!(
                    "[ToneOutput] Output stream opened at {} Hz",
                    sample_rate
                );
                Ok(Self {
                    producer,
                    audio_thread,
                    sample_rate,
                })
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(AudioError::StreamOpenFailed {
                reason: "output thread exited before initialization".to_string(),
            }),
        }
    }
}

/// Body of the dedicated audio thread: open the stream, report readiness,
/// then keep the stream alive for the rest of the process, resuming it on
/// each wake-up.
fn run_output_thread(
    consumer: rtrb::Consumer<Voice>,
    init_tx: mpsc::Sender<Result<u32, AudioError>>,
) {
    let (stream, sample_rate) = match build_output_stream(consumer) {
        Ok(built) => built,
        Err(err) => {
            let _ = init_tx.send(Err(err));
            return;
        }
    };

    if let Err(err) = stream.play() {
        let _ = init_tx.send(Err(AudioError::StreamOpenFailed {
            reason: format!("Output start failed: {}", err),
        }));
        return;
    }

    let _ = init_tx.send(Ok(sample_rate));

    loop {
        thread::park();
        // play() on an already-playing stream is a no-op; on a suspended
        // stream it resumes without recreating the device context.
        if let Err(err) = stream.play() {
            log::error!("[ToneOutput] Failed to resume output stream: {}", err);
        }
    }
}

fn build_output_stream(
    mut consumer: rtrb::Consumer<Voice>,
) -> Result<(cpal::Stream, u32), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::DeviceUnavailable {
            details: "No default output device found".to_string(),
        })?;

    let config = device
        .default_output_config()
        .map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("Failed to get default output config: {:?}", e),
        })?;

    let stream_config: cpal::StreamConfig = config.clone().into();
    let channels_count = stream_config.channels as usize;
    let sample_rate = stream_config.sample_rate.0;

    let err_fn = |err| log::error!("[ToneOutput] Output stream error: {}", err);

    // Voices live entirely inside the callback; the control side only ever
    // pushes new ones through the ring buffer.
    let mut active: Vec<Voice> = Vec::with_capacity(VOICE_QUEUE_CAPACITY);

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                while let Ok(voice) = consumer.pop() {
                    active.push(voice);
                }

                let frame_count = data.len() / channels_count;
                for i in 0..frame_count {
                    let mut mixed = 0.0f32;
                    for voice in active.iter_mut() {
                        if voice.position < voice.samples.len() {
                            mixed += voice.samples[voice.position];
                            voice.position += 1;
                        }
                    }
                    let sample_val = mixed.clamp(-1.0, 1.0);
                    for ch in 0..channels_count {
                        data[i * channels_count + ch] = sample_val;
                    }
                }

                active.retain(|voice| !voice.is_finished());
            },
            err_fn,
            None,
        ),
        _ => {
            return Err(AudioError::StreamOpenFailed {
                reason: "Only F32 sample format is currently supported for output".to_string(),
            })
        }
    }
    .map_err(|e| AudioError::StreamOpenFailed {
        reason: format!("{:?}", e),
    })?;

    Ok((stream, sample_rate))
}
