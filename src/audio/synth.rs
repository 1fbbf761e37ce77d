//! Tone synthesizer - cue tone sample rendering
//!
//! Renders one short tone as a mono sample buffer: a sine or square
//! oscillation under an exponential decay envelope. The envelope is
//! mandatory; a hard cutoff at the end of the buffer produces an audible
//! click. Rendering is pure and deterministic, so overlapping tones mixed
//! on the output bus keep fully independent envelopes.

use super::Waveform;

/// Residual amplitude fraction the envelope reaches at the end of the tone.
const ENVELOPE_FLOOR: f32 = 1e-3;

/// Linear gain for sine cues.
const SINE_GAIN: f32 = 0.8;

/// Linear gain for square cues. A square wave carries far more energy than
/// a sine at the same peak, so it is rendered quieter to sit at a similar
/// perceived level without clipping the mix bus.
const SQUARE_GAIN: f32 = 0.4;

/// Render one cue tone into a mono sample buffer.
///
/// The amplitude starts at the waveform gain and decays exponentially to
/// `ENVELOPE_FLOOR` of that level over `duration_secs`.
///
/// # Arguments
/// * `frequency_hz` - Oscillator frequency (> 0)
/// * `duration_secs` - Tone length in seconds (> 0)
/// * `waveform` - Sine or square timbre
/// * `sample_rate` - Output sample rate in Hz
///
/// # Returns
/// A `Vec<f32>` of `duration_secs × sample_rate` samples in [-1.0, 1.0].
/// Non-positive durations render an empty buffer.
pub fn render_tone(
    frequency_hz: f32,
    duration_secs: f32,
    waveform: Waveform,
    sample_rate: u32,
) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration_secs.max(0.0)) as usize;
    if num_samples == 0 {
        return Vec::new();
    }

    // Decay constant chosen so the envelope hits ENVELOPE_FLOOR exactly at
    // the end of the buffer.
    let decay = ENVELOPE_FLOOR.ln().abs() / duration_secs;
    let gain = match waveform {
        Waveform::Sine => SINE_GAIN,
        Waveform::Square => SQUARE_GAIN,
    };

    let mut samples = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let t = i as f32 / sample_rate as f32;
        let envelope = (-decay * t).exp();
        let cycle = (std::f32::consts::TAU * frequency_hz * t).sin();
        let raw = match waveform {
            Waveform::Sine => cycle,
            Waveform::Square => {
                if cycle >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
        };
        samples.push(raw * envelope * gain);
    }

    samples
}
