/// Sound engine: procedural effects for the card via rodio.
///
/// Every effect is synthesized into an in-memory WAV buffer once, at init.
/// Playback is fire-and-forget through a detached rodio `Sink`.
///
///   - launch  : rising whistle when a rocket leaves the ground
///   - burst   : short crackle when a rocket explodes
///   - chime   : bell arpeggio at midnight
///   - click   : soft tick on page changes
///
/// Build without the "sound" feature (or pass `--mute`) and the stub
/// `SoundEngine` does nothing.

use std::f32::consts::TAU;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use log::warn;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{gen_burst, gen_chime, gen_click, gen_launch, make_wav};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_launch: Arc<Vec<u8>>,
        sfx_burst: Arc<Vec<u8>>,
        sfx_chime: Arc<Vec<u8>>,
        sfx_click: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("no audio output: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_launch: Arc::new(make_wav(&gen_launch())),
                sfx_burst: Arc::new(make_wav(&gen_burst())),
                sfx_chime: Arc::new(make_wav(&gen_chime())),
                sfx_click: Arc::new(make_wav(&gen_click())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_launch(&self) { self.play(&self.sfx_launch); }
        pub fn play_burst(&self) { self.play(&self.sfx_burst); }
        pub fn play_chime(&self) { self.play(&self.sfx_chime); }
        pub fn play_click(&self) { self.play(&self.sfx_click); }
    }
}

// ════════════════════════════════════════════════════════════
//  Waveform generators: mono f32 samples in [-1, 1]
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn samples_for(duration: f32) -> usize {
    (SAMPLE_RATE as f32 * duration) as usize
}

/// Rocket launch: thin whistle sliding 400Hz → 1400Hz.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_launch() -> Vec<f32> {
    let n = samples_for(0.35);
    let mut phase = 0.0_f32;
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let freq = 400.0 + t * 1000.0;
            phase += freq / SAMPLE_RATE as f32;
            let env = (t * 8.0).min(1.0) * (1.0 - t);
            (phase * TAU).sin() * env * 0.12
        })
        .collect()
}

/// Burst: decaying noise over a low thump.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_burst() -> Vec<f32> {
    let n = samples_for(0.4);
    let mut rng = fastrand::Rng::with_seed(0x5EED);
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let ti = i as f32 / SAMPLE_RATE as f32;
            let thump = (ti * 70.0 * TAU).sin() * (1.0 - t).powf(4.0);
            let noise = rng.f32() * 2.0 - 1.0;
            // Sparse crackle in the tail.
            let crackle = if rng.f32() < 0.02 { noise } else { noise * 0.3 };
            (thump * 0.5 + crackle * (1.0 - t).powf(2.0) * 0.5) * 0.35
        })
        .collect()
}

/// Midnight chime: C5 → E5 → G5 → C6 bell tones, last one held.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_chime() -> Vec<f32> {
    let notes = [(523.0_f32, 0.18), (659.0, 0.18), (784.0, 0.18), (1047.0, 0.6)];
    let mut samples = Vec::new();
    for &(freq, dur) in &notes {
        let n = samples_for(dur);
        for i in 0..n {
            let ti = i as f32 / SAMPLE_RATE as f32;
            let env = (-ti * 6.0).exp();
            let wave = (ti * freq * TAU).sin() * 0.7 + (ti * freq * 2.0 * TAU).sin() * 0.3;
            samples.push(wave * env * 0.3);
        }
    }
    samples
}

/// Page change: 20ms tick.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_click() -> Vec<f32> {
    let n = samples_for(0.02);
    (0..n)
        .map(|i| {
            let ti = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - i as f32 / n as f32;
            (ti * 1800.0 * TAU).sin() * env * env * 0.2
        })
        .collect()
}

// ════════════════════════════════════════════════════════════
//  WAV encoder: 16-bit PCM mono
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * num_channels as u32 * bits_per_sample as u32 / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_launch(&self) {}
    pub fn play_burst(&self) {}
    pub fn play_chime(&self) {}
    pub fn play_click(&self) {}
}
