use rodio::Source;
use std::f32::consts::TAU;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;

/// Two-tone alarm beep: `BEEPS` short pulses alternating between a high and
/// a low pitch, with a gap after each. Finite, so one chime per bell signal.
pub struct AlarmChime {
    sample_rate: u32,
    position: u32,
    total_samples: u32,
    phase: f32,
}

const BEEPS: u32 = 4;
const BEEP_SECS: f32 = 0.18;
const GAP_SECS: f32 = 0.07;
const HIGH_HZ: f32 = 1046.5; // C6
const LOW_HZ: f32 = 784.0; // G5

impl AlarmChime {
    pub fn new() -> Self {
        let per_beep = ((BEEP_SECS + GAP_SECS) * SAMPLE_RATE as f32) as u32;
        Self {
            sample_rate: SAMPLE_RATE,
            position: 0,
            total_samples: per_beep * BEEPS,
            phase: 0.0,
        }
    }

    fn samples_per_beep(&self) -> u32 {
        ((BEEP_SECS + GAP_SECS) * self.sample_rate as f32) as u32
    }
}

impl Iterator for AlarmChime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.total_samples {
            return None;
        }

        let per_beep = self.samples_per_beep();
        let beep_index = self.position / per_beep;
        let offset = self.position % per_beep;
        let audible = (BEEP_SECS * self.sample_rate as f32) as u32;
        self.position += 1;

        if offset >= audible {
            self.phase = 0.0;
            return Some(0.0);
        }

        let freq = if beep_index % 2 == 0 { HIGH_HZ } else { LOW_HZ };
        self.phase = (self.phase + freq / self.sample_rate as f32) % 1.0;

        // Short linear fade at both ends of a pulse to avoid clicks
        let fade = (offset.min(audible - offset) as f32 / 400.0).min(1.0);
        Some((self.phase * TAU).sin() * 0.4 * fade)
    }
}

impl Source for AlarmChime {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1 // Mono
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(
            self.total_samples as f32 / self.sample_rate as f32,
        ))
    }
}
