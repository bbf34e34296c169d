/// One-shot linear frequency ramp.
///
/// At note-on the bend starts from the played note offset by a signed
/// semitone parameter and ramps to the played note's frequency over a
/// configurable duration. The ramp is terminal: once the target is
/// reached it holds until the next note-on re-initializes it.

use crate::midi_note_to_hz;
use crate::params::ParamSnapshot;

pub struct PitchBend {
    target_freq: f32,
    current_freq: f32,
    bend_delta: f32,
    samples_remaining: u32,
    sample_rate: f32,
}

impl Default for PitchBend {
    fn default() -> Self {
        Self {
            target_freq: 0.0,
            current_freq: 0.0,
            bend_delta: 0.0,
            samples_remaining: 0,
            sample_rate: 44_100.0,
        }
    }
}

impl PitchBend {
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Initialize the ramp for a new note. Reads the starting offset and
    /// duration from the snapshot at note-on; later automation of those
    /// parameters only affects the next note.
    pub fn start_bend(&mut self, note: i32, params: &ParamSnapshot) {
        self.target_freq = midi_note_to_hz(note);
        self.current_freq = midi_note_to_hz(note + params.pb_init_pitch);

        let bend_samples = (params.pb_time * self.sample_rate) as u32;
        self.samples_remaining = bend_samples;
        if bend_samples == 0 {
            self.current_freq = self.target_freq;
            self.bend_delta = 0.0;
        } else {
            self.bend_delta = (self.target_freq - self.current_freq) / bend_samples as f32;
        }
    }

    /// Step the frequency one sample toward the target. After exactly
    /// `bend_samples` calls the output equals the target, with no
    /// residual delta from float accumulation.
    pub fn process(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current_freq += self.bend_delta;
            self.samples_remaining -= 1;

            let overshot = (self.bend_delta > 0.0 && self.current_freq > self.target_freq)
                || (self.bend_delta < 0.0 && self.current_freq < self.target_freq);
            if self.samples_remaining == 0 || overshot {
                self.current_freq = self.target_freq;
                self.samples_remaining = 0;
            }
        }
        self.current_freq
    }
}
