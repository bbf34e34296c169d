/// Note-offset sequencer driven by an interval pattern and a speed
/// parameter.
///
/// The arpeggiator holds a small pattern of semitone offsets (root first)
/// and steps through it at a tempo derived from the live speed control.
/// The step length is recomputed every sample so DAW automation of the
/// speed takes effect immediately; the output is always the frequency of
/// the current note, whether or not a step just happened.

use crate::midi_note_to_hz;
use crate::params::{ArpOctaves, ArpPattern, ParamSnapshot};

/// Fixed patterns top out at 5 entries; random is root + 6 offsets.
const MAX_PATTERN_LEN: usize = 8;

/// Offsets drawn for the random pattern, on top of the mandatory root.
const RANDOM_OFFSETS: usize = 6;

pub struct Arpeggiator {
    pattern: Vec<i32>,
    note_index: usize,
    octave_increment: i32,
    num_octaves: i32,
    root_note: i32,
    current_note: i32,
    samples_per_note: u32,
    sample_counter: u32,
    sample_rate: f32,
    rng_state: u32,
}

impl Arpeggiator {
    /// The seed decorrelates the random pattern between voices; the RNG
    /// state then advances across note-ons, so each note-on that selects
    /// the random pattern draws a fresh one.
    pub fn new(seed: u32) -> Self {
        Self {
            pattern: Vec::with_capacity(MAX_PATTERN_LEN),
            note_index: 1,
            octave_increment: 0,
            num_octaves: 0,
            root_note: 0,
            current_note: 0,
            samples_per_note: 44_100,
            sample_counter: 0,
            sample_rate: 44_100.0,
            rng_state: seed,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Reset playback state for a new root note and rebuild the pattern
    /// from the current pattern selector. The root sounds immediately, so
    /// stepping starts at the second pattern entry.
    pub fn start_arpeggio(&mut self, root_note: i32, params: &ParamSnapshot) {
        self.root_note = root_note;
        self.current_note = root_note;
        self.octave_increment = 0;
        self.note_index = 1;
        self.sample_counter = 0;
        self.num_octaves = params.arp_octaves.count();
        self.rebuild_pattern(params.arp_pattern);
    }

    /// Advance one sample and return the frequency of the current note.
    pub fn next_frequency(&mut self, params: &ParamSnapshot) -> f32 {
        // Recomputed every sample: the host may automate the speed
        // mid-note. speed 0 -> ~0.505 s per step, speed 1 -> ~0.005 s.
        // The product runs in f64: in f32, `1.01 - 1.0` lands just below
        // 0.01 and the truncation loses a whole sample at the extremes.
        let speed = params.arp_speed.clamp(0.0, 1.0) as f64;
        self.samples_per_note = (self.sample_rate as f64 * 0.5 * (1.01 - speed)) as u32;

        if self.sample_counter >= self.samples_per_note {
            self.sample_counter = 0;
            let index = self.note_index.min(self.pattern.len() - 1);
            self.current_note =
                self.root_note + self.pattern[index] + 12 * self.octave_increment;
            self.advance_index();
        }
        self.sample_counter += 1;

        midi_note_to_hz(self.current_note)
    }

    fn advance_index(&mut self) {
        self.note_index += 1;
        if self.note_index >= self.pattern.len() {
            if self.num_octaves > 0 {
                self.note_index = 0;
                self.octave_increment += 1;
                if self.octave_increment >= self.num_octaves {
                    self.octave_increment = 0;
                }
            } else {
                // No octave cycling: hold the last note.
                self.note_index = self.pattern.len() - 1;
            }
        }
    }

    fn rebuild_pattern(&mut self, selector: ArpPattern) {
        self.pattern.clear();
        if selector == ArpPattern::Random {
            self.pattern.push(0);
            for _ in 0..RANDOM_OFFSETS {
                let interval = self.next_random_interval();
                self.pattern.push(interval);
            }
        } else {
            self.pattern.extend_from_slice(selector.intervals());
        }
    }

    /// Uniform draw from [-7, 7] semitones.
    fn next_random_interval(&mut self) -> i32 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        ((self.rng_state >> 16) % 15) as i32 - 7
    }
}
