/// One monophonic chiptune voice.
///
/// A voice owns one instance of every per-note subsystem: the three
/// oscillator flavours, the arpeggiator, the pitch bend ramp, the
/// vibrato LFO, the pulse-width sweep, a bitcrusher for the distorted
/// triangle, and the amplitude envelope. Per sample the frequency
/// modulators run first (arpeggiator, then pitch bend, then vibrato),
/// the selected oscillator renders at the resulting frequency, and the
/// envelope scales the output.

use crate::arpeggiator::Arpeggiator;
use crate::bitcrusher::Bitcrusher;
use crate::envelope::Envelope;
use crate::midi_note_to_hz;
use crate::noise::Noise;
use crate::oscillator::{PulseOsc, TriangleOsc, Waveform};
use crate::params::{OscType, ParamSnapshot};
use crate::pitch_bend::PitchBend;
use crate::pwm::PulseWidthMod;
use crate::vibrato::Vibrato;

/// Rate and depth of the triangle's optional crush. Fixed, not exposed:
/// this is the "NES triangle" grit, not the bus bitcrusher.
const TRI_CRUSH_RATE: u32 = 2;
const TRI_CRUSH_BITS: u32 = 4;

pub struct Voice {
    playing: bool,
    note: i32,
    base_freq: f32,
    velocity: f32,
    pulse: PulseOsc,
    triangle: TriangleOsc,
    noise: Noise,
    tri_crusher: Bitcrusher,
    pwm: PulseWidthMod,
    arpeggiator: Arpeggiator,
    pitch_bend: PitchBend,
    vibrato: Vibrato,
    envelope: Envelope,
    white_state: u32,
}

impl Voice {
    /// The seed decorrelates this voice's random draws (white noise and
    /// random arpeggio patterns) from its pool siblings.
    pub fn new(sample_rate: f32, seed: u32) -> Self {
        let mut voice = Self {
            playing: false,
            note: 0,
            base_freq: 0.0,
            velocity: 0.0,
            pulse: PulseOsc::default(),
            triangle: TriangleOsc::default(),
            noise: Noise::with_seed(seed),
            tri_crusher: Bitcrusher::new(TRI_CRUSH_RATE, TRI_CRUSH_BITS),
            pwm: PulseWidthMod::default(),
            arpeggiator: Arpeggiator::new(seed),
            pitch_bend: PitchBend::default(),
            vibrato: Vibrato::default(),
            envelope: Envelope::default(),
            white_state: seed,
        };
        voice.set_sample_rate(sample_rate);
        voice
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.pulse.set_sample_rate(sample_rate);
        self.triangle.set_sample_rate(sample_rate);
        self.noise.set_sample_rate(sample_rate);
        self.pwm.set_sample_rate(sample_rate);
        self.arpeggiator.set_sample_rate(sample_rate);
        self.pitch_bend.set_sample_rate(sample_rate);
        self.vibrato.set_sample_rate(sample_rate);
        self.envelope.set_sample_rate(sample_rate);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn note(&self) -> i32 {
        self.note
    }

    /// Start a note. Every modulator is re-armed whether or not its
    /// switch is on, so toggling a switch mid-note picks up coherent
    /// state instead of a stale ramp.
    pub fn start_note(&mut self, note: i32, velocity: f32, params: &ParamSnapshot) {
        self.playing = true;
        self.note = note;
        self.base_freq = midi_note_to_hz(note);
        self.velocity = velocity;

        self.pulse.set_pulse_width(params.pulse_width.width());
        self.pwm.start(params);
        self.arpeggiator.start_arpeggio(note, params);
        self.pitch_bend.start_bend(note, params);
        self.vibrato.reset_sustain_counter();
        self.tri_crusher.reset();

        self.envelope
            .set_parameters(params.attack, params.decay, params.sustain, params.release);
        self.envelope.note_on();
    }

    pub fn stop_note(&mut self, allow_tail_off: bool) {
        if allow_tail_off {
            self.envelope.note_off();
        } else {
            self.envelope.reset();
            self.playing = false;
        }
    }

    pub fn render_next_sample(&mut self, params: &ParamSnapshot) -> f32 {
        if !self.playing {
            return 0.0;
        }

        // Frequency chain: arpeggiator replaces the base note, the bend
        // ramp replaces both, vibrato multiplies whatever survived.
        let mut freq = if params.arp_switch {
            self.arpeggiator.next_frequency(params)
        } else {
            self.base_freq
        };
        if params.pb_switch {
            freq = self.pitch_bend.process();
        }
        let vib = self.vibrato.process(params);
        if params.vib_switch {
            freq *= 1.0 + vib;
        }

        let sample = match params.osc_type {
            OscType::Pulse => {
                let width = if params.pwm_switch {
                    self.pwm.process(params)
                } else {
                    params.pulse_width.width()
                };
                self.pulse.set_pulse_width(width);
                self.pulse.set_frequency(freq);
                self.pulse.process() / 2.0
            }
            OscType::Triangle => {
                self.triangle.set_frequency(freq);
                // Crush the raw half-scale triangle (the crusher's grid
                // assumes [-0.5, 0.5]), then boost.
                let raw = self.triangle.process();
                let shaped = if params.tri_distortion {
                    self.tri_crusher.process(raw)
                } else {
                    raw
                };
                shaped * 1.2
            }
            OscType::Noise => {
                if params.noise_distortion {
                    self.noise.set_frequency(freq);
                    self.noise.process() * 0.5
                } else {
                    self.next_white_sample()
                }
            }
        };

        self.envelope
            .set_parameters(params.attack, params.decay, params.sustain, params.release);
        let out = sample * 0.5 * self.velocity * self.envelope.next_sample();

        if !self.envelope.is_active() {
            self.playing = false;
        }
        out
    }

    /// Plain white noise in [-0.5, 0.5).
    fn next_white_sample(&mut self) -> f32 {
        self.white_state = self
            .white_state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        (self.white_state >> 8) as f32 / (1u32 << 24) as f32 - 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ArpOctaves, ArpPattern, PulseWidth};

    fn render(voice: &mut Voice, params: &ParamSnapshot, n: usize) -> Vec<f32> {
        (0..n).map(|_| voice.render_next_sample(params)).collect()
    }

    #[test]
    fn test_silent_until_started() {
        let mut voice = Voice::new(44_100.0, 1);
        let p = ParamSnapshot::default();
        for s in render(&mut voice, &p, 100) {
            assert_eq!(s, 0.0);
        }
        assert!(!voice.is_playing());
    }

    #[test]
    fn test_produces_audio_after_note_on() {
        let mut voice = Voice::new(44_100.0, 1);
        let p = ParamSnapshot::default();
        voice.start_note(69, 0.8, &p);
        assert!(voice.is_playing());
        assert_eq!(voice.note(), 69);

        let out = render(&mut voice, &p, 4_410);
        let energy: f32 = out.iter().map(|s| s * s).sum();
        assert!(energy > 0.0);
        // Pulse path: half-scale oscillator times half-scale headroom.
        for &s in &out {
            assert!(s.abs() <= 0.5, "sample {s} beyond voice headroom");
        }
    }

    #[test]
    fn test_release_ends_the_voice() {
        let mut voice = Voice::new(44_100.0, 1);
        let p = ParamSnapshot::default();
        voice.start_note(60, 1.0, &p);
        render(&mut voice, &p, 1_000);
        voice.stop_note(true);

        // Default release is 10 ms; the envelope must finish well within
        // a second and flip the voice off.
        render(&mut voice, &p, 44_100);
        assert!(!voice.is_playing());
        assert_eq!(voice.render_next_sample(&p), 0.0);
    }

    #[test]
    fn test_hard_stop_is_immediate() {
        let mut voice = Voice::new(44_100.0, 1);
        let p = ParamSnapshot::default();
        voice.start_note(60, 1.0, &p);
        render(&mut voice, &p, 100);
        voice.stop_note(false);
        assert!(!voice.is_playing());
        assert_eq!(voice.render_next_sample(&p), 0.0);
    }

    #[test]
    fn test_triangle_crush_limits_levels() {
        let p = ParamSnapshot {
            osc_type: OscType::Triangle,
            tri_distortion: true,
            ..ParamSnapshot::default()
        };
        let mut voice = Voice::new(44_100.0, 1);
        voice.start_note(45, 1.0, &p);
        // Past the attack, with sustain at 1.0 the envelope is flat, so
        // the crushed triangle shows a small set of distinct levels.
        render(&mut voice, &p, 2_000);
        let out = render(&mut voice, &p, 2_000);
        let mut levels: Vec<u32> = out.iter().map(|s| (s + 0.0).to_bits()).collect();
        levels.sort_unstable();
        levels.dedup();
        assert!(levels.len() <= 40, "got {} levels from a 4-bit crush", levels.len());
    }

    #[test]
    fn test_triangle_is_crushed_before_the_boost() {
        // 4-bit crush of the raw [-0.5, 0.5] triangle puts the held
        // values on a k/30 grid; the 1.2 boost and the 0.5 headroom then
        // land every output sample on k/50. Boosting before the crush
        // would shift the grid.
        let p = ParamSnapshot {
            osc_type: OscType::Triangle,
            tri_distortion: true,
            ..ParamSnapshot::default()
        };
        let mut voice = Voice::new(44_100.0, 1);
        voice.start_note(45, 1.0, &p);
        render(&mut voice, &p, 2_000); // past the attack, sustain at 1.0
        for s in render(&mut voice, &p, 2_000) {
            let steps = s * 50.0;
            assert!(
                (steps - steps.round()).abs() < 1e-3,
                "sample {s} off the crushed grid"
            );
        }
    }

    #[test]
    fn test_white_noise_mode_fills_range() {
        let p = ParamSnapshot {
            osc_type: OscType::Noise,
            noise_distortion: false,
            ..ParamSnapshot::default()
        };
        let mut voice = Voice::new(44_100.0, 7);
        voice.start_note(60, 1.0, &p);
        render(&mut voice, &p, 2_000);
        let out = render(&mut voice, &p, 10_000);

        let mut positive = 0;
        let mut negative = 0;
        for &s in &out {
            assert!(s.abs() <= 0.25 + 1e-6);
            if s > 0.0 {
                positive += 1;
            } else if s < 0.0 {
                negative += 1;
            }
        }
        assert!(positive > 3_000 && negative > 3_000, "noise is one-sided");
    }

    #[test]
    fn test_arpeggiator_changes_pitch_over_time() {
        let p = ParamSnapshot {
            arp_switch: true,
            arp_pattern: ArpPattern::MajorTriad,
            arp_octaves: ArpOctaves::Two,
            arp_speed: 1.0,
            pulse_width: PulseWidth::Half,
            ..ParamSnapshot::default()
        };
        let mut voice = Voice::new(44_100.0, 1);
        voice.start_note(60, 1.0, &p);

        // Count zero crossings in two windows a few steps apart; a
        // two-octave triad sweep moves the rate noticeably.
        let a = render(&mut voice, &p, 2_000);
        render(&mut voice, &p, 4_410);
        let b = render(&mut voice, &p, 2_000);
        let crossings = |w: &[f32]| {
            w.windows(2)
                .filter(|pair| pair[0] <= 0.0 && pair[1] > 0.0)
                .count()
        };
        assert_ne!(crossings(&a), crossings(&b));
    }
}
