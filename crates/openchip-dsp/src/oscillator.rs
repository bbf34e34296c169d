/// Phase-accumulating oscillator bank with PolyBLEP anti-aliasing.
///
/// A `Phasor` keeps a unit-interval phase that advances by
/// `frequency / sample_rate` per sample. The waveform shapers wrap one and
/// map its phase to a sample: sine, pulse (PolyBLEP-corrected at both
/// edges), the NES-style asymmetric triangle, and a plain sawtooth.

use std::f32::consts::TAU;

/// Common contract for every waveform shaper.
///
/// Call `set_sample_rate` before `set_frequency`; the phase increment is
/// derived from both. `process` advances one sample and returns it.
pub trait Waveform {
    fn set_sample_rate(&mut self, sample_rate: f32);
    fn set_frequency(&mut self, frequency: f32);
    fn process(&mut self) -> f32;
}

/// Unit-interval phase accumulator.
#[derive(Clone, Copy)]
pub struct Phasor {
    phase: f32,
    phase_delta: f32,
    frequency: f32,
    sample_rate: f32,
}

impl Default for Phasor {
    fn default() -> Self {
        Self {
            phase: 0.0,
            phase_delta: 0.0,
            frequency: 0.0,
            sample_rate: 44_100.0,
        }
    }
}

impl Phasor {
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.phase_delta = frequency / self.sample_rate;
    }

    pub fn phase_delta(&self) -> f32 {
        self.phase_delta
    }

    /// Advance the phase by one sample and return it. Wraps at 1.0 so the
    /// phase stays in [0, 1).
    pub fn advance(&mut self) -> f32 {
        self.phase += self.phase_delta;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        self.phase
    }

    /// PolyBLEP residual for a unit step at phase 0, evaluated over a
    /// one-sample window on either side of the discontinuity.
    pub fn poly_blep(&self, t: f32) -> f32 {
        let dt = self.phase_delta;
        if t < dt {
            // Just after the step
            let t = t / dt;
            t + t - t * t - 1.0
        } else if t > 1.0 - dt {
            // Just before the step
            let t = (t - 1.0) / dt;
            t * t + t + t + 1.0
        } else {
            0.0
        }
    }
}

/// Sine oscillator. Also serves as the vibrato LFO.
#[derive(Default, Clone, Copy)]
pub struct SineOsc {
    phasor: Phasor,
}

impl Waveform for SineOsc {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.phasor.set_sample_rate(sample_rate);
    }

    fn set_frequency(&mut self, frequency: f32) {
        self.phasor.set_frequency(frequency);
    }

    fn process(&mut self) -> f32 {
        (self.phasor.advance() * TAU).sin()
    }
}

/// Pulse/square oscillator with adjustable pulse width.
///
/// Both discontinuities (rising edge at phase 0, falling edge at the pulse
/// width) get a PolyBLEP correction. The width may change mid-cycle; the
/// correction always uses the current width.
#[derive(Clone, Copy)]
pub struct PulseOsc {
    phasor: Phasor,
    pulse_width: f32,
}

impl Default for PulseOsc {
    fn default() -> Self {
        Self {
            phasor: Phasor::default(),
            pulse_width: 0.5,
        }
    }
}

impl PulseOsc {
    pub fn set_pulse_width(&mut self, pulse_width: f32) {
        self.pulse_width = pulse_width;
    }
}

impl Waveform for PulseOsc {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.phasor.set_sample_rate(sample_rate);
    }

    fn set_frequency(&mut self, frequency: f32) {
        self.phasor.set_frequency(frequency);
    }

    fn process(&mut self) -> f32 {
        let p = self.phasor.advance();
        let mut out = if p < self.pulse_width { 1.0 } else { -1.0 };
        out += self.phasor.poly_blep(p);
        out -= self.phasor.poly_blep((p + (1.0 - self.pulse_width)) % 1.0);
        out
    }
}

/// NES-style triangle oscillator.
///
/// Linear rise over the first half of the cycle, slightly curved
/// (quadratic) fall over the second half, output halved to [-0.5, 0.5].
#[derive(Default, Clone, Copy)]
pub struct TriangleOsc {
    phasor: Phasor,
}

impl Waveform for TriangleOsc {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.phasor.set_sample_rate(sample_rate);
    }

    fn set_frequency(&mut self, frequency: f32) {
        self.phasor.set_frequency(frequency);
    }

    fn process(&mut self) -> f32 {
        let p = self.phasor.advance();
        let v = if p < 0.5 {
            p * 4.0 - 1.0
        } else {
            let t = (p - 0.5) * 2.0;
            1.0 - 2.0 * t * t
        };
        v / 2.0
    }
}

/// Plain sawtooth oscillator: `phase - 0.5`.
#[derive(Default, Clone, Copy)]
pub struct SawOsc {
    phasor: Phasor,
}

impl Waveform for SawOsc {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.phasor.set_sample_rate(sample_rate);
    }

    fn set_frequency(&mut self, frequency: f32) {
        self.phasor.set_frequency(frequency);
    }

    fn process(&mut self) -> f32 {
        self.phasor.advance() - 0.5
    }
}
