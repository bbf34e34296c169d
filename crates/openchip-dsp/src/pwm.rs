/// Sustain-gated pulse-width sweep.
///
/// The pulse channel only ever uses three discrete widths. Before the
/// sustain window elapses the width is pinned to the mode's starting
/// value; afterwards an internal phasor (rate scaled to 0..10 Hz) sweeps
/// through the mode's widths by scaled truncation. The chosen width is
/// never applied directly: a one-pole smoother with a ~10 ms time
/// constant ramps between the discrete steps so the pulse oscillator
/// never sees a width discontinuity.

use crate::oscillator::Phasor;
use crate::params::{ParamSnapshot, PwmMode};

/// The discrete pulse widths, indexed by the sweep maps.
const PULSE_WIDTHS: [f32; 3] = [0.125, 0.25, 0.5];

/// Smoothing time constant in seconds.
const SMOOTH_TAU: f32 = 0.010;

pub struct PulseWidthMod {
    sweep: Phasor,
    mode: PwmMode,
    width_index: usize,
    smoothed_width: f32,
    smooth_coeff: f32,
    sustain_samples: u32,
    sustain_counter: u32,
    sample_rate: f32,
}

impl Default for PulseWidthMod {
    fn default() -> Self {
        let mut pwm = Self {
            sweep: Phasor::default(),
            mode: PwmMode::EighthToQuarter,
            width_index: 0,
            smoothed_width: PULSE_WIDTHS[0],
            smooth_coeff: 0.0,
            sustain_samples: 0,
            sustain_counter: 0,
            sample_rate: 44_100.0,
        };
        pwm.set_sample_rate(44_100.0);
        pwm
    }
}

impl PulseWidthMod {
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.sweep.set_sample_rate(sample_rate);
        self.smooth_coeff = (-1.0 / (SMOOTH_TAU * sample_rate)).exp();
    }

    /// Note-on reset: restart the sustain window and pin the smoother to
    /// the mode's starting width so the new note doesn't inherit a ramp
    /// from the previous one.
    pub fn start(&mut self, params: &ParamSnapshot) {
        self.mode = params.pwm_mode;
        self.sustain_counter = 0;
        self.width_index = held_index(self.mode);
        self.smoothed_width = PULSE_WIDTHS[self.width_index];
    }

    /// One sample of pulse width for the pulse oscillator.
    pub fn process(&mut self, params: &ParamSnapshot) -> f32 {
        // Rate re-read every sample for automation.
        self.sweep.set_frequency(params.pwm_rate.clamp(0.0, 1.0) * 10.0);
        self.update_sustain(params);

        if self.sustain_counter < self.sustain_samples {
            self.sustain_counter += 1;
            self.width_index = held_index(self.mode);
        } else {
            let osc = self.sweep.advance();
            self.width_index = sweep_index(self.mode, osc);
        }

        let target = PULSE_WIDTHS[self.width_index];
        self.smoothed_width = target + self.smooth_coeff * (self.smoothed_width - target);
        self.smoothed_width
    }

    /// Sustain-parameter or mode changes rearm the window.
    fn update_sustain(&mut self, params: &ParamSnapshot) {
        let fresh = (params.pwm_sustain * self.sample_rate) as u32;
        if fresh != self.sustain_samples {
            self.sustain_samples = fresh;
            self.sustain_counter = 0;
        }
        if params.pwm_mode != self.mode {
            self.mode = params.pwm_mode;
            self.sustain_counter = 0;
        }
    }
}

/// Width held during the sustain window: the mode's starting width.
fn held_index(mode: PwmMode) -> usize {
    match mode {
        PwmMode::EighthToQuarter | PwmMode::EighthToHalf => 0,
        PwmMode::QuarterToHalf | PwmMode::QuarterToEighth => 1,
        PwmMode::HalfToQuarter | PwmMode::HalfToEighth => 2,
    }
}

/// Map the sweep phasor (0..1) onto a width index by scaled truncation.
/// The 1.99/2.99 factors keep the top phase value inside the last bin.
fn sweep_index(mode: PwmMode, osc: f32) -> usize {
    match mode {
        PwmMode::EighthToQuarter => (osc * 1.99) as usize,
        PwmMode::EighthToHalf => (osc * 2.99) as usize,
        PwmMode::QuarterToHalf => (osc * 1.99) as usize + 1,
        PwmMode::QuarterToEighth => ((1.0 - osc) * 1.99) as usize,
        PwmMode::HalfToQuarter => ((1.0 - osc) * 1.99) as usize + 1,
        PwmMode::HalfToEighth => ((1.0 - osc) * 2.99) as usize,
    }
}
