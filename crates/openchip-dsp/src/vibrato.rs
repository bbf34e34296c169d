/// Sustain-gated pitch vibrato.
///
/// For the first `vib_sustain` seconds of a note the output is exactly
/// zero, keeping the attack pitch-stable. After that window a sine LFO
/// runs continuously; the caller applies the result as a multiplicative
/// `(1 + out)` factor on the carrier frequency.

use crate::oscillator::{SineOsc, Waveform};
use crate::params::ParamSnapshot;

/// Depth divisor keeping the modulation subtle: a full-scale amount
/// parameter moves the pitch by at most 1/20000.
const AMOUNT_SCALE: f32 = 20_000.0;

pub struct Vibrato {
    lfo: SineOsc,
    sustain_samples: u32,
    sustain_counter: u32,
    sample_rate: f32,
}

impl Default for Vibrato {
    fn default() -> Self {
        Self {
            lfo: SineOsc::default(),
            sustain_samples: 0,
            sustain_counter: 0,
            sample_rate: 44_100.0,
        }
    }
}

impl Vibrato {
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lfo.set_sample_rate(sample_rate);
    }

    /// Called at note-on so the sustain window restarts.
    pub fn reset_sustain_counter(&mut self) {
        self.sustain_counter = 0;
    }

    /// One sample of pitch offset. Zero during the sustain window.
    pub fn process(&mut self, params: &ParamSnapshot) -> f32 {
        self.update_sustain(params.vib_sustain);

        if self.sustain_counter < self.sustain_samples {
            self.sustain_counter += 1;
            return 0.0;
        }

        // Re-read speed and amount every sample: both may be automated.
        let freq = params.vib_speed * 5.0 + 3.0; // 3..8 Hz
        let depth = params.vib_amount / AMOUNT_SCALE;
        self.lfo.set_frequency(freq);
        self.lfo.process() * depth
    }

    /// A changed sustain parameter rearms the window. The comparison is
    /// on truncated sample counts, so automation noise below one sample
    /// does not retrigger it.
    fn update_sustain(&mut self, sustain_secs: f32) {
        let fresh = (sustain_secs * self.sample_rate) as u32;
        if fresh != self.sustain_samples {
            self.sustain_samples = fresh;
            self.sustain_counter = 0;
        }
    }
}
