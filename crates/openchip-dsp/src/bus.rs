/// Stereo bus effects: bitcrusher into delay, one instance per channel.
///
/// The graph owns two crushers and two delays so the channels never
/// share state. `prepare` does all buffer allocation; `process_block`
/// re-applies the parameter values per block and then runs per sample,
/// crush first so the delay tail smears the crushed signal rather than
/// the other way around.

use crate::bitcrusher::Bitcrusher;
use crate::delay::Delay;
use crate::params::ParamSnapshot;

/// Delay buffer length in seconds at the prepared sample rate.
pub const MAX_DELAY_SECS: f32 = 3.0;

pub struct BusEffects {
    crushers: [Bitcrusher; 2],
    delays: [Delay; 2],
    sample_rate: f32,
}

impl Default for BusEffects {
    fn default() -> Self {
        Self {
            crushers: [Bitcrusher::default(), Bitcrusher::default()],
            delays: [Delay::default(), Delay::default()],
            sample_rate: 44_100.0,
        }
    }
}

impl BusEffects {
    /// Allocate the delay buffers for the given rate. Must run before
    /// the first `process_block`; safe to call again on a rate change.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        let max_samples = (MAX_DELAY_SECS * sample_rate) as usize;
        for delay in &mut self.delays {
            delay.set_max_size(max_samples);
        }
        for crusher in &mut self.crushers {
            crusher.reset();
        }
    }

    pub fn reset(&mut self) {
        for delay in &mut self.delays {
            delay.reset();
        }
        for crusher in &mut self.crushers {
            crusher.reset();
        }
    }

    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32], params: &ParamSnapshot) {
        let delay_samples = params.delay_time.clamp(0.0, 1.0) * MAX_DELAY_SECS * self.sample_rate;
        for channel in 0..2 {
            self.crushers[channel].set_rate_reduction(params.rate_reduction.max(1) as u32);
            self.crushers[channel].set_bit_depth(params.bit_depth.clamp(1, 24) as u32);
            self.delays[channel].set_delay_time(delay_samples);
            self.delays[channel].set_feedback(params.feedback);
            self.delays[channel].set_mix(params.dry_wet_mix);
        }

        for sample in left.iter_mut() {
            let crushed = self.crushers[0].process(*sample);
            *sample = self.delays[0].process(crushed);
        }
        for sample in right.iter_mut() {
            let crushed = self.crushers[1].process(*sample);
            *sample = self.delays[1].process(crushed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_settings_are_transparent() {
        let params = ParamSnapshot {
            rate_reduction: 1,
            bit_depth: 24,
            delay_time: 0.0,
            feedback: 0.0,
            dry_wet_mix: 0.2,
            ..ParamSnapshot::default()
        };
        let mut bus = BusEffects::default();
        bus.prepare(44_100.0);

        let mut left: Vec<f32> = (0..256).map(|i| (i as f32 * 0.01).sin() * 0.4).collect();
        let mut right = left.clone();
        let reference = left.clone();
        bus.process_block(&mut left, &mut right, &params);

        for (y, x) in left.iter().zip(&reference) {
            assert!((y - x).abs() < 1e-5, "neutral bus altered the signal");
        }
        assert_eq!(left, right, "identical inputs must stay identical");
    }

    #[test]
    fn test_delay_adds_an_echo() {
        let params = ParamSnapshot {
            delay_time: 100.0 / (MAX_DELAY_SECS * 1_000.0),
            feedback: 0.0,
            dry_wet_mix: 1.0,
            ..ParamSnapshot::default()
        };
        let mut bus = BusEffects::default();
        bus.prepare(1_000.0);

        let mut left = vec![0.0f32; 256];
        let mut right = vec![0.0f32; 256];
        left[0] = 1.0;
        right[0] = 1.0;
        bus.process_block(&mut left, &mut right, &params);

        assert_eq!(left[0], 0.0, "fully wet: no dry impulse");
        assert!((left[100] - 1.0).abs() < 1e-5, "echo missing at 100 samples");
        assert_eq!(left, right);
    }

    #[test]
    fn test_channels_do_not_leak() {
        let params = ParamSnapshot {
            delay_time: 50.0 / (MAX_DELAY_SECS * 1_000.0),
            feedback: 0.5,
            dry_wet_mix: 1.0,
            ..ParamSnapshot::default()
        };
        let mut bus = BusEffects::default();
        bus.prepare(1_000.0);

        let mut left = vec![0.0f32; 256];
        let mut right = vec![0.0f32; 256];
        left[0] = 1.0; // impulse only on the left
        bus.process_block(&mut left, &mut right, &params);

        assert!(left.iter().any(|&s| s != 0.0));
        assert!(right.iter().all(|&s| s == 0.0), "right channel picked up the left echo");
    }

    #[test]
    fn test_crush_quantizes_the_echo() {
        // The crusher sits ahead of the delay, so the echo carries the
        // quantized signal: a sub-step input vanishes entirely.
        let params = ParamSnapshot {
            rate_reduction: 1,
            bit_depth: 2,
            delay_time: 10.0 / (MAX_DELAY_SECS * 1_000.0),
            feedback: 0.0,
            dry_wet_mix: 1.0,
            ..ParamSnapshot::default()
        };
        let mut bus = BusEffects::default();
        bus.prepare(1_000.0);

        let mut left = vec![0.0f32; 64];
        let mut right = vec![0.0f32; 64];
        left[0] = 0.05; // below half a 2-bit step after doubling
        right[0] = 0.05;
        bus.process_block(&mut left, &mut right, &params);

        assert_eq!(left[10], 0.0, "sub-step input must vanish before the delay");
    }

    #[test]
    fn test_full_note_through_voice_and_bus() {
        use crate::voice::Voice;

        let params = ParamSnapshot {
            rate_reduction: 4,
            bit_depth: 8,
            delay_time: 0.05,
            feedback: 0.3,
            dry_wet_mix: 0.4,
            ..ParamSnapshot::default()
        };
        let mut voice = Voice::new(44_100.0, 3);
        let mut bus = BusEffects::default();
        bus.prepare(44_100.0);

        voice.start_note(60, 1.0, &params);
        let mut left: Vec<f32> = (0..8_820)
            .map(|i| {
                if i == 4_410 {
                    voice.stop_note(true);
                }
                voice.render_next_sample(&params)
            })
            .collect();
        let mut right = left.clone();
        bus.process_block(&mut left, &mut right, &params);

        let energy: f32 = left.iter().map(|s| s * s).sum();
        assert!(energy > 0.0, "full chain produced silence");
        for &s in &left {
            assert!(s.is_finite());
            assert!(s.abs() <= 1.0, "sample {s} clipped");
        }
    }

    #[test]
    fn test_reset_clears_the_tail() {
        let params = ParamSnapshot {
            delay_time: 20.0 / (MAX_DELAY_SECS * 1_000.0),
            feedback: 0.9,
            dry_wet_mix: 1.0,
            ..ParamSnapshot::default()
        };
        let mut bus = BusEffects::default();
        bus.prepare(1_000.0);

        let mut left = vec![1.0f32; 64];
        let mut right = vec![1.0f32; 64];
        bus.process_block(&mut left, &mut right, &params);
        bus.reset();

        let mut silence_l = vec![0.0f32; 64];
        let mut silence_r = vec![0.0f32; 64];
        bus.process_block(&mut silence_l, &mut silence_r, &params);
        assert!(silence_l.iter().all(|&s| s == 0.0), "tail survived reset");
    }
}
