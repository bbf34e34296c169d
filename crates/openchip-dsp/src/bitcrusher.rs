/// Sample-and-hold bit depth and rate reducer.
///
/// Two degradations in one unit: the input is only re-sampled every
/// `rate_reduction` samples (the held value repeats in between), and
/// each captured sample is quantized onto a `2^bit_depth - 1` step grid.
/// The signal is doubled before quantization and halved after, matching
/// the grid to a nominally half-scale input.

pub struct Bitcrusher {
    rate_reduction: u32,
    bit_depth: u32,
    held_sample: f32,
    sample_counter: u32,
}

impl Default for Bitcrusher {
    fn default() -> Self {
        Self {
            rate_reduction: 1,
            bit_depth: 24,
            held_sample: 0.0,
            sample_counter: 0,
        }
    }
}

impl Bitcrusher {
    pub fn new(rate_reduction: u32, bit_depth: u32) -> Self {
        let mut crusher = Self::default();
        crusher.set_rate_reduction(rate_reduction);
        crusher.set_bit_depth(bit_depth);
        crusher
    }

    /// Keep at least 1 so every sample is captured at the neutral setting.
    pub fn set_rate_reduction(&mut self, rate_reduction: u32) {
        self.rate_reduction = rate_reduction.max(1);
    }

    pub fn rate_reduction(&self) -> u32 {
        self.rate_reduction
    }

    pub fn set_bit_depth(&mut self, bit_depth: u32) {
        self.bit_depth = bit_depth.clamp(1, 24);
    }

    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    pub fn reset(&mut self) {
        self.held_sample = 0.0;
        self.sample_counter = 0;
    }

    pub fn process(&mut self, input: f32) -> f32 {
        self.sample_counter += 1;
        if self.sample_counter >= self.rate_reduction {
            self.sample_counter = 0;
            let scale = (1u32 << self.bit_depth) as f32 - 1.0;
            self.held_sample = ((input * 2.0 * scale).round() / scale) / 2.0;
        }
        self.held_sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_settings_pass_low_depth_error() {
        // rate 1 / 24 bits: every sample re-captured, quantization error
        // below one part in 2^24.
        let mut crusher = Bitcrusher::new(1, 24);
        for i in 0..1_000 {
            let x = (i as f32 / 1_000.0) - 0.5;
            let y = crusher.process(x);
            assert!((y - x).abs() < 1e-6, "input {x}, output {y}");
        }
    }

    #[test]
    fn test_rate_reduction_holds_between_captures() {
        let mut crusher = Bitcrusher::new(4, 24);
        let inputs = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8];
        let outputs: Vec<f32> = inputs.iter().map(|&x| crusher.process(x)).collect();

        // First capture happens when the counter reaches the reduction.
        assert_eq!(outputs[0], 0.0);
        assert_eq!(outputs[1], 0.0);
        assert_eq!(outputs[2], 0.0);
        assert!((outputs[3] - 0.4).abs() < 1e-6);
        assert_eq!(outputs[3], outputs[4]);
        assert_eq!(outputs[4], outputs[5]);
        assert_eq!(outputs[5], outputs[6]);
        assert!((outputs[7] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_bit_depth_limits_output_levels() {
        // At 2 bits the doubled signal snaps to multiples of 1/3, so no
        // more than 7 distinct output values exist over [-0.5, 0.5].
        let mut crusher = Bitcrusher::new(1, 2);
        let mut levels = Vec::new();
        for i in 0..=1_000 {
            let x = (i as f32 / 1_000.0) - 0.5;
            // Adding 0.0 folds -0.0 into +0.0 before the bit compare.
            let y = crusher.process(x) + 0.0;
            if !levels.contains(&y.to_bits()) {
                levels.push(y.to_bits());
            }
        }
        assert!(levels.len() <= 7, "got {} distinct levels", levels.len());
    }

    #[test]
    fn test_one_bit_depth_snaps_to_three_levels() {
        // scale = 2^1 - 1 = 1: the doubled signal rounds to -1, 0 or 1,
        // so the output sits on {-0.5, 0.0, 0.5}.
        let mut crusher = Bitcrusher::new(1, 1);
        for i in 0..=1_000 {
            let x = (i as f32 / 1_000.0) - 0.5;
            let y = crusher.process(x) + 0.0;
            assert!(
                y == -0.5 || y == 0.0 || y == 0.5,
                "input {x} produced off-grid level {y}"
            );
        }
        assert_eq!(crusher.process(-0.5), -0.5);
        assert_eq!(crusher.process(0.5), 0.5);
        assert_eq!(crusher.process(0.1) + 0.0, 0.0);
    }

    #[test]
    fn test_setters_clamp() {
        let mut crusher = Bitcrusher::default();
        crusher.set_rate_reduction(0);
        assert_eq!(crusher.rate_reduction(), 1);
        crusher.set_bit_depth(0);
        assert_eq!(crusher.bit_depth(), 1);
        crusher.set_bit_depth(99);
        assert_eq!(crusher.bit_depth(), 24);
    }

    #[test]
    fn test_reset_clears_held_sample() {
        let mut crusher = Bitcrusher::new(8, 4);
        for _ in 0..8 {
            crusher.process(0.5);
        }
        assert_ne!(crusher.process(0.5), 0.0);
        crusher.reset();
        // Held value is silent again until the next capture.
        assert_eq!(crusher.process(0.0), 0.0);
    }
}
