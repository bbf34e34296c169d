/// Wavetable noise generator.
///
/// A fixed table of pseudo-random values quantized to 16 levels (the
/// 4-bit character of console noise channels) is filled once at
/// construction and read back through a phase accumulator, so the noise
/// is pitched: higher frequencies sweep the table faster.

use crate::oscillator::Waveform;

/// Number of random samples in the wavetable.
pub const TABLE_LEN: usize = 3000;

pub struct Noise {
    table: Vec<f32>,
    phase: f64,
    increment: f64,
    frequency: f32,
    sample_rate: f32,
}

impl Noise {
    /// Build the wavetable from a fixed default seed. The table is
    /// generated once, not reseeded per note.
    pub fn new() -> Self {
        Self::with_seed(0x6f70_6e63)
    }

    pub fn with_seed(seed: u32) -> Self {
        let mut state = seed;
        let table = (0..TABLE_LEN)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                // 16 quantized levels over [-1, 1)
                let level = (state >> 28) as i32;
                (level - 8) as f32 / 8.0
            })
            .collect();

        Self {
            table,
            phase: 0.0,
            increment: 0.0,
            frequency: 440.0,
            sample_rate: 44_100.0,
        }
    }
}

impl Default for Noise {
    fn default() -> Self {
        Self::new()
    }
}

impl Waveform for Noise {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.increment = frequency as f64 * TABLE_LEN as f64 / self.sample_rate as f64;
    }

    fn process(&mut self) -> f32 {
        let index = (self.phase as usize).min(TABLE_LEN - 1);
        let out = self.table[index];

        self.phase += self.increment;
        if self.phase >= TABLE_LEN as f64 {
            self.phase -= TABLE_LEN as f64;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_quantized_to_16_levels() {
        let noise = Noise::with_seed(1);
        for &v in &noise.table {
            assert!((-1.0..1.0).contains(&v), "value {v} outside [-1, 1)");
            let level = v * 8.0;
            assert!(
                (level - level.round()).abs() < 1e-6,
                "value {v} not on the 16-level grid"
            );
        }
    }

    #[test]
    fn test_same_seed_same_table() {
        let a = Noise::with_seed(42);
        let b = Noise::with_seed(42);
        assert_eq!(a.table, b.table);
    }

    #[test]
    fn test_phase_wraps_at_table_end() {
        let mut noise = Noise::with_seed(7);
        noise.set_sample_rate(44_100.0);
        // increment > 1 table slot per sample
        noise.set_frequency(2_000.0);

        for _ in 0..200_000 {
            noise.process();
            assert!(noise.phase < TABLE_LEN as f64);
        }
    }

    #[test]
    fn test_low_frequency_holds_samples_longer() {
        let mut noise = Noise::with_seed(9);
        noise.set_sample_rate(44_100.0);
        // One table slot every ~14.7 samples: consecutive outputs repeat.
        noise.set_frequency(1.0);

        let first = noise.process();
        for _ in 0..10 {
            assert_eq!(noise.process(), first);
        }
    }
}
