/// Fractional delay line with feedback and a dry/wet mix.
///
/// The read head trails the write head by a possibly fractional sample
/// count; the tap value is linearly interpolated between its two
/// neighbours. The interpolated tap is fed back (scaled) into the write
/// slot along with the dry input. Buffer allocation happens only through
/// `set_max_size`, so a prepared delay never allocates on the audio
/// thread.

pub struct Delay {
    buffer: Vec<f32>,
    write_pos: usize,
    delay_samples: f32,
    feedback: f32,
    mix: f32,
}

impl Default for Delay {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            write_pos: 0,
            delay_samples: 0.0,
            feedback: 0.0,
            mix: 0.5,
        }
    }
}

impl Delay {
    /// Allocate (or reallocate) the backing buffer and clear it. Call
    /// from prepare, never from process.
    pub fn set_max_size(&mut self, max_samples: usize) {
        self.buffer.clear();
        self.buffer.resize(max_samples.max(1), 0.0);
        self.write_pos = 0;
    }

    /// Delay length in samples, clamped to the buffer. Fractional values
    /// engage the interpolator.
    pub fn set_delay_time(&mut self, delay_samples: f32) {
        let max = self.buffer.len().saturating_sub(1) as f32;
        self.delay_samples = delay_samples.clamp(0.0, max);
    }

    pub fn delay_time(&self) -> f32 {
        self.delay_samples
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    pub fn process(&mut self, input: f32) -> f32 {
        // A zero-length delay degenerates to a passthrough; skip the
        // buffer entirely so it also works before set_max_size.
        if self.delay_samples < 1.0 || self.buffer.is_empty() {
            return input;
        }

        let len = self.buffer.len() as f32;
        let mut read_pos = self.write_pos as f32 - self.delay_samples;
        if read_pos < 0.0 {
            read_pos += len;
        }

        // A slightly negative read_pos rounds up to exactly `len` after
        // the wrap; the modulo keeps the index in bounds either way.
        let index = read_pos as usize % self.buffer.len();
        let frac = read_pos - read_pos.floor();
        let next = (index + 1) % self.buffer.len();
        let delayed = self.buffer[index] * (1.0 - frac) + self.buffer[next] * frac;

        self.buffer[self.write_pos] = input + delayed * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        input * (1.0 - self.mix) + delayed * self.mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(delay_samples: f32, feedback: f32, mix: f32) -> Delay {
        let mut delay = Delay::default();
        delay.set_max_size(1_000);
        delay.set_delay_time(delay_samples);
        delay.set_feedback(feedback);
        delay.set_mix(mix);
        delay
    }

    #[test]
    fn test_zero_delay_is_passthrough() {
        let mut delay = prepared(0.0, 0.9, 1.0);
        for i in 0..100 {
            let x = i as f32 * 0.01;
            assert_eq!(delay.process(x), x);
        }
    }

    #[test]
    fn test_impulse_returns_after_delay_time() {
        let mut delay = prepared(10.0, 0.0, 1.0);
        let mut out = vec![delay.process(1.0)];
        for _ in 0..30 {
            out.push(delay.process(0.0));
        }
        assert_eq!(out[0], 0.0, "fully wet output has no dry path");
        for (i, &y) in out.iter().enumerate().take(10) {
            assert_eq!(y, 0.0, "early echo at sample {i}");
        }
        assert!((out[10] - 1.0).abs() < 1e-6, "echo missing at the delay time");
    }

    #[test]
    fn test_feedback_produces_decaying_echo_train() {
        let mut delay = prepared(5.0, 0.5, 1.0);
        let mut out = vec![delay.process(1.0)];
        for _ in 0..20 {
            out.push(delay.process(0.0));
        }
        assert!((out[5] - 1.0).abs() < 1e-6);
        assert!((out[10] - 0.5).abs() < 1e-6);
        assert!((out[15] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_fractional_delay_interpolates() {
        let mut delay = prepared(5.5, 0.0, 1.0);
        let mut out = vec![delay.process(1.0)];
        for _ in 0..10 {
            out.push(delay.process(0.0));
        }
        // The impulse is split across the two neighbouring samples.
        assert!((out[5] - 0.5).abs() < 1e-6, "got {}", out[5]);
        assert!((out[6] - 0.5).abs() < 1e-6, "got {}", out[6]);
    }

    #[test]
    fn test_fractional_delay_survives_wraparound() {
        // A delay length carrying f32 representation error (1/60 of the
        // buffer) makes the wrapped read position round up to the buffer
        // length at one write offset per cycle. Must stay in bounds.
        let mut delay = Delay::default();
        delay.set_max_size(3_000);
        delay.set_delay_time((1.0f32 / 60.0) * 3_000.0);
        delay.set_feedback(0.3);
        delay.set_mix(0.5);

        for i in 0..10_000 {
            let y = delay.process((i as f32 * 0.1).sin() * 0.5);
            assert!(y.is_finite());
        }
    }

    #[test]
    fn test_mix_blends_dry_and_wet() {
        let mut delay = prepared(10.0, 0.0, 0.25);
        assert!((delay.process(1.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_setters_clamp_to_buffer() {
        let mut delay = Delay::default();
        delay.set_max_size(100);
        delay.set_delay_time(5_000.0);
        assert_eq!(delay.delay_time(), 99.0);
        delay.set_feedback(2.0);
        assert_eq!(delay.feedback(), 0.99);
        delay.set_mix(-1.0);
        assert_eq!(delay.mix(), 0.0);
    }
}
