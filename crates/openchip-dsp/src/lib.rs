//! OpenChip DSP library — chiptune synthesis modules.
//!
//! Pure DSP math with no audio framework dependencies.

// Per-voice synthesis
pub mod arpeggiator;
pub mod envelope;
pub mod noise;
pub mod oscillator;
pub mod pitch_bend;
pub mod pwm;
pub mod vibrato;
pub mod voice;

// Parameter plumbing
pub mod params;

// Bus effects
pub mod bitcrusher;
pub mod bus;
pub mod delay;

/// Equal-tempered tuning around A4 = 440 Hz.
#[inline]
pub fn midi_note_to_hz(note: i32) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_note_to_hz_reference_points() {
        assert!((midi_note_to_hz(69) - 440.0).abs() < 1e-4);
        assert!((midi_note_to_hz(57) - 220.0).abs() < 1e-4);
        assert!((midi_note_to_hz(81) - 880.0).abs() < 1e-4);
        assert!((midi_note_to_hz(60) - 261.6256).abs() < 1e-2);
    }
}
