/// Parameter snapshot shared by every subsystem.
///
/// The host-side automation thread produces plain numeric parameter
/// values; the audio thread consumes them. Instead of every subsystem
/// holding a back-reference into a shared table, the host builds one
/// `ParamSnapshot` and passes it by reference into each `process` call.
/// Subsystems re-derive per-sample quantities (arp step length, delay
/// time, sustain thresholds) from the snapshot every sample, so a value
/// changing between consecutive samples never needs a lock.

/// Which sound source a voice renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscType {
    #[default]
    Pulse,
    Triangle,
    Noise,
}

impl OscType {
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::Triangle,
            2 => Self::Noise,
            _ => Self::Pulse,
        }
    }
}

/// The three discrete pulse widths of the pulse channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PulseWidth {
    #[default]
    Eighth,
    Quarter,
    Half,
}

impl PulseWidth {
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::Quarter,
            2 => Self::Half,
            _ => Self::Eighth,
        }
    }

    pub fn width(self) -> f32 {
        match self {
            Self::Eighth => 0.125,
            Self::Quarter => 0.25,
            Self::Half => 0.5,
        }
    }
}

/// Pulse-width sweep direction: which widths the sweep visits and in
/// which order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PwmMode {
    /// 12.5% -> 25%
    #[default]
    EighthToQuarter,
    /// 12.5% -> 50%
    EighthToHalf,
    /// 25% -> 50%
    QuarterToHalf,
    /// 25% -> 12.5%
    QuarterToEighth,
    /// 50% -> 25%
    HalfToQuarter,
    /// 50% -> 12.5%
    HalfToEighth,
}

impl PwmMode {
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::EighthToHalf,
            2 => Self::QuarterToHalf,
            3 => Self::QuarterToEighth,
            4 => Self::HalfToQuarter,
            5 => Self::HalfToEighth,
            _ => Self::EighthToQuarter,
        }
    }
}

/// Interval set the arpeggiator cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArpPattern {
    #[default]
    MinorThird,
    MajorThird,
    Fourth,
    Fifth,
    MinorTriad,
    MajorTriad,
    MajorSeventh,
    MajorNinth,
    /// Root plus six offsets drawn uniformly from [-7, 7] semitones at
    /// note-on.
    Random,
}

impl ArpPattern {
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::MajorThird,
            2 => Self::Fourth,
            3 => Self::Fifth,
            4 => Self::MinorTriad,
            5 => Self::MajorTriad,
            6 => Self::MajorSeventh,
            7 => Self::MajorNinth,
            8 => Self::Random,
            _ => Self::MinorThird,
        }
    }

    /// Semitone offsets of the fixed patterns. `Random` has no fixed
    /// intervals; the arpeggiator draws them per note-on.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            Self::MinorThird => &[0, 3],
            Self::MajorThird => &[0, 4],
            Self::Fourth => &[0, 5],
            Self::Fifth => &[0, 7],
            Self::MinorTriad => &[0, 3, 7],
            Self::MajorTriad => &[0, 4, 7],
            Self::MajorSeventh => &[0, 4, 7, 11],
            Self::MajorNinth => &[0, 4, 7, 11, 14],
            Self::Random => &[0],
        }
    }
}

/// How many octaves the arpeggio climbs before restarting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArpOctaves {
    /// Play the pattern once and hold the last note.
    #[default]
    Hold,
    One,
    Two,
}

impl ArpOctaves {
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::One,
            2 => Self::Two,
            _ => Self::Hold,
        }
    }

    pub fn count(self) -> i32 {
        match self {
            Self::Hold => 0,
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// One coherent reading of every host-exposed control value.
///
/// Plain `Copy` data; building one is a handful of atomic loads on the
/// host side and passing it around costs nothing on the audio thread.
#[derive(Debug, Clone, Copy)]
pub struct ParamSnapshot {
    pub osc_type: OscType,

    // Pulse channel
    pub pulse_width: PulseWidth,
    pub pwm_switch: bool,
    /// Seconds the width is held before the sweep starts, 0..=1.
    pub pwm_sustain: f32,
    pub pwm_mode: PwmMode,
    /// Sweep rate control, 0..=1 (maps to 0..10 Hz).
    pub pwm_rate: f32,

    // Triangle / noise character
    pub tri_distortion: bool,
    pub noise_distortion: bool,

    // Pitch bend
    pub pb_switch: bool,
    /// Starting offset in semitones, -24..=24.
    pub pb_init_pitch: i32,
    /// Bend duration in seconds, 0.01..=3.0.
    pub pb_time: f32,

    // Vibrato
    pub vib_switch: bool,
    pub vib_speed: f32,
    pub vib_amount: f32,
    pub vib_sustain: f32,

    // Arpeggiator
    pub arp_switch: bool,
    pub arp_pattern: ArpPattern,
    pub arp_octaves: ArpOctaves,
    pub arp_speed: f32,

    // Amplitude envelope
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,

    // Bus bitcrusher
    pub rate_reduction: i32,
    pub bit_depth: i32,

    // Bus delay
    /// Fraction of the 3-second maximum delay buffer, 0..=1.
    pub delay_time: f32,
    pub feedback: f32,
    pub dry_wet_mix: f32,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            osc_type: OscType::Pulse,
            pulse_width: PulseWidth::Eighth,
            pwm_switch: false,
            pwm_sustain: 0.0,
            pwm_mode: PwmMode::EighthToQuarter,
            pwm_rate: 0.5,
            tri_distortion: true,
            noise_distortion: true,
            pb_switch: false,
            pb_init_pitch: 0,
            pb_time: 0.01,
            vib_switch: false,
            vib_speed: 0.1,
            vib_amount: 0.1,
            vib_sustain: 0.0,
            arp_switch: false,
            arp_pattern: ArpPattern::MinorThird,
            arp_octaves: ArpOctaves::Hold,
            arp_speed: 0.5,
            attack: 0.01,
            decay: 0.0,
            sustain: 1.0,
            release: 0.01,
            rate_reduction: 1,
            bit_depth: 24,
            delay_time: 0.0,
            feedback: 0.0,
            dry_wet_mix: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_patterns_start_at_root() {
        for i in 0..8 {
            let pattern = ArpPattern::from_index(i);
            assert_eq!(pattern.intervals()[0], 0, "{pattern:?} must start at the root");
        }
    }

    #[test]
    fn test_from_index_clamps_out_of_range() {
        assert_eq!(OscType::from_index(99), OscType::Pulse);
        assert_eq!(PulseWidth::from_index(-1), PulseWidth::Eighth);
        assert_eq!(PwmMode::from_index(17), PwmMode::EighthToQuarter);
        assert_eq!(ArpOctaves::from_index(3), ArpOctaves::Hold);
    }

    #[test]
    fn test_pulse_widths() {
        assert_eq!(PulseWidth::Eighth.width(), 0.125);
        assert_eq!(PulseWidth::Quarter.width(), 0.25);
        assert_eq!(PulseWidth::Half.width(), 0.5);
    }
}
