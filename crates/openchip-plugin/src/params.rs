use nih_plug::prelude::*;
use openchip_dsp::params::{ArpOctaves, ArpPattern, OscType, ParamSnapshot, PulseWidth, PwmMode};

#[derive(Enum, Debug, PartialEq)]
pub enum OscChoice {
    #[name = "Pulse"]
    Pulse,
    #[name = "Triangle"]
    Triangle,
    #[name = "Noise"]
    Noise,
}

#[derive(Enum, Debug, PartialEq)]
pub enum PulseWidthChoice {
    #[name = "12.5%"]
    Eighth,
    #[name = "25%"]
    Quarter,
    #[name = "50%"]
    Half,
}

#[derive(Enum, Debug, PartialEq)]
pub enum PwmModeChoice {
    #[name = "12.5% > 25%"]
    EighthToQuarter,
    #[name = "12.5% > 50%"]
    EighthToHalf,
    #[name = "25% > 50%"]
    QuarterToHalf,
    #[name = "25% > 12.5%"]
    QuarterToEighth,
    #[name = "50% > 25%"]
    HalfToQuarter,
    #[name = "50% > 12.5%"]
    HalfToEighth,
}

#[derive(Enum, Debug, PartialEq)]
pub enum ArpPatternChoice {
    #[name = "Minor 3rd"]
    MinorThird,
    #[name = "Major 3rd"]
    MajorThird,
    #[name = "4th"]
    Fourth,
    #[name = "5th"]
    Fifth,
    #[name = "Minor Triad"]
    MinorTriad,
    #[name = "Major Triad"]
    MajorTriad,
    #[name = "Major 7th"]
    MajorSeventh,
    #[name = "Major 9th"]
    MajorNinth,
    #[name = "Random"]
    Random,
}

#[derive(Enum, Debug, PartialEq)]
pub enum ArpOctavesChoice {
    #[name = "Hold"]
    Hold,
    #[name = "1 Octave"]
    One,
    #[name = "2 Octaves"]
    Two,
}

#[derive(Params)]
pub struct OpenChipParams {
    /// Which sound source the voices render.
    #[id = "osc"]
    pub osc_type: EnumParam<OscChoice>,

    #[id = "pw"]
    pub pulse_width: EnumParam<PulseWidthChoice>,

    #[id = "pwm_on"]
    pub pwm_switch: BoolParam,

    /// Seconds the starting width is held before the sweep begins.
    #[id = "pwm_sus"]
    pub pwm_sustain: FloatParam,

    #[id = "pwm_mode"]
    pub pwm_mode: EnumParam<PwmModeChoice>,

    #[id = "pwm_rate"]
    pub pwm_rate: FloatParam,

    /// Crushed "NES" triangle vs a clean one.
    #[id = "tri_dist"]
    pub tri_distortion: BoolParam,

    /// Pitched 4-bit noise vs plain white noise.
    #[id = "noise_dist"]
    pub noise_distortion: BoolParam,

    #[id = "pb_on"]
    pub pb_switch: BoolParam,

    /// Starting offset of the bend in semitones.
    #[id = "pb_pitch"]
    pub pb_init_pitch: IntParam,

    #[id = "pb_time"]
    pub pb_time: FloatParam,

    #[id = "vib_on"]
    pub vib_switch: BoolParam,

    #[id = "vib_speed"]
    pub vib_speed: FloatParam,

    #[id = "vib_amt"]
    pub vib_amount: FloatParam,

    #[id = "vib_sus"]
    pub vib_sustain: FloatParam,

    #[id = "arp_on"]
    pub arp_switch: BoolParam,

    #[id = "arp_pat"]
    pub arp_pattern: EnumParam<ArpPatternChoice>,

    #[id = "arp_oct"]
    pub arp_octaves: EnumParam<ArpOctavesChoice>,

    #[id = "arp_speed"]
    pub arp_speed: FloatParam,

    #[id = "attack"]
    pub attack: FloatParam,

    #[id = "decay"]
    pub decay: FloatParam,

    #[id = "sustain"]
    pub sustain: FloatParam,

    #[id = "release"]
    pub release: FloatParam,

    /// Bus bitcrusher: keep one sample in N.
    #[id = "crush_rate"]
    pub rate_reduction: IntParam,

    #[id = "crush_bits"]
    pub bit_depth: IntParam,

    /// Fraction of the 3-second delay buffer.
    #[id = "dly_time"]
    pub delay_time: FloatParam,

    #[id = "dly_fb"]
    pub feedback: FloatParam,

    #[id = "dly_mix"]
    pub dry_wet_mix: FloatParam,
}

impl Default for OpenChipParams {
    fn default() -> Self {
        Self {
            osc_type: EnumParam::new("Oscillator", OscChoice::Pulse),

            pulse_width: EnumParam::new("Pulse Width", PulseWidthChoice::Eighth),

            pwm_switch: BoolParam::new("PWM", false),

            pwm_sustain: FloatParam::new(
                "PWM Sustain",
                0.0,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit(" s")
            .with_step_size(0.01),

            pwm_mode: EnumParam::new("PWM Mode", PwmModeChoice::EighthToQuarter),

            pwm_rate: FloatParam::new(
                "PWM Rate",
                0.5,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            ),

            tri_distortion: BoolParam::new("Triangle Distortion", true),

            noise_distortion: BoolParam::new("Noise Distortion", true),

            pb_switch: BoolParam::new("Pitch Bend", false),

            pb_init_pitch: IntParam::new(
                "Bend Start Pitch",
                0,
                IntRange::Linear { min: -24, max: 24 },
            )
            .with_unit(" st"),

            pb_time: FloatParam::new(
                "Bend Time",
                0.01,
                FloatRange::Skewed {
                    min: 0.01,
                    max: 3.0,
                    factor: FloatRange::skew_factor(-1.0),
                },
            )
            .with_unit(" s"),

            vib_switch: BoolParam::new("Vibrato", false),

            vib_speed: FloatParam::new(
                "Vibrato Speed",
                0.1,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            ),

            vib_amount: FloatParam::new(
                "Vibrato Amount",
                0.1,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            ),

            vib_sustain: FloatParam::new(
                "Vibrato Sustain",
                0.0,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit(" s")
            .with_step_size(0.01),

            arp_switch: BoolParam::new("Arpeggiator", false),

            arp_pattern: EnumParam::new("Arp Pattern", ArpPatternChoice::MinorThird),

            arp_octaves: EnumParam::new("Arp Octaves", ArpOctavesChoice::Hold),

            arp_speed: FloatParam::new(
                "Arp Speed",
                0.5,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            ),

            attack: FloatParam::new(
                "Attack",
                0.01,
                FloatRange::Skewed {
                    min: 0.0,
                    max: 5.0,
                    factor: FloatRange::skew_factor(-2.0),
                },
            )
            .with_unit(" s"),

            decay: FloatParam::new(
                "Decay",
                0.0,
                FloatRange::Skewed {
                    min: 0.0,
                    max: 5.0,
                    factor: FloatRange::skew_factor(-2.0),
                },
            )
            .with_unit(" s"),

            sustain: FloatParam::new(
                "Sustain",
                1.0,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit(" %")
            .with_value_to_string(formatters::v2s_f32_percentage(0))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            release: FloatParam::new(
                "Release",
                0.01,
                FloatRange::Skewed {
                    min: 0.0,
                    max: 5.0,
                    factor: FloatRange::skew_factor(-2.0),
                },
            )
            .with_unit(" s"),

            rate_reduction: IntParam::new(
                "Rate Reduction",
                1,
                IntRange::Linear { min: 1, max: 10 },
            ),

            bit_depth: IntParam::new("Bit Depth", 24, IntRange::Linear { min: 1, max: 24 }),

            delay_time: FloatParam::new(
                "Delay Time",
                0.0,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            ),

            feedback: FloatParam::new(
                "Delay Feedback",
                0.0,
                FloatRange::Linear { min: 0.0, max: 0.99 },
            ),

            dry_wet_mix: FloatParam::new(
                "Delay Mix",
                0.2,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit(" %")
            .with_value_to_string(formatters::v2s_f32_percentage(0))
            .with_string_to_value(formatters::s2v_f32_percentage()),
        }
    }
}

impl OpenChipParams {
    /// One coherent reading of every control, handed by reference to the
    /// DSP layer for the duration of a block.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            osc_type: match self.osc_type.value() {
                OscChoice::Pulse => OscType::Pulse,
                OscChoice::Triangle => OscType::Triangle,
                OscChoice::Noise => OscType::Noise,
            },
            pulse_width: match self.pulse_width.value() {
                PulseWidthChoice::Eighth => PulseWidth::Eighth,
                PulseWidthChoice::Quarter => PulseWidth::Quarter,
                PulseWidthChoice::Half => PulseWidth::Half,
            },
            pwm_switch: self.pwm_switch.value(),
            pwm_sustain: self.pwm_sustain.value(),
            pwm_mode: match self.pwm_mode.value() {
                PwmModeChoice::EighthToQuarter => PwmMode::EighthToQuarter,
                PwmModeChoice::EighthToHalf => PwmMode::EighthToHalf,
                PwmModeChoice::QuarterToHalf => PwmMode::QuarterToHalf,
                PwmModeChoice::QuarterToEighth => PwmMode::QuarterToEighth,
                PwmModeChoice::HalfToQuarter => PwmMode::HalfToQuarter,
                PwmModeChoice::HalfToEighth => PwmMode::HalfToEighth,
            },
            pwm_rate: self.pwm_rate.value(),
            tri_distortion: self.tri_distortion.value(),
            noise_distortion: self.noise_distortion.value(),
            pb_switch: self.pb_switch.value(),
            pb_init_pitch: self.pb_init_pitch.value(),
            pb_time: self.pb_time.value(),
            vib_switch: self.vib_switch.value(),
            vib_speed: self.vib_speed.value(),
            vib_amount: self.vib_amount.value(),
            vib_sustain: self.vib_sustain.value(),
            arp_switch: self.arp_switch.value(),
            arp_pattern: match self.arp_pattern.value() {
                ArpPatternChoice::MinorThird => ArpPattern::MinorThird,
                ArpPatternChoice::MajorThird => ArpPattern::MajorThird,
                ArpPatternChoice::Fourth => ArpPattern::Fourth,
                ArpPatternChoice::Fifth => ArpPattern::Fifth,
                ArpPatternChoice::MinorTriad => ArpPattern::MinorTriad,
                ArpPatternChoice::MajorTriad => ArpPattern::MajorTriad,
                ArpPatternChoice::MajorSeventh => ArpPattern::MajorSeventh,
                ArpPatternChoice::MajorNinth => ArpPattern::MajorNinth,
                ArpPatternChoice::Random => ArpPattern::Random,
            },
            arp_octaves: match self.arp_octaves.value() {
                ArpOctavesChoice::Hold => ArpOctaves::Hold,
                ArpOctavesChoice::One => ArpOctaves::One,
                ArpOctavesChoice::Two => ArpOctaves::Two,
            },
            arp_speed: self.arp_speed.value(),
            attack: self.attack.value(),
            decay: self.decay.value(),
            sustain: self.sustain.value(),
            release: self.release.value(),
            rate_reduction: self.rate_reduction.value(),
            bit_depth: self.bit_depth.value(),
            delay_time: self.delay_time.value(),
            feedback: self.feedback.value(),
            dry_wet_mix: self.dry_wet_mix.value(),
        }
    }
}
