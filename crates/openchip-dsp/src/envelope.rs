/// Linear ADSR amplitude envelope.
///
/// Attack ramps to full scale, decay ramps to the sustain level, and
/// release ramps to silence, each at a fixed per-sample increment
/// derived from the stage time. A zero-length stage is skipped rather
/// than producing a divide-by-zero increment.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    stage: Stage,
    level: f32,
    attack_increment: f32,
    decay_increment: f32,
    release_increment: f32,
    sustain_level: f32,
    sample_rate: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            stage: Stage::Idle,
            level: 0.0,
            attack_increment: 1.0,
            decay_increment: 1.0,
            release_increment: 1.0,
            sustain_level: 1.0,
            sample_rate: 44_100.0,
        }
    }
}

impl Envelope {
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Stage times in seconds, sustain as a level in 0..=1. Safe to call
    /// every block; only the increments change, never the stage.
    pub fn set_parameters(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_increment = stage_increment(attack, self.sample_rate);
        self.decay_increment = stage_increment(decay, self.sample_rate);
        self.release_increment = stage_increment(release, self.sample_rate);
        self.sustain_level = sustain.clamp(0.0, 1.0);
    }

    /// Retrigger. The ramp continues from the current level, so a voice
    /// restarted mid-release does not click back to zero.
    pub fn note_on(&mut self) {
        self.stage = Stage::Attack;
    }

    pub fn note_off(&mut self) {
        if self.stage != Stage::Idle {
            self.stage = Stage::Release;
        }
    }

    pub fn reset(&mut self) {
        self.stage = Stage::Idle;
        self.level = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.stage != Stage::Idle
    }

    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            Stage::Idle => {}
            Stage::Attack => {
                self.level += self.attack_increment;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                self.level -= self.decay_increment;
                if self.level <= self.sustain_level {
                    self.level = self.sustain_level;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => {
                self.level = self.sustain_level;
            }
            Stage::Release => {
                self.level -= self.release_increment;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }
        self.level
    }
}

/// Per-sample step for a full-scale traversal of a stage. Times below
/// one sample collapse the stage into a single step.
fn stage_increment(seconds: f32, sample_rate: f32) -> f32 {
    let samples = seconds * sample_rate;
    if samples < 1.0 { 1.0 } else { 1.0 / samples }
}
