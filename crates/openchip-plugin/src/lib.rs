// OpenChip — chiptune synthesizer plugin (CLAP + VST3).

use nih_plug::prelude::*;
use openchip_dsp::bus::BusEffects;
use openchip_dsp::params::ParamSnapshot;
use openchip_dsp::voice::Voice;
use std::num::NonZeroU32;
use std::sync::Arc;

mod params;
use params::OpenChipParams;

const MAX_VOICES: usize = 10;
const MAX_BLOCK_SIZE: usize = 8192;

// ── Voice management ────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
enum VoiceState {
    Free,
    Held,
    Releasing,
}

struct VoiceSlot {
    voice: Voice,
    state: VoiceState,
    midi_note: u8,
    age: u64,
}

impl VoiceSlot {
    fn new(seed: u32) -> Self {
        Self {
            voice: Voice::new(44_100.0, seed),
            state: VoiceState::Free,
            midi_note: 0,
            age: 0,
        }
    }
}

// ── Plugin ──────────────────────────────────────────────────────────────────

struct OpenChip {
    params: Arc<OpenChipParams>,

    // Voice management
    voices: Vec<VoiceSlot>,
    age_counter: u64,

    // Shared bus chain (stereo, post voice-sum)
    bus: BusEffects,

    // Pre-allocated scratch buffers
    left_buf: Vec<f32>,
    right_buf: Vec<f32>,

    sample_rate: f32,
}

impl Default for OpenChip {
    fn default() -> Self {
        Self {
            params: Arc::new(OpenChipParams::default()),
            voices: (0..MAX_VOICES)
                .map(|i| VoiceSlot::new(voice_seed(i)))
                .collect(),
            age_counter: 0,
            bus: BusEffects::default(),
            left_buf: vec![0.0; MAX_BLOCK_SIZE],
            right_buf: vec![0.0; MAX_BLOCK_SIZE],
            sample_rate: 44_100.0,
        }
    }
}

/// Per-slot seed; decorrelates noise and random arpeggios across voices.
fn voice_seed(slot: usize) -> u32 {
    (slot as u32 + 1).wrapping_mul(2_654_435_761)
}

impl OpenChip {
    fn note_on(&mut self, note: u8, velocity: f32, snapshot: &ParamSnapshot) {
        let slot_idx = self.allocate_voice();
        self.age_counter += 1;

        let slot = &mut self.voices[slot_idx];
        slot.voice.start_note(note as i32, velocity, snapshot);
        slot.state = VoiceState::Held;
        slot.midi_note = note;
        slot.age = self.age_counter;
    }

    fn note_off(&mut self, note: u8) {
        // Release the oldest held voice matching this note
        let mut oldest_age = u64::MAX;
        let mut oldest_idx = None;
        for (i, slot) in self.voices.iter().enumerate() {
            if slot.state == VoiceState::Held && slot.midi_note == note && slot.age < oldest_age {
                oldest_age = slot.age;
                oldest_idx = Some(i);
            }
        }
        if let Some(idx) = oldest_idx {
            self.voices[idx].state = VoiceState::Releasing;
            self.voices[idx].voice.stop_note(true);
        }
    }

    /// Find a voice slot: prefer Free, then oldest Releasing, then oldest Held.
    fn allocate_voice(&mut self) -> usize {
        // 1. Free slot
        for (i, slot) in self.voices.iter().enumerate() {
            if slot.state == VoiceState::Free {
                return i;
            }
        }

        // 2. Oldest releasing voice
        let mut oldest_age = u64::MAX;
        let mut oldest_idx = 0;
        for (i, slot) in self.voices.iter().enumerate() {
            if slot.state == VoiceState::Releasing && slot.age < oldest_age {
                oldest_age = slot.age;
                oldest_idx = i;
            }
        }
        if oldest_age < u64::MAX {
            return oldest_idx;
        }

        // 3. Oldest held voice (voice stealing)
        oldest_age = u64::MAX;
        oldest_idx = 0;
        for (i, slot) in self.voices.iter().enumerate() {
            if slot.age < oldest_age {
                oldest_age = slot.age;
                oldest_idx = i;
            }
        }
        oldest_idx
    }

    /// Sum all active voices into the scratch buffers for a sub-block.
    fn render_subblock(&mut self, offset: usize, len: usize, snapshot: &ParamSnapshot) {
        let out = &mut self.left_buf[offset..offset + len];
        out.fill(0.0);
        for slot in &mut self.voices {
            if slot.state == VoiceState::Free {
                continue;
            }
            for sample in out.iter_mut() {
                *sample += slot.voice.render_next_sample(snapshot);
            }
        }
        // The voices are mono; the bus delays run per channel and keep
        // the copies coherent.
        self.right_buf[offset..offset + len].copy_from_slice(out);
    }

    fn cleanup_voices(&mut self) {
        for slot in &mut self.voices {
            if slot.state != VoiceState::Free && !slot.voice.is_playing() {
                slot.state = VoiceState::Free;
            }
        }
    }
}

impl Plugin for OpenChip {
    const NAME: &'static str = "OpenChip";
    const VENDOR: &'static str = "OpenChip";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: None,
        main_output_channels: NonZeroU32::new(2),
        aux_input_ports: &[],
        aux_output_ports: &[],
        names: PortNames::const_default(),
    }];

    const MIDI_INPUT: MidiConfig = MidiConfig::Basic;
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        self.sample_rate = buffer_config.sample_rate;

        for slot in &mut self.voices {
            slot.voice.set_sample_rate(self.sample_rate);
        }
        self.bus.prepare(self.sample_rate);

        // Ensure buffers are large enough
        let max_samples = buffer_config.max_buffer_size as usize;
        if self.left_buf.len() < max_samples {
            self.left_buf.resize(max_samples, 0.0);
            self.right_buf.resize(max_samples, 0.0);
        }

        true
    }

    fn reset(&mut self) {
        for slot in &mut self.voices {
            slot.voice.stop_note(false);
            slot.state = VoiceState::Free;
        }
        self.bus.reset();
        self.age_counter = 0;
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let num_samples = buffer.samples();
        let snapshot = self.params.snapshot();

        // Event-splitting process loop: split at each MIDI event for sample-accuracy
        let mut next_event = context.next_event();
        let mut block_start: usize = 0;

        while block_start < num_samples {
            // Process all events at or before current position
            loop {
                match next_event {
                    Some(ref event) if (event.timing() as usize) <= block_start => {
                        match event {
                            NoteEvent::NoteOn { note, velocity, .. } => {
                                self.note_on(*note, *velocity, &snapshot);
                            }
                            NoteEvent::NoteOff { note, .. } => {
                                self.note_off(*note);
                            }
                            _ => {}
                        }
                        next_event = context.next_event();
                    }
                    _ => break,
                }
            }

            // Find next event boundary (or end of buffer)
            let block_end = match next_event {
                Some(ref event) => (event.timing() as usize).min(num_samples),
                None => num_samples,
            };
            let block_len = block_end - block_start;

            if block_len > 0 {
                self.render_subblock(block_start, block_len, &snapshot);
            }

            block_start = block_end;
        }

        // Drain any remaining events
        while let Some(event) = next_event {
            match event {
                NoteEvent::NoteOn { note, velocity, .. } => {
                    self.note_on(note, velocity, &snapshot)
                }
                NoteEvent::NoteOff { note, .. } => self.note_off(note),
                _ => {}
            }
            next_event = context.next_event();
        }

        // Shared bus: crush then delay, per channel
        self.bus.process_block(
            &mut self.left_buf[..num_samples],
            &mut self.right_buf[..num_samples],
            &snapshot,
        );

        for (i, mut channel_samples) in buffer.iter_samples().enumerate() {
            for (channel, s) in channel_samples.iter_mut().enumerate() {
                *s = if channel == 0 {
                    self.left_buf[i]
                } else {
                    self.right_buf[i]
                };
            }
        }

        self.cleanup_voices();

        ProcessStatus::Normal
    }
}

impl ClapPlugin for OpenChip {
    const CLAP_ID: &'static str = "com.openchip.synth";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Chiptune synthesizer — pulse, triangle and noise channels with bus effects");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::Instrument,
        ClapFeature::Synthesizer,
        ClapFeature::Custom("chiptune"),
    ];
}

impl Vst3Plugin for OpenChip {
    const VST3_CLASS_ID: [u8; 16] = *b"OpenChipSynthVST";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Instrument, Vst3SubCategory::Synth];
}

nih_export_clap!(OpenChip);
nih_export_vst3!(OpenChip);
