/// Chip Renderer — chiptune voice WAV renderer.
///
/// Standalone CLI tool for rendering single notes through the full voice
/// chain (oscillator, modulators, envelope, bus effects) to WAV files.

use openchip_dsp::bus::BusEffects;
use openchip_dsp::params::{ArpOctaves, ArpPattern, OscType, ParamSnapshot};
use openchip_dsp::voice::Voice;

const SAMPLE_RATE: f32 = 44_100.0;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut notes: Vec<u8> = Vec::new();
    let mut velocities: Vec<u8> = Vec::new();
    let mut duration: f32 = 2.0;
    let mut gate: f32 = 1.5;
    let mut output_dir = String::from(".");
    let mut output_file: Option<String> = None;
    let mut params = ParamSnapshot::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--note" | "-n" => {
                i += 1;
                for s in args[i].split(',') {
                    notes.push(s.trim().parse().expect("invalid MIDI note"));
                }
            }
            "--velocity" | "-v" => {
                i += 1;
                for s in args[i].split(',') {
                    velocities.push(s.trim().parse().expect("invalid velocity"));
                }
            }
            "--duration" | "-d" => {
                i += 1;
                duration = args[i].parse().expect("invalid duration");
            }
            "--gate" | "-g" => {
                i += 1;
                gate = args[i].parse().expect("invalid gate length");
            }
            "--osc" => {
                i += 1;
                params.osc_type = match args[i].as_str() {
                    "pulse" => OscType::Pulse,
                    "triangle" => OscType::Triangle,
                    "noise" => OscType::Noise,
                    other => {
                        eprintln!("Unknown oscillator: {other} (pulse, triangle, noise)");
                        std::process::exit(1);
                    }
                };
            }
            "--arp" => {
                i += 1;
                params.arp_switch = true;
                params.arp_pattern = ArpPattern::from_index(
                    args[i].parse().expect("invalid arp pattern index"),
                );
            }
            "--arp-octaves" => {
                i += 1;
                params.arp_octaves =
                    ArpOctaves::from_index(args[i].parse().expect("invalid octave count"));
            }
            "--arp-speed" => {
                i += 1;
                params.arp_speed = args[i].parse().expect("invalid arp speed");
            }
            "--vibrato" => {
                i += 1;
                params.vib_switch = true;
                params.vib_speed = args[i].parse().expect("invalid vibrato speed");
                params.vib_amount = 1.0;
            }
            "--bend" => {
                i += 1;
                params.pb_switch = true;
                params.pb_init_pitch = args[i].parse().expect("invalid bend offset");
                params.pb_time = 0.3;
            }
            "--pwm" => {
                i += 1;
                params.pwm_switch = true;
                params.pwm_rate = args[i].parse().expect("invalid PWM rate");
            }
            "--crush" => {
                i += 1;
                let mut parts = args[i].split(':');
                params.rate_reduction = parts
                    .next()
                    .and_then(|s| s.parse().ok())
                    .expect("invalid crush format (RATE:BITS)");
                params.bit_depth = parts
                    .next()
                    .and_then(|s| s.parse().ok())
                    .expect("invalid crush format (RATE:BITS)");
            }
            "--delay" => {
                i += 1;
                params.delay_time = args[i].parse().expect("invalid delay time");
                params.feedback = 0.4;
                params.dry_wet_mix = 0.3;
            }
            "--output" | "-o" => {
                i += 1;
                output_file = Some(args[i].clone());
            }
            "--output-dir" => {
                i += 1;
                output_dir = args[i].clone();
            }
            "--sweep" => {
                notes = vec![33, 45, 57, 60, 69, 72, 81, 93, 96];
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if notes.is_empty() {
        notes.push(60);
    }
    if velocities.is_empty() {
        velocities.push(100);
    }
    if gate > duration {
        gate = duration;
    }

    for &midi_note in &notes {
        for &vel in &velocities {
            let velocity_f = vel as f32 / 127.0;
            let note_name = midi_note_name(midi_note);

            let filename = if let Some(ref f) = output_file {
                if notes.len() == 1 && velocities.len() == 1 {
                    f.clone()
                } else {
                    format!("{output_dir}/chip_{note_name}_v{vel}.wav")
                }
            } else {
                format!("{output_dir}/chip_{note_name}_v{vel}.wav")
            };

            eprintln!(
                "Rendering MIDI {midi_note} ({note_name}) vel={vel} dur={duration}s → {filename}"
            );

            let samples = render_note(midi_note, velocity_f, duration, gate, &params);

            let peak = samples.iter().map(|x| x.abs()).fold(0.0f32, f32::max);
            eprintln!("  Peak amplitude: {peak:.6} ({:.1} dBFS)", 20.0 * peak.log10());

            write_wav(&filename, &samples, SAMPLE_RATE as u32);
            eprintln!("  Written: {filename}");
        }
    }
}

/// Render one note through a voice and the bus chain. The note is held
/// for `gate` seconds and the tail runs until the envelope finishes or
/// the duration cap is reached.
fn render_note(
    midi_note: u8,
    velocity: f32,
    duration: f32,
    gate: f32,
    params: &ParamSnapshot,
) -> Vec<f32> {
    let total = (duration * SAMPLE_RATE) as usize;
    let gate_samples = (gate * SAMPLE_RATE) as usize;

    let mut voice = Voice::new(SAMPLE_RATE, 0x6368_6970);
    voice.start_note(midi_note as i32, velocity, params);

    let mut left = vec![0.0f32; total];
    for (i, sample) in left.iter_mut().enumerate() {
        if i == gate_samples {
            voice.stop_note(true);
        }
        *sample = voice.render_next_sample(params);
    }

    let mut bus = BusEffects::default();
    bus.prepare(SAMPLE_RATE);
    let mut right = left.clone();
    bus.process_block(&mut left, &mut right, params);
    left
}

fn write_wav(path: &str, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 24,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("failed to create WAV file");
    let scale = (1 << 23) as f32 - 1.0;
    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        writer
            .write_sample((clamped * scale) as i32)
            .expect("failed to write sample");
    }
    writer.finalize().expect("failed to finalize WAV");
}

fn midi_note_name(midi: u8) -> String {
    let names = ["C", "Cs", "D", "Ds", "E", "F", "Fs", "G", "Gs", "A", "As", "B"];
    let octave = (midi / 12) as i32 - 1;
    let note = (midi % 12) as usize;
    format!("{}{}", names[note], octave)
}

fn print_usage() {
    eprintln!(
        r#"Chip Renderer — chiptune voice WAV renderer

USAGE:
    chip-renderer [OPTIONS]

OPTIONS:
    -n, --note <MIDI[,MIDI,...]>     MIDI note(s) to render (default: 60)
    -v, --velocity <VEL[,VEL,...]>   Velocity(ies) to render (1-127, default: 100)
    -d, --duration <SECS>            Total length in seconds (default: 2.0)
    -g, --gate <SECS>                Held length before release (default: 1.5)
        --osc <pulse|triangle|noise> Oscillator type (default: pulse)
        --arp <PATTERN>              Enable arpeggiator with pattern index 0-8
        --arp-octaves <0|1|2>        Octaves the arpeggio climbs
        --arp-speed <0..1>           Arpeggio speed
        --vibrato <0..1>             Enable vibrato at the given speed
        --bend <SEMITONES>           Enable a pitch bend from the offset
        --pwm <0..1>                 Enable pulse-width modulation at the rate
        --crush <RATE:BITS>          Bus bitcrusher settings
        --delay <0..1>               Bus delay time (fraction of 3 s)
    -o, --output <PATH>              Output WAV file (single note only)
        --output-dir <DIR>           Output directory for batch mode (default: .)
        --sweep                      Render notes across the keyboard
    -h, --help                       Print this help

EXAMPLES:
    chip-renderer -n 60 -v 100 -d 2.0 -o middle_c.wav
    chip-renderer --osc triangle -n 45                  # NES bass triangle
    chip-renderer --arp 5 --arp-octaves 2 --arp-speed 0.8
    chip-renderer --osc noise --crush 8:4 --delay 0.1"#
    );
}
