use crate::audio::{AudioBackend, CpalBackend};
use crate::input::{KeyboardHandler, MidiHandler, MidiRouter};
use crate::synth::command::SynthCommand;
use crate::synth::config::SynthConfig;
use crate::synth::preset::Preset;
use crate::synth::scale::Scale;
use crate::synth::sequencer::demo_pattern;
use crate::synth::{Synth, SynthError};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use tracing::info;

/// Native runtime synth: the engine plus the receiving end of its command
/// queue. Lives inside the audio callback once the stream starts.
pub struct NativeSynth {
    synth: Synth,
    receiver: Receiver<SynthCommand>,
}

impl NativeSynth {
    pub fn new(synth: Synth, receiver: Receiver<SynthCommand>) -> Self {
        Self { synth, receiver }
    }

    /// Apply queued commands, then render. Runs on the audio thread.
    pub fn process(&mut self, output: &mut [f32]) {
        self.process_commands();
        self.synth.render_block(output);
    }

    fn process_commands(&mut self) {
        while let Ok(command) = self.receiver.try_recv() {
            self.synth.apply_command(command);
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.synth.set_sample_rate(sample_rate);
    }

    pub fn synth(&self) -> &Synth {
        &self.synth
    }
}

/// What the binary asks for at startup.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: SynthConfig,
    pub preset: Option<Preset>,
    /// `(name, scala text)`
    pub scale: Option<(String, String)>,
    pub root: Option<i32>,
    pub bpm: Option<f32>,
    pub sequence: bool,
    pub midi: bool,
}

/// Build the engine from `options`, open the audio stream and poll input
/// devices until the process is killed. Returns only on startup failure.
pub fn start(options: RunOptions) -> Result<(), SynthError> {
    let mut synth = Synth::with_config(options.config.clone());
    if let Some(preset) = &options.preset {
        synth.apply_preset(preset);
        info!("Applied preset '{}'", preset.name);
        synth.network().print_structure();
    }
    if let Some((name, text)) = &options.scale {
        let scale = Scale::from_scl(text);
        info!(
            "Loaded tuning '{}' ({} steps, period {:.2} cents)",
            name,
            scale.steps(),
            scale.period_cents()
        );
        synth.load_scale(name.clone(), scale);
    }
    if let Some(root) = options.root {
        synth.set_root(root);
    }
    if let Some(bpm) = options.bpm {
        synth.set_bpm(bpm);
    }
    if options.sequence {
        for (index, step) in demo_pattern().into_iter().enumerate() {
            synth.set_step(index, step);
        }
        synth.start_sequencer();
    }

    let (command_tx, command_rx) = channel();
    let mut audio_backend = CpalBackend::new(NativeSynth::new(synth, command_rx));
    audio_backend.start()?;

    let mut keyboard_handler = KeyboardHandler::new(command_tx.clone());
    keyboard_handler.set_sequencer_running(options.sequence);

    let mut router = MidiRouter::new();
    router.set_channel(options.config.midi_channel);
    router.set_bend_range(options.config.bend_range);
    let mut midi_handler = if options.midi {
        MidiHandler::new(command_tx, router)
    } else {
        MidiHandler::disabled(command_tx, router)
    };

    info!(
        "Running. Play with A-; and W-[, ',' '.' switch presets, space toggles the sequencer, \
         Z stutters, X/C randomize, V normalizes routes, Esc panics."
    );
    loop {
        keyboard_handler.update();
        midi_handler.update();
        std::thread::sleep(Duration::from_millis(2));
    }
}
