use crate::synth::command::SynthCommand;
use crate::synth::preset::{builtin_presets, Preset};
use crate::synth::randomize::RandomizeMode;
use device_query::{DeviceQuery, DeviceState, Keycode};
use std::collections::HashMap;
use std::sync::mpsc::Sender;
use tracing::{debug, error, info};

const CONTROL_KEYS: [Keycode; 8] = [
    Keycode::Comma,
    Keycode::Dot,
    Keycode::Space,
    Keycode::Z,
    Keycode::X,
    Keycode::C,
    Keycode::V,
    Keycode::Escape,
];

/// Computer-keyboard piano. Note keys send auto-velocity note-ons; `,` and `.`
/// step through the factory presets and space toggles the sequencer. `Z`
/// stutters, `X`/`C` randomize (safe/wild), `V` normalizes the routes and
/// escape panics.
pub struct KeyboardHandler {
    device_state: DeviceState,
    key_states: HashMap<Keycode, bool>,
    key_to_note: HashMap<Keycode, u8>,
    control_keys: HashMap<Keycode, bool>,
    presets: Vec<Preset>,
    preset_index: usize,
    sequencer_running: bool,
    sender: Sender<SynthCommand>,
}

impl KeyboardHandler {
    pub fn new(sender: Sender<SynthCommand>) -> Self {
        let key_to_note: HashMap<Keycode, u8> = [
            // Bottom row - naturals from A3
            (Keycode::A, 57),
            (Keycode::S, 59),
            (Keycode::D, 60),
            (Keycode::F, 62),
            (Keycode::G, 64),
            (Keycode::H, 65),
            (Keycode::J, 67),
            (Keycode::K, 69),
            (Keycode::L, 71),
            (Keycode::Semicolon, 72),
            // Top row - accidentals
            (Keycode::W, 58),
            (Keycode::R, 61),
            (Keycode::T, 63),
            (Keycode::U, 66),
            (Keycode::I, 68),
            (Keycode::O, 70),
            (Keycode::LeftBracket, 73),
        ]
        .iter()
        .cloned()
        .collect();

        let key_states = key_to_note.keys().map(|key| (*key, false)).collect();
        let control_keys = CONTROL_KEYS
            .into_iter()
            .map(|key| (key, false))
            .collect();

        Self {
            device_state: DeviceState::new(),
            key_states,
            key_to_note,
            control_keys,
            presets: builtin_presets(),
            preset_index: 0,
            sequencer_running: false,
            sender,
        }
    }

    /// Tell the handler the sequencer was started elsewhere, so space stops it.
    pub fn set_sequencer_running(&mut self, running: bool) {
        self.sequencer_running = running;
    }

    fn send(&self, command: SynthCommand) {
        if let Err(e) = self.sender.send(command) {
            error!("Error sending keyboard command: {}", e);
        }
    }

    pub fn update(&mut self) {
        let keys: Vec<Keycode> = self.device_state.get_keys();

        for (key, note) in &self.key_to_note {
            let is_pressed = keys.contains(key);
            let was_pressed = self.key_states.get(key).cloned().unwrap_or(false);
            if is_pressed == was_pressed {
                continue;
            }
            let command = if is_pressed {
                debug!("Key '{:?}' pressed - note on {}", key, note);
                SynthCommand::NoteOn {
                    note: *note,
                    velocity: None,
                }
            } else {
                debug!("Key '{:?}' released - note off {}", key, note);
                SynthCommand::NoteOff { note: *note }
            };
            if let Err(e) = self.sender.send(command) {
                error!("Error sending note event: {}", e);
            }
            self.key_states.insert(*key, is_pressed);
        }

        for key in CONTROL_KEYS {
            let is_pressed = keys.contains(&key);
            let was_pressed = self.control_keys.get(&key).cloned().unwrap_or(false);
            if is_pressed && !was_pressed {
                self.handle_control_key(key);
            }
            self.control_keys.insert(key, is_pressed);
        }
    }

    fn handle_control_key(&mut self, key: Keycode) {
        match key {
            Keycode::Comma | Keycode::Dot if !self.presets.is_empty() => {
                let count = self.presets.len();
                self.preset_index = if key == Keycode::Dot {
                    (self.preset_index + 1) % count
                } else {
                    (self.preset_index + count - 1) % count
                };
                let preset = self.presets[self.preset_index].clone();
                info!("Preset: {}", preset.name);
                self.send(SynthCommand::ApplyPreset(Box::new(preset)));
            }
            Keycode::Space => {
                self.sequencer_running = !self.sequencer_running;
                info!(
                    "Sequencer {}",
                    if self.sequencer_running { "started" } else { "stopped" }
                );
                self.send(if self.sequencer_running {
                    SynthCommand::StartSequencer
                } else {
                    SynthCommand::StopSequencer
                });
            }
            Keycode::Z => self.send(SynthCommand::Stutter),
            Keycode::X => {
                info!("Randomize (safe)");
                self.send(SynthCommand::Randomize(RandomizeMode::Safe));
            }
            Keycode::C => {
                info!("Randomize (wild)");
                self.send(SynthCommand::Randomize(RandomizeMode::Wild));
            }
            Keycode::V => {
                info!("Normalized routes");
                self.send(SynthCommand::NormalizeRoutes);
            }
            Keycode::Escape => {
                self.sequencer_running = false;
                info!("Panic");
                self.send(SynthCommand::Panic);
            }
            _ => {}
        }
    }
}
