use crate::synth::preset::{builtin_preset, Param, Preset};
use crate::synth::randomize::RandomizeMode;
use crate::synth::sequencer::SequencerStep;
use crate::synth::Synth;
use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

/// WASM Synth runtime (no threads, no channels, direct API)
#[wasm_bindgen]
pub struct WasmSynth {
    synth: Synth,
    temp_buffer: Vec<f32>,
}

#[wasm_bindgen]
impl WasmSynth {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f32) -> WasmSynth {
        let mut synth = Synth::new();
        synth.set_sample_rate(sample_rate);
        WasmSynth {
            synth,
            temp_buffer: Vec::new(),
        }
    }

    /// Render audio buffer into a JS-friendly Float32Array
    #[wasm_bindgen]
    pub fn render(&mut self, length: usize) -> Float32Array {
        if self.temp_buffer.len() != length {
            self.temp_buffer = vec![0.0; length];
        }
        self.synth.render_block(&mut self.temp_buffer);
        Float32Array::from(self.temp_buffer.as_slice())
    }

    #[wasm_bindgen]
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        self.synth.note_on(note, velocity);
    }

    #[wasm_bindgen]
    pub fn note_off(&mut self, note: u8) {
        self.synth.release_note(note);
    }

    #[wasm_bindgen]
    pub fn set_macro(&mut self, index: usize, value: f32) {
        self.synth.set_macro(index, value);
    }

    /// `name` is the persisted field name, e.g. `filterCut`.
    #[wasm_bindgen]
    pub fn set_param(&mut self, name: &str, value: f32) -> bool {
        match Param::from_name(name) {
            Some(param) => {
                self.synth.set_param(param, value);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen]
    pub fn connect(&mut self, source: usize, dest: usize, depth: f32) {
        self.synth.connect(source, dest, depth);
    }

    #[wasm_bindgen]
    pub fn remove_connection(&mut self, source: usize, dest: usize) {
        self.synth.remove_connection(source, dest);
    }

    #[wasm_bindgen]
    pub fn set_mod_depth(&mut self, source: usize, dest: usize, depth: f32) {
        self.synth.set_mod_depth(source, dest, depth);
    }

    #[wasm_bindgen]
    pub fn load_scale(&mut self, name: &str, text: &str) {
        self.synth.load_scale_text(name, text);
    }

    #[wasm_bindgen]
    pub fn set_root(&mut self, note: i32) {
        self.synth.set_root(note);
    }

    #[wasm_bindgen]
    pub fn set_step(&mut self, index: usize, step: JsValue) -> Result<(), JsValue> {
        let step: SequencerStep = serde_wasm_bindgen::from_value(step)?;
        self.synth.set_step(index, step);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn start_sequencer(&mut self, bpm: f32) {
        self.synth.set_bpm(bpm);
        self.synth.start_sequencer();
    }

    #[wasm_bindgen]
    pub fn stop_sequencer(&mut self) {
        self.synth.stop_sequencer();
    }

    #[wasm_bindgen]
    pub fn apply_preset(&mut self, preset: JsValue) -> Result<(), JsValue> {
        let preset: Preset = serde_wasm_bindgen::from_value(preset)?;
        self.synth.apply_preset(&preset);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn apply_builtin_preset(&mut self, name: &str) -> bool {
        match builtin_preset(name) {
            Some(preset) => {
                self.synth.apply_preset(&preset);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen]
    pub fn collect_preset(&self, name: &str) -> Result<JsValue, JsValue> {
        let preset = self.synth.collect_preset(name);
        Ok(serde_wasm_bindgen::to_value(&preset)?)
    }

    #[wasm_bindgen]
    pub fn randomize(&mut self, wild: bool) {
        let mode = if wild {
            RandomizeMode::Wild
        } else {
            RandomizeMode::Safe
        };
        self.synth.randomize(mode);
    }

    #[wasm_bindgen]
    pub fn randomize_all(&mut self) {
        self.synth.randomize_all();
    }

    #[wasm_bindgen]
    pub fn normalize_routes(&mut self) {
        self.synth.normalize_routes();
    }

    #[wasm_bindgen]
    pub fn toggle_accent_step(&mut self, index: usize) {
        self.synth.toggle_accent_step(index);
    }

    #[wasm_bindgen]
    pub fn set_accent_lane(&mut self, enabled: bool) {
        self.synth.set_accent_lane_enabled(enabled);
    }

    #[wasm_bindgen]
    pub fn stutter(&mut self) {
        self.synth.stutter();
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.synth.reset();
    }

    #[wasm_bindgen]
    pub fn panic(&mut self) {
        self.synth.panic();
    }
}
