use super::chaos::{ChaosConfig, ChaosSource, SpikeConfig, SpikeInjector};
use super::command::SynthCommand;
use super::config::{SynthConfig, VelocityMode};
use super::context::ProcessContext;
use super::envelope::EnvelopeParams;
use super::mix::{MasterChain, CUTOFF_TIME_CONSTANT};
use super::network::OperatorNetwork;
use super::preset::{EdgeSetting, FmSettings, Param, Params, Preset, PRESET_VERSION};
use super::randomize::{
    random_chaos, random_envelope, random_params, random_spikes, RandomizeMode,
};
use super::scale::{Scale, Tuning, BUILTIN_SCALES};
use super::sequencer::{AccentLane, NoteSink, SequencerStep, StepSequencer};
use crate::synth::prelude::{finite_or, CONTROL_QUANTUM, MACRO_COUNT};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::borrow::Cow;
use tracing::info;

/// Chaos retargets of the filter cutoff (seconds).
const CHAOS_FILTER_TIME_CONSTANT: f64 = 0.03;
/// Chaos retargets of the drive gain (seconds).
const CHAOS_DRIVE_TIME_CONSTANT: f64 = 0.05;
/// Per-edge modulation scale retargets (seconds).
const EDGE_SCALE_TIME_CONSTANT: f64 = 0.03;
/// Depth glide used by randomization and route normalization (seconds).
const ROUTE_TIME_CONSTANT: f64 = 0.05;
/// Largest edge depth after `normalize_routes` (Hz).
pub const NORMALIZED_MAX_DEPTH: f32 = 300.0;

const DEFAULT_MACROS: [f32; MACRO_COUNT] = [0.3, 0.5, 0.2, 0.4];

/// The instrument: one explicit engine context owning the operator network,
/// tuning, modulators, sequencer and master chain.
///
/// All control calls write scheduled automation at the current engine time;
/// `render_block` consumes it. The clock is engine time in seconds, advanced
/// by the frames rendered.
///
/// Nothing reachable from `apply_command` or `render_block` logs or
/// allocates; invalid input is dropped silently.
pub struct Synth {
    pub config: SynthConfig,
    sample_rate: f32,
    time: f64,
    network: OperatorNetwork,
    tuning: Tuning,
    chaos_config: ChaosConfig,
    chaos: ChaosSource,
    spikes: SpikeInjector,
    sequencer: StepSequencer,
    accent_lane: AccentLane,
    mix: MasterChain,
    params: Params,
    macros: [f32; MACRO_COUNT],
    velocity_mode: VelocityMode,
    accent_toggle: bool,
    current_note: Option<u8>,
    gate: bool,
    pitch_bend: f32,
    next_control: f64,
    rng: SmallRng,
}

impl Synth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SynthConfig) -> Self {
        let sample_rate = config.sample_rate.max(1.0);
        let params = Params::default();
        let macros = DEFAULT_MACROS;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let chaos_config = ChaosConfig::default();
        let chaos = ChaosSource::with_rng(chaos_config.rate, chaos_config.amount, &mut rng, 0.0);

        let network = OperatorNetwork::with_default_patch(config.operator_count, params.base_freq);
        let mut mix = MasterChain::new(sample_rate, config.curve_length, &params, &macros);
        mix.set_oversample(config.oversample);
        mix.set_master_volume(config.master_volume);

        network.print_structure();
        info!(
            "Synth ready: {} operators, {} Hz, {} bpm",
            network.operator_count(),
            sample_rate,
            config.bpm
        );

        Self {
            sample_rate,
            time: 0.0,
            network,
            tuning: Tuning::default(),
            chaos_config,
            chaos,
            spikes: SpikeInjector::new(SpikeConfig::default()),
            sequencer: StepSequencer::new(config.bpm),
            accent_lane: AccentLane::default(),
            mix,
            params,
            macros,
            velocity_mode: config.velocity_mode,
            accent_toggle: false,
            current_note: None,
            gate: false,
            pitch_bend: 1.0,
            next_control: 0.0,
            rng,
            config,
        }
    }

    // --- Accessors -------------------------------------------------------

    /// Engine time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn network(&self) -> &OperatorNetwork {
        &self.network
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    pub fn accent_lane(&self) -> &AccentLane {
        &self.accent_lane
    }

    pub fn mix(&self) -> &MasterChain {
        &self.mix
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn macros(&self) -> &[f32; MACRO_COUNT] {
        &self.macros
    }

    pub fn chaos_config(&self) -> ChaosConfig {
        self.chaos_config
    }

    pub fn chaos_value(&self) -> f32 {
        self.chaos.value()
    }

    pub fn spike_config(&self) -> SpikeConfig {
        self.spikes.config
    }

    pub fn current_note(&self) -> Option<u8> {
        self.current_note
    }

    pub fn is_gate_on(&self) -> bool {
        self.gate
    }

    pub fn pitch_bend(&self) -> f32 {
        self.pitch_bend
    }

    pub fn velocity_mode(&self) -> VelocityMode {
        self.velocity_mode
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return;
        }
        self.sample_rate = sample_rate;
        self.mix.set_sample_rate(sample_rate);
    }

    // --- Notes -------------------------------------------------------------

    /// Monophonic note-on: retune to the tuned frequency, gate every envelope
    /// and push macro 1 towards the velocity.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let now = self.time;
        let velocity = finite_or(velocity, 1.0).clamp(0.0, 1.0);
        let frequency = self.tuning.frequency_for_note(note as i32) as f32;

        self.current_note = Some(note);
        self.network.gate_on(velocity, now);
        self.macros[1] = (self.macros[1] * 0.7 + velocity * 0.6).min(1.0);
        self.mix.update_shapers(&self.macros);
        self.mix.trigger_noise(now, 0.1 + velocity * 0.15);
        self.network
            .set_base_frequency(frequency * self.pitch_bend, now);
        self.gate = true;
    }

    /// Note-on with a velocity picked by the velocity mode.
    pub fn note_on_auto(&mut self, note: u8) {
        let velocity = self.next_velocity();
        self.note_on(note, velocity);
    }

    fn next_velocity(&mut self) -> f32 {
        match self.velocity_mode {
            VelocityMode::Fixed => 100.0 / 127.0,
            VelocityMode::Random => (60.0 + self.rng.random::<f32>() * 67.0) / 127.0,
            VelocityMode::Accent => {
                self.accent_toggle = !self.accent_toggle;
                if self.accent_toggle {
                    1.0
                } else {
                    0.55
                }
            }
        }
    }

    pub fn note_off(&mut self) {
        self.network.gate_off(self.time);
        self.gate = false;
    }

    /// Release `note` only if it is the note currently sounding.
    pub fn release_note(&mut self, note: u8) {
        if self.current_note == Some(note) {
            self.note_off();
        }
    }

    pub fn set_velocity_mode(&mut self, mode: VelocityMode) {
        self.velocity_mode = mode;
    }

    /// `ratio` multiplies the tuned frequency of the current note (or of the
    /// tuning root when nothing has played yet).
    pub fn set_pitch_bend(&mut self, ratio: f32) {
        if !(ratio.is_finite() && ratio > 0.0) {
            return;
        }
        self.pitch_bend = ratio;
        let note = self
            .current_note
            .map(i32::from)
            .unwrap_or(self.tuning.root_note());
        let tuned = self.tuning.frequency_for_note(note) as f32;
        self.network.set_base_frequency(tuned * ratio, self.time);
    }

    // --- Routing -----------------------------------------------------------

    fn check_operator(&self, op: usize) -> bool {
        op < self.network.operator_count()
    }

    pub fn connect(&mut self, source: usize, dest: usize, depth: f32) {
        if !self.check_operator(source) || !self.check_operator(dest) {
            return;
        }
        self.network
            .connect(source, dest, finite_or(depth, 0.0).max(0.0));
    }

    pub fn remove_connection(&mut self, source: usize, dest: usize) {
        self.network.remove_connection(source, dest);
    }

    pub fn set_mod_depth(&mut self, source: usize, dest: usize, depth: f32) {
        if !depth.is_finite() {
            return;
        }
        self.network
            .set_mod_depth(source, dest, depth.max(0.0), self.time);
    }

    pub fn set_ratio(&mut self, op: usize, ratio: f32) {
        if !self.check_operator(op) || !ratio.is_finite() {
            return;
        }
        self.network.set_ratio(op, ratio.max(0.0), self.time);
    }

    pub fn set_output_level(&mut self, op: usize, level: f32) {
        if !self.check_operator(op) || !level.is_finite() {
            return;
        }
        self.network.set_output_level(op, level.max(0.0), self.time);
    }

    pub fn set_envelope(&mut self, op: usize, params: EnvelopeParams) {
        if !self.check_operator(op) {
            return;
        }
        if let Some(operator) = self.network.operator_mut(op) {
            operator.envelope.set_params(params);
        }
    }

    // --- Tuning ------------------------------------------------------------

    /// Replace the scale wholesale. The sounding note keeps its pitch until
    /// the next note-on or bend.
    pub fn load_scale(&mut self, name: impl Into<Cow<'static, str>>, scale: Scale) {
        self.tuning.set_scale(name, scale);
    }

    pub fn load_scale_text(&mut self, name: &str, text: &str) {
        self.load_scale(name.to_string(), Scale::from_scl(text));
    }

    /// Returns false when no built-in tuning has that name.
    pub fn load_builtin_scale(&mut self, name: &str) -> bool {
        match BUILTIN_SCALES.iter().find(|(n, _)| *n == name) {
            Some((name, text)) => {
                self.load_scale(*name, Scale::from_scl(text));
                true
            }
            None => false,
        }
    }

    pub fn set_root(&mut self, note: i32) {
        self.tuning.set_root(note.clamp(0, 127));
    }

    /// Back to 12-TET, root unchanged.
    pub fn reset_tuning(&mut self) {
        self.load_scale(BUILTIN_SCALES[0].0, Scale::twelve_tet());
    }

    // --- Macros and parameters ----------------------------------------------

    pub fn set_macro(&mut self, index: usize, value: f32) {
        if index >= MACRO_COUNT || !value.is_finite() {
            return;
        }
        self.macros[index] = value.clamp(0.0, 1.0);
        self.mix.set_band_pass(&self.macros, self.time);
        self.mix.update_shapers(&self.macros);
    }

    pub fn param(&self, param: Param) -> f32 {
        self.params.get(param)
    }

    pub fn set_param(&mut self, param: Param, value: f32) {
        if !value.is_finite() {
            return;
        }
        self.params.set(param, param.clamp(value));
        self.apply_param(param);
    }

    fn apply_param(&mut self, param: Param) {
        let now = self.time;
        let p = self.params;
        match param {
            Param::BaseFreq => self
                .network
                .set_base_frequency(p.base_freq * self.pitch_bend, now),
            Param::FilterCut => self
                .mix
                .set_cutoff(p.filter_cut, now, CUTOFF_TIME_CONSTANT),
            Param::FilterRes => self.mix.set_resonance(p.filter_res, now),
            Param::CombDepth => self.mix.set_comb_depth(p.comb_depth, now),
            Param::DistDrive | Param::FoldAmt => {
                self.mix.set_distortion(p.dist_drive, p.fold_amt)
            }
            Param::BitDepth | Param::Downsample => {
                self.mix.set_bitcrush(p.bit_depth, p.downsample)
            }
            Param::UnisonVoices | Param::UnisonDetune => {}
            Param::OutGain => self.mix.set_out_gain(p.out_gain, now),
        }
    }

    pub fn set_oversample(&mut self, enabled: bool) {
        self.mix.set_oversample(enabled);
        if enabled {
            self.mix
                .set_distortion(self.params.dist_drive, self.params.fold_amt);
        }
    }

    // --- Modulators ----------------------------------------------------------

    /// Non-finite rate or amount fall back to the defaults.
    pub fn set_chaos(&mut self, config: ChaosConfig) {
        let config = config.sanitized();
        self.chaos_config = config;
        self.chaos.set_rate(config.rate);
        self.chaos.set_amount(config.amount);
    }

    /// Probability is clamped to 0..=1 and non-finite fields fall back to the
    /// defaults before the config reaches the control tick.
    pub fn set_spikes(&mut self, config: SpikeConfig) {
        self.spikes.config = config.sanitized();
    }

    // --- Sequencer -------------------------------------------------------------

    pub fn set_step(&mut self, index: usize, step: SequencerStep) {
        self.sequencer.set_step(index, step);
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.sequencer.set_bpm(bpm);
    }

    pub fn start_sequencer(&mut self) {
        self.sequencer.start(self.time);
    }

    pub fn stop_sequencer(&mut self) {
        let now = self.time;
        let mut sequencer = std::mem::take(&mut self.sequencer);
        sequencer.stop(now, self);
        self.sequencer = sequencer;
    }

    pub fn set_accent_step(&mut self, index: usize, on: bool) {
        self.accent_lane.set_step(index, on);
    }

    pub fn toggle_accent_step(&mut self, index: usize) {
        self.accent_lane.toggle(index);
    }

    pub fn set_accent_lane_enabled(&mut self, enabled: bool) {
        self.accent_lane.enabled = enabled;
    }

    /// Force-terminate everything in flight: sequencer, current note.
    pub fn reset(&mut self) {
        self.stop_sequencer();
        self.note_off();
    }

    /// `reset`, plus cut every tail still ringing in the master chain (comb,
    /// filters, stutter).
    pub fn panic(&mut self) {
        self.reset();
        self.mix.reset();
    }

    /// Short feedback echo burst with an 80-130 ms delay.
    pub fn stutter(&mut self) {
        let delay = 0.08 + self.rng.random::<f64>() * 0.05;
        self.mix.trigger_stutter(self.time, delay);
    }

    // --- Randomization ---------------------------------------------------------

    /// New ratios, edge depths, macros and envelopes; parameters are
    /// re-applied so the shapers and band-pass follow the new macros.
    pub fn randomize(&mut self, mode: RandomizeMode) {
        let now = self.time;
        for op in 0..self.network.operator_count() {
            let ratio = mode.ratio(&mut self.rng);
            self.network.set_ratio(op, ratio, now);
        }
        for idx in 0..self.network.edges().len() {
            let depth = mode.depth(&mut self.rng);
            self.network
                .set_edge_depth(idx, depth, now, ROUTE_TIME_CONSTANT);
        }
        for value in self.macros.iter_mut() {
            *value = self.rng.random::<f32>();
        }
        self.randomize_envelopes(mode.envelope_intensity());
        self.apply_all_params();
    }

    /// Wild randomization, then every loose parameter, chaos and spikes.
    pub fn randomize_all(&mut self) {
        self.randomize(RandomizeMode::Wild);
        self.params = random_params(&mut self.rng).sanitized();
        let chaos = random_chaos(&mut self.rng);
        self.set_chaos(chaos);
        let spikes = random_spikes(&mut self.rng);
        self.set_spikes(spikes);
        self.randomize_envelopes(1.0);
        self.apply_all_params();
    }

    fn randomize_envelopes(&mut self, intensity: f32) {
        for op in 0..self.network.operator_count() {
            let params = random_envelope(intensity, &mut self.rng);
            self.set_envelope(op, params);
        }
    }

    /// Rescale every edge so the deepest one becomes `NORMALIZED_MAX_DEPTH`,
    /// keeping their proportions. No-op without edges or when all depths
    /// are 0.
    pub fn normalize_routes(&mut self) {
        let max = self
            .network
            .edges()
            .iter()
            .map(|e| e.nominal_depth())
            .fold(0.0f32, f32::max);
        if max <= 0.0 {
            return;
        }
        let now = self.time;
        for idx in 0..self.network.edges().len() {
            let depth = self.network.edges()[idx].nominal_depth() / max * NORMALIZED_MAX_DEPTH;
            self.network
                .set_edge_depth(idx, depth, now, ROUTE_TIME_CONSTANT);
        }
    }

    // --- Presets ---------------------------------------------------------------

    /// Apply a preset. Routing is diffed: edges the preset lacks are removed,
    /// the rest are connected or retargeted. A preset without an `fm`
    /// section has no edges, so every edge is removed; ratios and levels are
    /// left alone.
    pub fn apply_preset(&mut self, preset: &Preset) {
        let count = self.network.operator_count();
        let wanted: &[EdgeSetting] = preset
            .fm
            .as_ref()
            .map(|fm| fm.mod_depths.as_slice())
            .unwrap_or(&[]);

        for idx in (0..self.network.edges().len()).rev() {
            let edge = &self.network.edges()[idx];
            let (source, dest) = (edge.source(), edge.dest());
            if !wanted.iter().any(|e| e.s == source && e.d == dest) {
                self.network.remove_connection(source, dest);
            }
        }

        if let Some(fm) = &preset.fm {
            for edge in &fm.mod_depths {
                self.connect(edge.s, edge.d, edge.depth);
                self.set_mod_depth(edge.s, edge.d, edge.depth);
            }
            for (op, ratio) in fm.ratios.iter().enumerate().take(count) {
                self.set_ratio(op, *ratio);
            }
            for (op, level) in fm.out_levels.iter().enumerate().take(count) {
                self.set_output_level(op, *level);
            }
        }

        if let Some(macros) = preset.macro_values() {
            for (slot, value) in self.macros.iter_mut().zip(macros) {
                *slot = finite_or(*value, *slot).clamp(0.0, 1.0);
            }
        }

        match preset.effective_envelopes() {
            Some(envelopes) => {
                for (op, params) in envelopes.iter().enumerate().take(count) {
                    self.set_envelope(op, *params);
                }
            }
            None => {
                for op in 0..count {
                    self.set_envelope(op, EnvelopeParams::default());
                }
            }
        }
        if let Some(chaos) = preset.effective_chaos() {
            self.set_chaos(chaos);
        }
        if let Some(spikes) = preset.effective_spikes() {
            self.set_spikes(spikes);
        }

        self.params = preset.params.sanitized();
        self.apply_all_params();
    }

    /// Push every loose parameter and the macro-driven stages to the chain.
    fn apply_all_params(&mut self) {
        for param in Param::ALL {
            self.apply_param(param);
        }
        self.mix.set_band_pass(&self.macros, self.time);
        self.mix.update_shapers(&self.macros);
    }

    /// Snapshot the current state in the persisted layout.
    pub fn collect_preset(&self, name: &str) -> Preset {
        let operators = self.network.operators();
        Preset {
            name: name.to_string(),
            version: PRESET_VERSION,
            fm: Some(FmSettings {
                ratios: operators.iter().map(|op| op.ratio()).collect(),
                mod_depths: self
                    .network
                    .edges()
                    .iter()
                    .map(|e| EdgeSetting {
                        s: e.source(),
                        d: e.dest(),
                        depth: e.nominal_depth(),
                    })
                    .collect(),
                out_levels: operators.iter().map(|op| op.output_level()).collect(),
            }),
            envelopes: Some(operators.iter().map(|op| op.envelope.params()).collect()),
            macros: Some(self.macros.to_vec()),
            chaos: Some(self.chaos_config),
            spikes: Some(self.spikes.config),
            params: self.params,
        }
    }

    // --- Commands --------------------------------------------------------------

    pub fn apply_command(&mut self, command: SynthCommand) {
        match command {
            SynthCommand::NoteOn { note, velocity } => match velocity {
                Some(velocity) => self.note_on(note, velocity),
                None => self.note_on_auto(note),
            },
            SynthCommand::NoteOff { note } => self.release_note(note),
            SynthCommand::AllNotesOff => self.note_off(),
            SynthCommand::PitchBend(ratio) => self.set_pitch_bend(ratio),
            SynthCommand::SetMacro { index, value } => self.set_macro(index, value),
            SynthCommand::SetParam { param, value } => self.set_param(param, value),
            SynthCommand::Connect {
                source,
                dest,
                depth,
            } => self.connect(source, dest, depth),
            SynthCommand::RemoveConnection { source, dest } => {
                self.remove_connection(source, dest)
            }
            SynthCommand::SetModDepth {
                source,
                dest,
                depth,
            } => self.set_mod_depth(source, dest, depth),
            SynthCommand::SetRatio { op, ratio } => self.set_ratio(op, ratio),
            SynthCommand::SetOutputLevel { op, level } => self.set_output_level(op, level),
            SynthCommand::SetEnvelope { op, params } => self.set_envelope(op, params),
            SynthCommand::SetChaos(config) => self.set_chaos(config),
            SynthCommand::SetSpikes(config) => self.set_spikes(config),
            SynthCommand::LoadScale { name, scale } => self.load_scale(name, scale),
            SynthCommand::SetRoot(note) => self.set_root(note),
            SynthCommand::SetStep { index, step } => self.set_step(index, step),
            SynthCommand::SetBpm(bpm) => self.set_bpm(bpm),
            SynthCommand::StartSequencer => self.start_sequencer(),
            SynthCommand::StopSequencer => self.stop_sequencer(),
            SynthCommand::SetOversample(enabled) => self.set_oversample(enabled),
            SynthCommand::SetVelocityMode(mode) => self.set_velocity_mode(mode),
            SynthCommand::ApplyPreset(preset) => self.apply_preset(&preset),
            SynthCommand::Randomize(mode) => self.randomize(mode),
            SynthCommand::RandomizeAll => self.randomize_all(),
            SynthCommand::NormalizeRoutes => self.normalize_routes(),
            SynthCommand::SetAccentStep { index, on } => self.set_accent_step(index, on),
            SynthCommand::SetAccentLane(enabled) => self.set_accent_lane_enabled(enabled),
            SynthCommand::Stutter => self.stutter(),
            SynthCommand::Reset => self.reset(),
            SynthCommand::Panic => self.panic(),
        }
    }

    // --- Rendering -------------------------------------------------------------

    /// Render `output.len()` frames. Control work runs at every quantum
    /// boundary; nothing here allocates.
    pub fn render_block(&mut self, output: &mut [f32]) {
        for chunk in output.chunks_mut(CONTROL_QUANTUM) {
            let now = self.time;
            self.control_tick(now);

            let ctx = ProcessContext::new(self.sample_rate, now);
            self.network.process(chunk, &ctx);
            self.mix.process(chunk, &ctx, &mut self.rng);

            self.time += chunk.len() as f64 / self.sample_rate as f64;
        }
    }

    fn control_tick(&mut self, now: f64) {
        let mut sequencer = std::mem::take(&mut self.sequencer);
        sequencer.poll(now, self);
        self.sequencer = sequencer;

        if now < self.next_control {
            return;
        }
        let interval = 1.0 / self.config.control_rate_hz.max(1.0) as f64;
        self.next_control = if now - self.next_control > interval {
            now + interval
        } else {
            self.next_control + interval
        };
        self.update_modulators(now);
    }

    /// Chaos, spikes and envelope-driven modulation scaling.
    fn update_modulators(&mut self, now: f64) {
        let c = self.chaos.poll(now);
        let chaos = self.chaos_config;

        if chaos.target_filter {
            let cutoff = (self.params.filter_cut * (1.0 + c * 0.4)).max(80.0);
            self.mix
                .set_cutoff(cutoff, now, CHAOS_FILTER_TIME_CONSTANT);
        }
        if chaos.target_drive {
            if self.mix.oversample() {
                let drive = (self.params.dist_drive * (1.0 + c * 0.5)).max(0.0);
                self.mix.set_distortion(drive, self.params.fold_amt);
            } else {
                self.mix
                    .set_drive_gain(1.0 + c * 0.4, now, CHAOS_DRIVE_TIME_CONSTANT);
            }
        }

        self.spikes.poll(&mut self.network, &mut self.rng, now);

        let chaos_scale = if chaos.target_mod { 1.0 + c * 0.15 } else { 1.0 };
        let accent = self.accent_lane.factor(
            now,
            self.sequencer.step_duration(),
            self.macros[0],
        );
        for idx in 0..self.network.edges().len() {
            let source = self.network.edges()[idx].source();
            let envelope_scale = self
                .network
                .operator(source)
                .map(|op| op.envelope.mod_scale() * op.envelope.value())
                .unwrap_or(0.0);
            let scale = chaos_scale * accent * (0.9 + 0.1 * envelope_scale);
            self.network
                .set_edge_scale(idx, scale, now, EDGE_SCALE_TIME_CONSTANT);
        }
    }
}

impl NoteSink for Synth {
    fn note_on(&mut self, note: u8, velocity: f32, _time: f64) {
        Synth::note_on(self, note, velocity);
    }

    fn note_off(&mut self, note: u8, _time: f64) {
        self.release_note(note);
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::with_config(SynthConfig::default())
    }
}
