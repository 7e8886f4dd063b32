use super::chaos::{ChaosConfig, SpikeConfig};
use super::config::VelocityMode;
use super::envelope::EnvelopeParams;
use super::preset::{Param, Preset};
use super::randomize::RandomizeMode;
use super::scale::Scale;
use super::sequencer::SequencerStep;

/// Control messages sent from input threads to the engine. They are applied
/// at the start of the next rendered buffer.
#[derive(Debug, Clone)]
pub enum SynthCommand {
    /// `velocity: None` picks one from the configured velocity mode.
    NoteOn { note: u8, velocity: Option<f32> },
    /// Release `note` if it is the sounding note.
    NoteOff { note: u8 },
    AllNotesOff,
    /// Frequency multiplier, 1.0 = centred.
    PitchBend(f32),
    SetMacro { index: usize, value: f32 },
    SetParam { param: Param, value: f32 },
    Connect { source: usize, dest: usize, depth: f32 },
    RemoveConnection { source: usize, dest: usize },
    SetModDepth { source: usize, dest: usize, depth: f32 },
    SetRatio { op: usize, ratio: f32 },
    SetOutputLevel { op: usize, level: f32 },
    SetEnvelope { op: usize, params: EnvelopeParams },
    SetChaos(ChaosConfig),
    SetSpikes(SpikeConfig),
    /// Scales are parsed on the sending side, and the name moves into the
    /// tuning as is.
    LoadScale { name: String, scale: Scale },
    SetRoot(i32),
    SetStep { index: usize, step: SequencerStep },
    SetBpm(f32),
    StartSequencer,
    StopSequencer,
    SetOversample(bool),
    SetVelocityMode(VelocityMode),
    ApplyPreset(Box<Preset>),
    Randomize(RandomizeMode),
    RandomizeAll,
    NormalizeRoutes,
    SetAccentStep { index: usize, on: bool },
    SetAccentLane(bool),
    Stutter,
    /// Stop the sequencer and release the note.
    Reset,
    /// `Reset`, and cut the tails of the master chain.
    Panic,
}
