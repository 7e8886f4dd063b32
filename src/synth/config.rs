use super::error::SynthError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How `note_on_auto` picks a velocity when the input has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VelocityMode {
    /// Always 100/127.
    Fixed,
    /// Uniform in [60, 127]/127.
    #[default]
    Random,
    /// Alternates full and 0.55.
    Accent,
}

impl std::str::FromStr for VelocityMode {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(VelocityMode::Fixed),
            "random" => Ok(VelocityMode::Random),
            "accent" => Ok(VelocityMode::Accent),
            other => Err(SynthError::Config(format!("unknown velocity mode '{other}'"))),
        }
    }
}

/// Engine construction settings. Everything here is fixed for the lifetime of
/// a `Synth`; live parameters go through the engine setters instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub operator_count: usize,
    /// Used until the audio backend reports the device rate.
    pub sample_rate: f32,
    /// Final gain before the limiter.
    pub master_volume: f32,
    pub curve_length: usize,
    pub bpm: f32,
    pub velocity_mode: VelocityMode,
    /// Seed for chaos, spike and noise randomness.
    pub seed: u64,
    /// Cadence of chaos, spike and envelope-scaling updates (Hz).
    pub control_rate_hz: f32,
    pub oversample: bool,
    /// Pitch-bend range in semitones.
    pub bend_range: f32,
    /// MIDI channel 0-15, or omni when unset.
    pub midi_channel: Option<u8>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            operator_count: 4,
            sample_rate: 44100.0,
            master_volume: 1.0,
            curve_length: 2048,
            bpm: 172.0,
            velocity_mode: VelocityMode::Random,
            seed: 0x5EED_F00D,
            control_rate_hz: 60.0,
            oversample: false,
            bend_range: 2.0,
            midi_channel: None,
        }
    }
}

impl SynthConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, SynthError> {
        let config: SynthConfig = toml::from_str(text)?;
        config.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SynthError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validated(self) -> Result<Self, SynthError> {
        if self.operator_count == 0 || self.operator_count > crate::synth::prelude::MAX_OPERATORS {
            return Err(SynthError::Config(format!(
                "operator_count must be between 1 and {}",
                crate::synth::prelude::MAX_OPERATORS
            )));
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SynthError::Config("sample_rate must be positive".into()));
        }
        if self.curve_length < 2 {
            return Err(SynthError::Config("curve_length must be at least 2".into()));
        }
        if !(self.control_rate_hz.is_finite() && self.control_rate_hz > 0.0) {
            return Err(SynthError::Config("control_rate_hz must be positive".into()));
        }
        if let Some(channel) = self.midi_channel {
            if channel > 15 {
                return Err(SynthError::Config("midi_channel must be 0-15".into()));
            }
        }
        Ok(self)
    }
}
