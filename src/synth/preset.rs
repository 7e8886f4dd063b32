//! Persisted instrument state.
//!
//! The JSON layout is shared with existing preset files: `fm`, `envelopes`,
//! `macros`, `chaos`, `spikes` and `params`, with camelCase field names.
//! Presets older than version 2 carry neither envelopes nor chaos/spike
//! settings; loading one resets envelopes to their defaults and leaves chaos
//! and spikes untouched.

use super::chaos::{ChaosConfig, SpikeConfig};
use super::envelope::EnvelopeParams;
use super::error::SynthError;
use crate::synth::prelude::MACRO_COUNT;
use serde::{Deserialize, Serialize};

pub const PRESET_VERSION: u32 = 2;

/// The loose numeric parameters of the master chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    BaseFreq,
    FilterCut,
    FilterRes,
    CombDepth,
    DistDrive,
    FoldAmt,
    BitDepth,
    Downsample,
    UnisonVoices,
    UnisonDetune,
    OutGain,
}

impl Param {
    pub const ALL: [Param; 11] = [
        Param::BaseFreq,
        Param::FilterCut,
        Param::FilterRes,
        Param::CombDepth,
        Param::DistDrive,
        Param::FoldAmt,
        Param::BitDepth,
        Param::Downsample,
        Param::UnisonVoices,
        Param::UnisonDetune,
        Param::OutGain,
    ];

    /// Field name in the persisted layout.
    pub fn name(self) -> &'static str {
        match self {
            Param::BaseFreq => "baseFreq",
            Param::FilterCut => "filterCut",
            Param::FilterRes => "filterRes",
            Param::CombDepth => "combDepth",
            Param::DistDrive => "distDrive",
            Param::FoldAmt => "foldAmt",
            Param::BitDepth => "bitDepth",
            Param::Downsample => "downsample",
            Param::UnisonVoices => "unisonVoices",
            Param::UnisonDetune => "unisonDetune",
            Param::OutGain => "outGain",
        }
    }

    pub fn from_name(name: &str) -> Option<Param> {
        Param::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Accepted range; values are clamped into it at the engine boundary.
    pub fn range(self) -> (f32, f32) {
        match self {
            Param::BaseFreq => (10.0, 2000.0),
            Param::FilterCut => (20.0, 20000.0),
            Param::FilterRes => (0.0, 30.0),
            Param::CombDepth => (0.0, 1.0),
            Param::DistDrive => (0.0, 5.0),
            Param::FoldAmt => (0.0, 2.0),
            Param::BitDepth => (1.0, 16.0),
            Param::Downsample => (1.0, 16.0),
            Param::UnisonVoices => (1.0, 8.0),
            Param::UnisonDetune => (0.0, 100.0),
            Param::OutGain => (0.0, 2.0),
        }
    }

    pub fn clamp(self, value: f32) -> f32 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Params {
    pub base_freq: f32,
    pub filter_cut: f32,
    pub filter_res: f32,
    pub comb_depth: f32,
    pub dist_drive: f32,
    pub fold_amt: f32,
    pub bit_depth: f32,
    pub downsample: f32,
    /// Persisted only; the signal path is monophonic.
    pub unison_voices: f32,
    pub unison_detune: f32,
    pub out_gain: f32,
}

impl Params {
    pub fn get(&self, param: Param) -> f32 {
        match param {
            Param::BaseFreq => self.base_freq,
            Param::FilterCut => self.filter_cut,
            Param::FilterRes => self.filter_res,
            Param::CombDepth => self.comb_depth,
            Param::DistDrive => self.dist_drive,
            Param::FoldAmt => self.fold_amt,
            Param::BitDepth => self.bit_depth,
            Param::Downsample => self.downsample,
            Param::UnisonVoices => self.unison_voices,
            Param::UnisonDetune => self.unison_detune,
            Param::OutGain => self.out_gain,
        }
    }

    pub fn set(&mut self, param: Param, value: f32) {
        let slot = match param {
            Param::BaseFreq => &mut self.base_freq,
            Param::FilterCut => &mut self.filter_cut,
            Param::FilterRes => &mut self.filter_res,
            Param::CombDepth => &mut self.comb_depth,
            Param::DistDrive => &mut self.dist_drive,
            Param::FoldAmt => &mut self.fold_amt,
            Param::BitDepth => &mut self.bit_depth,
            Param::Downsample => &mut self.downsample,
            Param::UnisonVoices => &mut self.unison_voices,
            Param::UnisonDetune => &mut self.unison_detune,
            Param::OutGain => &mut self.out_gain,
        };
        *slot = value;
    }

    /// Clamp every field into its range; non-finite fields fall back to the
    /// defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Params::default();
        for param in Param::ALL {
            let value = self.get(param);
            let value = if value.is_finite() {
                param.clamp(value)
            } else {
                defaults.get(param)
            };
            self.set(param, value);
        }
        self
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            base_freq: 55.0,
            filter_cut: 3200.0,
            filter_res: 0.3,
            comb_depth: 0.4,
            dist_drive: 1.3,
            fold_amt: 0.55,
            bit_depth: 12.0,
            downsample: 3.0,
            unison_voices: 3.0,
            unison_detune: 25.0,
            out_gain: 0.6,
        }
    }
}

/// One `(source, dest, depth)` routing triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSetting {
    pub s: usize,
    pub d: usize,
    pub depth: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FmSettings {
    pub ratios: Vec<f32>,
    pub mod_depths: Vec<EdgeSetting>,
    pub out_levels: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub name: String,
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fm: Option<FmSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelopes: Option<Vec<EnvelopeParams>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macros: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chaos: Option<ChaosConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spikes: Option<SpikeConfig>,
    pub params: Params,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            name: "Unsaved".to_string(),
            version: 1,
            fm: None,
            envelopes: None,
            macros: None,
            chaos: None,
            spikes: None,
            params: Params::default(),
        }
    }
}

impl Preset {
    pub fn from_json(json: &str) -> Result<Self, SynthError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SynthError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Stored envelopes, honoured from version 2 on. `None` means every
    /// operator goes back to the default envelope.
    pub fn effective_envelopes(&self) -> Option<&[EnvelopeParams]> {
        self.envelopes
            .as_deref()
            .filter(|_| self.version >= PRESET_VERSION)
    }

    pub fn effective_chaos(&self) -> Option<ChaosConfig> {
        self.chaos.filter(|_| self.version >= PRESET_VERSION)
    }

    pub fn effective_spikes(&self) -> Option<SpikeConfig> {
        self.spikes.filter(|_| self.version >= PRESET_VERSION)
    }

    /// First `MACRO_COUNT` macro values, if present.
    pub fn macro_values(&self) -> Option<&[f32]> {
        self.macros
            .as_deref()
            .map(|m| &m[..m.len().min(MACRO_COUNT)])
    }
}

fn env(a: f32, d: f32, s: f32, r: f32, level: f32, mod_scale: f32) -> EnvelopeParams {
    EnvelopeParams {
        a,
        d,
        s,
        r,
        level,
        mod_scale,
    }
}

fn chain(depths: [f32; 3]) -> Vec<EdgeSetting> {
    [(2, 1), (3, 2), (1, 0)]
        .into_iter()
        .zip(depths)
        .map(|((s, d), depth)| EdgeSetting { s, d, depth })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn params(
    base_freq: f32,
    filter_cut: f32,
    filter_res: f32,
    comb_depth: f32,
    dist_drive: f32,
    fold_amt: f32,
    bit_depth: f32,
    downsample: f32,
    unison_voices: f32,
    unison_detune: f32,
    out_gain: f32,
) -> Params {
    Params {
        base_freq,
        filter_cut,
        filter_res,
        comb_depth,
        dist_drive,
        fold_amt,
        bit_depth,
        downsample,
        unison_voices,
        unison_detune,
        out_gain,
    }
}

fn chaos(rate: f32, amount: f32, filter: bool, drive: bool, modulation: bool) -> ChaosConfig {
    ChaosConfig {
        rate,
        amount,
        target_filter: filter,
        target_drive: drive,
        target_mod: modulation,
    }
}

fn spikes(enabled: bool, probability: f32, boost: f32) -> SpikeConfig {
    SpikeConfig {
        enabled,
        probability,
        boost,
    }
}

/// The factory presets, in menu order.
pub fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset {
            name: "Neuro Growl".to_string(),
            version: PRESET_VERSION,
            fm: Some(FmSettings {
                ratios: vec![1.0, 1.49, 2.01, 0.5],
                mod_depths: chain([180.0, 140.0, 190.0]),
                out_levels: vec![1.0, 0.0, 0.0, 0.0],
            }),
            envelopes: Some(vec![
                env(0.01, 0.11, 0.55, 0.28, 1.0, 1.0),
                env(0.02, 0.18, 0.4, 0.35, 0.7, 1.2),
                env(0.015, 0.09, 0.5, 0.3, 0.6, 1.35),
                env(0.03, 0.14, 0.3, 0.25, 0.5, 1.1),
            ]),
            macros: Some(vec![0.35, 0.55, 0.25, 0.4]),
            chaos: Some(chaos(3.2, 0.3, true, true, false)),
            spikes: Some(spikes(true, 0.18, 1.6)),
            params: params(
                55.0, 3200.0, 0.35, 0.4, 1.3, 0.55, 10.0, 3.0, 3.0, 25.0, 0.6,
            ),
        },
        Preset {
            name: "Laser Shred (Chaotic)".to_string(),
            version: PRESET_VERSION,
            fm: Some(FmSettings {
                ratios: vec![1.0, 4.0, 7.5, 0.25],
                mod_depths: chain([420.0, 360.0, 420.0]),
                out_levels: vec![1.0, 0.0, 0.0, 0.0],
            }),
            envelopes: Some(vec![
                env(0.005, 0.07, 0.35, 0.22, 1.0, 1.3),
                env(0.012, 0.09, 0.2, 0.25, 0.6, 1.5),
                env(0.02, 0.15, 0.15, 0.3, 0.5, 1.8),
                env(0.03, 0.18, 0.1, 0.35, 0.4, 1.4),
            ]),
            macros: Some(vec![0.8, 0.75, 0.2, 0.1]),
            chaos: Some(chaos(7.5, 0.55, true, true, true)),
            spikes: Some(spikes(true, 0.22, 1.9)),
            params: params(
                63.0, 6200.0, 0.55, 0.65, 1.9, 1.1, 8.0, 2.0, 3.0, 18.0, 0.58,
            ),
        },
        Preset {
            name: "Vowel Drift".to_string(),
            version: PRESET_VERSION,
            fm: Some(FmSettings {
                ratios: vec![1.0, 2.02, 3.01, 1.5],
                mod_depths: chain([140.0, 260.0, 210.0]),
                out_levels: vec![1.0, 0.06, 0.0, 0.0],
            }),
            envelopes: Some(vec![
                env(0.02, 0.18, 0.65, 0.4, 1.0, 1.0),
                env(0.03, 0.2, 0.5, 0.42, 0.5, 1.1),
                env(0.025, 0.22, 0.55, 0.5, 0.4, 1.3),
                env(0.04, 0.25, 0.4, 0.5, 0.35, 1.2),
            ]),
            macros: Some(vec![0.6, 0.35, 0.55, 0.7]),
            chaos: Some(chaos(2.2, 0.25, true, false, true)),
            spikes: Some(spikes(false, 0.1, 1.4)),
            params: params(
                60.0, 4100.0, 0.42, 0.5, 1.1, 0.4, 12.0, 4.0, 2.0, 12.0, 0.55,
            ),
        },
        Preset {
            name: "Sub Punch Env".to_string(),
            version: PRESET_VERSION,
            fm: Some(FmSettings {
                ratios: vec![1.0, 1.01, 2.0, 0.5],
                mod_depths: chain([90.0, 60.0, 110.0]),
                out_levels: vec![1.0, 0.0, 0.0, 0.0],
            }),
            envelopes: Some(vec![
                env(0.005, 0.12, 0.0, 0.25, 1.0, 0.9),
                env(0.01, 0.1, 0.0, 0.2, 0.4, 1.1),
                env(0.015, 0.09, 0.0, 0.25, 0.4, 1.2),
                env(0.02, 0.1, 0.0, 0.22, 0.3, 1.1),
            ]),
            macros: Some(vec![0.15, 0.3, 0.1, 0.1]),
            chaos: Some(chaos(1.5, 0.15, false, false, false)),
            spikes: Some(spikes(false, 0.05, 1.2)),
            params: params(
                45.0, 1800.0, 0.25, 0.1, 0.9, 0.25, 14.0, 3.0, 1.0, 0.0, 0.55,
            ),
        },
    ]
}

/// Look up a factory preset by exact name, or by case-insensitive prefix.
pub fn builtin_preset(name: &str) -> Option<Preset> {
    let presets = builtin_presets();
    let lowered = name.to_lowercase();
    presets
        .iter()
        .position(|p| p.name == name)
        .or_else(|| {
            presets
                .iter()
                .position(|p| p.name.to_lowercase().starts_with(&lowered))
        })
        .map(|idx| presets[idx].clone())
}
