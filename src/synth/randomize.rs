//! Patch randomization. Every draw comes from the caller's generator, so a
//! seeded engine randomizes reproducibly.

use super::chaos::{ChaosConfig, SpikeConfig};
use super::envelope::EnvelopeParams;
use super::preset::Params;
use rand::Rng;

/// How far `Synth::randomize` may wander.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomizeMode {
    /// Musical ranges: ratios 1-5, depths 40-240 Hz, gentle envelopes.
    #[default]
    Safe,
    /// Ratios 0.25-12.25, depths 10-810 Hz, full-range envelopes.
    Wild,
}

impl RandomizeMode {
    pub fn ratio<R: Rng>(self, rng: &mut R) -> f32 {
        match self {
            RandomizeMode::Safe => 1.0 + rng.random::<f32>() * 4.0,
            RandomizeMode::Wild => 0.25 + rng.random::<f32>() * 12.0,
        }
    }

    pub fn depth<R: Rng>(self, rng: &mut R) -> f32 {
        match self {
            RandomizeMode::Safe => 40.0 + rng.random::<f32>() * 200.0,
            RandomizeMode::Wild => 10.0 + rng.random::<f32>() * 800.0,
        }
    }

    /// Spread of the randomized envelope times and mod scale.
    pub fn envelope_intensity(self) -> f32 {
        match self {
            RandomizeMode::Safe => 0.3,
            RandomizeMode::Wild => 1.0,
        }
    }
}

pub fn random_envelope<R: Rng>(intensity: f32, rng: &mut R) -> EnvelopeParams {
    EnvelopeParams {
        a: 0.003 + rng.random::<f32>() * 0.15 * intensity,
        d: 0.05 + rng.random::<f32>() * 0.35 * intensity,
        s: rng.random::<f32>() * 0.8,
        r: 0.05 + rng.random::<f32>() * 0.5 * intensity,
        level: 0.4 + rng.random::<f32>() * 0.7,
        mod_scale: 0.8 + rng.random::<f32>() * 1.5 * intensity,
    }
}

/// The whole loose parameter set. Integer-valued parameters land on whole
/// numbers.
pub fn random_params<R: Rng>(rng: &mut R) -> Params {
    Params {
        base_freq: 30.0 + rng.random::<f32>() * 80.0,
        filter_cut: (200.0 + rng.random::<f32>() * 10000.0).floor(),
        filter_res: 0.1 + rng.random::<f32>() * 0.9,
        comb_depth: rng.random::<f32>(),
        dist_drive: rng.random::<f32>() * 2.5,
        fold_amt: rng.random::<f32>() * 1.5,
        bit_depth: (4.0 + rng.random::<f32>() * 13.0).floor().min(16.0),
        downsample: (1.0 + rng.random::<f32>() * 15.0).floor(),
        unison_voices: (1.0 + rng.random::<f32>() * 6.0).floor(),
        unison_detune: (rng.random::<f32>() * 70.0).floor(),
        out_gain: 0.3 + rng.random::<f32>() * 0.8,
    }
}

pub fn random_chaos<R: Rng>(rng: &mut R) -> ChaosConfig {
    ChaosConfig {
        rate: 0.2 + rng.random::<f32>() * 12.0,
        amount: rng.random::<f32>(),
        target_filter: rng.random::<f32>() > 0.3,
        target_drive: rng.random::<f32>() > 0.3,
        target_mod: rng.random::<f32>() > 0.6,
    }
}

pub fn random_spikes<R: Rng>(rng: &mut R) -> SpikeConfig {
    SpikeConfig {
        enabled: rng.random::<f32>() > 0.4,
        probability: rng.random::<f32>() * 0.4,
        boost: 1.0 + rng.random::<f32>() * 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_params_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let params = random_params(&mut rng);
            assert_eq!(params, params.sanitized());
            assert_eq!(params.bit_depth, params.bit_depth.floor());
            assert!((30.0..110.0).contains(&params.base_freq));
        }
    }

    #[test]
    fn test_safe_ranges_are_narrower() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            let ratio = RandomizeMode::Safe.ratio(&mut rng);
            let depth = RandomizeMode::Safe.depth(&mut rng);
            assert!((1.0..=5.0).contains(&ratio));
            assert!((40.0..=240.0).contains(&depth));
            let env = random_envelope(RandomizeMode::Safe.envelope_intensity(), &mut rng);
            assert!(env.a <= 0.003 + 0.045 + 1e-6);
            assert_eq!(env, env.sanitized());
        }
    }
}
