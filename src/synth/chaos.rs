//! Control-rate random modulation: a logistic-map chaos source and a spike
//! injector that kicks modulation edge depths.

use super::network::OperatorNetwork;
use crate::synth::prelude::finite_or;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Growth constant of the logistic map, inside its chaotic regime.
pub const LOGISTIC_K: f64 = 3.72;

/// Chaos settings in the persisted preset layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChaosConfig {
    pub rate: f32,
    pub amount: f32,
    pub target_filter: bool,
    pub target_drive: bool,
    pub target_mod: bool,
}

impl ChaosConfig {
    /// Non-finite fields fall back to their defaults; rate and amount are
    /// kept non-negative.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            rate: finite_or(self.rate, defaults.rate).max(0.0),
            amount: finite_or(self.amount, defaults.amount).max(0.0),
            ..self
        }
    }
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            rate: 3.5,
            amount: 0.3,
            target_filter: true,
            target_drive: true,
            target_mod: false,
        }
    }
}

/// Spike settings in the persisted preset layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    pub enabled: bool,
    pub probability: f32,
    pub boost: f32,
}

/// Largest accepted spike boost.
pub const MAX_SPIKE_BOOST: f32 = 8.0;

impl SpikeConfig {
    /// Non-finite fields fall back to their defaults, then probability is
    /// clamped to 0..=1 and boost to 0..=`MAX_SPIKE_BOOST`.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            enabled: self.enabled,
            probability: finite_or(self.probability, defaults.probability).clamp(0.0, 1.0),
            boost: finite_or(self.boost, defaults.boost).clamp(0.0, MAX_SPIKE_BOOST),
        }
    }
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probability: 0.18,
            boost: 1.6,
        }
    }
}

/// Bounded chaotic signal, re-evaluated at most `rate` times per second.
#[derive(Debug, Clone)]
pub struct ChaosSource {
    x: f64,
    rate: f32,
    amount: f32,
    last_update: f64,
    value: f32,
}

impl ChaosSource {
    /// `seed` is the initial map state; it is folded into (0, 1).
    pub fn new(rate: f32, amount: f32, seed: f64, now: f64) -> Self {
        let x = if seed.is_finite() && seed > 0.0 && seed < 1.0 {
            seed
        } else {
            0.5
        };
        Self {
            x,
            rate: rate.max(0.0),
            amount,
            last_update: now,
            value: 0.0,
        }
    }

    /// Seed drawn uniformly from [0.1, 0.9).
    pub fn with_rng<R: Rng>(rate: f32, amount: f32, rng: &mut R, now: f64) -> Self {
        let seed = rng.random::<f64>() * 0.8 + 0.1;
        Self::new(rate, amount, seed, now)
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn state(&self) -> f64 {
        self.x
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_rate(&mut self, rate: f32) {
        if rate.is_finite() {
            self.rate = rate.max(0.0);
        }
    }

    /// Takes effect at the next map step.
    pub fn set_amount(&mut self, amount: f32) {
        if amount.is_finite() {
            self.amount = amount;
        }
    }

    /// Step the map if at least `1/rate` seconds have passed since the last
    /// step, and return the current output. A rate of 0 freezes the source.
    pub fn poll(&mut self, now: f64) -> f32 {
        if self.rate <= 0.0 {
            return self.value;
        }
        let interval = 1.0 / self.rate as f64;
        if now - self.last_update >= interval {
            self.x = LOGISTIC_K * self.x * (1.0 - self.x);
            self.value = ((self.x - 0.5) * 2.0) as f32 * self.amount;
            self.last_update = now;
        }
        self.value
    }
}

/// Random depth transients on the modulation edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpikeInjector {
    pub config: SpikeConfig,
}

impl SpikeInjector {
    pub fn new(config: SpikeConfig) -> Self {
        Self { config }
    }

    /// Roll once; on a hit, spike one edge chosen uniformly. Returns the index
    /// of the spiked edge.
    pub fn poll<R: Rng>(
        &self,
        network: &mut OperatorNetwork,
        rng: &mut R,
        now: f64,
    ) -> Option<usize> {
        if !self.config.enabled {
            return None;
        }
        let probability = self.config.probability;
        // NaN fails this test too
        if !(probability > 0.0) {
            return None;
        }
        if !rng.random_bool(probability.min(1.0) as f64) {
            return None;
        }
        let edge_count = network.edges().len();
        if edge_count == 0 {
            return None;
        }
        let idx = rng.random_range(0..edge_count);
        network.spike(idx, self.config.boost, now);
        Some(idx)
    }
}
