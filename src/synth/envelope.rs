use super::automation::AutomatedParam;
use serde::{Deserialize, Serialize};

/// Shortest stage length. Zero-length ramps would click.
pub const MIN_STAGE_SECONDS: f32 = 0.001;

/// Below this level a retrigger starts from true silence.
const SILENCE_THRESHOLD: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopePhase {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// User-facing envelope settings, in the persisted preset layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeParams {
    pub a: f32,
    pub d: f32,
    pub s: f32,
    pub r: f32,
    pub level: f32,
    /// Consumed by the operator network when scaling modulation depth.
    #[serde(rename = "modScale")]
    pub mod_scale: f32,
}

impl EnvelopeParams {
    /// Clamp into the ranges the audio path expects.
    pub fn sanitized(self) -> Self {
        let time = |v: f32, fallback: f32| if v.is_finite() { v.max(0.0) } else { fallback };
        let unit = |v: f32, fallback: f32| {
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };
        let defaults = Self::default();
        Self {
            a: time(self.a, defaults.a),
            d: time(self.d, defaults.d),
            s: unit(self.s, defaults.s),
            r: time(self.r, defaults.r),
            level: time(self.level, defaults.level),
            mod_scale: time(self.mod_scale, defaults.mod_scale),
        }
    }
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            a: 0.01,
            d: 0.12,
            s: 0.6,
            r: 0.3,
            level: 1.0,
            mod_scale: 1.0,
        }
    }
}

/// Linear ADSR whose output is a scheduled gain curve.
///
/// Gate events never touch the current sample: they cancel whatever is still
/// queued and schedule new ramps anchored at the live value, so a retrigger
/// in the middle of a release continues from where the signal actually is.
#[derive(Debug, Clone)]
pub struct EnvelopeGenerator {
    params: EnvelopeParams,
    gain: AutomatedParam,
    gate: bool,
    velocity: f32,
    attack_end: f64,
    decay_end: f64,
    release_end: f64,
}

impl EnvelopeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: EnvelopeParams) -> Self {
        Self {
            params: params.sanitized(),
            ..Self::default()
        }
    }

    /// New settings take effect at the next gate event.
    pub fn set_params(&mut self, params: EnvelopeParams) {
        self.params = params.sanitized();
    }

    pub fn params(&self) -> EnvelopeParams {
        self.params
    }

    pub fn mod_scale(&self) -> f32 {
        self.params.mod_scale
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn peak(&self) -> f32 {
        self.params.level * self.velocity
    }

    pub fn gate_on(&mut self, velocity: f32, now: f64) {
        let velocity = if velocity.is_finite() {
            velocity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.velocity = velocity;
        self.gate = true;

        let peak = self.peak();
        let attack = self.params.a.max(MIN_STAGE_SECONDS) as f64;
        let decay = self.params.d.max(MIN_STAGE_SECONDS) as f64;

        self.gain.cancel();
        if self.gain.value() < SILENCE_THRESHOLD {
            self.gain.set_value_at(0.0, now);
        }
        self.gain.linear_ramp_to(peak, now, attack);
        self.gain
            .linear_ramp_to(peak * self.params.s, now + attack, decay);

        self.attack_end = now + attack;
        self.decay_end = self.attack_end + decay;
    }

    /// Gate-off while idle is a no-op.
    pub fn gate_off(&mut self, now: f64) {
        if !self.gate {
            return;
        }
        self.gate = false;
        let release = self.params.r.max(MIN_STAGE_SECONDS) as f64;
        self.gain.cancel();
        self.gain.linear_ramp_to(0.0, now, release);
        self.release_end = now + release;
    }

    /// Tracks the gate, not audible silence.
    pub fn is_active(&self) -> bool {
        self.gate
    }

    pub fn phase(&self, now: f64) -> EnvelopePhase {
        if self.gate {
            if now < self.attack_end {
                EnvelopePhase::Attack
            } else if now < self.decay_end {
                EnvelopePhase::Decay
            } else {
                EnvelopePhase::Sustain
            }
        } else if now < self.release_end {
            EnvelopePhase::Release
        } else {
            EnvelopePhase::Idle
        }
    }

    /// Live gain value.
    pub fn value(&self) -> f32 {
        self.gain.value()
    }

    #[inline]
    pub fn tick(&mut self, t: f64) -> f32 {
        self.gain.tick(t)
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self {
            params: EnvelopeParams::default(),
            gain: AutomatedParam::new(0.0),
            gate: false,
            velocity: 1.0,
            attack_end: 0.0,
            decay_end: 0.0,
            release_end: 0.0,
        }
    }
}
