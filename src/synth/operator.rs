use super::automation::AutomatedParam;
use super::envelope::EnvelopeGenerator;
use crate::synth::prelude::TAU;

/// Frequency retune smoothing (seconds).
pub const FREQUENCY_TIME_CONSTANT: f64 = 0.02;
/// Output level smoothing (seconds).
pub const LEVEL_TIME_CONSTANT: f64 = 0.05;

/// One sine oscillator with its envelope and mix send.
#[derive(Clone, Debug)]
pub struct Operator {
    id: usize,
    ratio: f32,          // Ratio relative to the network base frequency
    base_frequency: f32, // Hz
    frequency: AutomatedParam,
    output_level: AutomatedParam,
    pub envelope: EnvelopeGenerator, // Exclusively owned, one per operator
    phase: f64,                      // Normalised oscillator phase in [0, 1)
    output: f32,                     // Last raw oscillator sample
}

impl Operator {
    pub fn new(id: usize, base_frequency: f32) -> Self {
        Self {
            id,
            ratio: 1.0,
            base_frequency,
            frequency: AutomatedParam::new(base_frequency),
            output_level: AutomatedParam::new(0.0),
            envelope: EnvelopeGenerator::new(),
            phase: 0.0,
            output: 0.0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    /// Frequency the oscillator is gliding towards, `base * ratio`.
    pub fn target_frequency(&self) -> f32 {
        self.frequency.target()
    }

    /// Smoothed carrier frequency at the last rendered sample.
    pub fn frequency(&self) -> f32 {
        self.frequency.value()
    }

    pub fn output_level(&self) -> f32 {
        self.output_level.target()
    }

    /// Smoothed mix send at the last rendered sample.
    pub fn live_output_level(&self) -> f32 {
        self.output_level.value()
    }

    /// Normalised phase in [0, 1) the next sample will be read at.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Last raw oscillator sample, the signal fed into modulation edges.
    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn set_ratio(&mut self, ratio: f32, now: f64) {
        self.ratio = ratio.max(0.0);
        self.retune(now);
    }

    pub fn set_base_frequency(&mut self, frequency: f32, now: f64) {
        self.base_frequency = frequency.max(0.0);
        self.retune(now);
    }

    pub fn set_output_level(&mut self, level: f32, now: f64) {
        self.output_level
            .set_target(level.max(0.0), now, LEVEL_TIME_CONSTANT);
    }

    /// Jump the mix send without smoothing; used when building the network.
    pub fn init_output_level(&mut self, level: f32) {
        self.output_level.set_immediate(level.max(0.0));
    }

    fn retune(&mut self, now: f64) {
        self.frequency.set_target(
            self.base_frequency * self.ratio,
            now,
            FREQUENCY_TIME_CONSTANT,
        );
    }

    /// Render one sample. `fm_hz` is the summed frequency deviation from the
    /// incoming modulation edges. Returns `(raw oscillator, mix contribution)`.
    #[inline]
    pub fn process(&mut self, t: f64, sample_rate: f32, fm_hz: f32) -> (f32, f32) {
        let carrier = self.frequency.tick(t);
        let instantaneous = (carrier + fm_hz) as f64;

        let wave = (self.phase as f32 * TAU).sin();
        self.phase = (self.phase + instantaneous / sample_rate as f64).rem_euclid(1.0);
        self.output = wave;

        let env = self.envelope.tick(t);
        let level = self.output_level.tick(t);
        (wave, wave * env * level)
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
        self.output = 0.0;
    }
}
