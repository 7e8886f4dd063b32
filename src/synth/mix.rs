use super::automation::AutomatedParam;
use super::context::ProcessContext;
use super::distortion::{Bitcrusher, OversampledDistortion};
use super::filter::{Biquad, Comb, Stutter};
use super::noise::NoiseBurst;
use super::preset::Params;
use super::waveshape::{CurveKind, Waveshaper};
use crate::synth::prelude::MACRO_COUNT;
use rand::Rng;

/// Gain applied to the summed operator output before the master chain.
pub const NETWORK_OUTPUT_GAIN: f32 = 0.4;
/// Level of the combined shaper stage.
pub const SHAPER_MIX: f32 = 0.7;
/// Dry level into the output, next to the comb tap.
pub const COMB_DRY: f32 = 0.5;
pub const COMB_DELAY_SAMPLES: usize = 128;
/// Comb feedback per unit of comb depth.
pub const COMB_FEEDBACK_SCALE: f32 = 0.8;

pub const CUTOFF_TIME_CONSTANT: f64 = 0.02;
pub const RESONANCE_TIME_CONSTANT: f64 = 0.05;
pub const BANDPASS_TIME_CONSTANT: f64 = 0.05;
pub const COMB_TIME_CONSTANT: f64 = 0.1;
pub const OUT_GAIN_TIME_CONSTANT: f64 = 0.1;

/// Longest stutter echo the buffer holds (seconds).
pub const STUTTER_MAX_DELAY: f64 = 0.2;
pub const STUTTER_FEEDBACK: f32 = 0.55;
/// Level of the stutter tap next to the main output.
pub const STUTTER_MIX: f32 = 0.6;
/// How long a stutter burst stays connected (seconds).
pub const STUTTER_SECONDS: f64 = 0.22;

/// Band-pass centre for macro 0.
pub fn bandpass_frequency(macro0: f32) -> f32 {
    400.0 + macro0 * 2200.0
}

/// Band-pass Q for macro 1.
pub fn bandpass_q(macro1: f32) -> f32 {
    0.5 + macro1 * 6.0
}

/// Everything after the operator network: drive, shapers, bitcrusher, filters,
/// comb, output gain and the limiter.
///
/// Filter coefficients follow their automated parameters once per control
/// quantum. Gains are automated per sample.
pub struct MasterChain {
    sample_rate: f32,
    drive_gain: AutomatedParam,
    oversample: bool,
    distortion: OversampledDistortion,
    dist_drive: f32,
    dist_fold: f32,
    shaper_a: Waveshaper,
    shaper_b: Waveshaper,
    bitcrusher: Bitcrusher,
    low_pass: Biquad,
    cutoff: AutomatedParam,
    resonance: AutomatedParam,
    band_pass: Biquad,
    band_freq: AutomatedParam,
    band_q: AutomatedParam,
    comb: Comb,
    comb_feedback: AutomatedParam,
    out_gain: AutomatedParam,
    master_volume: f32,
    noise: NoiseBurst,
    stutter: Stutter,
}

impl MasterChain {
    pub fn new(
        sample_rate: f32,
        curve_length: usize,
        params: &Params,
        macros: &[f32; MACRO_COUNT],
    ) -> Self {
        let feedback = params.comb_depth * COMB_FEEDBACK_SCALE;
        let band_freq = bandpass_frequency(macros[0]);
        let band_q = bandpass_q(macros[1]);
        let mut chain = Self {
            sample_rate,
            drive_gain: AutomatedParam::new(1.0),
            oversample: false,
            distortion: OversampledDistortion::new(),
            dist_drive: params.dist_drive,
            dist_fold: params.fold_amt,
            shaper_a: Waveshaper::new(curve_length),
            shaper_b: Waveshaper::new(curve_length),
            bitcrusher: Bitcrusher::new(params.bit_depth, params.downsample, sample_rate),
            low_pass: Biquad::low_pass(params.filter_cut, sample_rate),
            cutoff: AutomatedParam::new(params.filter_cut),
            resonance: AutomatedParam::new(params.filter_res),
            band_pass: Biquad::band_pass(band_freq, band_q, sample_rate),
            band_freq: AutomatedParam::new(band_freq),
            band_q: AutomatedParam::new(band_q),
            comb: Comb::new(feedback, COMB_DELAY_SAMPLES),
            comb_feedback: AutomatedParam::new(feedback),
            out_gain: AutomatedParam::new(params.out_gain),
            master_volume: 1.0,
            noise: NoiseBurst::new(),
            stutter: Stutter::new(STUTTER_MAX_DELAY, sample_rate),
        };
        chain.update_shapers(macros);
        chain.update_filters(0.0);
        chain
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.bitcrusher.set_sample_rate(self.sample_rate);
        self.stutter = Stutter::new(STUTTER_MAX_DELAY, self.sample_rate);
        self.update_filters(0.0);
        self.reset();
    }

    /// Rewrite both shaper curves in place from macros 0 and 1.
    pub fn update_shapers(&mut self, macros: &[f32; MACRO_COUNT]) {
        let (m0, m1) = (macros[0], macros[1]);
        self.shaper_a.reshape(
            CurveKind::from_macro(m0),
            1.0 + m1 * 2.2,
            0.3 + m0 * 0.8,
            0.123 * m0 as f64,
        );
        self.shaper_b.reshape(
            CurveKind::Diode,
            1.2 + m1 * 2.5,
            0.2 + m0 * 0.5,
            0.987 * m1 as f64,
        );
    }

    pub fn shaper_curves(&self) -> (&[f32], &[f32]) {
        (self.shaper_a.curve(), self.shaper_b.curve())
    }

    pub fn set_oversample(&mut self, enabled: bool) {
        self.oversample = enabled;
    }

    pub fn oversample(&self) -> bool {
        self.oversample
    }

    /// Drive and fold of the oversampled stage; held per block.
    pub fn set_distortion(&mut self, drive: f32, fold: f32) {
        self.dist_drive = drive.max(0.0);
        self.dist_fold = fold.max(0.0);
    }

    pub fn distortion_drive(&self) -> f32 {
        self.dist_drive
    }

    pub fn set_drive_gain(&mut self, gain: f32, now: f64, time_constant: f64) {
        self.drive_gain.set_target(gain, now, time_constant);
    }

    pub fn drive_gain(&self) -> f32 {
        self.drive_gain.target()
    }

    pub fn set_cutoff(&mut self, cutoff: f32, now: f64, time_constant: f64) {
        self.cutoff.set_target(cutoff.max(1.0), now, time_constant);
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff.target()
    }

    pub fn set_resonance(&mut self, q: f32, now: f64) {
        self.resonance.set_target(q, now, RESONANCE_TIME_CONSTANT);
    }

    /// Band-pass follows macros 0 and 1.
    pub fn set_band_pass(&mut self, macros: &[f32; MACRO_COUNT], now: f64) {
        self.band_freq
            .set_target(bandpass_frequency(macros[0]), now, BANDPASS_TIME_CONSTANT);
        self.band_q
            .set_target(bandpass_q(macros[1]), now, BANDPASS_TIME_CONSTANT);
    }

    pub fn set_comb_depth(&mut self, depth: f32, now: f64) {
        self.comb_feedback
            .set_target(depth.max(0.0) * COMB_FEEDBACK_SCALE, now, COMB_TIME_CONSTANT);
    }

    pub fn set_out_gain(&mut self, gain: f32, now: f64) {
        self.out_gain
            .set_target(gain.max(0.0), now, OUT_GAIN_TIME_CONSTANT);
    }

    pub fn out_gain(&self) -> f32 {
        self.out_gain.target()
    }

    pub fn set_bitcrush(&mut self, bit_depth: f32, downsample: f32) {
        self.bitcrusher
            .configure(bit_depth, downsample, self.sample_rate);
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    /// Layer a noise click into the drive stage.
    pub fn trigger_noise(&mut self, now: f64, gain: f32) {
        self.noise.trigger(now, gain);
    }

    /// Echo the output through a short feedback delay for `STUTTER_SECONDS`.
    pub fn trigger_stutter(&mut self, now: f64, delay_seconds: f64) {
        self.stutter.trigger(
            now,
            delay_seconds,
            STUTTER_FEEDBACK,
            STUTTER_SECONDS,
            self.sample_rate,
        );
    }

    pub fn stutter(&self) -> &Stutter {
        &self.stutter
    }

    fn update_filters(&mut self, now: f64) {
        let cutoff = self.cutoff.tick(now);
        let resonance = self.resonance.tick(now);
        self.low_pass.set_params(cutoff, resonance, self.sample_rate);
        let freq = self.band_freq.tick(now);
        let q = self.band_q.tick(now);
        self.band_pass.set_params(freq, q, self.sample_rate);
    }

    /// Process one quantum of raw network output in place.
    pub fn process<R: Rng>(&mut self, block: &mut [f32], ctx: &ProcessContext, rng: &mut R) {
        self.update_filters(ctx.now);

        for (i, sample) in block.iter_mut().enumerate() {
            let t = ctx.time_at(i);
            let input = *sample * NETWORK_OUTPUT_GAIN + self.noise.next(t, rng);
            *sample = input * self.drive_gain.tick(t);
        }

        if self.oversample {
            self.distortion
                .process(block, self.dist_drive, self.dist_fold);
        }

        for (i, sample) in block.iter_mut().enumerate() {
            let t = ctx.time_at(i);
            let shaped = self.shaper_b.process(self.shaper_a.process(*sample)) * SHAPER_MIX;
            let crushed = self.bitcrusher.process(shaped);
            let filtered = self.band_pass.process(self.low_pass.process(crushed));

            self.comb.set_feedback(self.comb_feedback.tick(t));
            let wet = self.comb.process(filtered);
            let mixed = filtered * COMB_DRY + wet;

            let out = mixed * self.out_gain.tick(t) * self.master_volume;
            *sample = out + self.stutter.process(out, t) * STUTTER_MIX;
        }

        apply_limiter(block);
    }

    pub fn reset(&mut self) {
        self.low_pass.reset();
        self.band_pass.reset();
        self.comb.reset();
        self.stutter.cancel();
    }
}

/// Soft knee above 0.9.
pub fn apply_limiter(output: &mut [f32]) {
    for sample in output.iter_mut() {
        let abs_sample = sample.abs();
        if abs_sample > 0.9 {
            *sample *= (1.9 - abs_sample).max(0.0);
        }
    }
}
