use super::filter::Biquad;
use super::waveshape::reflect;
use crate::synth::prelude::CONTROL_QUANTUM;

/// Oversampling factor of the distortion stage.
pub const OVERSAMPLE_FACTOR: usize = 4;

/// Reflect across ±1 (five passes) and attenuate by the fold amount.
#[inline]
pub fn fold_sample(z: f32, fold: f32) -> f32 {
    reflect(z as f64, 5) as f32 * (1.0 - 0.2 * fold)
}

/// The per-point transfer of the oversampled stage, applied after drive.
#[inline]
pub fn shape(z: f32, fold: f32) -> f32 {
    (z * 0.8).tanh() + 0.2 * fold_sample(z, fold)
}

/// 4x oversampled drive + fold stage.
///
/// Upsampling is sample replication and downsampling is a box average, so the
/// stage is cheap rather than alias-free. `drive` and `fold` are held for the
/// whole block.
#[derive(Clone, Debug)]
pub struct OversampledDistortion {
    buffer: [f32; CONTROL_QUANTUM * OVERSAMPLE_FACTOR],
}

impl OversampledDistortion {
    pub fn new() -> Self {
        Self {
            buffer: [0.0; CONTROL_QUANTUM * OVERSAMPLE_FACTOR],
        }
    }

    /// Process `block` in place. Blocks longer than one control quantum are
    /// handled in quantum-sized chunks.
    pub fn process(&mut self, block: &mut [f32], drive: f32, fold: f32) {
        for chunk in block.chunks_mut(CONTROL_QUANTUM) {
            for (i, &sample) in chunk.iter().enumerate() {
                for k in 0..OVERSAMPLE_FACTOR {
                    self.buffer[i * OVERSAMPLE_FACTOR + k] = shape(sample * drive, fold);
                }
            }
            for (i, out) in chunk.iter_mut().enumerate() {
                let start = i * OVERSAMPLE_FACTOR;
                let acc: f32 = self.buffer[start..start + OVERSAMPLE_FACTOR].iter().sum();
                *out = acc / OVERSAMPLE_FACTOR as f32;
            }
        }
    }
}

impl Default for OversampledDistortion {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit-depth quantizer followed by a fixed low-pass that stands in for sample
/// rate reduction.
#[derive(Clone, Debug)]
pub struct Bitcrusher {
    bit_depth: f32,
    downsample: f32,
    levels: f32,
    smoothing: Biquad,
}

impl Bitcrusher {
    pub fn new(bit_depth: f32, downsample: f32, sample_rate: f32) -> Self {
        let mut crusher = Self {
            bit_depth,
            downsample,
            levels: 2.0,
            smoothing: Biquad::low_pass(20000.0, sample_rate),
        };
        crusher.configure(bit_depth, downsample, sample_rate);
        crusher
    }

    pub fn configure(&mut self, bit_depth: f32, downsample: f32, sample_rate: f32) {
        self.bit_depth = bit_depth.clamp(1.0, 24.0);
        self.downsample = downsample.max(1.0);
        self.levels = 2f32.powf(self.bit_depth);
        let cutoff = (20000.0 / self.downsample).max(1000.0);
        self.smoothing.set_params(cutoff, 0.0, sample_rate);
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.configure(self.bit_depth, self.downsample, sample_rate);
        self.smoothing.reset();
    }

    pub fn levels(&self) -> f32 {
        self.levels
    }

    #[inline]
    pub fn quantize(&self, input: f32) -> f32 {
        let x = input.clamp(-1.0, 1.0);
        let steps = self.levels - 1.0;
        let q = ((x * 0.5 + 0.5) * steps).round() / steps;
        q * 2.0 - 1.0
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let crushed = self.quantize(input);
        self.smoothing.process(crushed)
    }
}
