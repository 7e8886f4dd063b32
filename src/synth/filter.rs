use crate::synth::prelude::{FRAC_1_SQRT_2, PI};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BiquadKind {
    /// Resonant low-pass; `q` is the resonance peak in dB.
    LowPass,
    /// Constant 0 dB peak band-pass; `q` is the linear quality factor.
    BandPass,
}

/// Second-order IIR section (RBJ Audio EQ Cookbook, Direct Form I).
///
/// Coefficients can be recomputed at any time without touching the history,
/// so sweeping the cutoff once per control quantum doesn't click.
#[derive(Clone, Debug)]
pub struct Biquad {
    kind: BiquadKind,
    cutoff: f32,
    q: f32,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    pub fn new(kind: BiquadKind, cutoff: f32, q: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            kind,
            cutoff,
            q,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        };
        filter.set_params(cutoff, q, sample_rate);
        filter
    }

    pub fn low_pass(cutoff: f32, sample_rate: f32) -> Self {
        Self::new(BiquadKind::LowPass, cutoff, 0.0, sample_rate)
    }

    pub fn band_pass(center: f32, q: f32, sample_rate: f32) -> Self {
        Self::new(BiquadKind::BandPass, center, q, sample_rate)
    }

    pub fn kind(&self) -> BiquadKind {
        self.kind
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn set_params(&mut self, cutoff: f32, q: f32, sample_rate: f32) {
        // Keep the cutoff below Nyquist and away from 0
        let sample_rate = sample_rate.max(1.0);
        let cutoff = if cutoff.is_finite() { cutoff } else { self.cutoff };
        let cutoff = cutoff.clamp(1.0, sample_rate * 0.49);
        let q = if q.is_finite() { q } else { self.q };
        self.cutoff = cutoff;
        self.q = q;

        let omega = 2.0 * PI * cutoff / sample_rate;
        let cos_omega = omega.cos();
        let sin_omega = omega.sin();

        let (b0, b1, b2, a0, a1, a2) = match self.kind {
            BiquadKind::LowPass => {
                // 0 dB resonance is a Butterworth response
                let q_linear = (FRAC_1_SQRT_2 * 10f32.powf(q / 20.0)).max(0.05);
                let alpha = sin_omega / (2.0 * q_linear);
                (
                    (1.0 - cos_omega) / 2.0,
                    1.0 - cos_omega,
                    (1.0 - cos_omega) / 2.0,
                    1.0 + alpha,
                    -2.0 * cos_omega,
                    1.0 - alpha,
                )
            }
            BiquadKind::BandPass => {
                let alpha = sin_omega / (2.0 * q.max(0.05));
                (
                    alpha,
                    0.0,
                    -alpha,
                    1.0 + alpha,
                    -2.0 * cos_omega,
                    1.0 - alpha,
                )
            }
        };

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    /// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Feedback comb. The output is the delay-line tap only; callers mix in the
/// dry signal themselves.
#[derive(Clone, Debug)]
pub struct Comb {
    feedback: f32,
    buffer: Vec<f32>,
    index: usize,
}

impl Comb {
    pub fn new(feedback: f32, delay_samples: usize) -> Self {
        Self {
            feedback: feedback.clamp(0.0, 0.99),
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
        }
    }

    pub fn delay_samples(&self) -> usize {
        self.buffer.len()
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        // Below unity, or the loop runs away
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.index];
        self.buffer[self.index] = input + self.feedback * delayed;
        self.index = (self.index + 1) % self.buffer.len();
        delayed
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }
}

/// One-shot feedback echo that runs for a fixed window after `trigger`, then
/// goes silent. The buffer is sized once for `max_delay` seconds.
#[derive(Clone, Debug)]
pub struct Stutter {
    buffer: Vec<f32>,
    delay: usize,
    index: usize,
    feedback: f32,
    until: f64,
}

impl Stutter {
    pub fn new(max_delay: f64, sample_rate: f32) -> Self {
        let len = (max_delay * sample_rate as f64).ceil().max(1.0) as usize + 1;
        Self {
            buffer: vec![0.0; len],
            delay: 1,
            index: 0,
            feedback: 0.0,
            until: f64::NEG_INFINITY,
        }
    }

    /// Start a burst at `now` lasting `duration` seconds. Any previous tail
    /// is dropped.
    pub fn trigger(
        &mut self,
        now: f64,
        delay_seconds: f64,
        feedback: f32,
        duration: f64,
        sample_rate: f32,
    ) {
        let max = self.buffer.len() - 1;
        self.delay = ((delay_seconds * sample_rate as f64).round() as usize).clamp(1, max.max(1));
        self.feedback = feedback.clamp(0.0, 0.99);
        self.buffer.fill(0.0);
        self.index = 0;
        self.until = now + duration.max(0.0);
    }

    pub fn is_active(&self, t: f64) -> bool {
        t < self.until
    }

    pub fn delay_samples(&self) -> usize {
        self.delay
    }

    /// Delay tap for `input` at time `t`; 0 outside the burst window.
    #[inline]
    pub fn process(&mut self, input: f32, t: f64) -> f32 {
        if t >= self.until {
            return 0.0;
        }
        let len = self.buffer.len();
        let read = (self.index + len - self.delay) % len;
        let delayed = self.buffer[read];
        self.buffer[self.index] = input + self.feedback * delayed;
        self.index = (self.index + 1) % len;
        delayed
    }

    pub fn cancel(&mut self) {
        self.until = f64::NEG_INFINITY;
        self.buffer.fill(0.0);
        self.index = 0;
    }
}
