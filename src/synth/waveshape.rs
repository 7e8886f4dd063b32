/// Transfer function families for waveshaper curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Tanh,
    Fold,
    Diode,
    Hybrid,
}

impl CurveKind {
    /// Shaper A's family as chosen by macro 0.
    pub fn from_macro(value: f32) -> Self {
        if value < 0.33 {
            CurveKind::Tanh
        } else if value < 0.66 {
            CurveKind::Fold
        } else {
            CurveKind::Hybrid
        }
    }
}

const LCG_MODULUS: f64 = 2147483647.0;

/// Park-Miller style generator over a float seed, so any real-valued seed
/// (macro positions included) reproduces the same curve.
#[derive(Debug, Clone, Copy)]
pub struct CurveRng {
    seed: f64,
}

impl CurveRng {
    pub fn new(seed: f64) -> Self {
        Self { seed }
    }

    /// Next value in [-1, 1).
    pub fn next_signed(&mut self) -> f64 {
        self.seed = (self.seed * 16807.0 + 17.0) % LCG_MODULUS;
        (self.seed / LCG_MODULUS) * 2.0 - 1.0
    }
}

/// Reflect `z` back across ±1, at most `passes` times.
#[inline]
pub fn reflect(mut z: f64, passes: usize) -> f64 {
    for _ in 0..passes {
        if z > 1.0 {
            z = 2.0 - z;
        } else if z < -1.0 {
            z = -2.0 - z;
        }
    }
    z
}

fn transfer(kind: CurveKind, x: f64, drive: f64, fold: f64, rng: &mut CurveRng) -> f64 {
    match kind {
        CurveKind::Tanh => (x * drive * (1.0 + fold * 1.5)).tanh(),
        CurveKind::Fold => reflect(x * drive * (fold * 2.0 + 1.0), 6) * 0.8,
        CurveKind::Diode => {
            let bias = 0.2 + fold * 0.3;
            let k = drive * 2.5;
            let h = x + bias;
            let conduct = if h > 0.0 { 1.0 - (-h * k).exp() } else { 0.0 };
            let offset = if bias > 0.0 { 1.0 - (-bias * k).exp() } else { 0.0 };
            (conduct - offset) * 1.2
        }
        CurveKind::Hybrid => {
            let mut z = x * (drive + 0.0001);
            z = (z + 0.4 * (z * 3.0 + rng.next_signed() * 0.2 * fold).sin()).tanh();
            z += 0.15 * (x * 8.0 + fold * 3.0).sin() + 0.1 * (x * 23.0 * (0.5 + fold)).sin();
            (z * (1.0 + fold * 2.0)).tanh()
        }
    }
}

/// Fill `curve` with the transfer function sampled uniformly over x in [-1, 1],
/// then normalize to peak magnitude 1. Deterministic for a given `seed`.
pub fn fill_curve(curve: &mut [f32], kind: CurveKind, drive: f32, fold: f32, seed: f64) {
    let len = curve.len();
    if len == 0 {
        return;
    }
    let (drive, fold) = (drive as f64, fold as f64);
    let mut max = 0.0f64;

    // First pass finds the peak; the second writes normalized values. Both use
    // a fresh generator so the noise sequence is identical.
    for pass in 0..2 {
        let mut rng = CurveRng::new(seed);
        for (i, out) in curve.iter_mut().enumerate() {
            let x = if len > 1 {
                (i as f64 / (len - 1) as f64) * 2.0 - 1.0
            } else {
                0.0
            };
            let mut y = transfer(kind, x, drive, fold, &mut rng);
            y += rng.next_signed() * 0.02 * fold;
            if pass == 0 {
                max = max.max(y.abs());
            } else {
                *out = if max > 0.0 { (y / max) as f32 } else { y as f32 };
            }
        }
    }
}

/// Allocating convenience wrapper over [`fill_curve`].
pub fn generate_curve(length: usize, kind: CurveKind, drive: f32, fold: f32, seed: f64) -> Vec<f32> {
    let mut curve = vec![0.0; length];
    fill_curve(&mut curve, kind, drive, fold, seed);
    curve
}

/// Table-lookup waveshaper. The curve is rewritten in place, so reshaping from
/// the audio thread never allocates.
#[derive(Debug, Clone)]
pub struct Waveshaper {
    curve: Vec<f32>,
}

impl Waveshaper {
    pub fn new(length: usize) -> Self {
        let mut shaper = Self {
            curve: vec![0.0; length.max(2)],
        };
        shaper.reshape(CurveKind::Tanh, 1.0, 0.0, 0.0);
        shaper
    }

    pub fn reshape(&mut self, kind: CurveKind, drive: f32, fold: f32, seed: f64) {
        fill_curve(&mut self.curve, kind, drive, fold, seed);
    }

    pub fn curve(&self) -> &[f32] {
        &self.curve
    }

    /// Map `input` in [-1, 1] through the curve with linear interpolation;
    /// inputs outside the range clamp to the end points.
    #[inline]
    pub fn process(&self, input: f32) -> f32 {
        let last = self.curve.len() - 1;
        let position = (input + 1.0) * 0.5 * last as f32;
        if !(position > 0.0) {
            return self.curve[0];
        }
        if position >= last as f32 {
            return self.curve[last];
        }
        let index = position as usize;
        let frac = position - index as f32;
        let a = self.curve[index];
        let b = self.curve[index + 1];
        a + (b - a) * frac
    }
}
