use rand::Rng;

/// Length of a note-on transient (seconds).
pub const BURST_SECONDS: f64 = 0.2;
/// Exponential decay rate of the transient envelope (1/s).
pub const BURST_DECAY: f64 = 50.0;

/// Short decaying white-noise click layered on each note-on.
#[derive(Debug, Clone, Default)]
pub struct NoiseBurst {
    start: f64,
    gain: f32,
    active: bool,
}

impl NoiseBurst {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the burst at `now`. A new trigger replaces the old one.
    pub fn trigger(&mut self, now: f64, gain: f32) {
        self.start = now;
        self.gain = gain.max(0.0);
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn next<R: Rng>(&mut self, t: f64, rng: &mut R) -> f32 {
        if !self.active || t < self.start {
            return 0.0;
        }
        let elapsed = t - self.start;
        if elapsed >= BURST_SECONDS {
            self.active = false;
            return 0.0;
        }
        let noise = rng.random::<f32>() * 2.0 - 1.0;
        noise * (-elapsed * BURST_DECAY).exp() as f32 * self.gain
    }
}
