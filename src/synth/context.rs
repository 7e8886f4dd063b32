/// Timing information passed down the processing chain for one control quantum.
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    pub sample_rate: f32,
    /// Engine time (seconds) of the first frame in the quantum.
    pub now: f64,
}

impl ProcessContext {
    pub fn new(sample_rate: f32, now: f64) -> Self {
        Self { sample_rate, now }
    }

    /// Time of frame `index` within the quantum.
    #[inline]
    pub fn time_at(&self, index: usize) -> f64 {
        self.now + index as f64 / self.sample_rate as f64
    }
}
