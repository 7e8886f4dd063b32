use super::automation::AutomatedParam;
use super::context::ProcessContext;
use super::operator::Operator;
use crate::synth::prelude::MAX_OPERATORS;
use tracing::debug;

/// Depth retarget smoothing (seconds).
pub const DEPTH_TIME_CONSTANT: f64 = 0.02;
/// Rise and fall of a spike transient (seconds).
pub const SPIKE_RISE_SECONDS: f64 = 0.02;
pub const SPIKE_FALL_SECONDS: f64 = 0.16;

/// One-directional FM connection. Operators are referenced by index, never by
/// handle, so removing an edge can't leave anything dangling.
#[derive(Clone, Debug)]
pub struct ModulationEdge {
    source: usize,
    dest: usize,
    /// User-set depth in Hz; what presets persist.
    nominal_depth: f32,
    /// Live depth: smoothed retargets and spike transients land here.
    depth: AutomatedParam,
    /// Multiplier written by control-rate modulators (chaos, envelope scaling).
    scale: AutomatedParam,
}

impl ModulationEdge {
    fn new(source: usize, dest: usize, depth: f32) -> Self {
        Self {
            source,
            dest,
            nominal_depth: depth,
            depth: AutomatedParam::new(depth),
            scale: AutomatedParam::new(1.0),
        }
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn dest(&self) -> usize {
        self.dest
    }

    pub fn nominal_depth(&self) -> f32 {
        self.nominal_depth
    }

    /// Depth the edge is heading towards (ignores the modulation scale).
    pub fn target_depth(&self) -> f32 {
        self.depth.target()
    }

    /// Instantaneous depth at the last rendered sample.
    pub fn live_depth(&self) -> f32 {
        self.depth.value()
    }

    pub fn scale(&self) -> f32 {
        self.scale.target()
    }
}

/// The FM graph: a fixed arena of operators plus a dynamic edge list.
///
/// Every edge adds `source_output * depth` (Hz) to the destination's
/// instantaneous frequency. Sources are read one sample behind, which makes
/// any topology, including cycles, well defined.
pub struct OperatorNetwork {
    operators: Vec<Operator>,
    edges: Vec<ModulationEdge>,
    base_frequency: f32,
}

impl OperatorNetwork {
    pub fn new(operator_count: usize, base_frequency: f32) -> Self {
        let count = operator_count.clamp(1, MAX_OPERATORS);
        let operators = (0..count)
            .map(|id| Operator::new(id, base_frequency))
            .collect();
        Self {
            operators,
            edges: Vec::with_capacity(count * (count - 1)),
            base_frequency,
        }
    }

    /// Default patch: a three-operator stack into operator 0, which is the only
    /// operator sent to the mix.
    pub fn with_default_patch(operator_count: usize, base_frequency: f32) -> Self {
        let mut network = Self::new(operator_count, base_frequency);
        for (op, ratio) in [1.0, 1.5, 2.01, 0.5].into_iter().enumerate() {
            network.set_ratio(op, ratio, 0.0);
        }
        for (source, dest, depth) in [(2, 1, 110.0), (3, 2, 140.0), (1, 0, 180.0)] {
            network.connect(source, dest, depth);
        }
        if let Some(carrier) = network.operators.first_mut() {
            carrier.init_output_level(1.0);
        }
        network
    }

    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn operator(&self, op: usize) -> Option<&Operator> {
        self.operators.get(op)
    }

    pub fn operator_mut(&mut self, op: usize) -> Option<&mut Operator> {
        self.operators.get_mut(op)
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    pub fn edges(&self) -> &[ModulationEdge] {
        &self.edges
    }

    pub fn edge(&self, source: usize, dest: usize) -> Option<&ModulationEdge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.dest == dest)
    }

    fn edge_index(&self, source: usize, dest: usize) -> Option<usize> {
        self.edges
            .iter()
            .position(|e| e.source == source && e.dest == dest)
    }

    fn valid(&self, op: usize) -> bool {
        op < self.operators.len()
    }

    /// Self-loops, duplicates and unknown operators are ignored.
    pub fn connect(&mut self, source: usize, dest: usize, depth: f32) {
        if source == dest || !self.valid(source) || !self.valid(dest) {
            return;
        }
        if self.edge_index(source, dest).is_some() {
            return;
        }
        let depth = if depth.is_finite() { depth.max(0.0) } else { 0.0 };
        self.edges.push(ModulationEdge::new(source, dest, depth));
    }

    pub fn remove_connection(&mut self, source: usize, dest: usize) {
        if let Some(idx) = self.edge_index(source, dest) {
            self.edges.remove(idx);
        }
    }

    pub fn set_mod_depth(&mut self, source: usize, dest: usize, depth: f32, now: f64) {
        if let Some(idx) = self.edge_index(source, dest) {
            self.set_edge_depth(idx, depth, now, DEPTH_TIME_CONSTANT);
        }
    }

    /// Retarget the depth of edge `idx` with its own glide time.
    pub fn set_edge_depth(&mut self, idx: usize, depth: f32, now: f64, time_constant: f64) {
        if let Some(edge) = self.edges.get_mut(idx) {
            let depth = depth.max(0.0);
            edge.nominal_depth = depth;
            edge.depth.set_target(depth, now, time_constant);
        }
    }

    pub fn set_ratio(&mut self, op: usize, ratio: f32, now: f64) {
        if let Some(operator) = self.operators.get_mut(op) {
            operator.set_ratio(ratio, now);
        }
    }

    /// Global retune: every operator glides to `freq * ratio`.
    pub fn set_base_frequency(&mut self, freq: f32, now: f64) {
        self.base_frequency = freq.max(0.0);
        for operator in self.operators.iter_mut() {
            operator.set_base_frequency(self.base_frequency, now);
        }
    }

    pub fn set_output_level(&mut self, op: usize, level: f32, now: f64) {
        if let Some(operator) = self.operators.get_mut(op) {
            operator.set_output_level(level, now);
        }
    }

    /// Retarget the control-rate multiplier of edge `idx`.
    pub fn set_edge_scale(&mut self, idx: usize, scale: f32, now: f64, time_constant: f64) {
        if let Some(edge) = self.edges.get_mut(idx) {
            edge.scale.set_target(scale.max(0.0), now, time_constant);
        }
    }

    /// Asymmetric transient on edge `idx`: hold the live depth, rise to
    /// `depth * boost`, fall back to the held depth.
    pub fn spike(&mut self, idx: usize, boost: f32, now: f64) {
        if let Some(edge) = self.edges.get_mut(idx) {
            let base = edge.depth.value();
            edge.depth.cancel();
            edge.depth.set_value_at(base, now);
            edge.depth
                .linear_ramp_to(base * boost.max(0.0), now, SPIKE_RISE_SECONDS);
            edge.depth
                .linear_ramp_to(base, now + SPIKE_RISE_SECONDS, SPIKE_FALL_SECONDS);
        }
    }

    pub fn gate_on(&mut self, velocity: f32, now: f64) {
        for operator in self.operators.iter_mut() {
            operator.envelope.gate_on(velocity, now);
        }
    }

    pub fn gate_off(&mut self, now: f64) {
        for operator in self.operators.iter_mut() {
            operator.envelope.gate_off(now);
        }
    }

    pub fn is_active(&self) -> bool {
        self.operators.iter().any(|op| op.envelope.is_active())
    }

    /// Render the operator mix into `output` (overwrites).
    pub fn process(&mut self, output: &mut [f32], ctx: &ProcessContext) {
        let count = self.operators.len();
        let mut fm = [0.0f32; MAX_OPERATORS];
        let mut previous = [0.0f32; MAX_OPERATORS];

        for (i, sample) in output.iter_mut().enumerate() {
            let t = ctx.time_at(i);

            for (slot, operator) in previous.iter_mut().zip(self.operators.iter()) {
                *slot = operator.output();
            }
            fm[..count].fill(0.0);
            for edge in self.edges.iter_mut() {
                let depth = edge.depth.tick(t) * edge.scale.tick(t);
                fm[edge.dest] += previous[edge.source] * depth;
            }

            let mut mix = 0.0;
            for (op, operator) in self.operators.iter_mut().enumerate() {
                let (_, contribution) = operator.process(t, ctx.sample_rate, fm[op]);
                mix += contribution;
            }
            *sample = mix;
        }
    }

    /// Log the current routing, one line per edge.
    pub fn print_structure(&self) {
        debug!("Operator network ({} operators):", self.operators.len());
        for operator in &self.operators {
            debug!(
                "  Operator {} | ratio {} | level {}",
                operator.id(),
                operator.ratio(),
                operator.output_level()
            );
        }
        for edge in &self.edges {
            debug!(
                "  Operator {} -> Operator {} | depth {}",
                edge.source, edge.dest, edge.nominal_depth
            );
        }
    }
}
