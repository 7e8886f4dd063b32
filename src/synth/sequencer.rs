use crate::synth::prelude::finite_or;
use serde::{Deserialize, Serialize};

pub const STEP_COUNT: usize = 16;

pub const MIN_BPM: f32 = 20.0;
pub const MAX_BPM: f32 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerStep {
    pub enabled: bool,
    pub note: u8,
    pub velocity: f32,
    /// Fraction of the step the note is held for, 0..=1.
    pub gate: f32,
}

impl SequencerStep {
    pub fn new(note: u8, velocity: f32, gate: f32) -> Self {
        Self {
            enabled: true,
            note,
            velocity,
            gate,
        }
        .sanitized()
    }

    /// Note clamped to 0..=127, velocity and gate to 0..=1. Non-finite values
    /// fall back to the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            enabled: self.enabled,
            note: self.note.min(127),
            velocity: finite_or(self.velocity, defaults.velocity).clamp(0.0, 1.0),
            gate: finite_or(self.gate, defaults.gate).clamp(0.0, 1.0),
        }
    }
}

impl Default for SequencerStep {
    fn default() -> Self {
        Self {
            enabled: false,
            note: 60,
            velocity: 0.8,
            gate: 0.5,
        }
    }
}

/// Receiver of sequencer output. `time` is when the event was due, which can
/// be slightly earlier than the poll that emits it.
pub trait NoteSink {
    fn note_on(&mut self, note: u8, velocity: f32, time: f64);
    fn note_off(&mut self, note: u8, time: f64);
}

/// 16-step monophonic sequencer driven by polling with the engine clock.
///
/// At most one note-off is outstanding: gates never exceed one step, and a
/// note-off due at the same instant as the next step fires first.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    steps: [SequencerStep; STEP_COUNT],
    bpm: f32,
    running: bool,
    position: usize,
    next_tick: f64,
    pending_off: Option<(u8, f64)>,
    active_note: Option<u8>,
}

impl StepSequencer {
    pub fn new(bpm: f32) -> Self {
        Self {
            steps: [SequencerStep::default(); STEP_COUNT],
            bpm: clamp_bpm(bpm),
            running: false,
            position: 0,
            next_tick: 0.0,
            pending_off: None,
            active_note: None,
        }
    }

    pub fn steps(&self) -> &[SequencerStep; STEP_COUNT] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&SequencerStep> {
        self.steps.get(index)
    }

    /// Out-of-range indices are ignored.
    pub fn set_step(&mut self, index: usize, step: SequencerStep) {
        if let Some(slot) = self.steps.get_mut(index) {
            *slot = step.sanitized();
        }
    }

    pub fn set_steps(&mut self, steps: &[SequencerStep]) {
        for (index, step) in steps.iter().enumerate().take(STEP_COUNT) {
            self.set_step(index, *step);
        }
    }

    pub fn clear(&mut self) {
        self.steps = [SequencerStep::default(); STEP_COUNT];
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Picked up at the next step.
    pub fn set_bpm(&mut self, bpm: f32) {
        self.bpm = clamp_bpm(bpm);
    }

    /// One sixteenth note at the current tempo.
    pub fn step_duration(&self) -> f64 {
        60.0 / self.bpm as f64 / 4.0
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn active_note(&self) -> Option<u8> {
        self.active_note
    }

    /// Start from step 0 at `now`. No-op while running.
    pub fn start(&mut self, now: f64) {
        if self.running {
            return;
        }
        self.running = true;
        self.position = 0;
        self.next_tick = now;
        self.pending_off = None;
    }

    /// Cancel the pending note-off and force-release the active note.
    pub fn stop(&mut self, now: f64, sink: &mut impl NoteSink) {
        self.running = false;
        self.pending_off = None;
        if let Some(note) = self.active_note.take() {
            sink.note_off(note, now);
        }
    }

    /// Emit every event due at or before `now`, in time order.
    pub fn poll(&mut self, now: f64, sink: &mut impl NoteSink) {
        if !self.running {
            return;
        }
        let duration = self.step_duration();
        // After a stall, skip the missed steps instead of replaying them
        if now - self.next_tick > duration {
            self.next_tick = now;
        }

        loop {
            match self.pending_off {
                Some((note, due)) if due <= now && due <= self.next_tick => {
                    self.pending_off = None;
                    if self.active_note == Some(note) {
                        self.active_note = None;
                        sink.note_off(note, due);
                    }
                    continue;
                }
                _ => {}
            }
            if self.next_tick > now {
                break;
            }
            let tick = self.next_tick;
            self.fire_step(tick, sink);
            self.next_tick = tick + self.step_duration();
        }
    }

    fn fire_step(&mut self, time: f64, sink: &mut impl NoteSink) {
        let step = self.steps[self.position];
        if step.enabled {
            self.active_note = Some(step.note);
            sink.note_on(step.note, step.velocity, time);
            let gate = step.gate.clamp(0.0, 1.0) as f64;
            self.pending_off = Some((step.note, time + self.step_duration() * gate));
        }
        self.position = (self.position + 1) % STEP_COUNT;
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new(172.0)
    }
}

fn clamp_bpm(bpm: f32) -> f32 {
    if bpm.is_finite() {
        bpm.clamp(MIN_BPM, MAX_BPM)
    } else {
        172.0
    }
}

/// Depth boost per unit of macro 0 on an accented step.
pub const ACCENT_DEPTH_BOOST: f32 = 0.1;

/// Macro accent lane: a free-running 16-step grid, clocked from engine time
/// zero at the sequencer tempo. While the current step is set, modulation
/// depths are scaled by `1 + 0.1 * macro0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccentLane {
    pub enabled: bool,
    pub steps: [bool; STEP_COUNT],
}

impl AccentLane {
    pub fn toggle(&mut self, index: usize) {
        if let Some(step) = self.steps.get_mut(index) {
            *step = !*step;
        }
    }

    pub fn set_step(&mut self, index: usize, on: bool) {
        if let Some(step) = self.steps.get_mut(index) {
            *step = on;
        }
    }

    /// Lane position at `now` for a step of `step_duration` seconds.
    pub fn position(now: f64, step_duration: f64) -> usize {
        if !(step_duration > 0.0) || !(now >= 0.0) {
            return 0;
        }
        ((now / step_duration) as u64 % STEP_COUNT as u64) as usize
    }

    /// Depth multiplier at `now`; 1 when the lane is off or the step is empty.
    pub fn factor(&self, now: f64, step_duration: f64, macro0: f32) -> f32 {
        if self.enabled && self.steps[Self::position(now, step_duration)] {
            1.0 + ACCENT_DEPTH_BOOST * macro0.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

impl Default for AccentLane {
    fn default() -> Self {
        Self {
            enabled: true,
            steps: [false; STEP_COUNT],
        }
    }
}

/// A sixteenth-note bass figure around C2, used by the `--sequence` flag.
pub fn demo_pattern() -> [SequencerStep; STEP_COUNT] {
    let mut steps = [SequencerStep::default(); STEP_COUNT];
    let hits: [(usize, u8, f32, f32); 8] = [
        (0, 36, 1.0, 0.6),
        (3, 36, 0.7, 0.3),
        (6, 39, 0.8, 0.4),
        (8, 36, 1.0, 0.6),
        (10, 43, 0.6, 0.25),
        (11, 41, 0.7, 0.25),
        (12, 36, 0.9, 0.5),
        (14, 46, 0.75, 0.3),
    ];
    for (index, note, velocity, gate) in hits {
        steps[index] = SequencerStep::new(note, velocity, gate);
    }
    steps
}
