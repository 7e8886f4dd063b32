// Shared constants and small helpers used across the engine

pub use core::f32::consts::{FRAC_1_SQRT_2, PI, TAU};

/// Frames rendered between two control ticks. Matches the 128-frame render
/// quantum most audio hosts use, so k-rate parameters change at most once per
/// quantum.
pub const CONTROL_QUANTUM: usize = 128;

/// Upper bound on operators in one network. Scratch buffers are sized from it
/// so the audio path never allocates.
pub const MAX_OPERATORS: usize = 8;

/// Number of macro knobs exposed to UI/MIDI collaborators.
pub const MACRO_COUNT: usize = 4;

/// Reject NaN/inf at the control boundary.
#[inline]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
