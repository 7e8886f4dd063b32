pub mod input;
pub mod synth;

#[cfg(feature = "native")]
pub mod audio;

pub mod runtime;
