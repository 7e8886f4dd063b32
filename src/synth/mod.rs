pub mod automation;
pub mod chaos;
pub mod command;
pub mod config;
pub mod context;
pub mod core;
pub mod distortion;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod mix;
pub mod network;
pub mod noise;
pub mod operator;
pub mod prelude;
pub mod preset;
pub mod randomize;
pub mod scale;
pub mod sequencer;
pub mod waveshape;

pub use self::core::Synth;
pub use self::error::SynthError;
