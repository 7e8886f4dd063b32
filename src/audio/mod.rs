mod cpal_backend;
pub use self::cpal_backend::CpalBackend;

use crate::synth::SynthError;

/// An audio output the engine can be driven by. `start` fails if no stream
/// can be opened; the instrument must not be considered running then.
pub trait AudioBackend {
    fn start(&mut self) -> Result<(), SynthError>;
    fn stop(&mut self) -> Result<(), SynthError>;
}
