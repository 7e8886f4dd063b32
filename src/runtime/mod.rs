#[cfg(feature = "wasm")]
pub mod wasm;
#[cfg(feature = "wasm")]
pub use wasm::WasmSynth;

#[cfg(feature = "native")]
pub mod native;
#[cfg(feature = "native")]
pub use native::{NativeSynth, RunOptions};
