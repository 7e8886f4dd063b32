pub mod router;
pub use self::router::MidiRouter;

#[cfg(feature = "native")]
mod keyboard;
#[cfg(feature = "native")]
mod midi;
#[cfg(feature = "native")]
pub use self::keyboard::KeyboardHandler;
#[cfg(feature = "native")]
pub use self::midi::MidiHandler;
