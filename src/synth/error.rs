use std::fmt;

/// Failures surfaced to callers. The render path itself never fails; these
/// come from device startup, file loading and deserialization.
#[derive(Debug)]
pub enum SynthError {
    NoOutputDevice,
    UnsupportedSampleFormat(String),
    Stream(String),
    Midi(String),
    Preset(serde_json::Error),
    Config(String),
    Io(std::io::Error),
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthError::NoOutputDevice => write!(f, "No output device available"),
            SynthError::UnsupportedSampleFormat(format) => {
                write!(f, "Unsupported sample format: {format}")
            }
            SynthError::Stream(e) => write!(f, "Audio stream error: {e}"),
            SynthError::Midi(e) => write!(f, "MIDI error: {e}"),
            SynthError::Preset(e) => write!(f, "Preset error: {e}"),
            SynthError::Config(e) => write!(f, "Config error: {e}"),
            SynthError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for SynthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SynthError::Preset(e) => Some(e),
            SynthError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SynthError {
    fn from(e: serde_json::Error) -> Self {
        SynthError::Preset(e)
    }
}

impl From<std::io::Error> for SynthError {
    fn from(e: std::io::Error) -> Self {
        SynthError::Io(e)
    }
}

impl From<toml::de::Error> for SynthError {
    fn from(e: toml::de::Error) -> Self {
        SynthError::Config(e.to_string())
    }
}
