use crate::audio::AudioBackend;
use crate::runtime::NativeSynth;
use crate::synth::prelude::CONTROL_QUANTUM;
use crate::synth::SynthError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use tracing::{error, info};

/// Output through the default cpal device.
///
/// The engine is moved into the stream callback on `start`; from then on the
/// only way to reach it is its command channel, so the callback never locks.
pub struct CpalBackend {
    stream: Option<Stream>,
    synth: Option<NativeSynth>,
}

impl CpalBackend {
    pub fn new(synth: NativeSynth) -> Self {
        Self {
            stream: None,
            synth: Some(synth),
        }
    }

    fn select_output_device(host: &cpal::Host) -> Result<cpal::Device, SynthError> {
        host.default_output_device()
            .ok_or(SynthError::NoOutputDevice)
    }

    fn build_stream(&mut self) -> Result<Stream, SynthError> {
        let host = cpal::default_host();
        let device = Self::select_output_device(&host)?;
        info!(
            "Selected device: {}",
            device.name().unwrap_or_default()
        );

        let supported_config = device
            .default_output_config()
            .map_err(|e| SynthError::Stream(e.to_string()))?;
        let sample_format = supported_config.sample_format();
        if sample_format != SampleFormat::F32 {
            return Err(SynthError::UnsupportedSampleFormat(format!(
                "{:?}",
                sample_format
            )));
        }
        let stream_config: cpal::StreamConfig = supported_config.into();
        let sample_rate = stream_config.sample_rate.0 as f32;
        let channels = stream_config.channels as usize;

        let mut synth = self
            .synth
            .take()
            .ok_or_else(|| SynthError::Stream("Stream already started".into()))?;
        synth.set_sample_rate(sample_rate);
        info!("Output: {} Hz, {} channels", sample_rate, channels);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut buffer = [0.0f32; CONTROL_QUANTUM];
                    for block in data.chunks_mut(channels * CONTROL_QUANTUM) {
                        let frames = block.len() / channels;
                        synth.process(&mut buffer[..frames]);
                        for (frame, sample) in block.chunks_mut(channels).zip(buffer.iter()) {
                            frame.fill(*sample);
                        }
                    }
                },
                |err| error!("Stream error: {}", err),
                None,
            )
            .map_err(|e| SynthError::Stream(e.to_string()))?;

        Ok(stream)
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self) -> Result<(), SynthError> {
        let stream = self.build_stream()?;
        stream
            .play()
            .map_err(|e| SynthError::Stream(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SynthError> {
        if let Some(stream) = &self.stream {
            stream
                .pause()
                .map_err(|e| SynthError::Stream(e.to_string()))?;
        }
        Ok(())
    }
}
