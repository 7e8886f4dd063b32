use crate::synth::command::SynthCommand;
use crate::synth::preset::Param;
use crate::synth::prelude::MACRO_COUNT;

pub const CC_MOD_WHEEL: u8 = 1;
pub const CC_BREATH: u8 = 2;
pub const CC_VOLUME: u8 = 7;
pub const CC_SUSTAIN: u8 = 64;
pub const CC_BRIGHTNESS: u8 = 74;

/// Aftertouch drives this macro.
pub const AFTERTOUCH_MACRO: usize = 2;

const FILTER_MIN_HZ: f32 = 80.0;
const FILTER_MAX_HZ: f32 = 12000.0;

/// Filter cutoff for a normalized controller value (exponential sweep).
pub fn cc_to_filter_cutoff(norm: f32) -> f32 {
    FILTER_MIN_HZ * (FILTER_MAX_HZ / FILTER_MIN_HZ).powf(norm)
}

/// Output gain for a normalized controller value.
pub fn cc_to_out_gain(norm: f32) -> f32 {
    0.1 + norm * 1.1
}

/// Frequency ratio for a 14-bit pitch-bend value.
pub fn bend_ratio(value: u16, range_semitones: f32) -> f32 {
    let norm = (value as f32 - 8192.0) / 8192.0;
    2f32.powf(norm * range_semitones / 12.0)
}

/// Turns raw MIDI bytes into engine commands, independent of the transport.
///
/// Sustain: while the pedal is down, note-offs are deferred. Releasing the
/// pedal sends the deferred note-offs for keys that are no longer held, and
/// the engine drops any that don't match its current note.
#[derive(Debug, Clone)]
pub struct MidiRouter {
    channel: Option<u8>,
    bend_range: f32,
    sustain: bool,
    held: [bool; 128],
    deferred: [bool; 128],
    macro_cc: [Option<u8>; MACRO_COUNT],
    learn_target: Option<usize>,
}

impl MidiRouter {
    pub fn new() -> Self {
        Self {
            channel: None,
            bend_range: 2.0,
            sustain: false,
            held: [false; 128],
            deferred: [false; 128],
            macro_cc: [Some(CC_MOD_WHEEL), Some(CC_BREATH), None, None],
            learn_target: None,
        }
    }

    /// `None` listens on every channel.
    pub fn set_channel(&mut self, channel: Option<u8>) {
        self.channel = channel.map(|c| c & 0x0F);
    }

    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    pub fn set_bend_range(&mut self, semitones: f32) {
        if semitones.is_finite() {
            self.bend_range = semitones.clamp(0.0, 48.0);
        }
    }

    pub fn bend_range(&self) -> f32 {
        self.bend_range
    }

    pub fn is_sustained(&self) -> bool {
        self.sustain
    }

    pub fn is_held(&self, note: u8) -> bool {
        self.held[(note & 0x7F) as usize]
    }

    /// Bind the next incoming CC to `macro_index`.
    pub fn start_macro_learn(&mut self, macro_index: usize) {
        if macro_index < MACRO_COUNT {
            self.learn_target = Some(macro_index);
        }
    }

    pub fn macro_binding(&self, macro_index: usize) -> Option<u8> {
        self.macro_cc.get(macro_index).copied().flatten()
    }

    /// Route one message. Messages shorter than their status requires, and
    /// those on other channels, are dropped.
    pub fn handle(&mut self, message: &[u8], emit: &mut impl FnMut(SynthCommand)) {
        let Some(&status) = message.first() else {
            return;
        };
        if let Some(channel) = self.channel {
            if status & 0x0F != channel {
                return;
            }
        }
        let data1 = message.get(1).copied().unwrap_or(0) & 0x7F;
        let data2 = message.get(2).copied().unwrap_or(0) & 0x7F;

        match status & 0xF0 {
            0x90 if message.len() >= 3 && data2 > 0 => {
                self.held[data1 as usize] = true;
                self.deferred[data1 as usize] = false;
                emit(SynthCommand::NoteOn {
                    note: data1,
                    velocity: Some(data2 as f32 / 127.0),
                });
            }
            0x80 | 0x90 if message.len() >= 3 => {
                self.held[data1 as usize] = false;
                if self.sustain {
                    self.deferred[data1 as usize] = true;
                } else {
                    emit(SynthCommand::NoteOff { note: data1 });
                }
            }
            0xB0 if message.len() >= 3 => self.handle_cc(data1, data2, emit),
            0xE0 if message.len() >= 3 => {
                let value = ((data2 as u16) << 7) | data1 as u16;
                emit(SynthCommand::PitchBend(bend_ratio(value, self.bend_range)));
            }
            0xD0 if message.len() >= 2 => emit(SynthCommand::SetMacro {
                index: AFTERTOUCH_MACRO,
                value: data1 as f32 / 127.0,
            }),
            _ => {}
        }
    }

    fn handle_cc(&mut self, cc: u8, value: u8, emit: &mut impl FnMut(SynthCommand)) {
        if let Some(index) = self.learn_target.take() {
            self.macro_cc[index] = Some(cc);
            return;
        }

        if cc == CC_SUSTAIN {
            let down = value >= 64;
            if self.sustain && !down {
                for note in 0..128u8 {
                    let idx = note as usize;
                    if self.deferred[idx] && !self.held[idx] {
                        emit(SynthCommand::NoteOff { note });
                    }
                    self.deferred[idx] = false;
                }
            }
            self.sustain = down;
            return;
        }

        let norm = value as f32 / 127.0;
        if let Some(index) = self.macro_cc.iter().position(|b| *b == Some(cc)) {
            emit(SynthCommand::SetMacro { index, value: norm });
            return;
        }
        match cc {
            CC_BRIGHTNESS => emit(SynthCommand::SetParam {
                param: Param::FilterCut,
                value: cc_to_filter_cutoff(norm),
            }),
            CC_VOLUME => emit(SynthCommand::SetParam {
                param: Param::OutGain,
                value: cc_to_out_gain(norm),
            }),
            _ => {}
        }
    }
}

impl Default for MidiRouter {
    fn default() -> Self {
        Self::new()
    }
}
