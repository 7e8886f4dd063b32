use super::router::MidiRouter;
use crate::synth::command::SynthCommand;
use crate::synth::error::SynthError;
use midir::{MidiInput, MidiInputConnection};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{error, info, warn};

/// Hardware MIDI input. Connects to the first available port; raw messages
/// are routed into engine commands on `update`.
pub struct MidiHandler {
    /// Holds the connection to keep it alive
    #[allow(dead_code)]
    connection: Option<MidiInputConnection<()>>,
    receiver: Option<Receiver<Vec<u8>>>,
    router: MidiRouter,
    sender: Sender<SynthCommand>,
}

impl MidiHandler {
    pub fn new(sender: Sender<SynthCommand>, router: MidiRouter) -> Self {
        match Self::connect() {
            Ok((connection, receiver)) => Self {
                connection: Some(connection),
                receiver: Some(receiver),
                router,
                sender,
            },
            Err(e) => {
                warn!(
                    "Failed to initialize MIDI: {}. MIDI functionality will be disabled.",
                    e
                );
                Self::disabled(sender, router)
            }
        }
    }

    /// A handler with no device attached.
    pub fn disabled(sender: Sender<SynthCommand>, router: MidiRouter) -> Self {
        Self {
            connection: None,
            receiver: None,
            router,
            sender,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn router_mut(&mut self) -> &mut MidiRouter {
        &mut self.router
    }

    fn connect() -> Result<(MidiInputConnection<()>, Receiver<Vec<u8>>), SynthError> {
        let midi_in =
            MidiInput::new("NeuroFM Input").map_err(|e| SynthError::Midi(e.to_string()))?;
        let ports = midi_in.ports();
        let port = ports
            .first()
            .ok_or_else(|| SynthError::Midi("No MIDI input ports found".into()))?;
        let port_name = midi_in
            .port_name(port)
            .map_err(|e| SynthError::Midi(e.to_string()))?;

        let (tx, rx) = mpsc::channel();
        let connection = midi_in
            .connect(
                port,
                "neurofm-read-input",
                move |_, message, _| {
                    let _ = tx.send(message.to_vec());
                },
                (),
            )
            .map_err(|e| SynthError::Midi(e.to_string()))?;

        info!("Opened MIDI port: {}", port_name);
        Ok((connection, rx))
    }

    pub fn update(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };
        let sender = &self.sender;
        while let Ok(message) = receiver.try_recv() {
            self.router.handle(&message, &mut |command| {
                if let Err(e) = sender.send(command) {
                    error!("Failed to send MIDI command: {}", e);
                }
            });
        }
    }
}
