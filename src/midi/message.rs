use std::error::Error;
use std::fmt;

/// Custom error type for MIDI clock operations
#[derive(Debug)]
pub enum MidiError {
    /// Error when sending a MIDI message
    SendError(String),
    /// Error when acquiring a MIDI port or endpoint
    ConnectionError(String),
    /// Bytes that do not form a supported real-time message
    InvalidMessage(Vec<u8>),
    /// Tempo outside the supported range
    InvalidTempo(f64),
    /// Batch size outside the supported range
    InvalidListSize(usize),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
            MidiError::InvalidMessage(bytes) => write!(f, "Invalid MIDI message: {:02X?}", bytes),
            MidiError::InvalidTempo(bpm) => write!(f, "Invalid tempo: {} BPM", bpm),
            MidiError::InvalidListSize(size) => write!(f, "Invalid list size: {}", size),
        }
    }
}

impl Error for MidiError {}

/// System real-time messages emitted by a clock source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// MIDI Clock timing message
    Clock,
    /// MIDI Start message
    Start,
    /// MIDI Continue message
    Continue,
    /// MIDI Stop message
    Stop,
}

impl MidiMessage {
    pub fn status_byte(self) -> u8 {
        match self {
            MidiMessage::Clock => 0xF8,
            MidiMessage::Start => 0xFA,
            MidiMessage::Continue => 0xFB,
            MidiMessage::Stop => 0xFC,
        }
    }

    pub fn to_bytes(self) -> [u8; 1] {
        [self.status_byte()]
    }

    /// Parses a single real-time message. Real-time messages carry no data
    /// bytes, so anything longer than one byte is rejected.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match data {
            [0xF8] => Ok(MidiMessage::Clock),
            [0xFA] => Ok(MidiMessage::Start),
            [0xFB] => Ok(MidiMessage::Continue),
            [0xFC] => Ok(MidiMessage::Stop),
            _ => Err(MidiError::InvalidMessage(data.to_vec())),
        }
    }
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;
