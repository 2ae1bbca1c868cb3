use grooveclock::midi::{MidiError, MidiMessage};
use std::error::Error;

#[test]
fn test_system_message_bytes() {
    assert_eq!(MidiMessage::Clock.to_bytes(), [0xF8]);
    assert_eq!(MidiMessage::Start.to_bytes(), [0xFA]);
    assert_eq!(MidiMessage::Continue.to_bytes(), [0xFB]);
    assert_eq!(MidiMessage::Stop.to_bytes(), [0xFC]);
}

#[test]
fn test_system_message_parsing() {
    assert_eq!(MidiMessage::from_bytes(&[0xF8]).unwrap(), MidiMessage::Clock);
    assert_eq!(MidiMessage::from_bytes(&[0xFA]).unwrap(), MidiMessage::Start);
    assert_eq!(
        MidiMessage::from_bytes(&[0xFB]).unwrap(),
        MidiMessage::Continue
    );
    assert_eq!(MidiMessage::from_bytes(&[0xFC]).unwrap(), MidiMessage::Stop);
}

#[test]
fn test_rejects_non_clock_messages() {
    // Note On, channel 0, note 60, velocity 100
    assert!(matches!(
        MidiMessage::from_bytes(&[0x90, 60, 100]),
        Err(MidiError::InvalidMessage(_))
    ));
    assert!(MidiMessage::from_bytes(&[]).is_err());
    // Real-time messages carry no data bytes
    assert!(MidiMessage::from_bytes(&[0xF8, 0x00]).is_err());
    // Active sensing is real-time but not a clock message
    assert!(MidiMessage::from_bytes(&[0xFE]).is_err());
}

#[test]
fn test_midi_error_display() {
    let send_error = MidiError::SendError("Failed to send".to_string());
    let conn_error = MidiError::ConnectionError("Failed to connect".to_string());

    assert_eq!(send_error.to_string(), "MIDI send error: Failed to send");
    assert_eq!(
        conn_error.to_string(),
        "MIDI connection error: Failed to connect"
    );
    assert_eq!(
        MidiError::InvalidTempo(0.0).to_string(),
        "Invalid tempo: 0 BPM"
    );
    assert_eq!(
        MidiError::InvalidListSize(0).to_string(),
        "Invalid list size: 0"
    );
    assert_eq!(
        MidiError::InvalidMessage(vec![0x90, 0x3C]).to_string(),
        "Invalid MIDI message: [90, 3C]"
    );
}

#[test]
fn test_midi_error_as_error() {
    let error = MidiError::SendError("test error".to_string());
    let _: &dyn Error = &error; // Verify it implements Error trait
    let debug_str = format!("{:?}", error);
    assert!(debug_str.contains("SendError"));
}
