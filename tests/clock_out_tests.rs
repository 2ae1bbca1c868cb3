use grooveclock::clock::{ClockSettings, MidiClockOut};
use grooveclock::midi::{MidiError, MidiMessage, RecordingLog, RecordingPort};
use std::thread;
use std::time::Duration;

// 300 BPM keeps ticks short (8.333ms) so a few batches fit in a short test
fn fast_clock(list_size: usize) -> (MidiClockOut<RecordingPort>, RecordingLog) {
    let port = RecordingPort::new("test clock");
    let log = port.log();
    let settings = ClockSettings {
        bpm: 300.0,
        list_size,
    };
    (MidiClockOut::new(port, &settings).unwrap(), log)
}

#[test]
fn test_new_clock_is_stopped() {
    let (clock, log) = fast_clock(4);
    assert!(!clock.is_started());
    assert!(!clock.is_paused());
    assert_eq!(clock.ticks(), 0);
    assert_eq!(clock.bpm(), 300.0);
    assert_eq!(clock.list_size(), 4);
    assert_eq!(clock.port_name(), "test clock");
    assert!(log.messages().is_empty());
}

#[test]
fn test_new_rejects_invalid_settings() {
    let bad_bpm = ClockSettings {
        bpm: 0.0,
        list_size: 4,
    };
    assert!(matches!(
        MidiClockOut::new(RecordingPort::new("x"), &bad_bpm),
        Err(MidiError::InvalidTempo(_))
    ));

    let bad_list = ClockSettings {
        bpm: 120.0,
        list_size: 0,
    };
    assert!(matches!(
        MidiClockOut::new(RecordingPort::new("x"), &bad_list),
        Err(MidiError::InvalidListSize(0))
    ));
}

#[test]
fn test_set_bpm() {
    let (mut clock, _log) = fast_clock(4);

    clock.set_bpm(120.0).unwrap();
    assert_eq!(clock.bpm(), 120.0);
    assert_eq!(clock.state().bpm(), 120.0);

    // Invalid tempo leaves the previous value in place
    assert!(clock.set_bpm(-1.0).is_err());
    assert!(clock.set_bpm(f64::NAN).is_err());
    assert_eq!(clock.bpm(), 120.0);
}

#[test]
fn test_start_stop_toggles_started() {
    let (mut clock, _log) = fast_clock(4);

    clock.start().unwrap();
    assert!(clock.is_started());

    clock.stop().unwrap();
    assert!(!clock.is_started());
}

#[test]
fn test_start_then_stop_emits_framed_clock() {
    let (mut clock, log) = fast_clock(4);

    clock.start().unwrap();
    thread::sleep(Duration::from_millis(100));
    clock.stop().unwrap();

    let messages = log.messages();
    assert_eq!(messages.first(), Some(&MidiMessage::Start));
    assert_eq!(messages.last(), Some(&MidiMessage::Stop));

    let clocks = &messages[1..messages.len() - 1];
    assert!(clocks.len() >= 4, "expected at least one batch, got {}", clocks.len());
    assert!(clocks.iter().all(|m| *m == MidiMessage::Clock));
    // Clocks are scheduled a whole batch at a time; those not yet due at the
    // stop were cancelled
    assert_eq!(clock.ticks() % 4, 0);
    assert!(clock.ticks() >= clocks.len() as u64);
}

#[test]
fn test_scheduled_deadlines_follow_tempo() {
    let (mut clock, log) = fast_clock(3);
    let interval = clock.tempo().tick_interval();

    clock.start().unwrap();
    thread::sleep(Duration::from_millis(60));
    clock.stop().unwrap();

    let deadlines: Vec<_> = log.entries().into_iter().filter_map(|e| e.deadline).collect();
    assert!(deadlines.len() >= 3);
    for pair in deadlines.windows(2) {
        assert_eq!(pair[1] - pair[0], interval);
    }
}

#[test]
fn test_start_is_idempotent() {
    let (mut clock, log) = fast_clock(4);

    clock.start().unwrap();
    clock.start().unwrap();
    clock.stop().unwrap();
    clock.stop().unwrap();

    assert_eq!(log.count(MidiMessage::Start), 1);
    assert_eq!(log.count(MidiMessage::Stop), 1);
}

#[test]
fn test_stop_without_start_sends_nothing() {
    let (mut clock, log) = fast_clock(4);
    clock.stop().unwrap();
    assert!(log.messages().is_empty());
}

#[test]
fn test_no_clock_after_stop() {
    let (mut clock, log) = fast_clock(4);

    clock.start().unwrap();
    thread::sleep(Duration::from_millis(40));
    clock.stop().unwrap();
    let count = log.messages().len();

    let entries = log.entries();
    let stop = entries
        .iter()
        .find(|e| e.message == MidiMessage::Stop)
        .expect("stop recorded");
    // clocks scheduled ahead of the stop were cancelled, not left pending
    assert!(entries
        .iter()
        .filter_map(|e| e.deadline)
        .all(|deadline| deadline <= stop.recorded_at));
    assert_eq!(log.messages().last(), Some(&MidiMessage::Stop));

    thread::sleep(Duration::from_millis(40));
    assert_eq!(log.messages().len(), count);
}

#[test]
fn test_stop_cancels_scheduled_clocks() {
    // 20 BPM with 64 per batch schedules about 8s of clock up front
    let port = RecordingPort::new("slow clock");
    let log = port.log();
    let settings = ClockSettings {
        bpm: 20.0,
        list_size: 64,
    };
    let mut clock = MidiClockOut::new(port, &settings).unwrap();

    clock.start().unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(log.count(MidiMessage::Clock) > 64);
    clock.stop().unwrap();

    // only clocks already due at the stop remain
    assert!(log.count(MidiMessage::Clock) <= 1);
    assert_eq!(log.messages().last(), Some(&MidiMessage::Stop));
}

#[test]
fn test_pause_resume_and_reset() {
    let (mut clock, log) = fast_clock(4);

    clock.start().unwrap();
    thread::sleep(Duration::from_millis(50));
    clock.stop().unwrap();

    let paused_at = clock.ticks();
    assert!(paused_at > 0);
    assert!(clock.is_paused());

    clock.resume().unwrap();
    assert!(clock.is_started());
    assert!(!clock.reset(), "reset must be refused while running");
    thread::sleep(Duration::from_millis(50));
    clock.stop().unwrap();

    assert!(clock.ticks() > paused_at);
    assert_eq!(log.count(MidiMessage::Continue), 1);

    assert!(clock.reset());
    assert_eq!(clock.ticks(), 0);
    assert!(!clock.is_paused());
}

#[test]
fn test_start_resets_ticks() {
    let (mut clock, _log) = fast_clock(4);

    clock.start().unwrap();
    thread::sleep(Duration::from_millis(50));
    clock.stop().unwrap();
    assert!(clock.ticks() > 0);

    clock.start().unwrap();
    // The first batch may already be scheduled, but never more than two
    assert!(clock.ticks() <= 8);
    clock.stop().unwrap();
}

#[test]
fn test_tempo_change_while_running() {
    let (mut clock, log) = fast_clock(2);

    clock.start().unwrap();
    thread::sleep(Duration::from_millis(30));
    clock.set_bpm(150.0).unwrap();
    let slow = clock.tempo().tick_interval();
    thread::sleep(Duration::from_millis(120));
    clock.stop().unwrap();

    let deadlines: Vec<_> = log.entries().into_iter().filter_map(|e| e.deadline).collect();
    let last = deadlines.windows(2).last().expect("at least two clocks");
    assert_eq!(last[1] - last[0], slow);
}

#[test]
fn test_failed_start_leaves_clock_stopped() {
    let (mut clock, log) = fast_clock(4);
    log.set_fail_sends(true);

    assert!(matches!(clock.start(), Err(MidiError::SendError(_))));
    assert!(!clock.is_started());
}

#[test]
fn test_failed_start_keeps_paused_position() {
    let (mut clock, log) = fast_clock(4);

    clock.start().unwrap();
    thread::sleep(Duration::from_millis(30));
    clock.stop().unwrap();
    let paused_at = clock.ticks();
    assert!(clock.is_paused());

    log.set_fail_sends(true);
    assert!(clock.start().is_err());
    assert!(clock.is_paused());
    assert_eq!(clock.ticks(), paused_at);

    log.set_fail_sends(false);
    clock.resume().unwrap();
    assert!(clock.ticks() >= paused_at);
    clock.stop().unwrap();
}

#[test]
fn test_schedule_failures_keep_clock_running() {
    let (mut clock, log) = fast_clock(4);

    clock.start().unwrap();
    log.set_fail_sends(true);
    thread::sleep(Duration::from_millis(50));
    assert!(clock.is_started());

    log.set_fail_sends(false);
    clock.stop().unwrap();
    assert_eq!(log.messages().last(), Some(&MidiMessage::Stop));
}

#[test]
fn test_drop_stops_running_clock() {
    let (mut clock, log) = fast_clock(4);
    clock.start().unwrap();
    thread::sleep(Duration::from_millis(20));
    drop(clock);

    assert_eq!(log.messages().last(), Some(&MidiMessage::Stop));
}
