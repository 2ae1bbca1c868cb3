use super::{ClockPort, MidiError, MidiMessage, Result, TimedPacket};
use crossbeam::channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use midir::{MidiOutput, MidiOutputConnection};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Raw byte sink behind a [`TimedOutput`]
trait RawOutput: Send + 'static {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<()>;
}

impl RawOutput for MidiOutputConnection {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.send(bytes)
            .map_err(|e| MidiError::SendError(e.to_string()))
    }
}

struct QueuedPacket {
    epoch: u64,
    packet: TimedPacket,
}

/// Sends packets at their deadlines from a delivery thread.
///
/// Cancelling bumps an epoch and wakes the thread, so a packet it is already
/// waiting on is discarded at once instead of sent late.
struct TimedOutput<O: RawOutput> {
    output: Arc<Mutex<O>>,
    queue_tx: Option<Sender<QueuedPacket>>,
    queue_rx: Receiver<QueuedPacket>,
    wake_tx: Option<Sender<()>>,
    epoch: Arc<AtomicU64>,
    delivery: Option<JoinHandle<()>>,
}

impl<O: RawOutput> TimedOutput<O> {
    fn new(output: O) -> Self {
        let output = Arc::new(Mutex::new(output));
        let epoch = Arc::new(AtomicU64::new(0));
        let (queue_tx, queue_rx) = unbounded();
        let (wake_tx, wake_rx) = bounded(1);

        let delivery = {
            let output = Arc::clone(&output);
            let epoch = Arc::clone(&epoch);
            let rx = queue_rx.clone();
            thread::spawn(move || deliver_packets(rx, wake_rx, output, epoch))
        };

        TimedOutput {
            output,
            queue_tx: Some(queue_tx),
            queue_rx,
            wake_tx: Some(wake_tx),
            epoch,
            delivery: Some(delivery),
        }
    }

    fn send_now(&self, bytes: &[u8]) -> Result<()> {
        self.output
            .lock()
            .map_err(|_| MidiError::SendError("MIDI connection lock poisoned".to_string()))?
            .send_bytes(bytes)
    }

    fn schedule(&self, packets: Vec<TimedPacket>) -> Result<()> {
        let tx = self
            .queue_tx
            .as_ref()
            .ok_or_else(|| MidiError::SendError("delivery queue closed".to_string()))?;
        let epoch = self.epoch.load(Ordering::SeqCst);
        for packet in packets {
            tx.send(QueuedPacket { epoch, packet })
                .map_err(|e| MidiError::SendError(e.to_string()))?;
        }
        Ok(())
    }

    /// Drops every queued packet and the one being waited on. Returns how
    /// many were still queued.
    fn cancel_pending(&self) -> usize {
        let _guard = self.output.lock();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let dropped = self.queue_rx.try_iter().count();
        if let Some(wake_tx) = &self.wake_tx {
            // A full channel already holds a wake-up
            let _ = wake_tx.try_send(());
        }
        dropped
    }
}

impl<O: RawOutput> Drop for TimedOutput<O> {
    fn drop(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.queue_tx.take();
        self.wake_tx.take();
        if let Some(handle) = self.delivery.take() {
            if handle.join().is_err() {
                warn!("MIDI delivery thread panicked");
            }
        }
    }
}

fn deliver_packets<O: RawOutput>(
    rx: Receiver<QueuedPacket>,
    wake: Receiver<()>,
    output: Arc<Mutex<O>>,
    epoch: Arc<AtomicU64>,
) {
    debug!("MIDI delivery thread started");

    'packets: for queued in rx.iter() {
        // Wait for the deadline. A wake-up only ends the wait if the epoch
        // moved; older wake-ups are left over from an idle cancel.
        while queued.epoch == epoch.load(Ordering::SeqCst) {
            match wake.recv_deadline(queued.packet.deadline) {
                Ok(()) => continue,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break 'packets,
            }
        }

        // The epoch is checked under the connection lock so a cancel cannot
        // slip in between the check and the send.
        let Ok(mut out) = output.lock() else {
            error!("MIDI connection lock poisoned, stopping delivery");
            break;
        };
        if queued.epoch != epoch.load(Ordering::SeqCst) {
            continue;
        }
        if let Err(e) = out.send_bytes(&queued.packet.message.to_bytes()) {
            error!("Failed to deliver {:?}: {}", queued.packet.message, e);
        }
    }

    debug!("MIDI delivery thread stopping");
}

/// Clock output backed by a midir connection, with scheduled packets sent
/// by a [`TimedOutput`] delivery thread.
pub struct MidirPort {
    name: String,
    output: TimedOutput<MidiOutputConnection>,
}

fn new_output(client_name: &str) -> Result<MidiOutput> {
    MidiOutput::new(client_name).map_err(|e| MidiError::ConnectionError(e.to_string()))
}

impl MidirPort {
    /// Publishes a new MIDI source named "<client_name> clock" that other
    /// applications can subscribe to.
    #[cfg(unix)]
    pub fn create_virtual(client_name: &str) -> Result<Self> {
        use midir::os::unix::VirtualOutput;

        let midi_out = new_output(client_name)?;
        let port_name = format!("{} clock", client_name);
        let connection = midi_out
            .create_virtual(&port_name)
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;
        info!("Created virtual MIDI source: {}", port_name);
        Ok(Self::from_connection(port_name, connection))
    }

    #[cfg(not(unix))]
    pub fn create_virtual(client_name: &str) -> Result<Self> {
        Err(MidiError::ConnectionError(format!(
            "virtual MIDI sources are not supported on this platform (client '{}')",
            client_name
        )))
    }

    pub fn connect_to_device(client_name: &str, device_name: &str) -> Result<Self> {
        let midi_out = new_output(client_name)?;

        let out_ports = midi_out.ports();
        let available_ports: Vec<String> = out_ports
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect();

        info!("Available MIDI output ports: {:?}", available_ports);

        let port = out_ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(device_name)
            })
            .ok_or_else(|| {
                error!("MIDI output device '{}' not found", device_name);
                MidiError::ConnectionError(format!(
                    "MIDI output device '{}' not found",
                    device_name
                ))
            })?;

        let port_name = midi_out
            .port_name(port)
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;
        info!("Connecting to MIDI output port: {}", port_name);

        let connection = midi_out
            .connect(port, &format!("{}-clock-conn", client_name))
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(port_name, connection))
    }

    pub fn connect_to_first_available(client_name: &str) -> Result<Self> {
        let midi_out = new_output(client_name)?;

        let out_ports = midi_out.ports();
        let port = out_ports.first().ok_or_else(|| {
            MidiError::ConnectionError("No MIDI output ports available".to_string())
        })?;
        let port_name = midi_out
            .port_name(port)
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;

        info!("Connecting to MIDI output port: {}", port_name);
        let connection = midi_out
            .connect(port, &format!("{}-clock-conn", client_name))
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(port_name, connection))
    }

    // Utility method to list all available MIDI output ports
    pub fn list_available_ports() -> Result<Vec<String>> {
        let midi_out = new_output("grooveclock-port-lister")?;
        let ports = midi_out.ports();
        let port_names = ports
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect();
        Ok(port_names)
    }

    fn from_connection(name: String, connection: MidiOutputConnection) -> Self {
        MidirPort {
            name,
            output: TimedOutput::new(connection),
        }
    }
}

impl ClockPort for MidirPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_now(&mut self, message: MidiMessage) -> Result<()> {
        debug!("Sending {:?} to {}", message, self.name);
        self.output.send_now(&message.to_bytes())
    }

    fn schedule(&mut self, packets: Vec<TimedPacket>) -> Result<()> {
        self.output.schedule(packets)
    }

    fn cancel_pending(&mut self) -> usize {
        let dropped = self.output.cancel_pending();
        if dropped > 0 {
            debug!("Discarded {} pending packets on {}", dropped, self.name);
        }
        dropped
    }
}

impl Drop for MidirPort {
    fn drop(&mut self) {
        info!("Closing MIDI output {}", self.name);
    }
}
