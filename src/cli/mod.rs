use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Send MIDI clock to other applications", long_about = None)]
pub struct Args {
    /// List available MIDI output devices
    #[arg(long)]
    pub device_list: bool,

    /// Tempo in beats per minute
    #[arg(short, long)]
    pub bpm: Option<f64>,

    /// Number of clock messages scheduled per batch
    #[arg(short, long)]
    pub list_size: Option<u32>,

    /// Send clock to an existing output device instead of a virtual source
    #[arg(short, long, value_name = "DEVICE")]
    pub output: Option<String>,

    /// Pick the output device from a list
    #[arg(long, conflicts_with = "output")]
    pub select_output: bool,

    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Start the clock immediately and show its status instead of prompting
    #[arg(long)]
    pub autostart: bool,
}

#[cfg(not(feature = "test-mock"))]
pub fn handle_device_list() -> Vec<String> {
    match crate::midi::MidirPort::list_available_ports() {
        Ok(ports) => ports,
        Err(e) => {
            log::error!("Failed to list MIDI ports: {}", e);
            vec![]
        }
    }
}

#[cfg(feature = "test-mock")]
pub fn handle_device_list() -> Vec<String> {
    vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}
