// config.rs

use crate::cli::Args;
use config::{Config, ConfigError, Environment, File};
use log::{debug, info};
use std::path::Path;

pub const TICKS_PER_BEAT: u64 = 24;
pub const BEATS_PER_BAR: u64 = 4;

pub const DEFAULT_BPM: f64 = 120.0;
pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 400.0;

pub const DEFAULT_LIST_SIZE: usize = 4;
pub const MAX_LIST_SIZE: usize = 64;

pub const DEFAULT_CLIENT_NAME: &str = "grooveclock";
const DEFAULT_CONFIG_FILE: &str = "grooveclock";
const ENV_PREFIX: &str = "GROOVECLOCK";

/// Runtime settings, layered as defaults, config file, environment, then
/// command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bpm: f64,
    pub list_size: usize,
    pub output_device: Option<String>,
    pub client_name: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bpm: DEFAULT_BPM,
            list_size: DEFAULT_LIST_SIZE,
            output_device: None,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            log_level: "debug".to_string(),
        }
    }
}

impl Settings {
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("bpm", DEFAULT_BPM)?
            .set_default("list_size", DEFAULT_LIST_SIZE as i64)?
            .set_default("client_name", DEFAULT_CLIENT_NAME)?
            .set_default("log_level", "debug")?;

        builder = match &args.config {
            Some(path) => {
                info!("Loading settings from {}", path.display());
                builder.add_source(File::from(path.as_path()).required(true))
            }
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        if let Some(bpm) = args.bpm {
            builder = builder.set_override("bpm", bpm)?;
        }
        if let Some(list_size) = args.list_size {
            builder = builder.set_override("list_size", i64::from(list_size))?;
        }
        if let Some(device) = &args.output {
            builder = builder.set_override("output_device", device.as_str())?;
        }

        Self::from_config(&builder.build()?)
    }

    /// Loads a settings file on its own, without environment or command line
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("bpm", DEFAULT_BPM)?
            .set_default("list_size", DEFAULT_LIST_SIZE as i64)?
            .set_default("client_name", DEFAULT_CLIENT_NAME)?
            .set_default("log_level", "debug")?
            .add_source(File::from(path).required(true))
            .build()?;
        Self::from_config(&config)
    }

    fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let bpm = config.get_float("bpm")?;
        let list_size = config.get_int("list_size")?;
        let list_size = usize::try_from(list_size)
            .map_err(|_| ConfigError::Message(format!("list_size must be positive, got {}", list_size)))?;

        let output_device = match config.get_string("output_device") {
            Ok(device) if device.is_empty() => None,
            Ok(device) => Some(device),
            Err(ConfigError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let settings = Settings {
            bpm,
            list_size,
            output_device,
            client_name: config.get_string("client_name")?,
            log_level: config.get_string("log_level")?,
        };
        debug!("Loaded settings: {:?}", settings);

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bpm.is_finite() || !(MIN_BPM..=MAX_BPM).contains(&self.bpm) {
            return Err(ConfigError::Message(format!(
                "bpm must be between {} and {}, got {}",
                MIN_BPM, MAX_BPM, self.bpm
            )));
        }
        if !(1..=MAX_LIST_SIZE).contains(&self.list_size) {
            return Err(ConfigError::Message(format!(
                "list_size must be between 1 and {}, got {}",
                MAX_LIST_SIZE, self.list_size
            )));
        }
        if self.client_name.trim().is_empty() {
            return Err(ConfigError::Message("client_name must not be empty".to_string()));
        }
        Ok(())
    }
}
