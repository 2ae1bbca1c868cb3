use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

pub fn log_dir() -> Result<PathBuf, Error> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("grooveclock")
        .join("logs"))
}

pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level).unwrap_or(LevelFilter::Debug)
}

fn init_file_logger(level: LevelFilter) -> Result<(), Error> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("app.log"))?;

    CombinedLogger::init(vec![WriteLogger::new(level, Config::default(), log_file)])
        .map_err(|e| Error::new(ErrorKind::Other, e))
}

/// Installs the file logger, falling back to stderr when the log file
/// cannot be opened. Later calls are no-ops.
pub fn init_logger(level: &str) -> Result<(), Error> {
    let level = parse_level(level);

    INIT.call_once(|| {
        let installed = match init_file_logger(level) {
            Ok(()) => true,
            Err(file_err) => env_logger::Builder::new()
                .filter_level(level)
                .try_init()
                .map(|_| log::warn!("File logging unavailable ({}), logging to stderr", file_err))
                .is_ok(),
        };
        LOGGER_INITIALIZED.store(installed, Ordering::SeqCst);
    });

    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::Other, "Logger initialization failed"))
    }
}
