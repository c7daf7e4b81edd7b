use std::path::PathBuf;
use std::time::Duration;

pub const DATA_DIR_VAR: &str = "TIMESHEETS_DIR";
pub const POLL_MS_VAR: &str = "TIMESHEETS_POLL_MS";

const DEFAULT_POLL_MS: u64 = 1000;

/// Runtime settings for the command line front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory the file store keeps its data in.
    pub data_dir: PathBuf,
    /// How often `watch` re-reads the store.
    pub poll_interval: Duration,
}

impl Config {
    /// Reads settings from the environment.
    ///
    /// The data directory is determined in the following order:
    /// 1. `TIMESHEETS_DIR` environment variable.
    /// 2. `~/.local/share/timesheets` (on Linux).
    /// 3. `./timesheets` (fallback).
    pub fn from_env() -> Config {
        let data_dir = std::env::var(DATA_DIR_VAR).map(PathBuf::from).unwrap_or_else(|_| {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("timesheets");
            p
        });
        let poll_ms = std::env::var(POLL_MS_VAR)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_POLL_MS);
        Config {
            data_dir,
            poll_interval: Duration::from_millis(poll_ms),
        }
    }
}
