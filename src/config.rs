//! Configuration management.
//!
//! Settings load from a TOML file through the `config` crate; every field
//! has a default so a host can also run with no file at all. Durations are
//! written human-style (`"100ms"`, `"50ms"`) via `humantime-serde`.

use std::path::Path;
use std::time::Duration;

use config::Config;
use serde::Deserialize;

use crate::error::HubResult;

/// Top-level runtime settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    /// Tracing filter directive (e.g. `info`, `driver_hub=debug`).
    pub log_level: String,
    /// UART transport defaults.
    pub uart: UartSettings,
    /// Tick cadence and lock bounds.
    pub scheduler: SchedulerSettings,
    /// Drivers to start at boot, in order — the firmware's autoexec
    /// `startDriver` lines.
    pub autostart: Vec<String>,
}

/// UART transport defaults.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UartSettings {
    /// Baud rate used when the host brings the port up itself.
    pub baud: u32,
    /// Receive-ring capacity installed at boot.
    pub rx_buffer: usize,
}

/// Tick cadence and lock bounds.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Period of the high-frequency tick.
    #[serde(with = "humantime_serde")]
    pub quick_tick: Duration,
    /// Bounded wait for transition and every-second lock acquires.
    #[serde(with = "humantime_serde")]
    pub lock_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            uart: UartSettings::default(),
            scheduler: SchedulerSettings::default(),
            autostart: Vec::new(),
        }
    }
}

impl Default for UartSettings {
    fn default() -> Self {
        Self {
            baud: 115_200,
            rx_buffer: crate::serial::UART_RX_RING_CAPACITY,
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            quick_tick: Duration::from_millis(50),
            lock_timeout: Duration::from_millis(100),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> HubResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let s = Config::builder()
            .add_source(config::File::from(path))
            .build()?;
        Ok(s.try_deserialize()?)
    }
}
