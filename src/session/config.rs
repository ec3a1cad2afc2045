use std::time::Duration;

use crate::config::Config;
use crate::device::DeviceSettings;

/// Configuration for an interview session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier, used in logs
    pub session_id: String,

    /// Period of the elapsed-time tick while recording
    pub tick_interval: Duration,

    pub devices: DeviceSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("interview-{}", uuid::Uuid::new_v4()),
            tick_interval: Duration::from_secs(1),
            devices: DeviceSettings::default(),
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.session.tick_interval_ms),
            devices: DeviceSettings::from(&config.devices),
            ..Self::default()
        }
    }
}
