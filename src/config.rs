use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub generation: GenerationConfig,
    pub devices: DeviceConfig,
    pub session: SessionTiming,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "mock-interview".to_string(),
        }
    }
}

/// Settings for the external question generation / scoring service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// API root, without the trailing `/models/...` path
    pub base_url: String,
    pub model: String,
    /// Number of questions requested from the generator
    pub question_count: usize,
    /// Name of the environment variable holding the API credential
    pub credential_env: String,
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            question_count: 5,
            credential_env: "GEMINI_API_KEY".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl GenerationConfig {
    /// Read the credential from the configured environment variable.
    ///
    /// Empty values count as missing.
    pub fn credential(&self) -> Option<String> {
        std::env::var(&self.credential_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Interval between render-target readiness checks
    pub attach_poll_interval_ms: u64,
    /// Readiness checks before giving up on attaching the camera stream
    pub max_attach_attempts: u32,
    pub video_width: u32,
    pub video_height: u32,
    pub facing_mode: String,
    /// BCP-47 language tag for speech recognition
    pub language: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            attach_poll_interval_ms: 100,
            max_attach_attempts: 50, // 5 seconds at 100ms
            video_width: 1280,
            video_height: 720,
            facing_mode: "user".to_string(),
            language: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionTiming {
    /// Elapsed-time tick period while recording
    pub tick_interval_ms: u64,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration from an optional file plus `MOCK_INTERVIEW__*` overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("MOCK_INTERVIEW").separator("__"))
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path))?;
        Ok(config)
    }

    /// Reject values the session timers cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.session.tick_interval_ms == 0 {
            bail!("session.tick_interval_ms must be greater than zero");
        }
        if self.devices.attach_poll_interval_ms == 0 {
            bail!("devices.attach_poll_interval_ms must be greater than zero");
        }
        Ok(())
    }
}
