use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main configuration for a Pitchside service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub sweeps: SweepConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

/// Cadence of the background sweeps.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepConfig {
    /// Seconds between birthday sweep iterations (default: daily).
    #[serde(default = "default_birthday_interval")]
    pub birthday_interval_secs: u64,
    /// Seconds between waitlist-offer expiry sweep iterations.
    #[serde(default = "default_offer_interval")]
    pub offer_interval_secs: u64,
    /// Minutes a promoted entrant has to pay before the offer lapses.
    #[serde(default = "default_payment_window")]
    pub payment_window_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            sweeps: SweepConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            birthday_interval_secs: default_birthday_interval(),
            offer_interval_secs: default_offer_interval(),
            payment_window_minutes: default_payment_window(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

fn default_birthday_interval() -> u64 {
    86_400
}

fn default_offer_interval() -> u64 {
    60
}

fn default_payment_window() -> u32 {
    30
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Look up an environment variable with the `PITCHSIDE_` prefix.
fn get_env_with_prefix(name: &str) -> Option<String> {
    std::env::var(format!("PITCHSIDE_{}", name)).ok()
}

/// Builder for [`Config`] with environment variable support.
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_birthday_interval_secs(mut self, secs: u64) -> Self {
        self.config.sweeps.birthday_interval_secs = secs;
        self
    }

    pub fn with_offer_interval_secs(mut self, secs: u64) -> Self {
        self.config.sweeps.offer_interval_secs = secs;
        self
    }

    pub fn with_payment_window_minutes(mut self, minutes: u32) -> Self {
        self.config.sweeps.payment_window_minutes = minutes;
        self
    }

    /// Load configuration from environment variables with the `PITCHSIDE_`
    /// prefix.
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = get_env_with_prefix("PORT") {
            if let Ok(p) = port.parse() {
                self.config.server.port = p;
            }
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }
        if let Some(secs) = get_env_with_prefix("BIRTHDAY_INTERVAL_SECS") {
            if let Ok(s) = secs.parse() {
                self.config.sweeps.birthday_interval_secs = s;
            }
        }
        if let Some(secs) = get_env_with_prefix("OFFER_INTERVAL_SECS") {
            if let Ok(s) = secs.parse() {
                self.config.sweeps.offer_interval_secs = s;
            }
        }
        if let Some(minutes) = get_env_with_prefix("PAYMENT_WINDOW_MINUTES") {
            if let Ok(m) = minutes.parse() {
                self.config.sweeps.payment_window_minutes = m;
            }
        }
        self
    }

    /// Build the configuration, validating all settings.
    pub fn build(self) -> crate::error::Result<Config> {
        self.config.server.addr().map_err(|e| {
            crate::error::PitchsideError::bad_request(format!(
                "Invalid server address {}:{} - {}",
                self.config.server.host, self.config.server.port, e
            ))
        })?;

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(crate::error::PitchsideError::bad_request(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if self.config.server.port == 0 {
            return Err(crate::error::PitchsideError::bad_request(
                "Server port must be greater than 0",
            ));
        }

        if self.config.sweeps.birthday_interval_secs == 0
            || self.config.sweeps.offer_interval_secs == 0
        {
            return Err(crate::error::PitchsideError::bad_request(
                "Sweep intervals must be greater than 0",
            ));
        }

        if self.config.sweeps.payment_window_minutes == 0 {
            return Err(crate::error::PitchsideError::bad_request(
                "Payment window must be greater than 0",
            ));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
