use std::env;
use std::time::Duration;

/// Server-side lease expiry after the last heartbeat.
pub const DEFAULT_LEASE_TIMEOUT: Duration = Duration::from_secs(45);
/// Period of the expiry sweeper.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);
/// Server-side lease timing.
///
/// The sweep period must be shorter than the lease timeout, otherwise stale
/// leases linger well past their deadline. How often clients renew is not a
/// server setting: the timeout is advertised in every acquire response and
/// clients derive their heartbeat period from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeaseSettings {
    pub lease_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for LeaseSettings {
    fn default() -> Self {
        Self {
            lease_timeout: DEFAULT_LEASE_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl LeaseSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lease_timeout.is_zero() || self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.sweep_interval >= self.lease_timeout {
            return Err(ConfigError::SweepIntervalTooLong {
                sweep: self.sweep_interval,
                timeout: self.lease_timeout,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub lease: LeaseSettings,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let lease = LeaseSettings {
            lease_timeout: seconds_from_env("LEASE_TIMEOUT_SECS", DEFAULT_LEASE_TIMEOUT)?,
            sweep_interval: seconds_from_env("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL)?,
        };
        lease.validate()?;

        let otel_exporter_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "leasekeeper".to_string());

        let metrics_port = match env::var("METRICS_PORT") {
            Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::InvalidPort)?),
            Err(_) => None,
        };

        Ok(Config {
            server_host,
            server_port,
            lease,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn seconds_from_env(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidSeconds { key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("{key} must be a whole number of seconds, got '{value}'")]
    InvalidSeconds { key: &'static str, value: String },

    #[error("Lease intervals must be greater than zero")]
    ZeroInterval,

    #[error("Sweep interval {sweep:?} must be shorter than lease timeout {timeout:?}")]
    SweepIntervalTooLong { sweep: Duration, timeout: Duration },
}
