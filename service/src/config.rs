use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

pub const ENV_PREFIX: &str = "OMCI";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_BODY_LIMIT_MB: usize = 256;

const BYTES_PER_MB: usize = 1024 * 1024;

/// Raw settings as read from `OMCI_*` variables (or a `.env` file).
/// Values stay strings until `ServiceConfig::from_settings` checks them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnvSettings {
    pub bind_addr: Option<String>,
    pub data_dir: Option<String>,
    pub body_limit_mb: Option<String>,
}

impl EnvSettings {
    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

/// Runtime settings of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub body_limit_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            body_limit_bytes: DEFAULT_BODY_LIMIT_MB * BYTES_PER_MB,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from `.env` and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let settings = EnvSettings::from_source(config::Environment::with_prefix(ENV_PREFIX))?;
        Ok(Self::from_settings(settings))
    }

    /// Unparseable values are logged and replaced by the default.
    pub fn from_settings(settings: EnvSettings) -> Self {
        let defaults = Self::default();

        let bind_addr = match settings.bind_addr {
            Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
                warn!("Invalid OMCI_BIND_ADDR '{}': {}, using {}", raw, e, DEFAULT_BIND_ADDR);
                defaults.bind_addr
            }),
            None => defaults.bind_addr,
        };

        let data_dir = settings
            .data_dir
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let body_limit_bytes = match settings.body_limit_mb {
            Some(raw) => match raw.trim().parse::<usize>().ok().filter(|mb| *mb > 0) {
                Some(mb) => mb.checked_mul(BYTES_PER_MB).unwrap_or_else(|| {
                    warn!("OMCI_BODY_LIMIT_MB '{}' is too large, using {} MB", raw, DEFAULT_BODY_LIMIT_MB);
                    defaults.body_limit_bytes
                }),
                None => {
                    warn!("Invalid OMCI_BODY_LIMIT_MB '{}', using {} MB", raw, DEFAULT_BODY_LIMIT_MB);
                    defaults.body_limit_bytes
                }
            },
            None => defaults.body_limit_bytes,
        };

        Self { bind_addr, data_dir, body_limit_bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> EnvSettings {
        let builder = pairs.iter().fold(config::Config::builder(), |builder, (key, value)| {
            builder.set_override(*key, *value).unwrap()
        });
        builder.build().unwrap().try_deserialize().unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(ServiceConfig::from_settings(settings(&[])), ServiceConfig::default());
        assert_eq!(ServiceConfig::default().bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_settings(settings(&[
            ("bind_addr", "0.0.0.0:9000"),
            ("data_dir", "/var/lib/omci"),
            ("body_limit_mb", "16"),
        ]));

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/omci"));
        assert_eq!(config.body_limit_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ServiceConfig::from_settings(settings(&[
            ("bind_addr", "not-an-address"),
            ("data_dir", "  "),
            ("body_limit_mb", "0"),
        ]));

        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_oversized_body_limit_falls_back() {
        let max = usize::MAX.to_string();
        let config = ServiceConfig::from_settings(settings(&[("body_limit_mb", max.as_str())]));
        assert_eq!(config.body_limit_bytes, DEFAULT_BODY_LIMIT_MB * 1024 * 1024);
    }
}
