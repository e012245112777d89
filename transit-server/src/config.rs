//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::fares::FareSourceConfig;
use crate::ratelimit::RateLimitConfig;

/// Error returned when an environment variable cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {name}: {value:?} ({reason})")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything `main` needs to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (`BIND_ADDR`)
    pub bind_addr: SocketAddr,

    /// Directory served under `/static` (`STATIC_DIR`)
    pub static_dir: PathBuf,

    /// On-disk fare snapshot replacing the bundled one (`FARES_PATH`)
    pub fares_path: Option<PathBuf>,

    /// Remote fare snapshot (`FARES_URL`, `FARE_CACHE_TTL_SECS`)
    pub fares: FareSourceConfig,

    /// `RATE_LIMIT_MAX`, `RATE_LIMIT_WINDOW_MS`, `TRUST_FORWARDED_FOR`
    pub rate_limit: RateLimitConfig,

    /// Contact delivery key (`API_SECRET_KEY`)
    pub api_secret_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: PathBuf::from("static"),
            fares_path: None,
            fares: FareSourceConfig::default(),
            rate_limit: RateLimitConfig::default(),
            api_secret_key: None,
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which returns the value of
    /// a variable if set. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(addr) = parse(&var, "BIND_ADDR")? {
            config.bind_addr = addr;
        }
        if let Some(dir) = var("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        config.fares_path = var("FARES_PATH").map(PathBuf::from);

        config.fares.url = var("FARES_URL");
        if let Some(secs) = parse::<u64>(&var, "FARE_CACHE_TTL_SECS")? {
            if secs == 0 {
                return Err(ConfigError {
                    name: "FARE_CACHE_TTL_SECS",
                    value: secs.to_string(),
                    reason: "TTL must be positive".to_string(),
                });
            }
            config.fares = config.fares.with_ttl(Duration::from_secs(secs));
        }

        if let Some(max) = parse(&var, "RATE_LIMIT_MAX")? {
            config.rate_limit = config.rate_limit.with_max_requests(max);
        }
        if let Some(ms) = parse::<u64>(&var, "RATE_LIMIT_WINDOW_MS")? {
            if ms == 0 {
                return Err(ConfigError {
                    name: "RATE_LIMIT_WINDOW_MS",
                    value: ms.to_string(),
                    reason: "window must be positive".to_string(),
                });
            }
            config.rate_limit = config.rate_limit.with_window(Duration::from_millis(ms));
        }
        if let Some(trust) = parse::<bool>(&var, "TRUST_FORWARDED_FOR")? {
            config.rate_limit = config.rate_limit.with_trust_forwarded_for(trust);
        }

        config.api_secret_key = var("API_SECRET_KEY");

        Ok(config)
    }
}

fn parse<T>(var: impl Fn(&str) -> Option<String>, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|value| {
            value.parse().map_err(|e: T::Err| ConfigError {
                name,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}
