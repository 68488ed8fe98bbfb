use anyhow::{Context, Result};
use std::env;
use std::num::NonZeroU32;
use std::time::Duration;
use nonzero_ext::nonzero;

pub const DEFAULT_BASE_URL: &str = "https://api.covalenthq.com";
pub const DEFAULT_CHAIN: &str = "eth-mainnet";
pub const DEFAULT_OTHER_THRESHOLD: f64 = 100.0;

/// Runtime settings, read once at startup and handed to the services.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chain: String,
    pub other_threshold: f64,
    pub requests_per_second: NonZeroU32,
    pub timeout: Duration,
    pub api_port: u16,
    pub frontend_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            chain: DEFAULT_CHAIN.to_string(),
            other_threshold: DEFAULT_OTHER_THRESHOLD,
            requests_per_second: nonzero!(5u32),
            timeout: Duration::from_secs(30),
            api_port: 8000,
            frontend_port: 3000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let requests_per_second = match var("UPSTREAM_REQUESTS_PER_SECOND") {
            Some(raw) => {
                let n = raw.parse::<u32>().context("UPSTREAM_REQUESTS_PER_SECOND must be an integer")?;
                NonZeroU32::new(n).context("UPSTREAM_REQUESTS_PER_SECOND must be greater than zero")?
            }
            None => defaults.requests_per_second,
        };

        let other_threshold = match var("OTHER_THRESHOLD_USD") {
            Some(raw) => raw.parse::<f64>().context("OTHER_THRESHOLD_USD must be a number")?,
            None => defaults.other_threshold,
        };
        anyhow::ensure!(
            other_threshold.is_finite() && other_threshold > 0.0,
            "OTHER_THRESHOLD_USD must be a positive, finite number"
        );

        let timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().context("UPSTREAM_TIMEOUT_SECS must be an integer")?),
            None => defaults.timeout,
        };

        let api_port = match var("API_PORT") {
            Some(raw) => raw.parse::<u16>().context("API_PORT must be a port number")?,
            None => defaults.api_port,
        };

        let frontend_port = match var("FRONTEND_PORT") {
            Some(raw) => raw.parse::<u16>().context("FRONTEND_PORT must be a port number")?,
            None => defaults.frontend_port,
        };

        Ok(Self {
            api_key: var("COVALENT_API_KEY"),
            base_url: var("COVALENT_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            chain: var("COVALENT_CHAIN").unwrap_or(defaults.chain),
            other_threshold,
            requests_per_second,
            timeout,
            api_port,
            frontend_port,
        })
    }
}
