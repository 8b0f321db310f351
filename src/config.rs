use serde::Deserialize;
use std::path::PathBuf;

/// The rate limiter replenishes in whole milliseconds.
pub const MAX_RATE_LIMIT_PER_SECOND: u64 = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// JSON file with objective definitions.
    pub catalog_path: Option<PathBuf>,
    /// Remote provider serving `GET /objectives`.
    pub catalog_url: Option<String>,
    /// JSON file of historical campaign rows to derive defaults from.
    pub history_path: Option<PathBuf>,
    /// Remote service that computes estimates instead of the local engine.
    pub estimator_url: Option<String>,
    pub upstream_timeout_secs: u64,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            catalog_path: None,
            catalog_url: None,
            history_path: None,
            estimator_url: None,
            upstream_timeout_secs: 10,
            rate_limit_per_second: 10,
            rate_limit_burst: 20,
        }
    }
}

fn optional_url(value: Option<String>, name: &str) -> anyhow::Result<Option<String>> {
    match value.filter(|s| !s.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => {
            let parsed = url::Url::parse(raw.trim())
                .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
            Ok(Some(raw.trim().trim_end_matches('/').to_string()))
        }
    }
}

fn positive_number<T>(value: Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value {
        None => Ok(default),
        Some(raw) => {
            let parsed: T = raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("{} must be a positive number", name))?;
            if parsed <= T::default() {
                anyhow::bail!("{} must be greater than zero", name);
            }
            Ok(parsed)
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the process environment
    /// in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            port: lookup("PORT")
                .unwrap_or_else(|| defaults.port.to_string())
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))
                .and_then(|port: u16| {
                    if port == 0 {
                        anyhow::bail!("PORT must be a valid number between 1-65535");
                    }
                    Ok(port)
                })?,
            catalog_path: lookup("CATALOG_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            catalog_url: optional_url(lookup("CATALOG_URL"), "CATALOG_URL")?,
            history_path: lookup("HISTORY_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            estimator_url: optional_url(lookup("ESTIMATOR_URL"), "ESTIMATOR_URL")?,
            upstream_timeout_secs: positive_number(
                lookup("UPSTREAM_TIMEOUT_SECS"),
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout_secs,
            )?,
            rate_limit_per_second: positive_number(
                lookup("RATE_LIMIT_PER_SECOND"),
                "RATE_LIMIT_PER_SECOND",
                defaults.rate_limit_per_second,
            )
            .and_then(|rate| {
                if rate > MAX_RATE_LIMIT_PER_SECOND {
                    anyhow::bail!(
                        "RATE_LIMIT_PER_SECOND must be at most {}",
                        MAX_RATE_LIMIT_PER_SECOND
                    );
                }
                Ok(rate)
            })?,
            rate_limit_burst: positive_number(
                lookup("RATE_LIMIT_BURST"),
                "RATE_LIMIT_BURST",
                defaults.rate_limit_burst,
            )?,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        if let Some(ref url) = config.catalog_url {
            tracing::info!("Catalog URL configured: {}", url);
        }
        if let Some(ref path) = config.catalog_path {
            tracing::debug!("Catalog path: {}", path.display());
        }
        if let Some(ref path) = config.history_path {
            tracing::debug!("History path: {}", path.display());
        }
        if let Some(ref url) = config.estimator_url {
            tracing::info!("Delegating estimates to: {}", url);
        }

        Ok(config)
    }
}
