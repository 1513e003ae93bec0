use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const ENDPOINT_ENV: &str = "ENERGY_TRACKER_ENDPOINT";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub strategy: StrategyConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub endpoint: String,
    pub request_timeout: String,
    pub cache_ttl: String,
    #[serde(default)]
    pub schema: PayloadSchema,
}

/// Field names of the JSON payload. The upstream contract is unverified, so
/// none of these are hard-coded.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PayloadSchema {
    pub records_field: String,
    pub timestamp_field: String,
    pub price_field: String,
    pub volume_field: String,
}

impl Default for PayloadSchema {
    fn default() -> Self {
        Self {
            records_field: "data".to_string(),
            timestamp_field: "timestamp".to_string(),
            price_field: "price".to_string(),
            volume_field: "volume".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    pub fast_period: usize,
    pub slow_period: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub refresh_interval: String,
    pub poll_rate_ms: u64,
    pub range_step: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Parse an interval string (e.g. "10s", "5m", "1h", "1d") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    let s = s.trim();
    if s.len() < 2 {
        bail!("invalid interval '{}': expected format like '5m'", s);
    }

    let suffix_at = s.char_indices().last().map_or(0, |(i, _)| i);
    let (num_str, suffix) = s.split_at(suffix_at);
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

fn parse_interval(s: &str) -> Result<Duration> {
    parse_interval_ms(s).map(Duration::from_millis)
}

impl SourceConfig {
    pub fn request_timeout(&self) -> Result<Duration> {
        parse_interval(&self.request_timeout)
    }

    pub fn cache_ttl(&self) -> Result<Duration> {
        parse_interval(&self.cache_ttl)
    }
}

impl UiConfig {
    pub fn refresh_interval(&self) -> Result<Duration> {
        parse_interval(&self.refresh_interval)
    }

    pub fn range_step(&self) -> Result<Duration> {
        parse_interval(&self.range_step)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = Path::new("config/default.toml");
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let mut config = Self::from_toml(&config_str)
            .context("failed to parse config/default.toml")?;

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                config.source.endpoint = endpoint.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Cache lifetime handed to the fetcher: the configured TTL, capped one
    /// poll period below the refresh interval so each tick finds it expired.
    pub fn effective_cache_ttl(&self) -> Result<Duration> {
        let ttl = self.source.cache_ttl()?;
        let refresh = self.ui.refresh_interval()?;
        let headroom = refresh.saturating_sub(Duration::from_millis(self.ui.poll_rate_ms));
        Ok(ttl.min(headroom))
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.endpoint)
            .with_context(|| format!("source.endpoint '{}' is not a URL", self.source.endpoint))?;
        self.source
            .request_timeout()
            .context("source.request_timeout is invalid")?;
        self.source.cache_ttl().context("source.cache_ttl is invalid")?;
        self.ui
            .refresh_interval()
            .context("ui.refresh_interval is invalid")?;
        self.ui.range_step().context("ui.range_step is invalid")?;

        let StrategyConfig {
            fast_period,
            slow_period,
        } = self.strategy;
        if fast_period == 0 || fast_period >= slow_period {
            bail!(
                "strategy periods must satisfy 0 < fast_period < slow_period (got {} / {})",
                fast_period,
                slow_period
            );
        }
        Ok(())
    }
}
