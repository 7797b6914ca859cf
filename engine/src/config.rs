use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_CAPACITY: &str = "SERIES_CAPACITY";
pub const ENV_TICK_INTERVAL_MS: &str = "TICK_INTERVAL_MS";
pub const ENV_INITIAL_PRICE: &str = "SERIES_INITIAL_PRICE";
pub const ENV_SEED: &str = "SERIES_SEED";
pub const ENV_RENDER_INTERVAL_MS: &str = "RENDER_INTERVAL_MS";
pub const ENV_APP_ENV: &str = "APP_ENV";

/// Shape of the rolling series owned by one engine.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesConfig {
    /// Number of bars kept; also the number seeded at construction.
    pub capacity: NonZeroUsize,

    /// Cadence of the tick scheduler. Seed labels are spaced by the same amount.
    pub tick_interval: Duration,

    /// Close the seeding walk starts from.
    pub initial_price: f64,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(market::rolling_buffer::DEFAULT_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            tick_interval: Duration::from_millis(2_000),
            initial_price: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub series: SeriesConfig,

    /// Fixed RNG seed for reproducible runs. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// How often the view polls for a changed snapshot.
    pub render_interval: Duration,

    /// Emit JSON log lines instead of the pretty formatter.
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            series: SeriesConfig::default(),
            seed: None,
            render_interval: Duration::from_millis(2_000),
            json_logs: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(capacity) = parse_var::<usize, _>(&lookup, ENV_CAPACITY)? {
            cfg.series.capacity = NonZeroUsize::new(capacity)
                .ok_or_else(|| ConfigError::Invalid("capacity must be at least 1".into()))?;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_TICK_INTERVAL_MS)? {
            cfg.series.tick_interval = Duration::from_millis(ms);
        }
        if let Some(price) = parse_var::<f64, _>(&lookup, ENV_INITIAL_PRICE)? {
            cfg.series.initial_price = price;
        }
        cfg.seed = parse_var::<u64, _>(&lookup, ENV_SEED)?;
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_RENDER_INTERVAL_MS)? {
            cfg.render_interval = Duration::from_millis(ms);
        }
        cfg.json_logs = lookup(ENV_APP_ENV).is_some_and(|v| v == "production");

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.series.tick_interval.is_zero() {
            return Err(ConfigError::Invalid("tick interval must be positive".into()));
        }
        if self.render_interval.is_zero() {
            return Err(ConfigError::Invalid("render interval must be positive".into()));
        }
        if !self.series.initial_price.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "initial price must be finite, got {}",
                self.series.initial_price
            )));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::Parse { key, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_reference_behaviour() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(cfg.series.capacity.get(), 100);
        assert_eq!(cfg.series.tick_interval, Duration::from_millis(2_000));
        assert_eq!(cfg.series.initial_price, 100.0);
        assert_eq!(cfg.seed, None);
        assert!(!cfg.json_logs);
    }

    #[test]
    fn env_values_override_defaults() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            (ENV_CAPACITY, "20"),
            (ENV_TICK_INTERVAL_MS, "500"),
            (ENV_INITIAL_PRICE, "42.5"),
            (ENV_SEED, "9"),
            (ENV_APP_ENV, "production"),
        ]))
        .unwrap();

        assert_eq!(cfg.series.capacity.get(), 20);
        assert_eq!(cfg.series.tick_interval, Duration::from_millis(500));
        assert_eq!(cfg.series.initial_price, 42.5);
        assert_eq!(cfg.seed, Some(9));
        assert!(cfg.json_logs);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_CAPACITY, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_TICK_INTERVAL_MS, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_value_names_the_variable() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_CAPACITY, "lots")])).unwrap_err();

        assert_eq!(
            err,
            ConfigError::Parse {
                key: ENV_CAPACITY,
                value: "lots".into()
            }
        );
    }

    #[test]
    fn non_finite_initial_price_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_INITIAL_PRICE, "inf")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
