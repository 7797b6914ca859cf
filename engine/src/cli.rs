use std::num::NonZeroUsize;
use std::time::Duration;

use clap::Parser;

use crate::config::AppConfig;
use crate::error::ConfigError;

/// Command-line overrides on top of `AppConfig::from_env()`.
#[derive(Debug, Parser)]
#[command(name = "engine", version, about = "Synthetic rolling price series")]
pub struct Cli {
    /// Number of bars kept in the series
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Tick cadence in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Starting close for the seeding walk
    #[arg(long)]
    pub initial_price: Option<f64>,

    /// Fixed RNG seed for a reproducible series
    #[arg(long)]
    pub seed: Option<u64>,

    /// View polling cadence in milliseconds
    #[arg(long)]
    pub render_ms: Option<u64>,

    /// Emit JSON logs
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Layer the flags that were given over `cfg` and re-validate.
    pub fn apply(&self, mut cfg: AppConfig) -> Result<AppConfig, ConfigError> {
        if let Some(capacity) = self.capacity {
            cfg.series.capacity = NonZeroUsize::new(capacity)
                .ok_or_else(|| ConfigError::Invalid("capacity must be at least 1".into()))?;
        }
        if let Some(ms) = self.interval_ms {
            cfg.series.tick_interval = Duration::from_millis(ms);
        }
        if let Some(price) = self.initial_price {
            cfg.series.initial_price = price;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(ms) = self.render_ms {
            cfg.render_interval = Duration::from_millis(ms);
        }
        cfg.json_logs |= self.json_logs;

        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "engine",
            "--capacity",
            "30",
            "--interval-ms",
            "250",
            "--seed",
            "5",
            "--json-logs",
        ])
        .unwrap();

        let cfg = cli.apply(AppConfig::default()).unwrap();

        assert_eq!(cfg.series.capacity.get(), 30);
        assert_eq!(cfg.series.tick_interval, Duration::from_millis(250));
        assert_eq!(cfg.seed, Some(5));
        assert!(cfg.json_logs);
        assert_eq!(cfg.series.initial_price, 100.0);
    }

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::try_parse_from(["engine"]).unwrap();
        let base = AppConfig {
            seed: Some(1),
            ..AppConfig::default()
        };

        assert_eq!(cli.apply(base.clone()).unwrap(), base);
    }

    #[test]
    fn invalid_flags_are_rejected() {
        let cli = Cli::try_parse_from(["engine", "--capacity", "0"]).unwrap();
        assert!(cli.apply(AppConfig::default()).is_err());

        let cli = Cli::try_parse_from(["engine", "--interval-ms", "0"]).unwrap();
        assert!(cli.apply(AppConfig::default()).is_err());
    }
}
