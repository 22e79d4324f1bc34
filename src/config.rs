use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Simulator period when nothing else is configured.
pub const DEFAULT_TICK_MS: u64 = 3000;
/// Lower bound for the simulator period.
pub const MIN_TICK_MS: u64 = 100;
pub const DEFAULT_LOG_FILE: &str = "mldash.log";
/// TUI event poll timeout.
pub const EVENT_POLL_MS: u64 = 16;

pub const ENV_TICK_MS: &str = "MLDASH_TICK_MS";
pub const ENV_SEED: &str = "MLDASH_SEED";

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    pub tick_interval: Duration,
    pub seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            seed: None,
        }
    }
}

impl DashboardConfig {
    /// Flags win over `MLDASH_*` environment variables, which win over defaults.
    pub fn from_env_and_args(
        tick_ms_arg: Option<u64>,
        seed_arg: Option<u64>,
    ) -> Result<Self> {
        Self::resolve(
            tick_ms_arg,
            seed_arg,
            std::env::var(ENV_TICK_MS).ok(),
            std::env::var(ENV_SEED).ok(),
        )
    }

    pub(crate) fn resolve(
        tick_ms_arg: Option<u64>,
        seed_arg: Option<u64>,
        tick_ms_env: Option<String>,
        seed_env: Option<String>,
    ) -> Result<Self> {
        let tick_ms = match tick_ms_arg {
            Some(ms) => ms,
            None => parse_env_u64(ENV_TICK_MS, tick_ms_env)?.unwrap_or(DEFAULT_TICK_MS),
        };
        let tick_ms = if tick_ms < MIN_TICK_MS {
            warn!(
                "Tick interval {}ms is below the minimum, using {}ms",
                tick_ms, MIN_TICK_MS
            );
            MIN_TICK_MS
        } else {
            tick_ms
        };

        let seed = match seed_arg {
            Some(seed) => Some(seed),
            None => parse_env_u64(ENV_SEED, seed_env)?,
        };

        let cfg = Self {
            tick_interval: Duration::from_millis(tick_ms),
            seed,
        };
        info!("Dashboard config: tick={}ms seed={:?}", tick_ms, cfg.seed);
        Ok(cfg)
    }
}

fn parse_env_u64(name: &str, raw: Option<String>) -> Result<Option<u64>> {
    match raw {
        None => Ok(None),
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u64>()
                .map(Some)
                .with_context(|| format!("Invalid {}: '{}'", name, trimmed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = DashboardConfig::resolve(None, None, None, None).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.tick_interval, Duration::from_millis(3000));
    }

    #[test]
    fn test_args_override_env() {
        let cfg = DashboardConfig::resolve(
            Some(500),
            Some(1),
            Some("2000".to_string()),
            Some("2".to_string()),
        )
        .unwrap();
        assert_eq!(cfg.tick_interval, Duration::from_millis(500));
        assert_eq!(cfg.seed, Some(1));
    }

    #[test]
    fn test_env_used_when_no_args() {
        let cfg = DashboardConfig::resolve(None, None, Some(" 1500 ".to_string()), Some("9".to_string()))
            .unwrap();
        assert_eq!(cfg.tick_interval, Duration::from_millis(1500));
        assert_eq!(cfg.seed, Some(9));
    }

    #[test]
    fn test_invalid_env_is_rejected() {
        let err = DashboardConfig::resolve(None, None, Some("fast".to_string()), None).unwrap_err();
        assert!(err.to_string().contains(ENV_TICK_MS));
    }

    #[test]
    fn test_tick_clamped_to_minimum() {
        let cfg = DashboardConfig::resolve(Some(5), None, None, None).unwrap();
        assert_eq!(cfg.tick_interval, Duration::from_millis(MIN_TICK_MS));
    }
}
