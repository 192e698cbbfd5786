//! Engine configuration (§6 environment knobs), loaded once at process start.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::NaiveTime;

use crate::types::Coordinates;

/// All environment-sourced knobs the engine needs. Unset optional knobs
/// disable the tier they gate (no `VROOM_URL` means C2 is never called; no
/// `OSRM_URL` means the Travel Oracle chain goes straight to tier 3).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the external route-optimizer (VROOM-like). `None` disables C2.
    pub route_optimizer_url: Option<String>,
    /// Base URL of the road-network table service (OSRM-like). `None` skips tier 2.
    pub road_network_url: Option<String>,
    /// Fallback base coordinate used when a crew carries none of its own.
    pub fallback_base: Coordinates,
    /// Per-crew daily Assignment cap (`K`).
    pub crew_daily_limit: u32,
    /// Shift-tolerance fraction applied to the base-return cut-off.
    pub overrun_fraction: f64,
    /// Commercial service codes that must execute during `daytime_window`.
    pub daytime_codes: HashSet<i32>,
    /// `[DAY_START, DAY_END)` window commercial daytime OS must fall within.
    pub daytime_window: (NaiveTime, NaiveTime),
    /// Average road speed (km/h) used by the great-circle fallback tier.
    pub average_speed_kmh: f64,
    /// Seed for the Candidate Selector's GA/SA/ACO pipeline (§5, P8).
    pub selector_seed: u64,
    /// Directory the rolling daily log file is written under.
    pub logs_dir: String,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let route_optimizer_url = std::env::var("VROOM_URL").ok().filter(|s| !s.is_empty());
        let road_network_url = std::env::var("OSRM_URL").ok().filter(|s| !s.is_empty());

        let base_lon = env_f64("BASE_LON", 14.4378)?;
        let base_lat = env_f64("BASE_LAT", 50.0755)?;

        let crew_daily_limit = env_parse("K", 15u32)?;
        let overrun_fraction = env_f64("OVERRUN_FRACTION", 0.01)?;
        let average_speed_kmh = env_f64("AVG_SPEED_KMH", 30.0)?;
        let selector_seed = env_parse("SELECTOR_SEED", 42u64)?;

        let daytime_codes = match std::env::var("DAYTIME_CODES") {
            Ok(raw) if !raw.is_empty() => raw
                .split(',')
                .map(|s| s.trim().parse::<i32>().context("DAYTIME_CODES must be a comma-separated list of integers"))
                .collect::<Result<HashSet<i32>>>()?,
            _ => [739, 741].into_iter().collect(),
        };

        let day_start = env_time("DAY_START", NaiveTime::from_hms_opt(8, 0, 0).unwrap())?;
        let day_end = env_time("DAY_END", NaiveTime::from_hms_opt(18, 0, 0).unwrap())?;

        let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "./logs".to_string());

        Ok(Self {
            route_optimizer_url,
            road_network_url,
            fallback_base: Coordinates::new(base_lat, base_lon),
            crew_daily_limit,
            overrun_fraction,
            daytime_codes,
            daytime_window: (day_start, day_end),
            average_speed_kmh,
            selector_seed,
            logs_dir,
        })
    }
}

fn env_f64(key: &str, default: f64) -> Result<f64> {
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => raw.parse().with_context(|| format!("{key} must be a number")),
        _ => Ok(default),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        _ => Ok(default),
    }
}

fn env_time(key: &str, default: NaiveTime) -> Result<NaiveTime> {
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => {
            NaiveTime::parse_from_str(&raw, "%H:%M").with_context(|| format!("{key} must be HH:MM"))
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_all() {
        for key in [
            "VROOM_URL", "OSRM_URL", "BASE_LON", "BASE_LAT", "K", "OVERRUN_FRACTION",
            "DAYTIME_CODES", "DAY_START", "DAY_END", "AVG_SPEED_KMH", "SELECTOR_SEED", "LOGS_DIR",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn defaults_match_spec_when_nothing_is_set() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        let config = EngineConfig::from_env().unwrap();
        assert!(config.route_optimizer_url.is_none());
        assert!(config.road_network_url.is_none());
        assert_eq!(config.crew_daily_limit, 15);
        assert_eq!(config.overrun_fraction, 0.01);
        assert_eq!(config.daytime_codes, [739, 741].into_iter().collect());
        assert_eq!(config.average_speed_kmh, 30.0);
        clear_all();
    }

    #[test]
    fn empty_vroom_url_is_treated_as_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        std::env::set_var("VROOM_URL", "");
        let config = EngineConfig::from_env().unwrap();
        assert!(config.route_optimizer_url.is_none());
        clear_all();
    }

    #[test]
    fn daytime_codes_parsed_from_csv() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        std::env::set_var("DAYTIME_CODES", "100, 200,300");
        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.daytime_codes, [100, 200, 300].into_iter().collect());
        clear_all();
    }
}
