use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Variant;

pub const DEFAULT_API_BASE: &str = "https://lichess.org/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LEADERBOARD_SIZE: u32 = 50;
const DEFAULT_RESULTS_NB: u32 = 10;
const DEFAULT_GAMES_MAX: u32 = 10;
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub timeout: Duration,
    pub leaderboard_size: u32,
    pub results_nb: u32,
    pub games_max: u32,
    pub default_variant: Variant,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            results_nb: DEFAULT_RESULTS_NB,
            games_max: DEFAULT_GAMES_MAX,
            default_variant: Variant::Rapid,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl Config {
    /// Loads `.env.local` and `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let timeout_secs = parse_u64(lookup("LICHESS_TIMEOUT_SECS"))
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        Self {
            api_base: parse_base_url(lookup("LICHESS_API_BASE")),
            timeout: Duration::from_secs(timeout_secs),
            leaderboard_size: parse_clamped(
                lookup("LEADERBOARD_SIZE"),
                DEFAULT_LEADERBOARD_SIZE,
                1,
                200,
            ),
            results_nb: parse_clamped(lookup("TOURNAMENT_RESULTS_NB"), DEFAULT_RESULTS_NB, 1, 100),
            games_max: parse_clamped(lookup("RECENT_GAMES_MAX"), DEFAULT_GAMES_MAX, 1, 100),
            default_variant: lookup("DEFAULT_VARIANT")
                .and_then(|raw| Variant::from_key(raw.trim()))
                .unwrap_or(Variant::Rapid),
            log_dir: lookup("CHESS_LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        }
    }
}

fn parse_base_url(raw: Option<String>) -> String {
    match raw {
        Some(val) if !val.trim().is_empty() => val.trim().trim_end_matches('/').to_string(),
        _ => DEFAULT_API_BASE.to_string(),
    }
}

fn parse_u64(raw: Option<String>) -> Option<u64> {
    raw.and_then(|val| val.trim().parse::<u64>().ok())
}

fn parse_clamped(raw: Option<String>, default: u32, min: u32, max: u32) -> u32 {
    raw.and_then(|val| val.trim().parse::<u32>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.leaderboard_size, 50);
        assert_eq!(cfg.results_nb, 10);
        assert_eq!(cfg.games_max, 10);
        assert_eq!(cfg.default_variant, Variant::Rapid);
        assert_eq!(cfg.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let cfg = config_from(&[("LICHESS_API_BASE", "http://127.0.0.1:9000/api/ ")]);
        assert_eq!(cfg.api_base, "http://127.0.0.1:9000/api");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = config_from(&[
            ("LEADERBOARD_SIZE", "5000"),
            ("TOURNAMENT_RESULTS_NB", "0"),
            ("LICHESS_TIMEOUT_SECS", "0"),
        ]);
        assert_eq!(cfg.leaderboard_size, 200);
        assert_eq!(cfg.results_nb, 1);
        assert_eq!(cfg.timeout, Duration::from_secs(1));
    }

    #[test]
    fn garbage_values_fall_back() {
        let cfg = config_from(&[("RECENT_GAMES_MAX", "lots"), ("DEFAULT_VARIANT", "atomic")]);
        assert_eq!(cfg.games_max, 10);
        assert_eq!(cfg.default_variant, Variant::Rapid);
    }

    #[test]
    fn variant_override_is_honoured() {
        let cfg = config_from(&[("DEFAULT_VARIANT", "blitz")]);
        assert_eq!(cfg.default_variant, Variant::Blitz);
    }
}
