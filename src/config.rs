use crate::fetcher::DEFAULT_BATCH_SIZE;
use crate::models::{GoalConfig, GoalMode, PaceYear};
use chrono_tz::Tz;
use reqwest::Url;
use std::{env, path::PathBuf, str::FromStr};
use tracing::warn;

pub const DEFAULT_UPSTREAM: &str = "https://hackatime.hackclub.com/api/v1/users";

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub data_path: PathBuf,
    pub upstream_base_url: Url,
    pub timezone: Tz,
    pub batch_size: usize,
    pub default_username: Option<String>,
    pub goal: GoalConfig,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; unusable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GoalConfig::default();
        let goal = GoalConfig {
            mode: parse_or(&lookup, "GOAL_MODE", GoalMode::Total),
            daily_goal_hours: positive_hours(&lookup, "DAILY_GOAL_HOURS", defaults.daily_goal_hours),
            target_total_hours: positive_hours(&lookup, "TARGET_TOTAL_HOURS", defaults.target_total_hours),
            streak_min_minutes: parse_or(&lookup, "STREAK_MIN_MINUTES", defaults.streak_min_minutes),
            pace_year: parse_or(&lookup, "PACE_YEAR", PaceYear::Calendar),
        };

        let timezone = lookup("APP_TIMEZONE")
            .or_else(|| lookup("TZ"))
            .and_then(|name| match name.trim().parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(err) => {
                    warn!("ignoring timezone '{name}': {err}");
                    None
                }
            })
            .unwrap_or(chrono_tz::UTC);

        let upstream_base_url = lookup("UPSTREAM_BASE_URL")
            .and_then(|raw| match Url::parse(raw.trim()) {
                Ok(url) if !url.cannot_be_a_base() => Some(url),
                Ok(_) => {
                    warn!("ignoring UPSTREAM_BASE_URL '{raw}': not a base url");
                    None
                }
                Err(err) => {
                    warn!("ignoring UPSTREAM_BASE_URL '{raw}': {err}");
                    None
                }
            })
            .unwrap_or_else(default_upstream);

        Self {
            port: parse_or(&lookup, "PORT", 8080),
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/profile.json")),
            upstream_base_url,
            timezone,
            batch_size: parse_or(&lookup, "FETCH_BATCH_SIZE", DEFAULT_BATCH_SIZE).max(1),
            default_username: lookup("DASHBOARD_USERNAME")
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            goal,
        }
    }
}

fn default_upstream() -> Url {
    Url::parse(DEFAULT_UPSTREAM).expect("default upstream url is valid")
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(err) => {
                warn!("ignoring {key}='{raw}': {err}");
                default
            }
        },
        None => default,
    }
}

fn positive_hours<F>(lookup: &F, key: &str, default: f64) -> f64
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("ignoring {key}={value}: must be a positive number");
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = settings(&[]);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.data_path, PathBuf::from("data/profile.json"));
        assert_eq!(settings.upstream_base_url.as_str(), DEFAULT_UPSTREAM);
        assert_eq!(settings.timezone, chrono_tz::UTC);
        assert_eq!(settings.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(settings.default_username, None);
        assert_eq!(settings.goal, GoalConfig::default());
    }

    #[test]
    fn goal_values_are_seeded_from_environment() {
        let settings = settings(&[
            ("GOAL_MODE", "daily"),
            ("DAILY_GOAL_HOURS", "2.5"),
            ("TARGET_TOTAL_HOURS", "500"),
            ("STREAK_MIN_MINUTES", "30"),
            ("PACE_YEAR", "fixed-leap"),
            ("DASHBOARD_USERNAME", " U0123 "),
        ]);
        assert_eq!(settings.goal.mode, GoalMode::Daily);
        assert_eq!(settings.goal.daily_goal_hours, 2.5);
        assert_eq!(settings.goal.target_total_hours, 500.0);
        assert_eq!(settings.goal.streak_min_minutes, 30);
        assert_eq!(settings.goal.pace_year, PaceYear::FixedLeap);
        assert_eq!(settings.default_username.as_deref(), Some("U0123"));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let settings = settings(&[
            ("PORT", "http"),
            ("GOAL_MODE", "weekly"),
            ("DAILY_GOAL_HOURS", "NaN"),
            ("TARGET_TOTAL_HOURS", "-4"),
            ("STREAK_MIN_MINUTES", "-1"),
            ("APP_TIMEZONE", "Mars/Olympus"),
            ("UPSTREAM_BASE_URL", "not a url"),
            ("FETCH_BATCH_SIZE", "0"),
        ]);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.goal, GoalConfig::default());
        assert_eq!(settings.timezone, chrono_tz::UTC);
        assert_eq!(settings.upstream_base_url.as_str(), DEFAULT_UPSTREAM);
        assert_eq!(settings.batch_size, 1);
    }

    #[test]
    fn timezone_prefers_app_setting_over_tz() {
        let berlin = settings(&[("APP_TIMEZONE", "Europe/Berlin"), ("TZ", "Asia/Tokyo")]);
        assert_eq!(berlin.timezone, chrono_tz::Europe::Berlin);

        let tokyo = settings(&[("TZ", "Asia/Tokyo")]);
        assert_eq!(tokyo.timezone, chrono_tz::Asia::Tokyo);
    }
}
