//! Orchestrator settings read from the environment.

use std::env;
use std::time::Duration;

pub const ENABLE_TOOL_RETRY_ENV: &str = "ENABLE_TOOL_RETRY";
pub const MAX_TOOL_RETRIES_ENV: &str = "MAX_TOOL_RETRIES";
pub const MAX_ROUND_TRIPS_ENV: &str = "MAX_ROUND_TRIPS";
pub const KEEP_ALIVE_SECS_ENV: &str = "KEEP_ALIVE_SECS";

pub const DEFAULT_MAX_TOOL_RETRIES: usize = 2;
pub const DEFAULT_MAX_ROUND_TRIPS: u32 = 10;
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Enables repeated-call detection. On unless `ENABLE_TOOL_RETRY` is
    /// literally `false`.
    pub detect_repeated_calls: bool,
    pub max_tool_retries: usize,
    pub max_round_trips: u32,
    pub keep_alive_interval: Duration,
    pub tool_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            detect_repeated_calls: true,
            max_tool_retries: DEFAULT_MAX_TOOL_RETRIES,
            max_round_trips: DEFAULT_MAX_ROUND_TRIPS,
            keep_alive_interval: DEFAULT_KEEP_ALIVE,
            tool_timeout: None,
        }
    }
}

impl OrchestratorConfig {
    /// Unset or unparsable variables keep their defaults.
    ///
    /// ```rust
    /// use lchat::OrchestratorConfig;
    ///
    /// let config = OrchestratorConfig::from_lookup(|name| match name {
    ///     "ENABLE_TOOL_RETRY" => Some("false".to_string()),
    ///     "MAX_ROUND_TRIPS" => Some("4".to_string()),
    ///     "KEEP_ALIVE_SECS" => Some("soon".to_string()),
    ///     _ => None,
    /// });
    ///
    /// assert!(!config.detect_repeated_calls);
    /// assert_eq!(config.max_round_trips, 4);
    /// assert_eq!(config.keep_alive_interval.as_secs(), 30);
    /// ```
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |name: &str| lookup(name).and_then(|value| value.trim().parse::<u64>().ok());

        Self {
            detect_repeated_calls: lookup(ENABLE_TOOL_RETRY_ENV)
                .map_or(defaults.detect_repeated_calls, |value| value.trim() != "false"),
            max_tool_retries: parsed(MAX_TOOL_RETRIES_ENV)
                .and_then(|value| usize::try_from(value).ok())
                .unwrap_or(defaults.max_tool_retries),
            max_round_trips: parsed(MAX_ROUND_TRIPS_ENV)
                .and_then(|value| u32::try_from(value).ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.max_round_trips),
            keep_alive_interval: parsed(KEEP_ALIVE_SECS_ENV)
                .filter(|value| *value > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.keep_alive_interval),
            tool_timeout: None,
        }
    }

    pub fn with_repeated_call_detection(mut self, enabled: bool) -> Self {
        self.detect_repeated_calls = enabled;
        self
    }

    pub fn with_max_tool_retries(mut self, max_tool_retries: usize) -> Self {
        self.max_tool_retries = max_tool_retries;
        self
    }

    pub fn with_max_round_trips(mut self, max_round_trips: u32) -> Self {
        self.max_round_trips = max_round_trips;
        self
    }

    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_environment_keeps_defaults() {
        assert_eq!(OrchestratorConfig::from_lookup(|_| None), OrchestratorConfig::default());
    }

    #[test]
    fn detection_is_on_by_default() {
        assert!(OrchestratorConfig::default().detect_repeated_calls);
        assert!(OrchestratorConfig::from_lookup(|_| None).detect_repeated_calls);
    }

    #[test]
    fn only_literal_false_disables_detection() {
        let with_flag = |flag: &'static str| {
            OrchestratorConfig::from_lookup(move |name| {
                (name == ENABLE_TOOL_RETRY_ENV).then(|| flag.to_string())
            })
        };
        assert!(!with_flag("false").detect_repeated_calls);
        assert!(!with_flag(" false ").detect_repeated_calls);
        assert!(with_flag("0").detect_repeated_calls);
        assert!(with_flag("true").detect_repeated_calls);
    }

    #[test]
    fn zero_round_trips_falls_back_to_default() {
        let config = OrchestratorConfig::from_lookup(|name| {
            (name == MAX_ROUND_TRIPS_ENV).then(|| "0".to_string())
        });
        assert_eq!(config.max_round_trips, DEFAULT_MAX_ROUND_TRIPS);
    }
}
