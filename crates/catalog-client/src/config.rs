//! Request-timeout configuration.

use std::time::Duration;

/// Configuration key for the request timeout, in milliseconds.
pub const REQUEST_TIMEOUT_MS: &str = "request_timeout_ms";

/// Default request timeout: 5 minutes.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// String-keyed configuration source.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads configuration from process environment variables, uppercasing the
/// key (`request_timeout_ms` reads `REQUEST_TIMEOUT_MS`).
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvConfig;

impl ConfigSource for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key.to_ascii_uppercase()).ok()
    }
}

/// Resolve the request timeout, read fresh on every call so it can change
/// without restart. Missing, non-numeric, or non-positive values fall back to
/// [`DEFAULT_REQUEST_TIMEOUT`].
pub fn request_timeout(config: &dyn ConfigSource) -> Duration {
    config
        .get(REQUEST_TIMEOUT_MS)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|&ms| ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct MapConfig(HashMap<&'static str, &'static str>);

    impl ConfigSource for MapConfig {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    fn config(value: Option<&'static str>) -> MapConfig {
        let mut map = HashMap::new();
        if let Some(value) = value {
            map.insert(REQUEST_TIMEOUT_MS, value);
        }
        MapConfig(map)
    }

    #[test]
    fn configured_value_wins() {
        let timeout = request_timeout(&config(Some("2500")));
        assert_eq!(timeout, Duration::from_millis(2500));
    }

    #[test]
    fn missing_value_falls_back_to_default() {
        assert_eq!(request_timeout(&config(None)), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn non_numeric_value_falls_back_to_default() {
        assert_eq!(
            request_timeout(&config(Some("soon"))),
            DEFAULT_REQUEST_TIMEOUT
        );
    }

    #[test]
    fn non_positive_value_falls_back_to_default() {
        assert_eq!(request_timeout(&config(Some("0"))), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(
            request_timeout(&config(Some("-100"))),
            DEFAULT_REQUEST_TIMEOUT
        );
    }
}
