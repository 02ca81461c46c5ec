//! Server settings.

use std::time::Duration;

use lastcard_transport::DEFAULT_MAX_LINE_LENGTH;

use crate::LastcardError;

/// Environment variable holding the listen address.
pub const ENV_BIND: &str = "LASTCARD_BIND";
/// Environment variable holding the idle timeout in seconds.
pub const ENV_IDLE_TIMEOUT_SECS: &str = "LASTCARD_IDLE_TIMEOUT_SECS";
/// Environment variable holding the longest accepted line in bytes.
pub const ENV_MAX_LINE: &str = "LASTCARD_MAX_LINE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: String,

    /// A connection that sends nothing for this long is dropped.
    pub idle_timeout: Duration,

    /// Longest line accepted from a client, in bytes.
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9090".to_string(),
            idle_timeout: Duration::from_secs(30),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl ServerConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, LastcardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for
    /// anything it doesn't provide.
    ///
    /// # Errors
    /// [`LastcardError::Config`] if a numeric setting doesn't parse or
    /// is zero.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, LastcardError> {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_BIND) {
            config.bind_addr = addr;
        }
        if let Some(secs) = lookup(ENV_IDLE_TIMEOUT_SECS) {
            let secs = parse_positive(ENV_IDLE_TIMEOUT_SECS, &secs)?;
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(len) = lookup(ENV_MAX_LINE) {
            config.max_line_length = parse_positive(ENV_MAX_LINE, &len)? as usize;
        }

        Ok(config)
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64, LastcardError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LastcardError::Config(format!(
            "{key} must be a positive integer, got {value:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:9090");
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.max_line_length, 64 * 1024);
    }

    #[test]
    fn test_from_lookup_empty_gives_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_from_lookup_applies_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_BIND, "0.0.0.0:7000"),
            (ENV_IDLE_TIMEOUT_SECS, "90"),
            (ENV_MAX_LINE, "4096"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:7000");
        assert_eq!(config.idle_timeout, Duration::from_secs(90));
        assert_eq!(config.max_line_length, 4096);
    }

    #[test]
    fn test_from_lookup_rejects_bad_numbers() {
        for bad in ["", "abc", "0", "-5"] {
            let err = ServerConfig::from_lookup(lookup(&[(ENV_IDLE_TIMEOUT_SECS, bad)]))
                .unwrap_err();
            assert!(matches!(err, LastcardError::Config(_)), "accepted {bad:?}");
        }
    }
}
