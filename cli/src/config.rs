//! procveil run configuration.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use procveil_policy::{Pid, PID_SPACE_LIMIT};

/// Versioned YAML configuration.
///
/// ```yaml
/// version: 1
/// symbol: find_ge_pid
/// retry_budget: 4194304
/// hide: [1234, 1235]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: u32,

    /// Symbol of the enumeration primitive to hook.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Retry budget for the successor search; defaults to the pid-space size.
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,

    /// Pids hidden at startup.
    #[serde(default)]
    pub hide: Vec<Pid>,
}

fn default_symbol() -> String {
    "find_ge_pid".to_string()
}

fn default_retry_budget() -> u32 {
    PID_SPACE_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            symbol: default_symbol(),
            retry_budget: default_retry_budget(),
            hide: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::parse(&contents)
    }

    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).context("invalid config YAML")?;
        if config.version != 1 {
            bail!(
                "unsupported config version: {} (supported: 1)",
                config.version
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
version: 1
symbol: find_ge_pid
retry_budget: 1000
hide: [10, 20]
"#,
        )
        .unwrap();
        assert_eq!(config.symbol, "find_ge_pid");
        assert_eq!(config.retry_budget, 1000);
        assert_eq!(config.hide, vec![10, 20]);
    }

    #[test]
    fn test_parse_defaults() {
        let config = Config::parse("version: 1\n").unwrap();
        assert_eq!(config.symbol, "find_ge_pid");
        assert_eq!(config.retry_budget, PID_SPACE_LIMIT);
        assert!(config.hide.is_empty());
    }

    #[test]
    fn test_missing_version_rejected() {
        assert!(Config::parse("hide: [1]\n").is_err());
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let err = Config::parse("version: 2\n").unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::parse("version: 1\nshow: [1]\n").is_err());
    }
}
