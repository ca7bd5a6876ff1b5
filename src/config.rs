//! Link timing configuration

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Timing knobs of the accessory link.
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Minimum spacing between two effective ticks.
    pub tick_interval_ms: u64,
    /// Advanced-mode liveness window, renewed by every accepted response.
    pub advanced_window_ms: u64,
    /// Missed deadlines tolerated before the accessory is declared gone.
    pub grace_misses: u8,
    pub metadata_timeout_ms: u64,
    /// Keep-alive fires once less than this remains before the deadline.
    pub keepalive_margin_ms: u64,
    /// Spacing between simulated button press and release.
    pub button_delay_ms: u64,
    pub max_inbound_per_tick: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
            advanced_window_ms: 2000,
            grace_misses: 1,
            metadata_timeout_ms: 2000,
            keepalive_margin_ms: 750,
            button_delay_ms: 50,
            max_inbound_per_tick: 256,
        }
    }
}

impl LinkConfig {
    /// Load a JSON config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading link config {}", path.display()))?;
        let config: LinkConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing link config {}", path.display()))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "Link config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be positive");
        }
        if self.advanced_window_ms == 0 {
            bail!("advanced_window_ms must be positive");
        }
        if self.metadata_timeout_ms == 0 {
            bail!("metadata_timeout_ms must be positive");
        }
        if self.max_inbound_per_tick == 0 {
            bail!("max_inbound_per_tick must be positive");
        }
        if self.keepalive_margin_ms >= self.advanced_window_ms {
            bail!(
                "keepalive_margin_ms ({}) must be shorter than advanced_window_ms ({})",
                self.keepalive_margin_ms,
                self.advanced_window_ms
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = LinkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.advanced_window_ms, 2000);
        assert_eq!(config.keepalive_margin_ms, 750);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "advanced_window_ms": 500, "keepalive_margin_ms": 200 }}"#).unwrap();

        let config = LinkConfig::load(file.path()).unwrap();
        assert_eq!(config.advanced_window_ms, 500);
        assert_eq!(config.keepalive_margin_ms, 200);
        assert_eq!(config.metadata_timeout_ms, 2000);
        assert_eq!(config.button_delay_ms, 50);
    }

    #[test]
    fn margin_longer_than_window_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "advanced_window_ms": 500 }}"#).unwrap();

        let err = LinkConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("keepalive_margin_ms"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LinkConfig::load("/nonexistent/podlink.json").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/podlink.json"));
    }
}
