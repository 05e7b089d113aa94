//! Server settings.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `LINKWATCH_*` environment variables. Command line flags are applied
//! on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Runtime settings for the overlay server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Address the session server listens on.
    pub listen: String,
    /// Path to the JSON topology and load document.
    pub topology: PathBuf,
    /// Interval between scheduled highlight builds, in milliseconds.
    pub period_ms: u64,
    /// How often the topology document is checked for changes, in milliseconds.
    pub reload_ms: u64,
    /// Initial traffic threshold for new sessions, in kilobytes/sec.
    pub threshold_kbps: u64,
    /// Per-session outbound message buffer.
    pub channel_buffer: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8181".to_string(),
            topology: PathBuf::from("topology.json"),
            period_ms: 200,
            reload_ms: 1000,
            threshold_kbps: 0,
            channel_buffer: 64,
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("LINKWATCH").try_parsing(true))
            .build()
            .context("Failed to read settings")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Invalid settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.period_ms == 0 {
            anyhow::bail!("period_ms must be greater than zero");
        }
        if self.reload_ms == 0 {
            anyhow::bail!("reload_ms must be greater than zero");
        }
        if self.channel_buffer == 0 {
            anyhow::bail!("channel_buffer must be greater than zero");
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn reload_interval(&self) -> Duration {
        Duration::from_millis(self.reload_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.listen, "127.0.0.1:8181");
        assert_eq!(settings.period(), Duration::from_millis(200));
        assert_eq!(settings.threshold_kbps, 0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
listen = "0.0.0.0:9000"
threshold_kbps = 10
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.listen, "0.0.0.0:9000");
        assert_eq!(settings.threshold_kbps, 10);
        // untouched keys keep their defaults
        assert_eq!(settings.period_ms, 200);
        assert_eq!(settings.topology, PathBuf::from("topology.json"));
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "period_ms = 0").unwrap();

        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("period_ms"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/linkwatch.toml"))).is_err());
    }
}
