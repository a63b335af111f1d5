//! Controller configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::omxplayer::{DEFAULT_DESTINATION, DEFAULT_OBJECT_PATH};

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
  /// Bus name the player registered (matches omxplayer's `--dbus_name`).
  #[serde(default = "default_destination")]
  pub destination: String,

  /// Object path the player exports its interfaces on.
  #[serde(default = "default_object_path")]
  pub object_path: String,

  /// Readiness polling interval in milliseconds.
  #[serde(default = "default_poll_interval_ms")]
  pub poll_interval_ms: u64,

  /// Upper bound for a single round trip (None = wait for the transport).
  #[serde(default)]
  pub call_timeout_ms: Option<u64>,

  /// Custom bus address file (None = `/tmp/omxplayerdbus.$USER`).
  #[serde(default)]
  pub address_file: Option<String>,
}

fn default_destination() -> String {
  DEFAULT_DESTINATION.to_string()
}

fn default_object_path() -> String {
  DEFAULT_OBJECT_PATH.to_string()
}

fn default_poll_interval_ms() -> u64 {
  50
}

impl Default for ControllerConfig {
  fn default() -> Self {
    Self {
      destination: default_destination(),
      object_path: default_object_path(),
      poll_interval_ms: default_poll_interval_ms(),
      call_timeout_ms: None,
      address_file: None,
    }
  }
}

impl ControllerConfig {
  /// Parse a JSON document; missing keys take their defaults.
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  /// Validate configuration values.
  pub fn validate(&self) -> Result<(), String> {
    if self.destination.trim().is_empty() {
      return Err("Destination bus name cannot be empty".to_string());
    }
    if !self.object_path.starts_with('/') {
      return Err("Object path must start with '/'".to_string());
    }
    if self.poll_interval_ms < 1 || self.poll_interval_ms > 10_000 {
      return Err("Poll interval must be between 1 and 10000 milliseconds".to_string());
    }
    if self.call_timeout_ms == Some(0) {
      return Err("Call timeout must be greater than zero".to_string());
    }
    Ok(())
  }

  pub fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }

  pub fn call_timeout(&self) -> Option<Duration> {
    self.call_timeout_ms.map(Duration::from_millis)
  }

  pub fn address_file(&self) -> Option<PathBuf> {
    self
      .address_file
      .as_ref()
      .filter(|s| !s.is_empty())
      .map(PathBuf::from)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = ControllerConfig::default();
    assert_eq!(config.destination, "org.mpris.MediaPlayer2.omxplayer");
    assert_eq!(config.object_path, "/org/mpris/MediaPlayer2");
    assert_eq!(config.poll_interval(), Duration::from_millis(50));
    assert_eq!(config.call_timeout(), None);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_partial_json() {
    let config =
      ControllerConfig::from_json(r#"{"destination":"org.mpris.MediaPlayer2.omxplayer1","callTimeoutMs":2000}"#)
        .unwrap();
    assert_eq!(config.destination, "org.mpris.MediaPlayer2.omxplayer1");
    assert_eq!(config.object_path, "/org/mpris/MediaPlayer2");
    assert_eq!(config.call_timeout(), Some(Duration::from_secs(2)));
    assert_eq!(config.address_file(), None);
  }

  #[test]
  fn test_validate_rejects() {
    let mut config = ControllerConfig::default();
    config.poll_interval_ms = 0;
    assert!(config.validate().is_err());

    let mut config = ControllerConfig::default();
    config.object_path = "org/mpris".into();
    assert!(config.validate().is_err());

    let mut config = ControllerConfig::default();
    config.destination = "  ".into();
    assert!(config.validate().is_err());

    let mut config = ControllerConfig::default();
    config.call_timeout_ms = Some(0);
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_empty_address_file_is_default() {
    let mut config = ControllerConfig::default();
    config.address_file = Some(String::new());
    assert_eq!(config.address_file(), None);
    config.address_file = Some("/run/omx.addr".into());
    assert_eq!(config.address_file(), Some(PathBuf::from("/run/omx.addr")));
  }
}
