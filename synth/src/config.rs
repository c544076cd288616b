use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[cfg(windows)]
const DEFAULT_PORT: &str = "COM4";
#[cfg(not(windows))]
const DEFAULT_PORT: &str = "/dev/ttyUSB1";

#[cfg(windows)]
const DEFAULT_PATCH_NAMES: &str = ".\\patchnames.txt";
#[cfg(not(windows))]
const DEFAULT_PATCH_NAMES: &str = "/opt/xfm2/bin/patchnames.txt";

pub const DEFAULT_BAUD_RATE: u32 = 500_000;

/// Deployment settings. Framing is always 8 data bits, 1 stop bit, no parity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: String,
    pub baud_rate: u32,
    pub patch_names: PathBuf,
    /// How long one serial read waits before polling again.
    pub poll_interval_ms: u64,
    /// Give up on a response after this long. `None` waits forever.
    pub response_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_owned(),
            baud_rate: DEFAULT_BAUD_RATE,
            patch_names: PathBuf::from(DEFAULT_PATCH_NAMES),
            poll_interval_ms: 100,
            response_timeout_ms: None,
        }
    }
}

impl Config {
    /// Reads a JSON config. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults_match_hardware_setup() {
        let config = Config::default();
        assert_eq!(config.baud_rate, 500_000);
        assert_eq!(config.response_timeout_ms, None);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "port": "/dev/ttyACM0", "response_timeout_ms": 250 }"#)
            .unwrap();

        assert_eq!(config.port, "/dev/ttyACM0");
        assert_eq!(config.response_timeout_ms, Some(250));
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.patch_names, PathBuf::from(DEFAULT_PATCH_NAMES));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            Config::from_json("{ port: "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("xfm2ctl-does-not-exist.json");
        assert!(matches!(Config::from_file(&path), Err(Error::Io(_))));
    }
}
