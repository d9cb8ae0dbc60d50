//! Build-time secrets: Wi-Fi credentials and the cloud account
//!
//! The firmware fills this from environment variables captured at build
//! time. The same shape can be read from a JSON secrets document:
//!
//! ```json
//! {
//!   "internet": { "ssid": "home", "password": "hunter2" },
//!   "cloud": { "username": "parent", "key": "aio_XXXX", "timezone": "Europe/Paris" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    pub internet: InternetConfig<'a>,
    pub cloud: CloudConfig<'a>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

/// Adafruit IO account used for the feed store and the time-sync service.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
pub struct CloudConfig<'a> {
    pub username: &'a str,
    pub key: &'a str,
    /// IANA zone name, e.g. `America/New_York`
    pub timezone: &'a str,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("secrets document is not valid JSON")]
    InvalidJson,
    #[error("{0} is empty")]
    Missing(&'static str),
}

impl<'a> Config<'a> {
    /// Read a JSON secrets document. Strings are borrowed from `text`.
    pub fn from_json(text: &'a str) -> Result<Self, ConfigError> {
        let (config, _) =
            serde_json_core::from_str::<Config<'a>>(text).map_err(|_| ConfigError::InvalidJson)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject blank values that would only fail later at connect time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.internet.ssid.is_empty() {
            return Err(ConfigError::Missing("internet.ssid"));
        }
        if self.cloud.username.is_empty() {
            return Err(ConfigError::Missing("cloud.username"));
        }
        if self.cloud.key.is_empty() {
            return Err(ConfigError::Missing("cloud.key"));
        }
        if self.cloud.timezone.is_empty() {
            return Err(ConfigError::Missing("cloud.timezone"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let text = r#"{
            "internet": { "ssid": "home", "password": "hunter2" },
            "cloud": { "username": "parent", "key": "aio_XXXX", "timezone": "Europe/Paris" }
        }"#;
        let config = Config::from_json(text).unwrap();
        assert_eq!(config.internet.ssid, "home");
        assert_eq!(config.internet.password, "hunter2");
        assert_eq!(config.cloud.username, "parent");
        assert_eq!(config.cloud.key, "aio_XXXX");
        assert_eq!(config.cloud.timezone, "Europe/Paris");
    }

    #[test]
    fn test_from_json_rejects_blank_key() {
        let text = r#"{
            "internet": { "ssid": "home", "password": "" },
            "cloud": { "username": "parent", "key": "", "timezone": "UTC" }
        }"#;
        assert_eq!(
            Config::from_json(text).unwrap_err(),
            ConfigError::Missing("cloud.key")
        );
    }

    #[test]
    fn test_from_json_rejects_invalid_json() {
        assert_eq!(
            Config::from_json("{ \"internet\": ").unwrap_err(),
            ConfigError::InvalidJson
        );
    }
}
