//! Adafruit IO REST wire format
//!
//! Only the request shapes and reply decoding live here so they can be
//! tested on the host. The firmware owns the HTTPS transport.
//!
//! - read: `GET {base}/{user}/feeds/{feed}/data/last`, reply
//!   `{"value": "...", ...}`
//! - write: `POST {base}/{user}/feeds/{feed}/data`, body `{"value": "..."}`
//! - time sync: `GET {base}/{user}/integrations/time/strftime?...`, plain
//!   text reply parsed by [`Timestamp::from_time_service`](crate::time::Timestamp::from_time_service)
//!
//! Every request carries the account key in the `X-AIO-Key` header, except
//! the time service which takes it as a query parameter.

use core::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::config::CloudConfig;
use crate::store::{FeedKey, StoreValue};

pub const AIO_BASE_URL: &str = "https://io.adafruit.com/api/v2";
pub const AIO_KEY_HEADER: &str = "X-AIO-Key";

/// `strftime` pattern for the time service, already URL-encoded.
///
/// Produces `YYYY-MM-DD HH:MM:SS.mmm DDD W ±ZZZZ TZ`.
pub const TIME_SERVICE_FORMAT: &str = "%25Y-%25m-%25d+%25H%3A%25M%3A%25S.%25L+%25j+%25u+%25z+%25Z";

pub const URL_CAPACITY: usize = 256;
pub type Url = heapless::String<URL_CAPACITY>;

/// Room for `{"value":"..."}` around the longest stored value.
pub const BODY_CAPACITY: usize = 64;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudError {
    #[error("request URL too long")]
    UrlTooLong,
    #[error("request body too large")]
    BodyTooLarge,
    #[error("malformed reply")]
    MalformedResponse,
}

#[derive(Serialize, Deserialize, Debug)]
struct DataPoint<'a> {
    value: &'a str,
}

/// Request builder for one Adafruit IO account.
#[derive(Debug, Clone, Copy)]
pub struct AdafruitIo<'a> {
    username: &'a str,
    key: &'a str,
    timezone: &'a str,
}

impl<'a> AdafruitIo<'a> {
    pub fn new(config: &CloudConfig<'a>) -> Self {
        Self {
            username: config.username,
            key: config.key,
            timezone: config.timezone,
        }
    }

    /// Value for the [`AIO_KEY_HEADER`] header.
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// URL returning the latest value of a feed.
    pub fn last_value_url(&self, feed: FeedKey) -> Result<Url, CloudError> {
        let mut url = Url::new();
        write!(
            url,
            "{}/{}/feeds/{}/data/last",
            AIO_BASE_URL,
            self.username,
            feed.name()
        )
        .map_err(|_| CloudError::UrlTooLong)?;
        Ok(url)
    }

    /// URL appending a value to a feed.
    pub fn create_value_url(&self, feed: FeedKey) -> Result<Url, CloudError> {
        let mut url = Url::new();
        write!(
            url,
            "{}/{}/feeds/{}/data",
            AIO_BASE_URL,
            self.username,
            feed.name()
        )
        .map_err(|_| CloudError::UrlTooLong)?;
        Ok(url)
    }

    /// URL of the time service for the configured timezone.
    pub fn time_url(&self) -> Result<Url, CloudError> {
        let mut url = Url::new();
        write!(
            url,
            "{}/{}/integrations/time/strftime?x-aio-key={}&tz={}&fmt={}",
            AIO_BASE_URL,
            self.username,
            QueryValue(self.key),
            QueryValue(self.timezone),
            TIME_SERVICE_FORMAT
        )
        .map_err(|_| CloudError::UrlTooLong)?;
        Ok(url)
    }
}

/// Percent-encodes a query parameter value, leaving the `/` of zone names
/// as is.
struct QueryValue<'a>(&'a str);

impl fmt::Display for QueryValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                    f.write_char(byte as char)?
                }
                _ => write!(f, "%{:02X}", byte)?,
            }
        }
        Ok(())
    }
}

/// Encode a write request body into `buf`, returning its length.
pub fn encode_value(value: &str, buf: &mut [u8]) -> Result<usize, CloudError> {
    serde_json_core::to_slice(&DataPoint { value }, buf).map_err(|_| CloudError::BodyTooLarge)
}

/// Extract the `value` field of a data-point reply.
///
/// Other fields of the reply (ids, timestamps, location) are skipped.
pub fn decode_value(body: &[u8]) -> Result<StoreValue, CloudError> {
    let (point, _) = serde_json_core::from_slice::<DataPoint<'_>>(body)
        .map_err(|_| CloudError::MalformedResponse)?;

    let mut value = StoreValue::new();
    value
        .push_str(point.value)
        .map_err(|_| CloudError::MalformedResponse)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> CloudConfig<'static> {
        CloudConfig {
            username: "parent",
            key: "aio_KEY",
            timezone: "Europe/Paris",
        }
    }

    #[test]
    fn test_feed_urls() {
        let io = AdafruitIo::new(&account());
        assert_eq!(
            io.last_value_url(FeedKey::End).unwrap(),
            "https://io.adafruit.com/api/v2/parent/feeds/feed-end/data/last"
        );
        assert_eq!(
            io.create_value_url(FeedKey::Count).unwrap(),
            "https://io.adafruit.com/api/v2/parent/feeds/feed-count/data"
        );
        assert_eq!(io.key(), "aio_KEY");
    }

    #[test]
    fn test_time_url() {
        let io = AdafruitIo::new(&account());
        let url = io.time_url().unwrap();
        assert!(url.starts_with(
            "https://io.adafruit.com/api/v2/parent/integrations/time/strftime?x-aio-key=aio_KEY&tz=Europe/Paris&fmt="
        ));
        assert!(url.ends_with("%25j+%25u+%25z+%25Z"));
    }

    #[test]
    fn test_time_url_escapes_timezone() {
        let config = CloudConfig {
            timezone: "Etc/GMT+5",
            ..account()
        };
        let url = AdafruitIo::new(&config).time_url().unwrap();
        assert!(url.contains("&tz=Etc/GMT%2B5&fmt="));

        let config = CloudConfig {
            timezone: "Etc/GMT-3",
            ..account()
        };
        let url = AdafruitIo::new(&config).time_url().unwrap();
        assert!(url.contains("&tz=Etc/GMT-3&fmt="));
    }

    #[test]
    fn test_url_too_long() {
        let long_name = "x".repeat(300);
        let config = CloudConfig {
            username: &long_name,
            key: "k",
            timezone: "UTC",
        };
        let io = AdafruitIo::new(&config);
        assert_eq!(
            io.last_value_url(FeedKey::Start).unwrap_err(),
            CloudError::UrlTooLong
        );
    }

    #[test]
    fn test_encode_value() {
        let mut buf = [0u8; BODY_CAPACITY];
        let len = encode_value("2024-03-05 09:04:07", &mut buf).unwrap();
        assert_eq!(&buf[..len], br#"{"value":"2024-03-05 09:04:07"}"#);
    }

    #[test]
    fn test_encode_value_overflow() {
        let mut buf = [0u8; 8];
        assert_eq!(
            encode_value("2024-03-05 09:04:07", &mut buf).unwrap_err(),
            CloudError::BodyTooLarge
        );
    }

    #[test]
    fn test_decode_full_reply() {
        let body = br#"{"id":"0FBYN4ZKJ2XKGQ3NN0ZGQ3J8HJ","value":"2024-03-05 09:04:07","feed_id":2511231,"feed_key":"feed-end","created_at":"2024-03-05T08:04:08Z","location":null,"lat":null,"lon":null,"ele":null,"created_epoch":1709625848,"expiration":"2024-04-04T08:04:08Z"}"#;
        assert_eq!(decode_value(body).unwrap(), "2024-03-05 09:04:07");
    }

    #[test]
    fn test_decode_count_reply() {
        assert_eq!(decode_value(br#"{"value":"5"}"#).unwrap(), "5");
    }

    #[test]
    fn test_decode_error_reply() {
        let body = br#"{"error":"not found - API documentation can be found at https://io.adafruit.com/api/docs"}"#;
        assert_eq!(
            decode_value(body).unwrap_err(),
            CloudError::MalformedResponse
        );
        assert_eq!(
            decode_value(b"<html>").unwrap_err(),
            CloudError::MalformedResponse
        );
    }
}
