//! Secrets compiled in by `build.rs`

use feedclock_core::config::{CloudConfig, Config, InternetConfig};

pub const WIFI_SSID: &str = env!("WIFI_SSID");
pub const WIFI_PASSWORD: &str = env!("WIFI_PASSWORD");
pub const AIO_USERNAME: &str = env!("AIO_USERNAME");
pub const AIO_KEY: &str = env!("AIO_KEY");
pub const TIMEZONE: &str = env!("TIMEZONE");

pub const fn config() -> Config<'static> {
    Config {
        internet: InternetConfig {
            ssid: WIFI_SSID,
            password: WIFI_PASSWORD,
        },
        cloud: CloudConfig {
            username: AIO_USERNAME,
            key: AIO_KEY,
            timezone: TIMEZONE,
        },
    }
}
