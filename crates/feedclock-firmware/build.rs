//! Captures the device secrets at build time.
//!
//! Values come from the environment, or from a `.env` file next to this
//! crate. Missing values are compiled in empty and rejected at boot.

const SECRETS: [&str; 5] = [
    "WIFI_SSID",
    "WIFI_PASSWORD",
    "AIO_USERNAME",
    "AIO_KEY",
    "TIMEZONE",
];

fn main() {
    if let Err(e) = dotenvy::dotenv() {
        println!("cargo:warning=no .env loaded ({e}), using the process environment");
    }

    for key in SECRETS {
        let value = std::env::var(key).unwrap_or_default();
        println!("cargo:rustc-env={key}={value}");
        println!("cargo:rerun-if-env-changed={key}");
    }
    println!("cargo:rerun-if-changed=.env");

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
