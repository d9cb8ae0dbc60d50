//! HTTPS transport for Adafruit IO
//!
//! URL building and body (de)serialisation live in `feedclock_core::cloud`;
//! this module only moves bytes. Each request opens its own TLS session over
//! the shared TCP client and closes it when done.

use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::TcpClient;
use esp_hal::rng::Rng;
use feedclock_core::app_state::AppError;
use feedclock_core::cloud::{
    AIO_KEY_HEADER, AdafruitIo, BODY_CAPACITY, decode_value, encode_value,
};
use feedclock_core::config::CloudConfig;
use feedclock_core::store::{FeedKey, RemoteStore, RemoteStoreError, StoreValue};
use feedclock_core::time::{Timestamp, TimestampParseError};
use log::{debug, info, warn};
use reqwless::client::{HttpClient, TlsConfig, TlsVerify};
use reqwless::headers::ContentType;
use reqwless::request::{Method, RequestBuilder};
use thiserror_no_std::Error;

/// TLS record buffers; a full TLS record is 16 KiB plus overhead
pub const TLS_BUFFER_SIZE: usize = 16_640;

/// Response head and body
pub const RESPONSE_BUFFER_SIZE: usize = 4_096;

/// Per-socket TCP buffers
pub const TCP_BUFFER_SIZE: usize = 4_096;

pub type AioTcpClient = TcpClient<'static, 1, TCP_BUFFER_SIZE, TCP_BUFFER_SIZE>;

/// Buffers borrowed by every request, allocated once at boot.
pub struct HttpBuffers {
    pub tls_read: [u8; TLS_BUFFER_SIZE],
    pub tls_write: [u8; TLS_BUFFER_SIZE],
    pub response: [u8; RESPONSE_BUFFER_SIZE],
}

impl HttpBuffers {
    pub const fn new() -> Self {
        Self {
            tls_read: [0; TLS_BUFFER_SIZE],
            tls_write: [0; TLS_BUFFER_SIZE],
            response: [0; RESPONSE_BUFFER_SIZE],
        }
    }
}

impl Default for HttpBuffers {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("request failed: {0:?}")]
    Request(reqwless::Error),
    #[error("server answered {0}")]
    Status(u16),
}

impl From<reqwless::Error> for HttpError {
    fn from(err: reqwless::Error) -> Self {
        HttpError::Request(err)
    }
}

pub struct AioClient {
    tcp: &'static AioTcpClient,
    dns: &'static DnsSocket<'static>,
    aio: AdafruitIo<'static>,
    buffers: &'static mut HttpBuffers,
    rng: Rng,
}

impl AioClient {
    pub fn new(
        tcp: &'static AioTcpClient,
        dns: &'static DnsSocket<'static>,
        config: &CloudConfig<'static>,
        buffers: &'static mut HttpBuffers,
        rng: Rng,
    ) -> Self {
        Self {
            tcp,
            dns,
            aio: AdafruitIo::new(config),
            buffers,
            rng,
        }
    }

    /// Ask the time-sync service for the current local time.
    pub async fn fetch_time(&mut self) -> Result<Timestamp, AppError> {
        let url = self.aio.time_url().map_err(AppError::clock_sync)?;
        info!("Syncing clock");
        let reply = self
            .get(&url, |body| {
                core::str::from_utf8(body)
                    .map_err(|_| TimestampParseError::Malformed)
                    .and_then(Timestamp::from_time_service)
            })
            .await
            .map_err(AppError::clock_sync)?;
        let now = reply.map_err(AppError::clock_sync)?;
        info!("Local time is {}", now);
        Ok(now)
    }

    fn tls_seed(&mut self) -> u64 {
        (self.rng.random() as u64) << 32 | self.rng.random() as u64
    }

    async fn get<R>(&mut self, url: &str, parse: impl FnOnce(&[u8]) -> R) -> Result<R, HttpError> {
        let seed = self.tls_seed();
        let tls = TlsConfig::new(
            seed,
            &mut self.buffers.tls_read,
            &mut self.buffers.tls_write,
            TlsVerify::None,
        );
        let mut client = HttpClient::new_with_tls(self.tcp, self.dns, tls);
        let headers = [(AIO_KEY_HEADER, self.aio.key())];

        let mut request = client.request(Method::GET, url).await?.headers(&headers);
        let response = request.send(&mut self.buffers.response).await?;
        if !response.status.is_successful() {
            return Err(HttpError::Status(response.status.0));
        }
        let body = response.body().read_to_end().await?;
        Ok(parse(body))
    }

    async fn post_json(&mut self, url: &str, body: &[u8]) -> Result<(), HttpError> {
        let seed = self.tls_seed();
        let tls = TlsConfig::new(
            seed,
            &mut self.buffers.tls_read,
            &mut self.buffers.tls_write,
            TlsVerify::None,
        );
        let mut client = HttpClient::new_with_tls(self.tcp, self.dns, tls);
        let headers = [(AIO_KEY_HEADER, self.aio.key())];

        let mut request = client
            .request(Method::POST, url)
            .await?
            .headers(&headers)
            .content_type(ContentType::ApplicationJson)
            .body(body);
        let response = request.send(&mut self.buffers.response).await?;
        if !response.status.is_successful() {
            return Err(HttpError::Status(response.status.0));
        }
        Ok(())
    }
}

impl RemoteStore for AioClient {
    async fn read(&mut self, key: FeedKey) -> Result<StoreValue, RemoteStoreError> {
        let url = self
            .aio
            .last_value_url(key)
            .map_err(|_| RemoteStoreError::read_failed(key))?;
        debug!("GET {}", key);

        match self.get(&url, decode_value).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("{}: {}", key, e);
                Err(RemoteStoreError::read_failed(key))
            }
            Err(e) => {
                warn!("{}: {}", key, e);
                Err(RemoteStoreError::read_failed(key))
            }
        }
    }

    async fn write(&mut self, key: FeedKey, value: &str) -> Result<(), RemoteStoreError> {
        let url = self
            .aio
            .create_value_url(key)
            .map_err(|_| RemoteStoreError::write_failed(key))?;
        let mut body = [0u8; BODY_CAPACITY];
        let len = encode_value(value, &mut body).map_err(|e| {
            warn!("{}: {}", key, e);
            RemoteStoreError::write_failed(key)
        })?;
        debug!("POST {} = {}", key, value);

        self.post_json(&url, &body[..len]).await.map_err(|e| {
            warn!("{}: {}", key, e);
            RemoteStoreError::write_failed(key)
        })
    }
}
