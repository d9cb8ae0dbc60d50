//! Remote feed store: the three cloud values that hold feeding history
//!
//! All persistent state lives in a remote key-value namespace scoped to the
//! user account. Three keys are used:
//!
//! | Key          | Value                                   |
//! |--------------|-----------------------------------------|
//! | `feed-start` | start of the last completed feeding     |
//! | `feed-end`   | end of the last completed feeding       |
//! | `feed-count` | completed feedings on the end's date    |
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text and the count as a
//! decimal integer. Nothing is retried here; every failure is returned to
//! the caller as a [`RemoteStoreError`].

use core::fmt::{self, Write};

use log::{debug, info};
use thiserror_no_std::Error;

use crate::time::Timestamp;

extern crate alloc;
use alloc::vec::Vec;

/// Maximum length of a stored value.
pub const VALUE_CAPACITY: usize = 32;

/// A value as read from or written to the remote store.
pub type StoreValue = heapless::String<VALUE_CAPACITY>;

/// The logical keys of the feed store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKey {
    Start,
    End,
    Count,
}

impl FeedKey {
    /// Remote name of the key.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "feed-start",
            Self::End => "feed-end",
            Self::Count => "feed-count",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Start => 0,
            Self::End => 1,
            Self::Count => 2,
        }
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    #[error("read failed")]
    ReadFailed,
    #[error("write failed")]
    WriteFailed,
    #[error("stored value could not be parsed")]
    ParseFailed,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{key}: {kind}")]
pub struct RemoteStoreError {
    pub kind: StoreErrorKind,
    pub key: FeedKey,
}

impl RemoteStoreError {
    pub const fn read_failed(key: FeedKey) -> Self {
        Self {
            kind: StoreErrorKind::ReadFailed,
            key,
        }
    }

    pub const fn write_failed(key: FeedKey) -> Self {
        Self {
            kind: StoreErrorKind::WriteFailed,
            key,
        }
    }

    pub const fn parse_failed(key: FeedKey) -> Self {
        Self {
            kind: StoreErrorKind::ParseFailed,
            key,
        }
    }
}

/// String-valued key-value access to the cloud namespace.
///
/// Calls run to completion before returning; the control loop does nothing
/// else while one is in flight.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    async fn read(&mut self, key: FeedKey) -> Result<StoreValue, RemoteStoreError>;

    async fn write(&mut self, key: FeedKey, value: &str) -> Result<(), RemoteStoreError>;
}

/// The most recently completed feeding and the running daily count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSession {
    pub start: Timestamp,
    pub end: Timestamp,
    pub count: u32,
}

/// Typed access to the three feed values on top of a [`RemoteStore`].
pub struct FeedStore<S> {
    remote: S,
}

impl<S: RemoteStore> FeedStore<S> {
    pub fn new(remote: S) -> Self {
        Self { remote }
    }

    pub fn remote(&self) -> &S {
        &self.remote
    }

    pub fn remote_mut(&mut self) -> &mut S {
        &mut self.remote
    }

    /// Hydrate the last completed session with three sequential reads.
    pub async fn load(&mut self) -> Result<FeedSession, RemoteStoreError> {
        info!("Loading feeding history");
        let start = self.read_timestamp(FeedKey::Start).await?;
        let end = self.read_timestamp(FeedKey::End).await?;
        let count = self.read_count().await?;

        let session = FeedSession { start, end, count };
        info!(
            "Last feeding {} - {}, {} today",
            session.start, session.end, session.count
        );
        Ok(session)
    }

    /// Write a completed session with three sequential writes.
    pub async fn push(&mut self, session: &FeedSession) -> Result<(), RemoteStoreError> {
        info!(
            "Saving feeding {} - {} (#{})",
            session.start, session.end, session.count
        );
        self.remote
            .write(FeedKey::Start, &session.start.format())
            .await?;
        self.remote.write(FeedKey::End, &session.end.format()).await?;

        let mut count = StoreValue::new();
        write!(count, "{}", session.count).ok();
        self.remote.write(FeedKey::Count, &count).await
    }

    async fn read_timestamp(&mut self, key: FeedKey) -> Result<Timestamp, RemoteStoreError> {
        let value = self.remote.read(key).await?;
        debug!("{} = {:?}", key, value.as_str());
        Timestamp::parse(&value).map_err(|_| RemoteStoreError::parse_failed(key))
    }

    async fn read_count(&mut self) -> Result<u32, RemoteStoreError> {
        let value = self.remote.read(FeedKey::Count).await?;
        debug!("{} = {:?}", FeedKey::Count, value.as_str());
        value
            .trim()
            .parse()
            .map_err(|_| RemoteStoreError::parse_failed(FeedKey::Count))
    }
}

/// In-memory [`RemoteStore`] for the simulator and tests.
///
/// Reads of a key that was never written fail like an empty cloud feed does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: [Option<StoreValue>; 3],
    reads: Vec<FeedKey>,
    writes: Vec<(FeedKey, StoreValue)>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `session`.
    pub fn with_session(session: &FeedSession) -> Self {
        let mut store = Self::new();
        store.set(FeedKey::Start, &session.start.format());
        store.set(FeedKey::End, &session.end.format());
        let mut count = StoreValue::new();
        write!(count, "{}", session.count).ok();
        store.set(FeedKey::Count, &count);
        store
    }

    /// Overwrite a raw value without recording it as a write.
    pub fn set(&mut self, key: FeedKey, value: &str) {
        let mut stored = StoreValue::new();
        stored.push_str(value).ok();
        self.values[key.index()] = Some(stored);
    }

    pub fn get(&self, key: FeedKey) -> Option<&str> {
        self.values[key.index()].as_ref().map(|v| v.as_str())
    }

    /// Every key read, in order, including failed reads.
    pub fn reads(&self) -> &[FeedKey] {
        &self.reads
    }

    /// Every write in the order it happened.
    pub fn writes(&self) -> &[(FeedKey, StoreValue)] {
        &self.writes
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl RemoteStore for MemoryStore {
    async fn read(&mut self, key: FeedKey) -> Result<StoreValue, RemoteStoreError> {
        self.reads.push(key);
        if self.fail_reads {
            return Err(RemoteStoreError::read_failed(key));
        }
        self.values[key.index()]
            .clone()
            .ok_or(RemoteStoreError::read_failed(key))
    }

    async fn write(&mut self, key: FeedKey, value: &str) -> Result<(), RemoteStoreError> {
        if self.fail_writes {
            return Err(RemoteStoreError::write_failed(key));
        }
        let mut stored = StoreValue::new();
        stored
            .push_str(value)
            .map_err(|_| RemoteStoreError::write_failed(key))?;
        self.values[key.index()] = Some(stored.clone());
        self.writes.push((key, stored));
        Ok(())
    }
}
