//! Wall clock seeded once from the time-sync service
//!
//! The board has no battery-backed RTC worth trusting, so at boot the
//! firmware asks the time-sync service for the local time once and from then
//! on advances it with the monotonic tick counter.

use crate::time::Timestamp;

/// A local wall time anchored to a monotonic instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncedClock {
    /// Local seconds at the moment of sync
    synced_secs: i64,
    /// Monotonic milliseconds at the moment of sync
    sync_instant_ms: u64,
}

impl SyncedClock {
    pub fn new(synced: &Timestamp, sync_instant_ms: u64) -> Self {
        Self {
            synced_secs: synced.to_local_secs(),
            sync_instant_ms,
        }
    }

    /// Local time for a monotonic reading taken after the sync.
    ///
    /// Readings from before the sync instant return the synced time itself.
    pub fn at(&self, monotonic_ms: u64) -> Timestamp {
        let since_sync_secs = monotonic_ms.saturating_sub(self.sync_instant_ms) / 1000;
        Timestamp::from_local_secs(self.synced_secs + since_sync_secs as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_with_monotonic_time() {
        let synced =
            Timestamp::from_time_service("2024-03-05 23:59:30.500 065 2 +0100 CET").unwrap();
        let clock = SyncedClock::new(&synced, 10_000);

        assert_eq!(clock.at(10_000).format(), "2024-03-05 23:59:30");
        assert_eq!(clock.at(10_999).format(), "2024-03-05 23:59:30");
        assert_eq!(clock.at(41_000).format(), "2024-03-06 00:00:01");
        assert_eq!(clock.at(41_000).weekday, Some(3));
    }

    #[test]
    fn test_reading_before_sync_is_clamped() {
        let synced = Timestamp::new(2024, 3, 5, 12, 0, 0).unwrap();
        let clock = SyncedClock::new(&synced, 5_000);
        assert_eq!(clock.at(0).format(), "2024-03-05 12:00:00");
    }
}
