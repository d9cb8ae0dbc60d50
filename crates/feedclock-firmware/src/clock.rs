//! Wall clock on top of the Embassy time driver

use embassy_time::Instant;
use feedclock_core::clock::SyncedClock;
use feedclock_core::peripherals::Clock;
use feedclock_core::time::Timestamp;

pub struct EmbassyClock {
    synced: SyncedClock,
}

impl EmbassyClock {
    /// Anchor the time-sync reply to the current monotonic instant.
    pub fn synced_now(local_time: &Timestamp) -> Self {
        Self {
            synced: SyncedClock::new(local_time, Instant::now().as_millis()),
        }
    }
}

impl Clock for EmbassyClock {
    fn now(&mut self) -> Timestamp {
        self.synced.at(Instant::now().as_millis())
    }
}
