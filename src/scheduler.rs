//! Tick scheduler: fans periodic and event callbacks out to loaded drivers.
//!
//! Every dispatch pass walks the descriptor table in declaration order and
//! invokes one hook kind on each loaded driver that lists the matching
//! capability. The four entry points differ only in how they treat the
//! registry transition lock:
//!
//! | entry point        | lock discipline            | on contention        |
//! |--------------------|----------------------------|----------------------|
//! | `tick_second`      | bounded wait               | whole second skipped |
//! | `quick_tick`       | zero wait (`try_lock`)     | cycle skipped        |
//! | `channel_changed`  | none                       | n/a                  |
//! | `append_status`    | bounded wait               | fragment skipped     |
//!
//! Skipped cycles are not queued or retried; the next periodic call is
//! independent.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::driver::Capability;
use crate::registry::DriverRegistry;
use crate::status::StatusPage;

/// Dispatcher over a shared [`DriverRegistry`].
pub struct TickScheduler {
    registry: Arc<DriverRegistry>,
}

impl TickScheduler {
    /// Create a scheduler dispatching against `registry`.
    pub fn new(registry: Arc<DriverRegistry>) -> Self {
        Self { registry }
    }

    /// Once-per-second dispatch.
    ///
    /// Acquires the transition lock with the registry's bounded wait; if the
    /// lock is contended past the bound the entire second is skipped.
    pub fn tick_second(&self) {
        let Some(_guard) = self.registry.lock_transitions() else {
            debug!("registry busy, skipping this second's dispatch");
            return;
        };
        for slot in self.registry.slots() {
            if slot.is_loaded()
                && slot
                    .driver
                    .capabilities()
                    .contains(&Capability::EverySecond)
            {
                slot.driver.on_every_second();
            }
        }
    }

    /// High-frequency dispatch.
    ///
    /// Zero-wait acquire: if anything holds the lock the cycle is dropped
    /// entirely. Blocking here would backpressure time-sensitive drivers,
    /// so correctness favors losing a cycle over stalling.
    pub fn quick_tick(&self) {
        let Some(_guard) = self.registry.try_lock_transitions() else {
            trace!("registry busy, skipping quick tick");
            return;
        };
        for slot in self.registry.slots() {
            if slot.is_loaded()
                && slot.driver.capabilities().contains(&Capability::QuickTick)
            {
                slot.driver.run_quick_tick();
            }
        }
    }

    /// Fan a channel-changed event out to every loaded driver with the
    /// capability.
    ///
    /// Deliberately dispatched WITHOUT the transition lock so the hot path
    /// never waits behind a concurrent start/stop. The per-slot atomic
    /// loaded flags serve as the snapshot: a driver being stopped
    /// concurrently may still observe one final event after its `stop` hook
    /// ran, and a driver being started never observes an event before its
    /// `init` returned (the flag is published after init). Drivers with the
    /// `ChannelChanged` capability must tolerate that window.
    pub fn channel_changed(&self, channel: i32, value: i32) {
        for slot in self.registry.slots() {
            if slot.is_loaded()
                && slot
                    .driver
                    .capabilities()
                    .contains(&Capability::ChannelChanged)
            {
                slot.driver.on_channel_changed(channel, value);
            }
        }
    }

    /// Collect every loaded driver's status fragment, then append the
    /// summary line.
    ///
    /// Format: `<active> drivers active (<names>), total <count>` — the
    /// parenthesized, comma-joined name list (declaration order) is omitted
    /// entirely when no driver is active.
    pub fn append_status(&self, page: &mut StatusPage) {
        let Some(_guard) = self.registry.lock_transitions() else {
            debug!("registry busy, skipping status fragment");
            return;
        };
        let mut active = 0;
        for slot in self.registry.slots() {
            if slot.is_loaded() {
                active += 1;
                if slot
                    .driver
                    .capabilities()
                    .contains(&Capability::StatusInfo)
                {
                    slot.driver.append_status(page);
                }
            }
        }
        let _ = write!(page, "{active} drivers active");
        if active > 0 {
            let mut printed = 0;
            let _ = write!(page, " (");
            for slot in self.registry.slots() {
                if slot.is_loaded() {
                    if printed != 0 {
                        let _ = write!(page, ",");
                    }
                    let _ = write!(page, "{}", slot.driver.name());
                    printed += 1;
                }
            }
            let _ = write!(page, ")");
        }
        let _ = write!(page, ", total {}", self.registry.driver_count());
    }
}
