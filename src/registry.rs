//! Driver registry: ownership of the descriptor table's loaded state.
//!
//! The registry is an explicit context object constructed once at process
//! start — there is no global table and no lazily created lock. Table
//! membership and order are fixed at construction (the firmware picks its
//! driver set at build configuration time); the only thing that varies at
//! runtime is each slot's `loaded` flag, and the registry is the only
//! component allowed to toggle it.
//!
//! Two concurrency disciplines meet here:
//!
//! - `start`/`stop` and the tick dispatches in [`crate::scheduler`] hold the
//!   transition mutex, acquired with a bounded wait (or zero wait for the
//!   quick tick). A failed acquire drops the operation for this invocation;
//!   the next periodic call is independent and self-healing.
//! - `is_running` and channel-changed dispatch read the per-slot atomic
//!   loaded flags without the lock. These reads are advisory point-in-time
//!   answers, not transactionally consistent with concurrent transitions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::driver::{Capability, Driver};
use crate::error::{HubError, HubResult};

/// Default bound for transition/tick lock waits, matching the firmware's
/// 100-tick semaphore wait.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(100);

/// One descriptor table entry: the driver value plus its runtime flag.
pub(crate) struct DriverSlot {
    pub(crate) driver: Box<dyn Driver>,
    loaded: AtomicBool,
}

impl DriverSlot {
    /// Advisory read of the loaded flag.
    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    fn set_loaded(&self, value: bool) {
        self.loaded.store(value, Ordering::Release);
    }
}

/// Result of a [`DriverRegistry::start`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The driver transitioned to loaded; `init` ran if present.
    Started,
    /// The driver was already loaded; nothing re-ran. Idempotent success.
    AlreadyRunning,
    /// No descriptor matched the name; state unchanged.
    Unknown,
    /// The transition lock could not be acquired within the bound; the
    /// request was dropped, not queued.
    Busy,
}

/// Target of a [`DriverRegistry::stop`] call.
///
/// Replaces the console-level `"*"` sentinel with an explicit enumeration;
/// the console layer parses the wildcard into [`StopTarget::AllLoaded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopTarget<'a> {
    /// Stop one driver by (case-insensitive) name.
    Named(&'a str),
    /// Stop every currently loaded driver.
    AllLoaded,
}

/// Result of a [`DriverRegistry::stop`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// This many drivers transitioned to unloaded (may be zero for
    /// [`StopTarget::AllLoaded`] when nothing was running).
    Stopped(usize),
    /// The named driver exists but was not running; no side effects.
    NotRunning,
    /// No descriptor matched the name; state unchanged.
    Unknown,
    /// The transition lock could not be acquired within the bound.
    Busy,
}

/// Registry owning the fixed descriptor table and its loaded flags.
pub struct DriverRegistry {
    slots: Box<[DriverSlot]>,
    /// Guards loaded-state transitions and tick dispatch. Constructed
    /// eagerly with the registry; never acquired recursively.
    transitions: Mutex<()>,
    lock_timeout: Duration,
}

impl DriverRegistry {
    /// Build a registry from the ordered driver table.
    ///
    /// Declaration order is semantically significant: every dispatch pass
    /// walks the table in this order, so later drivers may assume earlier
    /// ones already ran within the same tick cycle.
    ///
    /// Fails if a name is empty or collides case-insensitively with an
    /// earlier entry.
    pub fn new(drivers: Vec<Box<dyn Driver>>) -> HubResult<Self> {
        for (i, driver) in drivers.iter().enumerate() {
            let name = driver.name();
            if name.is_empty() {
                return Err(HubError::EmptyDriverName);
            }
            if drivers[..i]
                .iter()
                .any(|other| other.name().eq_ignore_ascii_case(name))
            {
                return Err(HubError::DuplicateDriverName(name.to_string()));
            }
        }
        let slots = drivers
            .into_iter()
            .map(|driver| DriverSlot {
                driver,
                loaded: AtomicBool::new(false),
            })
            .collect();
        Ok(Self {
            slots,
            transitions: Mutex::new(()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// Override the bounded-wait limit used by transitions and the
    /// once-per-second dispatch.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Number of descriptors in the table, loaded or not.
    pub fn driver_count(&self) -> usize {
        self.slots.len()
    }

    /// Names of every known descriptor, in declaration order.
    pub fn driver_names(&self) -> Vec<&'static str> {
        self.slots.iter().map(|s| s.driver.name()).collect()
    }

    /// Advisory, lock-free check whether a driver is currently loaded.
    ///
    /// Intended for feature detection ("is a power meter active?"); the
    /// answer may be stale by the time the caller acts on it.
    pub fn is_running(&self, name: &str) -> bool {
        self.slots
            .iter()
            .any(|s| s.is_loaded() && s.driver.name().eq_ignore_ascii_case(name))
    }

    /// Whether any power-metering driver is active.
    pub fn is_measuring_power(&self) -> bool {
        self.is_running("TestPower")
    }

    /// Start a driver by case-insensitive name.
    ///
    /// Idempotent: starting a loaded driver logs and succeeds without
    /// re-running `init`. The loaded flag is published only after `init`
    /// returns, so lock-free readers never observe a half-initialized
    /// driver.
    pub fn start(&self, name: &str) -> StartOutcome {
        let Some(_guard) = self.lock_transitions() else {
            warn!(driver = name, "registry busy, start request dropped");
            return StartOutcome::Busy;
        };
        for slot in self.slots.iter() {
            if !slot.driver.name().eq_ignore_ascii_case(name) {
                continue;
            }
            if slot.is_loaded() {
                info!(driver = slot.driver.name(), "driver is already loaded");
                return StartOutcome::AlreadyRunning;
            }
            if slot.driver.capabilities().contains(&Capability::Init) {
                slot.driver.init();
            }
            slot.set_loaded(true);
            info!(driver = slot.driver.name(), "driver started");
            return StartOutcome::Started;
        }
        warn!(driver = name, "driver is not known in this build");
        info!(available = %self.driver_names().join(", "), "available drivers");
        StartOutcome::Unknown
    }

    /// Stop one named driver, or every loaded driver.
    ///
    /// For each matching loaded descriptor the `stop` hook (if present) runs
    /// and the loaded flag is cleared. A named driver that exists but is not
    /// running logs "not running"; [`StopTarget::AllLoaded`] stays silent
    /// about already-unloaded entries so a stop-everything sweep does not
    /// spam the log.
    pub fn stop(&self, target: StopTarget<'_>) -> StopOutcome {
        let Some(_guard) = self.lock_transitions() else {
            warn!(?target, "registry busy, stop request dropped");
            return StopOutcome::Busy;
        };
        let mut stopped = 0;
        let mut matched_not_running = false;
        for slot in self.slots.iter() {
            let matches = match target {
                StopTarget::Named(name) => slot.driver.name().eq_ignore_ascii_case(name),
                StopTarget::AllLoaded => true,
            };
            if !matches {
                continue;
            }
            if slot.is_loaded() {
                if slot.driver.capabilities().contains(&Capability::Stop) {
                    slot.driver.stop();
                }
                slot.set_loaded(false);
                stopped += 1;
                info!(driver = slot.driver.name(), "driver stopped");
            } else if let StopTarget::Named(name) = target {
                info!(driver = name, "driver not running");
                matched_not_running = true;
            }
        }
        match target {
            StopTarget::AllLoaded => StopOutcome::Stopped(stopped),
            StopTarget::Named(_) if stopped > 0 => StopOutcome::Stopped(stopped),
            StopTarget::Named(_) if matched_not_running => StopOutcome::NotRunning,
            // Unknown exact name: no match, and deliberately no log spam.
            StopTarget::Named(_) => StopOutcome::Unknown,
        }
    }

    /// Stop every loaded driver; for orderly process teardown.
    pub fn shutdown_all(&self) -> StopOutcome {
        self.stop(StopTarget::AllLoaded)
    }

    /// The descriptor table, for dispatch passes.
    pub(crate) fn slots(&self) -> &[DriverSlot] {
        &self.slots
    }

    /// Bounded-wait acquire of the transition lock.
    pub(crate) fn lock_transitions(&self) -> Option<MutexGuard<'_, ()>> {
        self.transitions.try_lock_for(self.lock_timeout)
    }

    /// Zero-wait acquire of the transition lock, for the quick-tick path.
    pub(crate) fn try_lock_transitions(&self) -> Option<MutexGuard<'_, ()>> {
        self.transitions.try_lock()
    }
}
