//! Fake LED-controller driver, for testing channel-event plumbing.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::driver::{Capability, Driver};
use crate::status::StatusPage;

const CAPS: &[Capability] = &[
    Capability::Init,
    Capability::QuickTick,
    Capability::StatusInfo,
    Capability::ChannelChanged,
];

/// Simulated LED chip driver.
///
/// Latches the last channel-changed event the way a real LED driver latches
/// a brightness write, and counts quick ticks standing in for the
/// bit-banged refresh a real chip would need.
pub struct TestLedDriver {
    last_change: Mutex<Option<(i32, i32)>>,
    refreshes: AtomicU32,
}

impl TestLedDriver {
    /// Create an idle driver.
    pub fn new() -> Self {
        Self {
            last_change: Mutex::new(None),
            refreshes: AtomicU32::new(0),
        }
    }

    /// The most recent `(channel, value)` event, if any.
    pub fn last_change(&self) -> Option<(i32, i32)> {
        *self.last_change.lock()
    }
}

impl Default for TestLedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for TestLedDriver {
    fn name(&self) -> &'static str {
        "TestLED"
    }

    fn capabilities(&self) -> &'static [Capability] {
        CAPS
    }

    fn init(&self) {
        *self.last_change.lock() = None;
        self.refreshes.store(0, Ordering::Relaxed);
    }

    fn run_quick_tick(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    fn append_status(&self, page: &mut StatusPage) {
        match self.last_change() {
            Some((channel, value)) => {
                let _ = writeln!(page, "LED: channel {channel} = {value}");
            }
            None => {
                let _ = writeln!(page, "LED: no channel writes yet");
            }
        }
    }

    fn on_channel_changed(&self, channel: i32, value: i32) {
        debug!(channel, value, "test led latched channel write");
        *self.last_change.lock() = Some((channel, value));
    }
}
