//! Driver descriptor contract.
//!
//! A driver is a value implementing [`Driver`]: a build-time name plus a set
//! of independently optional lifecycle/event hooks. Which hooks a driver
//! actually implements is declared through [`Driver::capabilities`] — the
//! registry and scheduler dispatch a hook only when the matching
//! [`Capability`] is listed, so "this driver has no quick tick" is an
//! expected state, not an error.
//!
//! Hooks take `&self`; a driver keeps its mutable state behind interior
//! mutability (a `Mutex`, atomics, …). That is what allows channel-changed
//! events to be fanned out without holding the registry lock.

use crate::status::StatusPage;

/// Runtime capability flags for driver introspection.
///
/// Mirrors the optional hooks of [`Driver`] as an enum so callers can query
/// what a driver supports without probing each hook individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Has one-time setup to run on the unloaded → loaded transition.
    Init,
    /// Wants the once-per-second tick.
    EverySecond,
    /// Wants the high-frequency, non-blocking tick.
    QuickTick,
    /// Renders a fragment into the status page.
    StatusInfo,
    /// Has teardown to run on the loaded → unloaded transition.
    Stop,
    /// Wants channel-changed events.
    ChannelChanged,
}

/// A loadable peripheral/protocol handler.
///
/// Implementations provide a fixed, non-empty name (unique within a registry
/// under case-insensitive comparison) and override the hooks matching their
/// declared capabilities. Every hook has a no-op default, so a minimal
/// driver only implements `name` and `capabilities`.
///
/// # Caller contract
///
/// Hooks are invoked from the registry's dispatch paths, most of them while
/// the registry transition lock is held. A hook must return promptly and
/// must not call back into `DriverRegistry::start`/`stop` synchronously —
/// the lock is not reentrant and doing so deadlocks.
pub trait Driver: Send + Sync {
    /// Build-time driver name; the only external handle.
    fn name(&self) -> &'static str;

    /// The hooks this driver actually implements.
    fn capabilities(&self) -> &'static [Capability];

    /// One-time setup, invoked exactly once per unloaded → loaded transition.
    fn init(&self) {}

    /// Once-per-second periodic work.
    fn on_every_second(&self) {}

    /// High-frequency periodic work; must never block.
    fn run_quick_tick(&self) {}

    /// Render a status fragment.
    fn append_status(&self, page: &mut StatusPage) {
        let _ = page;
    }

    /// Teardown, invoked exactly once per loaded → unloaded transition.
    fn stop(&self) {}

    /// A channel value changed.
    ///
    /// Dispatched without the registry lock; see
    /// [`TickScheduler::channel_changed`](crate::scheduler::TickScheduler::channel_changed)
    /// for the exact delivery contract.
    fn on_channel_changed(&self, channel: i32, value: i32) {
        let _ = (channel, value);
    }
}
