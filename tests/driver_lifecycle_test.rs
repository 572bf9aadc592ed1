//! Registry lifecycle: idempotent start/stop, wildcard stop, exact hook
//! counts across transitions.

mod common;

use std::sync::Arc;

use common::{Probe, Shared};
use driver_hub::driver::Capability;
use driver_hub::registry::{DriverRegistry, StartOutcome, StopOutcome, StopTarget};

const LIFECYCLE_CAPS: &[Capability] = &[Capability::Init, Capability::Stop];

fn registry_with(probes: &[Arc<Probe>]) -> DriverRegistry {
    let table = probes
        .iter()
        .map(|p| Box::new(Shared(Arc::clone(p))) as Box<dyn driver_hub::driver::Driver>)
        .collect();
    DriverRegistry::new(table).unwrap()
}

#[test]
fn repeated_starts_run_init_once() {
    let probe = Probe::new("NTP", LIFECYCLE_CAPS);
    let registry = registry_with(&[Arc::clone(&probe)]);

    assert_eq!(registry.start("NTP"), StartOutcome::Started);
    assert_eq!(registry.start("NTP"), StartOutcome::AlreadyRunning);
    assert_eq!(registry.start("ntp"), StartOutcome::AlreadyRunning);

    assert_eq!(probe.init_count(), 1);
    assert!(registry.is_running("NTP"));
}

#[test]
fn repeated_stops_run_stop_once() {
    let probe = Probe::new("NTP", LIFECYCLE_CAPS);
    let registry = registry_with(&[Arc::clone(&probe)]);

    registry.start("NTP");
    assert_eq!(
        registry.stop(StopTarget::Named("NTP")),
        StopOutcome::Stopped(1)
    );
    assert_eq!(
        registry.stop(StopTarget::Named("NTP")),
        StopOutcome::NotRunning
    );

    assert_eq!(probe.stop_count(), 1);
    assert!(!registry.is_running("NTP"));
}

#[test]
fn init_runs_once_per_load_cycle() {
    let probe = Probe::new("NTP", LIFECYCLE_CAPS);
    let registry = registry_with(&[Arc::clone(&probe)]);

    registry.start("NTP");
    registry.stop(StopTarget::Named("NTP"));
    registry.start("NTP");

    assert_eq!(probe.init_count(), 2);
    assert_eq!(probe.stop_count(), 1);
}

#[test]
fn net_effect_of_noisy_sequences_is_idempotent() {
    let probe = Probe::new("DGR", LIFECYCLE_CAPS);
    let registry = registry_with(&[Arc::clone(&probe)]);

    for _ in 0..3 {
        registry.start("DGR");
    }
    assert!(registry.is_running("DGR"));
    assert_eq!(probe.init_count(), 1);

    for _ in 0..3 {
        registry.stop(StopTarget::Named("DGR"));
    }
    assert!(!registry.is_running("DGR"));
    assert_eq!(probe.stop_count(), 1);
}

#[test]
fn wildcard_stop_unloads_everything_exactly_once() {
    let a = Probe::new("A", LIFECYCLE_CAPS);
    let b = Probe::new("B", LIFECYCLE_CAPS);
    let c = Probe::new("C", LIFECYCLE_CAPS);
    let registry = registry_with(&[Arc::clone(&a), Arc::clone(&b), Arc::clone(&c)]);

    registry.start("A");
    registry.start("C");

    assert_eq!(registry.stop(StopTarget::AllLoaded), StopOutcome::Stopped(2));
    for probe in [&a, &b, &c] {
        assert!(!registry.is_running(probe.name_str()));
    }
    assert_eq!(a.stop_count(), 1);
    assert_eq!(b.stop_count(), 0);
    assert_eq!(c.stop_count(), 1);

    // Stopping everything again is quiet and counts nothing.
    assert_eq!(registry.stop(StopTarget::AllLoaded), StopOutcome::Stopped(0));
    assert_eq!(a.stop_count(), 1);
}

#[test]
fn shutdown_all_matches_wildcard_stop() {
    let a = Probe::new("A", LIFECYCLE_CAPS);
    let registry = registry_with(&[Arc::clone(&a)]);

    registry.start("A");
    assert_eq!(registry.shutdown_all(), StopOutcome::Stopped(1));
    assert!(!registry.is_running("A"));
}

#[test]
fn unknown_names_do_not_disturb_state() {
    let a = Probe::new("A", LIFECYCLE_CAPS);
    let registry = registry_with(&[Arc::clone(&a)]);
    registry.start("A");

    assert_eq!(registry.start("Ghost"), StartOutcome::Unknown);
    assert_eq!(registry.stop(StopTarget::Named("Ghost")), StopOutcome::Unknown);
    assert!(registry.is_running("A"));
    assert_eq!(a.init_count(), 1);
}

#[test]
fn is_running_tracks_transitions_immediately() {
    let a = Probe::new("A", LIFECYCLE_CAPS);
    let registry = registry_with(&[Arc::clone(&a)]);

    assert!(!registry.is_running("A"));
    registry.start("A");
    assert!(registry.is_running("A"));
    registry.stop(StopTarget::Named("A"));
    assert!(!registry.is_running("A"));
}
