//! Fake power-metering socket driver, for testing without the chip.

use std::fmt::Write as _;

use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

use crate::driver::{Capability, Driver};
use crate::status::StatusPage;

const CAPS: &[Capability] = &[
    Capability::Init,
    Capability::EverySecond,
    Capability::StatusInfo,
    Capability::Stop,
];

#[derive(Debug, Clone, Copy)]
struct Readings {
    voltage: f32,
    current: f32,
    power: f32,
}

/// Simulated mains power meter.
///
/// Re-samples voltage/current/power once per second with ~1% noise around
/// nominal values, the way a real metering chip's readings wander. Useful
/// for exercising anything that feature-detects an active power meter.
pub struct TestPowerDriver {
    readings: Mutex<Readings>,
}

impl TestPowerDriver {
    /// Create the driver with zeroed readings; `init` seeds them.
    pub fn new() -> Self {
        Self {
            readings: Mutex::new(Readings {
                voltage: 0.0,
                current: 0.0,
                power: 0.0,
            }),
        }
    }

    fn sample(&self) {
        let mut rng = rand::thread_rng();
        let mut noise = |nominal: f32| nominal * rng.gen_range(0.99..=1.01f32);
        let mut readings = self.readings.lock();
        readings.voltage = noise(230.0);
        readings.current = noise(0.61);
        readings.power = readings.voltage * readings.current;
    }
}

impl Default for TestPowerDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for TestPowerDriver {
    fn name(&self) -> &'static str {
        "TestPower"
    }

    fn capabilities(&self) -> &'static [Capability] {
        CAPS
    }

    fn init(&self) {
        self.sample();
    }

    fn on_every_second(&self) {
        self.sample();
        let readings = *self.readings.lock();
        debug!(
            voltage = readings.voltage,
            current = readings.current,
            power = readings.power,
            "test power meter sampled"
        );
    }

    fn append_status(&self, page: &mut StatusPage) {
        let readings = *self.readings.lock();
        let _ = writeln!(
            page,
            "Voltage: {:.1} V, Current: {:.3} A, Power: {:.1} W",
            readings.voltage, readings.current, readings.power
        );
    }

    fn stop(&self) {
        let mut readings = self.readings.lock();
        *readings = Readings {
            voltage: 0.0,
            current: 0.0,
            power: 0.0,
        };
    }
}
