//! Built-in driver table.
//!
//! The firmware selects its driver set at build configuration time; here
//! that is a cargo-feature-gated table assembled in declaration order.
//! Order matters: dispatch passes walk the table as declared, so an entry
//! may rely on earlier entries having run within the same tick cycle.

#[cfg(feature = "driver-testled")]
mod test_led;
#[cfg(feature = "driver-testpower")]
mod test_power;

#[cfg(feature = "driver-testled")]
pub use test_led::TestLedDriver;
#[cfg(feature = "driver-testpower")]
pub use test_power::TestPowerDriver;

use crate::driver::Driver;

/// The descriptor table for this build, in declaration order.
pub fn builtin_drivers() -> Vec<Box<dyn Driver>> {
    #[allow(unused_mut)]
    let mut table: Vec<Box<dyn Driver>> = Vec::new();
    #[cfg(feature = "driver-testpower")]
    table.push(Box::new(TestPowerDriver::new()));
    #[cfg(feature = "driver-testled")]
    table.push(Box::new(TestLedDriver::new()));
    table
}
