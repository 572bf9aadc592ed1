//! # Driver Hub Core Library
//!
//! Runtime driver-lifecycle manager for a device firmware: a registry of
//! independently loadable peripheral/protocol handlers, a cooperative tick
//! scheduler that fans periodic and event callbacks out to the loaded
//! subset, and a byte-oriented circular buffer decoupling asynchronous
//! serial reception from synchronous consumption.
//!
//! ## Crate Structure
//!
//! - **`driver`**: the descriptor contract — the [`driver::Driver`] trait
//!   with its independently optional capability hooks.
//! - **`registry`**: ownership of the descriptor table and its loaded
//!   flags; start/stop/query by name under one bounded-wait mutex.
//! - **`scheduler`**: the four dispatch entry points (every-second, quick
//!   tick, channel-changed, status fragment) and their lock disciplines.
//! - **`serial`**: the SPSC receive ring buffer, the UART service that owns
//!   it, and a simulated port for hosts without hardware.
//! - **`console`**: the debug command surface (`startDriver`, `stopDriver`,
//!   `uartInit`, `uartSendHex`, `uartSendASCII`, `uartFakeHex`).
//! - **`status`**: the text sink drivers render status fragments into.
//! - **`drivers`**: the build-time-selected built-in driver table.
//! - **`config`** / **`telemetry`** / **`error`**: settings loading,
//!   tracing setup, and the crate error type.
//!
//! Concrete chip protocols, the command tokenizer, and HTTP rendering are
//! external collaborators — this core only defines the seams they plug
//! into.

pub mod config;
pub mod console;
pub mod driver;
pub mod drivers;
pub mod error;
pub mod registry;
pub mod scheduler;
pub mod serial;
pub mod status;
pub mod telemetry;

pub use config::Settings;
pub use console::{CommandError, Console, ConstantSource, MapConstants};
pub use driver::{Capability, Driver};
pub use error::{HubError, HubResult};
pub use registry::{DriverRegistry, StartOutcome, StopOutcome, StopTarget};
pub use scheduler::TickScheduler;
pub use serial::{RxRing, SimUart, UartPort, UartService};
pub use status::StatusPage;
