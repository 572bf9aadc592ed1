//! Simulated UART port for hosts without serial hardware.

use anyhow::Result;
use parking_lot::Mutex;
use tracing::debug;

use crate::serial::uart::UartPort;

/// In-memory [`UartPort`] that records everything transmitted.
///
/// Used by the demo binary and by tests that need to observe the exact byte
/// sequence a command produced on the wire.
#[derive(Default)]
pub struct SimUart {
    tx_log: Mutex<Vec<u8>>,
    baud: Mutex<Option<u32>>,
}

impl SimUart {
    /// Create an idle simulated port.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every byte transmitted so far, in order.
    pub fn sent(&self) -> Vec<u8> {
        self.tx_log.lock().clone()
    }

    /// The most recently configured baud rate, if any.
    pub fn baud(&self) -> Option<u32> {
        *self.baud.lock()
    }
}

impl UartPort for SimUart {
    fn configure(&self, baud: u32) -> Result<()> {
        *self.baud.lock() = Some(baud);
        Ok(())
    }

    fn send_byte(&self, byte: u8) {
        debug!(byte = %format_args!("{byte:02X}"), "sim uart tx");
        self.tx_log.lock().push(byte);
    }
}

// A shared handle works as a port too, so a test or host can keep a clone
// for inspection while the service owns the other.
impl UartPort for std::sync::Arc<SimUart> {
    fn configure(&self, baud: u32) -> Result<()> {
        self.as_ref().configure(baud)
    }

    fn send_byte(&self, byte: u8) {
        self.as_ref().send_byte(byte);
    }
}
