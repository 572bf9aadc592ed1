//! UART transport service: the seam between platform serial hardware and
//! the receive ring buffer.
//!
//! Platform-specific UART bring-up and byte transmission live behind the
//! [`UartPort`] trait (the vendor-SDK boundary); everything above it —
//! reception buffering, reinitialization, the manual-mode debug drain — is
//! platform-neutral and lives in [`UartService`].

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::info;

use crate::serial::ring::RxRing;

/// Receive-ring capacity installed by the `uartInit` console command.
pub const UART_RX_RING_CAPACITY: usize = 512;

/// Maximum bytes the manual-mode debug drain logs per second.
const DEBUG_DRAIN_CHUNK: usize = 48;

/// Platform serial transport.
///
/// Implementations wrap whatever the target platform offers — a vendor SDK
/// UART, a host serial device, or a simulator. Transmission is fire-and-
/// forget like the hardware FIFO it models; only (re)configuration can
/// fail.
pub trait UartPort: Send + Sync {
    /// (Re)configure the hardware transport for the given baud rate.
    fn configure(&self, baud: u32) -> Result<()>;

    /// Transmit a single byte.
    fn send_byte(&self, byte: u8);
}

/// UART service: one port, one receive ring, and the init bookkeeping the
/// debug console relies on.
pub struct UartService {
    port: Box<dyn UartPort>,
    /// The ring is replaced wholesale on reinitialization; the RwLock only
    /// guards that swap, never per-byte traffic.
    ring: RwLock<Arc<RxRing>>,
    /// Bumped on every hardware (re)configuration.
    init_counter: AtomicU32,
    /// Value of `init_counter` at the last `uartInit` console command, or
    /// -1 when the console never initialized the port. While the two
    /// counters agree, the service is in manual debug mode and drains
    /// received bytes to the log every second.
    manual_init_counter: AtomicI64,
}

impl UartService {
    /// Create a service over `port` with a default-capacity receive ring.
    pub fn new(port: Box<dyn UartPort>) -> Self {
        Self {
            port,
            ring: RwLock::new(Arc::new(RxRing::new(UART_RX_RING_CAPACITY))),
            init_counter: AtomicU32::new(0),
            manual_init_counter: AtomicI64::new(-1),
        }
    }

    /// (Re)configure the hardware transport; returns the new init counter.
    ///
    /// Drivers that own the UART (power meters, MCU bridges) call this on
    /// their own init path; the counter lets the debug console detect that
    /// somebody else reinitialized the port since `uartInit`.
    pub fn reconfigure(&self, baud: u32) -> Result<u32> {
        self.port.configure(baud)?;
        let counter = self.init_counter.fetch_add(1, Ordering::AcqRel) + 1;
        info!(baud, counter, "uart reconfigured");
        Ok(counter)
    }

    /// Replace the receive ring with a fresh one of `capacity` bytes.
    ///
    /// Stop-the-world reset: prior contents are dropped. Only safe at
    /// explicit (re)configuration points, never while reception is active.
    pub fn init_rx_ring(&self, capacity: usize) {
        *self.ring.write() = Arc::new(RxRing::new(capacity));
    }

    /// Mark the console as the current owner of the port (manual debug
    /// mode). Called by `uartInit` after a successful reconfigure.
    pub fn mark_manual_init(&self) {
        let counter = self.init_counter.load(Ordering::Acquire);
        self.manual_init_counter
            .store(i64::from(counter), Ordering::Release);
    }

    /// Whether the console still owns the port (no driver reinitialized it
    /// since the last `uartInit`).
    pub fn manual_mode_active(&self) -> bool {
        let manual = self.manual_init_counter.load(Ordering::Acquire);
        manual >= 0 && manual == i64::from(self.init_counter.load(Ordering::Acquire))
    }

    /// Producer path: append one received byte to the ring.
    ///
    /// Called from the reception callback (or its simulated stand-ins); a
    /// full ring silently drops the byte.
    pub fn feed_byte(&self, byte: u8) {
        self.ring.read().push(byte);
    }

    /// Consumer handle onto the receive ring.
    ///
    /// Handed to whichever driver currently drains reception. The handle
    /// goes stale when the ring is reinitialized, so consumers should
    /// re-fetch it rather than cache it across reconfiguration.
    pub fn rx(&self) -> Arc<RxRing> {
        Arc::clone(&self.ring.read())
    }

    /// Transmit a single byte.
    pub fn send_byte(&self, byte: u8) {
        self.port.send_byte(byte);
    }

    /// Transmit a byte sequence.
    pub fn send(&self, bytes: &[u8]) {
        for &b in bytes {
            self.port.send_byte(b);
        }
    }

    /// Once-per-second service hook.
    ///
    /// In manual debug mode, drains a bounded chunk of the receive ring and
    /// logs it as space-separated hex so `uartInit` + a terminal double as
    /// a reception probe.
    pub fn run_every_second(&self) {
        if !self.manual_mode_active() {
            return;
        }
        let ring = self.rx();
        if ring.data_size() == 0 {
            return;
        }
        let mut text = String::new();
        for i in 0..DEBUG_DRAIN_CHUNK {
            if ring.data_size() == 0 {
                break;
            }
            let byte = ring.peek_at(0);
            if i != 0 {
                text.push(' ');
            }
            text.push_str(&format!("{byte:02X}"));
            ring.consume(1);
        }
        info!(received = %text, "uart debug drain");
    }
}
