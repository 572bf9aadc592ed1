//! Lock-free receive ring buffer for serial reception.
//!
//! A fixed-capacity circular byte queue shared by exactly one producer
//! context (the reception callback) and one consumer context (the polling
//! code). Index updates use atomic loads/stores with Acquire/Release
//! ordering; the payload cells are only synchronized through those index
//! publications, which is sound under the single-producer/single-consumer
//! contract.
//!
//! One slot is permanently reserved so that `in == out` unambiguously means
//! empty: a ring of capacity `C` holds at most `C - 1` bytes. When the
//! buffer is full the newest byte is silently discarded — no error, no
//! overwrite of unread data, no blocking, because the producer side may run
//! in an interrupt context that can do none of those things.
//!
//! The four consumer-facing operations (`data_size`, `peek_at`, `consume`,
//! plus producer `push`) are the minimum vocabulary a higher-level framer
//! needs: look for a header with `peek_at`, compute the expected length,
//! `consume` once a whole frame is present. Framing itself belongs to the
//! protocol drivers.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed-capacity SPSC circular byte queue with one reserved slot.
///
/// Capacity is chosen at construction and never changes; a reinitialization
/// (different capacity, dropped contents) is done by replacing the ring
/// wholesale — see `UartService::init_rx_ring`.
pub struct RxRing {
    buf: Box<[UnsafeCell<u8>]>,
    /// Next write position. Written only by the producer.
    inp: AtomicUsize,
    /// Next read position. Written only by the consumer.
    outp: AtomicUsize,
}

// SAFETY: index updates are atomic with Acquire/Release ordering, and the
// byte cells are partitioned by those indices — the producer only writes
// cells outside [out, out+size), the consumer only reads cells inside it.
// Sound for one producer context plus one consumer context, which is the
// documented usage contract.
unsafe impl Send for RxRing {}
// SAFETY: see Send above; shared references only perform the partitioned
// accesses described there.
unsafe impl Sync for RxRing {}

impl RxRing {
    /// Allocate a zero-filled ring of `capacity` bytes (`capacity - 1`
    /// usable).
    ///
    /// `capacity` must be at least 2 — one reserved slot plus room for at
    /// least one byte of data.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "ring capacity must be at least 2");
        Self {
            buf: (0..capacity).map(|_| UnsafeCell::new(0)).collect(),
            inp: AtomicUsize::new(0),
            outp: AtomicUsize::new(0),
        }
    }

    /// Total capacity, including the reserved slot.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of unconsumed bytes: `(in - out + capacity) mod capacity`.
    pub fn data_size(&self) -> usize {
        let cap = self.buf.len();
        let inp = self.inp.load(Ordering::Acquire);
        let outp = self.outp.load(Ordering::Acquire);
        (inp + cap - outp) % cap
    }

    /// Append one byte; producer context only.
    ///
    /// If the ring already holds `capacity - 1` bytes the byte is silently
    /// discarded. Gap detection is the job of whatever framing protocol
    /// runs on top.
    pub fn push(&self, byte: u8) {
        let cap = self.buf.len();
        let inp = self.inp.load(Ordering::Relaxed);
        let outp = self.outp.load(Ordering::Acquire);
        if (inp + cap - outp) % cap >= cap - 1 {
            return;
        }
        // SAFETY: only the producer writes cells, and `inp` is outside the
        // consumer's readable range until the store below publishes it.
        unsafe {
            *self.buf[inp].get() = byte;
        }
        self.inp.store((inp + 1) % cap, Ordering::Release);
    }

    /// Read the byte `offset` positions past the read index without
    /// consuming it; consumer context only.
    ///
    /// Unchecked contract: the caller must ensure `offset < data_size()`.
    /// An out-of-range peek reads a stale or zero byte rather than failing.
    pub fn peek_at(&self, offset: usize) -> u8 {
        debug_assert!(
            offset < self.data_size(),
            "peek_at({offset}) past available data"
        );
        let cap = self.buf.len();
        let outp = self.outp.load(Ordering::Relaxed);
        // SAFETY: cells up to the producer's published `inp` were made
        // visible by the Acquire load in the caller's data_size() check;
        // the producer never rewrites them until they are consumed.
        unsafe { *self.buf[(outp + offset) % cap].get() }
    }

    /// Advance the read index by `n`; consumer context only.
    ///
    /// Unchecked contract: the caller must ensure `n <= data_size()`.
    pub fn consume(&self, n: usize) {
        debug_assert!(n <= self.data_size(), "consume({n}) past available data");
        let cap = self.buf.len();
        let outp = self.outp.load(Ordering::Relaxed);
        self.outp.store((outp + n) % cap, Ordering::Release);
    }

    /// Drop any unconsumed contents, resetting both indices.
    ///
    /// Stop-the-world: not safe to call while the producer or consumer is
    /// mid-operation. Intended only for explicit (re)configuration.
    pub fn clear(&self) {
        self.outp.store(0, Ordering::Release);
        self.inp.store(0, Ordering::Release);
    }
}
