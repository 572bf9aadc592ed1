//! Shared fixtures: instrumented probe drivers for lifecycle and dispatch
//! assertions.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use parking_lot::Mutex;

use driver_hub::driver::{Capability, Driver};
use driver_hub::status::StatusPage;

/// Shared dispatch-order log.
pub type Journal = Arc<Mutex<Vec<&'static str>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Driver that counts every hook invocation.
pub struct Probe {
    name: &'static str,
    caps: &'static [Capability],
    pub inits: AtomicUsize,
    pub seconds: AtomicUsize,
    pub quicks: AtomicUsize,
    pub stops: AtomicUsize,
    pub events: Mutex<Vec<(i32, i32)>>,
    journal: Option<Journal>,
}

impl Probe {
    pub fn new(name: &'static str, caps: &'static [Capability]) -> Arc<Self> {
        Arc::new(Self {
            name,
            caps,
            inits: AtomicUsize::new(0),
            seconds: AtomicUsize::new(0),
            quicks: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
            journal: None,
        })
    }

    /// Like [`Probe::new`], but `on_every_second` also records the driver
    /// name into `journal` so tests can assert dispatch order.
    pub fn with_journal(
        name: &'static str,
        caps: &'static [Capability],
        journal: Journal,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            caps,
            inits: AtomicUsize::new(0),
            seconds: AtomicUsize::new(0),
            quicks: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
            journal: Some(journal),
        })
    }

    pub fn name_str(&self) -> &'static str {
        self.name
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn second_count(&self) -> usize {
        self.seconds.load(Ordering::SeqCst)
    }

    pub fn quick_count(&self) -> usize {
        self.quicks.load(Ordering::SeqCst)
    }
}

impl Driver for Probe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capabilities(&self) -> &'static [Capability] {
        self.caps
    }

    fn init(&self) {
        self.inits.fetch_add(1, Ordering::SeqCst);
    }

    fn on_every_second(&self) {
        self.seconds.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            journal.lock().push(self.name);
        }
    }

    fn run_quick_tick(&self) {
        self.quicks.fetch_add(1, Ordering::SeqCst);
    }

    fn append_status(&self, page: &mut StatusPage) {
        page.line(&format!("{} status", self.name));
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn on_channel_changed(&self, channel: i32, value: i32) {
        self.events.lock().push((channel, value));
    }
}

/// Driver whose `init` announces entry on one channel and then blocks until
/// the paired release sender fires, keeping the registry transition lock
/// held for as long as the test wants.
pub struct Gate {
    entered: Sender<()>,
    release: Mutex<Option<Receiver<()>>>,
}

impl Gate {
    pub fn new(entered: Sender<()>, release: Receiver<()>) -> Arc<Self> {
        Arc::new(Self {
            entered,
            release: Mutex::new(Some(release)),
        })
    }
}

impl Driver for Gate {
    fn name(&self) -> &'static str {
        "Gate"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Init]
    }

    fn init(&self) {
        let _ = self.entered.send(());
        let receiver = self.release.lock().take();
        if let Some(receiver) = receiver {
            let _ = receiver.recv();
        }
    }
}

/// Hands a shared driver handle to the registry as a `Box<dyn Driver>` while
/// the test keeps its own `Arc` clone for inspection. `Driver` cannot be
/// implemented for `Arc<D>` here (orphan rule — both are foreign to the test
/// crate), so this local newtype forwards every hook to the shared instance.
pub struct Shared<D: Driver>(pub Arc<D>);

impl<D: Driver> Driver for Shared<D> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn capabilities(&self) -> &'static [Capability] {
        self.0.capabilities()
    }

    fn init(&self) {
        self.0.init();
    }

    fn on_every_second(&self) {
        self.0.on_every_second();
    }

    fn run_quick_tick(&self) {
        self.0.run_quick_tick();
    }

    fn append_status(&self, page: &mut StatusPage) {
        self.0.append_status(page);
    }

    fn stop(&self) {
        self.0.stop();
    }

    fn on_channel_changed(&self, channel: i32, value: i32) {
        self.0.on_channel_changed(channel, value);
    }
}
