/// Debounced session writes
///
/// Mutations call [`SaveScheduler::schedule`] with the full location list.
/// A single pending slot holds the latest state; each call replaces it and
/// starts a new timer. When a timer fires it only writes if the slot still
/// carries its own ticket, so superseded timers fall through silently.
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

use super::data::Location;
use super::store::{SessionBackend, SessionStore};

struct PendingWrite {
    ticket: u64,
    scheduled_at: Instant,
    locations: Vec<Location>,
}

type Slot = Arc<Mutex<Option<PendingWrite>>>;

pub struct SaveScheduler<B: SessionBackend> {
    store: SessionStore<B>,
    window: Duration,
    slot: Slot,
    /// Serializes timer-driven and flushed writes
    write_gate: Arc<tokio::sync::Mutex<()>>,
    /// Runtime the debounce timers run on
    runtime: tokio::runtime::Handle,
    next_ticket: u64,
    armed: bool,
}

impl<B: SessionBackend> SaveScheduler<B> {
    /// Create a disarmed scheduler; nothing is written until [`arm`](Self::arm).
    ///
    /// Must be created inside a Tokio runtime. Later calls to
    /// [`schedule`](Self::schedule) may come from any thread.
    pub fn new(store: SessionStore<B>, window: Duration) -> Self {
        Self {
            store,
            window,
            slot: Arc::new(Mutex::new(None)),
            write_gate: Arc::new(tokio::sync::Mutex::new(())),
            runtime: tokio::runtime::Handle::current(),
            next_ticket: 0,
            armed: false,
        }
    }

    /// Allow writes. Called once the stored session has been restored, so an
    /// empty startup state can't overwrite it.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn store(&self) -> &SessionStore<B> {
        &self.store
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.slot).is_some()
    }

    /// Replace the pending state and restart the debounce window.
    pub fn schedule(&mut self, locations: Vec<Location>) {
        if !self.armed {
            debug!("session not restored yet, skipping save");
            return;
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        *lock(&self.slot) = Some(PendingWrite {
            ticket,
            scheduled_at: Instant::now(),
            locations,
        });

        let slot = Arc::clone(&self.slot);
        let gate = Arc::clone(&self.write_gate);
        let store = self.store.clone();
        let window = self.window;
        self.runtime.spawn(async move {
            tokio::time::sleep(window).await;
            let Some(write) = take_if_current(&slot, ticket) else {
                return;
            };
            let _guard = gate.lock().await;
            debug!(
                waited_ms = write.scheduled_at.elapsed().as_millis() as u64,
                "debounced session write"
            );
            store.save(write.locations).await;
        });
    }

    /// Write the pending state now instead of waiting for the timer.
    pub async fn flush(&mut self) {
        let pending = lock(&self.slot).take();
        if let Some(write) = pending {
            let _guard = self.write_gate.lock().await;
            self.store.save(write.locations).await;
        }
    }

    /// Drop the pending state without writing it.
    pub fn cancel(&mut self) {
        if lock(&self.slot).take().is_some() {
            debug!("pending session write canceled");
        }
    }
}

impl<B: SessionBackend> Drop for SaveScheduler<B> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Clear the slot and hand back its write, only if `ticket` still owns it
fn take_if_current(slot: &Slot, ticket: u64) -> Option<PendingWrite> {
    let mut guard = lock(slot);
    match guard.as_ref() {
        Some(pending) if pending.ticket == ticket => guard.take(),
        _ => None,
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<PendingWrite>> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::MemoryBackend;

    const WINDOW: Duration = Duration::from_millis(50);
    const SETTLE: Duration = Duration::from_millis(300);

    fn scheduler() -> SaveScheduler<MemoryBackend> {
        let mut scheduler = SaveScheduler::new(SessionStore::new(MemoryBackend::new()), WINDOW);
        scheduler.arm();
        scheduler
    }

    fn named(n: usize) -> Vec<Location> {
        (0..n).map(|i| Location::new(format!("loc-{i}"))).collect()
    }

    #[tokio::test]
    async fn test_rapid_saves_coalesce_into_one_write() {
        let mut scheduler = scheduler();
        let states: Vec<_> = (1..=10).map(named).collect();
        for state in &states {
            scheduler.schedule(state.clone());
        }
        let last = &states[9];

        tokio::time::sleep(SETTLE).await;

        let backend = scheduler.store().backend();
        assert_eq!(backend.write_count(), 1);
        let stored = backend.read().unwrap().unwrap();
        assert_eq!(&stored.locations, last);
        assert!(!scheduler.has_pending());
    }

    #[tokio::test]
    async fn test_separated_saves_each_write() {
        let mut scheduler = scheduler();
        scheduler.schedule(named(1));
        tokio::time::sleep(SETTLE).await;
        scheduler.schedule(named(2));
        tokio::time::sleep(SETTLE).await;

        assert_eq!(scheduler.store().backend().write_count(), 2);
    }

    #[tokio::test]
    async fn test_disarmed_scheduler_never_writes() {
        let mut scheduler = SaveScheduler::new(SessionStore::new(MemoryBackend::new()), WINDOW);
        scheduler.schedule(named(3));
        assert!(!scheduler.has_pending());

        tokio::time::sleep(SETTLE).await;
        assert_eq!(scheduler.store().backend().write_count(), 0);
    }

    #[tokio::test]
    async fn test_flush_writes_immediately() {
        let mut scheduler = scheduler();
        scheduler.schedule(named(2));
        scheduler.flush().await;
        assert_eq!(scheduler.store().backend().write_count(), 1);

        // The timer finds an empty slot and does nothing
        tokio::time::sleep(SETTLE).await;
        assert_eq!(scheduler.store().backend().write_count(), 1);
    }

    #[tokio::test]
    async fn test_schedule_from_thread_outside_runtime() {
        let scheduler = scheduler();
        let scheduler = std::thread::spawn(move || {
            let mut scheduler = scheduler;
            scheduler.schedule(named(5));
            scheduler
        })
        .join()
        .unwrap();

        tokio::time::sleep(SETTLE).await;
        assert_eq!(scheduler.store().backend().write_count(), 1);
        let stored = scheduler.store().backend().read().unwrap().unwrap();
        assert_eq!(stored.locations.len(), 5);
    }

    #[tokio::test]
    async fn test_teardown_cancels_pending_write() {
        let store = SessionStore::new(MemoryBackend::new());
        let mut scheduler = SaveScheduler::new(store.clone(), WINDOW);
        scheduler.arm();
        scheduler.schedule(named(4));
        drop(scheduler);

        tokio::time::sleep(SETTLE).await;
        assert_eq!(store.backend().write_count(), 0);
        assert_eq!(store.load().await, None);
    }
}
