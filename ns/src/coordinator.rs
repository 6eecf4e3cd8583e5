//! LifecycleCoordinator - drives notifications through their timed phases
//!
//! For every accepted notification with a display duration the coordinator
//! arms a one-shot timer. When it fires the notification is marked fading
//! and a second timer of the fade window is armed; when that fires the
//! notification is removed.
//!
//! ```text
//! schedule(id, d) ──► [Display d] ──fire──► mark_fading(id) ──► [Fade w] ──fire──► remove(id)
//! dismiss(id)     ──► cancel ──► mark_fading(id) ──────────────► [Fade w] ──fire──► remove(id)
//! cancel_all()    ──► abort every pending timer (no remove)
//! ```
//!
//! Each id owns at most one pending timer. Timers carry a ticket; a firing
//! timer only acts if its ticket is still the one registered for its id,
//! checked under the timer lock. Cancellation removes the registration under
//! the same lock, so a cancelled timer can never act.
//!
//! Lock order is always timers, then store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::NotifyError;
use crate::notification::NotificationId;
use crate::store::NotificationStore;

/// Which countdown a pending timer represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStage {
    /// Waiting for the display duration to elapse
    Display,
    /// Waiting for the fade window to elapse before removal
    Fade,
}

struct PendingTimer {
    ticket: u64,
    stage: TimerStage,
    join: JoinHandle<()>,
}

#[derive(Default)]
struct TimerTable {
    pending: HashMap<NotificationId, PendingTimer>,
    next_ticket: u64,
}

struct Inner {
    store: Arc<NotificationStore>,
    timers: Mutex<TimerTable>,
    fade_window: Duration,
    runtime: Handle,
}

impl Inner {
    fn lock_timers(&self) -> MutexGuard<'_, TimerTable> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn arm(self: &Arc<Self>, table: &mut TimerTable, id: NotificationId, stage: TimerStage, delay: Duration) {
        table.next_ticket += 1;
        let ticket = table.next_ticket;
        debug!(%id, ?stage, ?delay, ticket, "LifecycleCoordinator::arm: called");

        let weak: Weak<Inner> = Arc::downgrade(self);
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.fire(id, ticket);
            }
        });

        if let Some(previous) = table.pending.insert(id, PendingTimer { ticket, stage, join }) {
            previous.join.abort();
        }
    }

    fn fire(self: &Arc<Self>, id: NotificationId, ticket: u64) {
        let mut table = self.lock_timers();

        let stage = match table.pending.get(&id) {
            Some(timer) if timer.ticket == ticket => timer.stage,
            _ => {
                debug!(%id, ticket, "LifecycleCoordinator::fire: stale timer ignored");
                return;
            }
        };
        table.pending.remove(&id);
        debug!(%id, ?stage, "LifecycleCoordinator::fire: called");

        match stage {
            TimerStage::Display => {
                self.store.mark_fading(id);
                if self.store.get(id).is_some() {
                    self.arm(&mut table, id, TimerStage::Fade, self.fade_window);
                }
            }
            TimerStage::Fade => {
                self.store.remove(id);
            }
        }
    }

    fn abort_all(table: &mut TimerTable) -> usize {
        let count = table.pending.len();
        for (_, timer) in table.pending.drain() {
            timer.join.abort();
        }
        count
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let table = self.timers.get_mut().unwrap_or_else(PoisonError::into_inner);
        Inner::abort_all(table);
    }
}

/// Owner of every notification lifecycle timer
///
/// Cheap to clone; clones share the same timer table. When the last clone
/// is dropped all pending timers are aborted.
#[derive(Clone)]
pub struct LifecycleCoordinator {
    inner: Arc<Inner>,
}

impl LifecycleCoordinator {
    /// Create a coordinator driven by the current tokio runtime
    pub fn new(store: Arc<NotificationStore>, fade_window: Duration) -> Result<Self, NotifyError> {
        debug!(?fade_window, "LifecycleCoordinator::new: called");
        let runtime = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        Ok(Self::with_runtime(store, fade_window, runtime))
    }

    /// Create a coordinator whose timers are spawned on `runtime`
    pub fn with_runtime(store: Arc<NotificationStore>, fade_window: Duration, runtime: Handle) -> Self {
        debug!(?fade_window, "LifecycleCoordinator::with_runtime: called");
        Self {
            inner: Arc::new(Inner {
                store,
                timers: Mutex::new(TimerTable::default()),
                fade_window,
                runtime,
            }),
        }
    }

    pub fn fade_window(&self) -> Duration {
        self.inner.fade_window
    }

    /// Start the display countdown for a freshly accepted notification
    ///
    /// `None` or a zero duration leaves the notification sticky. A
    /// notification that is already fading or gone keeps whatever timer it
    /// has, so a dismiss that lands first is never undone.
    pub fn schedule(&self, id: NotificationId, display_duration: Option<Duration>) {
        debug!(%id, ?display_duration, "LifecycleCoordinator::schedule: called");
        let Some(delay) = display_duration.filter(|d| !d.is_zero()) else {
            debug!(%id, "LifecycleCoordinator::schedule: sticky, no timer");
            return;
        };

        let mut table = self.inner.lock_timers();
        if table.pending.get(&id).is_some_and(|t| t.stage == TimerStage::Fade) {
            debug!(%id, "LifecycleCoordinator::schedule: fade pending, not rearming");
            return;
        }
        match self.inner.store.get(id) {
            Some(n) if !n.is_fading() => self.inner.arm(&mut table, id, TimerStage::Display, delay),
            _ => debug!(%id, "LifecycleCoordinator::schedule: fading or gone, no timer"),
        }
    }

    /// Fade a notification now and remove it after the fade window
    ///
    /// Safe to call repeatedly: a notification already counting down its
    /// fade keeps its original removal time, and an unknown id does nothing.
    pub fn dismiss(&self, id: NotificationId) {
        debug!(%id, "LifecycleCoordinator::dismiss: called");
        let mut table = self.inner.lock_timers();

        if let Some(timer) = table.pending.get(&id) {
            if timer.stage == TimerStage::Fade {
                debug!(%id, "LifecycleCoordinator::dismiss: already fading out");
                return;
            }
            if let Some(timer) = table.pending.remove(&id) {
                timer.join.abort();
            }
        }

        self.inner.store.mark_fading(id);
        if self.inner.store.get(id).is_some() {
            self.inner.arm(&mut table, id, TimerStage::Fade, self.inner.fade_window);
        }
    }

    /// Cancel whatever timer is pending for `id` without touching the store
    pub fn cancel(&self, id: NotificationId) -> bool {
        debug!(%id, "LifecycleCoordinator::cancel: called");
        let mut table = self.inner.lock_timers();
        match table.pending.remove(&id) {
            Some(timer) => {
                timer.join.abort();
                true
            }
            None => false,
        }
    }

    /// Abort every pending timer without removing anything from the store
    ///
    /// Returns the number of timers cancelled.
    pub fn cancel_all(&self) -> usize {
        debug!("LifecycleCoordinator::cancel_all: called");
        let mut table = self.inner.lock_timers();
        let count = Inner::abort_all(&mut table);
        if count > 0 {
            info!(count, "Cancelled pending notification timers");
        }
        count
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.inner.lock_timers().pending.len()
    }

    /// Stage of the timer pending for `id`, if any
    pub fn stage(&self, id: NotificationId) -> Option<TimerStage> {
        self.inner.lock_timers().pending.get(&id).map(|t| t.stage)
    }
}
