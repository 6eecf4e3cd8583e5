//! NotificationStore - authoritative list of active notifications
//!
//! The store owns the ordered notification list, the id counter and the
//! set of in-flight dedup keys. It is the only thing allowed to mutate the
//! list, through exactly four operations: [`submit`](NotificationStore::submit),
//! [`mark_fading`](NotificationStore::mark_fading),
//! [`remove`](NotificationStore::remove) and
//! [`clear_all`](NotificationStore::clear_all).
//!
//! Every mutation publishes one [`Snapshot`] to all live subscribers while
//! the state lock is still held, so snapshots reach every subscriber in
//! mutation order and before the mutating call returns.
//!
//! ```text
//! submit ──► dedup check ──► append ──┐
//! mark_fading ──► Visible→Fading ─────┼──► publish(Snapshot{seq+1}) ──► Subscription 1..N
//! remove ──► drop item, release key ──┤
//! clear_all ──► drop all, release all ┘
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;

use crate::notification::{DedupKey, Notification, NotificationId, NotificationRequest, Phase};

/// Outcome of a submission
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The notification was appended under this id
    Accepted(NotificationId),
    /// An identical notification is already active; nothing changed
    Rejected,
}

impl Submission {
    pub fn id(&self) -> Option<NotificationId> {
        match self {
            Submission::Accepted(id) => Some(*id),
            Submission::Rejected => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Submission::Rejected)
    }
}

/// Immutable, ordered view of the active notifications
///
/// `seq` increases by one on every publish; a subscriber never sees a
/// snapshot older than one it already received.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    seq: u64,
    items: Arc<[Notification]>,
}

impl Snapshot {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.get(id).is_some()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Receiving end of the store's publish channel
///
/// Dropping the subscription releases it; the store prunes the closed
/// channel on its next publish.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    /// Wait for the next snapshot
    ///
    /// Returns `None` once the store has been dropped and all buffered
    /// snapshots were consumed.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Take the next buffered snapshot without waiting
    pub fn try_next(&mut self) -> Option<Snapshot> {
        self.rx.try_recv().ok()
    }

    /// Drain everything buffered and return the most recent snapshot
    pub fn latest(&mut self) -> Option<Snapshot> {
        let mut latest = None;
        while let Ok(snapshot) = self.rx.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }
}

struct StoreState {
    items: Vec<Notification>,
    in_flight: HashSet<DedupKey>,
    next_id: u64,
    seq: u64,
    subscribers: Vec<mpsc::UnboundedSender<Snapshot>>,
}

impl StoreState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            seq: self.seq,
            items: Arc::from(self.items.as_slice()),
        }
    }

    fn publish(&mut self) {
        self.seq += 1;
        let snapshot = self.snapshot();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        debug!(seq = self.seq, items = self.items.len(), subscribers = self.subscribers.len(), "NotificationStore: published");
    }
}

/// Deduplicated, ordered collection of active notifications
pub struct NotificationStore {
    state: Mutex<StoreState>,
}

impl NotificationStore {
    pub fn new() -> Self {
        debug!("NotificationStore::new: called");
        Self {
            state: Mutex::new(StoreState {
                items: Vec::new(),
                in_flight: HashSet::new(),
                next_id: 0,
                seq: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    // A panic inside a publish cannot leave the list half-mutated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a notification unless an identical one is active
    ///
    /// Identity is `(title, message, kind)`. A rejected submission changes
    /// nothing and publishes nothing.
    pub fn submit(&self, request: NotificationRequest) -> Submission {
        debug!(title = %request.title, kind = %request.kind, "NotificationStore::submit: called");
        let mut state = self.lock();

        let key = request.dedup_key();
        if state.in_flight.contains(&key) {
            debug!(title = %request.title, kind = %request.kind, "NotificationStore::submit: duplicate rejected");
            return Submission::Rejected;
        }

        state.next_id += 1;
        let id = NotificationId::new(state.next_id);
        state.in_flight.insert(key);
        state.items.push(Notification::accept(id, request));
        state.publish();

        debug!(%id, "NotificationStore::submit: accepted");
        Submission::Accepted(id)
    }

    /// Flip a visible notification to fading
    ///
    /// Returns `false` (and publishes nothing) if the id is gone or already fading.
    pub fn mark_fading(&self, id: NotificationId) -> bool {
        debug!(%id, "NotificationStore::mark_fading: called");
        let mut state = self.lock();

        match state.items.iter_mut().find(|n| n.id == id) {
            Some(n) if n.phase == Phase::Visible => {
                n.phase = Phase::Fading;
            }
            _ => {
                debug!(%id, "NotificationStore::mark_fading: absent or already fading");
                return false;
            }
        }

        state.publish();
        true
    }

    /// Delete a notification in any phase and release its dedup key
    ///
    /// Returns `false` (and publishes nothing) if the id is unknown.
    pub fn remove(&self, id: NotificationId) -> bool {
        debug!(%id, "NotificationStore::remove: called");
        let mut state = self.lock();

        let Some(pos) = state.items.iter().position(|n| n.id == id) else {
            debug!(%id, "NotificationStore::remove: not found");
            return false;
        };

        let removed = state.items.remove(pos);
        state.in_flight.remove(&removed.dedup_key());
        state.publish();
        true
    }

    /// Empty the list and release every dedup key
    ///
    /// Always publishes. Returns how many notifications were dropped.
    pub fn clear_all(&self) -> usize {
        debug!("NotificationStore::clear_all: called");
        let mut state = self.lock();

        let count = state.items.len();
        state.items.clear();
        state.in_flight.clear();
        state.publish();
        count
    }

    /// Subscribe to snapshots
    ///
    /// The current list is delivered immediately, followed by one snapshot
    /// per subsequent mutation.
    pub fn subscribe(&self) -> Subscription {
        debug!("NotificationStore::subscribe: called");
        let mut state = self.lock();

        let (tx, rx) = mpsc::unbounded_channel();
        // Cannot fail: rx is alive
        let _ = tx.send(state.snapshot());
        state.subscribers.push(tx);

        Subscription { rx }
    }

    /// Current list without subscribing
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.lock().items.iter().find(|n| n.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Number of live subscriptions (closed ones are pruned first)
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationKind;

    fn error_request() -> NotificationRequest {
        NotificationRequest::new(NotificationKind::Error, "Error", "Save failed")
    }

    #[test]
    fn test_submit_assigns_increasing_ids() {
        let store = NotificationStore::new();
        let a = store.submit(NotificationRequest::new(NotificationKind::Info, "a", "1"));
        let b = store.submit(NotificationRequest::new(NotificationKind::Info, "b", "2"));

        let (a, b) = (a.id().unwrap(), b.id().unwrap());
        assert!(b > a);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let store = NotificationStore::new();
        assert!(store.submit(error_request()).is_accepted());
        assert!(store.submit(error_request()).is_rejected());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_text_different_kind_accepted() {
        let store = NotificationStore::new();
        assert!(store.submit(error_request()).is_accepted());
        let warning = NotificationRequest::new(NotificationKind::Warning, "Error", "Save failed");
        assert!(store.submit(warning).is_accepted());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_rejected_submission_does_not_publish() {
        let store = NotificationStore::new();
        let _ = store.submit(error_request());
        let mut sub = store.subscribe();
        let initial = sub.try_next().unwrap();

        assert!(store.submit(error_request()).is_rejected());
        assert!(sub.try_next().is_none());
        assert_eq!(store.snapshot().seq(), initial.seq());
    }

    #[test]
    fn test_duplicate_rejected_while_fading() {
        let store = NotificationStore::new();
        let id = store.submit(error_request()).id().unwrap();
        assert!(store.mark_fading(id));
        assert!(store.submit(error_request()).is_rejected());
    }

    #[test]
    fn test_remove_releases_key() {
        let store = NotificationStore::new();
        let id = store.submit(error_request()).id().unwrap();
        assert!(store.remove(id));
        assert!(store.is_empty());

        let again = store.submit(error_request());
        assert!(again.is_accepted());
        assert_ne!(again.id(), Some(id));
    }

    #[test]
    fn test_mark_fading_once() {
        let store = NotificationStore::new();
        let id = store.submit(error_request()).id().unwrap();

        assert!(store.mark_fading(id));
        assert!(!store.mark_fading(id));
        assert_eq!(store.get(id).unwrap().phase, Phase::Fading);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let store = NotificationStore::new();
        let id = store.submit(error_request()).id().unwrap();
        assert!(store.remove(id));

        let mut sub = store.subscribe();
        let _ = sub.try_next();

        assert!(!store.mark_fading(id));
        assert!(!store.remove(id));
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn test_clear_all_releases_all_keys() {
        let store = NotificationStore::new();
        let _ = store.submit(error_request());
        let _ = store.submit(NotificationRequest::new(NotificationKind::Success, "Saved", "OK"));

        assert_eq!(store.clear_all(), 2);
        assert!(store.is_empty());
        assert!(store.submit(error_request()).is_accepted());
    }

    #[test]
    fn test_clear_all_on_empty_still_publishes() {
        let store = NotificationStore::new();
        let mut sub = store.subscribe();
        let _ = sub.try_next();

        assert_eq!(store.clear_all(), 0);
        let snapshot = sub.try_next().unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_subscribe_receives_current_list_immediately() {
        let store = NotificationStore::new();
        let id = store.submit(error_request()).id().unwrap();

        let mut sub = store.subscribe();
        let initial = sub.try_next().unwrap();
        assert_eq!(initial.len(), 1);
        assert!(initial.contains(id));
    }

    #[test]
    fn test_every_mutation_publishes_once_in_order() {
        let store = NotificationStore::new();
        let mut sub = store.subscribe();
        let initial = sub.try_next().unwrap();

        let id = store.submit(error_request()).id().unwrap();
        store.mark_fading(id);
        store.remove(id);

        let s1 = sub.try_next().unwrap();
        let s2 = sub.try_next().unwrap();
        let s3 = sub.try_next().unwrap();
        assert!(sub.try_next().is_none());

        assert_eq!(s1.seq(), initial.seq() + 1);
        assert_eq!(s2.seq(), initial.seq() + 2);
        assert_eq!(s3.seq(), initial.seq() + 3);
        assert_eq!(s1.get(id).unwrap().phase, Phase::Visible);
        assert_eq!(s2.get(id).unwrap().phase, Phase::Fading);
        assert!(!s3.contains(id));
    }

    #[test]
    fn test_phase_change_keeps_insertion_order() {
        let store = NotificationStore::new();
        let a = store.submit(NotificationRequest::new(NotificationKind::Info, "a", "1")).id().unwrap();
        let b = store.submit(NotificationRequest::new(NotificationKind::Info, "b", "2")).id().unwrap();
        let c = store.submit(NotificationRequest::new(NotificationKind::Info, "c", "3")).id().unwrap();

        store.mark_fading(b);
        let ids: Vec<_> = store.snapshot().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn test_latest_drains_buffer() {
        let store = NotificationStore::new();
        let mut sub = store.subscribe();
        let _ = store.submit(NotificationRequest::new(NotificationKind::Info, "a", "1"));
        let _ = store.submit(NotificationRequest::new(NotificationKind::Info, "b", "2"));

        let latest = sub.latest().unwrap();
        assert_eq!(latest.len(), 2);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let store = NotificationStore::new();
        let sub = store.subscribe();
        let _keep = store.subscribe();
        assert_eq!(store.subscriber_count(), 2);

        drop(sub);
        let _ = store.submit(error_request());
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_multiple_subscribers_see_same_sequence() {
        let store = NotificationStore::new();
        let mut sub1 = store.subscribe();
        let mut sub2 = store.subscribe();

        let _ = store.submit(error_request());

        let a: Vec<u64> = std::iter::from_fn(|| sub1.try_next()).map(|s| s.seq()).collect();
        let b: Vec<u64> = std::iter::from_fn(|| sub2.try_next()).map(|s| s.seq()).collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }
}
