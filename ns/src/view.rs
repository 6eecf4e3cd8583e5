//! NotificationView - presentation-side adapter over a [`Notifier`]
//!
//! A view subscribes when mounted, keeps the latest snapshot for rendering
//! and forwards dismiss clicks. Unmounting (explicitly or by dropping the
//! view) cancels every pending lifecycle timer and releases the
//! subscription, so nothing publishes into a view that no longer exists.

use tracing::debug;

use crate::notification::NotificationId;
use crate::notifier::Notifier;
use crate::store::{Snapshot, Subscription};

/// A mounted notification list
pub struct NotificationView {
    notifier: Notifier,
    subscription: Option<Subscription>,
    current: Snapshot,
}

impl NotificationView {
    pub(crate) fn mount(notifier: Notifier) -> Self {
        debug!("NotificationView::mount: called");
        let mut subscription = notifier.subscribe();
        let current = subscription.try_next().unwrap_or_else(|| notifier.snapshot());
        Self {
            notifier,
            subscription: Some(subscription),
            current,
        }
    }

    /// Latest list received
    pub fn notifications(&self) -> &Snapshot {
        &self.current
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Pull any buffered snapshots; returns `true` if the list changed
    pub fn refresh(&mut self) -> bool {
        let Some(latest) = self.subscription.as_mut().and_then(Subscription::latest) else {
            return false;
        };
        let changed = latest.seq() != self.current.seq();
        self.current = latest;
        changed
    }

    /// Wait for the next published list
    ///
    /// Returns `None` once the view is unmounted.
    pub async fn changed(&mut self) -> Option<&Snapshot> {
        let next = self.subscription.as_mut()?.next().await?;
        self.current = next;
        Some(&self.current)
    }

    /// Take the next snapshot that is already buffered, without waiting
    ///
    /// Returns `None` when nothing is queued or the view is unmounted.
    pub fn next_buffered(&mut self) -> Option<&Snapshot> {
        let next = self.subscription.as_mut()?.try_next()?;
        self.current = next;
        Some(&self.current)
    }

    /// Dismiss a notification from the view (close button)
    pub fn dismiss(&self, id: NotificationId) {
        debug!(%id, "NotificationView::dismiss: called");
        self.notifier.dismiss(id);
    }

    /// Detach from the notifier
    ///
    /// Cancels all pending timers without removing notifications and drops
    /// the subscription. Returns the number of timers cancelled.
    pub fn unmount(mut self) -> usize {
        self.detach()
    }

    fn detach(&mut self) -> usize {
        if self.subscription.take().is_none() {
            return 0;
        }
        debug!("NotificationView::detach: tearing down");
        self.notifier.teardown()
    }
}

impl Drop for NotificationView {
    fn drop(&mut self) {
        self.detach();
    }
}
