//! Notifier - the entry point collaborators use to raise notifications
//!
//! Ties a [`NotificationStore`] to a [`LifecycleCoordinator`]: every accepted
//! submission gets its countdown scheduled, dismissals and clears cancel the
//! timers they make obsolete.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::NotifyConfig;
use crate::coordinator::LifecycleCoordinator;
use crate::error::NotifyError;
use crate::notification::{Notification, NotificationId, NotificationKind, NotificationRequest};
use crate::store::{NotificationStore, Snapshot, Submission, Subscription};
use crate::view::NotificationView;

/// Cloneable handle for raising and dismissing notifications
///
/// All clones share one store and one coordinator.
#[derive(Clone)]
pub struct Notifier {
    store: Arc<NotificationStore>,
    coordinator: LifecycleCoordinator,
    config: NotifyConfig,
}

impl Notifier {
    /// Create a notifier whose timers run on the current tokio runtime
    pub fn new(config: NotifyConfig) -> Result<Self, NotifyError> {
        debug!(?config, "Notifier::new: called");
        let runtime = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        Ok(Self::with_runtime(config, runtime))
    }

    /// Create a notifier whose timers run on `runtime`
    pub fn with_runtime(config: NotifyConfig, runtime: Handle) -> Self {
        debug!(?config, "Notifier::with_runtime: called");
        let store = Arc::new(NotificationStore::new());
        let coordinator = LifecycleCoordinator::with_runtime(store.clone(), config.fade_window(), runtime);
        Self {
            store,
            coordinator,
            config,
        }
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    /// Submit a fully specified request
    ///
    /// The request's own duration is used as is: `None` or zero is sticky.
    pub fn submit(&self, request: NotificationRequest) -> Submission {
        debug!(title = %request.title, kind = %request.kind, "Notifier::submit: called");
        let display_duration = request.display_duration;
        let submission = self.store.submit(request);
        if let Submission::Accepted(id) = submission {
            self.coordinator.schedule(id, display_duration);
        }
        submission
    }

    /// Raise a notification of `kind`
    ///
    /// `duration: None` falls back to the configured default duration.
    pub fn notify(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> Submission {
        let mut request = NotificationRequest::new(kind, title, message);
        request.display_duration = duration.or_else(|| self.config.default_duration());
        self.submit(request)
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>, duration: Option<Duration>) -> Submission {
        self.notify(NotificationKind::Success, title, message, duration)
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>, duration: Option<Duration>) -> Submission {
        self.notify(NotificationKind::Error, title, message, duration)
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>, duration: Option<Duration>) -> Submission {
        self.notify(NotificationKind::Warning, title, message, duration)
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>, duration: Option<Duration>) -> Submission {
        self.notify(NotificationKind::Info, title, message, duration)
    }

    /// Fade out and remove a notification ahead of its natural expiry
    pub fn dismiss(&self, id: NotificationId) {
        debug!(%id, "Notifier::dismiss: called");
        self.coordinator.dismiss(id);
    }

    /// Drop every notification and every timer
    ///
    /// Identical notifications can be submitted again right after.
    pub fn clear_all(&self) -> usize {
        debug!("Notifier::clear_all: called");
        self.coordinator.cancel_all();
        self.store.clear_all()
    }

    /// Cancel every pending timer without removing anything
    ///
    /// Called when the presentation layer goes away so no timer publishes
    /// into a dead view. Notifications stay where they are; later
    /// submissions schedule fresh timers.
    pub fn teardown(&self) -> usize {
        let cancelled = self.coordinator.cancel_all();
        info!(cancelled, "Notifier torn down");
        cancelled
    }

    pub fn subscribe(&self) -> Subscription {
        self.store.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.store.get(id)
    }

    /// Number of timers currently pending
    pub fn pending_timers(&self) -> usize {
        self.coordinator.pending()
    }

    /// Attach a presentation layer
    pub fn mount(&self) -> NotificationView {
        NotificationView::mount(self.clone())
    }
}
