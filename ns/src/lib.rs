//! NotifyStore - ephemeral, deduplicated status notifications
//!
//! A process-wide queue of timed status messages ("toasts") raised from many
//! uncoordinated call sites. Each accepted notification moves through
//! `Visible -> Fading -> removed` on timers owned by a single coordinator.
//!
//! # Architecture
//!
//! ```text
//!  dashboards / login flow / ...
//!        │ success() error() warning() info() dismiss() clear_all()
//!        ▼
//! ┌───────────────┐  accepted id   ┌──────────────────────┐
//! │   Notifier    │ ─────────────► │ LifecycleCoordinator │  id-keyed, cancellable
//! └──────┬────────┘                │  Display ─► Fade     │  tokio timers
//!        │ submit                  └──────────┬───────────┘
//!        ▼                                    │ mark_fading / remove
//! ┌───────────────────┐ ◄─────────────────────┘
//! │ NotificationStore │  dedup keys, ordered list, ids
//! └──────┬────────────┘
//!        │ Snapshot{seq, items} per mutation
//!        ▼
//!  Subscription / NotificationView (presentation layer)
//! ```
//!
//! # Guarantees
//!
//! - At most one active notification per `(title, message, kind)`; a
//!   duplicate submission is rejected without any state change.
//! - Phases only move forward; list order is insertion order.
//! - Every mutation publishes exactly one snapshot before returning.
//! - Dismissal and teardown cancel timers so none fires afterwards.
//!
//! # Example
//!
//! ```rust,ignore
//! use notifystore::{Notifier, NotifyConfig};
//!
//! let notifier = Notifier::new(NotifyConfig::default())?;
//! let mut view = notifier.mount();
//!
//! notifier.error("Error", "Save failed", None);
//! notifier.error("Error", "Save failed", None); // rejected
//!
//! while let Some(list) = view.changed().await {
//!     for n in list {
//!         println!("{} {} {}", n.kind, n.title, n.message);
//!     }
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod notification;
pub mod notifier;
pub mod store;
pub mod view;

pub use config::NotifyConfig;
pub use coordinator::{LifecycleCoordinator, TimerStage};
pub use error::NotifyError;
pub use notification::{Notification, NotificationAction, NotificationId, NotificationKind, NotificationRequest, Phase};
pub use notifier::Notifier;
pub use store::{NotificationStore, Snapshot, Submission, Subscription};
pub use view::NotificationView;
