//! Errors raised by the notification core
//!
//! Almost everything in this crate is absorbed as a no-op: duplicate
//! submissions are reported through [`Submission::Rejected`](crate::Submission)
//! and stale ids are ignored. The only hard failure is wiring.

use thiserror::Error;

/// Errors from building the notification machinery
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Lifecycle timers are tokio tasks; a runtime must be entered first
    #[error("No tokio runtime available to drive notification timers")]
    NoRuntime,
}
