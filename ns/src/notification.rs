//! Notification domain types
//!
//! A [`Notification`] is one transient status message. It is created from a
//! [`NotificationRequest`] when the store accepts a submission and lives until
//! it is removed, passing through [`Phase::Visible`] and [`Phase::Fading`].

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a notification at acceptance time
///
/// Ids are allocated from a monotonically increasing counter and never
/// reused, so a stale timer can never hit a newer notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(u64);

impl NotificationId {
    pub(crate) fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Numeric sequence behind this id
    pub fn seq(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification-{}", self.0)
    }
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    /// Icon used when a submission does not carry its own
    pub fn default_icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "fas fa-check-circle",
            NotificationKind::Error => "fas fa-exclamation-circle",
            NotificationKind::Warning => "fas fa-exclamation-triangle",
            NotificationKind::Info => "fas fa-info-circle",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }

    /// Style class for renderers (`notification-<kind>`)
    pub fn type_class(&self) -> String {
        format!("notification-{}", self.as_str())
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(NotificationKind::Success),
            "error" => Ok(NotificationKind::Error),
            "warning" | "warn" => Ok(NotificationKind::Warning),
            "info" => Ok(NotificationKind::Info),
            other => Err(format!("unknown notification kind: {}", other)),
        }
    }
}

/// Lifecycle position of a notification
///
/// The only transition is `Visible -> Fading`; after fading the notification
/// is removed from the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Visible,
    Fading,
}

/// Optional call-to-action shown alongside a notification
///
/// The `command` is an opaque key that the host maps to behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub label: String,
    pub command: String,
}

impl NotificationAction {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// One active notification, as published in snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    /// Resolved at acceptance; the kind's default unless the request set one
    icon: String,
    /// Time before fading starts; `None` means sticky
    #[serde(with = "duration_ms", rename = "display-duration-ms")]
    pub display_duration: Option<Duration>,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
    #[serde(rename = "created-at")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub(crate) fn accept(id: NotificationId, request: NotificationRequest) -> Self {
        Self {
            id,
            title: request.title,
            message: request.message,
            kind: request.kind,
            icon: request.icon.unwrap_or_else(|| request.kind.default_icon().to_string()),
            display_duration: request.display_duration.filter(|d| !d.is_zero()),
            phase: Phase::Visible,
            action: request.action,
            created_at: Utc::now(),
        }
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn is_fading(&self) -> bool {
        self.phase == Phase::Fading
    }

    /// True when the notification never expires on its own
    pub fn is_sticky(&self) -> bool {
        self.display_duration.is_none()
    }

    pub(crate) fn dedup_key(&self) -> DedupKey {
        DedupKey::new(&self.title, &self.message, self.kind)
    }
}

/// Everything a caller supplies when submitting a notification
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub icon: Option<String>,
    /// `None` or zero means sticky
    pub display_duration: Option<Duration>,
    pub action: Option<NotificationAction>,
}

impl NotificationRequest {
    /// Create a sticky request; use [`with_duration`](Self::with_duration) to make it expire
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            icon: None,
            display_duration: None,
            action: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.display_duration = Some(duration);
        self
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }

    pub(crate) fn dedup_key(&self) -> DedupKey {
        DedupKey::new(&self.title, &self.message, self.kind)
    }
}

/// Identity used to suppress duplicate notifications
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct DedupKey {
    title: String,
    message: String,
    kind: NotificationKind,
}

impl DedupKey {
    fn new(title: &str, message: &str, kind: NotificationKind) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            kind,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Whole milliseconds, rounded up so a non-zero duration never reads as sticky
    pub fn to_ms(value: Option<Duration>) -> u64 {
        match value {
            Some(d) if !d.is_zero() => u64::try_from(d.as_millis()).unwrap_or(u64::MAX).max(1),
            _ => 0,
        }
    }

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(to_ms(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let ms = u64::deserialize(deserializer)?;
        Ok(if ms == 0 { None } else { Some(Duration::from_millis(ms)) })
    }
}
