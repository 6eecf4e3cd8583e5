//! Console rendering of notification lists

use chrono::Local;
use colored::{ColoredString, Colorize};
use notifystore::{Notification, NotificationKind, Snapshot};
use serde_json::json;

fn badge(kind: NotificationKind) -> ColoredString {
    let label = format!("[{}]", kind);
    match kind {
        NotificationKind::Success => label.green(),
        NotificationKind::Error => label.red(),
        NotificationKind::Warning => label.yellow(),
        NotificationKind::Info => label.cyan(),
    }
}

/// One notification as a single console line
pub fn render_notification(n: &Notification) -> String {
    // Multi-line messages (import reports) are folded onto one line
    let message = n.message.lines().collect::<Vec<_>>().join(", ");
    let stamp = n.created_at.with_timezone(&Local).format("%H:%M:%S").to_string();
    let mut line = format!("{} {} {} - {}", stamp.dimmed(), badge(n.kind), n.title.bold(), message);
    if let Some(action) = &n.action {
        line.push_str(&format!(" [{}]", action.label.underline()));
    }
    if n.is_fading() {
        format!("{} {}", line.dimmed(), "(fading)".dimmed())
    } else {
        line
    }
}

/// Every notification of a snapshot, oldest first
pub fn render_snapshot(snapshot: &Snapshot) -> Vec<String> {
    if snapshot.is_empty() {
        return vec!["(no notifications)".dimmed().to_string()];
    }
    snapshot.iter().map(render_notification).collect()
}

/// Snapshot as one JSON document
pub fn render_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string(&json!({
        "seq": snapshot.seq(),
        "notifications": snapshot.items(),
    }))
}
