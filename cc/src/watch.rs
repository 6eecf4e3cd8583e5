//! Follow a mounted notification view on the console

use std::io::Write;

use eyre::{Context, Result};
use notifystore::{NotificationView, Notifier, Snapshot};
use tracing::debug;

use crate::cli::OutputFormat;
use crate::render::{render_json, render_snapshot};

/// Write one snapshot in the requested format
pub fn print_snapshot(out: &mut dyn Write, snapshot: &Snapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "-- #{} --", snapshot.seq()).context("Failed to write output")?;
            for line in render_snapshot(snapshot) {
                writeln!(out, "  {}", line).context("Failed to write output")?;
            }
        }
        OutputFormat::Json => {
            let json = render_json(snapshot).context("Failed to encode snapshot")?;
            writeln!(out, "{}", json).context("Failed to write output")?;
        }
    }
    Ok(())
}

/// Print every list change until no lifecycle timer is left running
///
/// Sticky notifications never change on their own, so the loop also stops
/// once only those remain. Returns the number of snapshots printed.
pub async fn follow(
    notifier: &Notifier,
    view: &mut NotificationView,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<usize> {
    debug!("follow: called");
    view.refresh();
    print_snapshot(out, view.notifications(), format)?;
    let mut printed = 1;

    while notifier.pending_timers() > 0 {
        let Some(snapshot) = view.changed().await else {
            debug!("follow: view unmounted");
            break;
        };
        print_snapshot(out, snapshot, format)?;
        printed += 1;
    }

    // Timers that expired together may have published past the last wakeup
    while let Some(snapshot) = view.next_buffered() {
        print_snapshot(out, snapshot, format)?;
        printed += 1;
    }

    debug!(printed, "follow: done");
    Ok(printed)
}
