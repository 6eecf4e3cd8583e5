//! Scripted admin session against the in-memory catalog
//!
//! Walks through login, search, imports and deletes, printing the
//! notification list after each step, then follows the list until every
//! timed notification has expired.

use std::io::Write;
use std::sync::Arc;

use eyre::{Context, Result, eyre};
use notifystore::{NotificationView, Notifier};
use tracing::{debug, info};

use crate::catalog::{CatalogError, InMemoryCatalog, Operation};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::dashboard::AdminDashboard;
use crate::guard::{Route, navigate};
use crate::login::{LoginForm, login};
use crate::session::InMemorySession;
use crate::watch::{follow, print_snapshot};

/// Counters reported at the end of a demo run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoSummary {
    pub steps: usize,
    pub movies: usize,
    pub snapshots: usize,
}

struct Script<'a> {
    view: NotificationView,
    format: OutputFormat,
    out: &'a mut dyn Write,
    steps: usize,
}

impl Script<'_> {
    fn step(&mut self, label: &str) -> Result<()> {
        self.steps += 1;
        info!(step = self.steps, %label, "demo: step");
        if self.format == OutputFormat::Text {
            writeln!(self.out, "==> {}", label).context("Failed to write output")?;
        }
        self.view.refresh();
        print_snapshot(self.out, self.view.notifications(), self.format)
    }
}

pub async fn run_demo(config: &Config, format: OutputFormat, out: &mut dyn Write) -> Result<DemoSummary> {
    debug!(?format, "run_demo: called");
    let notifier = Notifier::new(config.notifications.clone())?;
    let catalog = Arc::new(InMemoryCatalog::seeded().with_base_url(&config.catalog.base_url));
    let session = InMemorySession::new();
    info!(base_url = catalog.base_url(), "run_demo: using in-memory catalog");

    let mut script = Script {
        view: notifier.mount(),
        format,
        out,
        steps: 0,
    };
    if format == OutputFormat::Text {
        writeln!(script.out, "==> catalog {}", catalog.base_url()).context("Failed to write output")?;
    }

    let outcome = login(catalog.as_ref(), &session, &LoginForm::new("admin", "admin"))
        .await
        .context("Demo login failed")?;
    if navigate(&session, outcome.redirect.path()) != Route::AdminDashboard {
        return Err(eyre!("admin guard rejected the demo session"));
    }
    let _ = notifier.success("Login successful!", "Welcome to MovieHub!", None);
    script.step(&format!("logged in as {} -> {}", outcome.user.username, outcome.redirect))?;

    let mut dashboard = AdminDashboard::new(catalog.clone(), notifier.clone(), config.catalog.page_size);
    dashboard.open(&session).await;

    dashboard.search("matrix").await;
    script.step(&format!("search 'matrix': {} results", dashboard.search_results().len()))?;

    let first = dashboard
        .search_results()
        .first()
        .map(|r| r.external_id.clone())
        .ok_or_else(|| eyre!("seeded index has no match for 'matrix'"))?;
    dashboard.add(&first).await;
    script.step(&format!("add {}", first))?;

    dashboard.add(&first).await;
    script.step(&format!("add {} again", first))?;

    for _ in 0..3 {
        catalog.fail_next(Operation::Search, CatalogError::Network).await;
        dashboard.search("blade").await;
    }
    script.step("search 'blade' fails three times")?;

    dashboard.search("blade").await;
    dashboard.batch_add().await;
    script.step(&format!("import all results ({} movies in catalog)", dashboard.movies().len()))?;

    dashboard.toggle_batch_mode();
    let picked: Vec<u64> = dashboard.paginated().iter().take(2).map(|m| m.id).collect();
    for id in &picked {
        dashboard.toggle_selection(*id);
    }
    dashboard.batch_delete(true).await;
    script.step(&format!("batch delete {} movies", picked.len()))?;

    let movies = dashboard.movies().len();
    let Script { mut view, format, out, steps } = script;
    if format == OutputFormat::Text {
        writeln!(out, "==> waiting for notifications to expire").context("Failed to write output")?;
    }
    let snapshots = follow(&notifier, &mut view, format, out).await?;
    let _ = view.unmount();

    let summary = DemoSummary {
        steps,
        movies,
        snapshots,
    };
    info!(?summary, "run_demo: finished");
    Ok(summary)
}
