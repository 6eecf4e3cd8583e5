//! Admin dashboard: search the external index, import, browse and delete
//!
//! Every outcome the user should hear about goes through the shared
//! [`Notifier`]; nothing here keeps its own message list.

use std::collections::BTreeSet;
use std::sync::Arc;

use notifystore::Notifier;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogApi, Movie, SearchResult};
use crate::guard::Route;
use crate::session::{SessionStore, User};

/// Dashboard state for one admin session
pub struct AdminDashboard {
    catalog: Arc<dyn CatalogApi>,
    notifier: Notifier,
    current_user: Option<User>,
    search_query: String,
    search_results: Vec<SearchResult>,
    movies: Vec<Movie>,
    selected: BTreeSet<u64>,
    batch_mode: bool,
    current_page: usize,
    page_size: usize,
}

impl AdminDashboard {
    pub fn new(catalog: Arc<dyn CatalogApi>, notifier: Notifier, page_size: usize) -> Self {
        debug!(page_size, "AdminDashboard::new: called");
        Self {
            catalog,
            notifier,
            current_user: None,
            search_query: String::new(),
            search_results: Vec::new(),
            movies: Vec::new(),
            selected: BTreeSet::new(),
            batch_mode: false,
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Pick up the session user and load the catalog
    pub async fn open(&mut self, session: &dyn SessionStore) {
        debug!("AdminDashboard::open: called");
        self.current_user = session.current_user();
        self.load_movies().await;
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn logout(&mut self, session: &dyn SessionStore) -> Route {
        debug!("AdminDashboard::logout: called");
        session.logout();
        self.current_user = None;
        Route::Login
    }

    // -------------------------------------------------------------------------
    // Search and import
    // -------------------------------------------------------------------------

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn search_results(&self) -> &[SearchResult] {
        &self.search_results
    }

    pub async fn search(&mut self, query: &str) {
        debug!(%query, "AdminDashboard::search: called");
        self.search_query = query.to_string();
        if query.trim().is_empty() {
            self.search_results.clear();
            return;
        }

        match self.catalog.search(query).await {
            Ok(results) => {
                debug!(count = results.len(), "AdminDashboard::search: results");
                self.search_results = results;
            }
            Err(e) => {
                warn!(error = %e, "AdminDashboard::search: failed");
                self.search_results.clear();
                let _ = self
                    .notifier
                    .error("Search Error", "Error searching movies. Please try again.", None);
            }
        }
    }

    /// Import one search result into the catalog
    pub async fn add(&mut self, external_id: &str) {
        debug!(%external_id, "AdminDashboard::add: called");
        match self.catalog.import(external_id).await {
            Ok(movie) => {
                info!(id = movie.id, title = %movie.title, "AdminDashboard::add: imported");
                let _ = self
                    .notifier
                    .success("Success!", "Movie added to database successfully!", None);
                self.load_movies().await;
                self.search_results.retain(|r| r.external_id != external_id);
            }
            Err(e) if e.is_already_exists() => {
                debug!(%external_id, "AdminDashboard::add: duplicate");
                let _ = self
                    .notifier
                    .warning("Duplicate Movie", "Movie already exists in database!", None);
            }
            Err(e) => {
                warn!(error = %e, "AdminDashboard::add: failed");
                let _ = self
                    .notifier
                    .error("Error", "Error adding movie to database. Please try again.", None);
            }
        }
    }

    /// Import every current search result
    pub async fn batch_add(&mut self) {
        debug!(count = self.search_results.len(), "AdminDashboard::batch_add: called");
        if self.search_results.is_empty() {
            let _ = self
                .notifier
                .warning("No Movies", "No movies to add. Please search for movies first.", None);
            return;
        }

        let ids: Vec<String> = self.search_results.iter().map(|r| r.external_id.clone()).collect();
        match self.catalog.import_many(&ids).await {
            Ok(report) => {
                info!(
                    imported = report.imported.len(),
                    skipped = report.skipped.len(),
                    errors = report.errors.len(),
                    "AdminDashboard::batch_add: done"
                );
                let message = format!(
                    "Import completed!\nImported: {}\nSkipped: {}\nErrors: {}",
                    report.imported.len(),
                    report.skipped.len(),
                    report.errors.len()
                );
                let _ = self.notifier.success("Import Complete", message, None);
                self.load_movies().await;
                self.search_results.clear();
                self.search_query.clear();
            }
            Err(e) => {
                warn!(error = %e, "AdminDashboard::batch_add: failed");
                let _ = self
                    .notifier
                    .error("Error", "Error importing movies. Please try again.", None);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Catalog listing and deletion
    // -------------------------------------------------------------------------

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub async fn load_movies(&mut self) {
        debug!("AdminDashboard::load_movies: called");
        match self.catalog.list().await {
            Ok(movies) => {
                self.movies = movies;
                self.current_page = self.current_page.clamp(1, self.total_pages().max(1));
            }
            Err(e) => {
                warn!(error = %e, "AdminDashboard::load_movies: failed");
                let _ = self.notifier.error("Error", "Error loading movies from database.", None);
            }
        }
    }

    /// Delete one movie once the user has confirmed
    pub async fn remove(&mut self, movie_id: u64, confirmed: bool) {
        debug!(movie_id, confirmed, "AdminDashboard::remove: called");
        if movie_id == 0 {
            let _ = self.notifier.error(
                "Invalid Input",
                "Error: Movie ID is missing or invalid. Cannot remove movie.",
                None,
            );
            return;
        }
        if !confirmed {
            debug!(movie_id, "AdminDashboard::remove: cancelled");
            return;
        }

        match self.catalog.remove(movie_id).await {
            Ok(status) if (200..300).contains(&status) => {
                info!(movie_id, "AdminDashboard::remove: removed");
                let _ = self
                    .notifier
                    .success("Success!", "Movie removed from database successfully!", None);
                self.load_movies().await;
            }
            Ok(status) => {
                warn!(movie_id, status, "AdminDashboard::remove: unexpected status");
                let _ = self
                    .notifier
                    .warning("Warning", "Movie removal completed with unexpected status.", None);
                self.load_movies().await;
            }
            Err(e) => {
                warn!(movie_id, error = %e, "AdminDashboard::remove: failed");
                let message = format!("Error removing movie from database: {}", e.describe());
                let _ = self.notifier.error("Error", message, None);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Batch selection
    // -------------------------------------------------------------------------

    pub fn is_batch_mode(&self) -> bool {
        self.batch_mode
    }

    /// Flip batch mode; the selection always starts empty
    pub fn toggle_batch_mode(&mut self) {
        self.batch_mode = !self.batch_mode;
        self.selected.clear();
    }

    pub fn toggle_selection(&mut self, movie_id: u64) {
        if !self.selected.remove(&movie_id) {
            self.selected.insert(movie_id);
        }
    }

    pub fn is_selected(&self, movie_id: u64) -> bool {
        self.selected.contains(&movie_id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Delete every selected movie once the user has confirmed
    pub async fn batch_delete(&mut self, confirmed: bool) {
        debug!(count = self.selected.len(), confirmed, "AdminDashboard::batch_delete: called");
        if self.selected.is_empty() {
            let _ = self
                .notifier
                .warning("No Selection", "Please select movies to delete.", None);
            return;
        }
        if !confirmed {
            return;
        }

        let ids: Vec<u64> = self.selected.iter().copied().collect();
        match self.catalog.remove_many(&ids).await {
            Ok(()) => {
                info!(count = ids.len(), "AdminDashboard::batch_delete: removed");
                let message = format!("{} movies deleted successfully!", ids.len());
                let _ = self.notifier.success("Success!", message, None);
                self.load_movies().await;
                self.selected.clear();
                self.batch_mode = false;
            }
            Err(e) => {
                warn!(error = %e, "AdminDashboard::batch_delete: failed");
                let _ = self
                    .notifier
                    .error("Error", "Error deleting movies. Please try again.", None);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.movies.len().div_ceil(self.page_size)
    }

    /// Movies on the current page
    pub fn paginated(&self) -> &[Movie] {
        let start = ((self.current_page - 1) * self.page_size).min(self.movies.len());
        let end = (start + self.page_size).min(self.movies.len());
        &self.movies[start..end]
    }

    /// Jump to `page`; out-of-range pages are ignored
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    pub fn page_numbers(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.total_pages()
    }
}
