//! Catalog API contract and an in-memory implementation
//!
//! The remote catalog service is a plain request/response collaborator:
//! search an external index, import records into the catalog database,
//! list and delete them. [`InMemoryCatalog`] backs the demo and the tests
//! and can be told to fail individual operations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::session::{AuthApi, Role, User};

/// A record stored in the catalog database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    #[serde(rename = "external-id")]
    pub external_id: String,
    pub title: String,
    pub year: String,
}

/// A candidate record from the external index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "external-id")]
    pub external_id: String,
    pub title: String,
    pub year: String,
}

impl SearchResult {
    pub fn new(external_id: impl Into<String>, title: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            title: title.into(),
            year: year.into(),
        }
    }
}

/// Result of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: Vec<Movie>,
    pub skipped: Vec<String>,
    pub errors: Vec<String>,
}

/// Failures reported by the catalog service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Network error - is your backend running?")]
    Network,

    #[error("Unauthorized (401)")]
    Unauthorized,

    #[error("Access forbidden (403)")]
    Forbidden,

    #[error("Movie not found (404)")]
    NotFound,

    #[error("Server error occurred (500)")]
    Server,

    #[error("Movie already exists")]
    AlreadyExists,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unexpected status {0}")]
    Status(u16),
}

impl CatalogError {
    /// Map an HTTP status (0 for "no response") to an error
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => CatalogError::Network,
            401 => CatalogError::Unauthorized,
            403 => CatalogError::Forbidden,
            404 => CatalogError::NotFound,
            409 => CatalogError::AlreadyExists,
            500 => CatalogError::Server,
            other => CatalogError::Status(other),
        }
    }

    /// Text suitable for a notification body
    pub fn describe(&self) -> String {
        match self {
            CatalogError::Status(_) => "Unknown error occurred".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, CatalogError::AlreadyExists)
    }
}

/// Catalog service operations
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Search the external index
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError>;

    /// Import one external record into the catalog
    async fn import(&self, external_id: &str) -> Result<Movie, CatalogError>;

    /// Import many external records; per-item problems land in the report
    async fn import_many(&self, external_ids: &[String]) -> Result<ImportReport, CatalogError>;

    /// Delete one record; returns the response status
    async fn remove(&self, id: u64) -> Result<u16, CatalogError>;

    /// Delete many records
    async fn remove_many(&self, ids: &[u64]) -> Result<(), CatalogError>;

    /// List every record in the catalog
    async fn list(&self) -> Result<Vec<Movie>, CatalogError>;
}

/// Operation selector for injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Search,
    Import,
    ImportMany,
    Remove,
    RemoveMany,
    List,
    Login,
}

struct Account {
    id: u64,
    password: String,
    role: Role,
}

/// Catalog held entirely in memory
pub struct InMemoryCatalog {
    base_url: String,
    index: Vec<SearchResult>,
    accounts: HashMap<String, Account>,
    movies: Mutex<Vec<Movie>>,
    next_id: AtomicU64,
    failures: Mutex<HashMap<Operation, CatalogError>>,
    remove_status: AtomicU64,
}

impl InMemoryCatalog {
    pub fn new(index: Vec<SearchResult>) -> Self {
        debug!(index_len = index.len(), "InMemoryCatalog::new: called");
        Self {
            base_url: String::new(),
            index,
            accounts: HashMap::new(),
            movies: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            failures: Mutex::new(HashMap::new()),
            remove_status: AtomicU64::new(204),
        }
    }

    /// Small built-in index and two accounts (`admin`/`admin`, `user`/`user`)
    pub fn seeded() -> Self {
        let index = vec![
            SearchResult::new("tt0133093", "The Matrix", "1999"),
            SearchResult::new("tt0234215", "The Matrix Reloaded", "2003"),
            SearchResult::new("tt0242653", "The Matrix Revolutions", "2003"),
            SearchResult::new("tt0083658", "Blade Runner", "1982"),
            SearchResult::new("tt1856101", "Blade Runner 2049", "2017"),
            SearchResult::new("tt0062622", "2001: A Space Odyssey", "1968"),
            SearchResult::new("tt0816692", "Interstellar", "2014"),
        ];
        Self::new(index)
            .with_account("admin", "admin", Role::Admin)
            .with_account("user", "user", Role::User)
    }

    /// Address this catalog stands in for
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn with_account(mut self, username: &str, password: &str, role: Role) -> Self {
        let account = Account {
            id: self.accounts.len() as u64 + 1,
            password: password.to_string(),
            role,
        };
        self.accounts.insert(username.to_string(), account);
        self
    }

    /// Make the next call of `operation` fail with `error`
    pub async fn fail_next(&self, operation: Operation, error: CatalogError) {
        debug!(?operation, %error, "InMemoryCatalog::fail_next: called");
        self.failures.lock().await.insert(operation, error);
    }

    /// Status code returned by successful deletes
    pub fn set_remove_status(&self, status: u16) {
        self.remove_status.store(u64::from(status), Ordering::SeqCst);
    }

    async fn check(&self, operation: Operation) -> Result<(), CatalogError> {
        match self.failures.lock().await.remove(&operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn import_one(&self, external_id: &str) -> Result<Movie, CatalogError> {
        let found = self
            .index
            .iter()
            .find(|r| r.external_id == external_id)
            .ok_or(CatalogError::NotFound)?;

        let mut movies = self.movies.lock().await;
        if movies.iter().any(|m| m.external_id == external_id) {
            return Err(CatalogError::AlreadyExists);
        }

        let movie = Movie {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            external_id: found.external_id.clone(),
            title: found.title.clone(),
            year: found.year.clone(),
        };
        movies.push(movie.clone());
        Ok(movie)
    }
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        debug!(%query, "InMemoryCatalog::search: called");
        self.check(Operation::Search).await?;
        let needle = query.to_lowercase();
        Ok(self
            .index
            .iter()
            .filter(|r| r.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn import(&self, external_id: &str) -> Result<Movie, CatalogError> {
        debug!(%external_id, "InMemoryCatalog::import: called");
        self.check(Operation::Import).await?;
        self.import_one(external_id).await
    }

    async fn import_many(&self, external_ids: &[String]) -> Result<ImportReport, CatalogError> {
        debug!(count = external_ids.len(), "InMemoryCatalog::import_many: called");
        self.check(Operation::ImportMany).await?;
        let mut report = ImportReport::default();
        for external_id in external_ids {
            match self.import_one(external_id).await {
                Ok(movie) => report.imported.push(movie),
                Err(CatalogError::AlreadyExists) => report.skipped.push(external_id.clone()),
                Err(e) => report.errors.push(format!("{}: {}", external_id, e)),
            }
        }
        Ok(report)
    }

    async fn remove(&self, id: u64) -> Result<u16, CatalogError> {
        debug!(%id, "InMemoryCatalog::remove: called");
        self.check(Operation::Remove).await?;
        let mut movies = self.movies.lock().await;
        let before = movies.len();
        movies.retain(|m| m.id != id);
        if movies.len() == before {
            return Err(CatalogError::NotFound);
        }
        Ok(self.remove_status.load(Ordering::SeqCst) as u16)
    }

    async fn remove_many(&self, ids: &[u64]) -> Result<(), CatalogError> {
        debug!(count = ids.len(), "InMemoryCatalog::remove_many: called");
        self.check(Operation::RemoveMany).await?;
        self.movies.lock().await.retain(|m| !ids.contains(&m.id));
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Movie>, CatalogError> {
        debug!("InMemoryCatalog::list: called");
        self.check(Operation::List).await?;
        Ok(self.movies.lock().await.clone())
    }
}

#[async_trait]
impl AuthApi for InMemoryCatalog {
    async fn login(&self, username: &str, password: &str) -> Result<User, CatalogError> {
        debug!(%username, "InMemoryCatalog::login: called");
        self.check(Operation::Login).await?;
        match self.accounts.get(username) {
            Some(account) if account.password == password => Ok(User {
                id: account.id,
                username: username.to_string(),
                role: account.role,
            }),
            _ => Err(CatalogError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(CatalogError::from_status(0), CatalogError::Network);
        assert_eq!(CatalogError::from_status(401), CatalogError::Unauthorized);
        assert_eq!(CatalogError::from_status(403), CatalogError::Forbidden);
        assert_eq!(CatalogError::from_status(404), CatalogError::NotFound);
        assert_eq!(CatalogError::from_status(409), CatalogError::AlreadyExists);
        assert_eq!(CatalogError::from_status(500), CatalogError::Server);
        assert_eq!(CatalogError::from_status(418), CatalogError::Status(418));
    }

    #[test]
    fn test_describe() {
        assert_eq!(CatalogError::Network.describe(), "Network error - is your backend running?");
        assert_eq!(CatalogError::NotFound.describe(), "Movie not found (404)");
        assert_eq!(CatalogError::Status(418).describe(), "Unknown error occurred");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let catalog = InMemoryCatalog::seeded();
        let results = catalog.search("matrix").await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(catalog.search("nothing like this").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_then_duplicate() {
        let catalog = InMemoryCatalog::seeded();
        let movie = catalog.import("tt0133093").await.unwrap();
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(catalog.import("tt0133093").await, Err(CatalogError::AlreadyExists));
        assert_eq!(catalog.import("tt9999999").await, Err(CatalogError::NotFound));
    }

    #[tokio::test]
    async fn test_import_many_report() {
        let catalog = InMemoryCatalog::seeded();
        catalog.import("tt0083658").await.unwrap();

        let ids = vec!["tt0083658".to_string(), "tt1856101".to_string(), "bogus".to_string()];
        let report = catalog.import_many(&ids).await.unwrap();
        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.skipped, vec!["tt0083658".to_string()]);
        assert_eq!(report.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_and_list() {
        let catalog = InMemoryCatalog::seeded();
        let a = catalog.import("tt0816692").await.unwrap();
        let b = catalog.import("tt0062622").await.unwrap();

        assert_eq!(catalog.remove(a.id).await, Ok(204));
        assert_eq!(catalog.remove(a.id).await, Err(CatalogError::NotFound));
        assert_eq!(catalog.list().await.unwrap(), vec![b.clone()]);

        catalog.remove_many(&[b.id]).await.unwrap();
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_applies_once() {
        let catalog = InMemoryCatalog::seeded();
        catalog.fail_next(Operation::List, CatalogError::Server).await;
        assert_eq!(catalog.list().await, Err(CatalogError::Server));
        assert!(catalog.list().await.is_ok());
    }

    #[tokio::test]
    async fn test_login() {
        let catalog = InMemoryCatalog::seeded();
        let admin = catalog.login("admin", "admin").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(catalog.login("admin", "wrong").await, Err(CatalogError::InvalidCredentials));
        assert_eq!(catalog.login("ghost", "x").await, Err(CatalogError::InvalidCredentials));
    }
}
