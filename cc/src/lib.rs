//! Catalog - movie catalog client with transient status notifications
//!
//! An admin and user client for a movie catalog service. Screens are
//! role-guarded; every outcome a user should hear about (import succeeded,
//! search failed, duplicate movie) is raised through one shared
//! [`notifystore::Notifier`], which deduplicates it and expires it on a timer.
//!
//! # Modules
//!
//! - [`session`] - Roles, users, session storage and the auth trait
//! - [`guard`] - Routes and role guards
//! - [`login`] - Login form validation and flow
//! - [`catalog`] - Catalog service trait, errors and in-memory backend
//! - [`dashboard`] - Admin dashboard flows
//! - [`render`] / [`watch`] - Console output of notification lists
//! - [`demo`] - Scripted admin session
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod catalog;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod demo;
pub mod guard;
pub mod login;
pub mod render;
pub mod session;
pub mod watch;

pub use catalog::{CatalogApi, CatalogError, ImportReport, InMemoryCatalog, Movie, SearchResult};
pub use config::Config;
pub use dashboard::AdminDashboard;
pub use guard::{Access, Route};
pub use session::{AuthApi, InMemorySession, Role, SessionStore, User};
