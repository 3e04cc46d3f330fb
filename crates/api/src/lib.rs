//! Newsdesk API library.
//!
//! News-article management: accounts, categories, tags and articles behind a
//! JSON API with bearer-token authentication and role-based access.
//!
//! The crate is a library so the router can be driven in process by the
//! integration tests and the CLI can share the persistence and service layers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod query;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::AppError;
pub use routes::app;
pub use state::AppState;
