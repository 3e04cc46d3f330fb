//! Newsdesk Core - Shared domain types.
//!
//! This crate provides the types used across all Newsdesk components:
//! - `api` - HTTP API server for accounts, categories, tags and articles
//! - `cli` - Command-line tools for migrations and account bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, account roles and reporting date ranges

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
