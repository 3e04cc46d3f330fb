//! Business logic services.
//!
//! # Services
//!
//! - `accounts` - Account administration
//! - `articles` - Article authoring, transactional with tag reconciliation
//! - `auth` - Password sign-in and bearer tokens
//! - `categories` / `tags` - Taxonomy management
//! - `policy` - Role-based access decisions
//! - `profile` - Self-service profile and password changes
//! - `statistics` - Article statistics over a date range
//! - `tag_sync` - Article tag reconciliation
//! - `validation` - Uniqueness, deletability and field checks

pub mod accounts;
pub mod articles;
pub mod auth;
pub mod categories;
pub mod policy;
pub mod profile;
pub mod statistics;
pub mod tag_sync;
pub mod tags;
pub mod validation;

pub use accounts::{AccountInput, AccountService};
pub use articles::{ArticleInput, ArticleService};
pub use auth::{AuthError, AuthService, LoginOutcome, TokenService};
pub use categories::{CategoryInput, CategoryService};
pub use policy::{Operation, authorize, require};
pub use profile::{Profile, ProfileService};
pub use statistics::NewsStatistics;
pub use tags::{TagInput, TagService};
