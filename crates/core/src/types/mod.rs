//! Core types for Newsdesk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod date_range;
pub mod email;
pub mod id;
pub mod role;

pub use date_range::{DateRange, DateRangeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::{AccountRole, RoleError};
