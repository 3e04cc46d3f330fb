//! Domain models for the newsroom.
//!
//! These are validated domain objects returned by repositories and consumed by
//! services. HTTP request and response shapes live next to their routes.

pub mod account;
pub mod article;
pub mod category;
pub mod identity;
pub mod tag;

pub use account::{Account, AccountChanges, NewAccount};
pub use article::{Article, ArticleDraft, AuthorRef, CategoryRef, TagRef};
pub use category::{Category, CategoryDraft};
pub use identity::Identity;
pub use tag::{Tag, TagDraft};
