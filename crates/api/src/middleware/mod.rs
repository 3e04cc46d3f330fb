//! HTTP middleware and request extractors.
//!
//! # Layer Order (outermost first)
//!
//! 1. Sentry hub and HTTP context
//! 2. Panic catcher (500 envelope)
//! 3. `TraceLayer` (request span with status and latency)
//! 4. CORS

pub mod auth;

pub use auth::{OptionalAuth, RequireAuth};
