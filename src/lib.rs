//! Lume Connect - Rating, match, and messaging service for Lume dating app
//!
//! This library owns the rating -> match -> messaging lifecycle: it turns
//! two independent likes into a mutual match, gates conversations on the
//! match state, and keeps read/unread state consistent.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{CoreError, MatchingEngine, Messenger};
pub use crate::models::{Match, MatchView, Message, Rating, RatingKind, UserSummary};
