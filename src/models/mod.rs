// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod note;
mod query;

// Re-export all public types
pub use config::{Config, CrawlerConfig, EndpointConfig};
pub use note::{ItemStub, NoteKind, NoteRecord};
pub use query::{NoteTypeFilter, SearchQuery, SortMode};
