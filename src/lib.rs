//! # Habitual
//!
//! A weekly habit tracker with versioned habit rules, usable both as a
//! standalone server binary and as a library.
//!
//! Habits carry a timeline of versions. A version takes effect on a Monday
//! and applies to that week and every later week until the next version
//! starts, so editing a habit never rewrites the past.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! habitual = { version = "0.0", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use habitual::engine::SystemClock;
//! use habitual::server::{AppState, create_router};
//! use habitual::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/habitual.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), Arc::new(SystemClock)));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
