//! # Tracklink Common Library
//!
//! Shared code for the tracklink service:
//! - Canonical track/playlist data model
//! - Error taxonomy
//! - Standard HTTP response envelope
//! - Configuration loading

pub mod api;
pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
