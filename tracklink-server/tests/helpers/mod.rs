//! Test helper utilities
//!
//! Shared fakes and fixtures for the tracklink-server test suites.
#![allow(dead_code)]

pub mod db_utils;
pub mod fake_catalog;

pub use db_utils::{memory_pool, test_config};
pub use fake_catalog::{playlist_fixture, track_fixture, FakeCatalog};
