//! # Tasky Shared Library
//!
//! This crate contains the data model, storage accessor, authentication
//! primitives and request handlers used by the Tasky API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `store`: Storage accessor trait with PostgreSQL and in-memory backends
//! - `auth`: Password hashing and session tokens
//! - `service`: Signup/login and per-user task operations
//! - `db`: Connection pool and migrations
//! - `error`: Domain error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

/// Current version of the Tasky shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
