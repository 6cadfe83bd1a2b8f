//! # Tasky API Server Library
//!
//! HTTP front end for Tasky: configuration, telemetry, the Axum router and
//! the adapters between HTTP requests and `tasky_shared::service`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Session and request body extractors
//! - `routes`: Route handlers
//! - `telemetry`: Logging, request tracing and span export

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod telemetry;
