//! Request handlers as plain functions
//!
//! Each function takes a parsed request value and the store, runs one
//! stateless transaction and returns `Result<_, TaskyError>`. HTTP concerns
//! (status codes, cookies, path extraction) live in the API crate.
//!
//! - [`auth`]: signup and login
//! - [`todos`]: per-user task CRUD

pub mod auth;
pub mod todos;
