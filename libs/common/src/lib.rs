//! Common library for the streamtube backend
//!
//! This crate provides the shared infrastructure used by the API service:
//! PostgreSQL connectivity, schema migrations, and database error handling.

pub mod database;
pub mod error;
