//! # Health Tracker Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! embedded SQLite store. It is the system's permanent record of weigh-ins
//! and runs.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate encapsulates all database-specific logic. It
//!   provides a clean, abstract API to the rest of the application, hiding the
//!   underlying SQL and driver error types.
//! - **The store validates:** Range checks live in the schema as named
//!   `CHECK` constraints; violations come back as [`ValidationError`]s that
//!   name the offending field.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses a
//!   connection pool (`SqlitePool`) shared by every request.
//!
//! ## Public API
//!
//! - `connect` / `connect_lazy`: build the connection pool.
//! - `run_migrations`: idempotently ensures the `weighins` and `runs` tables exist.
//! - `HealthStore`: the data-access trait the service layer depends on.
//! - `DbRepository`: the SQLite implementation of `HealthStore`.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_lazy, run_migrations};
pub use error::{DbError, ValidationError};
pub use repository::DbRepository;
pub use store::HealthStore;
