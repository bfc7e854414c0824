//! # Students Database Crate
//!
//! This crate is the persistence layer for student records. It is the single
//! source of truth: nothing above it keeps record state between requests.
//!
//! ## Architectural Principles
//!
//! - **Port and Adapter:** `Storage` is the contract the HTTP layer depends on.
//!   `DbRepository` is the SQLite implementation of it. Handlers never see SQL.
//! - **Single Round Trips:** Writes inspect the affected row count to detect a
//!   missing id instead of checking first and writing second.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share one
//!   `SqlitePool` created at startup.
//!
//! ## Public API
//!
//! - `connect`: Opens (and creates if needed) the database file as a pool.
//! - `run_migrations`: Applies the embedded schema. Safe to run on every start.
//! - `Storage`: The storage port.
//! - `DbRepository`: The SQLite adapter implementing `Storage`.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod storage;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_in_memory, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
pub use storage::Storage;
pub use sqlx::SqlitePool;
