//! Storage backend.
//!
//! This module provides the `SQLite` record store the evaluator loads its
//! batches from:
//! - Model metadata
//! - Verification records with their AI result
//! - Expert feedback
//!
//! # Architecture
//!
//! The storage layer uses `SQLite` with the `sqlx` crate for async operations.
//! The evaluation engine never depends on it directly; it reaches storage
//! only through the [`VerificationSource`](crate::traits::VerificationSource)
//! trait.
//!
//! The implementation is split across submodules for maintainability:
//! - `core`: Pool management, migrations, and helper functions
//! - `models`: Model CRUD operations
//! - `verifications`: Verification and feedback operations
//! - `trait_impl`: `VerificationSource` implementation
//!
//! # Example
//!
//! ```ignore
//! use model_evaluator::storage::SqliteStorage;
//! use model_evaluator::traits::VerificationSource;
//!
//! let storage = SqliteStorage::new("./data/evaluations.db").await?;
//! let model = storage.get_model("model-a").await?;
//! ```

mod core;
mod models;
mod trait_impl;
mod verifications;

pub use self::core::SqliteStorage;
