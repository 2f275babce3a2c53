//! PostgreSQL connection management for the discovery engine.
//!
//! Provides pooled connections with retry, migration running, and health
//! checks on top of SeaORM.
//!
//! # Example
//!
//! ```ignore
//! use database::postgres;
//! use migration::Migrator;
//!
//! let db = postgres::connect_with_retry(&config.url, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "discovery").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig, retry, retry_with_backoff};
