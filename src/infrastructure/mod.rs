//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and session storage.
//!
//! # Modules
//!
//! - [`cache`] - Refresh-token session store (Redis)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod persistence;
