//! REST API layer.
//!
//! Translates HTTP requests into service calls and service results into JSON.
//!
//! # Modules
//!
//! - [`dto`] - Request and response bodies
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Bearer authentication and request tracing
//! - [`routes`] - `/api/v1` route composition

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
