//! Application layer services implementing business logic.
//!
//! Services consume repository and session-store traits and give HTTP handlers
//! and the admin CLI one place to apply validation and ownership rules.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Code assignment, resolution and link management
//! - [`services::auth_service::AuthService`] - Sign-up, login and access/refresh tokens

pub mod services;
