//! Helpers shared by services, handlers and the admin CLI.
//!
//! - [`code_generator`] - Short code generation and alias validation
//! - [`url_normalizer`] - Destination URL normalization
//! - [`jwt`] - Access token signing and verification
//! - [`password`] - bcrypt hashing on the blocking pool

pub mod code_generator;
pub mod jwt;
pub mod password;
pub mod url_normalizer;
