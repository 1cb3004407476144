//! Data Transfer Objects for API requests and responses.
//!
//! Request bodies derive `validator::Validate` where a field has a format rule;
//! alias rules live in the link service so create and update share them.

pub mod auth;
pub mod health;
pub mod link;
pub mod pagination;
