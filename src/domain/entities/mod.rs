//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without persistence concerns.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL owned by an account
//! - [`Account`] - A registered user with a bcrypt password hash
//! - [`Principal`] - The authenticated identity attached to a request
//!
//! Creation inputs use separate structs (`NewLink`, `NewAccount`).

pub mod account;
pub mod link;

pub use account::{Account, NewAccount, Principal};
pub use link::{Link, LinkTotals, NewLink};
