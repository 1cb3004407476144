//! Account entity and the authenticated principal.

use chrono::{DateTime, Utc};

/// A registered user.
///
/// The password is only ever held as a bcrypt hash. Accounts start disabled.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Input data for registering an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
}

/// Identity of the caller, established from a verified access token.
///
/// Inserted into request extensions by the auth middleware and extracted by
/// protected handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub account_id: i64,
}

impl Principal {
    pub fn new(account_id: i64) -> Self {
        Self { account_id }
    }
}
