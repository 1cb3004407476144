//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL owned by an account.
///
/// `short_code` is either a user alias (`is_alias == true`) or a code assigned
/// by the configured generator. `clicked` only ever grows.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    pub short_code: String,
    pub is_alias: bool,
    pub clicked: i64,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        user_id: i64,
        url: String,
        short_code: String,
        is_alias: bool,
        clicked: i64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            url,
            short_code,
            is_alias,
            clicked,
            updated_at,
        }
    }

    /// Returns true if `account_id` owns this link.
    pub fn is_owned_by(&self, account_id: i64) -> bool {
        self.user_id == account_id
    }
}

/// Input data for creating a link whose code is already known.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user_id: i64,
    pub url: String,
    pub short_code: String,
    pub is_alias: bool,
}

/// Aggregate counters over all links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkTotals {
    pub links: i64,
    pub clicks: i64,
}
