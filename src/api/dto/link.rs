//! DTOs for link creation, update and listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Body of `POST /api/v1`.
///
/// An absent or empty alias asks for a generated code.
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub url: String,
    #[serde(default)]
    pub alias: Option<String>,
}

/// Body of `PUT /api/v1/urls/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateLinkRequest {
    pub alias: String,
}

/// JSON representation of a link.
///
/// `short_url` is the code itself; clients prepend the host they reached.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub url: String,
    pub short_url: String,
    pub clicked: i64,
    pub is_alias: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            url: link.url,
            short_url: link.short_code,
            clicked: link.clicked,
            is_alias: link.is_alias,
            updated_at: link.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub urls: Vec<LinkResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
