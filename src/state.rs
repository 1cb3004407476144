//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AuthService, LinkService};
use crate::domain::repositories::{AccountRepository, LinkRepository};
use crate::infrastructure::cache::SessionStore;

pub type DynLinkService = LinkService<dyn LinkRepository>;
pub type DynAuthService = AuthService<dyn AccountRepository, dyn SessionStore>;

/// Cloned into each request; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub auth_service: Arc<DynAuthService>,
    /// Session store handle, pinged by the health check.
    pub cache: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(
        link_service: Arc<DynLinkService>,
        auth_service: Arc<DynAuthService>,
        cache: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            link_service,
            auth_service,
            cache,
        }
    }
}
