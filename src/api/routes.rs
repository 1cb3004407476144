//! API route configuration.
//!
//! Mounted under `/api/v1`. Sign-up and login are public; everything else
//! requires a bearer access token via [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
    login_handler, signup_handler, token_handler, update_link_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// # Endpoints
///
/// - `POST   /signup`      - Register an account
/// - `POST   /login`       - Obtain access and refresh tokens
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
}

/// # Endpoints
///
/// - `GET    /token`       - New access token from the stored refresh token
/// - `POST   /`            - Create a short link
/// - `GET    /urls`        - List the caller's links
/// - `GET    /urls/{id}`   - Read one link
/// - `PUT    /urls/{id}`   - Re-alias a link
/// - `DELETE /urls/{id}`   - Delete a link
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_link_handler))
        .route("/token", get(token_handler))
        .route("/urls", get(list_links_handler))
        .route(
            "/urls/{id}",
            get(get_link_handler)
                .put(update_link_handler)
                .delete(delete_link_handler),
        )
}

/// Public and protected routes, with authentication applied to the latter only.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new().merge(public_routes()).merge(
        protected_routes().route_layer(middleware::from_fn_with_state(state, auth::layer)),
    )
}
