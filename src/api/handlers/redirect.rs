//! Handler for short URL redirect.

use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::Method,
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// The click counter is incremented in the same statement that reads the
/// destination, so concurrent hits are all counted. `HEAD` gets the same
/// redirect without a click.
///
/// # Errors
///
/// Returns 404 `<code> not found` if no link has this code, and 404
/// `url not found` if the path segment cannot be decoded.
pub async fn redirect_handler(
    method: Method,
    State(state): State<AppState>,
    code: Result<Path<String>, PathRejection>,
) -> Result<Redirect, AppError> {
    let Path(code) = code?;

    let url = if method == Method::HEAD {
        state.link_service.lookup(&code).await?
    } else {
        state.link_service.resolve(&code).await?
    };

    tracing::debug!(code = %code, %method, "redirecting");
    Ok(Redirect::temporary(&url))
}
