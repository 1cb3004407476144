//! Handlers for link management endpoints.
//!
//! Every handler acts on behalf of the authenticated [`Principal`]; links owned
//! by other accounts are refused with 401.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
};

use crate::api::dto::link::{
    CreateLinkRequest, LinkListResponse, LinkResponse, MessageResponse, UpdateLinkRequest,
};
use crate::api::dto::pagination::PaginationParams;
use crate::domain::entities::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/v1`
///
/// # Request Body
///
/// ```json
/// { "url": "example.com/page", "alias": "my-link" }
/// ```
///
/// `alias` may be omitted or empty, in which case a code is generated.
///
/// # Errors
///
/// - 400 for a malformed body or an invalid URL
/// - 422 for an alias outside 5-10 characters, with bad characters, or already taken
pub async fn create_link_handler(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<Json<LinkResponse>, AppError> {
    let Json(payload) = payload?;

    let link = state
        .link_service
        .create_link(
            principal.account_id,
            &payload.url,
            payload.alias.as_deref(),
        )
        .await?;

    Ok(Json(link.into()))
}

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/urls?page=1&page_size=100`
pub async fn list_links_handler(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<LinkListResponse>, AppError> {
    let Query(params) = query?;
    let (page, page_size) = params.resolve()?;

    let (links, total) = state
        .link_service
        .list_links(principal.account_id, page, page_size)
        .await?;

    Ok(Json(LinkListResponse {
        urls: links.into_iter().map(LinkResponse::from).collect(),
        total,
        page,
        page_size,
    }))
}

/// `GET /api/v1/urls/{id}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    principal: Principal,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<LinkResponse>, AppError> {
    let Path(id) = id?;
    let link = state.link_service.get_link(principal.account_id, id).await?;
    Ok(Json(link.into()))
}

/// Replaces the link's code with a new alias.
///
/// # Endpoint
///
/// `PUT /api/v1/urls/{id}` with body `{ "alias": "new-alias" }`
///
/// A foreign or unknown link is reported before a malformed body.
pub async fn update_link_handler(
    State(state): State<AppState>,
    principal: Principal,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateLinkRequest>, JsonRejection>,
) -> Result<Json<LinkResponse>, AppError> {
    let Path(id) = id?;
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            state.link_service.get_link(principal.account_id, id).await?;
            return Err(rejection.into());
        }
    };

    let link = state
        .link_service
        .update_alias(principal.account_id, id, &payload.alias)
        .await?;

    Ok(Json(link.into()))
}

/// `DELETE /api/v1/urls/{id}`
pub async fn delete_link_handler(
    State(state): State<AppState>,
    principal: Principal,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = id?;
    state
        .link_service
        .delete_link(principal.account_id, id)
        .await?;

    Ok(Json(MessageResponse {
        message: "url deleted",
    }))
}
