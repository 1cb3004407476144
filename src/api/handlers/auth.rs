//! Handlers for sign-up, login and access-token refresh.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use validator::Validate;

use crate::api::dto::auth::{
    AccountResponse, LoginRequest, LoginResponse, SignUpRequest, TokenResponse,
};
use crate::domain::entities::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// Registers an account.
///
/// # Endpoint
///
/// `POST /api/v1/signup`
///
/// # Request Body
///
/// ```json
/// { "email": "user@example.com", "password": "secret" }
/// ```
///
/// # Response
///
/// ```json
/// { "id": 1, "email": "user@example.com", "is_enabled": false }
/// ```
///
/// # Errors
///
/// - 400 for a malformed body, an invalid email or an empty password
/// - 422 if the email is already registered
pub async fn signup_handler(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<Json<AccountResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let account = state
        .auth_service
        .sign_up(&payload.email, &payload.password)
        .await?;

    Ok(Json(account.into()))
}

/// Exchanges credentials for an access token and a refresh token.
///
/// # Endpoint
///
/// `POST /api/v1/login`
///
/// # Errors
///
/// - 400 for a malformed body or an invalid email
/// - 401 `login failed` for an unknown email or a wrong password alike
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let tokens = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        message: "login successful",
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// Mints a new access token for a caller that still holds a stored refresh token.
///
/// # Endpoint
///
/// `GET /api/v1/token` (bearer access token required)
pub async fn token_handler(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<TokenResponse>, AppError> {
    let access_token = state.auth_service.refresh_access_token(principal).await?;

    Ok(Json(TokenResponse {
        message: "token generation successful",
        access_token,
    }))
}
