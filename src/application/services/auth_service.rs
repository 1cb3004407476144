//! Account registration, login and token lifecycle.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{Account, NewAccount, Principal};
use crate::domain::repositories::AccountRepository;
use crate::error::AppError;
use crate::infrastructure::cache::SessionStore;
use crate::utils::jwt::JwtKeys;
use crate::utils::password::{hash_password, verify_password};
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Number of random bytes in a refresh token.
const REFRESH_TOKEN_BYTES: usize = 32;

/// Message shared by every failed login, whatever the cause.
const LOGIN_FAILED: &str = "login failed";

/// Token and hashing parameters for [`AuthService`].
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Signs access tokens and keys the refresh-token digest.
    pub secret: String,
    pub access_token_ttl_hours: i64,
    pub refresh_token_ttl: Duration,
    pub bcrypt_cost: u32,
}

/// Tokens handed out on a successful login.
#[derive(Debug, Clone)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Service for accounts and their credentials.
///
/// Access tokens are stateless JWTs. Refresh tokens are random strings whose
/// HMAC-SHA256 digest (keyed by the server secret) is kept in the session
/// store, one per account, so a dump of the store yields nothing usable.
pub struct AuthService<A: AccountRepository + ?Sized, S: SessionStore + ?Sized> {
    accounts: Arc<A>,
    sessions: Arc<S>,
    jwt: JwtKeys,
    settings: AuthSettings,
}

impl<A: AccountRepository + ?Sized, S: SessionStore + ?Sized> AuthService<A, S> {
    pub fn new(accounts: Arc<A>, sessions: Arc<S>, settings: AuthSettings) -> Self {
        let jwt = JwtKeys::new(&settings.secret, settings.access_token_ttl_hours);
        Self {
            accounts,
            sessions,
            jwt,
            settings,
        }
    }

    /// Registers a disabled account.
    ///
    /// The email is expected to be validated by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty password.
    /// Returns [`AppError::Conflict`] if the email is already registered.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Account, AppError> {
        if password.is_empty() {
            return Err(AppError::bad_request(
                "password must not be empty",
                json!({ "fields": ["password"] }),
            ));
        }

        if self.accounts.email_exists(email).await? {
            return Err(AppError::conflict("account already exists", json!({})));
        }

        let password_hash = hash_password(password, self.settings.bcrypt_cost).await?;
        let account = self
            .accounts
            .create(NewAccount {
                email: email.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(account_id = account.id, "account registered");
        Ok(account)
    }

    /// Checks credentials and opens a session.
    ///
    /// Any refresh token issued earlier for the account is replaced.
    ///
    /// # Errors
    ///
    /// Returns the same [`AppError::Unauthorized`] for an unknown email and for
    /// a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginTokens, AppError> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            tracing::info!("login refused: unknown account");
            return Err(AppError::unauthorized(LOGIN_FAILED));
        };

        if !verify_password(password, &account.password_hash).await? {
            tracing::info!(account_id = account.id, "login refused: bad password");
            return Err(AppError::unauthorized(LOGIN_FAILED));
        }

        let access_token = self.jwt.issue(account.id)?;
        let refresh_token = generate_refresh_token()?;

        self.sessions
            .save_refresh_token(
                account.id,
                &self.digest(&refresh_token),
                self.settings.refresh_token_ttl,
            )
            .await?;

        tracing::info!(account_id = account.id, "login successful");
        Ok(LoginTokens {
            access_token,
            refresh_token,
        })
    }

    /// Verifies an access token and returns the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for a bad signature, an expired token
    /// or a subject that is not an account id.
    pub fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let claims = self.jwt.verify(token)?;
        claims
            .account_id()
            .map(Principal::new)
            .ok_or_else(|| AppError::unauthorized("unauthorized"))
    }

    /// Mints a fresh access token if the principal still has a stored refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if nothing is stored for the account or
    /// the session store cannot be read.
    pub async fn refresh_access_token(&self, principal: Principal) -> Result<String, AppError> {
        let stored = self
            .sessions
            .load_refresh_token(principal.account_id)
            .await?;

        if stored.is_none() {
            tracing::warn!(
                account_id = principal.account_id,
                "no refresh token stored for account"
            );
            return Err(AppError::internal("refresh token missing"));
        }

        tracing::debug!(account_id = principal.account_id, "refresh token found");
        self.jwt.issue(principal.account_id)
    }

    /// Hex-encoded HMAC-SHA256 of a refresh token.
    fn digest(&self, token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.settings.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Draws a URL-safe refresh token from the OS random source.
fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    getrandom::fill(&mut bytes).map_err(AppError::internal)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
