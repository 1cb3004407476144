//! DTOs for sign-up, login and token exchange.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Account;

/// Body of `POST /api/v1/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/v1/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
    pub is_enabled: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            is_enabled: account.is_enabled,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub message: &'static str,
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_email_validation() {
        let ok: SignUpRequest =
            serde_json::from_str(r#"{"email":"a@example.com","password":"x"}"#).unwrap();
        assert!(ok.validate().is_ok());

        let bad: SignUpRequest =
            serde_json::from_str(r#"{"email":"not-an-email","password":"x"}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_account_response_hides_hash() {
        let account = Account {
            id: 3,
            email: "a@example.com".to_string(),
            password_hash: "$2b$04$secret".to_string(),
            is_enabled: false,
            created_at: chrono::Utc::now(),
        };

        let json = serde_json::to_value(AccountResponse::from(account)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 3, "email": "a@example.com", "is_enabled": false })
        );
    }
}
