#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{Value, json};
use shortlink::application::services::{AuthService, AuthSettings, LinkService};
use shortlink::domain::entities::{Account, Link, LinkTotals, NewAccount, NewLink};
use shortlink::domain::repositories::{AccountRepository, LinkRepository};
use shortlink::error::AppError;
use shortlink::infrastructure::cache::{CacheError, CacheResult, SessionStore};
use shortlink::state::{AppState, DynAuthService, DynLinkService};
use shortlink::utils::code_generator::{CodeStrategy, ShortCodeEncoder};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const TEST_PASSWORD: &str = "correct horse";

struct LinkRow {
    id: i64,
    user_id: i64,
    url: String,
    short_code: Option<String>,
    is_alias: bool,
    clicked: i64,
}

impl LinkRow {
    fn to_link(&self) -> Option<Link> {
        self.short_code.as_ref().map(|code| {
            Link::new(
                self.id,
                self.user_id,
                self.url.clone(),
                code.clone(),
                self.is_alias,
                self.clicked,
                Utc::now(),
            )
        })
    }
}

/// In-memory link table with a unique code column.
///
/// Rows without a code are invisible to lookups, like the Postgres repository.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    rows: Mutex<Vec<LinkRow>>,
    next_id: Mutex<i64>,
    pub fail: AtomicBool,
}

impl InMemoryLinkRepository {
    fn check(&self) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::internal("database unavailable"));
        }
        Ok(())
    }

    fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }

    fn duplicate() -> AppError {
        AppError::conflict("Unique constraint violation", json!({}))
    }

    pub fn pending_rows(&self) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.short_code.is_none())
            .count()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        self.check()?;
        let id = self.next_id();
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|r| r.short_code.as_deref() == Some(new_link.short_code.as_str()))
        {
            return Err(Self::duplicate());
        }
        let row = LinkRow {
            id,
            user_id: new_link.user_id,
            url: new_link.url,
            short_code: Some(new_link.short_code),
            is_alias: new_link.is_alias,
            clicked: 0,
        };
        let link = row.to_link().unwrap();
        rows.push(row);
        Ok(link)
    }

    async fn insert_pending(&self, user_id: i64, url: &str) -> Result<i64, AppError> {
        self.check()?;
        let id = self.next_id();
        self.rows.lock().unwrap().push(LinkRow {
            id,
            user_id,
            url: url.to_string(),
            short_code: None,
            is_alias: false,
            clicked: 0,
        });
        Ok(id)
    }

    async fn set_code(
        &self,
        id: i64,
        code: &str,
        is_alias: bool,
    ) -> Result<Option<Link>, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|r| r.id != id && r.short_code.as_deref() == Some(code))
        {
            return Err(Self::duplicate());
        }
        Ok(rows.iter_mut().find(|r| r.id == id).and_then(|row| {
            row.short_code = Some(code.to_string());
            row.is_alias = is_alias;
            row.to_link()
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.id == id).and_then(LinkRow::to_link))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.short_code.as_deref() == Some(code))
            .and_then(LinkRow::to_link))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().any(|r| r.short_code.as_deref() == Some(code)))
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        let mut links: Vec<Link> = rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(LinkRow::to_link)
            .collect();
        links.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(links
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_by_user(&self, user_id: i64) -> Result<i64, AppError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.user_id == user_id && r.short_code.is_some())
            .count() as i64)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }

    async fn record_click(&self, code: &str) -> Result<Option<String>, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|r| r.short_code.as_deref() == Some(code))
            .map(|row| {
                row.clicked += 1;
                row.url.clone()
            }))
    }

    async fn totals(&self) -> Result<LinkTotals, AppError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        let live = rows.iter().filter(|r| r.short_code.is_some());
        Ok(LinkTotals {
            links: live.clone().count() as i64,
            clicks: live.map(|r| r.clicked).sum(),
        })
    }
}

#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<Vec<Account>>,
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.email == new_account.email) {
            return Err(AppError::conflict("Unique constraint violation", json!({})));
        }
        let account = Account {
            id: accounts.len() as i64 + 1,
            email: new_account.email,
            password_hash: new_account.password_hash,
            is_enabled: false,
            created_at: Utc::now(),
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().any(|a| a.email == email))
    }

    async fn list(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.accounts.lock().unwrap().clone())
    }
}

/// Session store without expiry; `healthy` toggles the health check.
pub struct InMemorySessionStore {
    tokens: Mutex<HashMap<i64, String>>,
    pub healthy: AtomicBool,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            healthy: AtomicBool::new(true),
        }
    }
}

impl InMemorySessionStore {
    pub fn stored(&self, account_id: i64) -> Option<String> {
        self.tokens.lock().unwrap().get(&account_id).cloned()
    }

    pub fn forget(&self, account_id: i64) {
        self.tokens.lock().unwrap().remove(&account_id);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save_refresh_token(
        &self,
        account_id: i64,
        value: &str,
        _ttl: Duration,
    ) -> CacheResult<()> {
        self.tokens
            .lock()
            .unwrap()
            .insert(account_id, value.to_string());
        Ok(())
    }

    async fn load_refresh_token(&self, account_id: i64) -> CacheResult<Option<String>> {
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(CacheError::OperationError("cache down".to_string()));
        }
        Ok(self.stored(account_id))
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

/// Test server over the full router plus handles on its backing fakes.
pub struct TestApp {
    pub server: TestServer,
    pub links: Arc<InMemoryLinkRepository>,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub sessions: Arc<InMemorySessionStore>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_strategy(CodeStrategy::Derived)
}

pub fn create_test_app_with_strategy(strategy: CodeStrategy) -> TestApp {
    let links = Arc::new(InMemoryLinkRepository::default());
    let accounts = Arc::new(InMemoryAccountRepository::default());
    let sessions = Arc::new(InMemorySessionStore::default());

    let link_service: Arc<DynLinkService> = Arc::new(LinkService::new(
        links.clone() as Arc<dyn LinkRepository>,
        strategy,
        ShortCodeEncoder::default(),
    ));
    let auth_service: Arc<DynAuthService> = Arc::new(AuthService::new(
        accounts.clone() as Arc<dyn AccountRepository>,
        sessions.clone() as Arc<dyn SessionStore>,
        AuthSettings {
            secret: TEST_SECRET.to_string(),
            access_token_ttl_hours: 1,
            refresh_token_ttl: Duration::from_secs(3600),
            bcrypt_cost: 4,
        },
    ));

    let state = AppState::new(
        link_service,
        auth_service,
        sessions.clone() as Arc<dyn SessionStore>,
    );
    let server = TestServer::new(shortlink::routes::router(state)).unwrap();

    TestApp {
        server,
        links,
        accounts,
        sessions,
    }
}

impl TestApp {
    /// Signs up and logs in, returning the login response body.
    pub async fn register(&self, email: &str) -> Value {
        self.server
            .post("/api/v1/signup")
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .await
            .assert_status_ok();

        let response = self
            .server
            .post("/api/v1/login")
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    /// Registers an account and returns its access token.
    pub async fn access_token(&self, email: &str) -> String {
        self.register(email).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Creates a link and returns its JSON representation.
    pub async fn create_link(&self, token: &str, body: Value) -> Value {
        let response = self
            .server
            .post("/api/v1")
            .authorization_bearer(token)
            .json(&body)
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }
}

/// Inserts an account row directly, for Postgres repository tests.
pub async fn create_test_account(pool: &sqlx::PgPool, email: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO accounts (email, password_hash) VALUES ($1, 'x') RETURNING id",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap()
}
