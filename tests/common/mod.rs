#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use linkward::config::Config;
use linkward::domain::clock::Clock;
use linkward::domain::entities::{NewShortLink, NewUser, ShortLink, User};
use linkward::domain::repositories::{
    LinkRepository, StoreError, StoreResult, UniqueKey, UserRepository,
};
use linkward::infrastructure::cache::{CacheError, CacheResult, CacheService, NullCache};
use linkward::infrastructure::mail::{MailError, MailResult, Mailer, VerificationEmail, WelcomeEmail};
use linkward::routes::build_router;
use linkward::state::{AppState, Backends};

pub const SECRET_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
pub const BASE_URL: &str = "https://lw.example";
pub const PASSWORD: &str = "str0ngpa55w0rd";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".to_string(),
        redis_url: None,
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        cache_ttl_seconds: 3600,
        base_url: BASE_URL.to_string(),
        site_name: "Linkward".to_string(),
        mail_from: "no-reply@lw.example".to_string(),
        smtp_host: None,
        smtp_port: 587,
        smtp_username: None,
        smtp_password: None,
        jwt_secret: SECRET_HEX.to_string(),
        jwt_expire_minutes: 15,
        verification_ttl_minutes: 60,
        short_code_length: 8,
        request_timeout_seconds: 15,
        mail_timeout_seconds: 2,
        require_api_version: false,
        db_max_connections: 1,
        db_connect_timeout: 1,
        db_idle_timeout: 60,
        db_max_lifetime: 60,
    }
}

/// Clock the tests can move forward.
pub struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// In-memory user store enforcing the same unique keys as PostgreSQL.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
    pub fail_ping: AtomicBool,
}

impl InMemoryUsers {
    pub fn by_email(&self, email: &str) -> Option<User> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::UniqueViolation(UniqueKey::Email));
        }
        if rows
            .iter()
            .any(|u| u.verification_token == new_user.verification_token)
        {
            return Err(StoreError::UniqueViolation(UniqueKey::VerificationToken));
        }
        let user = new_user.into_user();
        rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.by_email(email))
    }

    async fn find_by_verification_token(&self, token: Uuid) -> StoreResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.verification_token == token)
            .cloned())
    }

    async fn set_verified(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        if user.verified {
            return Ok(false);
        }
        user.verified = true;
        user.updated_at = at;
        Ok(true)
    }

    async fn set_api_key(&self, id: Uuid, api_key: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|u| u.id != id && u.api_key.as_deref() == Some(api_key))
        {
            return Err(StoreError::UniqueViolation(UniqueKey::ApiKey));
        }
        let user = rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        user.api_key = Some(api_key.to_string());
        user.updated_at = at;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        Ok(())
    }
}

/// In-memory link store enforcing the same unique keys as PostgreSQL.
#[derive(Default)]
pub struct InMemoryLinks {
    rows: Mutex<Vec<ShortLink>>,
    /// Number of `find_by_code` calls served.
    pub lookups: AtomicUsize,
}

impl InMemoryLinks {
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn insert(&self, link: ShortLink) {
        self.rows.lock().unwrap().push(link);
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinks {
    async fn create(&self, new_link: NewShortLink) -> StoreResult<ShortLink> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|l| l.owner == new_link.owner && l.original_url == new_link.original_url)
        {
            return Err(StoreError::UniqueViolation(UniqueKey::OriginalUrl));
        }
        if rows.iter().any(|l| l.short_code == new_link.short_code) {
            return Err(StoreError::UniqueViolation(UniqueKey::ShortCode));
        }
        let link = new_link.into_short_link();
        rows.push(link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<ShortLink>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.short_code == code)
            .cloned())
    }

    async fn find_by_original_url(
        &self,
        owner: Uuid,
        original_url: &str,
    ) -> StoreResult<Option<ShortLink>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.owner == owner && l.original_url == original_url)
            .cloned())
    }
}

/// Cache held in a map, with switchable read failures.
#[derive(Default)]
pub struct StubCache {
    entries: Mutex<HashMap<String, String>>,
    pub fail_get: AtomicBool,
}

impl StubCache {
    pub fn put(&self, code: &str, url: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(code.to_string(), url.to_string());
    }

    pub fn entry(&self, code: &str) -> Option<String> {
        self.entries.lock().unwrap().get(code).cloned()
    }
}

#[async_trait]
impl CacheService for StubCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::Connection("connection reset".to_string()));
        }
        Ok(self.entry(short_code))
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        self.put(short_code, original_url);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.fail_get.load(Ordering::SeqCst)
    }

    fn backend(&self) -> &'static str {
        "stub"
    }
}

/// Mailer that keeps every message it was asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    pub verifications: Mutex<Vec<(String, VerificationEmail)>>,
    pub welcomes: Mutex<Vec<(String, WelcomeEmail)>>,
    pub fail: AtomicBool,
}

impl RecordingMailer {
    /// Verification token from the last verification mail sent to `to`.
    pub fn last_verification_token(&self, to: &str) -> Option<String> {
        self.verifications
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(recipient, _)| recipient == to)
            .and_then(|(_, mail)| mail.link.split("?v=").nth(1).map(str::to_string))
    }

    pub fn welcome_count(&self) -> usize {
        self.welcomes.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification(&self, to: &str, content: &VerificationEmail) -> MailResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Delivery("smtp unavailable".to_string()));
        }
        self.verifications
            .lock()
            .unwrap()
            .push((to.to_string(), content.clone()));
        Ok(())
    }

    async fn send_welcome(&self, to: &str, content: &WelcomeEmail) -> MailResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Delivery("smtp unavailable".to_string()));
        }
        self.welcomes
            .lock()
            .unwrap()
            .push((to.to_string(), content.clone()));
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub users: Arc<InMemoryUsers>,
    pub links: Arc<InMemoryLinks>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<TestClock>,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config())
}

pub fn spawn_app_with(config: Config) -> TestApp {
    spawn_app_with_cache(config, Arc::new(NullCache))
}

pub fn spawn_app_with_cache(config: Config, cache: Arc<dyn CacheService>) -> TestApp {
    let users = Arc::new(InMemoryUsers::default());
    let links = Arc::new(InMemoryLinks::default());
    let mailer = Arc::new(RecordingMailer::default());
    let clock = Arc::new(TestClock::new());

    let state = AppState::new(
        &config,
        Backends {
            users: users.clone(),
            links: links.clone(),
            cache,
            mailer: mailer.clone(),
            clock: clock.clone(),
        },
    )
    .unwrap();

    let app = build_router(
        state.clone(),
        std::time::Duration::from_secs(config.request_timeout_seconds),
    );
    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        state,
        users,
        links,
        mailer,
        clock,
    }
}

impl TestApp {
    pub async fn signup(&self, email: &str) {
        self.server
            .post("/auth/signup")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    /// Signs up `email` and returns a session token for it.
    pub async fn login_new_user(&self, email: &str) -> String {
        self.signup(email).await;

        let response = self
            .server
            .post("/auth/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .await;
        response.assert_status_ok();

        response.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn shorten(&self, token: &str, url: &str) -> axum_test::TestResponse {
        self.server
            .post("/url/shorten")
            .authorization_bearer(token)
            .json(&json!({ "url": url }))
            .await
    }
}
