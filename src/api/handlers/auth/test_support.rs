//! In-memory collaborators for handler tests.

use crate::api::{
    email::{EmailMessage, EmailSender},
    handlers::auth::{
        password::hash_password,
        state::{AuthConfig, AuthState},
        storage::{CreateOutcome, NewUser, UserRecord, UserRepository},
        token::SessionTokens,
    },
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use uuid::Uuid;

pub(crate) const TEST_PASSWORD: &str = "secret123";

/// Vec-backed repository enforcing the same uniqueness rules as Postgres.
#[derive(Default)]
pub(crate) struct MemoryUserRepository {
    rows: Mutex<Vec<UserRecord>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|row| row.email == email).cloned())
    }

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<UserRecord>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|row| row.mobile == mobile).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<CreateOutcome> {
        let mut rows = self.rows.lock().await;
        if rows
            .iter()
            .any(|row| row.email == user.email || row.mobile == user.mobile)
        {
            return Ok(CreateOutcome::Conflict);
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            mobile: user.mobile,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        rows.push(record.clone());
        Ok(CreateOutcome::Created(record))
    }

    async fn update_password(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>> {
        let mut rows = self.rows.lock().await;
        match rows.iter_mut().find(|row| row.email == email) {
            Some(row) => {
                row.password_hash = password_hash.to_string();
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }
}

/// Captures outgoing mail; optionally fails every send.
#[derive(Default)]
pub(crate) struct RecordingEmailSender {
    failing: bool,
    sent: StdMutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    pub(crate) fn failing() -> Self {
        Self {
            failing: true,
            sent: StdMutex::new(Vec::new()),
        }
    }
}

impl EmailSender for RecordingEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.failing {
            return Err(anyhow!("smtp unavailable"));
        }
        self.sent
            .lock()
            .map_err(|_| anyhow!("poisoned sent log"))?
            .push(message.clone());
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub(crate) struct TestStateOptions {
    pub signup_otp_ttl_seconds: i64,
    pub reset_otp_ttl_seconds: i64,
    pub failing_mailer: bool,
}

impl Default for TestStateOptions {
    fn default() -> Self {
        Self {
            signup_otp_ttl_seconds: 60,
            reset_otp_ttl_seconds: 300,
            failing_mailer: false,
        }
    }
}

/// Handles onto the in-memory collaborators behind a test [`AuthState`].
pub(crate) struct TestHarness {
    users: Arc<MemoryUserRepository>,
    mailer: Arc<RecordingEmailSender>,
}

impl TestHarness {
    /// Insert an account directly, bypassing the signup flow. The password
    /// is always [`TEST_PASSWORD`].
    pub(crate) async fn seed(&self, name: &str, email: &str, mobile: &str) -> UserRecord {
        let hash = hash_password(TEST_PASSWORD).expect("hash test password");
        match self
            .users
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                mobile: mobile.to_string(),
                password_hash: hash,
            })
            .await
            .expect("memory repository never errors")
        {
            CreateOutcome::Created(record) => record,
            CreateOutcome::Conflict => panic!("seeded duplicate user"),
        }
    }

    pub(crate) fn sent(&self) -> Vec<EmailMessage> {
        self.mailer.sent.lock().expect("sent log").clone()
    }

    /// Pull the six-digit code out of the most recent email body.
    pub(crate) fn last_code(&self) -> Option<String> {
        let sent = self.sent();
        let message = sent.last()?;
        let re = Regex::new(r"\b(\d{6})\b").expect("static regex");
        re.captures(&message.html)
            .map(|caps| caps[1].to_string())
    }
}

pub(crate) async fn state_with(options: TestStateOptions) -> (Arc<AuthState>, TestHarness) {
    let users = Arc::new(MemoryUserRepository::default());
    let mailer = if options.failing_mailer {
        Arc::new(RecordingEmailSender::failing())
    } else {
        Arc::new(RecordingEmailSender::default())
    };

    let config = AuthConfig::new("http://localhost:3000")
        .with_signup_otp_ttl_seconds(options.signup_otp_ttl_seconds)
        .with_reset_otp_ttl_seconds(options.reset_otp_ttl_seconds);
    let state = Arc::new(AuthState::new(
        config,
        SessionTokens::new("test-signing-secret"),
        Arc::clone(&users) as Arc<dyn UserRepository>,
        Arc::clone(&mailer) as Arc<dyn EmailSender>,
    ));

    (state, TestHarness { users, mailer })
}
