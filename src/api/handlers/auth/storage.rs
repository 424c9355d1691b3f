//! User persistence behind a repository seam.
//!
//! Flows only touch `UserRepository`; the production impl runs instrumented
//! queries against Postgres, and tests swap in an in-memory double.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::types::PublicUser;

/// Identity record as stored. The password is present only as a one-way
/// hash; `created_at` is set by the store and never mutated.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Profile fields safe to return to clients.
    #[must_use]
    pub fn public(&self) -> PublicUser {
        PublicUser {
            name: self.name.clone(),
            email: self.email.clone(),
            mobile: self.mobile.clone(),
        }
    }
}

/// Fields supplied when creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password_hash: String,
}

/// Outcome of an insert against the store's uniqueness constraints.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(UserRecord),
    /// Email or mobile already taken (storage-level race with the
    /// pre-insert duplicate checks).
    Conflict,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<UserRecord>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;
    async fn create(&self, user: NewUser) -> Result<CreateOutcome>;
    /// Rotate the password hash; answers `None` when no account has that
    /// email.
    async fn update_password(&self, email: &str, password_hash: &str)
        -> Result<Option<UserRecord>>;
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Postgres-backed repository.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, query: &'static str, value: &str) -> Result<Option<UserRecord>> {
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user")?;
        Ok(row.map(|row| record_from_row(&row)))
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        mobile: row.get("mobile"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.fetch_one_by(
            "SELECT id, name, email, mobile, password_hash, created_at \
             FROM users WHERE email = $1",
            email,
        )
        .await
    }

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<UserRecord>> {
        self.fetch_one_by(
            "SELECT id, name, email, mobile, password_hash, created_at \
             FROM users WHERE mobile = $1",
            mobile,
        )
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let query = "SELECT id, name, email, mobile, password_hash, created_at \
                     FROM users WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by id")?;
        Ok(row.map(|row| record_from_row(&row)))
    }

    async fn create(&self, user: NewUser) -> Result<CreateOutcome> {
        let query = r"
            INSERT INTO users (name, email, mobile, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, mobile, password_hash, created_at
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.mobile)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(CreateOutcome::Created(record_from_row(&row))),
            Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }

    async fn update_password(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>> {
        let query = r"
            UPDATE users
            SET password_hash = $2
            WHERE email = $1
            RETURNING id, name, email, mobile, password_hash, created_at
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to update password")?;
        Ok(row.map(|row| record_from_row(&row)))
    }
}
