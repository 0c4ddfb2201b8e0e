//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use affiliate_ledger_core::{Email, UserId};

use super::{StoreError, conflict_or_database};
use crate::models::User;

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|e| StoreError::DataCorruption(format!("invalid email in database: {e}")))?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    /// Returns `StoreError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, name, created_at
            FROM ledger.users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email already exists.
    /// Returns `StoreError::Database` for other database errors.
    pub async fn create(&self, email: &Email, name: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO ledger.users (email, name)
            VALUES ($1, $2)
            RETURNING id, email, name, created_at
            ",
        )
        .bind(email.as_str())
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "email"))?;

        row.try_into()
    }
}
