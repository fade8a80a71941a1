//! Database repository for user management operations.
//!
//! Provides CRUD operations for system users

use crate::database::models::{NewUser, User, UserChanges};
use anyhow::Result;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, role, created_at, updated_at";

/// Repository for user database operations.
///
/// Emails are stored normalized; the `COLLATE NOCASE` unique index makes
/// lookups and the uniqueness check case-insensitive regardless.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database.
    ///
    /// # Arguments
    /// * `user` - NewUser holding the already hashed password
    ///
    /// # Returns
    /// The newly created User with all fields populated
    pub async fn create_user(&self, user: NewUser) -> Result<User> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.role)
            .bind(now)
            .bind(now)
            .fetch_one(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their unique identifier.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by email address (case-insensitive).
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Lists users ordered by id.
    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC LIMIT ? OFFSET ?");
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        Ok(users)
    }

    pub async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Writes the present columns of `changes` and bumps `updated_at`.
    ///
    /// # Returns
    /// The updated user, or `None` if no user has this id
    pub async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE users SET ");
        let mut columns = builder.separated(", ");

        if let Some(first_name) = changes.first_name {
            columns.push("first_name = ").push_bind_unseparated(first_name);
        }
        if let Some(last_name) = changes.last_name {
            columns.push("last_name = ").push_bind_unseparated(last_name);
        }
        if let Some(email) = changes.email {
            columns.push("email = ").push_bind_unseparated(email);
        }
        if let Some(password_hash) = changes.password_hash {
            columns.push("password_hash = ").push_bind_unseparated(password_hash);
        }
        if let Some(role) = changes.role {
            columns.push("role = ").push_bind_unseparated(role);
        }
        columns.push("updated_at = ").push_bind_unseparated(Utc::now());

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(USER_COLUMNS);

        let user = builder
            .build_query_as::<User>()
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Deletes a user. Registrations cascade; staff applications keep their
    /// row with `user_id` cleared.
    pub async fn delete_user(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
