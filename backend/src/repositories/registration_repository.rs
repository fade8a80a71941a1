//! Database repository for event registrations.

use crate::database::models::{CreateRegistration, Registration, RegistrationStatus};
use anyhow::Result;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const REGISTRATION_SELECT: &str = r#"
    SELECT
        r.id, r.user_id, r.event_id, r.status,
        e.title AS event_title, u.email AS user_email,
        r.created_at, r.updated_at
    FROM registrations r
    LEFT JOIN events e ON e.id = r.event_id
    LEFT JOIN users u ON u.id = r.user_id"#;

/// Optional equality filters of the registration listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationFilter {
    pub user_id: Option<i64>,
    pub event_id: Option<i64>,
}

impl RegistrationFilter {
    fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        let mut first = true;
        for (column, value) in [("r.user_id", self.user_id), ("r.event_id", self.event_id)] {
            if let Some(value) = value {
                builder
                    .push(if first { " WHERE " } else { " AND " })
                    .push(column)
                    .push(" = ")
                    .push_bind(value);
                first = false;
            }
        }
    }
}

/// Repository for registration database operations.
pub struct RegistrationRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> RegistrationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a registration. A second registration for the same
    /// `(user_id, event_id)` pair fails with a unique violation.
    pub async fn create_registration(&self, registration: CreateRegistration) -> Result<Registration> {
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO registrations (user_id, event_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(registration.user_id)
        .bind(registration.event_id)
        .bind(registration.status)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        self.get_registration_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("registration {} missing right after insert", id))
    }

    pub async fn get_registration_by_id(&self, id: i64) -> Result<Option<Registration>> {
        let sql = format!("{REGISTRATION_SELECT} WHERE r.id = ?");
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(registration)
    }

    /// Lists registrations newest first.
    pub async fn list_registrations(
        &self,
        filter: RegistrationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Registration>> {
        let mut builder = QueryBuilder::<Sqlite>::new(REGISTRATION_SELECT);
        filter.push_where(&mut builder);
        builder
            .push(" ORDER BY julianday(r.created_at) DESC, r.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let registrations = builder
            .build_query_as::<Registration>()
            .fetch_all(self.pool)
            .await?;

        Ok(registrations)
    }

    pub async fn count_registrations(&self, filter: RegistrationFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM registrations r");
        filter.push_where(&mut builder);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        Ok(total)
    }

    /// Changes the status of a registration. Returns `None` if it does not exist.
    pub async fn update_status(
        &self,
        id: i64,
        status: RegistrationStatus,
    ) -> Result<Option<Registration>> {
        let result = sqlx::query("UPDATE registrations SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_registration_by_id(id).await
    }

    pub async fn delete_registration(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
