//! Database repository for staff applications.
//!
//! Applications belong to an event and may optionally be linked to the user
//! who submitted them.

use crate::database::models::{
    ApplicationStatus, CreateStaffApplication, StaffApplication, UpdateStaffApplication,
};
use anyhow::Result;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const APPLICATION_COLUMNS: &str = "id, event_id, user_id, first_name, last_name, email, \
    nickname, phone, major, cohort, student_code, title, position_applied, experience, \
    motivation, portfolio_url, resume_url, status, applied_at, updated_at";

/// Repository for staff application database operations.
pub struct StaffApplicationRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> StaffApplicationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Stores a new application with status `pending`.
    pub async fn create_application(
        &self,
        event_id: i64,
        user_id: Option<i64>,
        application: CreateStaffApplication,
    ) -> Result<StaffApplication> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO staff_applications (
                event_id, user_id, first_name, last_name, email, nickname, phone, major,
                cohort, student_code, title, position_applied, experience, motivation,
                portfolio_url, resume_url, status, applied_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {APPLICATION_COLUMNS}"
        );

        let created = sqlx::query_as::<_, StaffApplication>(&sql)
            .bind(event_id)
            .bind(user_id)
            .bind(application.first_name)
            .bind(application.last_name)
            .bind(application.email)
            .bind(application.nickname)
            .bind(application.phone)
            .bind(application.major)
            .bind(application.cohort)
            .bind(application.student_code)
            .bind(application.title)
            .bind(application.position_applied)
            .bind(application.experience)
            .bind(application.motivation)
            .bind(application.portfolio_url)
            .bind(application.resume_url)
            .bind(ApplicationStatus::Pending)
            .bind(now)
            .bind(now)
            .fetch_one(self.pool)
            .await?;

        Ok(created)
    }

    pub async fn get_application_by_id(&self, id: i64) -> Result<Option<StaffApplication>> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM staff_applications WHERE id = ?");
        let application = sqlx::query_as::<_, StaffApplication>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(application)
    }

    /// Lists an event's applications newest first, optionally by status.
    pub async fn list_by_event(
        &self,
        event_id: i64,
        status: Option<ApplicationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StaffApplication>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder
            .push(APPLICATION_COLUMNS)
            .push(" FROM staff_applications WHERE event_id = ")
            .push_bind(event_id);
        if let Some(status) = status {
            builder.push(" AND status = ").push_bind(status);
        }
        builder
            .push(" ORDER BY julianday(applied_at) DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let applications = builder
            .build_query_as::<StaffApplication>()
            .fetch_all(self.pool)
            .await?;

        Ok(applications)
    }

    pub async fn count_by_event(
        &self,
        event_id: i64,
        status: Option<ApplicationStatus>,
    ) -> Result<i64> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM staff_applications WHERE event_id = ");
        builder.push_bind(event_id);
        if let Some(status) = status {
            builder.push(" AND status = ").push_bind(status);
        }

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        Ok(total)
    }

    /// Writes the present fields and bumps `updated_at`.
    /// Returns `None` if the application does not exist.
    pub async fn update_application(
        &self,
        id: i64,
        changes: UpdateStaffApplication,
    ) -> Result<Option<StaffApplication>> {
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE staff_applications SET ");
        let mut columns = builder.separated(", ");

        if let Some(status) = changes.status {
            columns.push("status = ").push_bind_unseparated(status);
        }
        if let Some(first_name) = changes.first_name {
            columns.push("first_name = ").push_bind_unseparated(first_name);
        }
        if let Some(last_name) = changes.last_name {
            columns.push("last_name = ").push_bind_unseparated(last_name);
        }
        if let Some(email) = changes.email {
            columns.push("email = ").push_bind_unseparated(email);
        }

        let optional_columns = [
            ("nickname", changes.nickname),
            ("phone", changes.phone),
            ("major", changes.major),
            ("cohort", changes.cohort),
            ("student_code", changes.student_code),
            ("title", changes.title),
            ("position_applied", changes.position_applied),
            ("experience", changes.experience),
            ("motivation", changes.motivation),
            ("portfolio_url", changes.portfolio_url),
            ("resume_url", changes.resume_url),
        ];
        for (column, value) in optional_columns {
            if let Some(value) = value {
                columns.push(column).push_unseparated(" = ").push_bind_unseparated(value);
            }
        }
        columns.push("updated_at = ").push_bind_unseparated(Utc::now());

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(APPLICATION_COLUMNS);

        let updated = builder
            .build_query_as::<StaffApplication>()
            .fetch_optional(self.pool)
            .await?;

        Ok(updated)
    }

    pub async fn delete_application(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM staff_applications WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
