//! Staff application business logic service.
//!
//! Applications are always scoped to an existing event. Submission may be
//! anonymous; when the caller is signed in the application is linked to them.

use crate::api::common::{Page, Pagination};
use crate::database::models::{
    ApplicationStatus, CreateStaffApplication, StaffApplication, UpdateStaffApplication,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::event_repository::EventRepository;
use crate::repositories::staff_application_repository::StaffApplicationRepository;
use crate::utils::normalize_email;
use sqlx::SqlitePool;
use validator::Validate;

pub const DEFAULT_APPLICATION_PAGE_SIZE: u32 = 10;

pub struct StaffApplicationService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> StaffApplicationService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    async fn require_event(&self, event_id: i64) -> ServiceResult<()> {
        let events = EventRepository::new(self.pool);
        if !events.event_exists(event_id).await? {
            return Err(ServiceError::not_found("Event", event_id));
        }
        Ok(())
    }

    /// Lists an event's applications, newest first.
    ///
    /// # Errors
    /// - `NotFound` if the event does not exist
    /// - `Validation` if `status` is not a known application status
    pub async fn list_for_event(
        &self,
        event_id: i64,
        status: Option<&str>,
        pagination: Pagination,
    ) -> ServiceResult<Page<StaffApplication>> {
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<ApplicationStatus>().map_err(ServiceError::validation)?),
            None => None,
        };
        self.require_event(event_id).await?;

        let repo = StaffApplicationRepository::new(self.pool);
        let total = repo.count_by_event(event_id, status).await?;
        let items = repo
            .list_by_event(event_id, status, pagination.limit(), pagination.offset())
            .await?;

        Ok(Page::new(items, total as u64, pagination))
    }

    /// Submits an application for an event.
    pub async fn submit(
        &self,
        event_id: i64,
        user_id: Option<i64>,
        mut input: CreateStaffApplication,
    ) -> ServiceResult<StaffApplication> {
        input.validate()?;
        self.require_event(event_id).await?;
        input.email = normalize_email(&input.email);

        let repo = StaffApplicationRepository::new(self.pool);
        let application = repo
            .create_application(event_id, user_id, input)
            .await
            .map_err(|e| ServiceError::from_write(e, "Staff application", event_id))?;

        tracing::info!(
            "Staff application {} submitted for event {}",
            application.id,
            event_id
        );
        Ok(application)
    }

    pub async fn get_application(&self, id: i64) -> ServiceResult<StaffApplication> {
        let repo = StaffApplicationRepository::new(self.pool);
        repo.get_application_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Staff application", id))
    }

    /// Updates status and/or applicant fields.
    pub async fn update_application(
        &self,
        id: i64,
        mut input: UpdateStaffApplication,
    ) -> ServiceResult<StaffApplication> {
        input.validate()?;
        input.email = input.email.as_deref().map(normalize_email);

        let repo = StaffApplicationRepository::new(self.pool);
        let application = repo
            .update_application(id, input)
            .await?
            .ok_or_else(|| ServiceError::not_found("Staff application", id))?;

        tracing::info!(
            "Staff application {} updated, status {}",
            id,
            application.status
        );
        Ok(application)
    }

    pub async fn delete_application(&self, id: i64) -> ServiceResult<()> {
        let repo = StaffApplicationRepository::new(self.pool);
        if !repo.delete_application(id).await? {
            return Err(ServiceError::not_found("Staff application", id));
        }
        Ok(())
    }
}
