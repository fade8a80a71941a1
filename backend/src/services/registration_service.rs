//! Registration business logic service.

use crate::api::common::{Page, Pagination};
use crate::database::models::{CreateRegistration, Registration, UpdateRegistration};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::registration_repository::{RegistrationFilter, RegistrationRepository};
use sqlx::SqlitePool;
use validator::Validate;

pub const DEFAULT_REGISTRATION_PAGE_SIZE: u32 = 20;

pub struct RegistrationService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> RegistrationService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Registers a user for an event.
    ///
    /// # Errors
    /// - `AlreadyExists` when the user is already registered for the event
    /// - `Validation` when the user or the event does not exist
    pub async fn create_registration(
        &self,
        input: CreateRegistration,
    ) -> ServiceResult<Registration> {
        input.validate()?;

        let pair = format!("user {} / event {}", input.user_id, input.event_id);
        let repo = RegistrationRepository::new(self.pool);
        let registration = repo
            .create_registration(input)
            .await
            .map_err(|e| ServiceError::from_write(e, "Registration", &pair))?;

        tracing::info!("Created registration {} for {}", registration.id, pair);
        Ok(registration)
    }

    pub async fn list_registrations(
        &self,
        filter: RegistrationFilter,
        pagination: Pagination,
    ) -> ServiceResult<Page<Registration>> {
        let repo = RegistrationRepository::new(self.pool);
        let total = repo.count_registrations(filter).await?;
        let items = repo
            .list_registrations(filter, pagination.limit(), pagination.offset())
            .await?;

        Ok(Page::new(items, total as u64, pagination))
    }

    pub async fn get_registration(&self, id: i64) -> ServiceResult<Registration> {
        let repo = RegistrationRepository::new(self.pool);
        repo.get_registration_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Registration", id))
    }

    pub async fn update_registration(
        &self,
        id: i64,
        input: UpdateRegistration,
    ) -> ServiceResult<Registration> {
        let repo = RegistrationRepository::new(self.pool);
        let registration = repo
            .update_status(id, input.status)
            .await?
            .ok_or_else(|| ServiceError::not_found("Registration", id))?;

        tracing::info!("Registration {} is now {:?}", id, registration.status);
        Ok(registration)
    }

    pub async fn delete_registration(&self, id: i64) -> ServiceResult<()> {
        let repo = RegistrationRepository::new(self.pool);
        if !repo.delete_registration(id).await? {
            return Err(ServiceError::not_found("Registration", id));
        }
        Ok(())
    }
}
