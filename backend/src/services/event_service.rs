//! Event business logic service.
//!
//! Validates event payloads and turns repository outcomes into service
//! errors. Listing goes through the query builder in
//! `repositories::event_query`.

use crate::api::common::Page;
use crate::database::models::{CreateEvent, Event, UpdateEvent};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::event_query::{EventListParams, EventQuery};
use crate::repositories::event_repository::EventRepository;
use sqlx::SqlitePool;
use validator::Validate;

pub struct EventService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> EventService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists events for the given raw query parameters.
    ///
    /// Malformed parameters never fail the request; they fall back to their
    /// defaults.
    pub async fn list_events(&self, params: EventListParams) -> ServiceResult<Page<Event>> {
        let query = EventQuery::from(params);
        tracing::debug!(?query, "Listing events");

        let repo = EventRepository::new(self.pool);
        let total = repo.count_events(&query).await?;
        let items = repo.list_events(&query).await?;

        Ok(Page::new(items, total as u64, query.pagination))
    }

    pub async fn get_event(&self, id: i64) -> ServiceResult<Event> {
        let repo = EventRepository::new(self.pool);
        repo.get_event_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", id))
    }

    /// Creates an event together with its ordered image gallery.
    pub async fn create_event(&self, input: CreateEvent) -> ServiceResult<Event> {
        input.validate()?;

        let repo = EventRepository::new(self.pool);
        let event = repo.create_event(input).await?;

        tracing::info!(
            "Created event {} with {} image(s)",
            event.id,
            event.images.len()
        );
        Ok(event)
    }

    /// Applies a sparse patch. A present `images` array replaces the gallery.
    ///
    /// The patched windows are checked against the stored event, so an
    /// update can never produce an event that create would reject.
    pub async fn update_event(&self, id: i64, input: UpdateEvent) -> ServiceResult<Event> {
        input.validate()?;

        let repo = EventRepository::new(self.pool);
        let current = repo
            .get_event_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", id))?;
        validate_patch_windows(&current, &input)?;

        let replaces_images = input.images.is_some();
        let event = repo
            .update_event(id, input)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", id))?;

        tracing::info!(
            "Updated event {}{}",
            event.id,
            if replaces_images { " and replaced its images" } else { "" }
        );
        Ok(event)
    }

    pub async fn delete_event(&self, id: i64) -> ServiceResult<()> {
        let repo = EventRepository::new(self.pool);
        if !repo.delete_event(id).await? {
            return Err(ServiceError::not_found("Event", id));
        }

        tracing::info!("Deleted event {}", id);
        Ok(())
    }
}

/// Rejects a patch that, merged over `current`, leaves an inverted window.
fn validate_patch_windows(current: &Event, patch: &UpdateEvent) -> ServiceResult<()> {
    let start = patch.start_at.unwrap_or(current.start_at);
    let end = patch.end_at.unwrap_or(current.end_at);
    if let Some(end) = end {
        if end < start {
            return Err(ServiceError::validation("end_at must not be before start_at"));
        }
    }

    let open = patch.reg_open_at.unwrap_or(current.reg_open_at);
    let close = patch.reg_close_at.unwrap_or(current.reg_close_at);
    if let (Some(open), Some(close)) = (open, close) {
        if close < open {
            return Err(ServiceError::validation(
                "reg_close_at must not be before reg_open_at",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn stored(start_at: chrono::DateTime<Utc>) -> Event {
        Event {
            id: 1,
            title: "Stored".to_string(),
            description: None,
            location: None,
            organizer: None,
            registration_url: None,
            start_at,
            end_at: None,
            reg_open_at: None,
            reg_close_at: None,
            capacity: 0,
            is_published: false,
            image_url: None,
            images: Vec::new(),
            created_at: start_at,
            updated_at: start_at,
        }
    }

    #[test]
    fn test_patch_window_validation() {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();
        let current = stored(start);

        let inverted = UpdateEvent {
            start_at: Some(start),
            end_at: Some(Some(before)),
            ..Default::default()
        };
        assert!(validate_patch_windows(&current, &inverted).is_err());

        let cleared = UpdateEvent {
            start_at: Some(start),
            end_at: Some(None),
            ..Default::default()
        };
        assert!(validate_patch_windows(&current, &cleared).is_ok());
    }

    #[test]
    fn test_patch_window_is_merged_with_stored_event() {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap();

        let end_only = UpdateEvent {
            end_at: Some(Some(before)),
            ..Default::default()
        };
        assert!(validate_patch_windows(&stored(start), &end_only).is_err());

        let mut with_end = stored(before);
        with_end.end_at = Some(start);
        let start_past_end = UpdateEvent {
            start_at: Some(later),
            ..Default::default()
        };
        assert!(validate_patch_windows(&with_end, &start_past_end).is_err());

        let mut with_close = stored(start);
        with_close.reg_close_at = Some(before);
        let open_after_close = UpdateEvent {
            reg_open_at: Some(Some(start)),
            ..Default::default()
        };
        assert!(validate_patch_windows(&with_close, &open_after_close).is_err());
    }
}
