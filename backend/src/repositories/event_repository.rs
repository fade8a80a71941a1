//! Database repository for event management operations.
//!
//! Events own an ordered gallery stored in `event_images`. Every read returns
//! the gallery aggregated in `sort_order`, and every write that touches the
//! gallery runs inside one transaction together with the event row.

use crate::database::models::{CreateEvent, Event, EventRow, UpdateEvent};
use crate::repositories::event_query::EventQuery;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

/// Event columns plus the gallery as a JSON array (`[]` when empty).
const EVENT_SELECT: &str = r#"
    SELECT
        e.id, e.title, e.description, e.location, e.organizer, e.registration_url,
        e.start_at, e.end_at, e.reg_open_at, e.reg_close_at,
        e.capacity, e.is_published, e.image_url, e.created_at, e.updated_at,
        (
            SELECT json_group_array(i.image_url ORDER BY i.sort_order)
            FROM event_images i
            WHERE i.event_id = e.id
        ) AS images
    FROM events e"#;

/// Repository for event database operations.
pub struct EventRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> EventRepository<'a> {
    /// Creates a new EventRepository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates an event and its gallery in one transaction.
    ///
    /// Images are stored with contiguous positions `0..n-1` in the order
    /// given. The returned event is re-read inside the transaction.
    pub async fn create_event(&self, event: CreateEvent) -> Result<Event> {
        let mut tx = self.pool.begin().await?;

        match insert_event(&mut tx, event, Utc::now()).await {
            Ok(created) => {
                tx.commit().await?;
                Ok(created)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::error!("Failed to roll back event insert: {}", rollback_error);
                }
                Err(e)
            }
        }
    }

    /// Applies a sparse patch to an event.
    ///
    /// Only present fields are written. When `images` is present the whole
    /// gallery is replaced. Returns `None` if the event does not exist, in
    /// which case nothing is written.
    pub async fn update_event(&self, id: i64, changes: UpdateEvent) -> Result<Option<Event>> {
        let mut tx = self.pool.begin().await?;

        match apply_update(&mut tx, id, changes, Utc::now()).await {
            Ok(Some(updated)) => {
                tx.commit().await?;
                Ok(Some(updated))
            }
            Ok(None) => {
                tx.rollback().await?;
                Ok(None)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::error!("Failed to roll back event update: {}", rollback_error);
                }
                Err(e)
            }
        }
    }

    /// Retrieves an event with its gallery.
    pub async fn get_event_by_id(&self, id: i64) -> Result<Option<Event>> {
        let mut conn = self.pool.acquire().await?;
        fetch_event(&mut conn, id).await
    }

    /// Returns one page of events matching the query.
    pub async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let mut builder = QueryBuilder::<Sqlite>::new(EVENT_SELECT);
        query.push_filters(&mut builder);
        query.push_order_and_page(&mut builder);

        let rows = builder
            .build_query_as::<EventRow>()
            .fetch_all(self.pool)
            .await?;

        let events = rows
            .into_iter()
            .map(Event::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(events)
    }

    /// Counts all events matching the query's filters.
    pub async fn count_events(&self, query: &EventQuery) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM events e");
        query.push_filters(&mut builder);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        Ok(total)
    }

    pub async fn event_exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Deletes an event. Images, registrations and staff applications go with
    /// it through `ON DELETE CASCADE`.
    pub async fn delete_event(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn fetch_event(conn: &mut SqliteConnection, id: i64) -> Result<Option<Event>> {
    let sql = format!("{EVENT_SELECT} WHERE e.id = ?");
    let row = sqlx::query_as::<_, EventRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(Event::try_from).transpose()?)
}

async fn insert_event(
    conn: &mut SqliteConnection,
    event: CreateEvent,
    now: DateTime<Utc>,
) -> Result<Event> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO events (
            title, description, location, organizer, registration_url,
            start_at, end_at, reg_open_at, reg_close_at,
            capacity, is_published, image_url, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&event.title)
    .bind(&event.description)
    .bind(&event.location)
    .bind(&event.organizer)
    .bind(&event.registration_url)
    .bind(event.start_at)
    .bind(event.end_at)
    .bind(event.reg_open_at)
    .bind(event.reg_close_at)
    .bind(event.capacity.unwrap_or(0))
    .bind(event.is_published.unwrap_or(false))
    .bind(&event.image_url)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    insert_images(conn, id, &event.images).await?;

    fetch_event(conn, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("event {} vanished inside its own transaction", id))
}

async fn apply_update(
    conn: &mut SqliteConnection,
    id: i64,
    changes: UpdateEvent,
    now: DateTime<Utc>,
) -> Result<Option<Event>> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if count == 0 {
        return Ok(None);
    }

    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE events SET ");
    let mut columns = builder.separated(", ");

    if let Some(title) = changes.title {
        columns.push("title = ").push_bind_unseparated(title);
    }
    if let Some(description) = changes.description {
        columns.push("description = ").push_bind_unseparated(description);
    }
    if let Some(location) = changes.location {
        columns.push("location = ").push_bind_unseparated(location);
    }
    if let Some(organizer) = changes.organizer {
        columns.push("organizer = ").push_bind_unseparated(organizer);
    }
    if let Some(registration_url) = changes.registration_url {
        columns
            .push("registration_url = ")
            .push_bind_unseparated(registration_url);
    }
    if let Some(start_at) = changes.start_at {
        columns.push("start_at = ").push_bind_unseparated(start_at);
    }
    if let Some(end_at) = changes.end_at {
        columns.push("end_at = ").push_bind_unseparated(end_at);
    }
    if let Some(reg_open_at) = changes.reg_open_at {
        columns.push("reg_open_at = ").push_bind_unseparated(reg_open_at);
    }
    if let Some(reg_close_at) = changes.reg_close_at {
        columns.push("reg_close_at = ").push_bind_unseparated(reg_close_at);
    }
    if let Some(capacity) = changes.capacity {
        columns.push("capacity = ").push_bind_unseparated(capacity);
    }
    if let Some(is_published) = changes.is_published {
        columns.push("is_published = ").push_bind_unseparated(is_published);
    }
    if let Some(image_url) = changes.image_url {
        columns.push("image_url = ").push_bind_unseparated(image_url);
    }
    columns.push("updated_at = ").push_bind_unseparated(now);

    builder.push(" WHERE id = ").push_bind(id);
    builder.build().execute(&mut *conn).await?;

    if let Some(images) = changes.images {
        sqlx::query("DELETE FROM event_images WHERE event_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        insert_images(conn, id, &images).await?;
    }

    fetch_event(conn, id).await
}

async fn insert_images(conn: &mut SqliteConnection, event_id: i64, images: &[String]) -> Result<()> {
    for (position, url) in images.iter().enumerate() {
        sqlx::query("INSERT INTO event_images (event_id, image_url, sort_order) VALUES (?, ?, ?)")
            .bind(event_id)
            .bind(url)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
