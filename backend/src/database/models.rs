//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database, plus the input schemas accepted at the API boundary.
//! Note that row types may differ from what is serialized to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "TEXT")]
pub enum RegistrationStatus {
    #[default]
    #[serde(rename = "registered")]
    #[sqlx(rename = "registered")]
    Registered,
    #[serde(rename = "interested")]
    #[sqlx(rename = "interested")]
    Interested,
    #[serde(rename = "checked-in")]
    #[sqlx(rename = "checked-in")]
    CheckedIn,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "pending"),
            ApplicationStatus::Approved => write!(f, "approved"),
            ApplicationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(format!("Invalid application status: {}", s)),
        }
    }
}

/// Deserializes a field that distinguishes "absent" from an explicit `null`.
///
/// Used with `#[serde(default)]`: a missing key stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(v))`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserializes an optional field whose column is `NOT NULL`: a missing key
/// stays `None` but an explicit `null` is a body error.
fn not_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Self-service registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Admin user creation payload; `role` defaults to `user`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must not be empty"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Must be a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Row values for a new user, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Sparse set of user columns to change.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Event as returned to clients, with its gallery in display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub registration_url: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub reg_open_at: Option<DateTime<Utc>>,
    pub reg_close_at: Option<DateTime<Utc>>,
    pub capacity: i64,
    pub is_published: bool,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event row joined with its images aggregated into a JSON array.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub registration_url: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub reg_open_at: Option<DateTime<Utc>>,
    pub reg_close_at: Option<DateTime<Utc>>,
    pub capacity: i64,
    pub is_published: bool,
    pub image_url: Option<String>,
    pub images: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = serde_json::Error;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let images: Vec<String> = serde_json::from_str(&row.images)?;
        Ok(Event {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            organizer: row.organizer,
            registration_url: row.registration_url,
            start_at: row.start_at,
            end_at: row.end_at,
            reg_open_at: row.reg_open_at,
            reg_close_at: row.reg_close_at,
            capacity: row.capacity,
            is_published: row.is_published,
            image_url: row.image_url,
            images,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_create_event_windows"))]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub registration_url: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub reg_open_at: Option<DateTime<Utc>>,
    pub reg_close_at: Option<DateTime<Utc>>,
    #[validate(range(min = 0, message = "Capacity must not be negative"))]
    pub capacity: Option<i64>,
    pub is_published: Option<bool>,
    pub image_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_image_urls"))]
    pub images: Vec<String>,
}

/// Sparse event patch. Only keys present in the body are written.
///
/// Nullable columns use `Option<Option<_>>` so that an explicit `null`
/// clears the column while a missing key leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEvent {
    #[serde(default, deserialize_with = "not_null")]
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub organizer: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub registration_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "not_null")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "present")]
    pub end_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub reg_open_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub reg_close_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "not_null")]
    #[validate(range(min = 0, message = "Capacity must not be negative"))]
    pub capacity: Option<i64>,
    #[serde(default, deserialize_with = "not_null")]
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "not_null")]
    #[validate(custom(function = "validate_image_urls"))]
    pub images: Option<Vec<String>>,
}

fn validate_image_urls(images: &[String]) -> Result<(), validator::ValidationError> {
    if images.iter().any(|url| url.trim().is_empty()) {
        return Err(validator::ValidationError::new("empty_image_url")
            .with_message("Image URLs must not be empty".into()));
    }
    Ok(())
}

fn validate_create_event_windows(event: &CreateEvent) -> Result<(), validator::ValidationError> {
    if let Some(end_at) = event.end_at {
        if end_at < event.start_at {
            return Err(validator::ValidationError::new("invalid_window")
                .with_message("end_at must not be before start_at".into()));
        }
    }
    if let (Some(open), Some(close)) = (event.reg_open_at, event.reg_close_at) {
        if close < open {
            return Err(validator::ValidationError::new("invalid_window")
                .with_message("reg_close_at must not be before reg_open_at".into()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

/// Registration joined with the event title and user email for display.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub status: RegistrationStatus,
    pub event_title: Option<String>,
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRegistration {
    #[validate(range(min = 1, message = "user_id is required"))]
    pub user_id: i64,
    #[validate(range(min = 1, message = "event_id is required"))]
    pub event_id: i64,
    #[serde(default)]
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRegistration {
    pub status: RegistrationStatus,
}

// ---------------------------------------------------------------------------
// Staff applications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StaffApplication {
    pub id: i64,
    pub event_id: i64,
    pub user_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub major: Option<String>,
    pub cohort: Option<String>,
    pub student_code: Option<String>,
    pub title: Option<String>,
    pub position_applied: Option<String>,
    pub experience: Option<String>,
    pub motivation: Option<String>,
    pub portfolio_url: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStaffApplication {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub major: Option<String>,
    pub cohort: Option<String>,
    pub student_code: Option<String>,
    pub title: Option<String>,
    pub position_applied: Option<String>,
    pub experience: Option<String>,
    pub motivation: Option<String>,
    pub portfolio_url: Option<String>,
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStaffApplication {
    pub status: Option<ApplicationStatus>,
    #[validate(length(min = 1, max = 100, message = "First name must not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must not be empty"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Must be a valid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub nickname: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub major: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub cohort: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub student_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub position_applied: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub experience: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub motivation: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub portfolio_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub resume_url: Option<Option<String>>,
}
