//! Translation of event listing query parameters into SQL.
//!
//! Every user-supplied value reaches the database through
//! `QueryBuilder::push_bind`; only allow-listed column expressions and fixed
//! keywords are pushed as SQL text. Malformed inputs are not errors: they fall
//! back to defaults (or, for date bounds, are dropped).

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};

use crate::api::common::Pagination;
use crate::utils::escape_like;

pub const DEFAULT_EVENT_PAGE_SIZE: u32 = 10;

/// Raw query string of `GET /api/events`.
///
/// Everything is kept as a string so that malformed values can be ignored
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListParams {
    pub search: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub reg_from: Option<String>,
    pub reg_to: Option<String>,
    pub published: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    StartAt,
    EndAt,
    RegOpenAt,
    RegCloseAt,
    CreatedAt,
    Title,
    Location,
    Capacity,
    Id,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "start_at" => Some(Self::StartAt),
            "end_at" => Some(Self::EndAt),
            "reg_open_at" => Some(Self::RegOpenAt),
            "reg_close_at" => Some(Self::RegCloseAt),
            "created_at" | "createdAt" => Some(Self::CreatedAt),
            "title" => Some(Self::Title),
            "location" => Some(Self::Location),
            "capacity" => Some(Self::Capacity),
            "id" => Some(Self::Id),
            _ => None,
        }
    }

    /// SQL expression the listing is ordered by.
    pub fn expression(self) -> &'static str {
        match self {
            Self::StartAt => "julianday(e.start_at)",
            Self::EndAt => "julianday(e.end_at)",
            Self::RegOpenAt => "julianday(e.reg_open_at)",
            Self::RegCloseAt => "julianday(e.reg_close_at)",
            Self::CreatedAt => "julianday(e.created_at)",
            Self::Title => "e.title",
            Self::Location => "e.location",
            Self::Capacity => "e.capacity",
            Self::Id => "e.id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl EventSort {
    /// Parses `field` or `-field`. Anything outside the allow-list sorts by
    /// `start_at` ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };

        let (name, direction) = match raw.strip_prefix('-') {
            Some(name) => (name, SortDirection::Desc),
            None => (raw, SortDirection::Asc),
        };

        match SortField::parse(name) {
            Some(field) => Self { field, direction },
            None => Self::default(),
        }
    }
}

/// Which end of a range a date bound closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Lower,
    Upper,
}

/// Parses a date filter value.
///
/// `YYYY` and `YYYY-MM` expand to the first instant (lower bound) or the last
/// second (upper bound) of the year or month. A bare `YYYY-MM-DD` is midnight
/// UTC. RFC 3339 timestamps and `YYYY-MM-DD HH:MM:SS` (read as UTC) are used
/// as-is. Returns `None` for anything else.
pub fn parse_date_bound(raw: &str, kind: BoundKind) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = raw.parse().ok()?;
        let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
        return Some(match kind {
            BoundKind::Lower => start_of_day(first),
            BoundKind::Upper => end_of_day(NaiveDate::from_ymd_opt(year, 12, 31)?),
        });
    }

    if let Some((year, month)) = parse_year_month(raw) {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        return Some(match kind {
            BoundKind::Lower => start_of_day(first),
            BoundKind::Upper => {
                let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
                end_of_day(last)
            }
        });
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(start_of_day(date));
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn parse_year_month(raw: &str) -> Option<(i32, u32)> {
    let (year, month) = raw.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((year.parse().ok()?, month.parse().ok()?))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    // 23:59:59 is always a valid time of day
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
        .and_utc()
}

/// Normalized listing query: filters, sort and page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    pub search: Option<String>,
    pub starts_from: Option<DateTime<Utc>>,
    pub starts_to: Option<DateTime<Utc>>,
    pub reg_opens_from: Option<DateTime<Utc>>,
    pub reg_closes_to: Option<DateTime<Utc>>,
    pub published: Option<bool>,
    pub sort: EventSort,
    pub pagination: Pagination,
}

impl From<EventListParams> for EventQuery {
    fn from(params: EventListParams) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let bound = |value: &Option<String>, kind| {
            value
                .as_deref()
                .and_then(|raw| parse_date_bound(raw, kind))
        };

        EventQuery {
            starts_from: bound(&params.from, BoundKind::Lower),
            starts_to: bound(&params.to, BoundKind::Upper),
            reg_opens_from: bound(&params.reg_from, BoundKind::Lower),
            reg_closes_to: bound(&params.reg_to, BoundKind::Upper),
            published: non_empty(params.published).map(|v| v.trim() == "true"),
            sort: EventSort::parse(params.sort.as_deref()),
            pagination: Pagination::from_query(
                params.page.as_deref(),
                params.limit.as_deref(),
                DEFAULT_EVENT_PAGE_SIZE,
            ),
            search: non_empty(params.search).map(|s| s.trim().to_string()),
        }
    }
}

impl EventQuery {
    /// Appends ` WHERE ...` for every active filter. Pushes nothing when no
    /// filter is set.
    pub fn push_filters(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        let mut first = true;
        let mut next_clause = |builder: &mut QueryBuilder<'_, Sqlite>| {
            builder.push(if first { " WHERE " } else { " AND " });
            first = false;
        };

        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(search));
            next_clause(builder);
            builder
                .push("(e.title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR e.location LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        if let Some(from) = self.starts_from {
            next_clause(builder);
            builder
                .push("julianday(e.start_at) >= julianday(")
                .push_bind(from)
                .push(")");
        }

        if let Some(to) = self.starts_to {
            next_clause(builder);
            builder
                .push("julianday(e.start_at) <= julianday(")
                .push_bind(to)
                .push(")");
        }

        if let Some(reg_from) = self.reg_opens_from {
            next_clause(builder);
            builder
                .push("julianday(e.reg_open_at) >= julianday(")
                .push_bind(reg_from)
                .push(")");
        }

        if let Some(reg_to) = self.reg_closes_to {
            next_clause(builder);
            builder
                .push("julianday(e.reg_close_at) <= julianday(")
                .push_bind(reg_to)
                .push(")");
        }

        if let Some(published) = self.published {
            next_clause(builder);
            builder.push("e.is_published = ").push_bind(published);
        }
    }

    /// Appends the ORDER BY, LIMIT and OFFSET of the page query.
    pub fn push_order_and_page(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder
            .push(" ORDER BY ")
            .push(self.sort.field.expression())
            .push(" ")
            .push(self.sort.direction.keyword())
            .push(", e.id ASC LIMIT ")
            .push_bind(self.pagination.limit())
            .push(" OFFSET ")
            .push_bind(self.pagination.offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_year_bounds_cover_whole_year() {
        assert_eq!(
            parse_date_bound("2025", BoundKind::Lower),
            Some(utc(2025, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            parse_date_bound("2025", BoundKind::Upper),
            Some(utc(2025, 12, 31, 23, 59, 59))
        );
    }

    #[test]
    fn test_month_bounds_use_last_calendar_day() {
        assert_eq!(
            parse_date_bound("2024-02", BoundKind::Upper),
            Some(utc(2024, 2, 29, 23, 59, 59))
        );
        assert_eq!(
            parse_date_bound("2025-04", BoundKind::Upper),
            Some(utc(2025, 4, 30, 23, 59, 59))
        );
        assert_eq!(
            parse_date_bound("2025-12", BoundKind::Lower),
            Some(utc(2025, 12, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_full_dates_and_timestamps_are_used_as_is() {
        assert_eq!(
            parse_date_bound("2025-06-15", BoundKind::Upper),
            Some(utc(2025, 6, 15, 0, 0, 0))
        );
        assert_eq!(
            parse_date_bound("2025-06-15T10:30:00+07:00", BoundKind::Lower),
            Some(utc(2025, 6, 15, 3, 30, 0))
        );
        assert_eq!(
            parse_date_bound("2025-06-15 10:30:00", BoundKind::Lower),
            Some(utc(2025, 6, 15, 10, 30, 0))
        );
    }

    #[test]
    fn test_unparseable_dates_are_dropped() {
        assert_eq!(parse_date_bound("next week", BoundKind::Lower), None);
        assert_eq!(parse_date_bound("2025-13", BoundKind::Lower), None);
        assert_eq!(parse_date_bound("", BoundKind::Upper), None);
    }

    #[test]
    fn test_sort_allow_list() {
        assert_eq!(
            EventSort::parse(Some("-title")),
            EventSort {
                field: SortField::Title,
                direction: SortDirection::Desc
            }
        );
        assert_eq!(
            EventSort::parse(Some("createdAt")).field,
            SortField::CreatedAt
        );
        assert_eq!(EventSort::parse(Some("password_hash")), EventSort::default());
        assert_eq!(EventSort::parse(Some("-1; DROP TABLE events")), EventSort::default());
        assert_eq!(EventSort::parse(None), EventSort::default());
    }

    #[test]
    fn test_params_normalization() {
        let query = EventQuery::from(EventListParams {
            search: Some("  camp ".into()),
            from: Some("2025".into()),
            to: Some("garbage".into()),
            published: Some("yes".into()),
            limit: Some("1000".into()),
            page: Some("0".into()),
            ..Default::default()
        });

        assert_eq!(query.search.as_deref(), Some("camp"));
        assert_eq!(query.starts_from, Some(utc(2025, 1, 1, 0, 0, 0)));
        assert_eq!(query.starts_to, None);
        assert_eq!(query.published, Some(false));
        assert_eq!(query.pagination, Pagination { page: 1, limit: 100 });
    }

    #[test]
    fn test_empty_params_apply_no_filters() {
        let query = EventQuery::from(EventListParams {
            published: Some(String::new()),
            search: Some("   ".into()),
            ..Default::default()
        });
        assert_eq!(query, EventQuery::default());

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM events e");
        query.push_filters(&mut builder);
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM events e");
    }

    #[test]
    fn test_filters_bind_values_instead_of_inlining() {
        let query = EventQuery::from(EventListParams {
            search: Some("50%' OR 1=1 --".into()),
            from: Some("2025".into()),
            published: Some("true".into()),
            sort: Some("-capacity".into()),
            ..Default::default()
        });

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT e.id FROM events e");
        query.push_filters(&mut builder);
        query.push_order_and_page(&mut builder);
        let sql = builder.sql();

        assert!(!sql.contains("OR 1=1"));
        assert!(sql.contains(" WHERE (e.title LIKE ?"));
        assert!(sql.contains(" AND julianday(e.start_at) >= julianday(?)"));
        assert!(sql.contains(" AND e.is_published = ?"));
        assert!(sql.ends_with("ORDER BY e.capacity DESC, e.id ASC LIMIT ? OFFSET ?"));
    }
}
