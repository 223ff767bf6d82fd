//! Catalog listing: filter, sort and page translation
//!
//! Turns raw listing input (strings as they arrive from a query string or CLI
//! flags) into a [`CourseQuery`], and a query into the SQL fragments the local
//! store executes. Only present fields constrain the result; absent fields are
//! never translated into "equals empty" or "is null".

use chrono::{DateTime, Days, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination::PageRequest;

/// Default number of courses per catalog page
pub const DEFAULT_PAGE_SIZE: u32 = 8;

// =============================================================================
// Output Types
// =============================================================================

/// An id/name pair for a related record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

/// A course with its relations, as returned by listings and lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub is_free: bool,
    /// RFC 3339, millisecond precision, UTC
    pub post_date: String,
    pub category_id: Option<String>,
    pub sub_category_id: Option<String>,
    pub category: Option<NamedRef>,
    pub sub_category: Option<NamedRef>,
    pub tags: Vec<NamedRef>,
}

/// A category with its sub-categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub sub_categories: Vec<NamedRef>,
}

/// Everything needed to populate the listing filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub all_categories: Vec<CategoryOption>,
    pub all_tags: Vec<NamedRef>,
}

// =============================================================================
// Dates
// =============================================================================

/// Format a timestamp the way post dates are stored and serialized
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A parsed date input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput {
    /// A calendar day (`YYYY-MM-DD`)
    Day(NaiveDate),
    /// A full RFC 3339 timestamp
    Instant(DateTime<Utc>),
}

impl DateInput {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(DateInput::Day(day));
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| DateInput::Instant(dt.with_timezone(&Utc)))
    }

    /// The first instant covered by this input
    pub fn start(&self) -> DateTime<Utc> {
        match self {
            DateInput::Day(day) => day.and_time(NaiveTime::MIN).and_utc(),
            DateInput::Instant(dt) => *dt,
        }
    }
}

/// Upper bound of the date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndBound {
    /// `post_date <= instant`
    Through(DateTime<Utc>),
    /// `post_date < instant`
    Before(DateTime<Utc>),
}

impl EndBound {
    fn from_input(input: DateInput) -> Option<Self> {
        match input {
            // A calendar day is inclusive through its last instant.
            DateInput::Day(day) => day
                .checked_add_days(Days::new(1))
                .map(|next| EndBound::Before(next.and_time(NaiveTime::MIN).and_utc())),
            DateInput::Instant(dt) => Some(EndBound::Through(dt)),
        }
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Tri-state free/paid filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreeFilter {
    Free,
    Paid,
    #[default]
    Either,
}

impl FreeFilter {
    /// `"yes"` is free, `"no"` is paid, anything else is either
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("yes") => FreeFilter::Free,
            Some("no") => FreeFilter::Paid,
            _ => FreeFilter::Either,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FreeFilter::Free => Some(true),
            FreeFilter::Paid => Some(false),
            FreeFilter::Either => None,
        }
    }
}

/// Listing sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    TitleAsc,
    TitleDesc,
    PostDateAsc,
    #[default]
    PostDateDesc,
}

impl SortKey {
    /// Unrecognized or missing values fall back to newest first
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("title-asc") => SortKey::TitleAsc,
            Some("title-desc") => SortKey::TitleDesc,
            Some("postDate-asc") => SortKey::PostDateAsc,
            _ => SortKey::PostDateDesc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
            SortKey::PostDateAsc => "postDate-asc",
            SortKey::PostDateDesc => "postDate-desc",
        }
    }

    /// ORDER BY clause; ties keep insertion order
    pub fn order_by_sql(&self) -> &'static str {
        match self {
            SortKey::TitleAsc => "ORDER BY c.title ASC, c.rowid ASC",
            SortKey::TitleDesc => "ORDER BY c.title DESC, c.rowid ASC",
            SortKey::PostDateAsc => "ORDER BY c.post_date ASC, c.rowid ASC",
            SortKey::PostDateDesc => "ORDER BY c.post_date DESC, c.rowid ASC",
        }
    }
}

/// Raw listing input, exactly as received
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCourseQuery {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub sub_category_id: Option<String>,
    pub is_free: Option<String>,
    pub tag_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

/// Only the present constraints of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub sub_category_id: Option<String>,
    pub is_free: FreeFilter,
    pub tag_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<EndBound>,
}

/// A fully resolved listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseQuery {
    pub filter: CourseFilter,
    pub sort: SortKey,
    pub page: PageRequest,
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

impl CourseQuery {
    /// Resolve raw input; nothing here ever fails
    ///
    /// Empty strings count as absent. Unparsable dates impose no constraint.
    pub fn parse(raw: &RawCourseQuery, page_size: u32) -> Self {
        let filter = CourseFilter {
            search: present(&raw.search),
            category_id: present(&raw.category_id),
            sub_category_id: present(&raw.sub_category_id),
            is_free: FreeFilter::parse(raw.is_free.as_deref()),
            tag_id: present(&raw.tag_id),
            start: raw
                .start_date
                .as_deref()
                .and_then(DateInput::parse)
                .map(|d| d.start()),
            end: raw
                .end_date
                .as_deref()
                .and_then(DateInput::parse)
                .and_then(EndBound::from_input),
        };

        Self {
            filter,
            sort: SortKey::parse(raw.sort.as_deref()),
            page: PageRequest::from_raw(raw.page.as_deref(), page_size),
        }
    }
}

// =============================================================================
// SQL Translation
// =============================================================================

/// A bound SQL parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

/// A conjunction of conditions over the `courses c` table, with its parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlPredicate {
    pub conditions: Vec<String>,
    pub params: Vec<SqlParam>,
}

impl SqlPredicate {
    fn push(&mut self, condition: &str, param: SqlParam) {
        self.conditions.push(condition.to_string());
        self.params.push(param);
    }

    /// `WHERE a AND b ...`, or an empty string when unconstrained
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// Escape `LIKE` wildcards so the search text matches literally
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl CourseFilter {
    /// Build the predicate from the present fields only
    pub fn to_predicate(&self) -> SqlPredicate {
        let mut predicate = SqlPredicate::default();

        if let Some(search) = &self.search {
            predicate.push(
                "c.title LIKE ? ESCAPE '\\'",
                SqlParam::Text(format!("%{}%", escape_like(search))),
            );
        }
        if let Some(category_id) = &self.category_id {
            predicate.push("c.category_id = ?", SqlParam::Text(category_id.clone()));
        }
        if let Some(sub_category_id) = &self.sub_category_id {
            predicate.push(
                "c.sub_category_id = ?",
                SqlParam::Text(sub_category_id.clone()),
            );
        }
        if let Some(is_free) = self.is_free.as_bool() {
            predicate.push("c.is_free = ?", SqlParam::Int(i64::from(is_free)));
        }
        if let Some(tag_id) = &self.tag_id {
            predicate.push(
                "EXISTS (SELECT 1 FROM course_tags ct WHERE ct.course_id = c.id AND ct.tag_id = ?)",
                SqlParam::Text(tag_id.clone()),
            );
        }
        if let Some(start) = self.start {
            predicate.push("c.post_date >= ?", SqlParam::Text(format_timestamp(start)));
        }
        match self.end {
            Some(EndBound::Through(end)) => {
                predicate.push("c.post_date <= ?", SqlParam::Text(format_timestamp(end)));
            }
            Some(EndBound::Before(end)) => {
                predicate.push("c.post_date < ?", SqlParam::Text(format_timestamp(end)));
            }
            None => {}
        }

        predicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(pairs: &[(&str, &str)]) -> RawCourseQuery {
        let mut raw = RawCourseQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "search" => raw.search = value,
                "categoryId" => raw.category_id = value,
                "subCategoryId" => raw.sub_category_id = value,
                "isFree" => raw.is_free = value,
                "tagId" => raw.tag_id = value,
                "startDate" => raw.start_date = value,
                "endDate" => raw.end_date = value,
                "sort" => raw.sort = value,
                "page" => raw.page = value,
                other => panic!("unknown key {other}"),
            }
        }
        raw
    }

    #[test]
    fn test_empty_query_is_unconstrained() {
        let query = CourseQuery::parse(&RawCourseQuery::default(), DEFAULT_PAGE_SIZE);

        assert_eq!(query.filter, CourseFilter::default());
        assert_eq!(query.sort, SortKey::PostDateDesc);
        assert_eq!(query.page, PageRequest::new(1, 8));

        let predicate = query.filter.to_predicate();
        assert!(predicate.conditions.is_empty());
        assert_eq!(predicate.where_sql(), "");
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let query = CourseQuery::parse(
            &raw(&[
                ("search", ""),
                ("categoryId", ""),
                ("subCategoryId", ""),
                ("tagId", ""),
                ("isFree", ""),
                ("startDate", ""),
                ("endDate", ""),
            ]),
            8,
        );
        assert_eq!(query.filter, CourseFilter::default());
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(SortKey::parse(Some("title-asc")), SortKey::TitleAsc);
        assert_eq!(SortKey::parse(Some("title-desc")), SortKey::TitleDesc);
        assert_eq!(SortKey::parse(Some("postDate-asc")), SortKey::PostDateAsc);
        assert_eq!(SortKey::parse(Some("postDate-desc")), SortKey::PostDateDesc);
        assert_eq!(SortKey::parse(Some("rating-desc")), SortKey::PostDateDesc);
        assert_eq!(SortKey::parse(None), SortKey::PostDateDesc);
    }

    #[test]
    fn test_sort_round_trips_through_str() {
        for key in [
            SortKey::TitleAsc,
            SortKey::TitleDesc,
            SortKey::PostDateAsc,
            SortKey::PostDateDesc,
        ] {
            assert_eq!(SortKey::parse(Some(key.as_str())), key);
        }
    }

    #[test]
    fn test_free_filter_parse() {
        assert_eq!(FreeFilter::parse(Some("yes")), FreeFilter::Free);
        assert_eq!(FreeFilter::parse(Some("no")), FreeFilter::Paid);
        assert_eq!(FreeFilter::parse(Some("all")), FreeFilter::Either);
        assert_eq!(FreeFilter::parse(None), FreeFilter::Either);
    }

    #[test]
    fn test_invalid_page_is_clamped() {
        for page in ["0", "-3", "abc"] {
            let query = CourseQuery::parse(&raw(&[("page", page)]), 8);
            assert_eq!(query.page.page(), 1);
            assert_eq!(query.page.skip(), 0);
        }
    }

    #[test]
    fn test_predicate_is_conjunction_of_present_fields() {
        let query = CourseQuery::parse(&raw(&[("categoryId", "c1"), ("isFree", "yes")]), 8);
        let predicate = query.filter.to_predicate();

        assert_eq!(
            predicate.where_sql(),
            "WHERE c.category_id = ? AND c.is_free = ?"
        );
        assert_eq!(
            predicate.params,
            vec![SqlParam::Text("c1".to_string()), SqlParam::Int(1)]
        );
    }

    #[test]
    fn test_predicate_all_fields() {
        let query = CourseQuery::parse(
            &raw(&[
                ("search", "intro"),
                ("categoryId", "c1"),
                ("subCategoryId", "s1"),
                ("isFree", "no"),
                ("tagId", "t1"),
                ("startDate", "2024-01-01"),
                ("endDate", "2024-01-31"),
            ]),
            8,
        );
        let predicate = query.filter.to_predicate();

        assert_eq!(predicate.conditions.len(), 7);
        assert_eq!(
            predicate.params,
            vec![
                SqlParam::Text("%intro%".to_string()),
                SqlParam::Text("c1".to_string()),
                SqlParam::Text("s1".to_string()),
                SqlParam::Int(0),
                SqlParam::Text("t1".to_string()),
                SqlParam::Text("2024-01-01T00:00:00.000Z".to_string()),
                SqlParam::Text("2024-02-01T00:00:00.000Z".to_string()),
            ]
        );
        assert!(predicate.conditions[4].starts_with("EXISTS"));
        assert_eq!(predicate.conditions[6], "c.post_date < ?");
    }

    #[test]
    fn test_end_instant_is_inclusive() {
        let query = CourseQuery::parse(&raw(&[("endDate", "2024-03-05T10:00:00+02:00")]), 8);
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();

        assert_eq!(query.filter.end, Some(EndBound::Through(expected)));
        assert_eq!(
            query.filter.to_predicate().conditions,
            vec!["c.post_date <= ?".to_string()]
        );
    }

    #[test]
    fn test_unparsable_dates_are_ignored() {
        let query = CourseQuery::parse(
            &raw(&[("startDate", "yesterday"), ("endDate", "2024-13-45")]),
            8,
        );
        assert_eq!(query.filter.start, None);
        assert_eq!(query.filter.end, None);
    }

    #[test]
    fn test_search_escapes_wildcards() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");

        let query = CourseQuery::parse(&raw(&[("search", "50%")]), 8);
        assert_eq!(
            query.filter.to_predicate().params,
            vec![SqlParam::Text("%50\\%%".to_string())]
        );
    }

    #[test]
    fn test_format_timestamp() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(format_timestamp(dt), "2024-05-06T07:08:09.000Z");
    }

    #[test]
    fn test_order_by_breaks_ties_by_insertion() {
        assert!(SortKey::TitleAsc.order_by_sql().ends_with("c.rowid ASC"));
        assert!(SortKey::PostDateDesc
            .order_by_sql()
            .starts_with("ORDER BY c.post_date DESC"));
    }
}
