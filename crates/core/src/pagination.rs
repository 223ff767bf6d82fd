//! Page requests and the normalized listing shape
//!
//! Every listing, remote or local, ends up as a [`PageResult`], serialized as
//! `{ "data": [...], "meta": { "total", "pages", "current_page" } }`.
//! [`paginate`] is the shared skeleton: the caller supplies how to fetch one
//! window of items plus the total, and gets back the normalized result.

use serde::{Deserialize, Serialize};

/// A validated page window
///
/// Both numbers are at least 1. Invalid input is corrected, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Build a request from raw caller input (e.g. a `page` query parameter)
    pub fn from_raw(page: Option<&str>, page_size: u32) -> Self {
        Self::new(parse_page(page), page_size)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items to skip before this page
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Number of items to take for this page
    pub fn take(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// Parse a raw page number with integer-prefix semantics
///
/// `"3"` and `"3abc"` give 3. Missing input, input with no leading integer,
/// values below 1 and values that overflow all give 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return 1;
    };

    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if negative || digits.is_empty() {
        return 1;
    }

    match digits.parse::<u32>() {
        Ok(page) if page >= 1 => page,
        _ => 1,
    }
}

/// Number of pages needed for `total` items; zero exactly when `total` is zero
pub fn page_count(total: u64, page_size: u32) -> u64 {
    total.div_ceil(u64::from(page_size.max(1)))
}

/// Page metadata in the caller-facing shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
}

impl PageMeta {
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self {
            total,
            pages: page_count(total, request.page_size()),
            current_page: u64::from(request.page()),
        }
    }
}

/// Normalized result of a listing operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T> PageResult<T> {
    /// A page of items together with the total across all pages
    pub fn from_page(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            meta: Some(PageMeta::new(total, request)),
        }
    }

    /// Items without pagination metadata (upstream did not report any)
    pub fn unpaged(data: Vec<T>) -> Self {
        Self { data, meta: None }
    }

    pub fn items(&self) -> &[T] {
        &self.data
    }

    pub fn total(&self) -> Option<u64> {
        self.meta.map(|m| m.total)
    }

    pub fn page_count(&self) -> Option<u64> {
        self.meta.map(|m| m.pages)
    }

    pub fn current_page(&self) -> Option<u64> {
        self.meta.map(|m| m.current_page)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Fetch one page through `fetch` and shape it into a [`PageResult`]
///
/// `fetch` receives `(skip, take)` and must return the items of that window
/// together with the total number of matching items. It is called exactly once.
pub fn paginate<T, E, F>(request: PageRequest, fetch: F) -> Result<PageResult<T>, E>
where
    F: FnOnce(u64, u64) -> Result<(Vec<T>, u64), E>,
{
    let (mut items, total) = fetch(request.skip(), request.take())?;
    items.truncate(request.page_size() as usize);
    Ok(PageResult::from_page(items, total, request))
}
