//! URL and query-string construction for resource endpoints
//!
//! Pure functions that turn a base URL, an endpoint path and an ordered set of
//! filter parameters into the canonical request URL. Parameters without a value
//! are dropped entirely, so "absent" never turns into `key=`.

use std::fmt;

/// A single query parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Text(s) => write!(f, "{s}"),
            QueryValue::Int(n) => write!(f, "{n}"),
            QueryValue::Float(n) => write!(f, "{n}"),
        }
    }
}

impl QueryValue {
    /// The value as a non-negative whole number, if it is one
    ///
    /// Text is parsed after trimming; floats count only when they have no
    /// fractional part (`2.0` is 2, `2.5` is not a whole number).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            QueryValue::Text(s) => s.trim().parse().ok(),
            QueryValue::Int(n) => u64::try_from(*n).ok(),
            QueryValue::Float(n) => {
                // u64::MAX as f64 rounds up to 2^64, which is out of range.
                if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n < u64::MAX as f64 {
                    Some(*n as u64)
                } else {
                    None
                }
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Text(value.clone())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        // Ids and page numbers never get near i64::MAX; saturate just in case.
        QueryValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(i64::from(value))
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(i64::from(value))
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

/// Ordered filter parameters for a resource request
///
/// Keys keep their first insertion position. Setting an existing key replaces
/// its value in place, so every key is emitted at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, Option<QueryValue>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key to a defined value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.set_opt(key, Some(value.into()));
    }

    /// Set a key to an optional value; `None` marks the key as unfiltered
    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<QueryValue>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`QueryParams::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder form of [`QueryParams::set_opt`]
    pub fn with_opt<V: Into<QueryValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.set_opt(key, value.map(Into::into));
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Iterate over the defined entries in insertion order
    pub fn defined(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        self.defined().next().is_none()
    }
}

/// Join a base URL and an endpoint path with exactly one slash between them
pub fn join_url(base_url: &str, endpoint_path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint_path.trim_start_matches('/')
    )
}

/// Render the defined parameters as a percent-encoded query string (no leading `?`)
pub fn encode_query(params: &QueryParams) -> String {
    params
        .defined()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&value.to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the full request URL for a resource
///
/// Zero defined parameters yield the joined path with no trailing `?`.
pub fn build_url(base_url: &str, endpoint_path: &str, params: &QueryParams) -> String {
    let url = join_url(base_url, endpoint_path);
    let query = encode_query(params);

    if query.is_empty() {
        url
    } else {
        format!("{url}?{query}")
    }
}
