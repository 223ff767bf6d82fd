//! Decoding of remote resource responses
//!
//! Pure helpers used by the resource client once a response has been received:
//! best-effort decoding of error bodies, and normalization of list bodies into
//! a [`PageResult`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::pagination::{PageMeta, PageRequest, PageResult};
use crate::query::QueryParams;

/// The decoded part of a failed response
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub message: String,
    /// The parsed body, or an empty object when the body was not JSON
    pub raw: Value,
    /// Whether `message` came from the body rather than the status fallback
    pub decoded: bool,
}

/// Decode a non-success response body
///
/// Uses the body's `message` field when the body is a JSON object carrying a
/// non-empty string message, and `"API error: <status>"` otherwise.
pub fn decode_error_body(status: u16, body: &str) -> ErrorBody {
    let raw: Value = serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Default::default()));

    let message = raw
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    match message {
        Some(message) => ErrorBody {
            message,
            raw,
            decoded: true,
        },
        None => ErrorBody {
            message: format!("API error: {status}"),
            raw,
            decoded: false,
        },
    }
}

/// Pagination totals reported out-of-band in response headers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderTotals {
    pub total: Option<u64>,
    pub pages: Option<u64>,
}

impl HeaderTotals {
    /// Read totals from raw header values (`X-WP-Total`, `X-WP-TotalPages`)
    pub fn parse(total: Option<&str>, pages: Option<&str>) -> Self {
        Self {
            total: total.and_then(|v| v.trim().parse().ok()),
            pages: pages.and_then(|v| v.trim().parse().ok()),
        }
    }
}

/// The page window a list request asked for, as far as its parameters say
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestedWindow {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl RequestedWindow {
    /// Read `page` and `per_page` from the request parameters
    ///
    /// Values that are not positive whole numbers are treated as absent.
    pub fn from_params(params: &QueryParams) -> Self {
        let read = |key: &str| {
            params
                .get(key)
                .and_then(|v| v.as_u64())
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
        };

        Self {
            page: read("page"),
            per_page: read("per_page"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Enveloped(PageResult<T>),
    Bare(Vec<T>),
}

/// Normalize a successful list body
///
/// Accepts the enveloped `{data, meta?}` shape as-is. A bare JSON array is
/// wrapped, with metadata built from `totals` when the upstream reported a
/// total. The page count comes from the total-pages header, or else from the
/// requested page size; when neither is known `meta` is omitted.
pub fn normalize_list_body<T: DeserializeOwned>(
    body: &str,
    totals: HeaderTotals,
    window: RequestedWindow,
) -> Result<PageResult<T>, serde_json::Error> {
    match serde_json::from_str::<ListBody<T>>(body)? {
        ListBody::Enveloped(result) => Ok(result),
        ListBody::Bare(data) => {
            let page = window.page.unwrap_or(1);
            let meta = totals.total.and_then(|total| match (totals.pages, window.per_page) {
                (Some(pages), _) => Some(PageMeta {
                    total,
                    pages,
                    current_page: u64::from(page),
                }),
                (None, Some(per_page)) => {
                    Some(PageMeta::new(total, PageRequest::new(page, per_page)))
                }
                (None, None) => None,
            });
            Ok(PageResult { data, meta })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Post {
        id: u64,
        title: String,
    }

    #[test]
    fn test_decode_error_message() {
        let body = decode_error_body(404, r#"{"message":"Not found"}"#);
        assert_eq!(body.message, "Not found");
        assert!(body.decoded);
        assert_eq!(body.raw["message"], "Not found");
    }

    #[test]
    fn test_decode_error_unparsable_body() {
        let body = decode_error_body(500, "<html>Internal Server Error</html>");
        assert_eq!(body.message, "API error: 500");
        assert!(!body.decoded);
        assert_eq!(body.raw, serde_json::json!({}));
    }

    #[test]
    fn test_decode_error_without_message_field() {
        let body = decode_error_body(400, r#"{"code":"rest_invalid_param"}"#);
        assert_eq!(body.message, "API error: 400");
        assert_eq!(body.raw["code"], "rest_invalid_param");
    }

    #[test]
    fn test_decode_error_non_string_or_empty_message() {
        assert_eq!(
            decode_error_body(422, r#"{"message":42}"#).message,
            "API error: 422"
        );
        assert_eq!(
            decode_error_body(422, r#"{"message":""}"#).message,
            "API error: 422"
        );
        assert_eq!(decode_error_body(502, "").message, "API error: 502");
    }

    #[test]
    fn test_normalize_enveloped_body() {
        let body = r#"{"data":[{"id":1,"title":"a"}],"meta":{"total":9,"pages":2,"current_page":1}}"#;
        let result: PageResult<Post> =
            normalize_list_body(body, HeaderTotals::default(), RequestedWindow::default()).unwrap();

        assert_eq!(result.items().len(), 1);
        assert_eq!(result.total(), Some(9));
        assert_eq!(result.page_count(), Some(2));
    }

    #[test]
    fn test_normalize_enveloped_without_meta() {
        let body = r#"{"data":[{"id":1,"title":"a"}]}"#;
        let result: PageResult<Post> =
            normalize_list_body(body, HeaderTotals::default(), RequestedWindow::default()).unwrap();
        assert_eq!(result.meta, None);
    }

    #[test]
    fn test_normalize_bare_array_with_header_totals() {
        let body = r#"[{"id":1,"title":"a"},{"id":2,"title":"b"}]"#;
        let totals = HeaderTotals::parse(Some("5"), Some("3"));
        let window = RequestedWindow {
            page: Some(2),
            per_page: None,
        };
        let result: PageResult<Post> = normalize_list_body(body, totals, window).unwrap();

        assert_eq!(result.items().len(), 2);
        assert_eq!(
            result.meta,
            Some(PageMeta {
                total: 5,
                pages: 3,
                current_page: 2
            })
        );
    }

    #[test]
    fn test_normalize_bare_array_without_headers() {
        let body = r#"[{"id":1,"title":"a"}]"#;
        let result: PageResult<Post> =
            normalize_list_body(body, HeaderTotals::default(), RequestedWindow::default()).unwrap();
        assert_eq!(result.meta, None);
    }

    #[test]
    fn test_normalize_rejects_mismatched_shape() {
        let result: Result<PageResult<Post>, _> =
            normalize_list_body(r#"{"items":[]}"#, HeaderTotals::default(), RequestedWindow::default());
        assert!(result.is_err());

        let result: Result<PageResult<Post>, _> =
            normalize_list_body("not json", HeaderTotals::default(), RequestedWindow::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_tail_page_counts_from_page_size() {
        // 21 items at 10 per page; the third page holds a single item.
        let body = r#"[{"id":21,"title":"u"}]"#;
        let totals = HeaderTotals::parse(Some("21"), None);
        let window = RequestedWindow {
            page: Some(3),
            per_page: Some(10),
        };
        let result: PageResult<Post> = normalize_list_body(body, totals, window).unwrap();

        assert_eq!(
            result.meta,
            Some(PageMeta {
                total: 21,
                pages: 3,
                current_page: 3
            })
        );
    }

    #[test]
    fn test_normalize_unknown_page_size_omits_meta() {
        let body = r#"[{"id":21,"title":"u"}]"#;
        let totals = HeaderTotals::parse(Some("21"), None);
        let window = RequestedWindow {
            page: Some(3),
            per_page: None,
        };
        let result: PageResult<Post> = normalize_list_body(body, totals, window).unwrap();
        assert_eq!(result.meta, None);
    }

    #[test]
    fn test_requested_window_from_params() {
        let params = QueryParams::new()
            .with("page", 2.0)
            .with("per_page", "10");
        assert_eq!(
            RequestedWindow::from_params(&params),
            RequestedWindow {
                page: Some(2),
                per_page: Some(10)
            }
        );

        let params = QueryParams::new().with("page", 0).with("per_page", 2.5);
        assert_eq!(RequestedWindow::from_params(&params), RequestedWindow::default());
    }

    #[test]
    fn test_header_totals_parse() {
        assert_eq!(
            HeaderTotals::parse(Some(" 12 "), Some("x")),
            HeaderTotals {
                total: Some(12),
                pages: None
            }
        );
    }
}
