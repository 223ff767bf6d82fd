//! Generic client for remote REST resources
//!
//! One [`ResourceClient`] is bound to one [`ResourceDescriptor`]: a base URL, an
//! endpoint path and an authentication strategy. Every operation issues exactly
//! one request, never retries, never caches, and translates failures into
//! [`ResourceError`].

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use coursekit_core::auth::{AuthStrategy, ConfigError};
use coursekit_core::entity::DeleteOutcome;
use coursekit_core::pagination::PageResult;
use coursekit_core::query::{build_url, QueryParams};
use coursekit_core::response::{
    decode_error_body, normalize_list_body, HeaderTotals, RequestedWindow,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Response header carrying the total item count on bare-array list bodies
pub const TOTAL_HEADER: &str = "x-wp-total";
/// Response header carrying the total page count on bare-array list bodies
pub const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// A failed response from the remote backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
    pub raw: serde_json::Value,
}

/// Errors produced by [`ResourceClient`] operations
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The request never produced an HTTP status (DNS, connect, timeout, ...)
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend answered with a success status but an undecodable body
    #[error("Malformed response (HTTP {status}): {message}")]
    MalformedResponse {
        status: u16,
        message: String,
        body: String,
    },

    /// A computed or caller-supplied header is not a valid HTTP header
    #[error("Invalid header {0}")]
    InvalidHeader(String),
}

/// An addressable remote collection
///
/// Immutable once built. Share it with `Arc` across clients and tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    base_url: String,
    endpoint_path: String,
    auth: AuthStrategy,
}

impl ResourceDescriptor {
    pub fn new(
        base_url: impl Into<String>,
        endpoint_path: impl Into<String>,
        auth: AuthStrategy,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ConfigError::Missing("base URL"));
        }

        Ok(Self {
            base_url,
            endpoint_path: endpoint_path.into(),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_path(&self) -> &str {
        &self.endpoint_path
    }

    pub fn auth(&self) -> &AuthStrategy {
        &self.auth
    }

    pub fn url(&self, params: &QueryParams) -> String {
        build_url(&self.base_url, &self.endpoint_path, params)
    }
}

fn to_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ResourceError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ResourceError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ResourceError::InvalidHeader(name.as_str().to_string()))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Typed client for one remote resource of shape `T`
pub struct ResourceClient<T> {
    http: reqwest::Client,
    descriptor: Arc<ResourceDescriptor>,
    auth_headers: HeaderMap,
    _resource: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            descriptor: Arc::clone(&self.descriptor),
            auth_headers: self.auth_headers.clone(),
            _resource: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> ResourceClient<T> {
    /// Build a client with its own HTTP transport
    pub fn new(descriptor: Arc<ResourceDescriptor>, timeout: Duration) -> Result<Self, ResourceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_http(http, descriptor)
    }

    /// Build a client on top of an existing HTTP transport
    ///
    /// Auth headers are computed here, once, so invalid credentials surface
    /// before the first request.
    pub fn with_http(
        http: reqwest::Client,
        descriptor: Arc<ResourceDescriptor>,
    ) -> Result<Self, ResourceError> {
        let auth_headers = match descriptor.auth().headers() {
            Some(headers) => to_header_map(&headers)?,
            None => HeaderMap::new(),
        };

        Ok(Self {
            http,
            descriptor,
            auth_headers,
            _resource: PhantomData,
        })
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    /// List the resource, filtered by `params`
    pub async fn list(&self, params: &QueryParams) -> Result<PageResult<T>, ResourceError> {
        self.list_with_headers(params, &BTreeMap::new()).await
    }

    /// List with extra request headers, applied after the auth headers
    pub async fn list_with_headers(
        &self,
        params: &QueryParams,
        extra: &BTreeMap<String, String>,
    ) -> Result<PageResult<T>, ResourceError> {
        let extra = to_header_map(extra)?;
        let response = self
            .send(Method::GET, params, extra, None::<&()>)
            .await?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let totals = HeaderTotals::parse(
            header(TOTAL_HEADER).as_deref(),
            header(TOTAL_PAGES_HEADER).as_deref(),
        );
        let window = RequestedWindow::from_params(params);

        let status = response.status().as_u16();
        let body = response.text().await?;
        normalize_list_body(&body, totals, window).map_err(|e| {
            ResourceError::MalformedResponse {
                status,
                message: e.to_string(),
                body,
            }
        })
    }

    /// Read a single item, addressed by the `id` query parameter
    pub async fn get(&self, id: u64) -> Result<T, ResourceError> {
        let params = QueryParams::new().with("id", id);
        let response = self
            .send(Method::GET, &params, HeaderMap::new(), None::<&()>)
            .await?;
        read_json(response).await
    }

    /// Create an item from a (partial) payload
    pub async fn create<P, R>(&self, payload: &P) -> Result<R, ResourceError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .send(Method::POST, &QueryParams::new(), HeaderMap::new(), Some(payload))
            .await?;
        read_json(response).await
    }

    /// Update an item, addressed by the `id` query parameter
    pub async fn update<P, R>(&self, id: u64, payload: &P) -> Result<R, ResourceError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = QueryParams::new().with("id", id);
        let response = self
            .send(Method::PATCH, &params, HeaderMap::new(), Some(payload))
            .await?;
        read_json(response).await
    }

    /// Delete an item, addressed by the `id` query parameter
    pub async fn remove(&self, id: u64) -> Result<DeleteOutcome, ResourceError> {
        let params = QueryParams::new().with("id", id);
        let response = self
            .send(Method::DELETE, &params, HeaderMap::new(), None::<&()>)
            .await?;
        read_json(response).await
    }

    /// Issue one request and turn a non-success status into [`ApiError`]
    async fn send<P: Serialize + ?Sized>(
        &self,
        method: Method,
        params: &QueryParams,
        extra: HeaderMap,
        payload: Option<&P>,
    ) -> Result<Response, ResourceError> {
        let url = self.descriptor.url(params);
        log::debug!("{method} {url}");

        let mut request = self
            .http
            .request(method, &url)
            .headers(self.auth_headers.clone())
            .headers(extra);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let decoded = decode_error_body(status.as_u16(), &body);
        if !decoded.decoded {
            log::warn!("{url} returned {status} without a readable error message");
        }

        Err(ApiError {
            status_code: status.as_u16(),
            message: decoded.message,
            raw: decoded.raw,
        }
        .into())
    }
}

async fn read_json<R: DeserializeOwned>(response: Response) -> Result<R, ResourceError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ResourceError::MalformedResponse {
        status,
        message: e.to_string(),
        body,
    })
}
