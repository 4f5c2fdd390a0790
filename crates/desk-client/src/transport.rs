//! Authenticated transport.
//!
//! Every request goes out with `Authorization: Basic <token>` and, once one
//! is known, `X-WP-Nonce: <nonce>`. A 401/403 that the backend attributes to
//! the nonce sends the request through the [`NonceGate`] and retries it
//! exactly once with the refreshed nonce. Any other non-2xx status is
//! returned to the caller as [`DeskApiError::ApiError`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ConfigError, DeskApiConfig};
use crate::error::DeskApiError;
use crate::nonce::{is_nonce_failure, NonceGate, NonceResponse, NONCE_HEADER};
use crate::pagination::{ListBody, ListQuery, Page};
use crate::retry::{retry_send, RetryPolicy};
use crate::session::SessionStore;

/// Path of the nonce endpoint, relative to the REST root.
const NONCE_PATH: &str = "auth/nonce";

/// A request that can be dispatched more than once.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub(crate) fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub(crate) fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, DeskApiError> {
        let value = serde_json::to_value(body).map_err(|source| DeskApiError::Serialization {
            endpoint: self.endpoint(),
            source,
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// `METHOD path`, used in errors and logs.
    pub(crate) fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

enum Checked {
    Passed(reqwest::Response),
    NonceRejected { status: u16, body: String },
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    base: String,
    session: SessionStore,
    gate: NonceGate,
    retry: RetryPolicy,
}

/// Shared authenticated HTTP transport. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Transport {
    inner: Arc<Inner>,
}

impl Transport {
    pub fn new(config: &DeskApiConfig, session: SessionStore) -> Result<Self, DeskApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| DeskApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        if let Some(token) = &config.auth_token {
            reqwest::header::HeaderValue::from_str(&format!("Basic {}", token.as_str()))
                .map_err(|_| ConfigError::InvalidHeader)?;
            if !session.is_authenticated() {
                session.set_token(token)?;
            }
        }

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base: config.base_url.as_str().trim_end_matches('/').to_string(),
                session,
                gate: NonceGate::new(),
                retry: config.retry,
            }),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn gate(&self) -> &NonceGate {
        &self.inner.gate
    }

    /// Absolute URL for a path relative to the REST root.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base, path.trim_start_matches('/'))
    }

    /// Force a nonce refresh, joining one already in flight.
    pub async fn refresh_nonce(&self) -> Result<String, DeskApiError> {
        let stale = self.inner.session.nonce()?;
        self.inner
            .gate
            .refresh(
                stale.as_deref(),
                || self.current_nonce(),
                || self.fetch_nonce(),
            )
            .await
    }

    fn current_nonce(&self) -> Option<String> {
        self.inner.session.nonce().ok().flatten()
    }

    /// Call the nonce endpoint and record the result in the session.
    async fn fetch_nonce(&self) -> Result<String, DeskApiError> {
        let req = ApiRequest::new(Method::GET, NONCE_PATH);
        let endpoint = req.endpoint();
        let token = self
            .inner
            .session
            .token()?
            .ok_or(DeskApiError::NotAuthenticated)?;

        // The nonce endpoint authenticates by token alone; sending the stale
        // nonce would get it rejected the same way.
        let resp = self.dispatch(&req, &token, None).await?;
        let body: NonceResponse = read_json(resp, &endpoint).await?;
        if body.nonce.is_empty() {
            return Err(DeskApiError::ApiError {
                endpoint,
                status: 200,
                body: "empty nonce".into(),
            });
        }
        self.inner.session.set_nonce(&body.nonce, Utc::now())?;
        tracing::info!("session nonce refreshed");
        Ok(body.nonce)
    }

    async fn dispatch(
        &self,
        req: &ApiRequest,
        token: &str,
        nonce: Option<&str>,
    ) -> Result<reqwest::Response, DeskApiError> {
        let url = self.url(&req.path);
        tracing::debug!(endpoint = %req.endpoint(), has_nonce = nonce.is_some(), "sending request");

        retry_send(self.inner.retry, || {
            let mut builder = self
                .inner
                .http
                .request(req.method.clone(), &url)
                .header(AUTHORIZATION, format!("Basic {token}"));
            if let Some(nonce) = nonce {
                builder = builder.header(NONCE_HEADER, nonce);
            }
            if !req.query.is_empty() {
                builder = builder.query(&req.query);
            }
            if let Some(body) = &req.body {
                builder = builder.json(body);
            }
            builder.send()
        })
        .await
        .map_err(|e| DeskApiError::Http {
            endpoint: req.endpoint(),
            source: e,
        })
    }

    async fn check(resp: reqwest::Response, endpoint: &str) -> Result<Checked, DeskApiError> {
        let status = resp.status().as_u16();
        if status != 401 && status != 403 {
            return Ok(Checked::Passed(resp));
        }
        let body = resp.text().await.unwrap_or_default();
        if is_nonce_failure(status, &body) {
            Ok(Checked::NonceRejected { status, body })
        } else {
            Err(DeskApiError::ApiError {
                endpoint: endpoint.to_string(),
                status,
                body,
            })
        }
    }

    /// Send an authenticated request, refreshing the nonce once if needed.
    ///
    /// The returned response has not had its status checked beyond auth.
    pub(crate) async fn execute(&self, req: ApiRequest) -> Result<reqwest::Response, DeskApiError> {
        let endpoint = req.endpoint();
        let token = self
            .inner
            .session
            .token()?
            .ok_or(DeskApiError::NotAuthenticated)?;
        let sent = self.inner.session.nonce()?;

        let first = self.dispatch(&req, &token, sent.as_deref()).await?;
        match Self::check(first, &endpoint).await? {
            Checked::Passed(resp) => Ok(resp),
            Checked::NonceRejected { .. } => {
                tracing::debug!(%endpoint, "nonce rejected, waiting for refresh");
                let fresh = self
                    .inner
                    .gate
                    .refresh(
                        sent.as_deref(),
                        || self.current_nonce(),
                        || self.fetch_nonce(),
                    )
                    .await?;

                let retried = self.dispatch(&req, &token, Some(&fresh)).await?;
                match Self::check(retried, &endpoint).await? {
                    Checked::Passed(resp) => Ok(resp),
                    Checked::NonceRejected { status, body } => Err(DeskApiError::ApiError {
                        endpoint,
                        status,
                        body,
                    }),
                }
            }
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, DeskApiError> {
        let req = ApiRequest::new(Method::GET, path).query(query);
        let endpoint = req.endpoint();
        let resp = self.execute(req).await?;
        read_json(resp, &endpoint).await
    }

    /// GET a single resource; 404 maps to `None`.
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, DeskApiError> {
        let req = ApiRequest::new(Method::GET, path);
        let endpoint = req.endpoint();
        let resp = self.execute(req).await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(resp, &endpoint).await.map(Some)
    }

    /// GET one page of a list endpoint.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> Result<Page<T>, DeskApiError> {
        let req = ApiRequest::new(Method::GET, path).query(query.to_pairs());
        let endpoint = req.endpoint();
        let resp = self.execute(req).await?;

        let total = header_number(&resp, "X-WP-Total");
        let total_pages = header_number(&resp, "X-WP-TotalPages").map(|n| n as u32);
        let body: ListBody<T> = read_json(resp, &endpoint).await?;
        Ok(body.into_page(query.page, query.per_page, total, total_pages))
    }

    /// Send `body` with `method` and decode the JSON response.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, DeskApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = ApiRequest::new(method, path).json(body)?;
        let endpoint = req.endpoint();
        let resp = self.execute(req).await?;
        read_json(resp, &endpoint).await
    }

    /// Send a request whose response body is irrelevant.
    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> Result<(), DeskApiError> {
        let req = ApiRequest::new(method, path);
        let endpoint = req.endpoint();
        let resp = self.execute(req).await?;
        ensure_success(resp, &endpoint).await.map(|_| ())
    }

    /// Unauthenticated GET of the REST root. Any HTTP answer means reachable.
    pub(crate) async fn probe(&self) -> Result<u16, reqwest::Error> {
        let resp = self.inner.http.get(self.url("")).send().await?;
        Ok(resp.status().as_u16())
    }
}

fn header_number(resp: &reqwest::Response, name: &str) -> Option<u64> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

async fn ensure_success(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<reqwest::Response, DeskApiError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(DeskApiError::ApiError {
        endpoint: endpoint.to_string(),
        status,
        body,
    })
}

async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<T, DeskApiError> {
    let resp = ensure_success(resp, endpoint).await?;
    let bytes = resp.bytes().await.map_err(|e| DeskApiError::Http {
        endpoint: endpoint.to_string(),
        source: e,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| DeskApiError::Deserialization {
        endpoint: endpoint.to_string(),
        source,
    })
}
