//! The HTTP seam.
//!
//! The client builds [`HttpRequest`]s against namespace-relative paths and
//! classifies whatever [`HttpResponse`] comes back; a [`Transport`] only
//! moves bytes. Non-2xx statuses are returned as responses, never as errors.

use super::AdministrationClientOptions;
use super::errors::{AdministrationError, AdministrationResult};
use crate::auth::{ConnectionStringProperties, Credential};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Namespace-relative path, already percent-encoded.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn put(path: impl Into<String>, body: String) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Absolute URL of this request under `endpoint`. Parameter names are
    /// sent verbatim (the service expects a literal `$skip`); values are
    /// percent-encoded.
    pub fn url(&self, endpoint: &Url) -> AdministrationResult<Url> {
        let mut url = endpoint.join(self.path.trim_start_matches('/'))?;
        if !self.query.is_empty() {
            let query = self
                .query
                .iter()
                .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }
        Ok(url)
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> AdministrationResult<HttpResponse>;
}

/// [`Transport`] over `reqwest`.
///
/// Authorizes each request through its [`Credential`], stamps a fresh
/// client request id, applies the configured timeout and aborts in-flight
/// requests when its cancellation token fires.
pub struct ReqwestTransport {
    http: reqwest::Client,
    endpoint: Url,
    credential: Arc<dyn Credential>,
    timeout: Duration,
    cancellation: CancellationToken,
}

impl ReqwestTransport {
    pub fn new(
        endpoint: Url,
        credential: Arc<dyn Credential>,
        options: &AdministrationClientOptions,
    ) -> AdministrationResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sbadmin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AdministrationError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            endpoint,
            credential,
            timeout: options.timeout(),
            cancellation: CancellationToken::new(),
        })
    }

    pub fn from_connection_string(
        connection_string: &str,
        options: &AdministrationClientOptions,
    ) -> AdministrationResult<Self> {
        let props = ConnectionStringProperties::parse(connection_string)?;
        let credential = props.credential(options.sas_validity()?);
        Self::new(props.endpoint().clone(), credential, options)
    }

    /// Replace the cancellation token, e.g. with a child of an application-wide one.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error, url: &Url) -> AdministrationError {
        if err.is_timeout() {
            AdministrationError::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            }
        } else {
            AdministrationError::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> AdministrationResult<HttpResponse> {
        if self.cancellation.is_cancelled() {
            return Err(AdministrationError::Cancelled);
        }

        let url = request.url(&self.endpoint)?;
        let mut resource = url.clone();
        resource.set_query(None);
        let authorization = self.credential.authorization(resource.as_str()).await?;

        let mut builder = self
            .http
            .request(request.method, url.clone())
            .headers(request.headers)
            .header(AUTHORIZATION, authorization)
            .header(CLIENT_REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string())
            .timeout(self.timeout);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(HttpResponse {
                status,
                headers,
                body,
            })
        };

        tokio::select! {
            _ = self.cancellation.cancelled() => Err(AdministrationError::Cancelled),
            result = exchange => result.map_err(|e| self.classify(e, &url)),
        }
    }
}
