use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Status and headers of the response that produced an error.
///
/// Carried by [`AdministrationError::ResourceNotFound`] and
/// [`AdministrationError::ResourceExists`] so callers can inspect the raw
/// exchange, e.g. when `exists` turns a not-found into `false`.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseContext {
    pub fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    /// Service-assigned request id, when the response carried one.
    pub fn request_id(&self) -> Option<&str> {
        request_id(&self.headers)
    }
}

/// Errors raised by the administration client.
///
/// Every public operation either returns a fully populated entity or fails
/// with exactly one of these variants.
#[derive(Debug, Error)]
pub enum AdministrationError {
    /// A required argument was missing or empty. Raised before any network call.
    #[error("Invalid argument '{parameter}': {reason}")]
    InvalidArgument { parameter: String, reason: String },

    /// The service rejected the credential (HTTP 401/403).
    #[error("Authentication failed (HTTP {status}): {message}")]
    AuthenticationFailed { status: u16, message: String },

    /// The entity already exists (HTTP 409 on create).
    #[error("Entity '{entity}' already exists (HTTP {})", .response.status.as_u16())]
    ResourceExists {
        entity: String,
        response: ResponseContext,
    },

    /// The entity does not exist, either by HTTP 404 or by an empty content body.
    #[error("Entity '{entity}' not found (HTTP {})", .response.status.as_u16())]
    ResourceNotFound {
        entity: String,
        response: ResponseContext,
    },

    /// The response could not be interpreted.
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// Any other unsuccessful HTTP status.
    #[error("Service error during {operation} (HTTP {status}): {message}{}", request_suffix(.request_id))]
    Http {
        operation: String,
        status: u16,
        message: String,
        request_id: Option<String>,
    },

    /// The request never produced a response.
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    /// The in-flight request was cancelled through the transport.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AdministrationError {
    pub fn invalid_argument(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Classify an unsuccessful response into the error taxonomy.
    ///
    /// The service reports failures as `<Error><Code/><Detail/></Error>`; the
    /// detail text becomes the message when present, the raw body otherwise.
    pub fn from_status(
        operation: &str,
        entity: &str,
        status: StatusCode,
        headers: &HeaderMap,
        body: &str,
    ) -> Self {
        let message = error_detail(body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {} error", status.as_u16())
            } else {
                body.trim().to_string()
            }
        });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::AuthenticationFailed {
                status: status.as_u16(),
                message,
            },
            StatusCode::NOT_FOUND => Self::ResourceNotFound {
                entity: entity.to_string(),
                response: ResponseContext::new(status, headers.clone()),
            },
            StatusCode::CONFLICT => Self::ResourceExists {
                entity: entity.to_string(),
                response: ResponseContext::new(status, headers.clone()),
            },
            _ => Self::Http {
                operation: operation.to_string(),
                status: status.as_u16(),
                message,
                request_id: request_id(headers).map(str::to_string),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ResourceExists { .. })
    }

    /// HTTP status associated with this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::ResourceExists { response, .. } | Self::ResourceNotFound { response, .. } => {
                Some(response.status.as_u16())
            }
            _ => None,
        }
    }
}

fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-ms-request-id")
        .or_else(|| headers.get("TrackingId"))
        .and_then(|v| v.to_str().ok())
}

fn request_suffix(request_id: &Option<String>) -> String {
    request_id
        .as_ref()
        .map(|id| format!(" [Request ID: {id}]"))
        .unwrap_or_default()
}

fn error_detail(body: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(body).ok()?;
    let root = doc.root_element();
    if root.tag_name().name() != "Error" {
        return None;
    }
    root.children()
        .find(|n| n.is_element() && n.tag_name().name() == "Detail")
        .and_then(|n| n.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

impl From<reqwest::Error> for AdministrationError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        if err.is_timeout() {
            Self::Timeout { url, seconds: 0 }
        } else {
            Self::Transport {
                url,
                reason: err.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for AdministrationError {
    fn from(err: url::ParseError) -> Self {
        Self::malformed(format!("invalid URL: {err}"))
    }
}

pub type AdministrationResult<T> = Result<T, AdministrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_detail_becomes_message() {
        let body = r#"<Error><Code>400</Code><Detail>The value for LockDuration is out of range. TrackingId:abc</Detail></Error>"#;
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-request-id", "req-1".parse().unwrap());

        let err = AdministrationError::from_status(
            "create_queue",
            "orders",
            StatusCode::BAD_REQUEST,
            &headers,
            body,
        );

        match &err {
            AdministrationError::Http {
                status,
                message,
                request_id,
                operation,
            } => {
                assert_eq!(*status, 400);
                assert!(message.starts_with("The value for LockDuration"));
                assert_eq!(request_id.as_deref(), Some("req-1"));
                assert_eq!(operation, "create_queue");
            }
            other => panic!("Expected Http variant, got {other:?}"),
        }
        assert!(err.to_string().contains("[Request ID: req-1]"));
    }

    #[test]
    fn statuses_map_onto_taxonomy() {
        let headers = HeaderMap::new();
        let classify = |status| {
            AdministrationError::from_status("op", "orders", status, &headers, "")
        };

        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED),
            AdministrationError::AuthenticationFailed { status: 401, .. }
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN),
            AdministrationError::AuthenticationFailed { status: 403, .. }
        ));
        assert!(classify(StatusCode::NOT_FOUND).is_not_found());
        assert!(classify(StatusCode::CONFLICT).is_conflict());
        assert_eq!(classify(StatusCode::SERVICE_UNAVAILABLE).status(), Some(503));
    }

    #[test]
    fn non_xml_body_is_preserved() {
        let err = AdministrationError::from_status(
            "list_queues",
            "",
            StatusCode::INTERNAL_SERVER_ERROR,
            &HeaderMap::new(),
            "upstream exploded",
        );
        assert!(err.to_string().contains("upstream exploded"));
    }
}
