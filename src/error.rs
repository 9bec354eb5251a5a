use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use oauth2::{HttpClientError, RequestTokenError, basic::BasicErrorResponse};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing_error::SpanTrace;

use crate::descriptor::Operation;

/// Error returned by the `oauth2` crate when talking to the token endpoint.
pub type OAuthTokenError = RequestTokenError<HttpClientError<reqwest::Error>, BasicErrorResponse>;

/// The common payload of every failure driven by a server response (or by the equivalent
/// local pre-check).
///
/// `status` and `url` are `None` when the failure was detected locally before any request
/// was sent.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub status: Option<StatusCode>,
    pub url: Option<String>,
    /// Machine readable error code (`error` in the response body).
    pub code: Option<String>,
    /// Human readable description (`error_description`, `message`, or the raw body).
    pub description: Option<String>,
    pub span_trace: SpanTrace,
}

impl ApiFailure {
    pub(crate) fn from_response(status: StatusCode, url: impl Into<String>, body: &str) -> Self {
        let (code, description) = parse_error_body(body);
        Self {
            status: Some(status),
            url: Some(url.into()),
            code,
            description,
            span_trace: SpanTrace::capture(),
        }
    }

    pub(crate) fn local(description: impl Into<String>) -> Self {
        Self {
            status: None,
            url: None,
            code: None,
            description: Some(description.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{status}")?,
            None => write!(f, "local check")?,
        }
        if let Some(url) = &self.url {
            write!(f, " at {url}")?;
        }
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => write!(f, " ({code}: {description})"),
            (None, Some(description)) => write!(f, " ({description})"),
            (Some(code), None) => write!(f, " ({code})"),
            (None, None) => Ok(()),
        }
    }
}

/// Best-effort extraction of `(code, description)` from an error body.
///
/// The body may carry `error` / `error_description` (OAuth style) or `message`. Anything
/// that is not a JSON object is passed through verbatim as the description.
fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return (None, (!body.is_empty()).then(|| body.to_string()));
    };

    let field = |name: &str| {
        map.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let code = field("error");
    let description = field("error_description")
        .or_else(|| field("message"))
        .or_else(|| (code.is_none() && !body.is_empty()).then(|| body.to_string()));

    (code, description)
}

/// Errors caused by using the client incorrectly. These are raised before any request is
/// sent and never reflect server state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum UsageError {
    #[error("missing placeholder value for {placeholder} in {template}")]
    #[diagnostic(
        code(fiken_rs::missing_placeholder),
        help("Pass `{placeholder}` as an argument or set it on the object being sent")
    )]
    MissingPlaceholder {
        placeholder: String,
        template: String,
    },

    #[error("auth credential not set")]
    #[diagnostic(
        code(fiken_rs::missing_credential),
        help("Set a credential on the client, the object, or the default context")
    )]
    MissingCredential,

    #[error("cannot request a specific page while following pages")]
    #[diagnostic(
        code(fiken_rs::conflicting_pagination),
        help("Use `Paging::page(n)`, which disables page following")
    )]
    ConflictingPagination,

    #[error("location header not found in response for {resource}")]
    #[diagnostic(
        code(fiken_rs::missing_location),
        help("The server accepted the write but did not say where the result lives")
    )]
    MissingLocation { resource: String },

    #[error("{method} requests cannot carry a payload")]
    #[diagnostic(code(fiken_rs::payload_not_allowed))]
    PayloadNotAllowed { method: String },

    #[error("only POST requests can carry file data, not {method}")]
    #[diagnostic(code(fiken_rs::upload_not_allowed))]
    UploadNotAllowed { method: String },

    #[error("{resource} has no identity yet")]
    #[diagnostic(
        code(fiken_rs::missing_identity),
        help("Save the object first so the server assigns it an id")
    )]
    MissingIdentity { resource: String },

    #[error("draft {resource} has not been saved yet and cannot be submitted")]
    #[diagnostic(
        code(fiken_rs::unsaved_draft),
        help("Save the draft before submitting it")
    )]
    UnsavedDraft { resource: String },

    #[error("a deletion reason must be provided to delete {resource}")]
    #[diagnostic(
        code(fiken_rs::missing_deletion_reason),
        help("This resource is deleted by flagging it; use `delete_with_reason`")
    )]
    MissingDeletionReason { resource: String },

    #[error("invalid value {value:?} for path placeholder {placeholder}")]
    #[diagnostic(
        code(fiken_rs::invalid_path_value),
        help("Identifiers must be non-empty and can't be `.` or `..`")
    )]
    InvalidPathValue { placeholder: String, value: String },

    #[error("invalid MIME type {mime:?} for upload")]
    #[diagnostic(code(fiken_rs::invalid_mime_type))]
    InvalidMimeType { mime: String },

    #[error("{resource} is missing required field {field}")]
    #[diagnostic(code(fiken_rs::missing_field))]
    MissingField { resource: String, field: String },

    #[error("a default client context is already set")]
    #[diagnostic(
        code(fiken_rs::default_context_already_set),
        help("Call `clear_default_context` before setting a new one")
    )]
    DefaultContextAlreadySet,

    #[error("credential cannot be refreshed: {reason}")]
    #[diagnostic(code(fiken_rs::cannot_refresh))]
    CannotRefresh { reason: &'static str },

    #[error("invalid attachment filename {filename:?}: {reason}")]
    #[diagnostic(code(fiken_rs::invalid_filename))]
    InvalidFilename {
        filename: String,
        reason: &'static str,
    },

    #[error("unsupported file extension {extension}")]
    #[diagnostic(
        code(fiken_rs::unsupported_extension),
        help("Attachments must be PDF or a common image format")
    )]
    UnsupportedExtension { extension: String },
}

/// Errors that can occur when interacting with the Fiken API.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// Transport-level failure (DNS, refused connection, timeout). Never retried.
    #[error("connection to {url} failed: {source}")]
    #[diagnostic(
        code(fiken_rs::connection),
        help("Check your network connection and Fiken API availability")
    )]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bad request: {0}")]
    #[diagnostic(
        code(fiken_rs::bad_request),
        help("The server rejected the payload or parameters")
    )]
    BadRequest(ApiFailure),

    #[error("not authenticated: {0}")]
    #[diagnostic(
        code(fiken_rs::unauthenticated),
        help("Check that the access token is valid")
    )]
    Unauthenticated(ApiFailure),

    #[error("forbidden: {0}")]
    #[diagnostic(
        code(fiken_rs::forbidden),
        help("The token was refreshed once and the request still failed; check the company access")
    )]
    Forbidden(ApiFailure),

    #[error("not found: {0}")]
    #[diagnostic(
        code(fiken_rs::not_found),
        help("Verify that the resource exists in the selected company")
    )]
    NotFound(ApiFailure),

    #[error("unsupported method: {0}")]
    #[diagnostic(code(fiken_rs::unsupported_method))]
    UnsupportedMethod(ApiFailure),

    #[error("wrong media type: {0}")]
    #[diagnostic(code(fiken_rs::wrong_media_type))]
    WrongMediaType(ApiFailure),

    #[error("request failed: {0}")]
    #[diagnostic(code(fiken_rs::request_failed))]
    Generic(ApiFailure),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Usage(#[from] UsageError),

    #[error("error decoding response: {source}")]
    #[diagnostic(
        code(fiken_rs::deserialization_error),
        help("The API returned data in an unexpected format")
    )]
    Deserialization {
        #[source]
        source: serde_json::Error,
        body: Option<String>,
    },

    #[error("oauth2 error: {0:?}")]
    #[diagnostic(
        code(fiken_rs::oauth2_error),
        help("Verify the client id, client secret and refresh token")
    )]
    OAuth2(Box<OAuthTokenError>),

    #[error("endpoint could not be parsed as a URL: {0}")]
    #[diagnostic(
        code(fiken_rs::invalid_endpoint),
        help("Check that the API base URL is correctly formatted")
    )]
    InvalidEndpoint(String),

    #[error("could not read {path}: {source}")]
    #[diagnostic(code(fiken_rs::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Classifies a non-success response by status code.
    pub(crate) fn from_status(status: StatusCode, url: &str, body: &str) -> Self {
        let failure = ApiFailure::from_response(status, url, body);
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest(failure),
            StatusCode::UNAUTHORIZED => Self::Unauthenticated(failure),
            StatusCode::FORBIDDEN => Self::Forbidden(failure),
            StatusCode::NOT_FOUND => Self::NotFound(failure),
            StatusCode::METHOD_NOT_ALLOWED => Self::UnsupportedMethod(failure),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => Self::WrongMediaType(failure),
            _ => Self::Generic(failure),
        }
    }

    /// The resource's descriptor has no template for `operation`.
    pub(crate) fn unsupported(resource: &str, operation: Operation) -> Self {
        Self::UnsupportedMethod(ApiFailure::local(format!(
            "{resource} does not support {operation}"
        )))
    }

    /// The resource type does not offer this capability at all.
    pub(crate) fn wrong_media_type(resource: &str, what: &str) -> Self {
        Self::WrongMediaType(ApiFailure::local(format!(
            "{resource} does not support {what}"
        )))
    }

    /// The shared failure payload, for every variant driven by a response status.
    #[must_use]
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::BadRequest(failure)
            | Self::Unauthenticated(failure)
            | Self::Forbidden(failure)
            | Self::NotFound(failure)
            | Self::UnsupportedMethod(failure)
            | Self::WrongMediaType(failure)
            | Self::Generic(failure) => Some(failure),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.failure().and_then(|failure| failure.status)
    }

    #[must_use]
    pub fn span_trace(&self) -> Option<&SpanTrace> {
        self.failure().map(|failure| &failure.span_trace)
    }

    /// `true` for a 404 from the server; `get` turns these into `None`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Deserialization { source, body: None }
    }
}

impl From<OAuthTokenError> for Error {
    fn from(e: OAuthTokenError) -> Self {
        Self::OAuth2(Box::new(e))
    }
}

/// Type alias for results from this crate.
pub type Result<O> = std::result::Result<O, Error>;
