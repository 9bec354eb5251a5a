//! Sentry integration for fiken-rs errors.
//!
//! Only available with the `sentry` feature:
//!
//! ```toml
//! [dependencies]
//! fiken-rs = { version = "0.1.0-alpha.1", features = ["sentry"] }
//! ```
//!
//! Span traces are only captured when the subscriber has an `ErrorLayer`:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .with(sentry::integrations::tracing::layer())
//!     .init();
//! ```

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::error::{ApiFailure, Error, UsageError};

const BODY_PREVIEW: usize = 500;

fn failure_data(failure: &ApiFailure) -> BTreeMap<String, Value> {
    let mut data = BTreeMap::new();
    if let Some(status) = failure.status {
        data.insert("status_code".to_string(), Value::from(status.as_u16()));
    }
    if let Some(url) = &failure.url {
        data.insert("url".to_string(), Value::from(url.clone()));
    }
    if let Some(code) = &failure.code {
        data.insert("error".to_string(), Value::from(code.clone()));
    }
    data
}

fn usage_category(error: &UsageError) -> &'static str {
    match error {
        UsageError::MissingCredential
        | UsageError::CannotRefresh { .. }
        | UsageError::DefaultContextAlreadySet => "auth",
        UsageError::InvalidFilename { .. }
        | UsageError::UnsupportedExtension { .. }
        | UsageError::InvalidMimeType { .. } => {
            "fiken.attachment"
        }
        _ => "fiken.usage",
    }
}

/// Turns a fiken-rs error into a Sentry breadcrumb, so failed calls show up in the trail
/// of whatever error is eventually reported.
impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let (category, data) = match error {
            Error::Connection { url, .. } => {
                let mut data = BTreeMap::new();
                data.insert("url".to_string(), Value::from(url.clone()));
                ("http.request", data)
            }
            Error::Unauthenticated(failure) | Error::Forbidden(failure) => {
                ("auth", failure_data(failure))
            }
            Error::BadRequest(failure)
            | Error::NotFound(failure)
            | Error::UnsupportedMethod(failure)
            | Error::WrongMediaType(failure)
            | Error::Generic(failure) => ("http.response", failure_data(failure)),
            Error::Usage(usage) => (usage_category(usage), BTreeMap::new()),
            Error::Deserialization { .. } => ("http.response", BTreeMap::new()),
            Error::OAuth2(_) => ("auth", BTreeMap::new()),
            Error::InvalidEndpoint(url) => {
                let mut data = BTreeMap::new();
                data.insert("url".to_string(), Value::from(url.clone()));
                ("fiken.config", data)
            }
            Error::Io { path, .. } => {
                let mut data = BTreeMap::new();
                data.insert("path".to_string(), Value::from(path.display().to_string()));
                ("fiken.attachment", data)
            }
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(error.to_string()),
            data,
            level: sentry_core::Level::Error,
            ..Default::default()
        }
    }
}

/// Extra context for a Sentry event: span trace, URL, status, error code and a preview of
/// an undecodable body.
///
/// ```ignore
/// use fiken_rs::sentry_integration::error_to_sentry_context;
///
/// if let Err(e) = client.contacts().get_all(Args::new()).await {
///     sentry::configure_scope(|scope| {
///         for (key, value) in error_to_sentry_context(&e) {
///             scope.set_extra(&key, value);
///         }
///     });
/// }
/// ```
pub fn error_to_sentry_context(error: &Error) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();

    if let Some(span_trace) = error.span_trace() {
        context.insert(
            "fiken.span_trace".to_string(),
            Value::from(format!("{span_trace}")),
        );
    }

    if let Some(failure) = error.failure() {
        for (key, value) in failure_data(failure) {
            context.insert(format!("fiken.{key}"), value);
        }
        if let Some(description) = &failure.description {
            context.insert("fiken.description".to_string(), Value::from(description.clone()));
        }
    }

    if let Error::Deserialization {
        body: Some(body), ..
    } = error
    {
        let preview: String = body.chars().take(BODY_PREVIEW).collect();
        context.insert("fiken.response_body".to_string(), Value::from(preview));
    }

    context
}
