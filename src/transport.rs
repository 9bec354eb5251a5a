use reqwest::header::{self, HeaderMap};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::client::Client;
use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::error::{Error, Result, UsageError};
use crate::oauth::Credential;
use crate::path::{self, Args, PathFields};

/// Header carrying the number of pages in a collection response.
pub const PAGE_COUNT_HEADER: &str = "Fiken-Api-Page-Count";
/// Correlation id sent with every request.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Where a call goes: a descriptor template still to be resolved, or a finished URL (such as
/// a `Location` header).
#[derive(Debug, Clone)]
pub(crate) enum Target {
    Template(&'static str),
    Url(Url),
}

/// A file sent as `multipart/form-data`, with any extra text fields the endpoint wants.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    pub fields: Vec<(&'static str, String)>,
}

impl Upload {
    // `Form` can't be cloned, so it is rebuilt for each attempt.
    fn to_form(&self) -> Result<Form> {
        let part = Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(self.mime)
            .map_err(|_| UsageError::InvalidMimeType {
                mime: self.mime.to_string(),
            })?;

        Ok(self
            .fields
            .iter()
            .fold(Form::new().part("file", part), |form, (name, value)| {
                form.text(*name, value.clone())
            }))
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) enum Body {
    #[default]
    Empty,
    Json(Value),
    Upload(Upload),
}

impl Body {
    fn check(&self, method: &Method) -> std::result::Result<(), UsageError> {
        match self {
            Self::Empty => Ok(()),
            Self::Json(_) if [Method::POST, Method::PUT, Method::PATCH].contains(method) => Ok(()),
            Self::Json(_) => Err(UsageError::PayloadNotAllowed {
                method: method.to_string(),
            }),
            Self::Upload(_) if *method == Method::POST => Ok(()),
            Self::Upload(_) => Err(UsageError::UploadNotAllowed {
                method: method.to_string(),
            }),
        }
    }
}

/// One HTTP call, before path resolution.
pub(crate) struct Call<'a> {
    pub method: Method,
    pub operation: Operation,
    pub target: Target,
    pub fields: Option<&'a (dyn PathFields + Sync)>,
    pub args: Args,
    pub body: Body,
    pub context: ClientContext,
}

impl<'a> Call<'a> {
    pub fn new(method: Method, operation: Operation, target: Target, context: ClientContext) -> Self {
        Self {
            method,
            operation,
            target,
            fields: None,
            args: Args::new(),
            body: Body::Empty,
            context,
        }
    }

    #[must_use]
    pub fn fields(mut self, fields: &'a (dyn PathFields + Sync)) -> Self {
        self.fields = Some(fields);
        self
    }

    #[must_use]
    pub fn args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }
}

/// A successful response, not yet decoded.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// The `Location` header, resolved against the request URL when relative.
    #[must_use]
    pub fn location(&self) -> Option<Url> {
        let value = self.headers.get(header::LOCATION)?.to_str().ok()?;
        self.url.join(value).ok()
    }

    /// The page count of a collection response, if the server sent one.
    #[must_use]
    pub fn page_count(&self) -> Option<usize> {
        self.headers
            .get(PAGE_COUNT_HEADER)?
            .to_str()
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|source| {
            error!(url = %self.url, %source, "could not decode response body");
            Error::Deserialization {
                source,
                body: Some(self.body.clone()),
            }
        })
    }
}

/// Turns a finished response into a success or a classified error.
pub(crate) fn classify(status: StatusCode, url: &Url, body: String, headers: HeaderMap) -> Result<RawResponse> {
    if status.is_success() {
        return Ok(RawResponse {
            status,
            url: url.clone(),
            headers,
            body,
        });
    }
    error!(%status, %url, %body, "request failed");
    Err(Error::from_status(status, url.as_str(), &body))
}

impl Client {
    /// Performs one authenticated call.
    ///
    /// An expired credential is refreshed before the first attempt; a failure to refresh is
    /// logged and the stale token is sent anyway. A 403 on the first attempt refreshes the
    /// credential and retries once. Nothing else is retried.
    #[instrument(skip_all, fields(method = %call.method, operation = %call.operation))]
    pub(crate) async fn execute(&self, call: Call<'_>) -> Result<RawResponse> {
        let credential = call
            .context
            .credential()
            .cloned()
            .ok_or(UsageError::MissingCredential)?;
        call.body.check(&call.method)?;

        let (url, query) = match &call.target {
            Target::Template(template) => {
                let (path, query) = path::resolve(
                    template,
                    call.fields,
                    call.args.clone(),
                    call.context.company_slug(),
                )?;
                (self.config().url_for(&path)?, query)
            }
            Target::Url(url) => (url.clone(), call.args.clone()),
        };

        let mut attempt = 0;
        if credential.is_expired() {
            match credential.refresh(self).await {
                Ok(()) => attempt = 1,
                Err(e) => error!(error = %e, "failed to refresh expired token"),
            }
        }

        loop {
            let response = self.send(&call, &credential, &url, &query).await?;
            match response {
                Err((status, _, _))
                    if status == StatusCode::FORBIDDEN && attempt == 0 && credential.can_refresh() =>
                {
                    warn!(%url, "got 403, refreshing token and retrying once");
                    credential.refresh(self).await?;
                    attempt += 1;
                }
                Err((status, body, headers)) => return classify(status, &url, body, headers),
                Ok(response) => return Ok(response),
            }
        }
    }

    /// Sends the request once. HTTP error statuses come back as `Ok(Err(..))` so the caller
    /// can decide whether to retry before classifying them.
    async fn send(
        &self,
        call: &Call<'_>,
        credential: &Credential,
        url: &Url,
        query: &Args,
    ) -> Result<std::result::Result<RawResponse, (StatusCode, String, HeaderMap)>> {
        let request_id = Uuid::new_v4();
        let mut request = self
            .http()
            .request(call.method.clone(), url.clone())
            .bearer_auth(credential.access_token())
            .header(header::ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if !query.is_empty() {
            request = request.query(query);
        }
        // Multipart bodies carry their own boundary content type.
        if !matches!(call.body, Body::Upload(_)) {
            request = request.header(header::CONTENT_TYPE, "application/json");
        }

        request = match &call.body {
            Body::Empty => request,
            Body::Json(value) => {
                trace!(json = %value, "request body");
                request.json(value)
            }
            Body::Upload(upload) => {
                trace!(file_name = %upload.file_name, bytes = upload.bytes.len(), "uploading file");
                request.multipart(upload.to_form()?)
            }
        };

        if let Some(limiter) = self.rate_limiter() {
            limiter.acquire().await;
        }

        debug!(
            method = %call.method,
            %url,
            %query,
            %request_id,
            authorization = "Bearer [REDACTED]",
            "sending request"
        );

        let response = request.send().await.map_err(|source| {
            error!(%url, %source, "request connection failed");
            Error::Connection {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|source| Error::Connection {
            url: url.to_string(),
            source,
        })?;
        debug!(%status, %url, "response received");

        if status.is_success() {
            Ok(Ok(RawResponse {
                status,
                url: url.clone(),
                headers,
                body,
            }))
        } else {
            Ok(Err((status, body, headers)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://api.fiken.no/api/v2/companies/demo/sales").unwrap()
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, header::HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn success_is_passed_through() {
        let response = classify(StatusCode::CREATED, &url(), String::new(), HeaderMap::new()).unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
    }

    #[test]
    fn error_status_is_classified() {
        let error = classify(
            StatusCode::NOT_FOUND,
            &url(),
            r#"{"message": "no such sale"}"#.into(),
            HeaderMap::new(),
        )
        .unwrap_err();
        assert!(error.is_not_found());
        assert_eq!(
            error.failure().unwrap().description.as_deref(),
            Some("no such sale")
        );
    }

    #[test]
    fn relative_location_is_joined_to_request_url() {
        let response = classify(
            StatusCode::CREATED,
            &url(),
            String::new(),
            headers(&[("location", "/api/v2/companies/demo/sales/5")]),
        )
        .unwrap();
        assert_eq!(
            response.location().unwrap().as_str(),
            "https://api.fiken.no/api/v2/companies/demo/sales/5"
        );
    }

    #[test]
    fn absolute_location_is_kept() {
        let response = classify(
            StatusCode::CREATED,
            &url(),
            String::new(),
            headers(&[("location", "https://api.fiken.no/api/v2/companies/demo/sales/6")]),
        )
        .unwrap();
        assert_eq!(
            response.location().unwrap().as_str(),
            "https://api.fiken.no/api/v2/companies/demo/sales/6"
        );
    }

    #[test]
    fn page_count_header_is_parsed() {
        let response = classify(
            StatusCode::OK,
            &url(),
            "[]".into(),
            headers(&[(PAGE_COUNT_HEADER, "3")]),
        )
        .unwrap();
        assert_eq!(response.page_count(), Some(3));

        let bare = classify(StatusCode::OK, &url(), "[]".into(), HeaderMap::new()).unwrap();
        assert_eq!(bare.page_count(), None);
    }

    #[test]
    fn payload_rules() {
        let json = Body::Json(Value::Null);
        assert!(json.check(&Method::PATCH).is_ok());
        assert_eq!(
            json.check(&Method::GET),
            Err(UsageError::PayloadNotAllowed {
                method: "GET".into()
            })
        );

        let upload = Body::Upload(Upload {
            file_name: "a.pdf".into(),
            mime: "application/pdf",
            bytes: vec![],
            fields: vec![],
        });
        assert!(upload.check(&Method::POST).is_ok());
        assert!(matches!(
            upload.check(&Method::PUT),
            Err(UsageError::UploadNotAllowed { .. })
        ));
        assert!(Body::Empty.check(&Method::DELETE).is_ok());
    }

    #[test]
    fn undecodable_body_keeps_raw_text() {
        let response = classify(StatusCode::OK, &url(), "not json".into(), HeaderMap::new()).unwrap();
        match response.json::<Value>() {
            Err(Error::Deserialization { body, .. }) => assert_eq!(body.as_deref(), Some("not json")),
            other => panic!("expected deserialization error, got {other:?}"),
        }
    }

    #[test]
    fn bad_upload_mime_is_a_usage_error() {
        let upload = Upload {
            file_name: "scan.pdf".into(),
            mime: "not a mime",
            bytes: vec![1],
            fields: Vec::new(),
        };
        assert!(matches!(
            upload.to_form(),
            Err(Error::Usage(UsageError::InvalidMimeType { mime })) if mime == "not a mime"
        ));
    }
}
