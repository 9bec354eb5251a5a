use std::path::Path;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::descriptor::Operation;
use crate::error::{Error, Result, UsageError};
use crate::path::Args;
use crate::resource::{Entity, ResourceApi, template_for};
use crate::transport::{Body, Call, Target, Upload};

/// Resources that files can be attached to.
pub trait Attachable: Entity {}

/// An attachment as listed by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub identifier: Option<String>,
    pub download_url: Option<String>,
    pub download_url_with_fiken_normal_user_credentials: Option<String>,
    pub comment: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

const MIME_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
    ("svgz", "image/svg+xml"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("ai", "application/postscript"),
    ("drw", "application/drafting"),
    ("pct", "image/pict"),
    ("psp", "image/x-paintshoppro"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("raw", "image/raw"),
];

/// The MIME type Fiken accepts for a file name, judged by its extension.
pub fn mime_for(file_name: &str) -> std::result::Result<&'static str, UsageError> {
    if file_name.contains(' ') {
        return Err(UsageError::InvalidFilename {
            filename: file_name.to_string(),
            reason: "must not contain spaces",
        });
    }
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return Err(UsageError::InvalidFilename {
            filename: file_name.to_string(),
            reason: "must have an extension",
        });
    };

    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| UsageError::UnsupportedExtension {
            extension: extension.to_string(),
        })
}

/// A file to attach to a resource.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub comment: Option<String>,
}

impl AttachmentUpload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            comment: None,
        }
    }

    /// Reads the file at `path`, named after its last path component unless `file_name` is
    /// given.
    pub async fn from_path(path: impl AsRef<Path>, file_name: Option<String>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = file_name
            .or_else(|| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    fn into_upload(self) -> std::result::Result<Upload, UsageError> {
        let mime = mime_for(&self.file_name)?;
        let mut fields = vec![("filename", self.file_name.clone())];
        if let Some(comment) = self.comment {
            fields.push(("comment", comment));
        }
        Ok(Upload {
            file_name: self.file_name,
            mime,
            bytes: self.bytes,
            fields,
        })
    }
}

impl<E: Attachable> ResourceApi<'_, E> {
    /// Lists the attachments of `object` as they are on the server now.
    #[instrument(skip(self, object), fields(resource = E::NAME))]
    pub async fn attachments(&self, object: &E) -> Result<Vec<Attachment>> {
        let template = template_for::<E>(Operation::ATTACHMENTS)?;
        Self::require_identity(object)?;

        let context = self.call_context(Some(object.context()), &Args::new());
        let call = Call::new(
            Method::GET,
            Operation::ATTACHMENTS,
            Target::Template(template),
            context,
        )
        .fields(object);
        self.client().execute(call).await?.json()
    }

    /// Uploads a file and attaches it to `object`. Returns `true` if the server reports the
    /// attachment as created.
    #[instrument(skip(self, object, attachment), fields(resource = E::NAME, file_name = %attachment.file_name))]
    pub async fn add_attachment(&self, object: &E, attachment: AttachmentUpload) -> Result<bool> {
        let template = template_for::<E>(Operation::ATTACHMENTS)?;
        let upload = attachment.into_upload()?;
        Self::require_identity(object)?;

        let context = self.call_context(Some(object.context()), &Args::new());
        let call = Call::new(
            Method::POST,
            Operation::ATTACHMENTS,
            Target::Template(template),
            context,
        )
        .fields(object)
        .body(Body::Upload(upload));
        let response = self.client().execute(call).await?;
        Ok(response.status == StatusCode::CREATED)
    }

    /// Attaches the file at `path` to `object`.
    pub async fn add_attachment_file(
        &self,
        object: &E,
        path: impl AsRef<Path>,
        comment: Option<String>,
    ) -> Result<bool> {
        let mut attachment = AttachmentUpload::from_path(path, None).await?;
        attachment.comment = comment;
        self.add_attachment(object, attachment).await
    }
}
