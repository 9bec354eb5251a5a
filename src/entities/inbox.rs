use std::path::Path;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::capabilities::mime_for;
use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::error::{Error, Result};
use crate::resource::{Entity, UploadRequest};
use crate::transport::Upload;
use crate::utils::date_format::fiken_datetime_option;
use crate::{contextual, resource};

const FALLBACK_MIME: &str = "application/octet-stream";

/// A document in the company's inbox, waiting to be booked.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboxDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    document_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub filename: Option<String>,
    pub status: Option<bool>,
    #[serde(with = "fiken_datetime_option")]
    pub created_date: Option<OffsetDateTime>,
    #[serde(skip)]
    context: ClientContext,
}

impl InboxDocument {
    #[must_use]
    pub fn document_id(&self) -> Option<i64> {
        self.document_id
    }
}

resource! {
    InboxDocument as "InboxDocument",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/inbox/{inboxDocumentId}",
        Operation::GetMany => "/companies/{companySlug}/inbox",
    },
    fields: { "inboxDocumentId" => document_id },
}

contextual!(InboxDocument);

impl Entity for InboxDocument {
    const ID_FIELD: &'static str = "inboxDocumentId";
}

/// A file to drop into the inbox. Uploaded as multipart form data.
#[derive(Clone, Debug)]
pub struct InboxDocumentRequest {
    pub name: String,
    pub filename: String,
    pub description: String,
    pub bytes: Vec<u8>,
}

impl InboxDocumentRequest {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        description: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            description: description.into(),
            bytes,
        }
    }

    /// Reads the file at `path`; the document's file name is the last path component.
    pub async fn from_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, filename, description, bytes))
    }
}

resource! {
    InboxDocumentRequest as "InboxDocumentRequest",
    templates: {
        Operation::Create => "/companies/{companySlug}/inbox",
    },
    fields: {},
}

impl UploadRequest for InboxDocumentRequest {
    type Target = InboxDocument;

    fn upload(&self) -> Result<Upload> {
        // The inbox takes any document, unlike attachments.
        let mime = mime_for(&self.filename).unwrap_or(FALLBACK_MIME);
        Ok(Upload {
            file_name: self.filename.clone(),
            mime,
            bytes: self.bytes.clone(),
            fields: vec![
                ("filename", self.filename.clone()),
                ("description", self.description.clone()),
                ("name", self.name.clone()),
            ],
        })
    }
}
