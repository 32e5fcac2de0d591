//! Box View client implementation.
//!
//! Each public operation validates the required record fields locally,
//! builds exactly one HTTP request, checks the response against the
//! operation's expected status code, and folds the decoded response back
//! into the caller's [`Document`].

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use jiff::Timestamp;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::BvConfig;
use crate::CLIENT_TARGET;
use crate::document::{ContentVariant, Document, DocumentMetadata, Session};
use crate::error::{Error, Result};
use crate::transport::{
    FilePart, HttpTransport, MultipartForm, RequestBody, Transport, TransportRequest,
    TransportResponse,
};

/// Default thumbnail width in pixels.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 1024;

/// Default thumbnail height in pixels.
pub const DEFAULT_THUMBNAIL_HEIGHT: u32 = 768;

/// Metadata fields fetched when the caller does not select any.
const DEFAULT_METADATA_FIELDS: &[&str] = &["status", "name", "created_at", "modified_at"];

/// Number of documents `list` returns when no limit is given.
const DEFAULT_LIST_LIMIT: u32 = 10;

/// Largest page size the service accepts.
const MAX_LIST_LIMIT: u32 = 50;

/// Parameters for [`BvClient::create_session`].
#[derive(Debug, Clone, Default)]
pub struct SessionParams {
    /// Minutes until the session expires (service default: 60)
    pub duration: Option<u32>,
    /// Absolute expiration timestamp; takes precedence over `duration`
    pub expires_at: Option<Timestamp>,
}

/// Parameters for [`BvClient::list`].
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// Number of documents to return (default 10, capped at 50)
    pub limit: Option<u32>,
    /// Upper bound on document creation timestamps
    pub created_before: Option<Timestamp>,
    /// Lower bound on document creation timestamps
    pub created_after: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
struct UrlUploadRequest<'a> {
    name: &'a str,
    url: &'a str,
    thumbnails: &'a str,
    non_svg: bool,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    document_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
struct DocumentCollectionResponse {
    document_collection: DocumentCollection,
}

#[derive(Debug, Deserialize)]
struct DocumentCollection {
    entries: Vec<ListEntry>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    id: String,
    #[serde(flatten)]
    metadata: DocumentMetadata,
}

/// Client for the Box View document-conversion API.
///
/// Stateless except for the API key and the endpoints derived from it; the
/// client may be cloned and shared freely. Every operation is one
/// request/response round trip with no retries and no background work.
/// Operations that change server state take `&mut Document` so the caller's
/// record always reflects the merge (or, after a delete, the reset).
///
/// # Examples
///
/// ```rust,ignore
/// use boxview::{BvClient, BvConfig, Document};
///
/// let config = BvConfig::new("YOUR_API_KEY")?;
/// let client = BvClient::new(config)?;
///
/// let mut doc = Document::from_url("https://example.com/report.pdf");
/// client.upload(&mut doc).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BvClient {
    config: BvConfig,
    transport: Arc<dyn Transport>,
}

impl BvClient {
    /// Create a client backed by the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be constructed in this
    /// environment.
    pub fn new(config: BvConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);

        info!(
            target: CLIENT_TARGET,
            document_url = %config.document_url(),
            "Box View client created"
        );

        Ok(Self { config, transport })
    }

    /// Create a client with a custom [`Transport`].
    ///
    /// Useful for proxying and for contract tests that record requests
    /// instead of sending them.
    pub fn with_transport(config: BvConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &BvConfig {
        &self.config
    }

    /// Upload a new document for conversion.
    ///
    /// The record must carry an upload source: a `file_url` is posted as
    /// JSON to the document endpoint, a `file_path` is read and posted as a
    /// multipart form to the dedicated upload endpoint. If both are set the
    /// file path wins. The document name defaults to the basename of the
    /// source. On success (202) the server's response is merged into the
    /// record, which then carries the assigned `id` and initial status.
    pub async fn upload(&self, doc: &mut Document) -> Result<()> {
        let file_path = doc
            .file_path
            .clone()
            .filter(|path| !path.as_os_str().is_empty());
        let file_url = doc.file_url.clone().filter(|u| !u.is_empty());

        let request = if let Some(path) = file_path {
            self.multipart_upload_request(doc, &path).await?
        } else if let Some(source) = file_url {
            self.url_upload_request(doc, &source)?
        } else {
            return Err(Error::missing_field("file_url or file_path"));
        };

        info!(
            target: CLIENT_TARGET,
            url = %request.url,
            "uploading document"
        );

        let response = self.dispatch(request).await?;
        Self::expect_status(&response, 202, "could not upload document")?;
        Self::merge_metadata(&response, doc)
    }

    /// Upload several documents, strictly sequentially.
    ///
    /// The first failure aborts the remaining elements; documents uploaded
    /// before the failure keep their merged server state.
    pub async fn upload_many(&self, docs: &mut [Document]) -> Result<()> {
        for doc in docs.iter_mut() {
            self.upload(doc).await?;
        }
        Ok(())
    }

    /// Update the metadata of an existing document.
    ///
    /// Currently the service only supports renaming; the record must carry
    /// both `id` and a non-empty `name`. On success (200) the server's
    /// response is merged into the record.
    pub async fn update(&self, doc: &mut Document) -> Result<()> {
        let id = require_id(doc)?.to_string();
        let name = doc
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or(Error::missing_field("name"))?;

        let url = self.resource_url(&id, None)?;
        let body = serde_json::to_value(UpdateRequest { name: &name })?;
        let request = self.authorized_request(Method::PUT, url, RequestBody::Json(body));

        let response = self.dispatch(request).await?;
        Self::expect_status(&response, 200, "could not modify document")?;
        Self::merge_metadata(&response, doc)
    }

    /// Remove a document from the service. This cannot be undone.
    ///
    /// On success (204) the record is reset to the fresh empty state, so
    /// the caller's reference reflects that the document no longer exists.
    pub async fn delete(&self, doc: &mut Document) -> Result<()> {
        let id = require_id(doc)?.to_string();

        let url = self.resource_url(&id, None)?;
        let request = self.authorized_request(Method::DELETE, url, RequestBody::Empty);

        let response = self.dispatch(request).await?;
        Self::expect_status(&response, 204, "could not delete document")?;

        info!(target: CLIENT_TARGET, id = %id, "document deleted");
        doc.reset();
        Ok(())
    }

    /// Delete several documents, strictly sequentially.
    ///
    /// The first failure aborts the remaining elements; documents deleted
    /// before the failure stay reset.
    pub async fn delete_many(&self, docs: &mut [Document]) -> Result<()> {
        for doc in docs.iter_mut() {
            self.delete(doc).await?;
        }
        Ok(())
    }

    /// Create a short-lived viewing session for a converted document.
    ///
    /// Sessions can only be created for documents whose conversion status
    /// is done. On success (201) the session is stored on the record with a
    /// locally synthesized viewing URL (`<session endpoint>/<id>/view`) and
    /// also returned.
    pub async fn create_session(
        &self,
        doc: &mut Document,
        params: SessionParams,
    ) -> Result<Session> {
        let id = require_id(doc)?.to_string();

        let body = serde_json::to_value(SessionRequest {
            document_id: &id,
            duration: params.duration,
            expires_at: params.expires_at,
        })?;
        let url = self.config.session_url().clone();
        let request = self.authorized_request(Method::POST, url, RequestBody::Json(body));

        let response = self.dispatch(request).await?;
        Self::expect_status(&response, 201, "could not create session")?;

        let mut session: Session = serde_json::from_slice(&response.body)?;
        session.url = format!("{}/{}/view", self.config.session_url(), session.id);

        debug!(
            target: CLIENT_TARGET,
            document_id = %id,
            session_id = %session.id,
            "session created"
        );

        doc.session = Some(session.clone());
        Ok(session)
    }

    /// Refresh server-owned metadata on the record.
    ///
    /// An empty `fields` slice selects the defaults
    /// (`status,name,created_at,modified_at`); `id` and `type` are always
    /// returned by the service. On success (200) the response is merged
    /// into the record.
    pub async fn fetch_metadata(&self, doc: &mut Document, fields: &[&str]) -> Result<()> {
        let id = require_id(doc)?.to_string();

        let mut url = self.resource_url(&id, None)?;
        let selected = if fields.is_empty() {
            DEFAULT_METADATA_FIELDS.join(",")
        } else {
            fields.join(",")
        };
        url.query_pairs_mut().append_pair("fields", &selected);

        let request = self.authorized_request(Method::GET, url, RequestBody::Empty);
        let response = self.dispatch(request).await?;
        Self::expect_status(&response, 200, "could not fetch metadata")?;
        Self::merge_metadata(&response, doc)
    }

    /// Fetch one converted representation of the document.
    ///
    /// The raw bytes are stored on the record under the variant's key (so
    /// repeated fetches of different variants accumulate) and returned.
    pub async fn fetch_content(
        &self,
        doc: &mut Document,
        variant: ContentVariant,
    ) -> Result<Bytes> {
        let id = require_id(doc)?.to_string();

        let url = self.resource_url(&id, Some(variant.path_segment()))?;
        let request = self.authorized_request(Method::GET, url, RequestBody::Empty);

        let response = self.dispatch(request).await?;
        Self::expect_status(&response, 200, "could not fetch content")?;

        debug!(
            target: CLIENT_TARGET,
            id = %id,
            variant = %variant,
            len = response.body.len(),
            "content fetched"
        );

        doc.content.insert(variant, response.body.clone());
        Ok(response.body)
    }

    /// Fetch the document in its originally uploaded format.
    pub async fn fetch_original(&self, doc: &mut Document) -> Result<Bytes> {
        self.fetch_content(doc, ContentVariant::Original).await
    }

    /// Fetch the converted PDF.
    pub async fn fetch_pdf(&self, doc: &mut Document) -> Result<Bytes> {
        self.fetch_content(doc, ContentVariant::Pdf).await
    }

    /// Fetch the zip archive of converted web assets.
    pub async fn fetch_zip(&self, doc: &mut Document) -> Result<Bytes> {
        self.fetch_content(doc, ContentVariant::Zip).await
    }

    /// Fetch a thumbnail of the document's first page.
    ///
    /// Returns the raw image bytes without storing them on the record. See
    /// [`DEFAULT_THUMBNAIL_WIDTH`] and [`DEFAULT_THUMBNAIL_HEIGHT`] for the
    /// conventional dimensions.
    pub async fn thumbnail(&self, doc: &Document, width: u32, height: u32) -> Result<Bytes> {
        let id = require_id(doc)?.to_string();

        let mut url = self.resource_url(&id, Some("thumbnail"))?;
        url.query_pairs_mut()
            .append_pair("width", &width.to_string())
            .append_pair("height", &height.to_string());

        let request = self.authorized_request(Method::GET, url, RequestBody::Empty);
        let response = self.dispatch(request).await?;
        Self::expect_status(&response, 200, "could not fetch thumbnail")?;
        Ok(response.body)
    }

    /// List documents uploaded with this API key.
    ///
    /// Returns freshly constructed records keyed by document id, in the
    /// order the service listed them (newest first).
    pub async fn list(&self, params: ListParams) -> Result<IndexMap<String, Document>> {
        let mut url = self.config.document_url().clone();
        {
            let mut query = url.query_pairs_mut();
            let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
            query.append_pair("limit", &limit.to_string());
            if let Some(before) = &params.created_before {
                query.append_pair("created_before", &before.to_string());
            }
            if let Some(after) = &params.created_after {
                query.append_pair("created_after", &after.to_string());
            }
        }

        let request = self.authorized_request(Method::GET, url, RequestBody::Empty);
        let response = self.dispatch(request).await?;
        Self::expect_status(&response, 200, "could not list documents")?;

        let collection: DocumentCollectionResponse = serde_json::from_slice(&response.body)?;
        let entries = collection.document_collection.entries;

        let mut docs = IndexMap::with_capacity(entries.len());
        for entry in entries {
            let mut doc = Document::from(entry.metadata);
            doc.id = Some(entry.id.clone());
            docs.insert(entry.id, doc);
        }

        debug!(target: CLIENT_TARGET, count = docs.len(), "documents listed");
        Ok(docs)
    }

    fn url_upload_request(&self, doc: &Document, source: &str) -> Result<TransportRequest> {
        let name = doc
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| url_basename(source));

        let body = serde_json::to_value(UrlUploadRequest {
            name: &name,
            url: source,
            thumbnails: &doc.thumbnails,
            non_svg: doc.non_svg,
        })?;

        let url = self.config.document_url().clone();
        Ok(self.authorized_request(Method::POST, url, RequestBody::Json(body)))
    }

    async fn multipart_upload_request(
        &self,
        doc: &Document,
        path: &Path,
    ) -> Result<TransportRequest> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read file '{}': {}", path.display(), e),
            ))
        })?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("file")
            .to_string();
        let name = doc
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| file_name.clone());

        let form = MultipartForm {
            fields: vec![
                ("name".to_string(), name),
                ("thumbnails".to_string(), doc.thumbnails.clone()),
                ("non_svg".to_string(), doc.non_svg.to_string()),
            ],
            file: Some(FilePart {
                file_name,
                bytes: Bytes::from(bytes),
            }),
        };

        let url = self.config.upload_url().clone();
        Ok(self.authorized_request(Method::POST, url, RequestBody::Multipart(form)))
    }

    /// Build a request carrying the `Authorization: Token <key>` header.
    fn authorized_request(&self, method: Method, url: Url, body: RequestBody) -> TransportRequest {
        TransportRequest {
            method,
            url,
            headers: vec![(
                "Authorization".to_string(),
                format!("Token {}", self.config.api_key()),
            )],
            body,
        }
    }

    /// Document resource URL, optionally with a trailing path segment.
    fn resource_url(&self, id: &str, suffix: Option<&str>) -> Result<Url> {
        let mut url = self.config.document_url().clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::config("document endpoint cannot be a base URL"))?;
            segments.push(id);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    /// Execute a request and apply the server-error-object check.
    ///
    /// A body that parses as `{"type": "error", "message": ...}` is a
    /// service failure regardless of the HTTP status code, and is raised
    /// before any operation-specific status check runs.
    async fn dispatch(&self, request: TransportRequest) -> Result<TransportResponse> {
        let response = self.transport.execute(request).await?;

        if let Some(object) = decode_object(&response.body) {
            if object.get("type").and_then(Value::as_str) == Some("error") {
                let message = object
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                return Err(Error::api(response.status, message));
            }
        }

        Ok(response)
    }

    fn expect_status(response: &TransportResponse, expected: u16, message: &str) -> Result<()> {
        if response.status == expected {
            Ok(())
        } else {
            Err(Error::api(response.status, message))
        }
    }

    fn merge_metadata(response: &TransportResponse, doc: &mut Document) -> Result<()> {
        let metadata: DocumentMetadata = serde_json::from_slice(&response.body)?;
        doc.apply(metadata);
        Ok(())
    }
}

fn require_id(doc: &Document) -> Result<&str> {
    doc.id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(Error::missing_field("id"))
}

/// Last path component of an upload source URL, used as the default name.
fn url_basename(source: &str) -> String {
    let path = source.split(['?', '#']).next().unwrap_or(source);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(path)
        .to_string()
}

/// Opportunistically decode a body as a JSON object.
///
/// Parse failure falls back to treating the body as opaque bytes, never an
/// error.
fn decode_object(body: &Bytes) -> Option<serde_json::Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}
