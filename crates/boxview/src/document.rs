//! Local document state.
//!
//! A [`Document`] is the client-side record of one remote document: identity
//! and metadata owned by the server, the upload source chosen by the caller,
//! and any content fetched so far. The record holds no behavior beyond
//! construction and field storage; [`BvClient`](crate::BvClient) operations
//! mutate it through [`Document::apply`] and [`Document::reset`].

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use jiff::Timestamp;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Conversion lifecycle state reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Waiting for a conversion worker
    Queued,
    /// Conversion in progress
    Processing,
    /// Converted assets are available
    Done,
    /// Conversion failed
    Error,
}

impl DocumentStatus {
    /// Wire-format name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fetchable representation of a converted document.
///
/// The variant determines both the request path suffix and the key under
/// which the bytes are stored in [`Document::content`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentVariant {
    /// The document in its originally uploaded format
    Original,
    /// The converted PDF
    Pdf,
    /// Zip archive of the converted web assets
    Zip,
}

impl ContentVariant {
    /// Storage key for this variant.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Pdf => "pdf",
            Self::Zip => "zip",
        }
    }

    /// Path segment appended to the document resource URL.
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Self::Original => "content",
            Self::Pdf => "content.pdf",
            Self::Zip => "content.zip",
        }
    }
}

impl fmt::Display for ContentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A short-lived viewing session for a converted document.
///
/// Sessions let an end user view a document without exposing the API key.
/// They can only be created for documents whose status is
/// [`DocumentStatus::Done`] and expire server-side (one hour by default).
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// Server-assigned session identifier
    pub id: String,
    /// Viewing URL, synthesized locally as `<session endpoint>/<id>/view`
    #[serde(skip)]
    pub url: String,
    /// Expiration timestamp reported by the service
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
    /// Server fields this struct does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Server-owned document metadata as returned on the wire.
///
/// All fields are optional: responses carry only the fields relevant to the
/// operation (or those selected via the `fields` query parameter). Fields
/// the struct does not know are preserved in `extra` rather than dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentMetadata {
    /// Server-assigned document identifier
    pub id: Option<String>,
    /// Resource kind, currently always "document"
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// User-visible document name
    pub name: Option<String>,
    /// Conversion status
    pub status: Option<DocumentStatus>,
    /// Upload timestamp
    pub created_at: Option<Timestamp>,
    /// Last end-user modification timestamp
    pub modified_at: Option<Timestamp>,
    /// Unrecognized server fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Local record of one remote document's known state.
///
/// Records are created client-side (possibly empty), enriched by
/// upload/update/metadata round trips, and reset by delete. Instances are
/// intended for single-owner, single-threaded use; the client takes an
/// exclusive borrow for every mutating operation.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Server-assigned identifier; present only after upload or list
    pub id: Option<String>,
    /// Server-reported resource kind
    pub kind: Option<String>,
    /// User-visible name; settable locally before upload
    pub name: Option<String>,
    /// Conversion status, server-owned
    pub status: Option<DocumentStatus>,
    /// Upload timestamp, server-owned
    pub created_at: Option<Timestamp>,
    /// Last modification timestamp, server-owned
    pub modified_at: Option<Timestamp>,
    /// Source URL for upload-by-reference
    pub file_url: Option<String>,
    /// Local path for upload-by-content
    pub file_path: Option<PathBuf>,
    /// Comma-separated `{width}x{height}` thumbnail specs requested at upload
    pub thumbnails: String,
    /// Request the non-SVG converted variant at upload
    pub non_svg: bool,
    /// Viewing session, set by a successful session create
    pub session: Option<Session>,
    /// Fetched content, one entry per successfully fetched variant
    pub content: HashMap<ContentVariant, Bytes>,
    /// Server fields the record does not model
    pub extra: Map<String, Value>,
}

impl Document {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record that uploads from a publicly reachable URL.
    pub fn from_url(file_url: impl Into<String>) -> Self {
        Self {
            file_url: Some(file_url.into()),
            ..Self::default()
        }
    }

    /// Create a record that uploads a local file.
    pub fn from_path(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            ..Self::default()
        }
    }

    /// Set the user-visible name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Request thumbnails at upload time, e.g. `"128x128,256x256"`.
    pub fn with_thumbnails(mut self, thumbnails: impl Into<String>) -> Self {
        self.thumbnails = thumbnails.into();
        self
    }

    /// Request the non-SVG converted variant at upload time.
    pub fn with_non_svg(mut self, non_svg: bool) -> Self {
        self.non_svg = non_svg;
        self
    }

    /// Merge server metadata into this record.
    ///
    /// Overwrites exactly the fields the patch carries and preserves
    /// everything else. This is the only mutation path for server-owned
    /// fields.
    pub fn apply(&mut self, metadata: DocumentMetadata) {
        if metadata.id.is_some() {
            self.id = metadata.id;
        }
        if metadata.kind.is_some() {
            self.kind = metadata.kind;
        }
        if metadata.name.is_some() {
            self.name = metadata.name;
        }
        if metadata.status.is_some() {
            self.status = metadata.status;
        }
        if metadata.created_at.is_some() {
            self.created_at = metadata.created_at;
        }
        if metadata.modified_at.is_some() {
            self.modified_at = metadata.modified_at;
        }
        self.extra.extend(metadata.extra);
    }

    /// Reset the record to the fresh empty state.
    ///
    /// Called after a successful delete so the caller's reference reflects
    /// that the remote document no longer exists.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl From<DocumentMetadata> for Document {
    fn from(metadata: DocumentMetadata) -> Self {
        let mut doc = Self::default();
        doc.apply(metadata);
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(json: &str) -> DocumentMetadata {
        serde_json::from_str(json).expect("valid metadata")
    }

    #[test]
    fn test_apply_overwrites_carried_fields_only() {
        let mut doc = Document::from_url("https://example.com/a.pdf").with_name("old name");
        doc.apply(patch(r#"{"id": "d1", "status": "queued"}"#));

        assert_eq!(doc.id.as_deref(), Some("d1"));
        assert_eq!(doc.status, Some(DocumentStatus::Queued));
        // Fields the patch did not carry are untouched.
        assert_eq!(doc.name.as_deref(), Some("old name"));
        assert_eq!(doc.file_url.as_deref(), Some("https://example.com/a.pdf"));
    }

    #[test]
    fn test_apply_preserves_unknown_fields() {
        let mut doc = Document::new();
        doc.apply(patch(
            r#"{"id": "d1", "type": "document", "page_count": 12}"#,
        ));

        assert_eq!(doc.kind.as_deref(), Some("document"));
        assert_eq!(doc.extra.get("page_count"), Some(&Value::from(12)));
    }

    #[test]
    fn test_apply_parses_timestamps() {
        let mut doc = Document::new();
        doc.apply(patch(r#"{"created_at": "2016-02-02T21:59:40Z"}"#));

        let created = doc.created_at.expect("timestamp set");
        assert_eq!(created.to_string(), "2016-02-02T21:59:40Z");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut doc = Document::from_path("/tmp/report.pdf")
            .with_name("report")
            .with_thumbnails("128x128")
            .with_non_svg(true);
        doc.apply(patch(r#"{"id": "d1", "status": "done"}"#));
        doc.content.insert(ContentVariant::Pdf, Bytes::from("pdf"));

        doc.reset();

        assert!(doc.id.is_none());
        assert!(doc.name.is_none());
        assert!(doc.status.is_none());
        assert!(doc.file_path.is_none());
        assert!(doc.content.is_empty());
        assert!(doc.extra.is_empty());
        assert_eq!(doc.thumbnails, "");
        assert!(!doc.non_svg);
    }

    #[test]
    fn test_document_from_metadata() {
        let doc = Document::from(patch(
            r#"{"id": "d2", "name": "slides.ppt", "status": "processing"}"#,
        ));

        assert_eq!(doc.id.as_deref(), Some("d2"));
        assert_eq!(doc.name.as_deref(), Some("slides.ppt"));
        assert_eq!(doc.status, Some(DocumentStatus::Processing));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(DocumentStatus::Queued.as_str(), "queued");
        assert_eq!(DocumentStatus::Done.to_string(), "done");

        let status: DocumentStatus = serde_json::from_str(r#""error""#).expect("parses");
        assert_eq!(status, DocumentStatus::Error);
    }

    #[test]
    fn test_content_variant_paths() {
        assert_eq!(ContentVariant::Original.path_segment(), "content");
        assert_eq!(ContentVariant::Pdf.path_segment(), "content.pdf");
        assert_eq!(ContentVariant::Zip.path_segment(), "content.zip");
        assert_eq!(ContentVariant::Original.key(), "original");
    }
}
