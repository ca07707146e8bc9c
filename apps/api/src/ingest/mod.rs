//! Turns uploaded files into plain text for the matcher.
//!
//! The matching engine never sees bytes. Anything that fails here is reported
//! as a skipped document and filtered out before scoring.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::matching::shortlist::CandidateDocument;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("text document is not valid UTF-8")]
    NotUtf8,

    #[error("no text could be extracted")]
    Empty,

    #[error("extraction task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
}

impl DocumentFormat {
    /// Picks a format from the content type, falling back to the file extension.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Result<Self, IngestError> {
        match content_type.map(|c| c.split(';').next().unwrap_or(c).trim()) {
            Some("application/pdf") => return Ok(Self::Pdf),
            Some(ct) if ct.starts_with("text/") => return Ok(Self::PlainText),
            _ => {}
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" | "text" | "md" => Ok(Self::PlainText),
            _ => Err(IngestError::UnsupportedFormat(file_name.to_string())),
        }
    }

    pub fn extractor(self) -> &'static dyn TextExtractor {
        match self {
            Self::Pdf => &PdfTextExtractor,
            Self::PlainText => &PlainTextExtractor,
        }
    }
}

/// Raw bytes → text. Implementations do no cleanup beyond decoding.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: Bytes) -> Result<String, IngestError>;
}

pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<String, IngestError> {
        // pdf-extract is synchronous and CPU-bound.
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| IngestError::Pdf(e.to_string()))
        })
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?
    }
}

pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<String, IngestError> {
        String::from_utf8(bytes.to_vec()).map_err(|_| IngestError::NotUtf8)
    }
}

/// Detects the format, extracts text and collapses whitespace.
pub async fn ingest_document(
    file_name: &str,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<CandidateDocument, IngestError> {
    let format = DocumentFormat::detect(file_name, content_type)?;
    let raw = format.extractor().extract(bytes).await?;
    let text = tidy(&raw);
    if text.is_empty() {
        return Err(IngestError::Empty);
    }
    debug!(file_name, ?format, chars = text.len(), "document ingested");
    Ok(CandidateDocument {
        name: file_name.to_string(),
        text,
    })
}

fn tidy(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
