//! Generative analysis oracle: ATS scoring and career advice for an uploaded resume file.
//!
//! The oracle is an opaque service behind `ResumeAnalyzer`; only the report schemas are relied on.

pub mod client;
pub mod handlers;
pub mod prompts;
pub mod reports;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::errors::AppError;

pub use client::{GeminiClient, LlmError};
pub use reports::{AtsReport, CareerReport};

/// Uploads above this size are rejected before reaching the oracle.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn score(&self, document: &Upload) -> Result<AtsReport, LlmError>;
    async fn career(&self, document: &Upload) -> Result<CareerReport, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    pub fn mime(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Doc => "application/msword",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        [DocumentKind::Pdf, DocumentKind::Doc, DocumentKind::Docx]
            .into_iter()
            .find(|kind| kind.mime().eq_ignore_ascii_case(essence))
    }

    fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" => Some(DocumentKind::Doc),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("multipart field 'file' is required")]
    MissingFile,

    #[error("the uploaded file is empty")]
    Empty,

    #[error("unsupported file type '{0}'; upload a PDF, DOC, or DOCX file")]
    Unsupported(String),

    #[error("file is {0} bytes; the limit is {} bytes", MAX_UPLOAD_BYTES)]
    TooLarge(usize),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Unsupported(_) => AppError::UnsupportedMedia(err.to_string()),
            UploadError::TooLarge(_) => AppError::PayloadTooLarge(err.to_string()),
            UploadError::MissingFile | UploadError::Empty => AppError::Validation(err.to_string()),
        }
    }
}

/// A validated resume file ready to send to the oracle.
#[derive(Debug, Clone)]
pub struct Upload {
    pub kind: DocumentKind,
    pub bytes: Bytes,
}

impl Upload {
    /// Trusts the declared content type first; generic types fall back to the file extension.
    pub fn new(
        content_type: Option<&str>,
        file_name: Option<&str>,
        bytes: Bytes,
    ) -> Result<Self, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge(bytes.len()));
        }

        let kind = content_type
            .and_then(DocumentKind::from_mime)
            .or_else(|| match content_type {
                None | Some("application/octet-stream") => {
                    file_name.and_then(DocumentKind::from_file_name)
                }
                Some(_) => None,
            })
            .ok_or_else(|| {
                UploadError::Unsupported(
                    content_type
                        .or(file_name)
                        .unwrap_or("unknown")
                        .to_string(),
                )
            })?;

        Ok(Self { kind, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_bytes() -> Bytes {
        Bytes::from_static(b"%PDF-1.7 test")
    }

    #[test]
    fn test_upload_accepts_declared_types() {
        let pdf = Upload::new(Some("application/pdf"), Some("cv.pdf"), pdf_bytes()).unwrap();
        assert_eq!(pdf.kind, DocumentKind::Pdf);

        let docx = Upload::new(Some(DocumentKind::Docx.mime()), None, pdf_bytes()).unwrap();
        assert_eq!(docx.kind, DocumentKind::Docx);

        let with_params =
            Upload::new(Some("application/msword; charset=binary"), None, pdf_bytes());
        assert_eq!(with_params.unwrap().kind, DocumentKind::Doc);
    }

    #[test]
    fn test_upload_falls_back_to_extension_for_generic_type() {
        let upload = Upload::new(
            Some("application/octet-stream"),
            Some("Resume.DOCX"),
            pdf_bytes(),
        )
        .unwrap();
        assert_eq!(upload.kind, DocumentKind::Docx);
    }

    #[test]
    fn test_upload_rejects_other_types() {
        let err = Upload::new(Some("image/png"), Some("cv.pdf"), pdf_bytes()).unwrap_err();
        assert_eq!(err, UploadError::Unsupported("image/png".into()));
        assert!(Upload::new(None, Some("notes.txt"), pdf_bytes()).is_err());
    }

    #[test]
    fn test_upload_size_limits() {
        assert_eq!(
            Upload::new(Some("application/pdf"), None, Bytes::new()).unwrap_err(),
            UploadError::Empty
        );
        let big = Bytes::from(vec![0u8; MAX_UPLOAD_BYTES + 1]);
        assert_eq!(
            Upload::new(Some("application/pdf"), None, big).unwrap_err(),
            UploadError::TooLarge(MAX_UPLOAD_BYTES + 1)
        );
    }
}
