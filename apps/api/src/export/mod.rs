//! PDF export of a rendered layout: one A4 page, named after the resume owner.
//!
//! Exports are stateless. A failure leaves the session untouched and can simply be retried.

pub mod markup;
pub mod typst;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::render::Layout;

pub use self::typst::TypstExporter;

const FILENAME_SUFFIX: &str = "_Resume.pdf";
const UNTITLED: &str = "Untitled";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not start the PDF compiler: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("PDF compilation timed out after {0:?}")]
    Timeout(Duration),

    #[error("PDF compiler exited with {status}: {stderr}")]
    Compile { status: String, stderr: String },

    #[error("export workspace error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait PdfExporter: Send + Sync {
    async fn export(&self, layout: &Layout) -> Result<Vec<u8>, ExportError>;
}

/// `"Jane  Q Doe"` → `"Jane_Q_Doe_Resume.pdf"`. Blank names export as `Untitled_Resume.pdf`.
pub fn export_filename(full_name: &str) -> String {
    let stem = full_name.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if stem.is_empty() { UNTITLED } else { &stem };
    format!("{stem}{FILENAME_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("Jane Doe"), "Jane_Doe_Resume.pdf");
        assert_eq!(export_filename("  Jane \t Q\nDoe "), "Jane_Q_Doe_Resume.pdf");
        assert_eq!(export_filename("Zoë"), "Zoë_Resume.pdf");
    }

    #[test]
    fn test_export_filename_blank_name() {
        assert_eq!(export_filename(""), "Untitled_Resume.pdf");
        assert_eq!(export_filename("   "), "Untitled_Resume.pdf");
    }
}
