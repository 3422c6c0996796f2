//! Error types for the resume viewer

use thiserror::Error;

/// Result type alias for the resume viewer
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the resume viewer
#[derive(Error, Debug)]
pub enum Error {
    /// PDF file not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected
    #[error("PDF is password protected")]
    PasswordRequired,

    /// Page out of bounds
    #[error("Page {page} out of bounds (total: {total})")]
    PageOutOfBounds { page: u32, total: u32 },

    /// No document source is active, or the active one has not been loaded yet
    #[error("No document loaded")]
    NoDocument,

    /// Source resolution error
    #[error("Failed to resolve source: {reason}")]
    SourceResolution { reason: String },

    /// A page's text could not be retrieved; extraction was abandoned
    #[error("Text extraction failed on page {page}: {reason}")]
    Extraction { page: u32, reason: String },

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// Download too large
    #[error("Download too large: {size} bytes (max: {max_size} bytes)")]
    DownloadTooLarge { size: u64, max_size: u64 },

    /// Invalid viewer configuration
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl Error {
    /// Return a sanitized error message safe to show in the view.
    /// Internal details (paths, library errors, file sizes) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::PdfNotFound { .. } => "PDF not found".to_string(),
            Error::InvalidPdf { .. } => "Invalid PDF file".to_string(),
            Error::PasswordRequired => "PDF is password protected".to_string(),
            Error::PageOutOfBounds { page, total } => {
                format!("Page {} out of bounds (total: {})", page, total)
            }
            Error::NoDocument => "No document loaded".to_string(),
            Error::SourceResolution { .. } => "Failed to resolve PDF source".to_string(),
            Error::Extraction { page, .. } => {
                format!("Could not read the text of page {}", page)
            }
            Error::HttpRequest(_) => "HTTP request failed".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Pdfium { .. } => "PDF processing error".to_string(),
            Error::DownloadTooLarge { max_size, .. } => {
                format!("Download exceeds maximum size of {} bytes", max_size)
            }
            Error::Config { reason } => format!("Invalid configuration: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_paths() {
        let err = Error::PdfNotFound {
            path: "/home/someone/private/resume.pdf".to_string(),
        };
        assert_eq!(err.client_message(), "PDF not found");
        assert!(err.to_string().contains("/home/someone"));
    }

    #[test]
    fn test_client_message_extraction_names_page() {
        let err = Error::Extraction {
            page: 3,
            reason: "segment table corrupt".to_string(),
        };
        assert_eq!(err.client_message(), "Could not read the text of page 3");
    }
}
