//! Rendering engine boundary
//!
//! The viewer never talks to a PDF library directly. It opens a [`ResolvedPdf`]
//! through a [`PdfEngine`] and then works with the returned [`LoadedPdf`].

use crate::error::Result;
use crate::source::ResolvedPdf;
use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;

/// A rendered page surface, PNG encoded
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Page number (1-indexed)
    pub page: u32,
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
    pub png: Arc<Vec<u8>>,
}

impl RenderedPage {
    pub fn byte_len(&self) -> usize {
        self.png.len()
    }

    /// `data:` URL suitable for an `<img>` tag
    pub fn data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(self.png.as_slice())
        )
    }
}

/// Opens resolved PDF bytes into a document
#[async_trait]
pub trait PdfEngine: Send + Sync {
    /// Load the document. Success is the "loaded" signal: the page count is known.
    async fn open(&self, pdf: &ResolvedPdf) -> Result<Arc<dyn LoadedPdf>>;
}

/// A successfully loaded document
#[async_trait]
pub trait LoadedPdf: Send + Sync {
    /// Number of pages
    fn page_count(&self) -> u32;

    /// Ordered text fragments of a page (1-indexed)
    async fn page_text(&self, page: u32) -> Result<Vec<String>>;

    /// Rasterize a page (1-indexed) at the given scale
    async fn render_page(&self, page: u32, scale: f32) -> Result<RenderedPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_prefix() {
        let page = RenderedPage {
            page: 1,
            width: 1,
            height: 1,
            png: Arc::new(b"abc".to_vec()),
        };
        assert_eq!(page.data_url(), "data:image/png;base64,YWJj");
        assert_eq!(page.byte_len(), 3);
    }
}
