//! PDFium-backed rendering engine

use crate::error::{Error, Result};
use crate::pdf::{LoadedPdf, PdfEngine, RenderedPage};
use crate::source::ResolvedPdf;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::sync::Arc;

/// Largest scale factor a page may be rendered at
const MAX_RENDER_SCALE: f32 = 10.0;

fn create_pdfium() -> Result<Pdfium> {
    // Try to bind to system library or use static linking
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

fn check_header(data: &[u8]) -> Result<()> {
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::InvalidPdf {
            reason: "Not a valid PDF file".to_string(),
        });
    }
    Ok(())
}

/// Map PDFium errors to our error type
fn map_pdfium_error(err: PdfiumError) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::PasswordRequired
        }
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError) => {
            Error::InvalidPdf {
                reason: format!("{}", err),
            }
        }
        _ => Error::Pdfium {
            reason: format!("{}", err),
        },
    }
}

/// Run a PDFium job on the blocking pool against a freshly loaded document.
///
/// PDFium handles are not `Send`, so only the owned bytes cross threads.
async fn with_document<T, F>(data: Arc<Vec<u8>>, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&PdfDocument<'_>) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let pdfium = create_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(data.as_slice(), None)
            .map_err(map_pdfium_error)?;
        job(&document)
    })
    .await
    .map_err(|e| Error::Pdfium {
        reason: format!("PDFium worker failed: {}", e),
    })?
}

/// Production engine on top of PDFium
#[derive(Debug, Clone, Default)]
pub struct PdfiumEngine;

impl PdfiumEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PdfEngine for PdfiumEngine {
    async fn open(&self, pdf: &ResolvedPdf) -> Result<Arc<dyn LoadedPdf>> {
        check_header(&pdf.data)?;

        let page_count =
            with_document(pdf.data.clone(), |document| Ok(document.pages().len() as u32)).await?;

        tracing::debug!(source = %pdf.source_name(), page_count, "PDF loaded");

        Ok(Arc::new(PdfiumDocument {
            data: pdf.data.clone(),
            page_count,
        }))
    }
}

/// A document opened by [`PdfiumEngine`]
pub struct PdfiumDocument {
    data: Arc<Vec<u8>>,
    page_count: u32,
}

impl PdfiumDocument {
    fn check_page(&self, page: u32) -> Result<()> {
        if page < 1 || page > self.page_count {
            return Err(Error::PageOutOfBounds {
                page,
                total: self.page_count,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LoadedPdf for PdfiumDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    async fn page_text(&self, page: u32) -> Result<Vec<String>> {
        self.check_page(page)?;

        with_document(self.data.clone(), move |document| {
            let pdf_page = document
                .pages()
                .get((page - 1) as u16)
                .map_err(|e| Error::Pdfium {
                    reason: format!("Failed to get page {}: {}", page, e),
                })?;

            let text = pdf_page.text().map_err(|e| Error::Pdfium {
                reason: format!("Failed to read text of page {}: {}", page, e),
            })?;

            let fragments: Vec<String> = text
                .segments()
                .iter()
                .map(|segment| segment.text())
                .collect();
            Ok(fragments)
        })
        .await
    }

    async fn render_page(&self, page: u32, scale: f32) -> Result<RenderedPage> {
        self.check_page(page)?;
        let scale = scale.clamp(f32::EPSILON, MAX_RENDER_SCALE);

        with_document(self.data.clone(), move |document| {
            let pdf_page = document
                .pages()
                .get((page - 1) as u16)
                .map_err(|e| Error::Pdfium {
                    reason: format!("Failed to get page {}: {}", page, e),
                })?;

            let config = PdfRenderConfig::new()
                .scale_page_by_factor(scale)
                .render_form_data(true)
                .render_annotations(true);

            let bitmap = pdf_page
                .render_with_config(&config)
                .map_err(|e| Error::Pdfium {
                    reason: format!("Failed to render page {}: {}", page, e),
                })?;

            let dynamic_image = bitmap.as_image();
            let width = dynamic_image.width();
            let height = dynamic_image.height();

            let mut png = Vec::new();
            dynamic_image
                .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
                .map_err(|e| Error::Pdfium {
                    reason: format!("Failed to encode page {} as PNG: {}", page, e),
                })?;

            Ok(RenderedPage {
                page,
                width,
                height,
                png: Arc::new(png),
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DocumentSource, SourceId};

    fn resolved(bytes: &[u8]) -> ResolvedPdf {
        ResolvedPdf {
            id: SourceId::new(),
            source: DocumentSource::Default {
                location: "test.pdf".to_string(),
            },
            data: Arc::new(bytes.to_vec()),
        }
    }

    #[tokio::test]
    async fn test_invalid_pdf_detection() {
        let result = PdfiumEngine::new().open(&resolved(b"not a pdf")).await;
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }

    #[tokio::test]
    async fn test_empty_bytes_rejected() {
        let result = PdfiumEngine::new().open(&resolved(b"")).await;
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }

    #[tokio::test]
    async fn test_page_bounds_checked_before_pdfium() {
        let document = PdfiumDocument {
            data: Arc::new(Vec::new()),
            page_count: 2,
        };
        assert!(matches!(
            document.page_text(0).await,
            Err(Error::PageOutOfBounds { page: 0, total: 2 })
        ));
        assert!(matches!(
            document.render_page(3, 1.0).await,
            Err(Error::PageOutOfBounds { page: 3, total: 2 })
        ));
    }
}
