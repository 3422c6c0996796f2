//! PDF processing layer
//!
//! The engine boundary ([`PdfEngine`], [`LoadedPdf`]), its PDFium implementation,
//! whole-document text extraction and zoomable page surfaces.

pub mod cache;
mod engine;
mod extract;
mod reader;
mod render;

pub use engine::{LoadedPdf, PdfEngine, RenderedPage};
pub use extract::{extract_text, join_page_fragments};
pub use reader::{PdfiumDocument, PdfiumEngine};
pub use render::{PageRenderer, Zoom};
